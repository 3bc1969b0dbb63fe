//! URL building helpers.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// How much of a URL [`Router::generate`](crate::Router::generate) emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceType {
    /// `http://example.com/dir/file`
    AbsoluteUrl,
    /// `/dir/file`
    #[default]
    AbsolutePath,
    /// `../parent-file`, relative to the current path.
    RelativePath,
    /// `//example.com/dir/file`, reusing the current scheme.
    NetworkPath,
}

/// Everything except unreserved characters, as in RFC 3986.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Form encoding; spaces are handled separately.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Characters left readable in a generated path.
const DECODED_CHARS: [(&str, &str); 10] = [
    ("%2F", "/"),
    ("%40", "@"),
    ("%3A", ":"),
    ("%3B", ";"),
    ("%2C", ","),
    ("%3D", "="),
    ("%2B", "+"),
    ("%21", "!"),
    ("%2A", "*"),
    ("%7C", "|"),
];

/// Percent-encodes a generated path.
///
/// Characters that carry no special meaning inside a path are decoded again,
/// and `.`/`..` segments are escaped so clients do not resolve them.
///
/// ```
/// use lwf_router::encode_path;
///
/// assert_eq!(encode_path("/a b/c@d"), "/a%20b/c@d");
/// assert_eq!(encode_path("/files/.."), "/files/%2E%2E");
/// ```
pub fn encode_path(path: &str) -> String {
    let mut url = utf8_percent_encode(path, PATH_ENCODE_SET).to_string();
    for (encoded, decoded) in DECODED_CHARS {
        url = url.replace(encoded, decoded);
    }
    escape_dot_segments(&url)
}

fn escape_dot_segments(url: &str) -> String {
    let mut url = url.replace("/../", "/%2E%2E/").replace("/./", "/%2E/");
    if url.ends_with("/..") {
        url.truncate(url.len() - 2);
        url.push_str("%2E%2E");
    } else if url.ends_with("/.") {
        url.truncate(url.len() - 1);
        url.push_str("%2E");
    }
    url
}

/// Encodes key/value pairs as an `application/x-www-form-urlencoded` query.
pub fn build_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn form_encode(value: &str) -> String {
    value
        .split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Returns `target` as a reference relative to `base`.
///
/// Both paths must be absolute and free of `.`/`..` segments.
///
/// ```
/// use lwf_router::relative_path;
///
/// assert_eq!(relative_path("/a/b/c/d", "/a/b/c/d"), "");
/// assert_eq!(relative_path("/a/b/c/d", "/a/b/c/"), "./");
/// assert_eq!(relative_path("/a/b/c/d", "/a/b/"), "../");
/// assert_eq!(relative_path("/a/b/c/d", "/a/b/c/other"), "other");
/// assert_eq!(relative_path("/a/b/c/d", "/a/x/y"), "../../x/y");
/// ```
pub fn relative_path(base: &str, target: &str) -> String {
    if base == target {
        return String::new();
    }

    let mut source_dirs: Vec<&str> = base.strip_prefix('/').unwrap_or(base).split('/').collect();
    let mut target_dirs: Vec<&str> = target
        .strip_prefix('/')
        .unwrap_or(target)
        .split('/')
        .collect();
    source_dirs.pop();
    let target_file = target_dirs.pop().unwrap_or_default();

    let common = source_dirs
        .iter()
        .zip(&target_dirs)
        .take_while(|(source, target)| source == target)
        .count();

    let mut remaining: Vec<&str> = target_dirs[common..].to_vec();
    remaining.push(target_file);
    let path = format!(
        "{}{}",
        "../".repeat(source_dirs.len() - common),
        remaining.join("/")
    );

    if needs_dot_prefix(&path) {
        format!("./{path}")
    } else {
        path
    }
}

/// An empty reference, one starting with `/`, or one whose first segment has
/// a colon (it would read as a scheme) must start with `./`.
fn needs_dot_prefix(path: &str) -> bool {
    if path.is_empty() || path.starts_with('/') {
        return true;
    }
    match (path.find(':'), path.find('/')) {
        (Some(colon), Some(slash)) => colon < slash,
        (Some(_), None) => true,
        _ => false,
    }
}
