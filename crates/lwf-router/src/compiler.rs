//! Route compilation.
//!
//! A pattern such as `/blog/{year}/{slug}` is split into literal and
//! variable tokens, from which an anchored regex and a static prefix are
//! derived.

use std::fmt;

use regex::Regex;

use crate::compiled::{CompiledRoute, Token};
use crate::error::{Result, RouterError};
use crate::route::Route;

/// Characters that may precede a variable and become its prefix.
const SEPARATORS: &str = "/,;.:-_~+*=@|";

/// Longest variable name accepted in a pattern.
const VARIABLE_MAXIMUM_LENGTH: usize = 32;

/// Strategy turning a [`Route`] into a [`CompiledRoute`].
///
/// Routers pick a compiler by name at registration time, see
/// [`Router::with_compiler`](crate::Router::with_compiler).
pub trait RouteCompiler: Send + Sync + fmt::Debug {
    /// Compiles the route.
    fn compile(&self, route: &Route) -> Result<CompiledRoute>;
}

/// The standard compiler.
///
/// Path variables default to `[^/]+`, host variables to `[^.]+`. Trailing
/// path variables that all have a default value become optional.
///
/// # Example
///
/// ```
/// use lwf_router::{DefaultCompiler, Route, RouteCompiler};
///
/// let route = Route::new("/blog/{page}").with_default("page", "1");
/// let compiled = DefaultCompiler.compile(&route).unwrap();
///
/// assert_eq!(compiled.static_prefix(), "/blog");
/// assert!(compiled.regex().is_match("/blog"));
/// assert!(compiled.regex().is_match("/blog/2"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompiler;

impl DefaultCompiler {
    /// Name under which routers register this compiler.
    pub const NAME: &'static str = "default";
}

impl RouteCompiler for DefaultCompiler {
    fn compile(&self, route: &Route) -> Result<CompiledRoute> {
        let mut variables = Vec::new();
        let mut host_variables = Vec::new();
        let mut host_tokens = Vec::new();
        let mut host_regex = None;

        if !route.host().is_empty() {
            let host = compile_pattern(route, route.host(), true)?;
            host_variables = host.variables;
            variables.clone_from(&host_variables);
            host_tokens = host.tokens;
            host_regex = Some(host.regex);
        }

        let path = compile_pattern(route, route.path(), false)?;
        let static_prefix = match path.tokens.first() {
            Some(Token::Text(text)) => text.clone(),
            _ => String::new(),
        };

        for name in &path.variables {
            if !variables.contains(name) {
                variables.push(name.clone());
            }
        }

        Ok(CompiledRoute::new(
            static_prefix,
            path.regex,
            path.tokens,
            path.variables,
            host_regex,
            host_tokens,
            host_variables,
            variables,
        ))
    }
}

struct CompiledPattern {
    tokens: Vec<Token>,
    variables: Vec<String>,
    regex: Regex,
}

fn compile_pattern(route: &Route, pattern: &str, is_host: bool) -> Result<CompiledPattern> {
    let default_separator = if is_host { '.' } else { '/' };
    let mut tokens = Vec::new();
    let mut variables: Vec<String> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = pattern[pos..].find(['{', '}']) {
        let open = pos + offset;
        if pattern[open..].starts_with('}') {
            return Err(RouterError::malformed(
                pattern,
                format!("unexpected '}}' at offset {open}"),
            ));
        }

        let close = match pattern[open + 1..].find(['{', '}']) {
            Some(i) if pattern[open + 1 + i..].starts_with('}') => open + 1 + i,
            _ => {
                return Err(RouterError::malformed(
                    pattern,
                    format!("unclosed '{{' at offset {open}"),
                ))
            }
        };

        let name = &pattern[open + 1..close];
        check_variable_name(pattern, name)?;
        if variables.iter().any(|v| v == name) {
            return Err(RouterError::malformed(
                pattern,
                format!("variable \"{name}\" is used more than once"),
            ));
        }

        let preceding = &pattern[pos..open];
        pos = close + 1;

        let separator = preceding.chars().last().filter(|c| SEPARATORS.contains(*c));
        match separator {
            Some(sep) if preceding.len() > sep.len_utf8() => {
                tokens.push(Token::Text(
                    preceding[..preceding.len() - sep.len_utf8()].to_string(),
                ));
            }
            None if !preceding.is_empty() => tokens.push(Token::Text(preceding.to_string())),
            _ => {}
        }

        let regex = match route.requirement(name) {
            Some(requirement) => requirement.to_string(),
            None => default_requirement(default_separator, &pattern[pos..]),
        };

        tokens.push(Token::Variable {
            prefix: separator.map(String::from).unwrap_or_default(),
            regex,
            name: name.to_string(),
        });
        variables.push(name.to_string());
    }

    if pos < pattern.len() {
        tokens.push(Token::Text(pattern[pos..].to_string()));
    }

    let first_optional = if is_host {
        usize::MAX
    } else {
        first_optional_index(route, &tokens)
    };

    let body: String = (0..tokens.len())
        .map(|index| token_regex(&tokens, index, first_optional))
        .collect();
    let flags = if is_host { "(?si)" } else { "(?s)" };
    let source = format!("{flags}^{body}$");
    let regex = Regex::new(&source).map_err(|source| RouterError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(CompiledPattern {
        tokens,
        variables,
        regex,
    })
}

/// Rewrites `\d`, `\w`, `\s` and their negations to ASCII classes, so a
/// requirement such as `\d+` only accepts `0-9`.
pub(crate) fn ascii_classes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(next) = chars.next() else {
                    out.push(c);
                    break;
                };
                let class = match next {
                    'd' => Some("digit"),
                    'D' => Some("^digit"),
                    'w' => Some("word"),
                    'W' => Some("^word"),
                    's' => Some("space"),
                    'S' => Some("^space"),
                    _ => None,
                };
                match class {
                    Some(class) if depth == 0 => {
                        out.push_str(&format!("[[:{class}:]]"));
                    }
                    Some(class) => out.push_str(&format!("[:{class}:]")),
                    None => {
                        out.push(c);
                        out.push(next);
                    }
                }
            }
            '[' => {
                out.push(c);
                depth += 1;
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                // a leading `]` is literal
                if depth == 1 && chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if depth > 0 => {
                out.push(c);
                depth -= 1;
            }
            _ => out.push(c),
        }
    }
    out
}

fn check_variable_name(pattern: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RouterError::malformed(
            pattern,
            format!("invalid variable name \"{name}\""),
        ));
    }
    if name.len() > VARIABLE_MAXIMUM_LENGTH {
        return Err(RouterError::malformed(
            pattern,
            format!(
                "variable name \"{name}\" is longer than {VARIABLE_MAXIMUM_LENGTH} characters"
            ),
        ));
    }
    Ok(())
}

/// Builds the requirement used when a variable has none: anything up to the
/// default separator, or up to the separator that follows the variable.
fn default_requirement(default_separator: char, following: &str) -> String {
    let mut class = regex::escape(&default_separator.to_string());
    if let Some(next) = next_separator(following) {
        if next != default_separator {
            class.push_str(&regex::escape(&next.to_string()));
        }
    }
    format!("[^{class}]+")
}

/// First character of the following literal text, once placeholders are
/// removed, if it is a separator.
fn next_separator(following: &str) -> Option<char> {
    let mut rest = following;
    loop {
        match rest.strip_prefix('{') {
            Some(inner) => match inner.find('}') {
                Some(end) => rest = &inner[end + 1..],
                None => return None,
            },
            None => break,
        }
    }
    rest.chars().next().filter(|c| SEPARATORS.contains(*c))
}

/// Index of the first variable of the trailing run of variables that all
/// have a default value.
fn first_optional_index(route: &Route, tokens: &[Token]) -> usize {
    let mut first_optional = usize::MAX;
    for (index, token) in tokens.iter().enumerate().rev() {
        match token {
            Token::Variable { name, .. } if route.has_default(name) => first_optional = index,
            _ => break,
        }
    }
    first_optional
}

fn token_regex(tokens: &[Token], index: usize, first_optional: usize) -> String {
    match &tokens[index] {
        Token::Text(text) => regex::escape(text),
        Token::Variable {
            prefix,
            regex,
            name,
        } => {
            let prefix = regex::escape(prefix);
            let regex = ascii_classes(regex);
            if index == 0 && first_optional == 0 {
                // a lone optional variable
                return format!("{prefix}(?P<{name}>{regex})?");
            }

            let mut out = format!("{prefix}(?P<{name}>{regex})");
            if index >= first_optional {
                out = format!("(?:{out}");
                if index == tokens.len() - 1 {
                    let open_groups =
                        tokens.len() - first_optional - usize::from(first_optional == 0);
                    out.push_str(&")?".repeat(open_groups));
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(route: &Route) -> CompiledRoute {
        DefaultCompiler.compile(route).unwrap()
    }

    fn compile_err(path: &str) -> RouterError {
        DefaultCompiler.compile(&Route::new(path)).unwrap_err()
    }

    #[test]
    fn test_static_route() {
        let compiled = compile(&Route::new("/foo"));
        assert_eq!(compiled.static_prefix(), "/foo");
        assert_eq!(compiled.regex().as_str(), "(?s)^/foo$");
        assert_eq!(compiled.tokens(), [Token::Text("/foo".into())]);
        assert!(compiled.variables().is_empty());
    }

    #[test]
    fn test_single_variable() {
        let compiled = compile(&Route::new("/foo/{bar}"));
        assert_eq!(compiled.static_prefix(), "/foo");
        assert_eq!(compiled.regex().as_str(), "(?s)^/foo/(?P<bar>[^/]+)$");
        assert_eq!(
            compiled.tokens(),
            [
                Token::Text("/foo".into()),
                Token::Variable {
                    prefix: "/".into(),
                    regex: "[^/]+".into(),
                    name: "bar".into(),
                },
            ]
        );
        assert_eq!(compiled.path_variables(), ["bar"]);
    }

    #[test]
    fn test_requirement_is_used() {
        let route = Route::new("/user/{id}")
            .with_requirement("id", r"\d+")
            .unwrap();
        let compiled = compile(&route);
        assert_eq!(
            compiled.regex().as_str(),
            r"(?s)^/user/(?P<id>[[:digit:]]+)$"
        );
        assert_eq!(route.requirement("id"), Some(r"\d+"));
    }

    #[test]
    fn test_perl_classes_are_ascii() {
        assert_eq!(ascii_classes(r"\d{4}-\w+"), "[[:digit:]]{4}-[[:word:]]+");
        assert_eq!(ascii_classes(r"[\d.]+\S"), "[[:digit:].]+[[:^space:]]");
        assert_eq!(ascii_classes(r"[]\d]"), "[][:digit:]]");
        assert_eq!(ascii_classes(r"a\\d\."), r"a\\d\.");
        assert_eq!(ascii_classes(r"\p{L}+"), r"\p{L}+");

        let route = Route::new("/code/{code}")
            .with_requirement("code", r"[\w-]+")
            .unwrap();
        let compiled = compile(&route);
        assert!(compiled.regex().is_match("/code/ab_1-2"));
        assert!(!compiled.regex().is_match("/code/\u{e9}t\u{e9}"));
    }

    #[test]
    fn test_trailing_defaults_are_optional() {
        let route = Route::new("/foo/{bar}/{baz}")
            .with_default("bar", "a")
            .with_default("baz", "b");
        let compiled = compile(&route);
        assert_eq!(
            compiled.regex().as_str(),
            "(?s)^/foo(?:/(?P<bar>[^/]+)(?:/(?P<baz>[^/]+))?)?$"
        );
        assert!(compiled.regex().is_match("/foo"));
        assert!(compiled.regex().is_match("/foo/x"));
        assert!(compiled.regex().is_match("/foo/x/y"));
    }

    #[test]
    fn test_default_before_required_is_not_optional() {
        let route = Route::new("/foo/{bar}/{baz}").with_default("bar", "a");
        let compiled = compile(&route);
        assert!(!compiled.regex().is_match("/foo"));
        assert!(compiled.regex().is_match("/foo/x/y"));
    }

    #[test]
    fn test_lone_optional_variable() {
        let route = Route::new("/{page}").with_default("page", "index");
        let compiled = compile(&route);
        assert_eq!(compiled.static_prefix(), "");
        assert_eq!(compiled.regex().as_str(), "(?s)^/(?P<page>[^/]+)?$");
        assert!(compiled.regex().is_match("/"));
        assert!(compiled.regex().is_match("/about"));
    }

    #[test]
    fn test_next_separator_narrows_default_requirement() {
        let compiled = compile(&Route::new("/{name}.{format}"));
        assert_eq!(
            compiled.regex().as_str(),
            r"(?s)^/(?P<name>[^/\.]+)\.(?P<format>[^/]+)$"
        );
        let caps = compiled.regex().captures("/report.pdf").unwrap();
        assert_eq!(&caps["name"], "report");
        assert_eq!(&caps["format"], "pdf");
    }

    #[test]
    fn test_text_without_separator() {
        let compiled = compile(&Route::new("/page{num}"));
        assert_eq!(
            compiled.tokens(),
            [
                Token::Text("/page".into()),
                Token::Variable {
                    prefix: String::new(),
                    regex: "[^/]+".into(),
                    name: "num".into(),
                },
            ]
        );
    }

    #[test]
    fn test_host_pattern() {
        let route = Route::new("/{path}").with_host("{locale}.example.com");
        let compiled = compile(&route);
        let host = compiled.host_regex().unwrap();
        assert_eq!(host.as_str(), r"(?si)^(?P<locale>[^\.]+)\.example\.com$");
        assert!(host.is_match("EN.Example.com"));
        assert_eq!(compiled.host_variables(), ["locale"]);
        assert_eq!(compiled.variables(), ["locale", "path"]);
    }

    #[test]
    fn test_host_and_path_share_variable() {
        let route = Route::new("/{locale}").with_host("{locale}.example.com");
        let compiled = compile(&route);
        assert_eq!(compiled.variables(), ["locale"]);
    }

    #[test]
    fn test_malformed_patterns() {
        for path in [
            "/foo/{bar",
            "/foo/bar}",
            "/foo/{}",
            "/foo/{1abc}",
            "/foo/{a-b}",
            "/foo/{a{b}}",
            "/{id}/{id}",
        ] {
            assert!(
                matches!(compile_err(path), RouterError::MalformedPattern { .. }),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_variable_name_too_long() {
        let path = format!("/{{{}}}", "a".repeat(33));
        assert!(matches!(
            compile_err(&path),
            RouterError::MalformedPattern { .. }
        ));
    }

    #[test]
    fn test_invalid_requirement_regex() {
        let route = Route::new("/{id}").with_requirement("id", "(").unwrap();
        assert!(matches!(
            DefaultCompiler.compile(&route),
            Err(RouterError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_static_prefix_is_a_prefix_of_every_match() {
        let route = Route::new("/archive/{year}/{month}")
            .with_requirement("year", r"\d{4}")
            .unwrap()
            .with_default("month", "01");
        let compiled = compile(&route);
        for path in ["/archive/2024", "/archive/2024/05"] {
            assert!(compiled.regex().is_match(path));
            assert!(path.starts_with(compiled.static_prefix()));
        }
    }
}
