//! HTTP response type.

use std::collections::{BTreeMap, HashMap};

use crate::cookie::Cookie;

const CONTENT_TYPE: &str = "Content-Type";

/// Reason phrase for the statuses the kernel produces.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Cookies to send, keyed by name.
    pub cookies: BTreeMap<String, Cookie>,
}

impl Response {
    /// An empty response.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
            cookies: BTreeMap::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// 200 with a `text/html` body.
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .header(CONTENT_TYPE, "text/html; charset=utf-8")
            .body(body.into())
    }

    /// 200 with a serialized JSON body, or 500 if serialization fails.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::ok().header(CONTENT_TYPE, "application/json").body(body),
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize response body");
                Self::error(500, reason_phrase(500))
            }
        }
    }

    /// 200 with a `text/plain` body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok()
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body.into())
    }

    /// 302 to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(302).header("Location", location)
    }

    /// Plain text error page.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::text(message).status(status)
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.set_cookie(cookie);
        self
    }

    /// Adds a cookie, replacing any earlier one with the same name.
    pub fn set_cookie(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.name().to_string(), cookie);
    }

    /// Tells the client to drop a cookie set on `path` and `domain`.
    pub fn remove_cookie(&mut self, name: &str, path: &str, domain: Option<&str>) {
        let Ok(cookie) = Cookie::new(name, "") else {
            tracing::warn!(cookie = name, "cannot clear an invalid cookie name");
            return;
        };
        let cookie = cookie.with_path(path);
        let cookie = match domain {
            Some(domain) => cookie.with_domain(domain),
            None => cookie,
        };
        self.set_cookie(cookie);
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// One `Set-Cookie` header value per cookie.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.cookies.values().map(ToString::to_string).collect()
    }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The body, if it is valid UTF-8.
    pub fn body_string(&self) -> Option<String> {
        std::str::from_utf8(&self.body).ok().map(str::to_string)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn reason(&self) -> &'static str {
        reason_phrase(self.status)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}
