//! Cookies sent with a response.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{HttpError, Result};

/// Bytes left as-is in cookie names and values; space becomes `+`.
const COOKIE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

const EXPIRES_FORMAT: &str = "%a, %d-%b-%Y %H:%M:%S GMT";

/// A `Set-Cookie` entry.
///
/// Cookies default to path `/`, no domain, not secure and HTTP only. A
/// cookie with an empty value tells the client to drop it.
///
/// ```
/// use lwf_http::Cookie;
///
/// let cookie = Cookie::new("theme", "dark mode").unwrap().with_path("/app");
/// assert_eq!(cookie.to_string(), "theme=dark+mode; path=/app; httponly");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
}

impl Cookie {
    /// Creates a session cookie. Fails on an empty name or one holding
    /// `=`, `,`, `;` or whitespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(HttpError::InvalidCookie(
                "the cookie name cannot be empty".to_string(),
            ));
        }
        if name
            .chars()
            .any(|c| matches!(c, '=' | ',' | ';' | ' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c'))
        {
            return Err(HttpError::InvalidCookie(format!(
                "the cookie name \"{name}\" contains invalid characters"
            )));
        }
        Ok(Self {
            name,
            value: value.into(),
            expires: None,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
        })
    }

    #[must_use]
    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// An empty path falls back to `/`.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.is_empty() { "/".to_string() } else { path };
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expiry time; `None` for a cookie that lasts the browser session.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Whether the cookie has already expired.
    pub fn is_cleared(&self) -> bool {
        self.expires.is_some_and(|expires| expires < Utc::now())
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", url_encode(&self.name))?;
        if self.value.is_empty() {
            let past = Utc::now() - Duration::seconds(31_536_001);
            write!(f, "deleted; expires={}", past.format(EXPIRES_FORMAT))?;
        } else {
            write!(f, "{}", url_encode(&self.value))?;
            if let Some(expires) = self.expires {
                write!(f, "; expires={}", expires.format(EXPIRES_FORMAT))?;
            }
        }
        if self.path != "/" {
            write!(f, "; path={}", self.path)?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; domain={domain}")?;
        }
        if self.secure {
            f.write_str("; secure")?;
        }
        if self.http_only {
            f.write_str("; httponly")?;
        }
        Ok(())
    }
}

fn url_encode(s: &str) -> String {
    utf8_percent_encode(s, COOKIE_ENCODE_SET)
        .to_string()
        .replace("%20", "+")
}
