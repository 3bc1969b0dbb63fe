//! The request-side inputs of matching and URL generation.

use std::collections::BTreeMap;

/// What the router needs to know about the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// HTTP method, upper-cased.
    pub method: String,
    /// Path relative to the base URL, starting with `/`.
    pub path_info: String,
    /// Host name without port. Empty when unknown.
    pub host: String,
    /// `http` or `https`.
    pub scheme: String,
    /// Port the request was received on.
    pub port: u16,
    /// Prefix the application is mounted under, e.g. `/app.php`.
    pub base_url: String,
    /// Attributes of the current request, usually the last match result.
    pub attributes: BTreeMap<String, String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            path_info: "/".to_string(),
            host: "localhost".to_string(),
            scheme: "http".to_string(),
            port: 80,
            base_url: String::new(),
            attributes: BTreeMap::new(),
        }
    }
}

impl RequestContext {
    /// Creates a context for the given method and path.
    pub fn new(method: &str, path_info: impl Into<String>) -> Self {
        Self {
            method: method.to_uppercase(),
            path_info: path_info.into(),
            ..Self::default()
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path_info: impl Into<String>) -> Self {
        Self::new("GET", path_info)
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the scheme and resets the port to its default.
    #[must_use]
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_lowercase();
        self.port = default_port(&self.scheme);
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Whether the port is the default one for the scheme.
    pub fn is_default_port(&self, scheme: &str) -> bool {
        self.port == default_port(scheme)
    }
}

fn default_port(scheme: &str) -> u16 {
    if scheme.eq_ignore_ascii_case("https") {
        443
    } else {
        80
    }
}

/// Answers role membership questions for the current user.
pub trait RoleChecker {
    /// Returns whether the user holds the role.
    fn has_role(&self, role: &str) -> bool;
}

/// A checker granting every role.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl RoleChecker for AllowAll {
    fn has_role(&self, _role: &str) -> bool {
        true
    }
}

/// A checker granting no role, e.g. for anonymous visitors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl RoleChecker for DenyAll {
    fn has_role(&self, _role: &str) -> bool {
        false
    }
}

impl<T: RoleChecker + ?Sized> RoleChecker for &T {
    fn has_role(&self, role: &str) -> bool {
        (**self).has_role(role)
    }
}

impl RoleChecker for [&str] {
    fn has_role(&self, role: &str) -> bool {
        self.contains(&role)
    }
}
