//! HTTP request type.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use lwf_auth::User;
use lwf_router::{Parameters, ReferenceType, RequestContext, Router};
use percent_encoding::percent_decode_str;

use crate::error::{HttpError, Result};
use crate::response::Response;
use crate::session::Session;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Parses a method, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Whether the method leaves server state untouched.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An HTTP request.
///
/// `path` is the path info below `base_url`, the prefix the application is
/// mounted on. Route parameters land in `attributes` once the request has
/// been matched.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL.
    pub path: String,
    pub host: String,
    pub scheme: String,
    pub port: u16,
    pub base_url: String,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Values attached while handling, such as route parameters.
    pub attributes: BTreeMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
    /// The user making the request.
    pub user: User,
    /// Session attached by a kernel with a session store.
    pub session: Option<Session>,
    /// Router of the kernel dispatching the request.
    pub router: Option<Arc<Router>>,
}

impl Request {
    /// Creates a new request for `localhost` over plain HTTP.
    ///
    /// A query string in `target` is parsed into [`Request::query`].
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Self::parse_query_string(query)),
            None => (target, HashMap::new()),
        };
        Self {
            method,
            path: path.to_string(),
            host: "localhost".to_string(),
            scheme: "http".to_string(),
            port: 80,
            base_url: String::new(),
            query,
            headers: HashMap::new(),
            attributes: BTreeMap::new(),
            body: Vec::new(),
            user: User::anonymous(),
            session: None,
            router: None,
        }
    }

    /// Creates a GET request.
    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    /// Creates a POST request.
    pub fn post(target: &str) -> Self {
        Self::new(Method::Post, target)
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the scheme and its default port.
    #[must_use]
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_lowercase();
        self.port = if self.scheme == "https" { 443 } else { 80 };
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

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Appends a cookie to the `Cookie` header.
    #[must_use]
    pub fn with_cookie(self, name: &str, value: &str) -> Self {
        let line = match self.get_header("Cookie") {
            Some(existing) if !existing.is_empty() => format!("{existing}; {name}={value}"),
            _ => format!("{name}={value}"),
        };
        self.header("Cookie", line)
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Gets a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Cookies sent by the client. Values are URL-decoded; the first of
    /// duplicate names wins.
    pub fn cookies(&self) -> BTreeMap<String, String> {
        let mut cookies = BTreeMap::new();
        let Some(header) = self.get_header("Cookie") else {
            return cookies;
        };
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            cookies
                .entry(name.to_string())
                .or_insert_with(|| form_decode(value.trim().trim_matches('"')));
        }
        cookies
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies().remove(name)
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies().contains_key(name)
    }

    /// The session, when the kernel has a session store.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Absolute URL (scheme and host included) of a named route.
    pub fn generate_url(&self, name: &str, params: &Parameters) -> Result<String> {
        self.generate(name, params, ReferenceType::AbsoluteUrl)
    }

    /// Absolute path of a named route.
    pub fn generate_path(&self, name: &str, params: &Parameters) -> Result<String> {
        self.generate(name, params, ReferenceType::AbsolutePath)
    }

    /// A 302 response to the absolute URL of a named route.
    pub fn redirect_to_route(&self, name: &str, params: &Parameters) -> Result<Response> {
        Ok(Response::redirect(self.generate_url(name, params)?))
    }

    fn generate(
        &self,
        name: &str,
        params: &Parameters,
        reference: ReferenceType,
    ) -> Result<String> {
        let router = self.router.as_ref().ok_or(HttpError::RouterUnavailable)?;
        router
            .generate(&self.context(), name, params, reference)
            .map_err(HttpError::Router)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Adds attributes, overwriting existing keys.
    pub fn add_attributes<I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.attributes.extend(attributes);
    }

    pub fn is_xml_http_request(&self) -> bool {
        self.get_header("X-Requested-With") == Some("XMLHttpRequest")
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }

    /// The host, followed by the port unless it is the scheme default.
    pub fn http_host(&self) -> String {
        let default_port = if self.is_secure() { 443 } else { 80 };
        if self.port == default_port {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(
        &self,
    ) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The routing view of this request.
    pub fn context(&self) -> RequestContext {
        RequestContext {
            method: self.method.as_str().to_string(),
            path_info: self.path.clone(),
            host: self.host.clone(),
            scheme: self.scheme.clone(),
            port: self.port,
            base_url: self.base_url.clone(),
            attributes: self.attributes.clone(),
        }
    }

    /// Parses query parameters from a query string.
    pub fn parse_query_string(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (form_decode(key), form_decode(value))
            })
            .collect()
    }
}

fn form_decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
