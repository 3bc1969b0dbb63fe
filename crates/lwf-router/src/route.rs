//! Route definition.

use std::collections::BTreeMap;

use crate::compiled::CompiledRoute;
use crate::compiler::RouteCompiler;
use crate::error::{Result, RouterError};

/// Requirement key mirroring the scheme list.
pub const SCHEME_REQUIREMENT: &str = "_scheme";
/// Requirement key mirroring the method list.
pub const METHOD_REQUIREMENT: &str = "_method";
/// Requirement key holding pipe-separated role names.
pub const ROLES_REQUIREMENT: &str = "_roles";
/// Option naming the compiler used for a route.
pub const COMPILER_OPTION: &str = "compiler";

/// A route: a path pattern plus the constraints and defaults used to match
/// requests against it and to generate URLs from it.
///
/// Any change to a route drops its compiled form; [`Route::compile`]
/// rebuilds it on demand.
///
/// # Example
///
/// ```
/// use lwf_router::Route;
///
/// let route = Route::new("/user/{id}")
///     .with_requirement("id", r"^\d+$")
///     .unwrap()
///     .with_methods(["get"]);
///
/// assert_eq!(route.requirement("id"), Some(r"\d+"));
/// assert_eq!(route.methods(), ["GET"]);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    host: String,
    schemes: Vec<String>,
    methods: Vec<String>,
    defaults: BTreeMap<String, String>,
    requirements: BTreeMap<String, String>,
    options: BTreeMap<String, String>,
    compiled: Option<CompiledRoute>,
}

impl Route {
    /// Creates a route for the given path pattern.
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            host: String::new(),
            schemes: Vec::new(),
            methods: Vec::new(),
            defaults: BTreeMap::new(),
            requirements: BTreeMap::new(),
            options: BTreeMap::new(),
            compiled: None,
        }
    }

    /// Sets the host pattern.
    #[must_use]
    pub fn with_host(mut self, host: &str) -> Self {
        self.set_host(host);
        self
    }

    /// Restricts the route to the given schemes.
    #[must_use]
    pub fn with_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_schemes(schemes);
        self
    }

    /// Restricts the route to the given HTTP methods.
    #[must_use]
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_methods(methods);
        self
    }

    /// Sets a default value.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_default(name, value);
        self
    }

    /// Adds several default values.
    #[must_use]
    pub fn with_defaults<I, K, V>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add_defaults(defaults);
        self
    }

    /// Adds a requirement.
    pub fn with_requirement(mut self, key: &str, regex: &str) -> Result<Self> {
        self.set_requirement(key, regex)?;
        Ok(self)
    }

    /// Adds several requirements.
    pub fn with_requirements<'a, I>(mut self, requirements: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.add_requirements(requirements)?;
        Ok(self)
    }

    /// Restricts the route to users holding at least one of the roles.
    pub fn with_roles<I, S>(self, roles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = roles
            .into_iter()
            .map(|r| r.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("|");
        self.with_requirement(ROLES_REQUIREMENT, &joined)
    }

    /// Sets an option.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_option(name, value);
        self
    }

    /// Returns the path pattern.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sets the path pattern.
    ///
    /// The pattern is trimmed and always starts with exactly one slash, so a
    /// generated path can never be mistaken for a network path.
    pub fn set_path(&mut self, pattern: &str) -> &mut Self {
        self.path = normalize_path(pattern);
        self.compiled = None;
        self
    }

    /// Returns the host pattern, empty when any host is accepted.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sets the host pattern. Placeholders work as in the path.
    pub fn set_host(&mut self, pattern: &str) -> &mut Self {
        self.host = pattern.trim().to_string();
        self.compiled = None;
        self
    }

    /// Returns the lower-cased schemes. Empty means any scheme.
    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    /// Replaces the allowed schemes and the `_scheme` requirement.
    pub fn set_schemes<I, S>(&mut self, schemes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.schemes = collect_unique(schemes, str::to_lowercase);
        sync_requirement(&mut self.requirements, SCHEME_REQUIREMENT, &self.schemes);
        self.compiled = None;
        self
    }

    /// Returns whether the scheme is allowed by this route.
    pub fn has_scheme(&self, scheme: &str) -> bool {
        let scheme = scheme.to_lowercase();
        self.schemes.is_empty() || self.schemes.contains(&scheme)
    }

    /// Returns the upper-cased methods. Empty means any method.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Replaces the allowed methods and the `_method` requirement.
    pub fn set_methods<I, S>(&mut self, methods: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = collect_unique(methods, str::to_uppercase);
        sync_requirement(&mut self.requirements, METHOD_REQUIREMENT, &self.methods);
        self.compiled = None;
        self
    }

    /// Returns the default values.
    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    /// Replaces all defaults.
    pub fn set_defaults<I, K, V>(&mut self, defaults: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.defaults.clear();
        self.add_defaults(defaults)
    }

    /// Adds default values, keeping the others.
    pub fn add_defaults<I, K, V>(&mut self, defaults: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in defaults {
            self.defaults.insert(name.into(), value.into());
        }
        self.compiled = None;
        self
    }

    /// Sets one default value.
    pub fn set_default(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.defaults.insert(name.into(), value.into());
        self.compiled = None;
        self
    }

    /// Returns the default value of a variable.
    pub fn default_value(&self, name: &str) -> Option<&str> {
        self.defaults.get(name).map(String::as_str)
    }

    /// Returns whether a variable has a default value.
    pub fn has_default(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
    }

    /// Returns the requirements, without anchors.
    pub fn requirements(&self) -> &BTreeMap<String, String> {
        &self.requirements
    }

    /// Replaces all requirements, including the scheme and method mirrors.
    pub fn set_requirements<'a, I>(&mut self, requirements: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.requirements.clear();
        self.schemes.clear();
        self.methods.clear();
        self.add_requirements(requirements)
    }

    /// Adds requirements, keeping the others.
    pub fn add_requirements<'a, I>(&mut self, requirements: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, regex) in requirements {
            self.set_requirement(key, regex)?;
        }
        Ok(self)
    }

    /// Sets the requirement for a key.
    ///
    /// A leading `^` and a trailing `$` are removed. The `_scheme` and
    /// `_method` keys also replace the scheme and method lists.
    pub fn set_requirement(&mut self, key: &str, regex: &str) -> Result<&mut Self> {
        let regex = sanitize_requirement(key, regex)?;
        match key {
            SCHEME_REQUIREMENT => {
                self.set_schemes(regex.split('|'));
            }
            METHOD_REQUIREMENT => {
                self.set_methods(regex.split('|'));
            }
            _ => {
                self.requirements.insert(key.to_string(), regex.to_string());
                self.compiled = None;
            }
        }
        Ok(self)
    }

    /// Returns the requirement for a key.
    pub fn requirement(&self, key: &str) -> Option<&str> {
        self.requirements.get(key).map(String::as_str)
    }

    /// Returns whether a key has a requirement.
    pub fn has_requirement(&self, key: &str) -> bool {
        self.requirements.contains_key(key)
    }

    /// Returns the roles from the `_roles` requirement.
    pub fn roles(&self) -> Vec<&str> {
        self.requirement(ROLES_REQUIREMENT)
            .map(|roles| roles.split('|').filter(|r| !r.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Returns the options.
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Replaces all options.
    pub fn set_options<I, K, V>(&mut self, options: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options.clear();
        self.add_options(options)
    }

    /// Adds options, keeping the others.
    pub fn add_options<I, K, V>(&mut self, options: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in options {
            self.options.insert(name.into(), value.into());
        }
        self.compiled = None;
        self
    }

    /// Sets one option.
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.options.insert(name.into(), value.into());
        self.compiled = None;
        self
    }

    /// Returns an option value.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Returns whether an option is set.
    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Returns the compiled form if it is up to date.
    pub fn compiled(&self) -> Option<&CompiledRoute> {
        self.compiled.as_ref()
    }

    /// Compiles the route, reusing the cached result when nothing changed.
    pub fn compile(&mut self, compiler: &dyn RouteCompiler) -> Result<&CompiledRoute> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => compiler.compile(self)?,
        };
        Ok(&*self.compiled.insert(compiled))
    }

    /// Compiles the route with `compiler`, discarding any cached result.
    pub fn recompile(&mut self, compiler: &dyn RouteCompiler) -> Result<&CompiledRoute> {
        self.compiled = None;
        self.compile(compiler)
    }
}

fn normalize_path(pattern: &str) -> String {
    format!("/{}", pattern.trim().trim_start_matches('/'))
}

fn collect_unique<I, S>(items: I, normalize: fn(&str) -> String) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = normalize(item.as_ref().trim());
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn sync_requirement(requirements: &mut BTreeMap<String, String>, key: &str, values: &[String]) {
    if values.is_empty() {
        requirements.remove(key);
    } else {
        requirements.insert(key.to_string(), values.join("|"));
    }
}

fn sanitize_requirement<'a>(key: &str, regex: &'a str) -> Result<&'a str> {
    let regex = regex.strip_prefix('^').unwrap_or(regex);
    let regex = regex.strip_suffix('$').unwrap_or(regex);
    if regex.is_empty() {
        return Err(RouterError::EmptyRequirement(key.to_string()));
    }
    Ok(regex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::DefaultCompiler;

    #[test]
    fn test_path_normalization() {
        assert_eq!(Route::new("users").path(), "/users");
        assert_eq!(Route::new("  //users/{id}  ").path(), "/users/{id}");
        assert_eq!(Route::new("").path(), "/");
    }

    #[test]
    fn test_requirement_anchors_are_stripped() {
        let route = Route::new("/")
            .with_requirement("id", r"^\d+$")
            .unwrap()
            .with_requirement("slug", "^[a-z-]+")
            .unwrap();
        assert_eq!(route.requirement("id"), Some(r"\d+"));
        assert_eq!(route.requirement("slug"), Some("[a-z-]+"));
    }

    #[test]
    fn test_bulk_builders() {
        let route = Route::new("/blog/{page}")
            .with_defaults([("page", "1"), ("_controller", "blog::list")])
            .with_requirements([("page", r"\d+"), ("_method", "get")])
            .unwrap();
        assert_eq!(route.default_value("page"), Some("1"));
        assert_eq!(route.requirement("page"), Some(r"\d+"));
        assert_eq!(route.methods(), ["GET"]);
    }

    #[test]
    fn test_empty_requirement_rejected() {
        for regex in ["", "^", "$", "^$"] {
            let err = Route::new("/").with_requirement("id", regex).unwrap_err();
            assert!(matches!(err, RouterError::EmptyRequirement(key) if key == "id"));
        }
    }

    #[test]
    fn test_methods_mirror_requirement() {
        let mut route = Route::new("/").with_methods(["get", "Post", "GET"]);
        assert_eq!(route.methods(), ["GET", "POST"]);
        assert_eq!(route.requirement(METHOD_REQUIREMENT), Some("GET|POST"));

        route.set_requirement(METHOD_REQUIREMENT, "put|delete").unwrap();
        assert_eq!(route.methods(), ["PUT", "DELETE"]);
        assert_eq!(route.requirement(METHOD_REQUIREMENT), Some("PUT|DELETE"));

        route.set_methods(Vec::<String>::new());
        assert!(route.methods().is_empty());
        assert!(!route.has_requirement(METHOD_REQUIREMENT));
    }

    #[test]
    fn test_schemes_mirror_requirement() {
        let route = Route::new("/")
            .with_requirement(SCHEME_REQUIREMENT, "HTTPS")
            .unwrap();
        assert_eq!(route.schemes(), ["https"]);
        assert!(route.has_scheme("https"));
        assert!(!route.has_scheme("http"));
        assert!(Route::new("/").has_scheme("http"));
    }

    #[test]
    fn test_roles() {
        let route = Route::new("/admin").with_roles(["admin", "editor"]).unwrap();
        assert_eq!(route.roles(), vec!["admin", "editor"]);
        assert!(Route::new("/").roles().is_empty());
    }

    #[test]
    fn test_mutation_invalidates_compiled() {
        let compiler = DefaultCompiler;
        let mut route = Route::new("/users/{id}");
        route.compile(&compiler).unwrap();
        assert!(route.compiled().is_some());

        route.set_default("id", "1");
        assert!(route.compiled().is_none());

        let prefix = route.compile(&compiler).unwrap().static_prefix().to_string();
        assert_eq!(prefix, "/users");

        route.set_path("/people/{id}");
        assert!(route.compiled().is_none());
        assert_eq!(route.compile(&compiler).unwrap().static_prefix(), "/people");
    }

    #[test]
    fn test_set_defaults_replaces() {
        let mut route = Route::new("/").with_default("a", "1");
        route.set_defaults([("b", "2")]);
        assert!(!route.has_default("a"));
        assert_eq!(route.default_value("b"), Some("2"));
    }
}
