//! Main router implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::compiled::{CompiledRoute, Token};
use crate::compiler::{ascii_classes, DefaultCompiler, RouteCompiler};
use crate::context::{RequestContext, RoleChecker};
use crate::error::{Result, RouterError};
use crate::generator::{build_query, encode_path, relative_path, ReferenceType};
use crate::route::{Route, COMPILER_OPTION};

/// Parameters passed to URL generation.
pub type Parameters = BTreeMap<String, String>;

/// Key holding the matched route name in a match result.
pub const ROUTE_PARAMETER: &str = "_route";

/// The outcome of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    name: String,
    params: BTreeMap<String, String>,
}

impl RouteMatch {
    /// Name of the matched route.
    pub fn route_name(&self) -> &str {
        &self.name
    }

    /// Gets a parameter: a captured variable, a default or `_route`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// All parameters of the match.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Iterates over the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the match, returning its parameters.
    pub fn into_params(self) -> BTreeMap<String, String> {
        self.params
    }
}

#[derive(Debug, Clone)]
struct RouteEntry {
    name: String,
    route: Route,
    compiled: CompiledRoute,
}

/// An ordered collection of named routes.
///
/// Matching is first-match-wins in insertion order. Routes are compiled when
/// they are added, so a malformed pattern is reported at registration.
///
/// # Example
///
/// ```
/// use lwf_router::{AllowAll, RequestContext, Route, Router};
///
/// let mut router = Router::new();
/// router
///     .add_route(
///         "user_show",
///         Route::new("/user/{id}").with_requirement("id", r"\d+").unwrap(),
///     )
///     .unwrap();
///
/// let matched = router
///     .match_request(&RequestContext::get("/user/42"), &AllowAll)
///     .unwrap();
/// assert_eq!(matched.get("id"), Some("42"));
/// assert_eq!(matched.get("_route"), Some("user_show"));
/// ```
#[derive(Debug, Clone)]
pub struct Router {
    entries: Vec<RouteEntry>,
    compilers: HashMap<String, Arc<dyn RouteCompiler>>,
    default_compiler: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty router using [`DefaultCompiler`].
    pub fn new() -> Self {
        let mut compilers: HashMap<String, Arc<dyn RouteCompiler>> = HashMap::new();
        compilers.insert(DefaultCompiler::NAME.to_string(), Arc::new(DefaultCompiler));
        Self {
            entries: Vec::new(),
            compilers,
            default_compiler: DefaultCompiler::NAME.to_string(),
        }
    }

    /// Registers a compiler under a name usable in the `compiler` route option.
    #[must_use]
    pub fn with_compiler(mut self, name: &str, compiler: impl RouteCompiler + 'static) -> Self {
        self.compilers.insert(name.to_string(), Arc::new(compiler));
        self
    }

    /// Selects the compiler for routes without a `compiler` option.
    pub fn with_default_compiler(mut self, name: &str) -> Result<Self> {
        if !self.compilers.contains_key(name) {
            return Err(RouterError::UnknownCompiler(name.to_string()));
        }
        self.default_compiler = name.to_string();
        Ok(self)
    }

    /// Name of the compiler used for routes without a `compiler` option.
    pub fn default_compiler(&self) -> &str {
        &self.default_compiler
    }

    /// Adds a route, replacing any route with the same name.
    ///
    /// A replaced route loses its position and is matched last. The route is
    /// always compiled again with the compiler its `compiler` option names.
    pub fn add_route(&mut self, name: &str, mut route: Route) -> Result<()> {
        if !route.has_option(COMPILER_OPTION) {
            route.set_option(COMPILER_OPTION, self.default_compiler.as_str());
        }
        let compiler_name = route
            .option(COMPILER_OPTION)
            .unwrap_or(self.default_compiler.as_str())
            .to_string();
        let compiler = self
            .compilers
            .get(&compiler_name)
            .ok_or(RouterError::UnknownCompiler(compiler_name))?;
        let compiled = route.recompile(compiler.as_ref())?.clone();

        debug!(route = name, path = route.path(), "registered route");

        self.entries.retain(|entry| entry.name != name);
        self.entries.push(RouteEntry {
            name: name.to_string(),
            route,
            compiled,
        });
        Ok(())
    }

    /// Adds several routes in order.
    pub fn add_routes<I, S>(&mut self, routes: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, Route)>,
        S: AsRef<str>,
    {
        for (name, route) in routes {
            self.add_route(name.as_ref(), route)?;
        }
        Ok(())
    }

    /// Removes a route. Returns it if it existed.
    pub fn remove_route(&mut self, name: &str) -> Option<Route> {
        let index = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(index).route)
    }

    /// Removes every route.
    pub fn remove_all_routes(&mut self) {
        self.entries.clear();
    }

    /// Gets a route by name.
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.entry(name).map(|entry| &entry.route)
    }

    /// Gets the compiled form of a route by name.
    pub fn compiled_route(&self, name: &str) -> Option<&CompiledRoute> {
        self.entry(name).map(|entry| &entry.compiled)
    }

    /// Iterates over routes in matching order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.route))
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the router has no routes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Finds the first route matching the request.
    ///
    /// When nothing matches, a route rejected for its method wins over one
    /// rejected for its roles, which wins over a plain miss.
    pub fn match_request(
        &self,
        ctx: &RequestContext,
        user: &dyn RoleChecker,
    ) -> Result<RouteMatch> {
        let path = match ctx.path_info.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        let method = match ctx.method.to_uppercase().as_str() {
            "HEAD" => "GET".to_string(),
            other => other.to_string(),
        };

        let mut allowed: Vec<String> = Vec::new();
        let mut role_rejected = false;

        for entry in &self.entries {
            let compiled = &entry.compiled;
            let prefix = compiled.static_prefix();
            if !prefix.is_empty() && !path.starts_with(prefix) {
                continue;
            }

            let Some(captures) = compiled.regex().captures(path) else {
                continue;
            };

            let host_captures = match compiled.host_regex() {
                Some(host_regex) => match host_regex.captures(&ctx.host) {
                    Some(captures) => Some(captures),
                    None => continue,
                },
                None => None,
            };

            let methods = entry.route.methods();
            if !methods.is_empty() && !methods.contains(&method) {
                for m in methods {
                    if !allowed.contains(m) {
                        allowed.push(m.clone());
                    }
                }
                continue;
            }

            let roles = entry.route.roles();
            if !roles.is_empty() && !roles.iter().any(|role| user.has_role(role)) {
                role_rejected = true;
                continue;
            }

            let mut params = entry.route.defaults().clone();
            for name in compiled.path_variables() {
                if let Some(value) = captures.name(name) {
                    params.insert(name.clone(), value.as_str().to_string());
                }
            }
            if let Some(host_captures) = host_captures {
                for name in compiled.host_variables() {
                    if let Some(value) = host_captures.name(name) {
                        params.insert(name.clone(), value.as_str().to_string());
                    }
                }
            }
            params.insert(ROUTE_PARAMETER.to_string(), entry.name.clone());

            debug!(route = %entry.name, path, method = %method, "route matched");
            return Ok(RouteMatch {
                name: entry.name.clone(),
                params,
            });
        }

        if !allowed.is_empty() {
            debug!(path, method = %method, ?allowed, "method not allowed");
            return Err(RouterError::MethodNotAllowed {
                method: ctx.method.clone(),
                path: path.to_string(),
                allowed,
            });
        }

        if role_rejected {
            debug!(path, "access denied");
            return Err(RouterError::AccessDenied(path.to_string()));
        }

        debug!(path, "no route found");
        Err(RouterError::RouteNotFound(format!(
            "no route found for {method} {path}"
        )))
    }

    /// Generates a URL for a named route.
    ///
    /// Values come from the route defaults, then the context attributes, then
    /// `params`. Trailing variables equal to their default are left out.
    /// Parameters that are neither variables nor defaults end up in the query
    /// string.
    pub fn generate(
        &self,
        ctx: &RequestContext,
        name: &str,
        params: &Parameters,
        reference: ReferenceType,
    ) -> Result<String> {
        let entry = self
            .entry(name)
            .ok_or_else(|| RouterError::RouteNotFound(format!("no route named \"{name}\"")))?;
        let route = &entry.route;
        let compiled = &entry.compiled;
        let defaults = route.defaults();

        let mut merged: BTreeMap<&str, &str> = BTreeMap::new();
        for (key, value) in defaults.iter().chain(&ctx.attributes).chain(params) {
            merged.insert(key, value);
        }

        let missing: Vec<String> = compiled
            .variables()
            .iter()
            .filter(|variable| !merged.contains_key(variable.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(RouterError::MissingMandatoryParameters {
                route: name.to_string(),
                missing,
            });
        }

        let mut url = String::new();
        let mut optional = true;
        for token in compiled.tokens().iter().rev() {
            match token {
                Token::Variable {
                    prefix,
                    regex,
                    name: variable,
                } => {
                    let value = merged.get(variable.as_str()).copied().unwrap_or_default();
                    let is_default = route.default_value(variable) == Some(value);
                    if !optional || !is_default {
                        check_requirement(name, variable, regex, value)?;
                        url = format!("{prefix}{value}{url}");
                        optional = false;
                    }
                }
                Token::Text(text) => {
                    url = format!("{text}{url}");
                    optional = false;
                }
            }
        }
        if url.is_empty() {
            url.push('/');
        }
        let url = encode_path(&url);

        let mut reference = reference;
        let mut scheme_authority = String::new();
        if !ctx.host.is_empty() {
            let mut scheme = ctx.scheme.to_lowercase();
            if !route.has_scheme(&scheme) {
                if let Some(required) = route.schemes().first() {
                    scheme.clone_from(required);
                    reference = ReferenceType::AbsoluteUrl;
                }
            }

            let mut host = ctx.host.clone();
            if !compiled.host_tokens().is_empty() {
                let route_host = build_host(name, compiled.host_tokens(), &merged)?;
                if !route_host.eq_ignore_ascii_case(&host) {
                    host = route_host;
                    if reference != ReferenceType::AbsoluteUrl {
                        reference = ReferenceType::NetworkPath;
                    }
                }
            }

            if matches!(
                reference,
                ReferenceType::AbsoluteUrl | ReferenceType::NetworkPath
            ) {
                let port = if scheme != ctx.scheme.to_lowercase() || ctx.is_default_port(&scheme) {
                    String::new()
                } else {
                    format!(":{}", ctx.port)
                };
                scheme_authority = if reference == ReferenceType::NetworkPath {
                    format!("//{host}{port}")
                } else {
                    format!("{scheme}://{host}{port}")
                };
            }
        }

        let mut url = if reference == ReferenceType::RelativePath {
            relative_path(&ctx.path_info, &url)
        } else {
            format!(
                "{scheme_authority}{}{url}",
                ctx.base_url.trim_end_matches('/')
            )
        };

        let extra: Vec<(&str, &str)> = params
            .iter()
            .filter(|(key, _)| {
                key.as_str() != ROUTE_PARAMETER
                    && !compiled.variables().contains(key)
                    && !defaults.contains_key(key.as_str())
            })
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        if !extra.is_empty() {
            url.push('?');
            url.push_str(&build_query(extra));
        }

        debug!(route = name, %url, "generated url");
        Ok(url)
    }
}

fn build_host(route: &str, tokens: &[Token], merged: &BTreeMap<&str, &str>) -> Result<String> {
    let mut host = String::new();
    for token in tokens.iter().rev() {
        match token {
            Token::Variable {
                prefix,
                regex,
                name,
            } => {
                let value = merged.get(name.as_str()).copied().unwrap_or_default();
                check_requirement(route, name, regex, value)?;
                host = format!("{prefix}{value}{host}");
            }
            Token::Text(text) => host = format!("{text}{host}"),
        }
    }
    Ok(host)
}

fn check_requirement(route: &str, parameter: &str, pattern: &str, value: &str) -> Result<()> {
    let regex = Regex::new(&format!("^(?:{})$", ascii_classes(pattern))).map_err(|source| {
        RouterError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        }
    })?;
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(RouterError::InvalidParameter {
            parameter: parameter.to_string(),
            route: route.to_string(),
            pattern: pattern.to_string(),
            value: value.to_string(),
        })
    }
}
