//! Compiled form of a route.

use regex::Regex;

/// A piece of a route pattern.
///
/// Tokens are kept in source order. URL generation walks them backwards so
/// that trailing optional variables can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, emitted as-is.
    Text(String),
    /// A `{name}` placeholder.
    Variable {
        /// Separator character preceding the placeholder, or empty.
        prefix: String,
        /// Requirement the value must satisfy.
        regex: String,
        /// Variable name.
        name: String,
    },
}

impl Token {
    /// Returns the variable name when this is a variable token.
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Self::Variable { name, .. } => Some(name),
            Self::Text(_) => None,
        }
    }
}

/// Immutable artifact derived from a [`Route`](crate::Route).
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub(crate) static_prefix: String,
    pub(crate) regex: Regex,
    pub(crate) tokens: Vec<Token>,
    pub(crate) path_variables: Vec<String>,
    pub(crate) host_regex: Option<Regex>,
    pub(crate) host_tokens: Vec<Token>,
    pub(crate) host_variables: Vec<String>,
    pub(crate) variables: Vec<String>,
}

impl CompiledRoute {
    /// Builds a compiled route from its parts.
    ///
    /// `variables` should hold the host variables followed by the path
    /// variables, without duplicates.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        static_prefix: String,
        regex: Regex,
        tokens: Vec<Token>,
        path_variables: Vec<String>,
        host_regex: Option<Regex>,
        host_tokens: Vec<Token>,
        host_variables: Vec<String>,
        variables: Vec<String>,
    ) -> Self {
        Self {
            static_prefix,
            regex,
            tokens,
            path_variables,
            host_regex,
            host_tokens,
            host_variables,
            variables,
        }
    }

    /// Longest literal run before the first path variable.
    pub fn static_prefix(&self) -> &str {
        &self.static_prefix
    }

    /// Anchored regex matching the path.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Path tokens in source order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Variables of the path pattern, in source order.
    pub fn path_variables(&self) -> &[String] {
        &self.path_variables
    }

    /// Anchored, case-insensitive regex matching the host, if the route has a
    /// host pattern.
    pub fn host_regex(&self) -> Option<&Regex> {
        self.host_regex.as_ref()
    }

    /// Host tokens in source order, empty without a host pattern.
    pub fn host_tokens(&self) -> &[Token] {
        &self.host_tokens
    }

    /// Variables of the host pattern, in source order.
    pub fn host_variables(&self) -> &[String] {
        &self.host_variables
    }

    /// Every variable of the route, host variables first.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}
