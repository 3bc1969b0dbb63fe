//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route matched the request, or the requested route name is unknown.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// At least one route matched the path but none accepted the method.
    #[error("method {method} not allowed for {path} (allowed: {})", allowed.join(", "))]
    MethodNotAllowed {
        method: String,
        path: String,
        allowed: Vec<String>,
    },

    /// A route matched but the user holds none of its roles.
    #[error("access denied to route {0}")]
    AccessDenied(String),

    /// URL generation lacks values for some route variables.
    #[error(
        "some mandatory parameters are missing (\"{}\") to generate a URL for route \"{route}\"",
        missing.join("\", \"")
    )]
    MissingMandatoryParameters { route: String, missing: Vec<String> },

    /// A parameter value does not satisfy its requirement.
    #[error(
        "parameter \"{parameter}\" for route \"{route}\" must match \"{pattern}\" (\"{value}\" given)"
    )]
    InvalidParameter {
        parameter: String,
        route: String,
        pattern: String,
        value: String,
    },

    /// The path or host pattern cannot be parsed.
    #[error("malformed pattern {pattern:?}: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// A requirement is empty once its anchors are removed.
    #[error("routing requirement for \"{0}\" cannot be empty")]
    EmptyRequirement(String),

    /// The assembled regex was rejected by the regex engine.
    #[error("invalid regex for pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A route asked for a compiler the router does not know.
    #[error("unknown route compiler: {0}")]
    UnknownCompiler(String),

    /// A route table could not be decoded.
    #[error("invalid route definition: {0}")]
    Definition(#[from] serde_json::Error),
}

impl RouterError {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
