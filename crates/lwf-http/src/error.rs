//! Error types for request handling.

use std::collections::HashMap;

use lwf_router::RouterError;
use thiserror::Error;

use crate::response::{reason_phrase, Response};

/// Errors raised while handling a request, each tied to an HTTP status.
#[derive(Debug, Error)]
pub enum HttpError {
    /// No route for the request.
    #[error("{0}")]
    NotFound(String),

    /// A route matched the path but not the method.
    #[error("{message}")]
    MethodNotAllowed {
        message: String,
        allowed: Vec<String>,
    },

    /// A route matched but the user lacks its roles.
    #[error("{0}")]
    AccessDenied(String),

    /// The matched route names a handler that was never registered.
    #[error("no handler registered for {0}")]
    HandlerNotFound(String),

    /// URL generation was asked of a request no kernel dispatched.
    #[error("the request carries no router")]
    RouterUnavailable,

    /// A cookie could not be built.
    #[error("invalid cookie: {0}")]
    InvalidCookie(String),

    /// Configuration key lookup failed.
    #[error("key {0} doesn't exist")]
    MissingKey(String),

    /// Any other status, with a message.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Routing failure other than a failed match.
    #[error(transparent)]
    Router(RouterError),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HttpError {
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::AccessDenied(_) => 403,
            Self::Status { status, .. } => *status,
            Self::HandlerNotFound(_)
            | Self::RouterUnavailable
            | Self::InvalidCookie(_)
            | Self::MissingKey(_)
            | Self::Router(_)
            | Self::Json(_) => 500,
        }
    }

    /// Headers the error response must carry.
    pub fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if let Self::MethodNotAllowed { allowed, .. } = self {
            headers.insert("Allow".to_string(), allowed.join(", "));
        }
        headers
    }

    /// Renders the error. The message is only shown in debug mode.
    pub fn to_response(&self, debug: bool) -> Response {
        let status = self.status();
        let body = if debug {
            self.to_string()
        } else {
            reason_phrase(status).to_string()
        };
        let mut response = Response::error(status, body);
        response.headers.extend(self.headers());
        response
    }
}

impl From<RouterError> for HttpError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::RouteNotFound(_) => Self::NotFound(err.to_string()),
            RouterError::MethodNotAllowed { ref allowed, .. } => Self::MethodNotAllowed {
                allowed: allowed.clone(),
                message: err.to_string(),
            },
            RouterError::AccessDenied(_) => Self::AccessDenied(err.to_string()),
            other => Self::Router(other),
        }
    }
}

/// Result type alias for request handling.
pub type Result<T> = std::result::Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_error_mapping() {
        let err = HttpError::from(RouterError::RouteNotFound("/nowhere".into()));
        assert_eq!(err.status(), 404);

        let err = HttpError::from(RouterError::MethodNotAllowed {
            method: "DELETE".into(),
            path: "/posts".into(),
            allowed: vec!["GET".into(), "POST".into()],
        });
        assert_eq!(err.status(), 405);
        assert_eq!(err.headers().get("Allow").map(String::as_str), Some("GET, POST"));

        let err = HttpError::from(RouterError::AccessDenied("/admin".into()));
        assert_eq!(err.status(), 403);

        let err = HttpError::from(RouterError::UnknownCompiler("fancy".into()));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_debug_body() {
        let err = HttpError::HandlerNotFound("blog::index".into());
        let quiet = err.to_response(false);
        assert_eq!(quiet.status, 500);
        assert_eq!(quiet.body_string().as_deref(), Some("Internal Server Error"));

        let loud = err.to_response(true);
        assert_eq!(
            loud.body_string().as_deref(),
            Some("no handler registered for blog::index")
        );
    }
}
