//! Middleware support for request/response processing.

use futures::future::BoxFuture;

use crate::request::Request;
use crate::response::Response;

/// Result of middleware processing.
pub enum MiddlewareResult {
    /// Continue to the next middleware/handler.
    Continue(Request),
    /// Stop processing and return this response.
    Response(Response),
}

/// Trait for middleware that processes requests and responses.
///
/// `before` runs in registration order once the request is routed, `after`
/// in reverse order on every response, including error responses.
pub trait Middleware: Send + Sync {
    /// Called before the request handler.
    ///
    /// Can modify the request or short-circuit with a response.
    fn before(&self, req: Request) -> BoxFuture<'_, MiddlewareResult>;

    /// Called after the request handler.
    ///
    /// Can modify the response.
    fn after(&self, res: Response) -> BoxFuture<'_, Response>;
}

/// Middleware that logs requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn before(&self, req: Request) -> BoxFuture<'_, MiddlewareResult> {
        Box::pin(async move {
            tracing::info!(
                method = %req.method,
                path = %req.path,
                route = req.attribute(lwf_router::ROUTE_PARAMETER).unwrap_or("-"),
                "request"
            );
            MiddlewareResult::Continue(req)
        })
    }

    fn after(&self, res: Response) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            tracing::info!(status = res.status, "response");
            res
        })
    }
}

/// Middleware that rejects unauthenticated users.
#[derive(Debug, Clone)]
pub struct RequireLoginMiddleware {
    login_url: String,
    exclude: Vec<String>,
}

impl RequireLoginMiddleware {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            exclude: Vec::new(),
        }
    }

    /// Route names reachable without logging in.
    #[must_use]
    pub fn exclude(mut self, routes: &[&str]) -> Self {
        self.exclude = routes.iter().map(|s| (*s).to_string()).collect();
        self
    }
}

impl Middleware for RequireLoginMiddleware {
    fn before(&self, req: Request) -> BoxFuture<'_, MiddlewareResult> {
        Box::pin(async move {
            let excluded = req
                .attribute(lwf_router::ROUTE_PARAMETER)
                .is_some_and(|route| self.exclude.iter().any(|e| e == route));
            if excluded || req.user.is_authenticated() {
                MiddlewareResult::Continue(req)
            } else {
                MiddlewareResult::Response(Response::redirect(&self.login_url))
            }
        })
    }

    fn after(&self, res: Response) -> BoxFuture<'_, Response> {
        Box::pin(async move { res })
    }
}
