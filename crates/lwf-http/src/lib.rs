//! # lwf-http
//!
//! HTTP kernel dispatching routed requests to async handlers.
//!
//! This crate provides:
//! - `Request` and `Response` types, with cookies both ways
//! - `Session` and an in-memory `SessionStore`
//! - `HttpError`, mapping routing failures to 403/404/405 responses
//! - A JSON-valued key/value `Config`
//! - Async `Middleware`
//! - The `Kernel`, which matches a request, runs its handler and renders errors.
//!   Handlers generate URLs through the request, e.g. `redirect_to_route`.
//!
//! ## Quick Start
//!
//! ```rust
//! use lwf_auth::User;
//! use lwf_http::{Kernel, Request, Response};
//! use lwf_router::{Route, Router};
//!
//! # tokio::runtime::Builder::new_current_thread()
//! #     .build()
//! #     .unwrap()
//! #     .block_on(async {
//! let mut router = Router::new();
//! router.add_route("user_show", Route::new("/users/{id}")).unwrap();
//!
//! let kernel = Kernel::new(router).handler("user_show", |req: Request| async move {
//!     let id = req.attribute("id").unwrap_or("unknown").to_string();
//!     Ok(Response::text(format!("User: {id}")))
//! });
//!
//! let res = kernel.handle(Request::get("/users/42"), User::anonymous()).await;
//! assert_eq!(res.body_string().as_deref(), Some("User: 42"));
//!
//! let res = kernel.handle(Request::get("/nowhere"), User::anonymous()).await;
//! assert_eq!(res.status, 404);
//! # });
//! ```

mod config;
mod cookie;
mod error;
mod kernel;
mod middleware;
mod request;
mod response;
mod session;

pub use config::Config;
pub use cookie::Cookie;
pub use error::{HttpError, Result};
pub use kernel::{Handler, Kernel, CONTROLLER_PARAMETER};
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareResult, RequireLoginMiddleware};
pub use request::{Method, Request};
pub use response::{reason_phrase, Response};
pub use session::{NotificationLevel, Session, SessionStore, SESSION_COOKIE};
