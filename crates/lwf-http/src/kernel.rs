//! Request dispatching.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use lwf_auth::User;
use lwf_router::{Router, ROUTE_PARAMETER};

use crate::config::Config;
use crate::cookie::Cookie;
use crate::error::{HttpError, Result};
use crate::middleware::{Middleware, MiddlewareResult};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::session::{SessionStore, SESSION_COOKIE};

/// Route default naming the handler to run.
pub const CONTROLLER_PARAMETER: &str = "_controller";

/// An async request handler.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Result<Response>> + Send + Sync>;

/// Routes requests to named handlers.
///
/// A matched route runs the handler registered under its `_controller`
/// default, or under the route name when it has none. Every error becomes a
/// response whose status follows [`HttpError::status`].
///
/// Handlers see the router through [`Request::generate_url`] and friends.
/// With a session store, each request carries the session named by its
/// session cookie, and a new or renamed session is sent back as a cookie.
pub struct Kernel {
    router: Arc<Router>,
    handlers: HashMap<String, Handler>,
    middleware: Vec<Arc<dyn Middleware>>,
    sessions: Option<Arc<SessionStore>>,
    config: Config,
    debug: bool,
}

impl Kernel {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            handlers: HashMap::new(),
            middleware: Vec::new(),
            sessions: None,
            config: Config::new(),
            debug: false,
        }
    }

    /// Attaches sessions from `store` to every request.
    #[must_use]
    pub fn with_sessions(mut self, store: Arc<SessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    pub fn sessions(&self) -> Option<&Arc<SessionStore>> {
        self.sessions.as_ref()
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// In debug mode error responses carry the error message.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Registers a handler.
    #[must_use]
    pub fn handler<F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        self.add_handler(name, handler);
        self
    }

    /// Adds middleware.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn add_handler<F, Fut>(&mut self, name: &str, handler: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        self.handlers
            .insert(name.to_string(), Arc::new(move |req| Box::pin(handler(req))));
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Copies the router first if a request still holds it.
    pub fn router_mut(&mut self) -> &mut Router {
        Arc::make_mut(&mut self.router)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Handles a request made by `user`.
    pub fn handle(&self, mut request: Request, user: User) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            request.user = user;
            request.router = Some(Arc::clone(&self.router));
            let head = request.method == Method::Head;

            let cookie_id = request.cookie(SESSION_COOKIE);
            let session = self
                .sessions
                .as_ref()
                .map(|store| store.load_or_start(cookie_id.as_deref()));
            let loaded_id = session.as_ref().map(|session| session.id());
            request.session.clone_from(&session);
            let secure = request.is_secure();
            let base_url = request.base_url.clone();

            let mut response = match self.dispatch(request).await {
                Ok(response) => response,
                Err(err) => {
                    let status = err.status();
                    if status >= 500 {
                        tracing::error!(status, error = %err, "request failed");
                    } else {
                        tracing::debug!(status, error = %err, "request rejected");
                    }
                    err.to_response(self.debug)
                }
            };

            if let (Some(store), Some(session), Some(loaded_id)) =
                (&self.sessions, &session, &loaded_id)
            {
                let id = session.id();
                if id != *loaded_id {
                    store.rekey(loaded_id, session);
                }
                if cookie_id.as_deref() != Some(id.as_str()) {
                    match Cookie::new(SESSION_COOKIE, id) {
                        Ok(cookie) => response.set_cookie(
                            cookie.with_path(base_url).with_secure(secure),
                        ),
                        Err(err) => tracing::warn!(error = %err, "session cookie not sent"),
                    }
                }
            }

            for mw in self.middleware.iter().rev() {
                response = mw.after(response).await;
            }
            if head {
                response.body.clear();
            }
            response
        })
    }

    async fn dispatch(&self, mut request: Request) -> Result<Response> {
        let matched = self
            .router
            .match_request(&request.context(), &request.user)?;
        tracing::debug!(route = matched.route_name(), path = %request.path, "route matched");
        request.add_attributes(matched.into_params());

        for mw in &self.middleware {
            match mw.before(request).await {
                MiddlewareResult::Continue(req) => request = req,
                MiddlewareResult::Response(res) => return Ok(res),
            }
        }

        let name = request
            .attribute(CONTROLLER_PARAMETER)
            .or_else(|| request.attribute(ROUTE_PARAMETER))
            .unwrap_or_default()
            .to_string();
        let handler = self
            .handlers
            .get(&name)
            .ok_or(HttpError::HandlerNotFound(name))?;
        handler(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lwf_router::Route;

    async fn hello(_req: Request) -> Result<Response> {
        Ok(Response::text("Hello, World!"))
    }

    fn kernel() -> Kernel {
        let mut router = Router::new();
        router.add_route("home", Route::new("/")).unwrap();
        router
            .add_route(
                "about",
                Route::new("/about").with_default(CONTROLLER_PARAMETER, "pages::about"),
            )
            .unwrap();
        Kernel::new(router)
            .handler("home", hello)
            .handler("pages::about", |_req| async { Ok(Response::html("<h1>About</h1>")) })
    }

    #[tokio::test]
    async fn test_handler_by_route_name() {
        let res = kernel().handle(Request::get("/"), User::anonymous()).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, World!".to_string()));
    }

    #[tokio::test]
    async fn test_handler_by_controller() {
        let res = kernel().handle(Request::get("/about"), User::anonymous()).await;
        assert_eq!(res.body_string(), Some("<h1>About</h1>".to_string()));
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let req = Request::new(Method::Head, "/");
        let res = kernel().handle(req, User::anonymous()).await;
        assert_eq!(res.status, 200);
        assert!(res.body.is_empty());
    }

    #[tokio::test]
    async fn test_missing_handler() {
        let mut kernel = kernel();
        kernel
            .router_mut()
            .add_route("orphan", Route::new("/orphan"))
            .unwrap();

        let res = kernel.handle(Request::get("/orphan"), User::anonymous()).await;
        assert_eq!(res.status, 500);
        assert_eq!(res.body_string(), Some("Internal Server Error".to_string()));

        kernel.set_debug(true);
        let res = kernel.handle(Request::get("/orphan"), User::anonymous()).await;
        assert_eq!(
            res.body_string(),
            Some("no handler registered for orphan".to_string())
        );
    }

    #[tokio::test]
    async fn test_router_is_shared_with_handlers() {
        let kernel = kernel().handler("home", |req: Request| async move {
            let about = req.generate_path("about", &lwf_router::Parameters::new())?;
            Ok::<_, HttpError>(Response::text(about))
        });
        let res = kernel.handle(Request::get("/"), User::anonymous()).await;
        assert_eq!(res.body_string().as_deref(), Some("/about"));
    }

    #[tokio::test]
    async fn test_session_cookie() {
        let store = Arc::new(SessionStore::new());
        let kernel = kernel()
            .with_sessions(Arc::clone(&store))
            .handler("home", |req: Request| async move {
                let Some(session) = req.session() else {
                    return Ok(Response::error(500, "no session"));
                };
                let visits = session.get::<u32>("visits").unwrap_or(0) + 1;
                session.set("visits", visits)?;
                Ok::<_, HttpError>(Response::text(visits.to_string()))
            });

        let res = kernel.handle(Request::get("/"), User::anonymous()).await;
        assert_eq!(res.body_string().as_deref(), Some("1"));
        let id = res.cookie(SESSION_COOKIE).unwrap().value().to_string();
        assert_eq!(store.len(), 1);

        let req = Request::get("/").with_cookie(SESSION_COOKIE, &id);
        let res = kernel.handle(req, User::anonymous()).await;
        assert_eq!(res.body_string().as_deref(), Some("2"));
        assert!(res.cookie(SESSION_COOKIE).is_none());

        let req = Request::get("/").with_cookie(SESSION_COOKIE, "forged");
        let res = kernel.handle(req, User::anonymous()).await;
        assert_eq!(res.body_string().as_deref(), Some("1"));
        assert_ne!(res.cookie(SESSION_COOKIE).unwrap().value(), "forged");
        assert_eq!(store.len(), 2);
    }
}
