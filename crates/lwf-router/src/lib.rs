//! # lwf-router
//!
//! Route compilation, request matching and URL generation.
//!
//! This crate provides:
//! - Path and host patterns with `{name}` placeholders
//! - Per-variable requirements, defaults and optional trailing segments
//! - Method, scheme and role restrictions
//! - Reverse URL generation in four reference styles
//! - JSON route tables
//!
//! ## Quick Start
//!
//! ```
//! use lwf_router::{AllowAll, Parameters, ReferenceType, RequestContext, Route, Router};
//!
//! let mut router = Router::new();
//! router
//!     .add_route(
//!         "post_show",
//!         Route::new("/posts/{id}")
//!             .with_requirement("id", r"\d+")
//!             .unwrap()
//!             .with_methods(["GET"]),
//!     )
//!     .unwrap();
//!
//! let ctx = RequestContext::get("/posts/7");
//! let matched = router.match_request(&ctx, &AllowAll).unwrap();
//! assert_eq!(matched.get("id"), Some("7"));
//!
//! let mut params = Parameters::new();
//! params.insert("id".into(), "8".into());
//! params.insert("highlight".into(), "rust lang".into());
//! let url = router
//!     .generate(&ctx, "post_show", &params, ReferenceType::AbsolutePath)
//!     .unwrap();
//! assert_eq!(url, "/posts/8?highlight=rust+lang");
//! ```
//!
//! ## Match failures
//!
//! When no route accepts a request, the error tells why:
//!
//! - [`RouterError::MethodNotAllowed`] if some route matched the path but not
//!   the method (it lists the allowed methods),
//! - [`RouterError::AccessDenied`] if some route matched but the user lacks
//!   its `_roles`,
//! - [`RouterError::RouteNotFound`] otherwise.
//!
//! Method mismatches are reported before role mismatches.
//!
//! ## Optional segments
//!
//! Trailing variables with defaults may be omitted from the path, and are
//! left out of generated URLs when their value equals the default:
//!
//! ```
//! use lwf_router::{AllowAll, Parameters, ReferenceType, RequestContext, Route, Router};
//!
//! let mut router = Router::new();
//! router
//!     .add_route("blog", Route::new("/blog/{page}").with_default("page", "1"))
//!     .unwrap();
//!
//! let ctx = RequestContext::get("/blog");
//! assert_eq!(router.match_request(&ctx, &AllowAll).unwrap().get("page"), Some("1"));
//! assert_eq!(
//!     router.generate(&ctx, "blog", &Parameters::new(), ReferenceType::AbsolutePath).unwrap(),
//!     "/blog"
//! );
//! ```

mod compiled;
mod compiler;
mod context;
mod definition;
mod error;
mod generator;
mod route;
mod router;

pub use compiled::{CompiledRoute, Token};
pub use compiler::{DefaultCompiler, RouteCompiler};
pub use context::{AllowAll, DenyAll, RequestContext, RoleChecker};
pub use definition::{NamedRouteDefinition, RouteDefinition, RouteTable};
pub use error::{Result, RouterError};
pub use generator::{build_query, encode_path, relative_path, ReferenceType};
pub use route::{
    Route, COMPILER_OPTION, METHOD_REQUIREMENT, ROLES_REQUIREMENT, SCHEME_REQUIREMENT,
};
pub use router::{Parameters, RouteMatch, Router, ROUTE_PARAMETER};
