#![allow(dead_code)]

use lwf_router::{Parameters, RequestContext, Route, Router};

pub fn router(routes: Vec<(&str, Route)>) -> Router {
    let mut router = Router::new();
    router
        .add_routes(routes)
        .unwrap_or_else(|e| panic!("Failed to register routes: {e}"));
    router
}

pub fn params(pairs: &[(&str, &str)]) -> Parameters {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

pub fn ctx(method: &str, path: &str) -> RequestContext {
    RequestContext::new(method, path).with_host("example.com")
}
