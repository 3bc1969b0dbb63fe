//! Commands behind the `lwf-routes` binary.

use std::fs;
use std::path::{Path, PathBuf};

use lwf_router::{
    Parameters, ReferenceType, RequestContext, RouteMatch, RouteTable, Router, RouterError,
};
use thiserror::Error;
use tracing::debug;

/// Errors raised by console commands.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parameter {0:?}, expected key=value")]
    InvalidParameter(String),

    #[error(transparent)]
    Router(#[from] RouterError),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Builds a router from a JSON route table file.
pub fn load_router(path: &Path) -> Result<Router> {
    let json = fs::read_to_string(path).map_err(|source| ConsoleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut router = Router::new();
    RouteTable::from_json(&json)?.register(&mut router)?;
    debug!(path = %path.display(), routes = router.len(), "route table loaded");
    Ok(router)
}

/// One line per route, in matching order: name, methods, schemes, host, path.
pub fn list_routes(router: &Router) -> Vec<String> {
    let rows: Vec<[String; 5]> = router
        .routes()
        .map(|(name, route)| {
            [
                name.to_string(),
                join_or_any(route.methods()),
                join_or_any(route.schemes()),
                if route.host().is_empty() {
                    "ANY".to_string()
                } else {
                    route.host().to_string()
                },
                route.path().to_string(),
            ]
        })
        .collect();

    let header = ["Name", "Method", "Scheme", "Host", "Path"].map(String::from);
    let mut widths = header.clone().map(|cell| cell.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    std::iter::once(&header)
        .chain(&rows)
        .map(|row| {
            row.iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect()
}

fn join_or_any(values: &[String]) -> String {
    if values.is_empty() {
        "ANY".to_string()
    } else {
        values.join("|")
    }
}

/// Matches a request made by a user holding `roles`.
pub fn match_path(router: &Router, ctx: &RequestContext, roles: &[String]) -> Result<RouteMatch> {
    let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
    let roles: &[&str] = &roles;
    Ok(router.match_request(ctx, &roles)?)
}

/// Parses `key=value`.
pub fn parse_param(raw: &str) -> Result<(String, String)> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| ConsoleError::InvalidParameter(raw.to_string()))
}

/// Generates the URL of a named route.
pub fn generate_url(
    router: &Router,
    ctx: &RequestContext,
    name: &str,
    raw_params: &[String],
    reference_type: ReferenceType,
) -> Result<String> {
    let params = raw_params
        .iter()
        .map(|raw| parse_param(raw))
        .collect::<Result<Parameters>>()?;
    Ok(router.generate(ctx, name, &params, reference_type)?)
}
