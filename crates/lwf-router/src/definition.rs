//! Serializable route tables.
//!
//! A route table is a JSON document listing named routes:
//!
//! ```json
//! {
//!   "routes": [
//!     {
//!       "name": "user_show",
//!       "path": "/user/{id}",
//!       "methods": ["GET"],
//!       "requirements": { "id": "\\d+" },
//!       "defaults": { "_controller": "user::show" }
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::route::{Route, METHOD_REQUIREMENT, SCHEME_REQUIREMENT};
use crate::router::Router;

/// The stored form of a [`Route`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requirements: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl RouteDefinition {
    /// Builds the route described by this definition.
    pub fn to_route(&self) -> Result<Route> {
        let mut route = Route::new(&self.path);
        route.set_host(&self.host);
        route.add_defaults(self.defaults.clone());
        route.add_requirements(
            self.requirements
                .iter()
                .map(|(key, regex)| (key.as_str(), regex.as_str())),
        )?;
        if !self.schemes.is_empty() {
            route.set_schemes(&self.schemes);
        }
        if !self.methods.is_empty() {
            route.set_methods(&self.methods);
        }
        route.add_options(self.options.clone());
        Ok(route)
    }
}

impl From<&Route> for RouteDefinition {
    fn from(route: &Route) -> Self {
        let requirements = route
            .requirements()
            .iter()
            .filter(|(key, _)| key.as_str() != SCHEME_REQUIREMENT && key.as_str() != METHOD_REQUIREMENT)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self {
            path: route.path().to_string(),
            host: route.host().to_string(),
            schemes: route.schemes().to_vec(),
            methods: route.methods().to_vec(),
            defaults: route.defaults().clone(),
            requirements,
            options: route.options().clone(),
        }
    }
}

/// A named route in a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRouteDefinition {
    pub name: String,
    #[serde(flatten)]
    pub route: RouteDefinition,
}

/// An ordered list of route definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub routes: Vec<NamedRouteDefinition>,
}

impl RouteTable {
    /// Parses a table from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the table as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Captures the routes of a router, in matching order.
    pub fn from_router(router: &Router) -> Self {
        let routes = router
            .routes()
            .map(|(name, route)| NamedRouteDefinition {
                name: name.to_string(),
                route: RouteDefinition::from(route),
            })
            .collect();
        Self { routes }
    }

    /// Builds the routes, keeping the table order.
    pub fn to_routes(&self) -> Result<Vec<(String, Route)>> {
        self.routes
            .iter()
            .map(|named| Ok((named.name.clone(), named.route.to_route()?)))
            .collect()
    }

    /// Adds every route of the table to a router.
    pub fn register(&self, router: &mut Router) -> Result<()> {
        router.add_routes(self.to_routes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::ROLES_REQUIREMENT;

    const TABLE: &str = r#"{
        "routes": [
            {
                "name": "user_show",
                "path": "/user/{id}",
                "methods": ["get"],
                "requirements": { "id": "^\\d+$", "_roles": "admin|editor" },
                "defaults": { "_controller": "user::show" }
            },
            { "name": "home", "path": "/", "schemes": ["HTTPS"] }
        ]
    }"#;

    #[test]
    fn test_parse_table() {
        let table = RouteTable::from_json(TABLE).unwrap();
        let routes = table.to_routes().unwrap();
        assert_eq!(routes.len(), 2);

        let (name, route) = &routes[0];
        assert_eq!(name, "user_show");
        assert_eq!(route.methods(), ["GET"]);
        assert_eq!(route.requirement("id"), Some(r"\d+"));
        assert_eq!(route.requirement(ROLES_REQUIREMENT), Some("admin|editor"));
        assert_eq!(route.default_value("_controller"), Some("user::show"));

        assert_eq!(routes[1].1.schemes(), ["https"]);
    }

    #[test]
    fn test_router_round_trip() {
        let mut router = Router::new();
        RouteTable::from_json(TABLE)
            .unwrap()
            .register(&mut router)
            .unwrap();

        let table = RouteTable::from_router(&router);
        let json = table.to_json().unwrap();
        let reparsed = RouteTable::from_json(&json).unwrap();
        assert_eq!(table, reparsed);
        assert_eq!(reparsed.routes[0].route.methods, ["GET"]);
        assert!(!reparsed.routes[0]
            .route
            .requirements
            .contains_key(METHOD_REQUIREMENT));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            RouteTable::from_json("{"),
            Err(crate::RouterError::Definition(_))
        ));
    }
}
