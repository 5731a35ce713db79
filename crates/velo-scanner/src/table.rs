//! A recording [`RouteMount`] with request resolution.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use serde::Serialize;
use velo_core::types::join_route;
use velo_core::{DiscoveredModule, HttpMethod, RouterDefinition};

use crate::discovery::RouteMount;

/// One endpoint as mounted in the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountedRoute {
    /// HTTP method.
    pub method: HttpMethod,
    /// Full path: api prefix + router prefix + endpoint path.
    pub path: String,
    /// Module the router came from.
    pub module: String,
    /// Handler function name.
    pub handler: String,
    /// Load order of the module.
    pub load_order: usize,
}

/// A route that can never be reached because an earlier route has the same
/// method and path shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowedRoute {
    /// The unreachable route.
    pub route: MountedRoute,
    /// The earlier route that wins.
    pub shadowed_by: MountedRoute,
}

/// Every mounted route in mount order.
///
/// Resolution is first-mounted-wins, the same precedence a web framework
/// applies to routes registered in sequence.
///
/// # Examples
///
/// ```
/// use velo_core::{DiscoveredModule, Endpoint, HttpMethod, RouterDefinition};
/// use velo_scanner::{RouteMount, RouteTable};
///
/// let module = DiscoveredModule {
///     module_name: "pet".into(),
///     route_entry_path: "api_app/modules/pet/router.py".into(),
///     load_order: 0,
/// };
/// let router = RouterDefinition {
///     symbol: "router".into(),
///     prefix: "/v1/pets".into(),
///     endpoints: [Endpoint {
///         method: HttpMethod::Get,
///         path: "/{entity_id}".into(),
///         handler: "get_pet".into(),
///         line: 12,
///     }]
///     .into_iter()
///     .collect(),
///     ..RouterDefinition::default()
/// };
///
/// let mut table = RouteTable::new();
/// table.mount("/api", &module, &router);
///
/// let route = table.resolve(HttpMethod::Get, "/api/v1/pets/42").unwrap();
/// assert_eq!(route.handler, "get_pet");
/// assert!(table.resolve(HttpMethod::Post, "/api/v1/pets/42").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<MountedRoute>,
}

impl RouteMount for RouteTable {
    fn mount(&mut self, api_prefix: &str, module: &DiscoveredModule, router: &RouterDefinition) {
        self.routes
            .extend(router.endpoints.iter().map(|endpoint| MountedRoute {
                method: endpoint.method,
                path: join_route(api_prefix, &router.endpoint_path(endpoint)),
                module: module.module_name.clone(),
                handler: endpoint.handler.clone(),
                load_order: module.load_order,
            }));
    }
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes in mount order.
    #[must_use]
    pub fn routes(&self) -> &[MountedRoute] {
        &self.routes
    }

    /// Number of mounted routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the route that would serve `method` on `path`.
    ///
    /// `{param}` segments match any non-empty segment.
    #[must_use]
    pub fn resolve(&self, method: HttpMethod, path: &str) -> Option<&MountedRoute> {
        self.routes
            .iter()
            .find(|route| route.method == method && matches_template(&route.path, path))
    }

    /// Routes hidden behind an earlier route with the same method and path
    /// shape (parameter names ignored).
    #[must_use]
    pub fn shadowed(&self) -> Vec<ShadowedRoute> {
        let mut first: FxHashMap<(HttpMethod, String), usize> = FxHashMap::default();
        let mut shadowed = Vec::new();

        for (index, route) in self.routes.iter().enumerate() {
            match first.entry((route.method, shape(&route.path))) {
                Entry::Occupied(winner) => shadowed.push(ShadowedRoute {
                    route: route.clone(),
                    shadowed_by: self.routes[*winner.get()].clone(),
                }),
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
            }
        }

        shadowed
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/')
}

fn is_param(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn matches_template(template: &str, path: &str) -> bool {
    let template: Vec<_> = segments(template).collect();
    let path: Vec<_> = segments(path).collect();

    template.len() == path.len()
        && template
            .iter()
            .zip(&path)
            .all(|(t, p)| if is_param(t) { !p.is_empty() } else { t == p })
}

/// Path with parameter names erased: `/pets/{id}` → `/pets/{}`.
fn shape(path: &str) -> String {
    segments(path)
        .map(|segment| if is_param(segment) { "{}" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use velo_core::Endpoint;

    use super::*;

    fn module(name: &str, load_order: usize) -> DiscoveredModule {
        DiscoveredModule {
            module_name: name.to_owned(),
            route_entry_path: Utf8PathBuf::from(format!("modules/{name}/router.py")),
            load_order,
        }
    }

    fn router(prefix: &str, endpoints: &[(HttpMethod, &str, &str)]) -> RouterDefinition {
        RouterDefinition {
            symbol: "router".to_owned(),
            prefix: prefix.to_owned(),
            endpoints: endpoints
                .iter()
                .enumerate()
                .map(|(i, (method, path, handler))| Endpoint {
                    method: *method,
                    path: (*path).to_owned(),
                    handler: (*handler).to_owned(),
                    line: u32::try_from(i).unwrap() + 1,
                })
                .collect(),
            ..RouterDefinition::default()
        }
    }

    #[test]
    fn test_full_paths() {
        let mut table = RouteTable::new();
        table.mount(
            "/api",
            &module("pet", 0),
            &router("/v1/pets", &[(HttpMethod::Get, "", "list"), (HttpMethod::Get, "/{entity_id}", "get")]),
        );

        let paths: Vec<_> = table.routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/api/v1/pets", "/api/v1/pets/{entity_id}"]);
    }

    #[test]
    fn test_resolve_literal_and_params() {
        let mut table = RouteTable::new();
        table.mount(
            "",
            &module("pet", 0),
            &router("/v1/pets", &[(HttpMethod::Get, "", "list"), (HttpMethod::Delete, "/{entity_id}", "delete")]),
        );

        assert_eq!(table.resolve(HttpMethod::Get, "/v1/pets").unwrap().handler, "list");
        assert_eq!(table.resolve(HttpMethod::Get, "/v1/pets/").unwrap().handler, "list");
        assert_eq!(table.resolve(HttpMethod::Delete, "/v1/pets/7").unwrap().handler, "delete");
        assert!(table.resolve(HttpMethod::Delete, "/v1/pets").is_none());
        assert!(table.resolve(HttpMethod::Get, "/v1/pets/7/owner").is_none());
    }

    #[test]
    fn test_first_mounted_wins() {
        let mut table = RouteTable::new();
        table.mount("/api", &module("alpha", 0), &router("/v1/things", &[(HttpMethod::Get, "/{id}", "alpha_get")]));
        table.mount("/api", &module("beta", 1), &router("/v1/things", &[(HttpMethod::Get, "/{thing_id}", "beta_get")]));

        let route = table.resolve(HttpMethod::Get, "/api/v1/things/1").unwrap();
        assert_eq!(route.module, "alpha");

        let shadowed = table.shadowed();
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].route.module, "beta");
        assert_eq!(shadowed[0].shadowed_by.module, "alpha");
    }

    #[test]
    fn test_distinct_methods_do_not_shadow() {
        let mut table = RouteTable::new();
        table.mount(
            "/api",
            &module("pet", 0),
            &router(
                "/v1/pets",
                &[
                    (HttpMethod::Get, "/{entity_id}", "get"),
                    (HttpMethod::Patch, "/{entity_id}", "update"),
                    (HttpMethod::Delete, "/{entity_id}", "delete"),
                ],
            ),
        );
        assert!(table.shadowed().is_empty());
    }

    #[test]
    fn test_shape() {
        assert_eq!(shape("/api/v1/pets/{entity_id}"), "api/v1/pets/{}");
        assert_eq!(shape("/"), "");
        assert!(!is_param("{}x"));
        assert!(is_param("{id}"));
    }

    #[test]
    fn test_table_json() {
        let mut table = RouteTable::new();
        table.mount("/api", &module("pet", 0), &router("/v1/pets", &[(HttpMethod::Post, "", "create_pet")]));

        insta::assert_json_snapshot!(table.routes(), @r#"
        [
          {
            "method": "POST",
            "path": "/api/v1/pets",
            "module": "pet",
            "handler": "create_pet",
            "load_order": 0
          }
        ]
        "#);
    }
}
