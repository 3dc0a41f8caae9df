//! Declarative route tables.
//!
//! # Responsibilities
//! - Hold the (method, sub-path, guards, controller) entries under one base path
//! - Reject duplicate (method, sub-path) pairs and malformed paths at startup
//! - Compile into an axum router with guards attached per route
//!
//! # Design Decisions
//! - Immutable after construction
//! - Guards use `route_layer`, so 404/405 responses never run them
//! - Controllers are plain ids; a resolver maps them to handlers, which keeps
//!   the table testable without the real controllers

use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;

use axum::{
    http::Method,
    middleware,
    routing::{MethodFilter, MethodRouter},
    Router,
};

use crate::http::server::AppState;
use crate::routing::pipeline::{run_guards, Guard, GuardChain};

/// Errors detected while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("base path '{0}' must start with '/' and must not end with '/'")]
    InvalidBasePath(String),

    #[error("route path '{0}' must start with '/' and must not end with '/' unless it is '/'")]
    InvalidPath(String),

    #[error("duplicate route {method} {path} under {base}")]
    Duplicate {
        method: Method,
        base: String,
        path: String,
    },

    #[error("unsupported method {0}")]
    UnsupportedMethod(Method),
}

/// One entry of a route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<H> {
    pub method: Method,
    pub path: String,
    pub guards: Vec<Guard>,
    pub controller: H,
}

impl<H> Route<H> {
    pub fn new(method: Method, path: impl Into<String>, controller: H) -> Self {
        Self {
            method,
            path: path.into(),
            guards: Vec::new(),
            controller,
        }
    }

    /// Append a guard; guards run in the order they are added.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn is_guarded_by(&self, guard: Guard) -> bool {
        self.guards.contains(&guard)
    }
}

/// A validated set of routes under one base path.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    base: String,
    routes: Vec<(Route<H>, MethodFilter)>,
}

fn is_valid_path(path: &str) -> bool {
    path.starts_with('/') && !path.contains("//") && (path == "/" || !path.ends_with('/'))
}

/// Join a base path and a sub-path; `/` maps to the base itself.
pub fn join_path(base: &str, path: &str) -> String {
    if path == "/" {
        base.to_string()
    } else {
        format!("{base}{path}")
    }
}

impl<H: Copy + Debug> RouteTable<H> {
    pub fn new(base: impl Into<String>, routes: Vec<Route<H>>) -> Result<Self, RouteTableError> {
        let base = base.into();
        if base == "/" || !is_valid_path(&base) {
            return Err(RouteTableError::InvalidBasePath(base));
        }

        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(routes.len());
        for route in routes {
            if !is_valid_path(&route.path) {
                return Err(RouteTableError::InvalidPath(route.path));
            }
            if !seen.insert((route.method.clone(), route.path.clone())) {
                return Err(RouteTableError::Duplicate {
                    method: route.method,
                    base,
                    path: route.path,
                });
            }
            let filter = MethodFilter::try_from(route.method.clone())
                .map_err(|_| RouteTableError::UnsupportedMethod(route.method.clone()))?;
            compiled.push((route, filter));
        }

        Ok(Self {
            base,
            routes: compiled,
        })
    }

    pub fn base_path(&self) -> &str {
        &self.base
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter().map(|(route, _)| route)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the entry for a method and sub-path.
    pub fn find(&self, method: &Method, path: &str) -> Option<&Route<H>> {
        self.routes()
            .find(|route| route.method == *method && route.path == path)
    }

    /// Compile into an axum router. `resolve` supplies the handler for each controller id.
    pub fn into_router<F>(self, state: &AppState, resolve: F) -> Router<AppState>
    where
        F: Fn(MethodFilter, H) -> MethodRouter<AppState>,
    {
        let mut by_path: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();

        for (route, filter) in self.routes {
            let full_path = join_path(&self.base, &route.path);
            let mut endpoint = resolve(filter, route.controller);

            if !route.guards.is_empty() {
                let chain = GuardChain::new(&route.guards, state.clone());
                endpoint = endpoint.route_layer(middleware::from_fn_with_state(chain, run_guards));
            }

            tracing::debug!(
                method = %route.method,
                path = %full_path,
                guards = ?route.guards,
                controller = ?route.controller,
                "Route registered"
            );

            let merged = match by_path.remove(&full_path) {
                Some(existing) => existing.merge(endpoint),
                None => endpoint,
            };
            by_path.insert(full_path, merged);
        }

        by_path
            .into_iter()
            .fold(Router::new(), |router, (path, endpoint)| router.route(&path, endpoint))
    }
}
