//! Per-endpoint authentication policy.
//!
//! Routes are registered through [`RouteGroup`] so that the router and the
//! policy table are built from the same declarations. A group can be marked
//! anonymous as a whole, or single handlers (method + path) inside it. The gate
//! looks the matched route up in [`EndpointPolicies`]; either marker is enough
//! to skip authentication.

use std::collections::{HashMap, HashSet};

use axum::{Router, http::Method, routing::MethodRouter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    RequiresAuth,
    AllowAnonymous,
}

/// Metadata of the endpoint a request was routed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointMeta {
    pub handler_anonymous: bool,
    pub group_anonymous: bool,
}

impl EndpointMeta {
    pub fn policy(&self) -> AuthPolicy {
        if self.handler_anonymous || self.group_anonymous {
            AuthPolicy::AllowAnonymous
        } else {
            AuthPolicy::RequiresAuth
        }
    }
}

/// Lookup table keyed by route template (e.g. `/api/v1/account/login`).
#[derive(Debug, Clone, Default)]
pub struct EndpointPolicies {
    group_anonymous: HashMap<String, bool>,
    anonymous_handlers: HashSet<(Method, String)>,
}

impl EndpointPolicies {
    /// Unknown paths (and requests that matched no route) resolve to the default
    /// metadata, i.e. `RequiresAuth`.
    pub fn lookup(&self, method: &Method, matched_path: Option<&str>) -> EndpointMeta {
        let Some(path) = matched_path else {
            return EndpointMeta::default();
        };

        // axum serves HEAD with the GET handler
        let method = if method == Method::HEAD {
            Method::GET
        } else {
            method.clone()
        };

        EndpointMeta {
            handler_anonymous: self
                .anonymous_handlers
                .contains(&(method, path.to_string())),
            group_anonymous: self.group_anonymous.get(path).copied().unwrap_or(false),
        }
    }
}

/// A set of routes sharing a path prefix and a group-level policy.
pub struct RouteGroup<S> {
    prefix: String,
    anonymous: bool,
    router: Router<S>,
    paths: Vec<String>,
    anonymous_handlers: Vec<(Method, String)>,
}

impl<S> RouteGroup<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            anonymous: false,
            router: Router::new(),
            paths: Vec::new(),
            anonymous_handlers: Vec::new(),
        }
    }

    /// Every route of this group skips authentication.
    pub fn allow_anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn route(mut self, path: &str, method_router: MethodRouter<S>) -> Self {
        let full = join(&self.prefix, path);
        self.router = self.router.route(&full, method_router);
        self.paths.push(full);
        self
    }

    /// Only `method` on `path` skips authentication.
    pub fn anonymous(mut self, method: Method, path: &str) -> Self {
        self.anonymous_handlers
            .push((method, join(&self.prefix, path)));
        self
    }
}

/// Collects route groups into one router plus its policy table.
pub struct Endpoints<S> {
    router: Router<S>,
    policies: EndpointPolicies,
}

impl<S> Default for Endpoints<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Endpoints<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            policies: EndpointPolicies::default(),
        }
    }

    pub fn group(mut self, group: RouteGroup<S>) -> Self {
        for path in group.paths {
            self.policies.group_anonymous.insert(path, group.anonymous);
        }
        self.policies
            .anonymous_handlers
            .extend(group.anonymous_handlers);
        self.router = self.router.merge(group.router);
        self
    }

    pub fn into_parts(self) -> (Router<S>, EndpointPolicies) {
        (self.router, self.policies)
    }
}

fn join(prefix: &str, path: &str) -> String {
    if path.is_empty() || (path == "/" && !prefix.is_empty()) {
        prefix.to_string()
    } else {
        format!("{prefix}{path}")
    }
}
