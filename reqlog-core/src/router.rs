use crate::error::ReqlogError;
use crate::route::RouteHandle;
use dashmap::DashMap;
use matchit::Router as MatchitRouter;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of asking the host router for a path's handler.
#[derive(Debug, Clone)]
pub enum Resolution {
    Matched(Arc<RouteHandle>),
    /// No registered route matches the path.
    NotFound,
    /// The path cannot be routed at all (e.g. not absolute).
    Unsupported(String),
}

impl Resolution {
    pub fn handle(&self) -> Option<&RouteHandle> {
        match self {
            Resolution::Matched(handle) => Some(handle),
            Resolution::NotFound | Resolution::Unsupported(_) => None,
        }
    }
}

/// The host framework's path → handler lookup. Read-only from Reqlog's side.
pub trait RouteResolver: Send + Sync {
    fn resolve(&self, path: &str) -> Resolution;
}

impl<R: RouteResolver + ?Sized> RouteResolver for Arc<R> {
    fn resolve(&self, path: &str) -> Resolution {
        (**self).resolve(path)
    }
}

/// Thread-safe route table backed by a radix trie.
///
/// Patterns use `matchit` syntax (`/users/{id}`, `/static/{*rest}`). Lookups
/// read an immutable compiled snapshot; registration rebuilds and swaps it.
pub struct RouteTable {
    inner: arc_swap::ArcSwap<MatchitRouter<Arc<RouteHandle>>>,

    /// Source of truth: handles by pattern
    routes: DashMap<String, Arc<RouteHandle>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            inner: arc_swap::ArcSwap::new(Arc::new(MatchitRouter::new())),
            routes: DashMap::new(),
        }
    }

    /// Add or replace the handle for a pattern. Triggers recompilation.
    ///
    /// The table is left untouched when the pattern does not compile next to
    /// the existing routes.
    pub fn add_route(&self, pattern: &str, handle: RouteHandle) -> anyhow::Result<()> {
        info!(pattern = %pattern, kind = handle.kind(), "Adding route");
        let handle = Arc::new(handle);
        let candidate: Vec<(String, Arc<RouteHandle>)> = self
            .routes
            .iter()
            .filter(|entry| entry.key() != pattern)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .chain(std::iter::once((pattern.to_string(), handle.clone())))
            .collect();
        let compiled = compile(&candidate)?;
        self.routes.insert(pattern.to_string(), handle);
        self.install(compiled);
        Ok(())
    }

    /// Remove a pattern. Triggers recompilation.
    pub fn remove_route(&self, pattern: &str) -> anyhow::Result<()> {
        info!(pattern = %pattern, "Removing route");
        self.routes.remove(pattern);
        self.rebuild()
    }

    /// Replace all routes atomically. On a compile error the previous set
    /// stays in place.
    pub fn replace_all(&self, routes: Vec<(String, RouteHandle)>) -> anyhow::Result<()> {
        let candidate: Vec<(String, Arc<RouteHandle>)> = routes
            .into_iter()
            .map(|(pattern, handle)| (pattern, Arc::new(handle)))
            .collect();
        let compiled = compile(&candidate)?;
        self.routes.clear();
        for (pattern, handle) in candidate {
            self.routes.insert(pattern, handle);
        }
        self.install(compiled);
        Ok(())
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    fn rebuild(&self) -> anyhow::Result<()> {
        let current: Vec<(String, Arc<RouteHandle>)> = self
            .routes
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let compiled = compile(&current)?;
        self.install(compiled);
        Ok(())
    }

    fn install(&self, compiled: MatchitRouter<Arc<RouteHandle>>) {
        self.inner.store(Arc::new(compiled));
        info!(count = self.routes.len(), "Route table rebuilt");
    }
}

fn compile(routes: &[(String, Arc<RouteHandle>)]) -> anyhow::Result<MatchitRouter<Arc<RouteHandle>>> {
    let mut compiled = MatchitRouter::new();
    for (pattern, handle) in routes {
        compiled
            .insert(pattern.as_str(), handle.clone())
            .map_err(|e| ReqlogError::InvalidRoute {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
    }
    Ok(compiled)
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteResolver for RouteTable {
    fn resolve(&self, path: &str) -> Resolution {
        if !path.starts_with('/') {
            return Resolution::Unsupported(format!("path {path:?} is not absolute"));
        }
        let compiled = self.inner.load();
        match compiled.at(path) {
            Ok(matched) => {
                debug!(path = %path, kind = matched.value.kind(), "Route matched");
                Resolution::Matched(matched.value.clone())
            }
            Err(_) => {
                debug!(path = %path, "No route matched");
                Resolution::NotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::HandlerFn;

    fn plain(name: &str) -> RouteHandle {
        RouteHandle::PlainFunction(HandlerFn::new(name))
    }

    #[test]
    fn test_basic_resolution() {
        let table = RouteTable::new();
        table.add_route("/api/users", plain("users")).unwrap();

        match table.resolve("/api/users") {
            Resolution::Matched(handle) => assert_eq!(*handle, plain("users")),
            other => panic!("expected match, got {other:?}"),
        }
        assert!(matches!(table.resolve("/api/posts"), Resolution::NotFound));
    }

    #[test]
    fn test_parametric_route() {
        let table = RouteTable::new();
        table.add_route("/api/users/{id}", plain("user_detail")).unwrap();
        assert!(table.resolve("/api/users/123").handle().is_some());
        assert!(table.resolve("/api/users").handle().is_none());
    }

    #[test]
    fn test_relative_path_is_unsupported() {
        let table = RouteTable::new();
        table.add_route("/a", plain("a")).unwrap();
        assert!(matches!(table.resolve("a"), Resolution::Unsupported(_)));
    }

    #[test]
    fn test_conflicting_route_is_rejected_and_rolled_back() {
        let table = RouteTable::new();
        table.add_route("/users/{id}", plain("by_id")).unwrap();
        assert!(table.add_route("/users/{name}", plain("by_name")).is_err());
        assert_eq!(table.route_count(), 1);
        assert!(table.resolve("/users/7").handle().is_some());
    }
}
