//! Route-level logging opt-out.
//!
//! A request is suppressed when the handler that serves it carries a
//! [`SuppressionMarker`]. Every failure on the way there (unmatched path,
//! unroutable path, missing action, missing method) means "log normally".

use reqlog_core::route::{HandlerFn, RouteHandle, SuppressionMarker, ViewClass};
use reqlog_core::router::{Resolution, RouteResolver};
use std::collections::HashMap;
use tracing::debug;

/// Looks up the suppression marker for the handler serving `method path`.
pub fn resolve_suppression<R: RouteResolver + ?Sized>(
    resolver: &R,
    method: &str,
    path: &str,
) -> Option<SuppressionMarker> {
    let handle = match resolver.resolve(path) {
        Resolution::Matched(handle) => handle,
        Resolution::NotFound => return None,
        Resolution::Unsupported(reason) => {
            debug!(path = %path, reason = %reason, "Route not resolvable, logging normally");
            return None;
        }
    };
    let method = method.to_ascii_lowercase();
    effective_handler(&handle, &method)?.no_logging.clone()
}

/// The handler that would serve `method` (already lowercased) on this route.
pub fn effective_handler<'a>(handle: &'a RouteHandle, method: &str) -> Option<&'a HandlerFn> {
    match handle {
        RouteHandle::PlainFunction(func) => Some(func),
        RouteHandle::ActionDispatchClass { class, actions } => action_handler(class, actions, method),
        RouteHandle::MethodDispatchClass { class } => class.method(method),
        RouteHandle::GenericView { view_class } => view_class.method(method),
    }
}

fn action_handler<'a>(
    class: &'a ViewClass,
    actions: &HashMap<String, String>,
    method: &str,
) -> Option<&'a HandlerFn> {
    let action = actions.get(method)?;
    class.method(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqlog_core::router::RouteTable;

    fn viewset() -> RouteHandle {
        let class = ViewClass::new("UserViewSet")
            .with_method(HandlerFn::new("list").no_logging_because("too chatty"))
            .with_method(HandlerFn::new("create"));
        RouteHandle::ActionDispatchClass {
            class,
            actions: HashMap::from([
                ("get".to_string(), "list".to_string()),
                ("post".to_string(), "create".to_string()),
                ("delete".to_string(), "destroy".to_string()),
            ]),
        }
    }

    #[test]
    fn plain_function_serves_every_method() {
        let handle = RouteHandle::PlainFunction(HandlerFn::new("health").no_logging());
        assert!(effective_handler(&handle, "get").is_some());
        assert!(effective_handler(&handle, "patch").is_some());
    }

    #[test]
    fn action_map_selects_class_method() {
        let handle = viewset();
        assert_eq!(effective_handler(&handle, "get").unwrap().name, "list");
        assert_eq!(effective_handler(&handle, "post").unwrap().name, "create");
    }

    #[test]
    fn action_missing_from_map_resolves_nothing() {
        assert!(effective_handler(&viewset(), "put").is_none());
    }

    #[test]
    fn action_missing_from_class_resolves_nothing() {
        assert!(effective_handler(&viewset(), "delete").is_none());
    }

    #[test]
    fn method_dispatch_and_generic_view_use_method_name() {
        let class = ViewClass::new("ItemView")
            .with_method(HandlerFn::new("get").no_logging())
            .with_method(HandlerFn::new("post"));
        let dispatch = RouteHandle::MethodDispatchClass { class: class.clone() };
        let generic = RouteHandle::GenericView { view_class: class };
        for handle in [&dispatch, &generic] {
            assert!(effective_handler(handle, "get").unwrap().no_logging.is_some());
            assert!(effective_handler(handle, "post").unwrap().no_logging.is_none());
            assert!(effective_handler(handle, "head").is_none());
        }
    }

    #[test]
    fn resolve_lowercases_method() {
        let table = RouteTable::new();
        table.add_route("/users", viewset()).unwrap();
        let marker = resolve_suppression(&table, "GET", "/users").unwrap();
        assert_eq!(marker.reason, "too chatty");
        assert!(resolve_suppression(&table, "POST", "/users").is_none());
    }

    #[test]
    fn unresolvable_routes_are_not_suppressed() {
        let table = RouteTable::new();
        table
            .add_route("/health", RouteHandle::PlainFunction(HandlerFn::new("h").no_logging()))
            .unwrap();
        assert!(resolve_suppression(&table, "GET", "/missing").is_none());
        assert!(resolve_suppression(&table, "GET", "health").is_none());
        assert!(resolve_suppression(&table, "GET", "/health").is_some());
    }
}
