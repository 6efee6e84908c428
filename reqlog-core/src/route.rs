use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reason recorded when a handler carries a marker with no explicit reason.
pub const NO_LOGGING_MSG: &str = "No logging for this endpoint";

/// Per-handler opt-out flag. Its presence means "do not log requests served
/// by this handler"; the reason is echoed in the suppression notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MarkerFields")]
pub struct SuppressionMarker {
    pub reason: String,
}

/// Wire shape of a marker; routed through [`SuppressionMarker::new`].
#[derive(Deserialize)]
struct MarkerFields {
    #[serde(default)]
    reason: String,
}

impl From<MarkerFields> for SuppressionMarker {
    fn from(fields: MarkerFields) -> Self {
        Self::new(fields.reason)
    }
}

impl SuppressionMarker {
    pub fn new(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            reason: if reason.is_empty() {
                NO_LOGGING_MSG.to_string()
            } else {
                reason
            },
        }
    }
}

impl Default for SuppressionMarker {
    fn default() -> Self {
        Self::new(NO_LOGGING_MSG)
    }
}

/// A single callable handler, optionally marked as not-to-be-logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerFn {
    pub name: String,
    #[serde(default)]
    pub no_logging: Option<SuppressionMarker>,
}

impl HandlerFn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            no_logging: None,
        }
    }

    /// Mark with the default reason.
    pub fn no_logging(mut self) -> Self {
        self.no_logging = Some(SuppressionMarker::default());
        self
    }

    pub fn no_logging_because(mut self, reason: impl Into<String>) -> Self {
        self.no_logging = Some(SuppressionMarker::new(reason));
        self
    }
}

/// A class-like handler container exposing named methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewClass {
    pub name: String,
    #[serde(default)]
    pub methods: HashMap<String, HandlerFn>,
}

impl ViewClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// Register a method; the handler's own name is the attribute name.
    pub fn with_method(mut self, handler: HandlerFn) -> Self {
        self.methods.insert(handler.name.clone(), handler);
        self
    }

    pub fn method(&self, name: &str) -> Option<&HandlerFn> {
        self.methods.get(name)
    }
}

/// What the host router resolves a path to.
///
/// The variants are the handler shapes a host framework can produce; each
/// carries only what suppression lookup needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteHandle {
    /// A plain function serving every method.
    PlainFunction(HandlerFn),
    /// A class with an explicit `http method → action name` map.
    ActionDispatchClass {
        class: ViewClass,
        actions: HashMap<String, String>,
    },
    /// A class dispatching on the lowercased HTTP method name.
    MethodDispatchClass { class: ViewClass },
    /// A generic class-based view with one method per HTTP verb.
    GenericView { view_class: ViewClass },
}

impl RouteHandle {
    /// Short variant name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteHandle::PlainFunction(_) => "plain_function",
            RouteHandle::ActionDispatchClass { .. } => "action_dispatch_class",
            RouteHandle::MethodDispatchClass { .. } => "method_dispatch_class",
            RouteHandle::GenericView { .. } => "generic_view",
        }
    }
}
