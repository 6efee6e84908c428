pub mod config;
pub mod error;
pub mod request;
pub mod route;
pub mod router;

pub use config::{LoggingConfig, Severity};
pub use error::ReqlogError;
pub use request::{LoggedRequest, LoggedResponse};
pub use route::{HandlerFn, RouteHandle, SuppressionMarker, ViewClass};
pub use router::{Resolution, RouteResolver, RouteTable};
