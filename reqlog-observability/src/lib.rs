pub mod body;
pub mod emitter;
pub mod interceptor;
pub mod record;
pub mod sink;
pub mod suppression;

pub use emitter::{Emitter, LogContext, LogExtra, Sink};
pub use interceptor::{HasStatus, Interceptor, RequestHandler, ServiceFn, service_fn};
pub use record::{LogRecord, RecordAssembler};
pub use sink::TracingSink;
pub use suppression::resolve_suppression;
