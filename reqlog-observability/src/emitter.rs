//! Forwarding of request log lines to a sink.

use reqlog_core::config::Severity;
use reqlog_core::request::{LoggedRequest, LoggedResponse};
use reqlog_core::route::SuppressionMarker;
use std::sync::Arc;

/// Contextual extras attached to every sink call.
#[derive(Debug, Clone, Copy)]
pub enum LogExtra<'a> {
    /// A handled request: the record, or its body.
    Exchange {
        request: &'a LoggedRequest,
        response: &'a LoggedResponse,
    },
    /// A handler that failed before producing a response.
    Failure {
        request: &'a LoggedRequest,
        error: &'a str,
    },
    /// Notice for a request whose route opted out of logging.
    NoLogging { reason: &'a str },
}

/// The (extras) bundle passed to the sink alongside each message.
#[derive(Debug, Clone, Copy)]
pub struct LogContext<'a> {
    pub extra: LogExtra<'a>,
}

impl<'a> LogContext<'a> {
    pub fn exchange(request: &'a LoggedRequest, response: &'a LoggedResponse) -> Self {
        Self {
            extra: LogExtra::Exchange { request, response },
        }
    }

    pub fn failure(request: &'a LoggedRequest, error: &'a str) -> Self {
        Self {
            extra: LogExtra::Failure { request, error },
        }
    }

    pub fn no_logging(reason: &'a str) -> Self {
        Self {
            extra: LogExtra::NoLogging { reason },
        }
    }

    pub fn request(&self) -> Option<&'a LoggedRequest> {
        match self.extra {
            LogExtra::Exchange { request, .. } | LogExtra::Failure { request, .. } => Some(request),
            LogExtra::NoLogging { .. } => None,
        }
    }

    pub fn response(&self) -> Option<&'a LoggedResponse> {
        match self.extra {
            LogExtra::Exchange { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn no_logging_reason(&self) -> Option<&'a str> {
        match self.extra {
            LogExtra::NoLogging { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Destination for emitted lines.
///
/// Sinks are best-effort: they own their failures and never report them back
/// into the request path.
pub trait Sink: Send + Sync {
    fn log(&self, level: Severity, message: &str, context: &LogContext<'_>);
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn log(&self, level: Severity, message: &str, context: &LogContext<'_>) {
        (**self).log(level, message, context)
    }
}

/// Splits messages into lines and forwards each one to the sink.
pub struct Emitter<S> {
    sink: S,
}

impl<S: Sink> Emitter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Emit each `\n` / `\r\n` separated line of `message` as its own call.
    pub fn emit(&self, level: Severity, message: &str, context: &LogContext<'_>) {
        for line in message.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.sink.log(level, line, context);
        }
    }

    /// Emit the INFO notice for a suppressed request.
    pub fn emit_suppressed(&self, request: &LoggedRequest, marker: &SuppressionMarker) {
        let message = format!(
            "{} {} (not logged because '{}')",
            request.method, request.full_path, marker.reason
        );
        self.emit(Severity::Info, &message, &LogContext::no_logging(&marker.reason));
    }
}
