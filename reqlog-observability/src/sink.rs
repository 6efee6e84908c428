//! Default sink: forwards lines to `tracing` under the `http.request` target.

use reqlog_core::config::{LoggingConfig, Severity};
use std::borrow::Cow;

use crate::emitter::{LogContext, LogExtra, Sink};

/// Target of every event the sink produces.
pub const TARGET: &str = "http.request";

const RESET: &str = "\x1b[0m";

macro_rules! event_at {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            Severity::NotSet => tracing::trace!(target: TARGET, $($rest)+),
            Severity::Debug => tracing::debug!(target: TARGET, $($rest)+),
            Severity::Info => tracing::info!(target: TARGET, $($rest)+),
            Severity::Warning => tracing::warn!(target: TARGET, $($rest)+),
            Severity::Error => tracing::error!(target: TARGET, $($rest)+),
            Severity::Critical => tracing::error!(target: TARGET, critical = true, $($rest)+),
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    colorize: bool,
}

impl TracingSink {
    pub fn new(colorize: bool) -> Self {
        Self { colorize }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(config.colorize)
    }

    fn paint<'a>(&self, level: Severity, line: &'a str) -> Cow<'a, str> {
        if !self.colorize || line.is_empty() {
            return Cow::Borrowed(line);
        }
        Cow::Owned(format!("{}{line}{RESET}", color_code(level)))
    }
}

fn color_code(level: Severity) -> &'static str {
    match level {
        Severity::NotSet | Severity::Debug => "\x1b[2m",
        Severity::Info => "\x1b[36m",
        Severity::Warning => "\x1b[33m",
        Severity::Error => "\x1b[31m",
        Severity::Critical => "\x1b[1;31m",
    }
}

impl Sink for TracingSink {
    fn log(&self, level: Severity, message: &str, context: &LogContext<'_>) {
        let line = self.paint(level, message);
        match context.extra {
            LogExtra::Exchange { request, response } => event_at!(
                level,
                method = %request.method,
                path = %request.path,
                status_code = response.status_code,
                "{}",
                line
            ),
            LogExtra::Failure { request, error } => event_at!(
                level,
                method = %request.method,
                path = %request.path,
                error = %error,
                "{}",
                line
            ),
            LogExtra::NoLogging { reason } => event_at!(level, no_logging = %reason, "{}", line),
        }
    }
}
