//! The per-request entry point.
//!
//! ```text
//! handle(request)
//!     → start timer
//!     → handler.call(request)                 (only suspension point)
//!     → resolve_suppression(method, path)
//!         ├─ marked   → INFO notice, no record
//!         └─ unmarked → assemble record → emit at data level
//!                       (→ body lines, when enabled)
//!     → return the handler's result unchanged
//! ```
//!
//! The interceptor holds only immutable state, so one instance can serve any
//! number of concurrent requests.

use async_trait::async_trait;
use reqlog_core::config::{LoggingConfig, Severity};
use reqlog_core::error::ReqlogError;
use reqlog_core::request::{LoggedRequest, LoggedResponse};
use reqlog_core::router::RouteResolver;
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::body::BodyRenderer;
use crate::emitter::{Emitter, LogContext, Sink};
use crate::record::RecordAssembler;
use crate::suppression::resolve_suppression;

/// Anything carrying an HTTP status code.
pub trait HasStatus {
    fn status_code(&self) -> u16;
}

impl HasStatus for LoggedResponse {
    fn status_code(&self) -> u16 {
        self.status_code
    }
}

impl<B> HasStatus for http::Response<B> {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// The wrapped application handler.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    type Response: HasStatus + Send;
    type Error: Display + Send;

    async fn call(&self, request: &LoggedRequest) -> Result<Self::Response, Self::Error>;
}

/// Adapts an async closure into a [`RequestHandler`].
pub struct ServiceFn<F>(F);

pub fn service_fn<F>(f: F) -> ServiceFn<F> {
    ServiceFn(f)
}

#[async_trait]
impl<F, Fut, T, E> RequestHandler for ServiceFn<F>
where
    F: Fn(&LoggedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: HasStatus + Send + 'static,
    E: Display + Send + 'static,
{
    type Response = T;
    type Error = E;

    async fn call(&self, request: &LoggedRequest) -> Result<T, E> {
        (self.0)(request).await
    }
}

pub struct Interceptor<R, S> {
    resolver: R,
    emitter: Emitter<S>,
    assembler: RecordAssembler,
    body: Option<BodyRenderer>,
    level: Severity,
}

impl<R: RouteResolver, S: Sink> Interceptor<R, S> {
    /// Fails with [`ReqlogError::InvalidLogLevel`] when `data_log_level` is not
    /// a standard severity.
    pub fn new(config: &LoggingConfig, resolver: R, sink: S) -> Result<Self, ReqlogError> {
        let level = config.severity()?;
        Ok(Self {
            resolver,
            emitter: Emitter::new(sink),
            assembler: RecordAssembler::from_config(config),
            body: config
                .log_body
                .then(|| BodyRenderer::new(config.max_body_length)),
            level,
        })
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn sink(&self) -> &S {
        self.emitter.sink()
    }

    /// Run `handler` for `request` and log the outcome.
    ///
    /// The handler's result is returned untouched; an error is logged as a
    /// 500 record before being handed back.
    pub async fn handle<H: RequestHandler>(
        &self,
        handler: &H,
        request: &LoggedRequest,
    ) -> Result<H::Response, H::Error> {
        let start = Instant::now();
        let result = handler.call(request).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(response) => {
                self.log_exchange(request, &LoggedResponse::new(response.status_code()), elapsed)
            }
            Err(e) => self.log_failure(request, &e.to_string(), elapsed),
        }
        result
    }

    /// Log a completed exchange timed by the caller.
    pub fn log_exchange(&self, request: &LoggedRequest, response: &LoggedResponse, elapsed: Duration) {
        if self.suppressed(request) {
            return;
        }
        let context = LogContext::exchange(request, response);
        let record = self.assembler.assemble(request, response, elapsed);
        self.emitter.emit(self.level, &record.to_json(), &context);

        if let (Some(renderer), Some(body)) = (&self.body, &request.body) {
            if let Some(text) = renderer.render(request.content_type(), body) {
                self.emitter.emit(self.level, &text, &context);
            }
        }
    }

    /// Log a handler failure timed by the caller.
    pub fn log_failure(&self, request: &LoggedRequest, error: &str, elapsed: Duration) {
        if self.suppressed(request) {
            return;
        }
        let record = self.assembler.assemble_failure(request, elapsed, error);
        self.emitter
            .emit(Severity::Error, &record.to_json(), &LogContext::failure(request, error));
    }

    /// Emits the suppression notice when the route opted out.
    fn suppressed(&self, request: &LoggedRequest) -> bool {
        match resolve_suppression(&self.resolver, &request.method, &request.path) {
            Some(marker) => {
                self.emitter.emit_suppressed(request, &marker);
                true
            }
            None => false,
        }
    }
}
