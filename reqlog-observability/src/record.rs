//! Structured per-request log record.

use reqlog_core::config::LoggingConfig;
use reqlog_core::request::{HEADER_PREFIX, LoggedRequest, LoggedResponse};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Replacement string used for masked header values.
pub const REDACTED: &str = "[REDACTED]";

/// Headers that carry credentials and are masked when scrubbing is on.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "proxy-authorization",
    "x-api-key",
    "x-auth-token",
    "x-access-token",
];

/// Ordered field map describing one handled request.
///
/// Insertion order is preserved; re-inserting an existing key overwrites the
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LogRecord(Map<String, Value>);

impl LogRecord {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Single-line JSON encoding.
    pub fn to_json(&self) -> String {
        // A map of JSON values with string keys always serializes.
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

/// Builds [`LogRecord`]s. Immutable after construction.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    scrub_headers: bool,
    extra_sensitive: Vec<String>,
}

impl Default for RecordAssembler {
    fn default() -> Self {
        Self::from_config(&LoggingConfig::default())
    }
}

impl RecordAssembler {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            scrub_headers: config.scrub_headers,
            extra_sensitive: config
                .extra_sensitive_headers
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Record for a request the handler answered.
    ///
    /// Fields are written in precedence order, later writes winning on key
    /// collision: `status_code`/`time`, `method`/`path`/`user`, client headers,
    /// then `path_{i}` per `/`-separated segment.
    pub fn assemble(
        &self,
        request: &LoggedRequest,
        response: &LoggedResponse,
        elapsed: Duration,
    ) -> LogRecord {
        let mut record = LogRecord::default();
        record.insert("status_code", response.status_code);
        record.insert("time", elapsed.as_secs_f64());
        self.fill_request(&mut record, request);
        record
    }

    /// Record for a request whose handler failed. Reported as a 500 with the
    /// error text attached.
    pub fn assemble_failure(
        &self,
        request: &LoggedRequest,
        elapsed: Duration,
        error: &str,
    ) -> LogRecord {
        let mut record = LogRecord::default();
        record.insert("status_code", 500u16);
        record.insert("time", elapsed.as_secs_f64());
        self.fill_request(&mut record, request);
        record.insert("error", error);
        record
    }

    fn fill_request(&self, record: &mut LogRecord, request: &LoggedRequest) {
        record.insert("method", request.method.as_str());
        record.insert("path", request.path.as_str());
        record.insert("user", request.user.as_str());

        for (key, value) in request.client_headers() {
            if self.is_sensitive(key) {
                record.insert(key, REDACTED);
            } else {
                record.insert(key, value);
            }
        }

        for (i, segment) in request.path.split('/').enumerate() {
            record.insert(format!("path_{i}"), segment);
        }
    }

    fn is_sensitive(&self, meta_key: &str) -> bool {
        if !self.scrub_headers {
            return false;
        }
        let name = meta_key
            .strip_prefix(HEADER_PREFIX)
            .unwrap_or(meta_key)
            .replace('_', "-")
            .to_ascii_lowercase();
        SENSITIVE_HEADERS.contains(&name.as_str()) || self.extra_sensitive.iter().any(|h| *h == name)
    }
}
