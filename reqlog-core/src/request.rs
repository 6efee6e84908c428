//! Read-only request and response views handed to the interceptor.
//!
//! Headers are exposed through a CGI-style `meta` map so that the forwarding
//! rule ("client-supplied headers live under `HTTP_*`") is independent of the
//! host server's header representation.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of the client-supplied header namespace in [`LoggedRequest::meta`].
pub const HEADER_PREFIX: &str = "HTTP_";

/// Request data captured before the wrapped handler runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggedRequest {
    /// HTTP method as sent (uppercase for standard methods).
    pub method: String,
    /// Path without query string.
    pub path: String,
    /// Path plus `?query` when a query string is present.
    pub full_path: String,
    /// Transport metadata: `HTTP_*` headers plus `CONTENT_TYPE` / `CONTENT_LENGTH`.
    pub meta: BTreeMap<String, String>,
    /// Authenticated username; empty for anonymous requests.
    #[serde(default)]
    pub user: String,
    /// Raw body, when the host captured it.
    #[serde(skip)]
    pub body: Option<Bytes>,
}

impl LoggedRequest {
    pub fn new(method: impl Into<String>, full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let path = match full_path.find('?') {
            Some(pos) => full_path[..pos].to_string(),
            None => full_path.clone(),
        };
        Self {
            method: method.into(),
            path,
            full_path,
            meta: BTreeMap::new(),
            user: String::new(),
            body: None,
        }
    }

    /// Build a view of an `http::Request`. The body is not captured; see
    /// [`LoggedRequest::with_body`].
    pub fn from_http<B>(req: &http::Request<B>, user: Option<&str>) -> Self {
        let full_path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());

        let mut view = Self::new(req.method().as_str(), full_path);
        for name in req.headers().keys() {
            let joined = req
                .headers()
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            view.meta.insert(meta_key(name.as_str()), joined);
        }
        if let Some(user) = user {
            view.user = user.to_string();
        }
        view
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Insert a header under its meta key (`X-Foo` → `HTTP_X_FOO`).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.meta.insert(meta_key(name), value.into());
        self
    }

    /// Insert a raw meta entry, bypassing header-name translation.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.meta.get("CONTENT_TYPE").map(String::as_str)
    }

    /// Client-supplied headers, in meta-key order.
    pub fn client_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.meta
            .iter()
            .filter(|(k, _)| k.starts_with(HEADER_PREFIX))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Translate a header name into its meta key.
///
/// `Content-Type` and `Content-Length` keep their bare names and therefore
/// fall outside the forwarded namespace.
pub fn meta_key(header: &str) -> String {
    let upper = header.to_ascii_uppercase().replace('-', "_");
    match upper.as_str() {
        "CONTENT_TYPE" | "CONTENT_LENGTH" => upper,
        _ => format!("{HEADER_PREFIX}{upper}"),
    }
}

/// Response data the interceptor reads after the handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedResponse {
    pub status_code: u16,
}

impl LoggedResponse {
    pub fn new(status_code: u16) -> Self {
        Self { status_code }
    }
}

impl<B> From<&http::Response<B>> for LoggedResponse {
    fn from(resp: &http::Response<B>) -> Self {
        Self {
            status_code: resp.status().as_u16(),
        }
    }
}
