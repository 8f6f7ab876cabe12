//! Per-request options and hook types

use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;
use crate::transport::{Payload, ResponseKind, TransportRequest};

/// The terminal result of one request
pub type Outcome = Result<Payload, ApiError>;

/// Pure request-to-request transformation applied before dispatch
///
/// Hooks are composed at construction time and run in registration order,
/// after built-in auth injection.
pub type PreHook = Arc<dyn Fn(TransportRequest) -> TransportRequest + Send + Sync>;

/// Pure outcome-to-outcome transformation applied after classification
pub type PostHook = Arc<dyn Fn(Outcome) -> Outcome + Send + Sync>;

/// Caller-controlled knobs for a single request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Whether this request participates in the global busy signal
    pub show_loading: bool,

    /// Extra headers, appended after auth injection
    pub headers: Vec<(String, String)>,

    /// Query parameters, serialized by the transport
    pub query: Vec<(String, String)>,

    /// Per-request timeout override
    pub timeout: Option<Duration>,

    /// How the response body should be decoded
    pub response_kind: ResponseKind,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            show_loading: true,
            headers: Vec::new(),
            query: Vec::new(),
            timeout: None,
            response_kind: ResponseKind::Json,
        }
    }
}

impl RequestOptions {
    /// Opt out of the busy signal (background polls, autosaves)
    pub fn silent(mut self) -> Self {
        self.show_loading = false;
        self
    }

    /// Append a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Override the default request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Request the raw response bytes instead of JSON
    pub fn as_bytes(mut self) -> Self {
        self.response_kind = ResponseKind::Bytes;
        self
    }
}
