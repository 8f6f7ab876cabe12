//! Transport boundary between the pipeline and the wire
//!
//! The [`Transport`] trait is the single suspension point of the pipeline.
//! A transport error means "no response was received"; responses carrying an
//! error status come back as `Ok` so the pipeline owns classification.

use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// HTTP methods accepted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Uppercase wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body payloads
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured JSON payload
    Json(serde_json::Value),
    /// Pre-encoded form payload (application/x-www-form-urlencoded),
    /// used by login-style calls
    Form(Vec<(String, String)>),
}

/// How a successful response body should be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseKind {
    /// Decode as JSON, falling back to a string value for non-JSON bodies
    #[default]
    Json,
    /// Return the raw bytes (file downloads)
    Bytes,
}

/// Decoded response payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl Payload {
    /// The JSON value, if this payload was decoded as JSON
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Bytes(_) => None,
        }
    }

    /// The raw bytes, if this payload was decoded as bytes
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Payload::Json(_) => None,
            Payload::Bytes(bytes) => Some(bytes),
        }
    }

    /// Borrow the JSON value, if present
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Bytes(_) => None,
        }
    }
}

/// A fully composed outbound request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
    pub response_kind: ResponseKind,
}

impl TransportRequest {
    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response received from the backend, any status
///
/// Error statuses always carry a JSON-decoded body regardless of the
/// requested [`ResponseKind`], so the pipeline can surface it verbatim.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Payload,
}

impl TransportResponse {
    /// Check whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failure: no response was received
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The underlying dispatch function the pipeline delegates to
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and wait for it to settle
    async fn dispatch(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by reqwest
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Build a transport with the given default timeout
    pub fn new(default_timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(default_timeout)
            .build()
            .map_err(|e| TransportError::new(e.to_string()))?;
        Ok(Self { http })
    }

    fn describe(error: &reqwest::Error) -> String {
        if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn dispatch(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "dispatch: called");

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.url).timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| TransportError::new(Self::describe(&e)))?;

        let status = response.status().as_u16();
        let success = response.status().is_success();

        // Error bodies are always decoded as JSON-ish text so classification
        // can carry them verbatim.
        let body = if success && request.response_kind == ResponseKind::Bytes {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| TransportError::new(Self::describe(&e)))?;
            Payload::Bytes(bytes.to_vec())
        } else {
            let text = response
                .text()
                .await
                .map_err(|e| TransportError::new(Self::describe(&e)))?;
            let value = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
            Payload::Json(value)
        };

        debug!(status, "dispatch: settled");
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_payload_accessors() {
        let json = Payload::Json(serde_json::json!({"id": 1}));
        assert_eq!(json.as_json(), Some(&serde_json::json!({"id": 1})));
        assert_eq!(json.clone().into_bytes(), None);
        assert_eq!(json.into_json(), Some(serde_json::json!({"id": 1})));

        let bytes = Payload::Bytes(vec![1, 2, 3]);
        assert_eq!(bytes.as_json(), None);
        assert_eq!(bytes.into_bytes(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_response_success_range() {
        let ok = TransportResponse {
            status: 204,
            body: Payload::Json(serde_json::Value::Null),
        };
        assert!(ok.is_success());

        let err = TransportResponse {
            status: 404,
            body: Payload::Json(serde_json::Value::Null),
        };
        assert!(!err.is_success());
    }

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let request = TransportRequest {
            method: Method::Get,
            url: "http://localhost:8000/items".to_string(),
            headers: vec![("Authorization".to_string(), "Bearer tok".to_string())],
            query: vec![],
            body: None,
            timeout: Duration::from_secs(10),
            response_kind: ResponseKind::Json,
        };

        assert_eq!(request.header("authorization"), Some("Bearer tok"));
        assert_eq!(request.header("x-missing"), None);
    }

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new(Duration::from_secs(10)).is_ok());
    }
}
