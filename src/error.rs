//! Error taxonomy for the request pipeline
//!
//! Every failure a caller can observe is one of these variants. The pipeline
//! classifies each settled request exactly once and never retries.

use thiserror::Error;

/// HTTP status that marks the credential as invalid or expired
pub const UNAUTHORIZED_STATUS: u16 = 401;

/// Errors surfaced to callers of the request pipeline
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport never received a response (connection refused, DNS
    /// failure, timeout, client-side abort)
    #[error("could not reach the backend: {message}")]
    Network { message: String },

    /// The backend responded with a non-2xx status
    #[error("backend rejected the request with HTTP {status}")]
    Http { status: u16, body: serde_json::Value },

    /// The backend rejected the credential (HTTP 401)
    #[error("session expired or credentials rejected (HTTP {status})")]
    Unauthorized { status: u16, body: serde_json::Value },

    /// Reserved for cancellation support; not produced by the base pipeline
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Classify a backend error response by status code
    pub fn classify(status: u16, body: serde_json::Value) -> Self {
        if status == UNAUTHORIZED_STATUS {
            ApiError::Unauthorized { status, body }
        } else {
            ApiError::Http { status, body }
        }
    }

    /// The HTTP status, if the backend produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::Unauthorized { status, .. } => Some(*status),
            ApiError::Network { .. } | ApiError::Cancelled => None,
        }
    }

    /// The response body, if the backend produced one
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            ApiError::Http { body, .. } | ApiError::Unauthorized { body, .. } => Some(body),
            ApiError::Network { .. } | ApiError::Cancelled => None,
        }
    }

    /// Check whether no response was received at all
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// Check whether this is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_401_as_unauthorized() {
        let err = ApiError::classify(401, serde_json::json!({"detail": "token expired"}));
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_classify_other_statuses_as_http() {
        for status in [400, 403, 404, 422, 500, 503] {
            let err = ApiError::classify(status, serde_json::Value::Null);
            assert!(!err.is_unauthorized(), "status {status} must not be unauthorized");
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_network_error_has_no_status() {
        let err = ApiError::Network {
            message: "connection refused".to_string(),
        };
        assert!(err.is_network());
        assert_eq!(err.status(), None);
        assert_eq!(err.body(), None);
    }

    #[test]
    fn test_network_message_distinct_from_http() {
        let network = ApiError::Network {
            message: "connection refused".to_string(),
        };
        let http = ApiError::Http {
            status: 500,
            body: serde_json::Value::Null,
        };
        assert_ne!(network.to_string(), http.to_string());
        assert!(network.to_string().contains("could not reach"));
    }

    #[test]
    fn test_http_error_keeps_body_verbatim() {
        let body = serde_json::json!({"code": "E42", "detail": "nope"});
        let err = ApiError::classify(422, body.clone());
        assert_eq!(err.body(), Some(&body));
    }
}
