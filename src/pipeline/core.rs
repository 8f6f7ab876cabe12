//! Pipeline implementation

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::options::{Outcome, PostHook, PreHook, RequestOptions};
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::loading::LoadingCoordinator;
use crate::navigation::Navigator;
use crate::transport::{HttpTransport, Method, Payload, RequestBody, Transport, TransportRequest};

/// The request pipeline
///
/// Construct one per backend origin via [`PipelineBuilder`] at application
/// start; the credential store and loading coordinator it holds are shared,
/// cloneable handles the rest of the application reads.
pub struct Pipeline {
    base_url: String,
    timeout: Duration,
    login_path: String,
    public_paths: Vec<String>,
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
    loading: LoadingCoordinator,
    navigator: Arc<dyn Navigator>,
    pre_hooks: Vec<PreHook>,
    post_hooks: Vec<PostHook>,
}

/// Builder for [`Pipeline`]
///
/// The transport defaults to the reqwest-backed [`HttpTransport`]; the
/// navigator must always be supplied since only the embedder knows how to
/// move the UI.
pub struct PipelineBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<CredentialStore>,
    loading: Option<LoadingCoordinator>,
    navigator: Arc<dyn Navigator>,
    pre_hooks: Vec<PreHook>,
    post_hooks: Vec<PostHook>,
}

impl PipelineBuilder {
    /// Start a builder from configuration and a navigator
    pub fn new(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            config,
            transport: None,
            credentials: None,
            loading: None,
            navigator,
            pre_hooks: Vec::new(),
            post_hooks: Vec::new(),
        }
    }

    /// Substitute the transport (tests, alternative wire protocols)
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share an existing credential store
    pub fn credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Share an existing loading coordinator
    pub fn loading(mut self, loading: LoadingCoordinator) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Append a pre-dispatch hook
    pub fn pre_hook(mut self, hook: PreHook) -> Self {
        self.pre_hooks.push(hook);
        self
    }

    /// Append a post-classification hook
    pub fn post_hook(mut self, hook: PostHook) -> Self {
        self.post_hooks.push(hook);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline, ApiError> {
        let timeout = self.config.timeout();

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(timeout).map_err(|e| ApiError::Network {
                message: e.to_string(),
            })?),
        };

        Ok(Pipeline {
            base_url: self.config.base_url,
            timeout,
            login_path: self.config.login_path,
            public_paths: self.config.public_paths,
            transport,
            credentials: self.credentials.unwrap_or_default(),
            loading: self
                .loading
                .unwrap_or_else(|| LoadingCoordinator::new(Duration::from_millis(self.config.min_display_ms))),
            navigator: self.navigator,
            pre_hooks: self.pre_hooks,
            post_hooks: self.post_hooks,
        })
    }
}

impl Pipeline {
    /// The shared credential store (login/logout writer path)
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// The shared busy signal (UI reader path)
    pub fn loading(&self) -> &LoadingCoordinator {
        &self.loading
    }

    /// Send one request through the full policy chain
    ///
    /// Injects the bearer header when a credential is stored, pairs the busy
    /// signal begin/end on every exit path, classifies the outcome, applies
    /// the session-expiry policy on authorization failures, and returns the
    /// response payload rather than the transport envelope.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Outcome {
        let url = self.compose_url(path);
        let correlation_id = format!("{method} {path} {}", Uuid::now_v7());

        let mut request = TransportRequest {
            method,
            url,
            headers: Vec::new(),
            query: options.query,
            body,
            timeout: options.timeout.unwrap_or(self.timeout),
            response_kind: options.response_kind,
        };

        if let Some(token) = self.credentials.token() {
            request.headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        request.headers.extend(options.headers);

        for hook in &self.pre_hooks {
            request = hook(request);
        }

        let show_loading = options.show_loading;
        if show_loading {
            self.loading.begin(&correlation_id);
        }

        debug!(%method, path, %correlation_id, "send: dispatching");
        let started = Instant::now();

        let result = self.transport.dispatch(request).await;

        // The busy reference is released exactly once, on every exit path.
        if show_loading {
            self.loading.end(&correlation_id);
        }

        let duration_ms = started.elapsed().as_millis() as u64;

        let mut outcome = match result {
            Ok(response) if response.is_success() => {
                debug!(%method, path, status = response.status, duration_ms, "send: completed");
                Ok(response.body)
            }
            Ok(response) => {
                let status = response.status;
                let body = response.body.into_json().unwrap_or(serde_json::Value::Null);
                warn!(%method, path, status, duration_ms, %body, "send: backend rejected request");

                let error = ApiError::classify(status, body);
                if error.is_unauthorized() {
                    self.handle_session_expiry();
                }
                Err(error)
            }
            Err(e) => {
                warn!(%method, path, duration_ms, error = %e, "send: no response from backend");
                Err(ApiError::Network { message: e.message })
            }
        };

        for hook in &self.post_hooks {
            outcome = hook(outcome);
        }
        outcome
    }

    /// GET request
    pub async fn get(&self, path: &str, options: RequestOptions) -> Outcome {
        self.send(Method::Get, path, None, options).await
    }

    /// POST request with a JSON body
    pub async fn post(&self, path: &str, body: serde_json::Value, options: RequestOptions) -> Outcome {
        self.send(Method::Post, path, Some(RequestBody::Json(body)), options).await
    }

    /// PUT request with a JSON body
    pub async fn put(&self, path: &str, body: serde_json::Value, options: RequestOptions) -> Outcome {
        self.send(Method::Put, path, Some(RequestBody::Json(body)), options).await
    }

    /// PATCH request with a JSON body
    pub async fn patch(&self, path: &str, body: serde_json::Value, options: RequestOptions) -> Outcome {
        self.send(Method::Patch, path, Some(RequestBody::Json(body)), options).await
    }

    /// DELETE request
    pub async fn delete(&self, path: &str, options: RequestOptions) -> Outcome {
        self.send(Method::Delete, path, None, options).await
    }

    /// POST a form-urlencoded body (login-style calls)
    pub async fn post_form(&self, path: &str, fields: Vec<(String, String)>, options: RequestOptions) -> Outcome {
        self.send(Method::Post, path, Some(RequestBody::Form(fields)), options).await
    }

    /// GET raw bytes (file downloads)
    pub async fn download(&self, path: &str, options: RequestOptions) -> Result<Vec<u8>, ApiError> {
        let payload = self.send(Method::Get, path, None, options.as_bytes()).await?;
        match payload {
            Payload::Bytes(bytes) => Ok(bytes),
            // A transport that ignores the requested kind still settles the
            // call; surface the payload as empty rather than inventing an
            // error variant.
            Payload::Json(_) => Ok(Vec::new()),
        }
    }

    /// Clear credentials and redirect to login unless the current UI route is
    /// on the public-path allowlist
    fn handle_session_expiry(&self) {
        self.credentials.clear();

        let current = self.navigator.current_path();
        if self.is_public_path(&current) {
            debug!(%current, "session expired on a public path, skipping redirect");
        } else {
            info!(%current, login_path = %self.login_path, "session expired, redirecting to login");
            self.navigator.redirect_to(&self.login_path);
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        let normalized = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        self.public_paths.iter().any(|p| {
            let allowed = if p.len() > 1 { p.trim_end_matches('/') } else { p.as_str() };
            allowed == normalized
        })
    }

    fn compose_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
