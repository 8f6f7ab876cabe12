//! ApiWire - request-lifecycle middleware for the admin client
//!
//! Every outgoing call to the backend passes through a single pipeline that
//! attaches authentication, tracks a global busy signal, classifies failures,
//! and enforces the session-expiry policy. Per-endpoint wrappers and route
//! tables live in the host application; this crate is transport-and-policy
//! middleware only.
//!
//! # Core Concepts
//!
//! - **Single choke point**: call sites stay declarative (method, path,
//!   payload); [`Pipeline::send`] owns every cross-cutting concern
//! - **Paired busy signal**: each request that opts in holds exactly one
//!   loading reference, released on every exit path
//! - **Anti-flicker smoothing**: the busy signal never blinks off before the
//!   configured minimum display time
//! - **One recovery action**: the pipeline clears credentials on an
//!   authorization failure and otherwise rejects every error back to the
//!   caller, classified but unswallowed
//!
//! # Modules
//!
//! - [`pipeline`] - the request pipeline and its builder
//! - [`loading`] - reference-counted, debounced busy signal
//! - [`credentials`] - process-wide bearer token store
//! - [`transport`] - wire boundary trait and the reqwest implementation
//! - [`navigation`] - UI location capability used by the 401 policy
//! - [`error`] - the failure taxonomy callers branch on
//! - [`config`] - configuration types and loading

pub mod config;
pub mod credentials;
pub mod error;
pub mod loading;
pub mod navigation;
pub mod pipeline;
pub mod transport;

// Re-export commonly used types
pub use config::ClientConfig;
pub use credentials::{Credential, CredentialStore, DEFAULT_MAX_AGE};
pub use error::ApiError;
pub use loading::{LoadingCoordinator, LoadingPhase, MIN_DISPLAY_TIME};
pub use navigation::{Navigator, RecordingNavigator};
pub use pipeline::{Outcome, Pipeline, PipelineBuilder, PostHook, PreHook, RequestOptions};
pub use transport::{
    HttpTransport, Method, Payload, RequestBody, ResponseKind, Transport, TransportError, TransportRequest,
    TransportResponse,
};
