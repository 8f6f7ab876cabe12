//! Request pipeline: the single choke point for all backend calls
//!
//! Every outbound request flows through [`Pipeline::send`], which owns the
//! cross-cutting policy so call sites stay declarative:
//! - bearer-header injection from the credential store
//! - busy-signal begin/end, paired on every exit path
//! - failure classification into the [`ApiError`](crate::error::ApiError)
//!   taxonomy
//! - the session-expiry policy (clear credentials, redirect to login unless
//!   the current route is public)
//!
//! The pipeline never retries; it is a single-attempt pass-through with
//! policy.

mod core;
mod options;

pub use self::core::{Pipeline, PipelineBuilder};
pub use options::{Outcome, PostHook, PreHook, RequestOptions};
