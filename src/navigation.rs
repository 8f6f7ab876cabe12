//! Navigation boundary used by the session-expiry policy
//!
//! The pipeline never touches the host UI directly; it only asks a
//! [`Navigator`] where the user currently is and, when a session expires on a
//! non-public route, tells it to redirect to the login entry point. Headless
//! embedders and tests substitute a recording implementation.

use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Capability to observe and change the current UI location
pub trait Navigator: Send + Sync {
    /// The UI route the user is currently on
    fn current_path(&self) -> String;

    /// Hard redirect to the given route
    fn redirect_to(&self, path: &str);
}

/// Navigator that records redirects instead of performing them
///
/// Useful for headless environments and tests; `redirect_to` also updates the
/// current path, the way a real navigation would.
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<String>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Create a navigator positioned at the given route
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(path.into()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    /// Move to a route without recording a redirect
    pub fn set_current_path(&self, path: impl Into<String>) {
        *self.lock_current() = path.into();
    }

    /// Redirects performed so far, in order
    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, String> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.lock_current().clone()
    }

    fn redirect_to(&self, path: &str) {
        debug!(%path, "RecordingNavigator::redirect_to: called");
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
        *self.lock_current() = path.to_string();
    }
}
