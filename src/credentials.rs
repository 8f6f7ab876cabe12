//! Process-wide credential store
//!
//! Holds the bearer token and an optional advisory profile for the current
//! session. Token presence is the sole predicate for "authenticated"; the
//! profile may be absent. Set on successful login, read on every outbound
//! request, cleared on explicit logout or on an authorization failure.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default credential lifetime: 7 days
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A stored session credential
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// Opaque bearer token
    pub token: String,
    /// Advisory user-profile record; may be absent
    pub profile: Option<serde_json::Value>,
}

#[derive(Debug)]
struct StoredCredential {
    token: String,
    profile: Option<serde_json::Value>,
    /// None means the credential never expires on the client side
    expires_at: Option<Instant>,
}

/// Cloneable handle to the process-wide credential store
///
/// The store has exactly two writer paths: the login/logout action calls
/// [`set`](CredentialStore::set) / [`clear`](CredentialStore::clear), and the
/// pipeline calls [`clear`](CredentialStore::clear) on authorization failure.
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Arc<Mutex<Option<StoredCredential>>>,
}

impl CredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a credential, replacing any previous one
    ///
    /// `max_age` is caller-controlled; `None` keeps the credential until an
    /// explicit clear.
    pub fn set(&self, token: impl Into<String>, profile: Option<serde_json::Value>, max_age: Option<Duration>) {
        let token = token.into();
        debug!(has_profile = profile.is_some(), ?max_age, "CredentialStore::set: called");
        let mut guard = self.lock();
        *guard = Some(StoredCredential {
            token,
            profile,
            expires_at: max_age.map(|age| Instant::now() + age),
        });
    }

    /// Read the current credential
    ///
    /// An expired credential is treated as absent and cleared in place.
    pub fn get(&self) -> Option<Credential> {
        let mut guard = self.lock();

        let expired = matches!(
            guard.as_ref().and_then(|stored| stored.expires_at),
            Some(expires_at) if Instant::now() >= expires_at
        );
        if expired {
            debug!("CredentialStore::get: credential expired, clearing");
            *guard = None;
            return None;
        }

        guard.as_ref().map(|stored| Credential {
            token: stored.token.clone(),
            profile: stored.profile.clone(),
        })
    }

    /// Read just the bearer token
    pub fn token(&self) -> Option<String> {
        self.get().map(|c| c.token)
    }

    /// Remove the stored credential
    pub fn clear(&self) {
        debug!("CredentialStore::clear: called");
        let mut guard = self.lock();
        *guard = None;
    }

    /// Check whether a live token is present
    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredCredential>> {
        // A poisoned lock only means a writer panicked; the stored value is
        // still a coherent Option.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_is_unauthenticated() {
        let store = CredentialStore::new();
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_set_and_get() {
        let store = CredentialStore::new();
        store.set("tok-123", Some(serde_json::json!({"name": "admin"})), None);

        let credential = store.get().expect("credential should be present");
        assert_eq!(credential.token, "tok-123");
        assert_eq!(credential.profile, Some(serde_json::json!({"name": "admin"})));
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_token_without_profile_is_authenticated() {
        let store = CredentialStore::new();
        store.set("tok-123", None, None);

        assert!(store.is_authenticated());
        assert_eq!(store.get().unwrap().profile, None);
    }

    #[test]
    fn test_clear_removes_credential() {
        let store = CredentialStore::new();
        store.set("tok-123", None, None);
        store.clear();

        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clones_share_state() {
        let store = CredentialStore::new();
        let other = store.clone();

        store.set("tok-123", None, None);
        assert_eq!(other.token(), Some("tok-123".to_string()));

        other.clear();
        assert!(!store.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_credential_is_absent() {
        let store = CredentialStore::new();
        store.set("tok-123", None, Some(Duration::from_secs(60)));

        assert!(store.is_authenticated());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!store.is_authenticated());
        assert_eq!(store.get(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_live_until_max_age() {
        let store = CredentialStore::new();
        store.set("tok-123", None, Some(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.is_authenticated());
    }
}
