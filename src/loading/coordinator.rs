//! Reference-counted, debounced visibility signal

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default minimum duration the busy signal stays visible once raised
pub const MIN_DISPLAY_TIME: Duration = Duration::from_millis(300);

/// Observable phase of the coordinator
///
/// - `Idle`: nothing in flight, signal off
/// - `Active`: at least one request in flight, signal on
/// - `Draining`: nothing in flight but the signal is held on until the
///   minimum display time has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    Idle,
    Active,
    Draining,
}

#[derive(Debug)]
struct LoadingState {
    /// In-flight reference count, floored at zero
    count: u64,
    /// Derived busy signal read by the UI
    visible: bool,
    /// When the current visible episode began (set on every 0->1 transition)
    started_at: Option<Instant>,
    /// Correlation ids of requests that opted into the signal
    pending: HashSet<String>,
    /// Invalidates scheduled deactivations; bumped whenever the count leaves
    /// zero and on reset, so at most one scheduled deactivation is live
    epoch: u64,
}

/// Cloneable handle to the process-wide busy signal
///
/// Callers must pair every [`begin`](LoadingCoordinator::begin) with exactly
/// one [`end`](LoadingCoordinator::end); ids are assumed unique per call, and
/// passing the same id twice double-counts by design. Scheduling the delayed
/// deactivation requires a Tokio runtime.
#[derive(Clone)]
pub struct LoadingCoordinator {
    state: Arc<Mutex<LoadingState>>,
    min_display: Duration,
}

impl Default for LoadingCoordinator {
    fn default() -> Self {
        Self::new(MIN_DISPLAY_TIME)
    }
}

impl LoadingCoordinator {
    /// Create a coordinator with the given minimum display time
    pub fn new(min_display: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoadingState {
                count: 0,
                visible: false,
                started_at: None,
                pending: HashSet::new(),
                epoch: 0,
            })),
            min_display,
        }
    }

    /// Register the start of a request
    ///
    /// A 0->1 transition raises the signal, starts a fresh visibility window,
    /// and supersedes any scheduled deactivation.
    pub fn begin(&self, id: &str) {
        let mut state = self.lock();
        state.count += 1;
        state.pending.insert(id.to_string());

        if state.count == 1 {
            state.epoch += 1;
            state.started_at = Some(Instant::now());
            state.visible = true;
        }

        debug!(%id, count = state.count, "begin: signal raised");
    }

    /// Register the completion of a request
    ///
    /// When the count returns to zero the signal is lowered, but never before
    /// the minimum display time has elapsed from the start of the current
    /// visible episode. An `end` with no matching `begin` is a no-op on the
    /// count.
    pub fn end(&self, id: &str) {
        let mut state = self.lock();
        state.pending.remove(id);

        if state.count == 0 {
            debug!(%id, "end: called without matching begin");
            return;
        }

        state.count -= 1;
        debug!(%id, count = state.count, "end: reference released");

        if state.count > 0 {
            return;
        }

        let elapsed = state
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or(self.min_display);

        if elapsed >= self.min_display {
            state.visible = false;
            state.started_at = None;
            debug!("end: signal lowered immediately");
        } else {
            let remaining = self.min_display - elapsed;
            let deadline = Instant::now() + remaining;
            let epoch = state.epoch;
            drop(state);

            debug!(remaining_ms = remaining.as_millis() as u64, "end: deactivation scheduled");
            let coordinator = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                coordinator.finish_drain(epoch);
            });
        }
    }

    /// Lower the signal if the scheduled deactivation is still current
    fn finish_drain(&self, epoch: u64) {
        let mut state = self.lock();
        if state.epoch == epoch && state.count == 0 {
            state.visible = false;
            state.started_at = None;
            debug!("finish_drain: signal lowered");
        } else {
            debug!("finish_drain: superseded");
        }
    }

    /// Whether the busy signal is currently raised
    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    /// Number of in-flight requests that opted into the signal
    pub fn count(&self) -> u64 {
        self.lock().count
    }

    /// Correlation ids currently in flight
    pub fn list_pending(&self) -> Vec<String> {
        let state = self.lock();
        let mut ids: Vec<String> = state.pending.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Observable state-machine phase
    pub fn phase(&self) -> LoadingPhase {
        let state = self.lock();
        match (state.count, state.visible) {
            (0, false) => LoadingPhase::Idle,
            (0, true) => LoadingPhase::Draining,
            (_, _) => LoadingPhase::Active,
        }
    }

    /// Forcibly zero the count, cancel any pending deactivation, and lower
    /// the signal
    ///
    /// Recovery hook for page-level resets, not part of normal request flow.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.count = 0;
        state.visible = false;
        state.started_at = None;
        state.pending.clear();
        state.epoch += 1;
        debug!("reset: cleared");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LoadingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
