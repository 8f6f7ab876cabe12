//! Global busy signal for in-flight requests
//!
//! The [`LoadingCoordinator`] gives any number of concurrent callers a single
//! source of truth for "is the application busy", with anti-flicker smoothing:
//! once the signal turns visible it stays visible for at least the configured
//! minimum display time.

mod coordinator;

pub use coordinator::{LoadingCoordinator, LoadingPhase, MIN_DISPLAY_TIME};
