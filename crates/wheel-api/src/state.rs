//! Shared application state.

use std::sync::{Arc, Mutex};

use wheel_core::clock::Clock;
use wheel_core::rng::DeterministicRng;
use wheel_core::store::KeyValueStore;
use wheel_draw::domain::session::{Session, SpinSettings};

/// Application state shared across all request handlers.
///
/// The session sits behind an async mutex because handlers hold it while
/// the store is written. The RNG sits behind a sync mutex and is only locked
/// around synchronous domain calls.
#[derive(Clone)]
pub struct AppState {
    /// The one session this process serves.
    pub session: Arc<tokio::sync::Mutex<Session>>,
    /// Where the session is persisted after every change.
    pub store: Arc<dyn KeyValueStore>,
    /// Clock for spin timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for draws, sub-segment picks and fallback hues.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Animation parameters applied to every spin.
    pub spin: SpinSettings,
}

impl AppState {
    /// Create new application state around a loaded session.
    #[must_use]
    pub fn new(
        session: Session,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        spin: SpinSettings,
    ) -> Self {
        Self {
            session: Arc::new(tokio::sync::Mutex::new(session)),
            store,
            clock,
            rng,
            spin,
        }
    }
}
