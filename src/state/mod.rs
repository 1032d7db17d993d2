//! Shared application state: storage handle, SSE hubs, degraded-mode flag
//! and the progression gate serializing bracket mutations.

pub mod cup;
pub mod match_phase;
mod sse;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock, watch};

use crate::{
    config::AppConfig,
    dao::cup_store::CupStore,
    error::ServiceError,
    services::directory::{NullDirectory, PlayerDirectory},
};

pub use self::sse::{SseHub, SseStreams};

/// Cheaply clonable handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle, notification hubs
/// and runtime configuration.
pub struct AppState {
    cup_store: RwLock<Option<Arc<dyn CupStore>>>,
    sse: SseStreams,
    degraded: watch::Sender<bool>,
    progression_gate: Mutex<()>,
    directory: Arc<dyn PlayerDirectory>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is
    /// installed; player identities resolve through the null directory until
    /// a real one is supplied via [`AppState::with_directory`].
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_directory(config, Arc::new(NullDirectory))
    }

    /// Construct the state with an explicit player identity resolver.
    pub fn with_directory(config: AppConfig, directory: Arc<dyn PlayerDirectory>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            cup_store: RwLock::new(None),
            sse: SseStreams::new(16, 16),
            degraded: degraded_tx,
            progression_gate: Mutex::new(()),
            directory,
            config,
        })
    }

    /// Obtain a handle to the current cup store, if one is installed.
    pub async fn cup_store(&self) -> Option<Arc<dyn CupStore>> {
        let guard = self.cup_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the cup store or fail with the degraded-mode error.
    pub async fn require_cup_store(&self) -> Result<Arc<dyn CupStore>, ServiceError> {
        self.cup_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new cup store implementation and leave degraded mode.
    pub async fn set_cup_store(&self, store: Arc<dyn CupStore>) {
        {
            let mut guard = self.cup_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current cup store and enter degraded mode.
    pub async fn clear_cup_store(&self) {
        {
            let mut guard = self.cup_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Broadcast hub used for the admin SSE stream.
    pub fn admin_sse(&self) -> &SseHub {
        self.sse.admin().hub()
    }

    /// Token guard that ensures a single admin SSE subscriber at a time.
    pub fn admin_token(&self) -> &Mutex<Option<String>> {
        self.sse.admin().token()
    }

    /// Player identity resolver used at registration and roster edits.
    pub fn directory(&self) -> &Arc<dyn PlayerDirectory> {
        &self.directory
    }

    /// Runtime configuration (format presets).
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serialize bracket-mutating operations: every generation or finalize
    /// step runs to completion before the next begins, and duplicate
    /// triggers observe the state their predecessor left behind.
    pub async fn lock_progression(&self) -> MutexGuard<'_, ()> {
        self.progression_gate.lock().await
    }
}
