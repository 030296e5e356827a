//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};

use crate::config::ServerConfig;
use crate::remote::DataStore;
use crate::view::{OkrView, RefreshStrategy, ViewLifetime, ViewState};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The page's view model; held by at most one operation at a time
    pub view: Arc<Mutex<OkrView>>,
    /// Last published view state, readable while an operation runs
    pub snapshot: watch::Receiver<ViewState>,
    /// Lifetime of the view, deactivated on shutdown
    pub lifetime: ViewLifetime,
    /// Remote store the view reads from and writes to
    pub store: Arc<dyn DataStore>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create the state around a fresh, unmounted view
    pub fn new(store: Arc<dyn DataStore>, refresh: RefreshStrategy, config: ServerConfig) -> Self {
        let view = OkrView::new(Arc::clone(&store)).with_refresh(refresh);
        let snapshot = view.subscribe();
        let lifetime = view.lifetime();

        Self {
            view: Arc::new(Mutex::new(view)),
            snapshot,
            lifetime,
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Latest published view state
    pub fn current_state(&self) -> ViewState {
        self.snapshot.borrow().clone()
    }
}
