//! View Lifetime
//!
//! Binds pending remote calls to the time the view is active. Once the view
//! is deactivated, calls still in flight are dropped and their results never
//! reach the view state.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared activity flag of one view
#[derive(Debug, Clone)]
pub struct ViewLifetime {
    active: Arc<watch::Sender<bool>>,
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewLifetime {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self {
            active: Arc::new(tx),
        }
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// Deactivate the view. Irreversible.
    pub fn deactivate(&self) {
        if self.active.send_replace(false) {
            tracing::debug!("View deactivated");
        }
    }

    /// Run `fut` while the view is active.
    ///
    /// Returns `None` if the view was already inactive, or became inactive
    /// before `fut` finished.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if !self.is_active() {
            return None;
        }

        let mut rx = self.active.subscribe();
        let deactivated = async move {
            while rx.changed().await.is_ok() {
                if !*rx.borrow() {
                    break;
                }
            }
        };

        tokio::select! {
            output = fut => self.is_active().then_some(output),
            _ = deactivated => None,
        }
    }
}
