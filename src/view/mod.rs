//! OKR View
//!
//! The view model behind the OKR page. It loads every objective with its key
//! results, creates new records from form input and refreshes after each
//! successful write.
//!
//! ## Operations
//!
//! - [`OkrView::mount`]: first load when the page is shown
//! - [`OkrView::load_all`]: objectives newest first, then key results of
//!   all loaded objectives in one batched read
//! - [`OkrView::create_objective`] / [`OkrView::create_key_result`]: one
//!   insert each, followed by the configured [`RefreshStrategy`]
//!
//! Every state transition is published on a `watch` channel so readers can
//! render the page while an operation holds the view.

mod error;
mod forms;
mod lifetime;
mod load;
mod refresh;
mod state;

pub use error::{
    ViewError, CREATE_KEY_RESULT_FAILED, CREATE_OBJECTIVE_FAILED, LOAD_FAILED, TARGET_NOT_NUMBER,
};
pub use forms::parse_target;
pub use lifetime::ViewLifetime;
pub use refresh::RefreshStrategy;
pub use state::{FormState, Notice, NoticeKind, Phase, ViewState};

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::remote::{DataStore, RemoteResult};

/// View model of the OKR page
pub struct OkrView {
    store: Arc<dyn DataStore>,
    refresh: RefreshStrategy,
    lifetime: ViewLifetime,
    state: ViewState,
    published: watch::Sender<ViewState>,
}

impl OkrView {
    /// Create an idle, empty view on top of a data store
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        let (published, _rx) = watch::channel(ViewState::default());
        Self {
            store,
            refresh: RefreshStrategy::default(),
            lifetime: ViewLifetime::new(),
            state: ViewState::default(),
            published,
        }
    }

    pub fn with_refresh(mut self, refresh: RefreshStrategy) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Receive every published state
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.published.subscribe()
    }

    /// Handle used to deactivate the view from outside
    pub fn lifetime(&self) -> ViewLifetime {
        self.lifetime.clone()
    }

    /// First show of the page: runs the initial load exactly once
    pub async fn mount(&mut self) -> Result<(), ViewError> {
        if self.state.mounted {
            return Ok(());
        }
        self.state.mounted = true;
        self.load_all().await
    }

    /// Take the pending notification, so it is shown only once
    pub fn take_notice(&mut self) -> Option<Notice> {
        let notice = self.state.notice.take();
        if notice.is_some() {
            self.publish();
        }
        notice
    }

    fn publish(&self) {
        self.published.send_replace(self.state.clone());
    }

    fn ensure_active(&self) -> Result<(), ViewError> {
        if self.lifetime.is_active() {
            Ok(())
        } else {
            Err(ViewError::Detached)
        }
    }

    /// Enter `loading`
    fn begin(&mut self) {
        self.state.phase = Phase::Loading;
        self.state.notice = None;
        self.publish();
    }

    /// Enter `idle`
    fn finish(&mut self) {
        self.state.phase = Phase::Idle;
        self.publish();
    }

    /// Await a remote call bound to the view lifetime
    async fn remote<T>(
        &self,
        call: impl Future<Output = RemoteResult<T>>,
    ) -> Result<RemoteResult<T>, ViewError> {
        self.lifetime.run(call).await.ok_or(ViewError::Detached)
    }

    /// Surface a failure: log it, show it, go back to `idle`
    fn fail(&mut self, err: ViewError) -> ViewError {
        let message = err.user_message();
        match &err {
            ViewError::Validation(_) => tracing::info!(%message, "Input rejected"),
            _ => tracing::error!(error = %err, "View operation failed"),
        }

        let kind = match err {
            ViewError::Validation(_) => NoticeKind::Validation,
            _ => NoticeKind::Error,
        };
        self.state.notice = Some(Notice { kind, message });
        self.finish();
        err
    }
}
