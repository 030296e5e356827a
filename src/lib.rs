//! # OKR Board
//!
//! A single-page board for Objectives and Key Results, stored in a hosted
//! PostgREST table service.
//!
//! ## Features
//!
//! - **Objectives**: title plus optional owner, listed newest first
//! - **Key Results**: attached to one objective, with an optional numeric target
//! - **Refresh after write**: every successful create reloads the board
//! - **Server-rendered page**: plain HTML forms, no client runtime
//!
//! ## Modules
//!
//! - [`model`]: records and form input
//! - [`remote`]: the data store seam and its PostgREST client
//! - [`view`]: the page's view model (load, create, notices)
//! - [`api`]: HTTP server with Axum
//! - [`config`]: file and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use okr_board::remote::MemoryStore;
//! use okr_board::view::OkrView;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::okr());
//!     let mut view = OkrView::new(store);
//!
//!     view.mount().await?;
//!     view.create_objective("Grow users", "hong.vu").await?;
//!
//!     println!("{} objectives", view.state().objectives.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod model;
pub mod remote;
pub mod view;

// Re-export top-level types for convenience
pub use model::{
    KeyResult, KeyResultGroups, NewKeyResult, NewObjective, Objective, RecordId, KEY_RESULTS,
    OBJECTIVES,
};

pub use remote::{DataStore, MemoryStore, RemoteError, RemoteResult, RestClient, SelectQuery};

pub use view::{OkrView, RefreshStrategy, ViewError, ViewLifetime, ViewState};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig, RemoteConfig, ServerConfig, ViewConfig};
