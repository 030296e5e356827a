//! Remote Data Store
//!
//! The hosted table service is the single source of truth for objectives and
//! key results. This module holds the seam the view talks through.
//!
//! ## Architecture
//!
//! - **DataStore**: the two operations the page needs (select, insert)
//! - **RestClient**: PostgREST implementation used in production
//! - **MemoryStore**: in-process implementation for tests
//! - **SelectQuery**: collection, filters and ordering of a read

mod client;
mod error;
mod memory;
mod query;

pub use client::RestClient;
pub use error::{RemoteError, RemoteResult};
pub use memory::{MemoryStore, StoreCall, StoreOp};
pub use query::{Filter, Order, SelectQuery};

use async_trait::async_trait;
use serde_json::Value;

/// Table-oriented access to the remote store
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Short name of the backend, for logs and health output
    fn backend_tag(&self) -> &'static str;

    /// Whether the store has the endpoint and credentials it needs
    fn is_configured(&self) -> bool;

    /// Read the rows matching a query
    async fn select(&self, query: &SelectQuery) -> RemoteResult<Vec<Value>>;

    /// Insert rows into a collection, returning them as the store echoes them
    async fn insert(&self, table: &str, rows: Vec<Value>) -> RemoteResult<Vec<Value>>;
}
