//! Storage abstractions for the poll table.
//!
//! The service only talks to `PollStore`, so the flat CSV file used in
//! production can be swapped for the in-memory store in tests.

use async_trait::async_trait;
use models::Poll;

use crate::errors::ServiceError;

pub mod csv_table_store;
pub mod memory_store;

/// Whole-table persistence for polls.
///
/// Implementations perform no locking of their own; callers serialize writers.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Create an empty table if none exists yet. Idempotent.
    async fn initialize(&self) -> Result<(), ServiceError>;

    /// Every poll, in store order.
    async fn load_all(&self) -> Result<Vec<Poll>, ServiceError>;

    /// Replace the whole table with `polls`.
    async fn save_all(&self, polls: &[Poll]) -> Result<(), ServiceError>;

    /// Add one row at the end without rewriting the others.
    async fn append_one(&self, poll: &Poll) -> Result<(), ServiceError>;
}
