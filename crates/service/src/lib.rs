//! Service layer implementing the poll workflow on top of an injected store.
//! - `storage` holds the persistence abstraction and its implementations.
//! - `polls` holds the business rules (validation, id assignment, voting).
//! - Errors are reported through a single `ServiceError` taxonomy.

pub mod errors;
pub mod polls;
pub mod storage;

pub use errors::ServiceError;
pub use polls::PollService;
pub use storage::{csv_table_store::CsvPollStore, memory_store::MemoryPollStore, PollStore};
