//! Poll records and the fixed table layout they are persisted in.

pub mod errors;
pub mod layout;
pub mod poll;

pub use errors::ModelError;
pub use poll::{Poll, PollOption};
