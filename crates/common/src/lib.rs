//! Shared ambient helpers used by every crate in the poll board workspace.

pub mod types;
pub mod utils;
