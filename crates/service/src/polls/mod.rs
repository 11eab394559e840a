//! Poll workflow: list, get, create, delete and vote.

pub mod service;

pub use service::PollService;
