use std::sync::Arc;

use service::{PollService, PollStore};

/// Shared handler state: the poll service over whichever store was injected.
#[derive(Clone)]
pub struct ServerState {
    pub polls: Arc<PollService<dyn PollStore>>,
}

impl ServerState {
    pub fn new(polls: PollService<dyn PollStore>) -> Self {
        Self { polls: Arc::new(polls) }
    }
}
