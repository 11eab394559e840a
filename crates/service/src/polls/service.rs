use std::sync::Arc;

use models::layout::MAX_OPTION_SLOTS;
use models::poll::clean_options;
use models::Poll;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::storage::PollStore;

/// Application service encapsulating the poll rules on top of a `PollStore`.
///
/// Every mutation runs load, modify and save while holding `write_lock`, so
/// writers inside one process never interleave. Processes sharing the same
/// file are not coordinated.
pub struct PollService<S: PollStore + ?Sized> {
    store: Arc<S>,
    max_options: usize,
    /// Guards mutations and holds the highest id handed out so far.
    write_lock: Mutex<u64>,
}

impl<S: PollStore + ?Sized> PollService<S> {
    /// Initialize the store and seed the id high-water mark from its rows.
    pub async fn new(store: Arc<S>, max_options: usize) -> Result<Self, ServiceError> {
        store.initialize().await?;
        let polls = store.load_all().await?;
        let last_id = polls.iter().map(|p| p.id).max().unwrap_or(0);
        info!(rows = polls.len(), last_id, "poll store ready");
        Ok(Self {
            store,
            max_options: max_options.clamp(1, MAX_OPTION_SLOTS),
            write_lock: Mutex::new(last_id),
        })
    }

    pub fn max_options(&self) -> usize {
        self.max_options
    }

    pub async fn list_polls(&self) -> Result<Vec<Poll>, ServiceError> {
        self.store.load_all().await
    }

    pub async fn get_poll(&self, id: u64) -> Result<Poll, ServiceError> {
        self.store
            .load_all()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(ServiceError::NotFound(id))
    }

    /// Create a poll from raw option texts; blank entries are dropped first.
    #[instrument(skip(self, options), fields(raw_options = options.len()))]
    pub async fn create_poll(&self, question: &str, options: Vec<String>) -> Result<Poll, ServiceError> {
        let options = clean_options(options);
        if options.is_empty() {
            return Err(ServiceError::InvalidInput("At least one option is required".into()));
        }

        let mut last_id = self.write_lock.lock().await;
        let polls = self.store.load_all().await?;
        let max_existing = polls.iter().map(|p| p.id).max().unwrap_or(0);
        let id = max_existing
            .max(*last_id)
            .checked_add(1)
            .ok_or_else(|| ServiceError::StoreWrite("poll id space exhausted".into()))?;

        let poll = Poll::new(id, question, options, self.max_options)?;
        self.store.append_one(&poll).await?;
        *last_id = id;
        info!(poll_id = id, options = poll.options.len(), "poll created");
        Ok(poll)
    }

    /// Remove a poll; returns whether it existed. Unknown ids are a no-op.
    #[instrument(skip(self))]
    pub async fn delete_poll(&self, id: u64) -> Result<bool, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut polls = self.store.load_all().await?;
        let Some(pos) = polls.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        polls.remove(pos);
        self.store.save_all(&polls).await?;
        info!(poll_id = id, "poll deleted");
        Ok(true)
    }

    /// Add exactly one vote to the 1-based `option` slot of poll `id`.
    ///
    /// Duplicate-vote prevention is the caller's job.
    #[instrument(skip(self))]
    pub async fn record_vote(&self, id: u64, option: usize) -> Result<Poll, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut polls = self.store.load_all().await?;
        let poll = polls
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ServiceError::NotFound(id))?;
        let tally = poll.record_vote(option).map_err(|e| {
            warn!(poll_id = id, option, "vote for absent option");
            ServiceError::from(e)
        })?;
        let updated = poll.clone();
        self.store.save_all(&polls).await?;
        info!(poll_id = id, option, tally, "vote recorded");
        Ok(updated)
    }
}
