use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use models::Poll;
use tokio::sync::RwLock;

use super::PollStore;
use crate::errors::ServiceError;

/// In-memory poll table for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryPollStore {
    rows: RwLock<Vec<Poll>>,
    fail_writes: AtomicBool,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Poll>) -> Self {
        Self { rows: RwLock::new(rows), fail_writes: AtomicBool::new(false) }
    }

    /// Make every subsequent write fail with `StoreWrite`, as a full disk would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), ServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ServiceError::StoreWrite("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PollStore for MemoryPollStore {
    async fn initialize(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Poll>, ServiceError> {
        Ok(self.rows.read().await.clone())
    }

    async fn save_all(&self, polls: &[Poll]) -> Result<(), ServiceError> {
        self.check_writable()?;
        *self.rows.write().await = polls.to_vec();
        Ok(())
    }

    async fn append_one(&self, poll: &Poll) -> Result<(), ServiceError> {
        self.check_writable()?;
        self.rows.write().await.push(poll.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() -> Result<(), anyhow::Error> {
        let store = MemoryPollStore::new();
        assert!(store.load_all().await?.is_empty());

        let p = Poll::new(1, "q", vec!["a".into()], 100)?;
        store.append_one(&p).await?;
        assert_eq!(store.load_all().await?, vec![p.clone()]);

        store.save_all(&[]).await?;
        assert!(store.load_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failed_writes_leave_rows_alone() -> Result<(), anyhow::Error> {
        let p = Poll::new(1, "q", vec!["a".into()], 100)?;
        let store = MemoryPollStore::with_rows(vec![p.clone()]);
        store.set_fail_writes(true);
        assert!(matches!(store.save_all(&[]).await, Err(ServiceError::StoreWrite(_))));
        assert!(matches!(store.append_one(&p).await, Err(ServiceError::StoreWrite(_))));
        assert_eq!(store.load_all().await?, vec![p]);
        Ok(())
    }
}
