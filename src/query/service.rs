//! Query service implementation
//!
//! Read-only operations over whichever backend was opened at startup:
//! - Recent stones (fixed small limit)
//! - All stones
//! - Single stone lookup by unique id

use crate::stone::{StoneDetail, StoneRecord, StoneSummary};
use crate::storage::{StoneStore, StoreHandle};
use crate::{Error, Result};

/// Default number of stones returned by [`QueryService::list_recent`]
pub const RECENT_LIMIT: usize = 5;

/// Query service for the stone catalog
#[derive(Debug, Clone)]
pub struct QueryService {
    handle: StoreHandle,
}

impl QueryService {
    /// Create a new query service reading through `handle`
    pub fn new(handle: StoreHandle) -> Self {
        Self { handle }
    }

    fn store(&self) -> &dyn StoneStore {
        self.handle.store()
    }

    /// Up to `limit` stones, most recently created first
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<StoneSummary>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stones = self.store().ordered_find(Some(limit)).await.map_err(|e| {
            tracing::error!(error = %e, limit, "Failed to fetch recent stones");
            Error::Query(e)
        })?;

        tracing::debug!(count = stones.len(), limit, "Retrieved recent stones");
        Ok(summarize(&stones))
    }

    /// Every stone, most recently created first
    pub async fn list_all(&self) -> Result<Vec<StoneSummary>> {
        let stones = self.store().ordered_find(None).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch stones");
            Error::Query(e)
        })?;

        tracing::debug!(count = stones.len(), "Retrieved all stones");
        Ok(summarize(&stones))
    }

    /// One stone with its full details, or `None` if no stone has that id
    pub async fn find_by_unique_id(&self, unique_id: &str) -> Result<Option<StoneDetail>> {
        let stone = self.store().find_by_unique_id(unique_id).await.map_err(|e| {
            tracing::error!(error = %e, unique_id, "Failed to fetch stone");
            Error::Query(e)
        })?;

        match stone {
            Some(stone) => Ok(Some(stone.to_detail())),
            None => {
                tracing::debug!(unique_id, "Stone not found");
                Ok(None)
            }
        }
    }
}

fn summarize(stones: &[StoneRecord]) -> Vec<StoneSummary> {
    stones.iter().map(StoneRecord::to_summary).collect()
}
