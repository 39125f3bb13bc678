//! Storage seam for the analysis resource
//!
//! The hosting platform owns persistence; the server is constructed with a
//! boxed store and never reaches for a process-wide singleton. The contract
//! below is what any backend must honor — see the invariant notes on each
//! method.

use crate::entity::{Analysis, MetadataUpdate, NewAnalysis};
use crate::error::Result;
use crate::policy::AccessPolicy;
use async_trait::async_trait;

/// Pagination window for list queries
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: 20,
            offset: 0,
        }
    }
}

/// Persistence operations for analyses and their dependent ratings
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist a new analysis with a generated id and the default policy.
    ///
    /// Rejects with [`crate::StoreError::InvalidPayload`] when `data` is not
    /// valid JSON text; nothing is persisted in that case.
    async fn create(&self, new: NewAnalysis) -> Result<Analysis>;

    /// Fetch one analysis without side effects
    async fn get(&self, id: u64) -> Result<Analysis>;

    /// List analyses ordered by creation time descending (ties broken by id
    /// descending). Duplicate titles are permitted.
    async fn list(&self, page: Page) -> Result<Vec<Analysis>>;

    /// Overwrite the payload. Same JSON validation as [`Self::create`].
    async fn update_data(&self, id: u64, data: String) -> Result<Analysis>;

    /// Persist metadata fields (title/abstract already sanitized upstream)
    async fn update_metadata(&self, id: u64, meta: MetadataUpdate) -> Result<Analysis>;

    /// Increment the popularity counter by exactly 1 and return the updated
    /// entity. The increment must be atomic at the storage layer so
    /// concurrent detail views never lose an update.
    async fn record_view(&self, id: u64) -> Result<Analysis>;

    /// Remove the analysis and every rating referencing it as one logical
    /// unit; no dangling rating is ever observable.
    async fn remove(&self, id: u64) -> Result<()>;

    /// Attach a rating to an analysis
    async fn add_rating(&self, id: u64, principal: &str, score: u8) -> Result<()>;

    /// Count ratings referencing an analysis (0 for unknown ids, so the
    /// cleanup invariant can be asserted after removal)
    async fn rating_count(&self, id: u64) -> Result<usize>;

    /// Replace the access policy on an analysis
    async fn set_policy(&self, id: u64, policy: AccessPolicy) -> Result<()>;
}
