//! Storage for the single cached rate row.

use crate::core::rate::CachedRate;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Returns the most recently updated entry, if any.
    async fn latest(&self) -> Result<Option<CachedRate>>;

    /// Inserts the entry, replacing whatever was current.
    async fn upsert(&self, rate: &CachedRate) -> Result<()>;
}
