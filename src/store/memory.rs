use crate::core::cache::RateStore;
use crate::core::rate::CachedRate;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory rate store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryRateStore {
    current: Mutex<Option<CachedRate>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn latest(&self) -> Result<Option<CachedRate>> {
        let current = self.current.lock().await;
        if current.is_some() {
            debug!("Cache HIT for rate row");
        } else {
            debug!("Cache MISS for rate row");
        }
        Ok(current.clone())
    }

    async fn upsert(&self, rate: &CachedRate) -> Result<()> {
        let mut current = self.current.lock().await;
        debug!(rate = %rate.value, "Cache PUT for rate row");
        *current = Some(rate.clone());
        Ok(())
    }
}
