pub mod disk;
pub mod memory;

use crate::core::cache::RateStore;
use crate::core::config::CacheConfig;
use anyhow::Result;
use disk::DiskRateStore;
use memory::MemoryRateStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the rate store selected by the cache configuration.
pub fn open_store(config: &CacheConfig) -> Result<Arc<dyn RateStore>> {
    if !config.persist {
        debug!("Using in-memory rate cache");
        return Ok(Arc::new(MemoryRateStore::new()));
    }

    let path = config.data_path()?.join("cache");
    debug!("Using rate cache at {}", path.display());
    Ok(Arc::new(DiskRateStore::open(&path)?))
}
