use crate::core::cache::RateStore;
use crate::core::rate::CachedRate;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "currency_rates";
const CURRENT_KEY: &str = "current";

/// Rate store persisted in a fjall keyspace. The partition holds one row.
pub struct DiskRateStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskRateStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(db_path)
            .with_context(|| format!("Failed to create directory: {}", db_path.display()))?;

        let keyspace = Config::new(db_path.join("rates"))
            .open()
            .with_context(|| format!("Failed to open rate cache at {}", db_path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open rate cache partition")?;

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl RateStore for DiskRateStore {
    async fn latest(&self) -> Result<Option<CachedRate>> {
        let Some(bytes) = self.partition.get(CURRENT_KEY)? else {
            debug!("Cache MISS for rate row");
            return Ok(None);
        };

        let entry: CachedRate =
            serde_json::from_slice(&bytes).context("Failed to decode cached rate")?;
        debug!(updated_at = %entry.updated_at, "Cache HIT for rate row");
        Ok(Some(entry))
    }

    async fn upsert(&self, rate: &CachedRate) -> Result<()> {
        self.partition
            .insert(CURRENT_KEY.as_bytes(), serde_json::to_vec(rate)?)?;
        self.keyspace
            .persist(PersistMode::Buffer)
            .context("Failed to persist rate cache")?;
        debug!(rate = %rate.value, "Cache PUT for rate row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_store_get_put() {
        let dir = tempdir().unwrap();
        let store = DiskRateStore::open(dir.path()).unwrap();

        // Initially, store is empty
        assert!(store.latest().await.unwrap().is_none());

        let entry = CachedRate::new(
            Decimal::new(10505, 1),
            "dolarhoy.com",
            Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap(),
        );
        store.upsert(&entry).await.unwrap();
        assert_eq!(store.latest().await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn test_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let entry = CachedRate::new(
            Decimal::new(980, 0),
            "dolarhoy.com",
            Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap(),
        );

        {
            let store = DiskRateStore::open(dir.path()).unwrap();
            store.upsert(&entry).await.unwrap();
        }

        let reopened = DiskRateStore::open(dir.path()).unwrap();
        assert_eq!(reopened.latest().await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn test_disk_store_keeps_single_row() {
        let dir = tempdir().unwrap();
        let store = DiskRateStore::open(dir.path()).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();

        store
            .upsert(&CachedRate::new(Decimal::new(980, 0), "dolarhoy.com", at))
            .await
            .unwrap();
        store
            .upsert(&CachedRate::new(Decimal::new(1020, 0), "dolarhoy.com", at))
            .await
            .unwrap();

        assert_eq!(store.partition.len().unwrap(), 1);
        assert_eq!(
            store.latest().await.unwrap().map(|e| e.value),
            Some(Decimal::new(1020, 0))
        );
    }
}
