use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::pricing::PriceObservation;
use crate::store::repository::PriceRepository;

/// Process-local repository, kept sorted by timestamp.
///
/// Backs the engine in tests and in setups where history need not survive a
/// restart.
#[derive(Default)]
pub struct InMemoryPriceRepository {
    rows: RwLock<Vec<PriceObservation>>,
}

impl InMemoryPriceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored observation, ascending by timestamp.
    pub fn all(&self) -> Vec<PriceObservation> {
        self.rows.read().clone()
    }
}

#[async_trait]
impl PriceRepository for InMemoryPriceRepository {
    async fn append(&self, observation: &PriceObservation) -> anyhow::Result<()> {
        let mut rows = self.rows.write();
        // Equal timestamps keep insertion order.
        let at = rows.partition_point(|o| o.timestamp <= observation.timestamp);
        rows.insert(at, observation.clone());
        Ok(())
    }

    async fn latest(&self) -> anyhow::Result<Option<PriceObservation>> {
        Ok(self.rows.read().last().cloned())
    }

    async fn range_from(&self, start: DateTime<Utc>) -> anyhow::Result<Vec<PriceObservation>> {
        let rows = self.rows.read();
        let from = rows.partition_point(|o| o.timestamp < start);
        Ok(rows[from..].to_vec())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<u64> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|o| o.timestamp >= cutoff);
        Ok((before - rows.len()) as u64)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.rows.read().len() as u64)
    }
}
