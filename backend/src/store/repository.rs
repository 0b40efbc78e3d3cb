use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::pricing::PriceObservation;

/// Append-only log of price observations.
///
/// Implementations must make `append` atomic: concurrent readers either see the
/// whole record or none of it.
#[async_trait]
pub trait PriceRepository: Send + Sync {
    async fn append(&self, observation: &PriceObservation) -> Result<()>;

    /// Most recent observation by timestamp.
    async fn latest(&self) -> Result<Option<PriceObservation>>;

    /// Observations with `timestamp >= start`, ascending by timestamp.
    async fn range_from(&self, start: DateTime<Utc>) -> Result<Vec<PriceObservation>>;

    /// Removes observations with `timestamp < cutoff` and returns how many went.
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn count(&self) -> Result<u64>;
}
