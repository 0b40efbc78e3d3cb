//! Freshness check over the most recent observation.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::pricing::Origin;
use crate::store::PriceRepository;

pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::seconds(120);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Whole seconds since the latest observation; `None` when the store is empty.
    pub age_seconds: Option<i64>,
    pub last_update: Option<DateTime<Utc>>,
    pub last_origin: Option<Origin>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

pub struct HealthMonitor {
    repo: Arc<dyn PriceRepository>,
    stale_threshold: Duration,
}

impl HealthMonitor {
    pub fn new(repo: Arc<dyn PriceRepository>, stale_threshold: Duration) -> Self {
        Self {
            repo,
            stale_threshold,
        }
    }

    pub async fn check(&self, now: DateTime<Utc>) -> anyhow::Result<HealthReport> {
        let latest = self.repo.latest().await.context("load latest observation")?;

        let Some(obs) = latest else {
            return Ok(HealthReport {
                status: HealthStatus::Degraded,
                age_seconds: None,
                last_update: None,
                last_origin: None,
            });
        };

        // A timestamp ahead of `now` (clock skew) counts as fresh.
        let age = now - obs.timestamp;
        let status = if age < self.stale_threshold {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        Ok(HealthReport {
            status,
            age_seconds: Some(age.num_seconds()),
            last_update: Some(obs.timestamp),
            last_origin: Some(obs.origin),
        })
    }
}
