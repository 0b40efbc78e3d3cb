//! Retention: drops observations older than the configured horizon.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use common::logger::{TraceId, root_span};
use tracing::Instrument;

use crate::engine::events::{EngineEvent, EngineObserver};
use crate::store::PriceRepository;

pub const DEFAULT_RETENTION_DAYS: i64 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanupReport {
    pub cutoff: DateTime<Utc>,
    pub before: u64,
    pub removed: u64,
    pub after: u64,
}

pub struct RetentionManager {
    repo: Arc<dyn PriceRepository>,
    observer: Arc<dyn EngineObserver>,
    horizon: Duration,
}

impl RetentionManager {
    pub fn new(
        repo: Arc<dyn PriceRepository>,
        observer: Arc<dyn EngineObserver>,
        horizon: Duration,
    ) -> Self {
        Self {
            repo,
            observer,
            horizon,
        }
    }

    pub fn with_default_horizon(
        repo: Arc<dyn PriceRepository>,
        observer: Arc<dyn EngineObserver>,
    ) -> Self {
        Self::new(repo, observer, Duration::days(DEFAULT_RETENTION_DAYS))
    }

    /// Deletes every observation strictly older than `now - horizon`.
    ///
    /// Idempotent: a second run at the same `now` removes nothing.
    pub async fn run(&self, now: DateTime<Utc>) -> anyhow::Result<CleanupReport> {
        let trace_id = TraceId::new();
        let span = root_span("retention_cleanup", &trace_id);

        async move {
            let cutoff = now - self.horizon;

            let before = self.repo.count().await.context("count before cleanup")?;
            let removed = self
                .repo
                .delete_before(cutoff)
                .await
                .context("delete expired observations")?;
            let after = self.repo.count().await.context("count after cleanup")?;

            let report = CleanupReport {
                cutoff,
                before,
                removed,
                after,
            };

            self.observer.on_event(&EngineEvent::CleanupCompleted {
                cutoff,
                before,
                removed,
                after,
            });
            tracing::Span::current().record("outcome", "completed");

            Ok(report)
        }
        .instrument(span)
        .await
    }
}
