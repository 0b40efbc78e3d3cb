use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::engine::{Ingestor, RetentionManager};

/// Unit of work the trigger runs on a cadence.
///
/// `execute` must not fail outward; jobs report through logs or events.
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, now: DateTime<Utc>);
}

#[async_trait]
impl Job for Ingestor {
    fn name(&self) -> &'static str {
        "ingest"
    }

    async fn execute(&self, now: DateTime<Utc>) {
        // Outcome is already reported through the observer.
        let _ = self.run(now).await;
    }
}

#[async_trait]
impl Job for RetentionManager {
    fn name(&self) -> &'static str {
        "retention"
    }

    async fn execute(&self, now: DateTime<Utc>) {
        if let Err(e) = self.run(now).await {
            tracing::error!(error = ?e, "retention cleanup failed");
        }
    }
}
