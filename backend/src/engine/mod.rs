//! The price engine: ingestion, aggregation, retention and health.

pub mod aggregator;
pub mod events;
pub mod health;
pub mod ingestor;
pub mod retention;

pub use aggregator::{Aggregator, FieldStats, HistoryWindow, PricePoint, WindowStats};
pub use events::{CycleStage, EngineEvent, EngineObserver, TracingObserver};
pub use health::{DEFAULT_STALE_THRESHOLD, HealthMonitor, HealthReport, HealthStatus};
pub use ingestor::{CycleOutcome, Ingestor, IngestorConfig};
pub use retention::{CleanupReport, DEFAULT_RETENTION_DAYS, RetentionManager};
