//! Periodic trigger for engine jobs.
//!
//! Ingestion runs on a fixed interval and retention on a daily wall-clock
//! schedule. Each job runs inside its own task and a job's next run never
//! starts before the previous one has finished.

pub mod cadence;
pub mod jobs;
pub mod trigger;

pub use cadence::{Cadence, next_daily};
pub use jobs::Job;
pub use trigger::Trigger;
