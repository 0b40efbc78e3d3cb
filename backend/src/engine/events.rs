//! Structured events emitted by the engine.
//!
//! The engine never logs directly; it reports to an [`EngineObserver`]. The
//! process wires in [`TracingObserver`], tests wire in a recorder.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::pricing::PriceObservation;

/// Stage of an ingestion cycle at which a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleStage {
    Fetching,
    Validating,
    Persisting,
}

impl CycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStage::Fetching => "fetching",
            CycleStage::Validating => "validating",
            CycleStage::Persisting => "persisting",
        }
    }
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub enum EngineEvent {
    CycleSucceeded {
        observation: PriceObservation,
    },
    CycleFailed {
        stage: CycleStage,
        reason: String,
    },
    FallbackUsed {
        observation: PriceObservation,
    },
    /// Recovery could not check or seed the store; the cycle is a gap.
    FallbackSkipped {
        reason: String,
    },
    CleanupCompleted {
        cutoff: DateTime<Utc>,
        before: u64,
        removed: u64,
        after: u64,
    },
}

pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: &EngineEvent);
}

/// Logs every engine event through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn on_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::CycleSucceeded { observation: o } => info!(
                btc_brl = o.source.btc_brl,
                btc_usd = o.source.btc_usd,
                usd_brl = o.source.usd_brl,
                aze_brl = o.derived.aze_brl,
                aze_usd = o.derived.aze_usd,
                "quote saved"
            ),
            EngineEvent::CycleFailed { stage, reason } => {
                error!(stage = %stage, reason = %reason, "quote cycle failed")
            }
            EngineEvent::FallbackUsed { observation: o } => warn!(
                btc_brl = o.source.btc_brl,
                btc_usd = o.source.btc_usd,
                usd_brl = o.source.usd_brl,
                "store empty; seeded with fallback price"
            ),
            EngineEvent::FallbackSkipped { reason } => {
                error!(reason = %reason, "fallback could not be applied")
            }
            EngineEvent::CleanupCompleted {
                cutoff,
                before,
                removed,
                after,
            } => info!(
                cutoff = %cutoff,
                before,
                removed,
                after,
                "cleanup completed"
            ),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use parking_lot::Mutex;

    use super::{EngineEvent, EngineObserver};

    /// Keeps every event for later assertions.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<EngineEvent>>,
    }

    impl RecordingObserver {
        pub fn take(&self) -> Vec<EngineEvent> {
            std::mem::take(&mut *self.events.lock())
        }
    }

    impl EngineObserver for RecordingObserver {
        fn on_event(&self, event: &EngineEvent) {
            self.events.lock().push(event.clone());
        }
    }
}
