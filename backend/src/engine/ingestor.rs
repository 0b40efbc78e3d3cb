//! Ingestion cycle.
//!
//! One call to [`Ingestor::run`] walks `Fetching -> Validating -> Persisting`.
//! Any failure drops into recovery, which seeds the store with a fallback
//! observation only when the store holds nothing at all. An existing
//! observation, however old, means the failed cycle simply leaves a gap.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::logger::{TraceId, root_span, warn_if_slow};
use tracing::Instrument;

use crate::engine::events::{CycleStage, EngineEvent, EngineObserver};
use crate::error::IngestError;
use crate::pricing::{
    Divisor, Origin, PriceObservation, SourcePrices, check_derived, validate_quotes,
};
use crate::quote::QuoteSource;
use crate::store::PriceRepository;

const SLOW_STORE_CALL: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug)]
pub struct IngestorConfig {
    pub divisor: Divisor,
    /// Source prices used to seed an empty store.
    pub fallback: SourcePrices,
}

/// Result of one cycle. A cycle never fails outward.
#[derive(Clone, Debug)]
pub enum CycleOutcome {
    Recorded(PriceObservation),
    Fallback(PriceObservation),
    Gap { stage: CycleStage, reason: String },
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Recorded(_) => "recorded",
            CycleOutcome::Fallback(_) => "fallback",
            CycleOutcome::Gap { .. } => "gap",
        }
    }
}

pub struct Ingestor {
    source: Arc<dyn QuoteSource>,
    repo: Arc<dyn PriceRepository>,
    observer: Arc<dyn EngineObserver>,
    cfg: IngestorConfig,
}

impl Ingestor {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        repo: Arc<dyn PriceRepository>,
        observer: Arc<dyn EngineObserver>,
        cfg: IngestorConfig,
    ) -> Self {
        Self {
            source,
            repo,
            observer,
            cfg,
        }
    }

    /// Runs one cycle stamped with `now`.
    ///
    /// Callers must not overlap cycles; the engine does not serialize them.
    pub async fn run(&self, now: DateTime<Utc>) -> CycleOutcome {
        let trace_id = TraceId::new();
        let span = root_span("ingest_cycle", &trace_id);

        async move {
            let outcome = match self.attempt(now).await {
                Ok(observation) => {
                    self.observer.on_event(&EngineEvent::CycleSucceeded {
                        observation: observation.clone(),
                    });
                    CycleOutcome::Recorded(observation)
                }
                Err((stage, err)) => self.recover(now, stage, err).await,
            };

            tracing::Span::current().record("outcome", outcome.label());
            outcome
        }
        .instrument(span)
        .await
    }

    async fn attempt(
        &self,
        now: DateTime<Utc>,
    ) -> Result<PriceObservation, (CycleStage, IngestError)> {
        let quotes = self
            .source
            .fetch()
            .await
            .map_err(|e| (CycleStage::Fetching, IngestError::Fetch(e)))?;

        let source = validate_quotes(&quotes)
            .map_err(|e| (CycleStage::Validating, IngestError::Fetch(e)))?;

        let observation = PriceObservation::new(now, source, self.cfg.divisor, Origin::External);
        check_derived(&observation.source, &observation.derived)
            .map_err(|e| (CycleStage::Validating, IngestError::Fetch(e)))?;

        warn_if_slow("db_append", SLOW_STORE_CALL, self.repo.append(&observation))
            .await
            .map_err(|e| (CycleStage::Persisting, IngestError::Persistence(e)))?;

        Ok(observation)
    }

    async fn recover(
        &self,
        now: DateTime<Utc>,
        stage: CycleStage,
        err: IngestError,
    ) -> CycleOutcome {
        let reason = err.to_string();
        self.observer.on_event(&EngineEvent::CycleFailed {
            stage,
            reason: reason.clone(),
        });

        match self.repo.latest().await {
            // Any prior observation suppresses the fallback.
            Ok(Some(_)) => CycleOutcome::Gap { stage, reason },
            Ok(None) => {
                let observation = PriceObservation::new(
                    now,
                    self.cfg.fallback,
                    self.cfg.divisor,
                    Origin::Fallback,
                );
                if let Err(e) = check_derived(&observation.source, &observation.derived) {
                    self.observer.on_event(&EngineEvent::FallbackSkipped {
                        reason: format!("fallback price out of range: {e}"),
                    });
                    return CycleOutcome::Gap { stage, reason };
                }

                match self.repo.append(&observation).await {
                    Ok(()) => {
                        self.observer.on_event(&EngineEvent::FallbackUsed {
                            observation: observation.clone(),
                        });
                        CycleOutcome::Fallback(observation)
                    }
                    Err(e) => {
                        self.observer.on_event(&EngineEvent::FallbackSkipped {
                            reason: format!("fallback append failed: {e:#}"),
                        });
                        CycleOutcome::Gap { stage, reason }
                    }
                }
            }
            Err(e) => {
                self.observer.on_event(&EngineEvent::FallbackSkipped {
                    reason: format!("latest lookup failed: {e:#}"),
                });
                CycleOutcome::Gap { stage, reason }
            }
        }
    }
}
