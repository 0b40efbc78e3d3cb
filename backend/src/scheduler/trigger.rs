use std::future::IntoFuture;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::scheduler::cadence::{Cadence, next_daily};
use crate::scheduler::jobs::Job;

/// Owns the background tasks that drive registered jobs.
pub struct Trigger {
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Trigger {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawns a task running `job` on `cadence` until shutdown.
    pub fn register(&self, cadence: Cadence, job: Arc<dyn Job>) {
        let shutdown = self.shutdown_tx.subscribe();
        info!(target: "scheduler", job = job.name(), ?cadence, "job registered");

        let handle = match cadence {
            Cadence::Every(period) => tokio::spawn(run_every(period, job, shutdown)),
            Cadence::DailyAt { hour, minute } => {
                tokio::spawn(run_daily(hour, minute, job, shutdown))
            }
        };

        self.tasks.lock().push(handle);
    }

    /// Drives `work` (typically the HTTP server) to completion, then shuts
    /// the jobs down whatever `work` returned.
    pub async fn run_until<T>(self, work: impl IntoFuture<Output = T>) -> T {
        let out = work.await;
        self.shutdown().await;
        out
    }

    /// Stops every job loop and waits for in-flight runs to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                warn!(target: "scheduler", error = ?e, "job task ended abnormally");
            }
        }
    }
}

async fn run_every(
    period: std::time::Duration,
    job: Arc<dyn Job>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    // A run longer than the period delays the next tick instead of bunching.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!(target: "scheduler", job = job.name(), "tick");
                job.execute(Utc::now()).await;
            }
            _ = shutdown.changed() => break,
        }
    }
    debug!(target: "scheduler", job = job.name(), "loop stopped");
}

async fn run_daily(hour: u32, minute: u32, job: Arc<dyn Job>, mut shutdown: watch::Receiver<bool>) {
    let mut from = Utc::now();

    loop {
        let Some(next) = next_daily(from, hour, minute) else {
            warn!(target: "scheduler", job = job.name(), hour, minute, "invalid daily time");
            return;
        };
        let wait = (next - Utc::now()).to_std().unwrap_or_default();
        debug!(target: "scheduler", job = job.name(), next = %next, "next daily run");

        tokio::select! {
            _ = tokio::time::sleep(wait) => job.execute(Utc::now()).await,
            _ = shutdown.changed() => break,
        }

        // Advance from the slot itself so an early wakeup cannot refire it.
        from = next;
    }
    debug!(target: "scheduler", job = job.name(), "loop stopped");
}
