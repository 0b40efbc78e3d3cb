use std::sync::Arc;

use crate::engine::{Aggregator, HealthMonitor};
use crate::store::PriceRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn PriceRepository>,
    pub aggregator: Arc<Aggregator>,
    pub health: Arc<HealthMonitor>,
}

impl AppState {
    pub fn new(repo: Arc<dyn PriceRepository>, stale_threshold: chrono::Duration) -> Self {
        Self {
            aggregator: Arc::new(Aggregator::new(repo.clone())),
            health: Arc::new(HealthMonitor::new(repo.clone(), stale_threshold)),
            repo,
        }
    }
}
