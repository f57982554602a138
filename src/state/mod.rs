use std::sync::Arc;

use crate::config::EffectiveConfig;
use crate::metrics::{HostMetrics, SystemMetricsProvider};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<EffectiveConfig>,
    pub metrics: Arc<dyn SystemMetricsProvider>,
}

impl AppState {
    pub fn new(cfg: EffectiveConfig) -> Self {
        let metrics = HostMetrics::new(cfg.uptime_path.clone());
        Self::with_metrics(cfg, Arc::new(metrics))
    }

    pub fn with_metrics(cfg: EffectiveConfig, metrics: Arc<dyn SystemMetricsProvider>) -> Self {
        Self { cfg: Arc::new(cfg), metrics }
    }
}
