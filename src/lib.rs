pub mod api;
pub mod config;
pub mod ensemble;
pub mod errors;
pub mod etl;
pub mod metrics;
pub mod models;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::ensemble::Ensemble;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Loaded once at startup; `None` when the artifact was missing or
    /// corrupt, in which case every prediction request fails at request time.
    pub ensemble: Option<Arc<Ensemble>>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
