use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};

use crate::{collection::CollectorSet, handlers};

pub const HEALTH_PATH: &str = "/health";

pub struct ExporterState {
    pub collectors: Arc<CollectorSet>,
    /// Subtracted from the scraper's advertised timeout.
    pub timeout_margin: Duration,
}

impl ExporterState {
    pub fn new(collectors: Arc<CollectorSet>, timeout_margin: Duration) -> Self {
        Self {
            collectors,
            timeout_margin,
        }
    }
}

pub fn exporter_router(state: Arc<ExporterState>, telemetry_path: &str) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handlers::health::health))
        .route(telemetry_path, get(handlers::metrics::prometheus_metrics))
        .with_state(state)
}
