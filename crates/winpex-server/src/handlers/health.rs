use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::router::ExporterState;

pub async fn health(State(state): State<Arc<ExporterState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        collectors: state.collectors.names(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    collectors: Vec<&'static str>,
}
