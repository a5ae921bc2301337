use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use winpex_metrics::{TEXT_CONTENT_TYPE, render_prometheus};

use crate::router::ExporterState;

pub const SCRAPE_TIMEOUT_HEADER: &str = "X-Prometheus-Scrape-Timeout-Seconds";

pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn prometheus_metrics(
    State(state): State<Arc<ExporterState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let timeout = scrape_timeout(&headers, state.timeout_margin);
    let metrics = state.collectors.scrape(timeout).await;
    let payload = render_prometheus(&metrics);

    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(TEXT_CONTENT_TYPE),
    );

    response
}

/// Scraper-advertised timeout minus `margin`. The margin is skipped when it
/// would leave no time at all; a missing or unusable header yields
/// [`DEFAULT_SCRAPE_TIMEOUT`].
pub fn scrape_timeout(headers: &HeaderMap, margin: Duration) -> Duration {
    let Some(value) = headers.get(SCRAPE_TIMEOUT_HEADER) else {
        return DEFAULT_SCRAPE_TIMEOUT;
    };

    let advertised = value
        .to_str()
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|seconds| *seconds > 0.0)
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok());
    let Some(advertised) = advertised else {
        tracing::warn!(
            header = SCRAPE_TIMEOUT_HEADER,
            value = ?value,
            "ignoring invalid scrape timeout"
        );
        return DEFAULT_SCRAPE_TIMEOUT;
    };

    advertised
        .checked_sub(margin)
        .filter(|timeout| !timeout.is_zero())
        .unwrap_or(advertised)
}
