//! Collectors translating performance-counter data into exported metrics.
//!
//! A [`Collector`] is built once against a [`TelemetrySource`], then asked to
//! collect on every scrape. Each scrape gets a fresh [`ScrapeContext`]
//! holding the snapshot blobs of the performance objects the collector
//! advertised through [`Collector::perf_counter_objects`].

pub mod context;
pub mod dhcp;
pub mod engine;

use async_trait::async_trait;
use tokio::sync::mpsc;
use winpex_common::error::Result;
use winpex_metrics::Metric;
use winpex_perfdata::TelemetrySource;

pub use context::ScrapeContext;
pub use dhcp::{DhcpCollector, DhcpConfig};
pub use engine::PerfCounterEngine;

/// Namespace prefixed to every exported metric name.
pub const NAMESPACE: &str = "windows";

/// Capacity of the per-collector channel samples are handed off on.
pub const METRIC_CHANNEL_CAPACITY: usize = 256;

#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Performance objects whose snapshots must be present in the
    /// [`ScrapeContext`] passed to [`Collector::collect`].
    fn perf_counter_objects(&self) -> Vec<String>;

    /// One-time initialization. Failures are fatal for the collector.
    fn build(&mut self, source: &dyn TelemetrySource) -> Result<()>;

    /// Sends one scrape worth of samples on `tx`.
    ///
    /// # Errors
    ///
    /// Any error fails the whole scrape for this collector. Samples already
    /// sent are not withdrawn.
    async fn collect(&self, ctx: &ScrapeContext, tx: &mpsc::Sender<Metric>) -> Result<()>;

    /// Releases handles acquired in [`Collector::build`].
    fn close(&self) -> Result<()>;
}
