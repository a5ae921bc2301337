use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures::future::join_all;
use tokio::sync::mpsc;
use winpex_collector::{
    Collector, DhcpCollector, DhcpConfig, METRIC_CHANNEL_CAPACITY, NAMESPACE, PerfCounterEngine,
    ScrapeContext, dhcp,
};
use winpex_common::error::{Result, WinpexError};
use winpex_metrics::{Metric, MetricDescriptor, MetricType, build_fq_name};
use winpex_perfdata::TelemetrySource;

const META_SUBSYSTEM: &str = "exporter";

/// Names accepted by `--collectors.enabled`.
pub const AVAILABLE_COLLECTORS: &[&str] = &[dhcp::NAME];

pub fn new_collector(name: &str, engine: PerfCounterEngine) -> Result<Box<dyn Collector>> {
    match name {
        dhcp::NAME => Ok(Box::new(DhcpCollector::new(DhcpConfig { engine }))),
        other => Err(WinpexError::InvalidArgument(format!(
            "unknown collector {other:?}, available: {}",
            AVAILABLE_COLLECTORS.join(",")
        ))),
    }
}

/// Per-collector bookkeeping samples added to every scrape.
struct MetaDescriptors {
    duration: Arc<MetricDescriptor>,
    success: Arc<MetricDescriptor>,
    timeout: Arc<MetricDescriptor>,
}

impl MetaDescriptors {
    fn new() -> Self {
        let gauge = |name: &str, help: &str| {
            Arc::new(
                MetricDescriptor::new(
                    build_fq_name(NAMESPACE, META_SUBSYSTEM, name),
                    help,
                    MetricType::Gauge,
                )
                .with_labels(&["collector"]),
            )
        };

        Self {
            duration: gauge(
                "collector_duration_seconds",
                "windows_exporter: Duration of a collection.",
            ),
            success: gauge(
                "collector_success",
                "windows_exporter: Whether the collector was successful.",
            ),
            timeout: gauge(
                "collector_timeout",
                "windows_exporter: Whether the collector timed out.",
            ),
        }
    }

    fn samples(&self, collector: &str, elapsed: Duration, status: &Status) -> Result<Vec<Metric>> {
        let success = matches!(status, Status::Succeeded);
        let timed_out = matches!(status, Status::TimedOut);
        Ok(vec![
            Metric::new_const(&self.duration, elapsed.as_secs_f64(), &[collector])?,
            Metric::new_const(&self.success, f64::from(u8::from(success)), &[collector])?,
            Metric::new_const(&self.timeout, f64::from(u8::from(timed_out)), &[collector])?,
        ])
    }
}

enum Status {
    Succeeded,
    Failed(WinpexError),
    TimedOut,
}

/// The enabled collectors, built once and scraped concurrently.
pub struct CollectorSet {
    collectors: Vec<Arc<dyn Collector>>,
    source: Arc<dyn TelemetrySource>,
    meta: MetaDescriptors,
}

impl CollectorSet {
    /// Builds every named collector against `source`. The first failure
    /// aborts, after closing the collectors already built.
    pub fn build(
        names: &[String],
        engine: PerfCounterEngine,
        source: Arc<dyn TelemetrySource>,
    ) -> Result<Self> {
        let mut collectors: Vec<Arc<dyn Collector>> = Vec::with_capacity(names.len());
        for name in names {
            let built = new_collector(name, engine).and_then(|mut collector| {
                collector.build(source.as_ref())?;
                Ok(collector)
            });
            match built {
                Ok(collector) => collectors.push(Arc::from(collector)),
                Err(err) => {
                    tracing::error!(
                        collector = %name,
                        error = %err,
                        error_kind = err.kind(),
                        init_failure = err.is_init_failure(),
                        "failed to build collector"
                    );
                    for collector in &collectors {
                        if let Err(close_err) = collector.close() {
                            tracing::warn!(
                                collector = collector.name(),
                                error = %close_err,
                                "failed to close collector"
                            );
                        }
                    }
                    return Err(err);
                }
            }
        }

        Ok(Self::from_collectors(collectors, source))
    }

    /// Wraps collectors that are already built.
    pub fn from_collectors(
        collectors: Vec<Arc<dyn Collector>>,
        source: Arc<dyn TelemetrySource>,
    ) -> Self {
        Self {
            collectors,
            source,
            meta: MetaDescriptors::new(),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|collector| collector.name()).collect()
    }

    /// Runs every collector concurrently. Each collector's samples are
    /// followed by its meta samples.
    pub async fn scrape(&self, timeout: Duration) -> Vec<Metric> {
        join_all(
            self.collectors
                .iter()
                .map(|collector| self.scrape_one(Arc::clone(collector), timeout)),
        )
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    async fn scrape_one(&self, collector: Arc<dyn Collector>, timeout: Duration) -> Vec<Metric> {
        let name = collector.name();
        let started_at = Instant::now();
        let (tx, mut rx) = mpsc::channel(METRIC_CHANNEL_CAPACITY);

        let source = Arc::clone(&self.source);
        let worker = Arc::clone(&collector);
        let mut task = tokio::spawn(async move {
            let objects = worker.perf_counter_objects();
            let ctx = tokio::task::spawn_blocking(move || {
                ScrapeContext::from_source(source.as_ref(), &objects)
            })
            .await
            .map_err(|err| WinpexError::InternalError(format!("snapshot task failed: {err}")))??;
            worker.collect(&ctx, &tx).await
        });

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);
        let mut metrics = Vec::new();
        let status = loop {
            tokio::select! {
                Some(metric) = rx.recv() => metrics.push(metric),
                joined = &mut task => {
                    break match joined {
                        Ok(Ok(())) => Status::Succeeded,
                        Ok(Err(err)) => Status::Failed(err),
                        Err(err) => Status::Failed(WinpexError::InternalError(format!(
                            "collector task aborted: {err}"
                        ))),
                    };
                }
                _ = &mut deadline => {
                    task.abort();
                    break Status::TimedOut;
                }
            }
        };
        // Samples sent before completion or the deadline are kept.
        while let Ok(metric) = rx.try_recv() {
            metrics.push(metric);
        }

        let elapsed = started_at.elapsed();
        match &status {
            Status::Succeeded => tracing::debug!(
                collector = name,
                samples = metrics.len(),
                duration_seconds = elapsed.as_secs_f64(),
                "collector succeeded"
            ),
            Status::Failed(error) => tracing::warn!(
                collector = name,
                error = %error,
                error_kind = error.kind(),
                duration_seconds = elapsed.as_secs_f64(),
                "collector failed"
            ),
            Status::TimedOut => tracing::warn!(
                collector = name,
                samples = metrics.len(),
                timeout_seconds = timeout.as_secs_f64(),
                "collector timed out"
            ),
        }

        match self.meta.samples(name, elapsed, &status) {
            Ok(meta) => metrics.extend(meta),
            Err(err) => {
                tracing::error!(collector = name, error = %err, "failed to build meta samples")
            }
        }
        metrics
    }

    /// Closes every collector, returning the first error.
    pub fn close(&self) -> Result<()> {
        let mut first_error = None;
        for collector in &self.collectors {
            if let Err(err) = collector.close() {
                tracing::warn!(collector = collector.name(), error = %err, "failed to close collector");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
