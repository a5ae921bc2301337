//! DHCP Server collector.
//!
//! Exposes the 25 counters of the `DHCP Server` performance object as
//! `windows_dhcp_*` metrics. Values come from one of two strategies picked
//! at build time (see [`PerfCounterEngine`]); both produce the same metric
//! names, kinds and values.

pub mod catalog;
pub mod direct;
pub mod legacy;
pub mod raw;
pub mod record;

use async_trait::async_trait;
use tokio::sync::mpsc;
use winpex_common::error::{Result, WinpexError};
use winpex_metrics::Metric;
use winpex_perfdata::TelemetrySource;

use crate::{Collector, NAMESPACE, PerfCounterEngine, ScrapeContext};

use self::{
    catalog::{Catalog, DHCP_CATALOG, DescriptorRegistry},
    direct::DirectLookup,
    legacy::LegacyDecoder,
    raw::RawValues,
};

pub const NAME: &str = "dhcp";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DhcpConfig {
    pub engine: PerfCounterEngine,
}

#[derive(Debug)]
enum Strategy {
    Legacy(LegacyDecoder),
    Direct(DirectLookup),
}

impl Strategy {
    fn acquire(&self, ctx: &ScrapeContext, catalog: &Catalog) -> Result<RawValues> {
        match self {
            Self::Legacy(decoder) => decoder.acquire(ctx, catalog),
            Self::Direct(lookup) => lookup.acquire(catalog),
        }
    }

    fn perf_objects(&self) -> Vec<String> {
        match self {
            Self::Legacy(decoder) => decoder.perf_objects(),
            Self::Direct(_) => Vec::new(),
        }
    }

    fn close(&self) -> Result<()> {
        match self {
            Self::Legacy(_) => Ok(()),
            Self::Direct(lookup) => lookup.close(),
        }
    }
}

#[derive(Debug)]
struct Built {
    descriptors: DescriptorRegistry,
    strategy: Strategy,
}

#[derive(Debug)]
pub struct DhcpCollector {
    config: DhcpConfig,
    catalog: &'static Catalog,
    built: Option<Built>,
}

impl DhcpCollector {
    pub fn new(config: DhcpConfig) -> Self {
        Self {
            config,
            catalog: &DHCP_CATALOG,
            built: None,
        }
    }

    /// Descriptors created by [`Collector::build`], in catalog order.
    pub fn descriptors(&self) -> Option<&DescriptorRegistry> {
        self.built.as_ref().map(|built| &built.descriptors)
    }

    fn built(&self) -> Result<&Built> {
        self.built
            .as_ref()
            .ok_or_else(|| WinpexError::NotBuilt(NAME.to_string()))
    }
}

impl Default for DhcpCollector {
    fn default() -> Self {
        Self::new(DhcpConfig::default())
    }
}

#[async_trait]
impl Collector for DhcpCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn perf_counter_objects(&self) -> Vec<String> {
        self.built
            .as_ref()
            .map(|built| built.strategy.perf_objects())
            .unwrap_or_default()
    }

    fn build(&mut self, source: &dyn TelemetrySource) -> Result<()> {
        self.catalog.validate()?;

        if let Some(previous) = self.built.take() {
            previous.strategy.close()?;
        }

        let strategy = match self.config.engine {
            PerfCounterEngine::Legacy => Strategy::Legacy(LegacyDecoder::new(self.catalog)?),
            PerfCounterEngine::Direct => {
                Strategy::Direct(DirectLookup::open(source, self.catalog)?)
            }
        };
        let descriptors = DescriptorRegistry::build(self.catalog, NAMESPACE, NAME);

        tracing::info!(
            collector = NAME,
            engine = %self.config.engine,
            metrics = descriptors.len(),
            "collector built"
        );
        self.built = Some(Built {
            descriptors,
            strategy,
        });
        Ok(())
    }

    async fn collect(&self, ctx: &ScrapeContext, tx: &mpsc::Sender<Metric>) -> Result<()> {
        let built = self.built()?;
        let values = built.strategy.acquire(ctx, self.catalog)?;
        emit(translate(&built.descriptors, &values), tx).await
    }

    fn close(&self) -> Result<()> {
        match &self.built {
            Some(built) => built.strategy.close(),
            None => Ok(()),
        }
    }
}

/// Pairs each descriptor with the raw value at the same catalog position.
pub fn translate(descriptors: &DescriptorRegistry, values: &RawValues) -> Vec<Metric> {
    descriptors
        .descriptors()
        .iter()
        .zip(values.samples())
        .map(|(desc, sample)| Metric::unlabeled(desc, sample.value))
        .collect()
}

/// Hands samples to the sink, waiting whenever the channel is full.
pub async fn emit(metrics: Vec<Metric>, tx: &mpsc::Sender<Metric>) -> Result<()> {
    for metric in metrics {
        tx.send(metric).await.map_err(|_| {
            WinpexError::InternalError(format!("{NAME} metric channel closed"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use winpex_metrics::MetricType;
    use winpex_perfdata::{MemorySource, PerfObject};

    use crate::METRIC_CHANNEL_CAPACITY;

    use super::{catalog::PERF_OBJECT, *};

    const EXPECTED: [(&str, MetricType); 25] = [
        ("windows_dhcp_packets_received_total", MetricType::Counter),
        ("windows_dhcp_duplicates_dropped_total", MetricType::Counter),
        ("windows_dhcp_packets_expired_total", MetricType::Counter),
        ("windows_dhcp_active_queue_length", MetricType::Gauge),
        ("windows_dhcp_conflict_check_queue_length", MetricType::Gauge),
        ("windows_dhcp_discovers_total", MetricType::Counter),
        ("windows_dhcp_offers_total", MetricType::Counter),
        ("windows_dhcp_requests_total", MetricType::Counter),
        ("windows_dhcp_informs_total", MetricType::Counter),
        ("windows_dhcp_acks_total", MetricType::Counter),
        ("windows_dhcp_nacks_total", MetricType::Counter),
        ("windows_dhcp_declines_total", MetricType::Counter),
        ("windows_dhcp_releases_total", MetricType::Counter),
        ("windows_dhcp_offer_queue_length", MetricType::Gauge),
        ("windows_dhcp_denied_due_to_match_total", MetricType::Counter),
        ("windows_dhcp_denied_due_to_nonmatch_total", MetricType::Counter),
        ("windows_dhcp_failover_bndupd_sent_total", MetricType::Counter),
        ("windows_dhcp_failover_bndupd_received_total", MetricType::Counter),
        ("windows_dhcp_failover_bndack_sent_total", MetricType::Counter),
        ("windows_dhcp_failover_bndack_received_total", MetricType::Counter),
        ("windows_dhcp_failover_bndupd_pending_in_outbound_queue", MetricType::Gauge),
        (
            "windows_dhcp_failover_transitions_communicationinterrupted_state_total",
            MetricType::Counter,
        ),
        ("windows_dhcp_failover_transitions_partnerdown_state_total", MetricType::Counter),
        ("windows_dhcp_failover_transitions_recover_total", MetricType::Counter),
        ("windows_dhcp_failover_bndupd_dropped_total", MetricType::Counter),
    ];

    fn dhcp_object(instance: &str) -> PerfObject {
        PerfObject::new(PERF_OBJECT).with_instance(
            instance,
            DHCP_CATALOG
                .entries()
                .iter()
                .enumerate()
                .map(|(position, entry)| (entry.identifier, (position * 10 + 1) as f64)),
        )
    }

    fn built(engine: PerfCounterEngine, source: &MemorySource) -> DhcpCollector {
        let mut collector = DhcpCollector::new(DhcpConfig { engine });
        collector.build(source).unwrap();
        collector
    }

    async fn scrape(collector: &DhcpCollector, source: &MemorySource) -> (Result<()>, Vec<Metric>) {
        let (tx, mut rx) = mpsc::channel(METRIC_CHANNEL_CAPACITY);
        let ctx = ScrapeContext::from_source(source, &collector.perf_counter_objects())
            .unwrap_or_default();
        let result = collector.collect(&ctx, &tx).await;
        drop(tx);

        let mut metrics = Vec::new();
        while let Some(metric) = rx.recv().await {
            metrics.push(metric);
        }
        (result, metrics)
    }

    #[tokio::test]
    async fn emits_one_sample_per_catalog_entry() {
        let source = MemorySource::new();
        source.set_object(dhcp_object("")).unwrap();

        for engine in [PerfCounterEngine::Legacy, PerfCounterEngine::Direct] {
            let collector = built(engine, &source);
            let (result, metrics) = scrape(&collector, &source).await;
            result.unwrap();

            let emitted = metrics
                .iter()
                .map(|metric| (metric.name(), metric.metric_type()))
                .collect::<Vec<_>>();
            assert_eq!(emitted, EXPECTED.to_vec(), "engine {engine}");
            assert!(metrics.iter().all(|metric| metric.labels.is_empty()));
        }
    }

    #[tokio::test]
    async fn engines_agree_on_names_kinds_and_values() {
        let source = MemorySource::new();
        source.set_object(dhcp_object("")).unwrap();

        let (legacy_result, legacy) =
            scrape(&built(PerfCounterEngine::Legacy, &source), &source).await;
        let (direct_result, direct) =
            scrape(&built(PerfCounterEngine::Direct, &source), &source).await;
        legacy_result.unwrap();
        direct_result.unwrap();

        assert_eq!(legacy.len(), direct.len());
        for (left, right) in legacy.iter().zip(&direct) {
            assert_eq!(left.desc.as_ref(), right.desc.as_ref());
            assert_eq!(left.value.to_bits(), right.value.to_bits());
        }
    }

    fn uniform(value: f64) -> impl Iterator<Item = (&'static str, f64)> {
        DHCP_CATALOG
            .entries()
            .iter()
            .map(move |entry| (entry.identifier, value))
    }

    #[tokio::test]
    async fn engines_read_the_unnamed_instance_only() {
        let source = MemorySource::new();
        source
            .set_object(
                PerfObject::new(PERF_OBJECT)
                    .with_instance("scope-1", uniform(1.0))
                    .with_instance("", uniform(2.0)),
            )
            .unwrap();

        for engine in [PerfCounterEngine::Legacy, PerfCounterEngine::Direct] {
            let (result, metrics) = scrape(&built(engine, &source), &source).await;
            result.unwrap();
            assert_eq!(metrics.len(), DHCP_CATALOG.len(), "engine {engine}");
            assert!(metrics.iter().all(|metric| metric.value == 2.0), "engine {engine}");
        }

        source
            .set_object(PerfObject::new(PERF_OBJECT).with_instance("scope-1", uniform(1.0)))
            .unwrap();
        for engine in [PerfCounterEngine::Legacy, PerfCounterEngine::Direct] {
            let (result, metrics) = scrape(&built(engine, &source), &source).await;
            assert!(
                matches!(result, Err(WinpexError::InstanceNotFound { .. })),
                "engine {engine}"
            );
            assert!(metrics.is_empty(), "engine {engine}");
        }
    }

    #[tokio::test]
    async fn packets_received_value_is_copied() {
        let source = MemorySource::new();
        let mut object = dhcp_object("");
        object.instances[0]
            .counters
            .insert("Packets Received/sec".to_string(), 42.0);
        source.set_object(object).unwrap();

        let (result, metrics) = scrape(&built(PerfCounterEngine::Legacy, &source), &source).await;
        result.unwrap();

        let received = metrics
            .iter()
            .find(|metric| metric.name() == "windows_dhcp_packets_received_total")
            .unwrap();
        assert_eq!(received.metric_type(), MetricType::Counter);
        assert_eq!(received.value, 42.0);
    }

    #[tokio::test]
    async fn absent_instance_fails_without_samples() {
        let source = MemorySource::new();
        source.set_object(dhcp_object("")).unwrap();
        let legacy = built(PerfCounterEngine::Legacy, &source);
        let direct = built(PerfCounterEngine::Direct, &source);

        source.set_object(PerfObject::new(PERF_OBJECT)).unwrap();

        let (result, metrics) = scrape(&legacy, &source).await;
        assert!(matches!(result, Err(WinpexError::NoRecords { .. })));
        assert!(metrics.is_empty());

        let (result, metrics) = scrape(&direct, &source).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(metrics.is_empty());
    }

    #[tokio::test]
    async fn malformed_snapshot_fails_without_samples() {
        let collector = built(PerfCounterEngine::Legacy, &MemorySource::new());
        let mut ctx = ScrapeContext::new();
        ctx.insert(PERF_OBJECT, b"not a snapshot".to_vec());
        let (tx, mut rx) = mpsc::channel(METRIC_CHANNEL_CAPACITY);

        let err = collector.collect(&ctx, &tx).await.unwrap_err();
        drop(tx);

        assert!(matches!(err, WinpexError::Decode { .. }));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn collect_before_build_fails() {
        let collector = DhcpCollector::default();
        let (tx, _rx) = mpsc::channel(1);

        let err = collector
            .collect(&ScrapeContext::new(), &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, WinpexError::NotBuilt(_)));
        assert!(collector.perf_counter_objects().is_empty());
    }

    #[test]
    fn build_is_deterministic() {
        let source = MemorySource::new();
        let first = built(PerfCounterEngine::Legacy, &source);
        let second = built(PerfCounterEngine::Legacy, &source);

        let left = first.descriptors().unwrap().descriptors();
        let right = second.descriptors().unwrap().descriptors();
        assert_eq!(left.len(), right.len());
        for (left, right) in left.iter().zip(right) {
            assert_eq!(left.name, right.name);
            assert_eq!(left.help, right.help);
            assert_eq!(left.metric_type, right.metric_type);
        }
    }

    #[test]
    fn engine_decides_advertised_objects() {
        let source = MemorySource::new();
        source.set_object(dhcp_object("")).unwrap();

        assert_eq!(
            built(PerfCounterEngine::Legacy, &source).perf_counter_objects(),
            vec![PERF_OBJECT.to_string()]
        );
        assert!(
            built(PerfCounterEngine::Direct, &source)
                .perf_counter_objects()
                .is_empty()
        );
    }

    #[test]
    fn direct_build_fails_without_object_and_close_releases_handle() {
        let source = MemorySource::new();
        let mut collector = DhcpCollector::new(DhcpConfig {
            engine: PerfCounterEngine::Direct,
        });

        let err = collector.build(&source).unwrap_err();
        assert!(err.is_init_failure());

        source.set_object(dhcp_object("")).unwrap();
        collector.build(&source).unwrap();
        assert_eq!(source.open_queries(), 1);
        collector.build(&source).unwrap();
        assert_eq!(source.open_queries(), 1);

        collector.close().unwrap();
        assert_eq!(source.open_queries(), 0);
    }

    #[tokio::test]
    async fn bounded_sink_applies_backpressure() {
        let source = MemorySource::new();
        source.set_object(dhcp_object("")).unwrap();
        let collector = built(PerfCounterEngine::Direct, &source);
        let ctx = ScrapeContext::new();
        let (tx, mut rx) = mpsc::channel(1);

        let consumer = tokio::spawn(async move {
            let mut count = 0;
            while rx.recv().await.is_some() {
                count += 1;
            }
            count
        });
        collector.collect(&ctx, &tx).await.unwrap();
        drop(tx);

        assert_eq!(consumer.await.unwrap(), DHCP_CATALOG.len());
    }
}
