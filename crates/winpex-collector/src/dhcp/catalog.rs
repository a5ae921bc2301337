use std::{collections::HashSet, sync::Arc};

use winpex_common::error::{Result, WinpexError};
use winpex_metrics::{MetricDescriptor, MetricType, build_fq_name};

/// Static binding of one performance counter to the metric it is exported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterDescriptor {
    /// Counter name as registered by the DHCP Server performance object.
    pub identifier: &'static str,
    /// Metric name below the `<namespace>_<subsystem>_` prefix.
    pub metric: &'static str,
    pub kind: MetricType,
    /// Field of the structured record carrying this counter.
    pub source_field: &'static str,
    pub help: &'static str,
}

impl CounterDescriptor {
    const fn counter(
        identifier: &'static str,
        metric: &'static str,
        source_field: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            identifier,
            metric,
            kind: MetricType::Counter,
            source_field,
            help,
        }
    }

    const fn gauge(
        identifier: &'static str,
        metric: &'static str,
        source_field: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            identifier,
            metric,
            kind: MetricType::Gauge,
            source_field,
            help,
        }
    }

    pub fn help_text(&self) -> String {
        format!("{} ({})", self.help, self.source_field)
    }
}

#[derive(Debug)]
pub struct Catalog {
    entries: &'static [CounterDescriptor],
}

impl Catalog {
    pub const fn new(entries: &'static [CounterDescriptor]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [CounterDescriptor] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identifiers(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.identifier).collect()
    }

    /// Rejects catalogs with repeated counter identifiers, metric names or
    /// record fields.
    pub fn validate(&self) -> Result<()> {
        let mut identifiers = HashSet::new();
        let mut metrics = HashSet::new();
        let mut fields = HashSet::new();
        for entry in self.entries {
            if !identifiers.insert(entry.identifier) {
                return Err(WinpexError::Binding(format!(
                    "duplicate counter identifier {:?}",
                    entry.identifier
                )));
            }
            if !metrics.insert(entry.metric) {
                return Err(WinpexError::Binding(format!(
                    "duplicate metric name {:?}",
                    entry.metric
                )));
            }
            if !fields.insert(entry.source_field) {
                return Err(WinpexError::Binding(format!(
                    "duplicate source field {:?}",
                    entry.source_field
                )));
            }
        }
        Ok(())
    }
}

pub const PERF_OBJECT: &str = "DHCP Server";

pub static DHCP_CATALOG: Catalog = Catalog::new(&[
    CounterDescriptor::counter(
        "Packets Received/sec",
        "packets_received_total",
        "PacketsReceivedTotal",
        "Total number of packets received by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Duplicates Dropped/sec",
        "duplicates_dropped_total",
        "DuplicatesDroppedTotal",
        "Total number of duplicate packets received by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Packets Expired/sec",
        "packets_expired_total",
        "PacketsExpiredTotal",
        "Total number of packets expired in the DHCP server message queue",
    ),
    CounterDescriptor::gauge(
        "Active Queue Length",
        "active_queue_length",
        "ActiveQueueLength",
        "Number of packets in the processing queue of the DHCP server",
    ),
    CounterDescriptor::gauge(
        "Conflict Check Queue Length",
        "conflict_check_queue_length",
        "ConflictCheckQueueLength",
        "Number of packets in the DHCP server queue waiting on conflict detection (ping).",
    ),
    CounterDescriptor::counter(
        "Discovers/sec",
        "discovers_total",
        "DiscoversTotal",
        "Total DHCP Discovers received by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Offers/sec",
        "offers_total",
        "OffersTotal",
        "Total DHCP Offers sent by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Requests/sec",
        "requests_total",
        "RequestsTotal",
        "Total DHCP Requests received by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Informs/sec",
        "informs_total",
        "InformsTotal",
        "Total DHCP Informs received by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Acks/sec",
        "acks_total",
        "AcksTotal",
        "Total DHCP Acks sent by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Nacks/sec",
        "nacks_total",
        "NacksTotal",
        "Total DHCP Nacks sent by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Declines/sec",
        "declines_total",
        "DeclinesTotal",
        "Total DHCP Declines received by the DHCP server",
    ),
    CounterDescriptor::counter(
        "Releases/sec",
        "releases_total",
        "ReleasesTotal",
        "Total DHCP Releases received by the DHCP server",
    ),
    CounterDescriptor::gauge(
        "Offer Queue Length",
        "offer_queue_length",
        "OfferQueueLength",
        "Number of packets in the offer queue of the DHCP server",
    ),
    CounterDescriptor::counter(
        "Denied due to match.",
        "denied_due_to_match_total",
        "DeniedDueToMatch",
        "Total number of DHCP requests denied, based on matches from the Deny list",
    ),
    CounterDescriptor::counter(
        "Denied due to nonmatch.",
        "denied_due_to_nonmatch_total",
        "DeniedDueToNonMatch",
        "Total number of DHCP requests denied, based on non-matches from the Allow list",
    ),
    CounterDescriptor::counter(
        "Failover: BndUpd sent/sec.",
        "failover_bndupd_sent_total",
        "FailoverBndupdSentTotal",
        "Number of DHCP fail over Binding Update messages sent",
    ),
    CounterDescriptor::counter(
        "Failover: BndUpd received/sec.",
        "failover_bndupd_received_total",
        "FailoverBndupdReceivedTotal",
        "Number of DHCP fail over Binding Update messages received",
    ),
    CounterDescriptor::counter(
        "Failover: BndAck sent/sec.",
        "failover_bndack_sent_total",
        "FailoverBndackSentTotal",
        "Number of DHCP fail over Binding Ack messages sent",
    ),
    CounterDescriptor::counter(
        "Failover: BndAck received/sec.",
        "failover_bndack_received_total",
        "FailoverBndackReceivedTotal",
        "Number of DHCP fail over Binding Ack messages received",
    ),
    CounterDescriptor::gauge(
        "Failover: BndUpd pending in outbound queue.",
        "failover_bndupd_pending_in_outbound_queue",
        "FailoverBndupdPendingOutboundQueue",
        "Number of pending outbound DHCP fail over Binding Update messages",
    ),
    CounterDescriptor::counter(
        "Failover: Transitions to COMMUNICATION-INTERRUPTED state.",
        "failover_transitions_communicationinterrupted_state_total",
        "FailoverTransitionsCommunicationinterruptedState",
        "Total number of transitions into COMMUNICATION INTERRUPTED state",
    ),
    CounterDescriptor::counter(
        "Failover: Transitions to PARTNER-DOWN state.",
        "failover_transitions_partnerdown_state_total",
        "FailoverTransitionsPartnerdownState",
        "Total number of transitions into PARTNER DOWN state",
    ),
    CounterDescriptor::counter(
        "Failover: Transitions to RECOVER state.",
        "failover_transitions_recover_total",
        "FailoverTransitionsRecoverState",
        "Total number of transitions into RECOVER state",
    ),
    CounterDescriptor::counter(
        "Failover: BndUpd Dropped.",
        "failover_bndupd_dropped_total",
        "FailoverBndupdDropped",
        "Total number of DHCP fail over Binding Updates dropped",
    ),
]);

/// Exported descriptors, aligned with the catalog they were built from.
#[derive(Debug, Clone)]
pub struct DescriptorRegistry {
    descriptors: Vec<Arc<MetricDescriptor>>,
}

impl DescriptorRegistry {
    pub fn build(catalog: &Catalog, namespace: &str, subsystem: &str) -> Self {
        Self {
            descriptors: catalog
                .entries()
                .iter()
                .map(|entry| {
                    Arc::new(MetricDescriptor::new(
                        build_fq_name(namespace, subsystem, entry.metric),
                        entry.help_text(),
                        entry.kind,
                    ))
                })
                .collect(),
        }
    }

    pub fn descriptors(&self) -> &[Arc<MetricDescriptor>] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
