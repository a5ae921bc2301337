use serde::{Deserialize, Serialize};

pub const FIELD_COUNT: usize = 25;

/// Structured record of one DHCP Server instance, keyed in the snapshot by
/// counter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DhcpPerf {
    #[serde(rename = "Packets Received/sec")]
    pub packets_received_total: f64,
    #[serde(rename = "Duplicates Dropped/sec")]
    pub duplicates_dropped_total: f64,
    #[serde(rename = "Packets Expired/sec")]
    pub packets_expired_total: f64,
    #[serde(rename = "Active Queue Length")]
    pub active_queue_length: f64,
    #[serde(rename = "Conflict Check Queue Length")]
    pub conflict_check_queue_length: f64,
    #[serde(rename = "Discovers/sec")]
    pub discovers_total: f64,
    #[serde(rename = "Offers/sec")]
    pub offers_total: f64,
    #[serde(rename = "Requests/sec")]
    pub requests_total: f64,
    #[serde(rename = "Informs/sec")]
    pub informs_total: f64,
    #[serde(rename = "Acks/sec")]
    pub acks_total: f64,
    #[serde(rename = "Nacks/sec")]
    pub nacks_total: f64,
    #[serde(rename = "Declines/sec")]
    pub declines_total: f64,
    #[serde(rename = "Releases/sec")]
    pub releases_total: f64,
    #[serde(rename = "Offer Queue Length")]
    pub offer_queue_length: f64,
    #[serde(rename = "Denied due to match.")]
    pub denied_due_to_match: f64,
    #[serde(rename = "Denied due to nonmatch.")]
    pub denied_due_to_non_match: f64,
    #[serde(rename = "Failover: BndUpd sent/sec.")]
    pub failover_bnd_upd_sent_total: f64,
    #[serde(rename = "Failover: BndUpd received/sec.")]
    pub failover_bnd_upd_received_total: f64,
    #[serde(rename = "Failover: BndAck sent/sec.")]
    pub failover_bnd_ack_sent_total: f64,
    #[serde(rename = "Failover: BndAck received/sec.")]
    pub failover_bnd_ack_received_total: f64,
    #[serde(rename = "Failover: BndUpd pending in outbound queue.")]
    pub failover_bnd_upd_pending_outbound_queue: f64,
    #[serde(rename = "Failover: Transitions to COMMUNICATION-INTERRUPTED state.")]
    pub failover_transitions_communication_interrupted_state: f64,
    #[serde(rename = "Failover: Transitions to PARTNER-DOWN state.")]
    pub failover_transitions_partner_down_state: f64,
    #[serde(rename = "Failover: Transitions to RECOVER state.")]
    pub failover_transitions_recover_state: f64,
    #[serde(rename = "Failover: BndUpd Dropped.")]
    pub failover_bnd_upd_dropped: f64,
}

impl DhcpPerf {
    /// Field names in the order [`DhcpPerf::values`] returns them.
    pub const FIELDS: [&'static str; FIELD_COUNT] = [
        "PacketsReceivedTotal",
        "DuplicatesDroppedTotal",
        "PacketsExpiredTotal",
        "ActiveQueueLength",
        "ConflictCheckQueueLength",
        "DiscoversTotal",
        "OffersTotal",
        "RequestsTotal",
        "InformsTotal",
        "AcksTotal",
        "NacksTotal",
        "DeclinesTotal",
        "ReleasesTotal",
        "OfferQueueLength",
        "DeniedDueToMatch",
        "DeniedDueToNonMatch",
        "FailoverBndupdSentTotal",
        "FailoverBndupdReceivedTotal",
        "FailoverBndackSentTotal",
        "FailoverBndackReceivedTotal",
        "FailoverBndupdPendingOutboundQueue",
        "FailoverTransitionsCommunicationinterruptedState",
        "FailoverTransitionsPartnerdownState",
        "FailoverTransitionsRecoverState",
        "FailoverBndupdDropped",
    ];

    pub fn values(&self) -> [f64; FIELD_COUNT] {
        [
            self.packets_received_total,
            self.duplicates_dropped_total,
            self.packets_expired_total,
            self.active_queue_length,
            self.conflict_check_queue_length,
            self.discovers_total,
            self.offers_total,
            self.requests_total,
            self.informs_total,
            self.acks_total,
            self.nacks_total,
            self.declines_total,
            self.releases_total,
            self.offer_queue_length,
            self.denied_due_to_match,
            self.denied_due_to_non_match,
            self.failover_bnd_upd_sent_total,
            self.failover_bnd_upd_received_total,
            self.failover_bnd_ack_sent_total,
            self.failover_bnd_ack_received_total,
            self.failover_bnd_upd_pending_outbound_queue,
            self.failover_transitions_communication_interrupted_state,
            self.failover_transitions_partner_down_state,
            self.failover_transitions_recover_state,
            self.failover_bnd_upd_dropped,
        ]
    }
}
