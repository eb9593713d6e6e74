//! Packet counters.

/// Packets sent and received by the environment during the current episode.
///
/// Written by the [`TrafficGenerator`](crate::TrafficGenerator) (sent) and
/// the sink's receive path (received), read by the
/// [`RewardComputer`](crate::RewardComputer). Monotonic within an episode;
/// cleared only when the episode is reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    sent: u64,
    received: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters holding the given totals.
    pub fn from_counts(sent: u64, received: u64) -> Self {
        Self { sent, received }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn record_sent(&mut self) {
        self.sent += 1;
    }

    pub fn record_received(&mut self) {
        self.received += 1;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
