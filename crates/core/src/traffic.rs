//! Synthetic per-step load.

use crate::action::StepAction;
use crate::counters::Counters;
use meshgym_types::NodeIndex;
use std::time::Duration;
use tracing::trace;

/// A synthetic message travelling from the traffic source to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub payload_size: u32,
    /// Episode the message was emitted in. Deliveries from an earlier
    /// episode are discarded after a reset.
    pub episode: u64,
}

/// Outbound side of the environment's network.
///
/// Fire-and-forget: delivery failures are the environment's concern and are
/// never reported back to the sender.
pub trait Transport {
    fn send(&mut self, from: NodeIndex, to: NodeIndex, payload_size: u32);
}

/// Emits a fixed burst of messages from one source entity to one sink.
#[derive(Debug, Clone)]
pub struct TrafficGenerator {
    source: NodeIndex,
    sink: NodeIndex,
    payload_size: u32,
}

impl TrafficGenerator {
    pub fn new(source: NodeIndex, sink: NodeIndex, payload_size: u32) -> Self {
        Self {
            source,
            sink,
            payload_size,
        }
    }

    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn sink(&self) -> NodeIndex {
        self.sink
    }

    pub fn payload_size(&self) -> u32 {
        self.payload_size
    }

    /// Send `count` messages, incrementing `counters.sent` once per message.
    pub fn fire<T: Transport + ?Sized>(
        &self,
        counters: &mut Counters,
        transport: &mut T,
        count: u32,
    ) {
        for _ in 0..count {
            transport.send(self.source, self.sink, self.payload_size);
            counters.record_sent();
            meshgym_metrics::record_packet_sent();
        }
        trace!(
            source = self.source,
            sink = self.sink,
            count,
            sent = counters.sent(),
            "Traffic burst emitted"
        );
    }
}

/// [`Transport`] that turns sends into [`StepAction::SendMessage`] commands.
///
/// With a `spacing`, the n-th message of a burst (counting from zero) is
/// delayed by `n * spacing`; without, the whole burst leaves at once.
#[derive(Debug)]
pub struct Outbox {
    episode: u64,
    spacing: Option<Duration>,
    actions: Vec<StepAction>,
}

impl Outbox {
    pub fn new(episode: u64, spacing: Option<Duration>) -> Self {
        Self {
            episode,
            spacing,
            actions: Vec::new(),
        }
    }

    pub fn into_actions(self) -> Vec<StepAction> {
        self.actions
    }
}

impl Transport for Outbox {
    fn send(&mut self, from: NodeIndex, to: NodeIndex, payload_size: u32) {
        let delay = match self.spacing {
            Some(spacing) => spacing * self.actions.len() as u32,
            None => Duration::ZERO,
        };
        self.actions.push(StepAction::SendMessage {
            message: Message {
                from,
                to,
                payload_size,
                episode: self.episode,
            },
            delay,
        });
    }
}
