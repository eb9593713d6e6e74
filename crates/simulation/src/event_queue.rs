//! Event queue with deterministic ordering.

use meshgym_core::{EventPriority, Message, StepEvent};
use meshgym_types::NodeIndex;
use std::cmp::Ordering;
use std::time::Duration;

/// An event held by the engine.
#[derive(Debug, Clone)]
pub(crate) enum SimEvent {
    /// Input for the step scheduler.
    Step(StepEvent),
    /// A paced message leaving its source.
    Transmit(Message),
}

impl SimEvent {
    pub(crate) fn priority(&self) -> EventPriority {
        match self {
            SimEvent::Step(event) => event.priority(),
            SimEvent::Transmit(_) => EventPriority::Timer,
        }
    }

    /// Episode a message-carrying event belongs to.
    pub(crate) fn message_episode(&self) -> Option<u64> {
        match self {
            SimEvent::Step(StepEvent::MessageReceived { episode }) => Some(*episode),
            SimEvent::Transmit(message) => Some(message.episode),
            SimEvent::Step(_) => None,
        }
    }
}

/// Key for ordering events in the queue.
///
/// Events are ordered by:
/// 1. Time (earlier first)
/// 2. Priority (internal before timer before network)
/// 3. Node index (deterministic ordering)
/// 4. Sequence number (FIFO for same time/priority/node)
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct EventKey {
    /// When this event should be processed.
    pub time: Duration,
    /// Priority for ordering at same time.
    pub priority: EventPriority,
    /// Node the event concerns.
    pub node_index: NodeIndex,
    /// Sequence number for deterministic FIFO ordering.
    pub sequence: u64,
}

impl EventKey {
    pub(crate) fn new(
        time: Duration,
        event: &SimEvent,
        node_index: NodeIndex,
        sequence: u64,
    ) -> Self {
        Self {
            time,
            priority: event.priority(),
            node_index,
            sequence,
        }
    }
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| self.node_index.cmp(&other.node_index))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(time_ms: u64, priority: EventPriority, node_index: NodeIndex, sequence: u64) -> EventKey {
        EventKey {
            time: Duration::from_millis(time_ms),
            priority,
            node_index,
            sequence,
        }
    }

    #[test]
    fn test_event_key_ordering() {
        assert!(key(1000, EventPriority::Network, 0, 1) < key(2000, EventPriority::Network, 0, 2));
    }

    #[test]
    fn test_priority_ordering_at_same_time() {
        let internal = key(1000, EventPriority::Internal, 0, 2);
        let timer = key(1000, EventPriority::Timer, 0, 1);
        let network = key(1000, EventPriority::Network, 0, 0);
        assert!(internal < timer, "Internal events should process before timers");
        assert!(timer < network, "Timers should process before deliveries");
    }

    #[test]
    fn test_sequence_breaks_ties() {
        assert!(key(5, EventPriority::Network, 6, 1) < key(5, EventPriority::Network, 6, 2));
        assert!(key(5, EventPriority::Network, 6, 9) < key(5, EventPriority::Network, 7, 1));
    }
}
