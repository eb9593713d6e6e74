//! Event types for the step scheduler.

use crate::env::AgentOutcome;

/// Priority levels for event ordering within the same timestamp.
///
/// Events at the same simulation time are processed in priority order.
/// Lower values = higher priority (processed first).
///
/// This ensures causality is preserved: internal events (consequences of
/// processing an event) are handled before new external inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventPriority {
    /// Internal events: consequences of prior event processing.
    /// Processed first to maintain causality.
    Internal = 0,

    /// Timer events: scheduled by the scheduler itself.
    Timer = 1,

    /// Network events: message arrivals at the sink.
    Network = 2,
}

/// All possible events the step scheduler can receive.
///
/// Events are **passive data** - they describe something that happened.
/// The scheduler processes events and returns actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    /// The run has started. Arms the first tick at the current time.
    Start,

    /// The step timer fired.
    StepTimer,

    /// A message generated by the traffic generator reached the sink.
    MessageReceived {
        /// Episode the message was emitted in.
        episode: u64,
    },

    /// The agent round-trip for the current step completed.
    AgentResponded { outcome: AgentOutcome },
}

impl StepEvent {
    /// Get the priority for this event type.
    pub fn priority(&self) -> EventPriority {
        match self {
            StepEvent::Start | StepEvent::AgentResponded { .. } => EventPriority::Internal,
            StepEvent::StepTimer => EventPriority::Timer,
            StepEvent::MessageReceived { .. } => EventPriority::Network,
        }
    }

    /// Get the event type name for telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            StepEvent::Start => "Start",
            StepEvent::StepTimer => "StepTimer",
            StepEvent::MessageReceived { .. } => "MessageReceived",
            StepEvent::AgentResponded { .. } => "AgentResponded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_events_sort_first() {
        let internal = StepEvent::AgentResponded {
            outcome: AgentOutcome::Continue,
        }
        .priority();
        assert!(internal < StepEvent::StepTimer.priority());
        assert!(StepEvent::StepTimer.priority() < StepEvent::MessageReceived { episode: 0 }.priority());
    }
}
