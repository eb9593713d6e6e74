//! Action types for the step scheduler.

use crate::timer::TimerId;
use crate::traffic::Message;
use std::time::Duration;

/// Actions the step scheduler wants performed.
///
/// Actions are **commands** - they describe something to do. The runner
/// executes them; the scheduler never touches the clock, the network or the
/// agent itself.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Hand a message to the environment's network, `delay` after now.
    SendMessage { message: Message, delay: Duration },

    /// Schedule a timer to fire after `duration`.
    SetTimer { id: TimerId, duration: Duration },

    /// Cancel a pending timer.
    CancelTimer { id: TimerId },

    /// Block on one agent round-trip for this step.
    NotifyAgent { step: u64 },

    /// Block on the final round-trip of a finished episode. The agent must
    /// answer with reset or close.
    NotifyEpisodeEnd { step: u64 },

    /// Restore every entity's attribute to its initial value and drop
    /// in-flight messages of earlier episodes.
    ResetEnvironment,

    /// Stop the engine.
    Stop,
}

impl StepAction {
    /// Get the action type name for telemetry.
    pub fn type_name(&self) -> &'static str {
        match self {
            StepAction::SendMessage { .. } => "SendMessage",
            StepAction::SetTimer { .. } => "SetTimer",
            StepAction::CancelTimer { .. } => "CancelTimer",
            StepAction::NotifyAgent { .. } => "NotifyAgent",
            StepAction::NotifyEpisodeEnd { .. } => "NotifyEpisodeEnd",
            StepAction::ResetEnvironment => "ResetEnvironment",
            StepAction::Stop => "Stop",
        }
    }
}
