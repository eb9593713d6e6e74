//! Timer scheduling abstraction.
//!
//! The step scheduler emits `StepAction::SetTimer`. This trait abstracts the
//! clock side: the simulation inserts timers into its deterministic event
//! queue.

use std::time::Duration;

/// Timer identification for scheduled events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Fixed-interval step tick.
    Step,
}

/// Abstraction for scheduling and cancelling relative-time timers.
///
/// Setting a timer that is already pending replaces it.
pub trait TimerScheduler {
    fn set_timer(&mut self, id: TimerId, duration: Duration);
    fn cancel_timer(&mut self, id: TimerId);
}
