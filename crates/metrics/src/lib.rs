//! Metrics facade for meshgym.
//!
//! Provides a [`MetricsRecorder`] trait with domain-specific methods and default
//! no-op implementations. A global singleton recorder is looked up on every
//! call, and convenience free functions delegate to it.
//!
//! # Usage
//!
//! Callers record metrics via free functions:
//! ```ignore
//! meshgym_metrics::record_packet_sent();
//! meshgym_metrics::record_agent_round_trip(latency_secs);
//! ```
//!
//! At startup, optionally install a backend. Without one, every call is a
//! no-op:
//! ```ignore
//! meshgym_metrics::set_global_recorder(Box::new(MyRecorder::default()));
//! ```

use std::sync::OnceLock;

// ═══════════════════════════════════════════════════════════════════════
// Trait
// ═══════════════════════════════════════════════════════════════════════

/// Domain-specific metrics recording trait.
///
/// All methods have default no-op implementations so backends only need
/// to override the metrics they care about.
#[allow(unused_variables)]
pub trait MetricsRecorder: Send + Sync + 'static {
    // ── Step loop ────────────────────────────────────────────────────

    /// Record a step evaluated (reward and done computed).
    fn record_step(&self) {}

    /// Set the current reward gauge.
    fn set_reward(&self, reward: f64) {}

    /// Record an episode reaching its step budget.
    fn record_episode_finished(&self, steps: u64) {}

    /// Record an action refused by validation or because the episode is over.
    fn record_action_rejected(&self) {}

    // ── Traffic ──────────────────────────────────────────────────────

    /// Record a message emitted by the traffic generator.
    fn record_packet_sent(&self) {}

    /// Record a message counted at the sink.
    fn record_packet_delivered(&self) {}

    /// Record a message lost before it counted (`unreachable`, `loss`,
    /// `stale`).
    fn record_packet_dropped(&self, reason: &str) {}

    // ── Agent ────────────────────────────────────────────────────────

    /// Record the wall-clock duration of one agent round-trip.
    fn record_agent_round_trip(&self, latency_secs: f64) {}
}

// ═══════════════════════════════════════════════════════════════════════
// Global recorder
// ═══════════════════════════════════════════════════════════════════════

struct NoopRecorder;
impl MetricsRecorder for NoopRecorder {}

static RECORDER: OnceLock<Box<dyn MetricsRecorder>> = OnceLock::new();

/// Install a global metrics recorder.
///
/// Can only be called once. Subsequent calls are silently ignored.
pub fn set_global_recorder(recorder: Box<dyn MetricsRecorder>) {
    let _ = RECORDER.set(recorder);
}

/// Get the global recorder (no-op if none installed).
#[inline]
fn recorder() -> &'static dyn MetricsRecorder {
    RECORDER.get().map(|r| r.as_ref()).unwrap_or(&NoopRecorder)
}

// ═══════════════════════════════════════════════════════════════════════
// Convenience free functions
// ═══════════════════════════════════════════════════════════════════════

/// Record a step evaluated.
#[inline]
pub fn record_step() {
    recorder().record_step();
}

/// Set the current reward gauge.
#[inline]
pub fn set_reward(reward: f64) {
    recorder().set_reward(reward);
}

/// Record an episode reaching its step budget.
#[inline]
pub fn record_episode_finished(steps: u64) {
    recorder().record_episode_finished(steps);
}

/// Record a rejected action.
#[inline]
pub fn record_action_rejected() {
    recorder().record_action_rejected();
}

/// Record a message emitted by the traffic generator.
#[inline]
pub fn record_packet_sent() {
    recorder().record_packet_sent();
}

/// Record a message counted at the sink.
#[inline]
pub fn record_packet_delivered() {
    recorder().record_packet_delivered();
}

/// Record a dropped message.
#[inline]
pub fn record_packet_dropped(reason: &str) {
    recorder().record_packet_dropped(reason);
}

/// Record an agent round-trip duration.
#[inline]
pub fn record_agent_round_trip(latency_secs: f64) {
    recorder().record_agent_round_trip(latency_secs);
}
