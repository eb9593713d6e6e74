//! The environment adapter presented to agents, and the transport seam that
//! carries it to them.

use crate::executor::ValidationError;
use crate::observation::SpaceMismatch;
use meshgym_types::{BoxContainer, SpaceDescriptor};
use thiserror::Error;

/// Reward and termination flag of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStatus {
    pub reward: f64,
    pub done: bool,
}

/// Failures of an environment request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error(transparent)]
    SpaceMismatch(#[from] SpaceMismatch),

    #[error("action rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("episode over: reset or close the environment")]
    EpisodeOver,
}

/// The operations an agent may request while a step is pending.
///
/// Implemented once per environment; handed to the [`AgentTransport`] for
/// the duration of one round-trip.
pub trait GymEnv {
    fn observation_space(&self) -> &SpaceDescriptor;

    fn action_space(&self) -> &SpaceDescriptor;

    /// The current step's observation.
    fn observation(&self) -> Result<BoxContainer, EnvError>;

    /// Reward and termination for the current step. Evaluated once per step;
    /// repeated calls return the same pair.
    fn reward_and_done(&mut self) -> StepStatus;

    /// Free-form diagnostic string for the current step.
    fn extra_info(&self) -> String;

    /// Validate and apply an action. All-or-nothing.
    fn execute_action(&mut self, action: &BoxContainer) -> Result<(), EnvError>;
}

/// How the agent ended a round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentOutcome {
    /// An action was accepted; continue with the next step.
    Continue,

    /// Start a new episode.
    Reset,

    /// Stop the run.
    Close,
}

/// Failures talking to the agent. All are fatal to the run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("agent I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("agent did not respond within {0:?}")]
    Timeout(std::time::Duration),

    #[error("agent disconnected")]
    Disconnected,

    #[error("agent protocol violation: {0}")]
    Protocol(String),

    #[error("environment fault while serving the agent: {0}")]
    Environment(#[from] EnvError),
}

/// Blocking request/response channel to the agent.
///
/// Each call runs one complete round-trip: the transport serves the agent's
/// requests against `env` until the agent ends the round-trip. Simulated time
/// does not advance while a call is in progress.
pub trait AgentTransport {
    /// A new step is ready.
    fn notify_step_ready(&mut self, env: &mut dyn GymEnv) -> Result<AgentOutcome, TransportError>;

    /// The episode is over. Actions are refused; the round-trip ends only on
    /// [`AgentOutcome::Reset`] or [`AgentOutcome::Close`].
    fn notify_episode_end(&mut self, env: &mut dyn GymEnv)
        -> Result<AgentOutcome, TransportError>;
}
