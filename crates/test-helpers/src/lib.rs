//! Test helpers for meshgym - in-process agents and fixture worlds.
//!
//! The agents implement [`AgentTransport`] directly, so tests exercise the
//! scheduler, the episode lifecycle and the environment adapter without a
//! socket in between.
//!
//! # Example
//!
//! ```rust
//! use meshgym_test_helpers::{fixtures, ScriptedAgent};
//!
//! let agent = ScriptedAgent::new(1);
//! let mut runner = fixtures::default_runner(agent);
//! runner.start();
//! runner.run().unwrap();
//!
//! let agent = runner.into_agent();
//! // Twenty steps plus the final round-trip of the finished episode.
//! assert_eq!(agent.round_trips().len(), 21);
//! assert_eq!(agent.episodes_finished(), 1);
//! ```

pub mod fixtures;
mod random;

pub use random::RandomAgent;

use meshgym_core::{AgentOutcome, AgentTransport, EnvError, GymEnv, StepStatus, TransportError};
use meshgym_types::BoxContainer;
use std::collections::VecDeque;

/// What the agent saw during one round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    pub observation: BoxContainer,
    pub status: StepStatus,
    pub info: String,
    /// Whether this was the final round-trip of a finished episode.
    pub episode_over: bool,
}

/// Agent that replays queued actions and records everything it observes.
///
/// When the queue is empty it holds position by sending the current
/// observation back as its action. At each episode end it resets, until
/// `episodes` episodes have finished; then it closes.
#[derive(Debug)]
pub struct ScriptedAgent {
    episodes: u32,
    finished: u32,
    actions: VecDeque<BoxContainer>,
    close_after: Option<usize>,
    round_trips: Vec<RoundTrip>,
    rejections: Vec<EnvError>,
}

impl ScriptedAgent {
    /// Agent that runs `episodes` full episodes and then closes.
    pub fn new(episodes: u32) -> Self {
        Self {
            episodes,
            finished: 0,
            actions: VecDeque::new(),
            close_after: None,
            round_trips: Vec::new(),
            rejections: Vec::new(),
        }
    }

    /// Queue actions to send on the next step round-trips, in order.
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = BoxContainer>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Close the environment on the `n`-th round-trip instead of acting.
    pub fn close_after(mut self, n: usize) -> Self {
        self.close_after = Some(n);
        self
    }

    pub fn round_trips(&self) -> &[RoundTrip] {
        &self.round_trips
    }

    /// Errors returned by the environment for refused actions.
    pub fn rejections(&self) -> &[EnvError] {
        &self.rejections
    }

    pub fn episodes_finished(&self) -> u32 {
        self.finished
    }

    fn observe(&mut self, env: &mut dyn GymEnv, episode_over: bool) -> Result<(), TransportError> {
        let observation = env.observation()?;
        let status = env.reward_and_done();
        let info = env.extra_info();
        self.round_trips.push(RoundTrip {
            observation,
            status,
            info,
            episode_over,
        });
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.close_after
            .is_some_and(|n| self.round_trips.len() >= n)
    }
}

impl AgentTransport for ScriptedAgent {
    fn notify_step_ready(&mut self, env: &mut dyn GymEnv) -> Result<AgentOutcome, TransportError> {
        self.observe(env, false)?;
        if self.should_close() {
            return Ok(AgentOutcome::Close);
        }

        if let Some(action) = self.actions.pop_front() {
            match env.execute_action(&action) {
                Ok(()) => return Ok(AgentOutcome::Continue),
                Err(e) => self.rejections.push(e),
            }
        }

        // Hold: send back what was observed.
        let hold = env.observation()?;
        env.execute_action(&hold)?;
        Ok(AgentOutcome::Continue)
    }

    fn notify_episode_end(&mut self, env: &mut dyn GymEnv) -> Result<AgentOutcome, TransportError> {
        self.observe(env, true)?;
        let hold = env.observation()?;
        if let Err(e) = env.execute_action(&hold) {
            self.rejections.push(e);
        }

        self.finished += 1;
        if self.finished >= self.episodes || self.should_close() {
            Ok(AgentOutcome::Close)
        } else {
            Ok(AgentOutcome::Reset)
        }
    }
}
