//! Uniform random policy.

use meshgym_core::{AgentOutcome, AgentTransport, GymEnv, TransportError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Agent that samples every action uniformly from the action space and
/// accumulates the reward of each episode.
#[derive(Debug)]
pub struct RandomAgent {
    rng: ChaCha8Rng,
    episodes: u32,
    current: f64,
    totals: Vec<f64>,
}

impl RandomAgent {
    pub fn new(seed: u64, episodes: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            episodes,
            current: 0.0,
            totals: Vec::new(),
        }
    }

    /// Total reward of every finished episode, in order.
    pub fn episode_rewards(&self) -> &[f64] {
        &self.totals
    }
}

impl AgentTransport for RandomAgent {
    fn notify_step_ready(&mut self, env: &mut dyn GymEnv) -> Result<AgentOutcome, TransportError> {
        self.current += env.reward_and_done().reward;
        let action = env.action_space().sample(&mut self.rng);
        env.execute_action(&action)?;
        Ok(AgentOutcome::Continue)
    }

    fn notify_episode_end(&mut self, _env: &mut dyn GymEnv) -> Result<AgentOutcome, TransportError> {
        debug!(
            episode = self.totals.len(),
            total = self.current,
            "Random agent episode finished"
        );
        self.totals.push(self.current);
        self.current = 0.0;
        if self.totals.len() as u32 >= self.episodes {
            Ok(AgentOutcome::Close)
        } else {
            Ok(AgentOutcome::Reset)
        }
    }
}
