//! Per-episode state and its [`GymEnv`] view.

use crate::config::EnvConfig;
use crate::counters::Counters;
use crate::entity::EntityRegistry;
use crate::env::{EnvError, GymEnv, StepStatus};
use crate::executor::ActionExecutor;
use crate::observation::ObservationBuilder;
use crate::reward::RewardComputer;
use crate::termination::TerminationPolicy;
use meshgym_types::{BoxContainer, SpaceDescriptor, SpaceError};
use tracing::{debug, info, warn};

/// State owned for the lifetime of one episode: counters, sticky reward,
/// step budget, and the builders that read and write entities.
#[derive(Debug)]
pub struct Episode {
    id: u64,
    step: u64,
    counters: Counters,
    reward: RewardComputer,
    termination: TerminationPolicy,
    observation: ObservationBuilder,
    executor: ActionExecutor,
    /// Reward and done of the current step, once evaluated.
    status: Option<StepStatus>,
    over: bool,
}

impl Episode {
    pub fn new(config: &EnvConfig) -> Result<Self, SpaceError> {
        let observation_space = config.observation_space()?;
        let action_space = config.action_space()?;
        Ok(Self {
            id: 0,
            step: 0,
            counters: Counters::new(),
            reward: RewardComputer::new(),
            termination: TerminationPolicy::new(config.episode_steps),
            observation: ObservationBuilder::new(observation_space, config.partition),
            executor: ActionExecutor::new(action_space, config.partition),
            status: None,
            over: false,
        })
    }

    /// Episode number, starting at 0 and incremented by every reset.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current step within the episode, starting at 1 on the first tick.
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn observation_builder(&self) -> &ObservationBuilder {
        &self.observation
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    /// Advance to the next step, clearing the cached status.
    pub fn begin_step(&mut self) {
        self.step += 1;
        self.status = None;
    }

    /// Count a delivery at the sink. Deliveries tagged with an earlier
    /// episode are ignored; returns whether the delivery counted.
    pub fn record_delivery(&mut self, episode: u64) -> bool {
        if episode != self.id {
            return false;
        }
        self.counters.record_received();
        true
    }

    /// Reward and done for the current step, evaluated at most once.
    pub fn status(&mut self) -> StepStatus {
        if let Some(status) = self.status {
            return status;
        }

        let reward = self.reward.compute(&self.counters);
        let done = self.termination.evaluate();
        let status = StepStatus { reward, done };
        self.status = Some(status);

        meshgym_metrics::record_step();
        meshgym_metrics::set_reward(reward);
        debug!(
            episode = self.id,
            step = self.step,
            reward,
            done,
            sent = self.counters.sent(),
            received = self.counters.received(),
            "Step evaluated"
        );
        if done {
            meshgym_metrics::record_episode_finished(self.step);
        }
        status
    }

    /// Close the current step. Evaluates the status if the agent never asked
    /// for it; marks the episode over when the budget is spent.
    pub fn settle(&mut self) -> StepStatus {
        let status = self.status();
        if status.done && !self.over {
            self.over = true;
            info!(
                episode = self.id,
                steps = self.step,
                reward = status.reward,
                "Episode finished"
            );
        }
        status
    }

    /// Start a new episode: counters, sticky reward and step budget are
    /// cleared and the episode id advances.
    pub fn reset(&mut self) {
        self.id += 1;
        self.step = 0;
        self.counters.reset();
        self.reward.reset();
        self.termination.reset();
        self.status = None;
        self.over = false;
        info!(episode = self.id, "Episode reset");
    }

    /// Pair this episode with the entity registry it observes and acts on.
    pub fn bind<'a, R: EntityRegistry + ?Sized>(
        &'a mut self,
        registry: &'a mut R,
    ) -> EpisodeEnv<'a, R> {
        EpisodeEnv {
            episode: self,
            registry,
        }
    }

    fn info(&self) -> String {
        format!(
            "step={} sent={} received={}",
            self.step,
            self.counters.sent(),
            self.counters.received()
        )
    }
}

/// An [`Episode`] bound to the live entity registry for one round-trip.
pub struct EpisodeEnv<'a, R: EntityRegistry + ?Sized> {
    episode: &'a mut Episode,
    registry: &'a mut R,
}

impl<R: EntityRegistry + ?Sized> GymEnv for EpisodeEnv<'_, R> {
    fn observation_space(&self) -> &SpaceDescriptor {
        self.episode.observation.space()
    }

    fn action_space(&self) -> &SpaceDescriptor {
        self.episode.executor.space()
    }

    fn observation(&self) -> Result<BoxContainer, EnvError> {
        Ok(self.episode.observation.build(&*self.registry)?)
    }

    fn reward_and_done(&mut self) -> StepStatus {
        self.episode.status()
    }

    fn extra_info(&self) -> String {
        self.episode.info()
    }

    fn execute_action(&mut self, action: &BoxContainer) -> Result<(), EnvError> {
        if self.episode.over {
            meshgym_metrics::record_action_rejected();
            return Err(EnvError::EpisodeOver);
        }
        match self.episode.executor.apply(action, &mut *self.registry) {
            Ok(()) => {
                debug!(step = self.episode.step, %action, "Action applied");
                Ok(())
            }
            Err(e) => {
                meshgym_metrics::record_action_rejected();
                warn!(step = self.episode.step, error = %e, "Action rejected");
                Err(e.into())
            }
        }
    }
}
