//! Step scheduler state machine.

use crate::action::StepAction;
use crate::config::EnvConfig;
use crate::env::AgentOutcome;
use crate::episode::Episode;
use crate::event::StepEvent;
use crate::timer::TimerId;
use crate::traffic::{Outbox, TrafficGenerator};
use meshgym_types::SpaceError;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Lifecycle of the step loop.
///
/// ```text
/// Idle ─Start─▶ Armed ─StepTimer─▶ Firing ─▶ NotifyingAgent
///                 ▲                               │
///                 ├──────── Continue, !done ──────┤
///                 │                               ├─ Continue, done ─▶ EpisodeOver
///                 └──────────── Reset ────────────┴──────────────────────┘
///                                                 Close (any) ─▶ Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started.
    Idle,
    /// Step timer pending.
    Armed,
    /// Emitting the step's traffic burst.
    Firing,
    /// Waiting on the agent round-trip for the current step.
    NotifyingAgent,
    /// Step budget spent; waiting on the agent to reset or close.
    EpisodeOver,
    /// Closed by the agent.
    Stopped,
}

/// Drives one agent round-trip per fixed simulated-time interval.
///
/// Each tick emits the configured traffic burst, then asks the runner to
/// notify the agent exactly once. The next tick is armed after the
/// round-trip completes; simulated time does not advance during the
/// round-trip, so ticks stay `step_interval` apart. A finished episode stops
/// the tick until the agent resets.
pub struct StepScheduler {
    config: EnvConfig,
    traffic: TrafficGenerator,
    episode: Episode,
    state: SchedulerState,
    now: Duration,
}

impl std::fmt::Debug for StepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepScheduler")
            .field("state", &self.state)
            .field("episode", &self.episode.id())
            .field("step", &self.episode.step())
            .field("now", &self.now)
            .finish()
    }
}

impl StepScheduler {
    pub fn new(config: EnvConfig) -> Result<Self, SpaceError> {
        let episode = Episode::new(&config)?;
        let traffic = TrafficGenerator::new(
            config.traffic.source,
            config.traffic.sink,
            config.traffic.payload_size,
        );
        Ok(Self {
            config,
            traffic,
            episode,
            state: SchedulerState::Idle,
            now: Duration::ZERO,
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Mutable episode access, for binding it to the entity registry during
    /// an agent round-trip.
    pub fn episode_mut(&mut self) -> &mut Episode {
        &mut self.episode
    }

    /// Set the current simulated time. Called by the runner before each
    /// event.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Process an event and return the actions to perform.
    pub fn handle(&mut self, event: StepEvent) -> Vec<StepAction> {
        trace!(event = event.type_name(), state = ?self.state, "Handling event");
        match event {
            StepEvent::Start => self.on_start(),
            StepEvent::StepTimer => self.on_step_timer(),
            StepEvent::MessageReceived { episode } => {
                self.on_message_received(episode);
                vec![]
            }
            StepEvent::AgentResponded { outcome } => self.on_agent_responded(outcome),
        }
    }

    fn on_start(&mut self) -> Vec<StepAction> {
        if self.state != SchedulerState::Idle {
            warn!(state = ?self.state, "Start received twice, ignoring");
            return vec![];
        }
        info!(
            interval = ?self.config.step_interval,
            budget = self.config.episode_steps,
            "Step loop started"
        );
        self.state = SchedulerState::Armed;
        vec![StepAction::SetTimer {
            id: TimerId::Step,
            duration: Duration::ZERO,
        }]
    }

    fn on_step_timer(&mut self) -> Vec<StepAction> {
        if self.state != SchedulerState::Armed {
            debug!(state = ?self.state, "Step timer fired while not armed, ignoring");
            return vec![];
        }

        self.state = SchedulerState::Firing;
        self.episode.begin_step();

        let mut outbox = Outbox::new(self.episode.id(), self.config.traffic.pacing());
        for _ in 0..self.config.traffic.burst_size {
            self.traffic
                .fire(self.episode.counters_mut(), &mut outbox, 1);
        }
        let mut actions = outbox.into_actions();

        let step = self.episode.step();
        debug!(
            episode = self.episode.id(),
            step,
            now = ?self.now,
            burst = self.config.traffic.burst_size,
            "Step fired"
        );

        self.state = SchedulerState::NotifyingAgent;
        actions.push(StepAction::NotifyAgent { step });
        actions
    }

    fn on_message_received(&mut self, episode: u64) {
        if self.episode.record_delivery(episode) {
            meshgym_metrics::record_packet_delivered();
            trace!(
                received = self.episode.counters().received(),
                "Message delivered"
            );
        } else {
            meshgym_metrics::record_packet_dropped("stale");
            trace!(
                episode,
                current = self.episode.id(),
                "Discarding delivery from earlier episode"
            );
        }
    }

    fn on_agent_responded(&mut self, outcome: AgentOutcome) -> Vec<StepAction> {
        match (self.state, outcome) {
            (SchedulerState::NotifyingAgent, AgentOutcome::Continue) => {
                let status = self.episode.settle();
                if status.done {
                    self.state = SchedulerState::EpisodeOver;
                    vec![StepAction::NotifyEpisodeEnd {
                        step: self.episode.step(),
                    }]
                } else {
                    self.state = SchedulerState::Armed;
                    vec![StepAction::SetTimer {
                        id: TimerId::Step,
                        duration: self.config.step_interval,
                    }]
                }
            }
            (
                SchedulerState::NotifyingAgent | SchedulerState::EpisodeOver,
                AgentOutcome::Reset,
            ) => {
                self.episode.reset();
                self.state = SchedulerState::Armed;
                vec![
                    StepAction::ResetEnvironment,
                    StepAction::SetTimer {
                        id: TimerId::Step,
                        duration: Duration::ZERO,
                    },
                ]
            }
            (
                SchedulerState::NotifyingAgent | SchedulerState::EpisodeOver,
                AgentOutcome::Close,
            ) => {
                info!(
                    episode = self.episode.id(),
                    step = self.episode.step(),
                    "Agent closed the environment"
                );
                self.state = SchedulerState::Stopped;
                vec![StepAction::CancelTimer { id: TimerId::Step }, StepAction::Stop]
            }
            (state, outcome) => {
                warn!(?state, ?outcome, "Unexpected agent outcome, ignoring");
                vec![]
            }
        }
    }
}
