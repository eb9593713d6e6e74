//! Deterministic simulation runner.
//!
//! The runner owns the clock, the node world, the network model and the
//! agent transport. When the scheduler emits `StepAction::NotifyAgent`, the
//! runner performs the agent round-trip inline (blocking) and feeds the
//! outcome back as an internal event at the same simulated time.

use crate::event_queue::{EventKey, SimEvent};
use crate::world::NodeWorld;
use meshgym_core::{
    AgentOutcome, AgentTransport, EnvConfig, EnvError, Message, SchedulerState, SpaceMismatch,
    StepAction, StepEvent, StepScheduler, TimerId, TimerScheduler, TransportError,
};
use meshgym_network_memory::{DropReason, NetworkConfig, SimulatedNetwork};
use meshgym_types::{NodeIndex, SpaceError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, trace};

/// Fatal run failures.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid environment configuration: {0}")]
    Config(#[from] SpaceError),

    #[error("traffic {role} node {index} does not exist ({count} nodes)")]
    UnknownNode {
        role: &'static str,
        index: NodeIndex,
        count: usize,
    },

    #[error(transparent)]
    SpaceMismatch(#[from] SpaceMismatch),

    #[error("agent transport failed: {0}")]
    Transport(#[source] TransportError),
}

impl From<TransportError> for RunnerError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Environment(EnvError::SpaceMismatch(mismatch)) => {
                RunnerError::SpaceMismatch(mismatch)
            }
            other => RunnerError::Transport(other),
        }
    }
}

/// Statistics collected during simulation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimulationStats {
    /// Total events processed.
    pub events_processed: u64,
    /// Events processed by priority.
    pub events_by_priority: [u64; 3],
    /// Total actions generated.
    pub actions_generated: u64,
    /// Messages scheduled for delivery at the sink and not discarded by a
    /// reset. Each emitted message is counted once, here or as a drop.
    pub messages_sent: u64,
    /// Messages that arrived at the sink.
    pub messages_delivered: u64,
    /// Messages with no path to the sink.
    pub messages_dropped_unreachable: u64,
    /// Messages dropped due to packet loss.
    pub messages_dropped_loss: u64,
    /// In-flight messages discarded by an episode reset.
    pub messages_dropped_stale: u64,
    /// Timers set.
    pub timers_set: u64,
    /// Timers cancelled.
    pub timers_cancelled: u64,
    /// Completed agent round-trips.
    pub agent_round_trips: u64,
    /// Episodes that reached their step budget.
    pub episodes_completed: u64,
}

impl SimulationStats {
    /// Total messages dropped.
    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped_unreachable + self.messages_dropped_loss + self.messages_dropped_stale
    }

    /// Message delivery rate (sent / (sent + dropped)).
    pub fn delivery_rate(&self) -> f64 {
        let total = self.messages_sent + self.messages_dropped();
        if total == 0 {
            1.0
        } else {
            self.messages_sent as f64 / total as f64
        }
    }
}

/// Deterministic simulation runner.
///
/// Processes events in deterministic order and executes the scheduler's
/// actions. Given the same seed and the same agent decisions, produces
/// identical results every run.
pub struct SimulationRunner<A> {
    scheduler: StepScheduler,

    /// Controllable and passive nodes.
    world: NodeWorld,

    /// Remote or in-process agent.
    agent: A,

    /// Network simulator.
    network: SimulatedNetwork,

    /// RNG for network conditions (seeded for determinism).
    rng: ChaCha8Rng,

    /// Global event queue, ordered deterministically.
    event_queue: BTreeMap<EventKey, SimEvent>,

    /// Sequence counter for deterministic ordering.
    sequence: u64,

    /// Current simulation time.
    now: Duration,

    /// Timer registry for cancellation support.
    timers: HashMap<TimerId, EventKey>,

    /// Set by `StepAction::Stop` or [`stop`](Self::stop).
    stopped: bool,

    /// Statistics.
    stats: SimulationStats,
}

impl<A> std::fmt::Debug for SimulationRunner<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationRunner")
            .field("scheduler", &self.scheduler)
            .field("nodes", &self.world.len())
            .field("now", &self.now)
            .field("pending_events", &self.event_queue.len())
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl<A: AgentTransport> SimulationRunner<A> {
    /// Create a runner over `world`.
    ///
    /// Fails when the configured spaces are invalid or the traffic source or
    /// sink is not a node of `world`.
    pub fn new(
        config: EnvConfig,
        world: NodeWorld,
        network_config: NetworkConfig,
        seed: u64,
        agent: A,
    ) -> Result<Self, RunnerError> {
        for (role, index) in [("source", config.traffic.source), ("sink", config.traffic.sink)] {
            if world.node(index).is_none() {
                return Err(RunnerError::UnknownNode {
                    role,
                    index,
                    count: world.len(),
                });
            }
        }

        let scheduler = StepScheduler::new(config)?;
        Ok(Self {
            scheduler,
            world,
            agent,
            network: SimulatedNetwork::new(network_config),
            rng: ChaCha8Rng::seed_from_u64(seed),
            event_queue: BTreeMap::new(),
            sequence: 0,
            now: Duration::ZERO,
            timers: HashMap::new(),
            stopped: false,
            stats: SimulationStats::default(),
        })
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn scheduler(&self) -> &StepScheduler {
        &self.scheduler
    }

    pub fn world(&self) -> &NodeWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut NodeWorld {
        &mut self.world
    }

    pub fn network(&self) -> &SimulatedNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut SimulatedNetwork {
        &mut self.network
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn into_agent(self) -> A {
        self.agent
    }

    /// Whether the scheduler is waiting on the agent to reset or close.
    pub fn episode_over(&self) -> bool {
        self.scheduler.state() == SchedulerState::EpisodeOver
    }

    /// Whether the run was stopped by the agent or by [`stop`](Self::stop).
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Start the step loop: the first tick fires at the current time.
    pub fn start(&mut self) {
        self.schedule_after(Duration::ZERO, StepEvent::Start);
    }

    /// Schedule a scheduler event `delay` after the current time.
    pub fn schedule_after(&mut self, delay: Duration, event: StepEvent) {
        self.schedule_event(0, self.now + delay, SimEvent::Step(event));
    }

    /// Stop processing events. Pending events stay queued.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Run until no events remain or the run is stopped.
    pub fn run(&mut self) -> Result<(), RunnerError> {
        self.run_until(Duration::MAX)
    }

    /// Run until no more events, the run is stopped, or the time limit is
    /// reached.
    ///
    /// Transport faults and entity-set drift are fatal and returned as
    /// errors; the runner should not be resumed afterwards.
    pub fn run_until(&mut self, end_time: Duration) -> Result<(), RunnerError> {
        trace!(
            end_time_secs = end_time.as_secs_f64(),
            "Running simulation step"
        );

        while !self.stopped {
            let Some((&key, _)) = self.event_queue.first_key_value() else {
                break;
            };
            if key.time > end_time {
                debug!(
                    remaining_events = self.event_queue.len(),
                    "Time limit reached"
                );
                break;
            }

            let Some((key, event)) = self.event_queue.pop_first() else {
                break;
            };
            self.now = key.time;

            trace!(time = ?self.now, node = key.node_index, ?event, "Processing event");

            self.stats.events_processed += 1;
            self.stats.events_by_priority[key.priority as usize] += 1;

            match event {
                SimEvent::Transmit(message) => self.transmit(message),
                SimEvent::Step(event) => {
                    match event {
                        StepEvent::StepTimer => {
                            self.timers.remove(&TimerId::Step);
                        }
                        StepEvent::MessageReceived { .. } => self.stats.messages_delivered += 1,
                        _ => {}
                    }

                    self.scheduler.set_time(self.now);
                    let actions = self.scheduler.handle(event);
                    self.stats.actions_generated += actions.len() as u64;

                    for action in actions {
                        self.process_action(action)?;
                    }
                }
            }
        }

        // Always advance time to end_time when the queue drained before it,
        // so polling loops over run_until make progress.
        if !self.stopped && end_time != Duration::MAX && self.now < end_time {
            self.now = end_time;
        }

        trace!(
            events_processed = self.stats.events_processed,
            actions_generated = self.stats.actions_generated,
            final_time = ?self.now,
            "Simulation step complete"
        );
        Ok(())
    }

    /// Execute an action from the scheduler.
    fn process_action(&mut self, action: StepAction) -> Result<(), RunnerError> {
        match action {
            StepAction::SendMessage { message, delay } => {
                if delay.is_zero() {
                    self.transmit(message);
                } else {
                    let time = self.now + delay;
                    self.schedule_event(message.from, time, SimEvent::Transmit(message));
                }
            }

            StepAction::SetTimer { id, duration } => self.set_timer(id, duration),

            StepAction::CancelTimer { id } => self.cancel_timer(id),

            StepAction::NotifyAgent { step } => {
                self.check_cardinality()?;
                let outcome = self.round_trip(step, false)?;
                self.schedule_after(Duration::ZERO, StepEvent::AgentResponded { outcome });
            }

            StepAction::NotifyEpisodeEnd { step } => {
                self.stats.episodes_completed += 1;
                let outcome = self.round_trip(step, true)?;
                self.schedule_after(Duration::ZERO, StepEvent::AgentResponded { outcome });
            }

            StepAction::ResetEnvironment => {
                self.world.restore_initial_positions();
                let current = self.scheduler.episode().id();
                let mut discarded = 0u64;
                let mut unrouted = 0u64;
                self.event_queue.retain(|_, event| {
                    let stale = event.message_episode().is_some_and(|e| e != current);
                    if stale {
                        discarded += 1;
                        if matches!(event, SimEvent::Step(StepEvent::MessageReceived { .. })) {
                            unrouted += 1;
                        }
                    }
                    !stale
                });
                // Discarded deliveries were counted as sent when they were routed.
                self.stats.messages_sent -= unrouted;
                self.stats.messages_dropped_stale += discarded;
                for _ in 0..discarded {
                    meshgym_metrics::record_packet_dropped("stale");
                }
                debug!(
                    episode = current,
                    discarded, "Environment reset, in-flight messages discarded"
                );
            }

            StepAction::Stop => {
                info!(now = ?self.now, "Stopping simulation");
                self.stopped = true;
            }
        }
        Ok(())
    }

    /// One blocking round-trip with the agent.
    fn round_trip(&mut self, step: u64, episode_over: bool) -> Result<AgentOutcome, RunnerError> {
        let started = Instant::now();
        let mut env = self.scheduler.episode_mut().bind(&mut self.world);
        let result = if episode_over {
            self.agent.notify_episode_end(&mut env)
        } else {
            self.agent.notify_step_ready(&mut env)
        };

        let outcome = result.map_err(|e| {
            error!(step, error = %e, "Agent round-trip failed");
            RunnerError::from(e)
        })?;

        let elapsed = started.elapsed().as_secs_f64();
        meshgym_metrics::record_agent_round_trip(elapsed);
        self.stats.agent_round_trips += 1;
        trace!(step, ?outcome, elapsed_secs = elapsed, "Agent round-trip complete");
        Ok(outcome)
    }

    /// The controllable entity set must still match the advertised spaces.
    fn check_cardinality(&self) -> Result<(), RunnerError> {
        let builder = self.scheduler.episode().observation_builder();
        let expected = builder.space().num_elements();
        let actual = builder.select(&self.world).len();
        if actual != expected {
            error!(expected, actual, "Controllable entity set drifted");
            return Err(SpaceMismatch { expected, actual }.into());
        }
        Ok(())
    }

    /// Route a message over the current node positions.
    fn transmit(&mut self, message: Message) {
        if message.episode != self.scheduler.episode().id() {
            self.stats.messages_dropped_stale += 1;
            meshgym_metrics::record_packet_dropped("stale");
            return;
        }

        let positions = self.world.positions();
        match self
            .network
            .should_deliver(message.from, message.to, &positions, &mut self.rng)
        {
            Ok(latency) => {
                let to = message.to;
                let episode = message.episode;
                self.schedule_event(
                    to,
                    self.now + latency,
                    SimEvent::Step(StepEvent::MessageReceived { episode }),
                );
                self.stats.messages_sent += 1;
            }
            Err(reason) => {
                match reason {
                    DropReason::Unreachable => self.stats.messages_dropped_unreachable += 1,
                    DropReason::Loss => self.stats.messages_dropped_loss += 1,
                }
                meshgym_metrics::record_packet_dropped(reason.as_str());
                trace!(from = message.from, to = message.to, %reason, "Message dropped");
            }
        }
    }

    /// Schedule an event.
    fn schedule_event(&mut self, node: NodeIndex, time: Duration, event: SimEvent) -> EventKey {
        self.sequence += 1;
        let key = EventKey::new(time, &event, node, self.sequence);
        self.event_queue.insert(key, event);
        key
    }
}

impl<A: AgentTransport> TimerScheduler for SimulationRunner<A> {
    fn set_timer(&mut self, id: TimerId, duration: Duration) {
        self.cancel_timer(id);
        let event = match id {
            TimerId::Step => StepEvent::StepTimer,
        };
        let key = self.schedule_event(0, self.now + duration, SimEvent::Step(event));
        self.timers.insert(id, key);
        self.stats.timers_set += 1;
    }

    fn cancel_timer(&mut self, id: TimerId) {
        if let Some(key) = self.timers.remove(&id) {
            if self.event_queue.remove(&key).is_some() {
                self.stats.timers_cancelled += 1;
            }
        }
    }
}
