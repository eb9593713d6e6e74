//! Core of the meshgym environment-agent loop.
//!
//! This crate provides the step-scheduling state machine and the four data
//! contracts it drives:
//!
//! - [`ObservationBuilder`]: packs one scalar attribute of each controllable
//!   entity into a fixed-shape container
//! - [`ActionExecutor`]: validates an incoming container and writes it back
//! - [`RewardComputer`]: sticky delivery-ratio reward from [`Counters`]
//! - [`TerminationPolicy`]: fixed step budget per episode
//!
//! # Architecture
//!
//! ```text
//! StepEvent → StepScheduler::handle() → Vec<StepAction> → runner executes
//! ```
//!
//! The scheduler is:
//! - **Synchronous**: No async, no .await
//! - **Deterministic**: Same state + event = same actions
//! - **Pure-ish**: Mutates self, but performs no I/O
//!
//! The runner (the discrete-event engine) owns the clock, the entity
//! registry and the agent transport. It:
//! 1. Delivers [`StepEvent`]s (timer fires, message arrivals, agent replies)
//! 2. Executes the returned [`StepAction`]s (send messages, set timers)
//! 3. For [`StepAction::NotifyAgent`], binds the scheduler's [`Episode`] to
//!    its registry and hands the resulting [`GymEnv`] to the
//!    [`AgentTransport`] for one blocking round-trip
//! 4. Feeds the [`AgentOutcome`] back as [`StepEvent::AgentResponded`]

mod action;
mod config;
mod counters;
mod entity;
mod env;
mod episode;
mod event;
mod executor;
mod observation;
mod reward;
mod scheduler;
mod termination;
mod timer;
mod traffic;

pub use action::StepAction;
pub use config::{EnvConfig, TrafficConfig};
pub use counters::Counters;
pub use entity::{select_partition, Entity, EntityRegistry};
pub use env::{AgentOutcome, AgentTransport, EnvError, GymEnv, StepStatus, TransportError};
pub use episode::{Episode, EpisodeEnv};
pub use event::{EventPriority, StepEvent};
pub use executor::{ActionExecutor, ValidationError};
pub use observation::{ObservationBuilder, SpaceMismatch};
pub use reward::RewardComputer;
pub use scheduler::{SchedulerState, StepScheduler};
pub use termination::TerminationPolicy;
pub use timer::{TimerId, TimerScheduler};
pub use traffic::{Message, Outbox, TrafficGenerator, Transport};
