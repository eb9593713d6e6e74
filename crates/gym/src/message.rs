//! Request and response messages exchanged with the agent.

use meshgym_types::{BoxContainer, SpaceDescriptor};
use serde::{Deserialize, Serialize};

/// A request sent by the agent while a step is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GymRequest {
    ObservationSpace,
    ActionSpace,
    Observation,
    RewardAndDone,
    ExtraInfo,
    /// Apply an action. Ends the round-trip when accepted.
    ExecuteAction(BoxContainer),
    /// Start a new episode. Ends the round-trip.
    Reset,
    /// Stop the run. Ends the round-trip.
    Close,
}

impl GymRequest {
    /// Get the request type name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            GymRequest::ObservationSpace => "ObservationSpace",
            GymRequest::ActionSpace => "ActionSpace",
            GymRequest::Observation => "Observation",
            GymRequest::RewardAndDone => "RewardAndDone",
            GymRequest::ExtraInfo => "ExtraInfo",
            GymRequest::ExecuteAction(_) => "ExecuteAction",
            GymRequest::Reset => "Reset",
            GymRequest::Close => "Close",
        }
    }
}

/// The environment's answer to a [`GymRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GymResponse {
    Space(SpaceDescriptor),
    Observation(BoxContainer),
    RewardAndDone {
        reward: f64,
        done: bool,
    },
    ExtraInfo(String),
    ActionResult {
        accepted: bool,
        /// Why the action was refused.
        reason: Option<String>,
    },
    /// Acknowledges `Reset` and `Close`.
    Ack,
    /// The request could not be served.
    Error(String),
}
