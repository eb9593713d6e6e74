//! Agent side of the connection.

use crate::framing::{self, FrameError, MAX_FRAME_SIZE};
use crate::message::{GymRequest, GymResponse};
use meshgym_types::{BoxContainer, SpaceDescriptor};
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from [`GymClient`] calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("environment closed the connection")]
    Disconnected,

    #[error("environment error: {0}")]
    Environment(String),

    #[error("action rejected: {0}")]
    ActionRejected(String),

    #[error("expected {expected} response, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: String,
    },
}

/// State after an accepted action, read at the next step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: BoxContainer,
    pub reward: f64,
    pub done: bool,
    pub info: String,
}

/// Blocking client for an environment served by
/// [`TcpAgentTransport`](crate::TcpAgentTransport).
///
/// Every call blocks until the environment has a step pending, so the agent
/// never observes a half-simulated step.
#[derive(Debug)]
pub struct GymClient {
    stream: TcpStream,
    /// Whether an episode has been started by `reset`.
    started: bool,
}

impl GymClient {
    /// Connect to the environment.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        info!(peer = %stream.peer_addr()?, "Connected to environment");
        Ok(Self {
            stream,
            started: false,
        })
    }

    /// Connect, retrying while the environment is not yet listening.
    pub fn connect_with_retry<A: ToSocketAddrs + Copy>(
        addr: A,
        attempts: u32,
        delay: Duration,
    ) -> Result<Self, ClientError> {
        let mut attempt = 1;
        loop {
            match Self::connect(addr) {
                Ok(client) => return Ok(client),
                Err(ClientError::Io(e)) if attempt < attempts => {
                    debug!(attempt, error = %e, "Environment not reachable yet");
                    attempt += 1;
                    thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn observation_space(&mut self) -> Result<SpaceDescriptor, ClientError> {
        match self.request(&GymRequest::ObservationSpace)? {
            GymResponse::Space(space) => Ok(space),
            other => Err(unexpected("Space", other)),
        }
    }

    pub fn action_space(&mut self) -> Result<SpaceDescriptor, ClientError> {
        match self.request(&GymRequest::ActionSpace)? {
            GymResponse::Space(space) => Ok(space),
            other => Err(unexpected("Space", other)),
        }
    }

    pub fn observation(&mut self) -> Result<BoxContainer, ClientError> {
        match self.request(&GymRequest::Observation)? {
            GymResponse::Observation(observation) => Ok(observation),
            other => Err(unexpected("Observation", other)),
        }
    }

    pub fn reward_and_done(&mut self) -> Result<(f64, bool), ClientError> {
        match self.request(&GymRequest::RewardAndDone)? {
            GymResponse::RewardAndDone { reward, done } => Ok((reward, done)),
            other => Err(unexpected("RewardAndDone", other)),
        }
    }

    pub fn extra_info(&mut self) -> Result<String, ClientError> {
        match self.request(&GymRequest::ExtraInfo)? {
            GymResponse::ExtraInfo(info) => Ok(info),
            other => Err(unexpected("ExtraInfo", other)),
        }
    }

    /// Submit an action. On acceptance the environment resumes simulation.
    pub fn execute_action(&mut self, action: &BoxContainer) -> Result<(), ClientError> {
        match self.request(&GymRequest::ExecuteAction(action.clone()))? {
            GymResponse::ActionResult { accepted: true, .. } => Ok(()),
            GymResponse::ActionResult {
                accepted: false,
                reason,
            } => Err(ClientError::ActionRejected(reason.unwrap_or_default())),
            other => Err(unexpected("ActionResult", other)),
        }
    }

    /// Apply `action` and return the state of the following step.
    pub fn step(&mut self, action: &BoxContainer) -> Result<StepResult, ClientError> {
        self.execute_action(action)?;
        let observation = self.observation()?;
        let (reward, done) = self.reward_and_done()?;
        let info = self.extra_info()?;
        Ok(StepResult {
            observation,
            reward,
            done,
            info,
        })
    }

    /// Start an episode and return its first observation.
    ///
    /// The environment starts its first episode on its own, so the first
    /// call only reads the initial observation.
    pub fn reset(&mut self) -> Result<BoxContainer, ClientError> {
        if self.started {
            match self.request(&GymRequest::Reset)? {
                GymResponse::Ack => {}
                other => return Err(unexpected("Ack", other)),
            }
        }
        self.started = true;
        self.observation()
    }

    /// Stop the environment.
    pub fn close(mut self) -> Result<(), ClientError> {
        match self.request(&GymRequest::Close)? {
            GymResponse::Ack => {
                info!("Environment closed");
                Ok(())
            }
            other => Err(unexpected("Ack", other)),
        }
    }

    fn request(&mut self, request: &GymRequest) -> Result<GymResponse, ClientError> {
        framing::write_frame(&mut self.stream, request)?;
        match framing::read_frame(&mut self.stream, MAX_FRAME_SIZE) {
            Ok(GymResponse::Error(message)) => Err(ClientError::Environment(message)),
            Ok(response) => Ok(response),
            Err(e) if e.is_eof() => Err(ClientError::Disconnected),
            Err(e) => Err(e.into()),
        }
    }
}

fn unexpected(expected: &'static str, actual: GymResponse) -> ClientError {
    ClientError::UnexpectedResponse {
        expected,
        actual: format!("{actual:?}"),
    }
}
