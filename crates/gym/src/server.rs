//! Environment side of the agent connection.
//!
//! [`TcpAgentTransport`] listens for a single agent and serves its requests
//! while a step is pending. The connection is accepted lazily on the first
//! notification, so the environment can be started before the agent.

use crate::framing::{self, FrameError, MAX_FRAME_SIZE};
use crate::message::{GymRequest, GymResponse};
use meshgym_core::{AgentOutcome, AgentTransport, EnvError, GymEnv, TransportError};
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// How often a bounded accept polls the listener.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Agent listener configuration.
#[derive(Debug, Clone)]
pub struct AgentServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,
    /// How long the first notification waits for an agent to connect.
    /// `None` waits forever.
    pub accept_timeout: Option<Duration>,
    /// How long to wait for each agent request once connected. `None`
    /// waits forever.
    pub response_timeout: Option<Duration>,
}

impl Default for AgentServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5555)),
            accept_timeout: Some(Duration::from_secs(60)),
            response_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl AgentServerConfig {
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_accept_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.accept_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }
}

/// [`AgentTransport`] over a single long-lived TCP connection.
#[derive(Debug)]
pub struct TcpAgentTransport {
    listener: TcpListener,
    stream: Option<TcpStream>,
    config: AgentServerConfig,
}

impl TcpAgentTransport {
    /// Bind the listener. The agent is accepted on the first notification.
    pub fn bind(config: AgentServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)?;
        info!(addr = %listener.local_addr()?, "Waiting for agent");
        Ok(Self {
            listener,
            stream: None,
            config,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Whether an agent is connected.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn connection(&mut self) -> Result<&mut TcpStream, TransportError> {
        if self.stream.is_none() {
            let (stream, peer) = self.accept()?;
            stream.set_read_timeout(self.config.response_timeout)?;
            stream.set_nodelay(true)?;
            info!(%peer, "Agent connected");
            self.stream = Some(stream);
        }
        self.stream.as_mut().ok_or(TransportError::Disconnected)
    }

    /// Wait for the agent, giving up after `accept_timeout`.
    fn accept(&self) -> Result<(TcpStream, SocketAddr), TransportError> {
        let Some(timeout) = self.config.accept_timeout else {
            return Ok(self.listener.accept()?);
        };

        let deadline = Instant::now() + timeout;
        self.listener.set_nonblocking(true)?;
        let accepted = loop {
            match self.listener.accept() {
                Ok(conn) => break Ok(conn),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        warn!(?timeout, "No agent connected");
                        break Err(TransportError::Timeout(timeout));
                    }
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => break Err(e.into()),
            }
        };
        self.listener.set_nonblocking(false)?;

        let (stream, peer) = accepted?;
        stream.set_nonblocking(false)?;
        Ok((stream, peer))
    }

    /// Serve requests until the agent ends the round-trip.
    fn serve(&mut self, env: &mut dyn GymEnv) -> Result<AgentOutcome, TransportError> {
        let timeout = self.config.response_timeout;
        let stream = self.connection()?;

        loop {
            let request: GymRequest = match framing::read_frame(stream, MAX_FRAME_SIZE) {
                Ok(request) => request,
                Err(e) => return Err(read_error(e, timeout)),
            };
            trace!(request = request.type_name(), "Agent request");

            let (response, outcome) = match request {
                GymRequest::ObservationSpace => {
                    (GymResponse::Space(env.observation_space().clone()), None)
                }
                GymRequest::ActionSpace => (GymResponse::Space(env.action_space().clone()), None),
                GymRequest::Observation => match env.observation() {
                    Ok(observation) => (GymResponse::Observation(observation), None),
                    Err(e) => {
                        // Tell the agent before failing the run.
                        let _ = framing::write_frame(stream, &GymResponse::Error(e.to_string()));
                        return Err(e.into());
                    }
                },
                GymRequest::RewardAndDone => {
                    let status = env.reward_and_done();
                    let response = GymResponse::RewardAndDone {
                        reward: status.reward,
                        done: status.done,
                    };
                    (response, None)
                }
                GymRequest::ExtraInfo => (GymResponse::ExtraInfo(env.extra_info()), None),
                GymRequest::ExecuteAction(action) => match env.execute_action(&action) {
                    Ok(()) => (
                        GymResponse::ActionResult {
                            accepted: true,
                            reason: None,
                        },
                        Some(AgentOutcome::Continue),
                    ),
                    Err(e @ EnvError::SpaceMismatch(_)) => {
                        let _ = framing::write_frame(stream, &GymResponse::Error(e.to_string()));
                        return Err(e.into());
                    }
                    Err(e) => (
                        GymResponse::ActionResult {
                            accepted: false,
                            reason: Some(e.to_string()),
                        },
                        None,
                    ),
                },
                GymRequest::Reset => (GymResponse::Ack, Some(AgentOutcome::Reset)),
                GymRequest::Close => (GymResponse::Ack, Some(AgentOutcome::Close)),
            };

            framing::write_frame(stream, &response).map_err(write_error)?;

            if let Some(outcome) = outcome {
                debug!(?outcome, "Round-trip complete");
                return Ok(outcome);
            }
        }
    }
}

impl AgentTransport for TcpAgentTransport {
    fn notify_step_ready(&mut self, env: &mut dyn GymEnv) -> Result<AgentOutcome, TransportError> {
        self.serve(env)
    }

    fn notify_episode_end(
        &mut self,
        env: &mut dyn GymEnv,
    ) -> Result<AgentOutcome, TransportError> {
        // A finished episode refuses every action, so only Reset or Close
        // can end this round-trip.
        self.serve(env)
    }
}

fn read_error(err: FrameError, timeout: Option<Duration>) -> TransportError {
    if err.is_eof() || matches!(&err, FrameError::Io(e) if is_disconnect(e)) {
        warn!("Agent closed the connection");
        TransportError::Disconnected
    } else if err.is_timeout() {
        warn!(?timeout, "Agent response timed out");
        TransportError::Timeout(timeout.unwrap_or_default())
    } else {
        match err {
            FrameError::Io(e) => TransportError::Io(e),
            other => TransportError::Protocol(other.to_string()),
        }
    }
}

fn write_error(err: FrameError) -> TransportError {
    match err {
        FrameError::Io(e) if is_disconnect(&e) => TransportError::Disconnected,
        FrameError::Io(e) => TransportError::Io(e),
        other => TransportError::Protocol(other.to_string()),
    }
}

fn is_disconnect(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}
