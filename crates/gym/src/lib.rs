//! TCP transport between the meshgym environment and an external agent.
//!
//! The environment side, [`TcpAgentTransport`], implements
//! [`meshgym_core::AgentTransport`]: each step notification serves the
//! agent's requests until the agent submits an accepted action, resets, or
//! closes. The agent side, [`GymClient`], wraps those requests in a
//! gym-style API.
//!
//! # Wire format
//!
//! ```text
//! [u32 big-endian length][LZ4 block with prepended size]
//!                         └── bincode GymRequest / GymResponse
//! ```
//!
//! Frames larger than [`MAX_FRAME_SIZE`] are rejected.
//!
//! # Example
//!
//! ```ignore
//! use meshgym_gym::GymClient;
//!
//! let mut client = GymClient::connect("127.0.0.1:5555")?;
//! let mut observation = client.reset()?;
//! loop {
//!     let result = client.step(&observation)?;
//!     if result.done {
//!         break;
//!     }
//!     observation = result.observation;
//! }
//! client.close()?;
//! ```

mod client;
mod framing;
mod message;
mod server;
pub mod wire;

pub use client::{ClientError, GymClient, StepResult};
pub use framing::{FrameError, MAX_FRAME_SIZE};
pub use message::{GymRequest, GymResponse};
pub use server::{AgentServerConfig, TcpAgentTransport};
