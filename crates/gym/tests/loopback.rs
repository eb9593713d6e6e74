//! Environment and agent talking over a loopback TCP connection.

use meshgym_core::{EnvConfig, TransportError};
use meshgym_gym::{AgentServerConfig, ClientError, GymClient, TcpAgentTransport};
use meshgym_simulation::{RunnerError, SimulationStats};
use meshgym_test_helpers::fixtures::runner_with;
use meshgym_types::{BoxContainer, BoxData};
use std::net::SocketAddr;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing_test::traced_test;

type EnvHandle = JoinHandle<Result<SimulationStats, RunnerError>>;

/// Bind on an ephemeral port and run the default scenario on a thread.
fn spawn_env(config: EnvConfig, timeout: Duration) -> (SocketAddr, EnvHandle) {
    let transport = TcpAgentTransport::bind(
        AgentServerConfig::default()
            .with_bind_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
            .with_response_timeout(Some(timeout)),
    )
    .unwrap();
    let addr = transport.local_addr().unwrap();

    let handle = thread::spawn(move || -> Result<SimulationStats, RunnerError> {
        let mut runner = runner_with(config, transport);
        runner.start();
        runner.run()?;
        Ok(runner.stats().clone())
    });
    (addr, handle)
}

fn relays_moved() -> BoxContainer {
    BoxContainer::vector(BoxData::U32(vec![450, 460, 470, 480, 490, 500]))
}

fn relays_initial() -> BoxData {
    BoxData::U32(vec![600, 616, 632, 648, 664, 680])
}

#[traced_test]
#[test]
fn test_agent_drives_episode_over_tcp() {
    let (addr, env) = spawn_env(
        EnvConfig::default().with_episode_steps(3),
        Duration::from_secs(10),
    );
    let mut client = GymClient::connect(addr).unwrap();

    let space = client.observation_space().unwrap();
    assert_eq!(space.to_string(), "Box(low=400, high=800, shape=[6], dtype=uint32)");
    assert_eq!(client.action_space().unwrap(), space);

    let first = client.reset().unwrap();
    assert_eq!(first.shape(), &[6]);
    assert_eq!(first.data(), &relays_initial());
    assert_eq!(client.extra_info().unwrap(), "step=1 sent=6 received=0");

    // The first burst was routed before the relays moved; later bursts
    // cannot reach the sink.
    let second = client.step(&relays_moved()).unwrap();
    assert_eq!(second.observation, relays_moved());
    assert_eq!(second.reward, 0.5);
    assert!(!second.done);
    assert_eq!(second.info, "step=2 sent=12 received=6");

    let third = client.step(&relays_moved()).unwrap();
    assert!(third.done);
    assert_eq!(third.reward, 6.0 / 18.0);

    // A new episode restores the relays and clears the counters.
    let restarted = client.reset().unwrap();
    assert_eq!(restarted.data(), &relays_initial());
    assert_eq!(client.reward_and_done().unwrap(), (0.0, false));

    let short = BoxContainer::vector(BoxData::U32(vec![450, 460]));
    assert!(matches!(
        client.execute_action(&short),
        Err(ClientError::ActionRejected(_))
    ));
    client.close().unwrap();

    let stats = env.join().unwrap().unwrap();
    assert_eq!(stats.agent_round_trips, 4);
    assert_eq!(stats.episodes_completed, 0);
}

#[test]
fn test_finished_episode_refuses_actions_over_tcp() {
    let (addr, env) = spawn_env(
        EnvConfig::default().with_episode_steps(1),
        Duration::from_secs(10),
    );
    let mut client = GymClient::connect(addr).unwrap();

    client.reset().unwrap();
    assert_eq!(client.reward_and_done().unwrap(), (0.0, true));
    // The final step still takes an action; the episode ends after it.
    client.execute_action(&relays_moved()).unwrap();

    match client.execute_action(&relays_moved()) {
        Err(ClientError::ActionRejected(reason)) => assert!(reason.contains("episode over")),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(client.reward_and_done().unwrap(), (0.0, true));
    client.close().unwrap();

    let stats = env.join().unwrap().unwrap();
    assert_eq!(stats.episodes_completed, 1);
    assert_eq!(stats.agent_round_trips, 2);
}

#[test]
fn test_agent_disconnect_is_fatal() {
    let (addr, env) = spawn_env(EnvConfig::default(), Duration::from_secs(10));
    drop(GymClient::connect(addr).unwrap());

    let result = env.join().unwrap();
    assert!(matches!(
        result,
        Err(RunnerError::Transport(TransportError::Disconnected))
    ));
}

#[test]
fn test_absent_agent_times_out() {
    let timeout = Duration::from_millis(200);
    let transport = TcpAgentTransport::bind(
        AgentServerConfig::default()
            .with_bind_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
            .with_accept_timeout(Some(timeout)),
    )
    .unwrap();

    let mut runner = runner_with(EnvConfig::default(), transport);
    runner.start();
    let err = runner.run().unwrap_err();
    assert!(matches!(
        err,
        RunnerError::Transport(TransportError::Timeout(t)) if t == timeout
    ));
    assert!(!runner.agent().is_connected());
    assert_eq!(runner.stats().agent_round_trips, 0);
}

#[test]
fn test_silent_agent_times_out() {
    let timeout = Duration::from_millis(200);
    let (addr, env) = spawn_env(EnvConfig::default(), timeout);
    let client = GymClient::connect(addr).unwrap();

    let result = env.join().unwrap();
    assert!(matches!(
        result,
        Err(RunnerError::Transport(TransportError::Timeout(t))) if t == timeout
    ));
    drop(client);
}
