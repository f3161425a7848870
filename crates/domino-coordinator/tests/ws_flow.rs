//! End-to-end tests over a live coordinator.
//!
//! Each test binds the full router on an ephemeral port and drives it the
//! way a real agent (tokio-tungstenite) and a real admin caller (reqwest)
//! would.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use domino_coordinator::{create_router, CoordinatorConfig, CoordinatorState};
use domino_core::{AgentIdentity, DeploymentStatus, LifecycleCommand, SourceType};
use domino_proto::{
    AnnouncementPayload, ConfirmationPayload, Envelope, FailurePayload, LifecyclePayload,
    MessageType, ResultPayload,
};

/// Shared API key every test agent presents.
const API_KEY: &str = "fleet-test-key";

/// Upper bound on any single receive in these tests.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Start a coordinator that knows agent `k1@h1` (docker) on an ephemeral
/// port, returning its state and bound address.
async fn start_coordinator(operation_timeout_seconds: u64) -> (Arc<CoordinatorState>, String) {
    let config = CoordinatorConfig {
        api_key_hash: CoordinatorConfig::hash_api_key(API_KEY),
        operation_timeout_seconds,
        known_agents: vec![AgentIdentity::new("k1", "h1", SourceType::Docker)],
        ..CoordinatorConfig::default()
    };
    let state = Arc::new(CoordinatorState::new(config));
    let app = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, addr)
}

/// Open the agent socket with handshake headers.
async fn connect_agent(addr: &str, api_key: &str) -> Result<Socket, WsError> {
    let mut request = format!("ws://{addr}/agent/socket")
        .into_client_request()
        .unwrap();
    request
        .headers_mut()
        .insert("x-api-key", HeaderValue::from_str(api_key).unwrap());
    request.headers_mut().insert(
        "x-agent-id",
        HeaderValue::from_static("domino-agent://h1/docker/k1"),
    );
    connect_async(request).await.map(|(socket, _)| socket)
}

async fn send(socket: &mut Socket, envelope: &Envelope) {
    socket
        .send(Message::Text(envelope.to_frame().unwrap()))
        .await
        .unwrap();
}

async fn recv_envelope(socket: &mut Socket) -> Envelope {
    loop {
        let message = timeout(RECV_TIMEOUT, socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket ended unexpectedly")
            .unwrap();
        if let Message::Text(frame) = message {
            return Envelope::from_frame(&frame).unwrap();
        }
    }
}

/// Announce as the known agent and consume the confirmation.
async fn announce(socket: &mut Socket) -> ConfirmationPayload {
    let announcement = Envelope::new(
        MessageType::Announcement,
        &AnnouncementPayload {
            agent_key: "k1".to_string(),
            host_id: "h1".to_string(),
            source_type: SourceType::Docker,
        },
    )
    .unwrap();
    send(socket, &announcement).await;

    let reply = recv_envelope(socket).await;
    assert_eq!(reply.message_type, MessageType::Confirmation);
    assert_eq!(reply.message_id, announcement.message_id);
    reply.parse_payload().unwrap()
}

#[tokio::test]
async fn known_agent_announcement_is_confirmed() {
    let (state, addr) = start_coordinator(5).await;
    let mut socket = connect_agent(&addr, API_KEY).await.unwrap();

    let confirmation = announce(&mut socket).await;
    assert!(confirmation
        .message
        .contains("domino-agent://h1/docker/k1"));
    assert_eq!(state.registry.connected_count(), 1);
}

#[tokio::test]
async fn wrong_api_key_fails_the_handshake() {
    let (_state, addr) = start_coordinator(5).await;

    let err = connect_agent(&addr, "not-the-key").await.unwrap_err();
    match err {
        WsError::Http(response) => assert_eq!(response.status(), 401),
        other => panic!("expected HTTP rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_identity_is_disconnected() {
    let (state, addr) = start_coordinator(5).await;
    let mut socket = connect_agent(&addr, API_KEY).await.unwrap();

    let announcement = Envelope::new(
        MessageType::Announcement,
        &AnnouncementPayload {
            agent_key: "intruder".to_string(),
            host_id: "h1".to_string(),
            source_type: SourceType::Docker,
        },
    )
    .unwrap();
    send(&mut socket, &announcement).await;

    // No confirmation; the next event is the close (or the stream ending).
    match timeout(RECV_TIMEOUT, socket.next()).await.unwrap() {
        None | Some(Ok(Message::Close(_))) | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("expected close, got {other:?}"),
    }
    assert_eq!(state.registry.connected_count(), 0);
}

#[tokio::test]
async fn frames_queued_behind_a_rejection_are_not_dispatched() {
    let (state, addr) = start_coordinator(30).await;
    let mut socket = connect_agent(&addr, API_KEY).await.unwrap();

    // A pending operation the second frame would resolve if it were ever
    // dispatched.
    let pending = state.operations.register(
        "op-sentinel",
        LifecycleCommand::Start,
        domino_coordinator::ConnectionId::generate(),
    );

    let announcement = Envelope::new(
        MessageType::Announcement,
        &AnnouncementPayload {
            agent_key: "intruder".to_string(),
            host_id: "h1".to_string(),
            source_type: SourceType::Docker,
        },
    )
    .unwrap();
    let failure = Envelope {
        message_id: "op-sentinel".to_string(),
        message_type: MessageType::Failure,
        payload: Some(serde_json::json!({"message": "smuggled"})),
    };

    // Both frames are queued back-to-back before the rejection lands.
    send(&mut socket, &announcement).await;
    send(&mut socket, &failure).await;

    // Wait for the rejection to close the connection.
    loop {
        match timeout(RECV_TIMEOUT, socket.next()).await.unwrap() {
            None | Some(Ok(Message::Close(_))) | Some(Err(_)) => break,
            Some(Ok(Message::Text(frame))) => panic!("unexpected frame {frame}"),
            Some(Ok(_)) => {}
        }
    }

    // The smuggled failure never reached its handler.
    assert_eq!(state.operations.pending_count(), 1);
    state.operations.discard("op-sentinel");
    drop(pending);
}

#[tokio::test]
async fn lifecycle_command_round_trips_through_the_agent() {
    let (state, addr) = start_coordinator(5).await;
    let mut socket = connect_agent(&addr, API_KEY).await.unwrap();
    announce(&mut socket).await;

    let caller = Arc::clone(&state);
    let command = tokio::spawn(async move {
        caller
            .fleet
            .send_command("k1", LifecycleCommand::Start, "app", None)
            .await
    });

    let envelope = recv_envelope(&mut socket).await;
    assert_eq!(envelope.message_type, MessageType::Lifecycle);
    let payload: LifecyclePayload = envelope.parse_payload().unwrap();
    assert_eq!(payload.command, LifecycleCommand::Start);
    assert_eq!(payload.deployment, "app");

    let reply = envelope
        .reply(
            MessageType::Result,
            &ResultPayload {
                status: DeploymentStatus::HealthCheckOk,
                deploy_operation: LifecycleCommand::Start,
                deployed_version: None,
            },
        )
        .unwrap();
    send(&mut socket, &reply).await;

    let result = command.await.unwrap().unwrap();
    assert_eq!(result.status, DeploymentStatus::HealthCheckOk);
    assert_eq!(result.deploy_operation, LifecycleCommand::Start);
}

#[tokio::test]
async fn failure_reply_resolves_the_command() {
    let (state, addr) = start_coordinator(5).await;
    let mut socket = connect_agent(&addr, API_KEY).await.unwrap();
    announce(&mut socket).await;

    let caller = Arc::clone(&state);
    let command = tokio::spawn(async move {
        caller
            .fleet
            .send_command("k1", LifecycleCommand::Deploy, "app", Some("1.0.0".into()))
            .await
    });

    let envelope = recv_envelope(&mut socket).await;
    let reply = envelope
        .reply(
            MessageType::Failure,
            &FailurePayload {
                message: "image pull failed".to_string(),
            },
        )
        .unwrap();
    send(&mut socket, &reply).await;

    let result = command.await.unwrap().unwrap();
    assert_eq!(result.status, DeploymentStatus::Failure);
    assert_eq!(result.message.as_deref(), Some("image pull failed"));
}

#[tokio::test]
async fn silent_agent_resolves_with_timeout() {
    let (state, addr) = start_coordinator(1).await;
    let mut socket = connect_agent(&addr, API_KEY).await.unwrap();
    announce(&mut socket).await;

    let result = state
        .fleet
        .send_command("k1", LifecycleCommand::Restart, "app", None)
        .await
        .unwrap();
    assert_eq!(result.status, DeploymentStatus::Timeout);
    assert_eq!(state.operations.pending_count(), 0);

    // A late result for the timed-out operation must be a no-op.
    let envelope = recv_envelope(&mut socket).await;
    let late = envelope
        .reply(
            MessageType::Result,
            &ResultPayload {
                status: DeploymentStatus::Deployed,
                deploy_operation: LifecycleCommand::Restart,
                deployed_version: None,
            },
        )
        .unwrap();
    send(&mut socket, &late).await;
}

#[tokio::test]
async fn disconnect_fails_the_pending_operation() {
    let (state, addr) = start_coordinator(30).await;
    let mut socket = connect_agent(&addr, API_KEY).await.unwrap();
    announce(&mut socket).await;

    let caller = Arc::clone(&state);
    let command = tokio::spawn(async move {
        caller
            .fleet
            .send_command("k1", LifecycleCommand::Stop, "app", None)
            .await
    });

    // Take the command, then drop the socket instead of answering.
    let envelope = recv_envelope(&mut socket).await;
    assert_eq!(envelope.message_type, MessageType::Lifecycle);
    drop(socket);

    let result = timeout(RECV_TIMEOUT, command).await.unwrap().unwrap().unwrap();
    assert_eq!(result.status, DeploymentStatus::Failure);
    assert!(result
        .message
        .as_deref()
        .unwrap_or_default()
        .contains("connection closed"));
}

#[tokio::test]
async fn reconnecting_agent_overwrites_its_binding() {
    let (state, addr) = start_coordinator(5).await;

    let mut first = connect_agent(&addr, API_KEY).await.unwrap();
    announce(&mut first).await;
    let mut second = connect_agent(&addr, API_KEY).await.unwrap();
    announce(&mut second).await;

    let caller = Arc::clone(&state);
    let command = tokio::spawn(async move {
        caller
            .fleet
            .send_command("k1", LifecycleCommand::Start, "app", None)
            .await
    });

    // The command must arrive on the newest connection.
    let envelope = recv_envelope(&mut second).await;
    assert_eq!(envelope.message_type, MessageType::Lifecycle);

    let reply = envelope
        .reply(
            MessageType::Result,
            &ResultPayload {
                status: DeploymentStatus::Deployed,
                deploy_operation: LifecycleCommand::Start,
                deployed_version: None,
            },
        )
        .unwrap();
    send(&mut second, &reply).await;

    let result = command.await.unwrap().unwrap();
    assert_eq!(result.status, DeploymentStatus::Deployed);
}

#[tokio::test]
async fn admin_api_reflects_fleet_state() {
    let (_state, addr) = start_coordinator(5).await;
    let client = reqwest::Client::new();

    let health = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);

    // Disconnected at first.
    let page: serde_json::Value = client
        .get(format!("http://{addr}/v1/agents"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["totalItems"], 1);
    assert_eq!(page["items"][0]["agentKey"], "k1");
    assert_eq!(page["items"][0]["connected"], false);

    // Connected once the agent announces.
    let mut socket = connect_agent(&addr, API_KEY).await.unwrap();
    announce(&mut socket).await;

    let page: serde_json::Value = client
        .get(format!("http://{addr}/v1/agents"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["items"][0]["connected"], true);
    assert_eq!(
        page["items"][0]["agentID"],
        "domino-agent://h1/docker/k1"
    );
}

#[tokio::test]
async fn admin_command_to_disconnected_agent_is_unavailable() {
    let (_state, addr) = start_coordinator(5).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/v1/agents/k1/commands"))
        .json(&serde_json::json!({"command": "START", "deployment": "app"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("domino-agent://h1/docker/k1"));
}
