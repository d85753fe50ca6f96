use crate::listener::{CLOSE_INTERNAL_ERROR, CLOSE_NORMAL, CLOSE_POLICY_VIOLATION};
use crate::supervisor::{SEND_BUFFER_SIZE, WsSupervisor, should_dial_back};
use crate::Outgoing;

use mcb_config::ServerProfile;
use mcb_core::{BridgeError, ConnectionState, InboundEvent, ReconnectPolicy};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

fn profile(name: &str, ws_enabled: bool) -> ServerProfile {
    ServerProfile {
        server_name: name.to_string(),
        rcon_enabled: false,
        rcon_host: String::new(),
        rcon_port: 25575,
        rcon_password: String::new(),
        rcon_max_attempts: 3,
        ws_enabled,
        ws_url: String::from("ws://127.0.0.1:8080/minecraft/ws"),
        ws_password: None,
        ws_max_attempts: 3,
    }
}

fn supervisor(profiles: Vec<ServerProfile>) -> (Arc<WsSupervisor>, mpsc::Receiver<InboundEvent>) {
    let (events, inbox) = mpsc::channel(16);
    let supervisor = WsSupervisor::new(profiles, ReconnectPolicy::default(), None, events, false);
    (supervisor, inbox)
}

#[tokio::test]
async fn given_unknown_server_when_force_reconnect_then_false_without_state() {
    let (supervisor, _inbox) = supervisor(vec![]);

    assert!(!supervisor.force_reconnect("phantom").await);
    assert!(supervisor.status_snapshot().await.is_empty());
}

#[tokio::test]
async fn given_disabled_transport_when_force_reconnect_then_false_without_attempt() {
    let (supervisor, _inbox) = supervisor(vec![profile("survival", false)]);

    assert!(!supervisor.force_reconnect("survival").await);
    assert!(!supervisor.is_connected("survival").await);
}

#[tokio::test]
async fn given_no_session_when_send_then_not_connected() {
    let (supervisor, _inbox) = supervisor(vec![profile("survival", true)]);

    let result = supervisor.send("survival", String::from("hello")).await;

    assert!(matches!(result, Err(BridgeError::NotConnected { .. })));
}

#[tokio::test]
async fn given_registered_session_when_send_then_frame_reaches_writer() {
    let (supervisor, _inbox) = supervisor(vec![profile("survival", true)]);
    let (tx, mut rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);
    supervisor.store.try_register("survival", tx).await.unwrap();

    supervisor
        .send("survival", String::from("hello"))
        .await
        .unwrap();

    assert!(matches!(rx.recv().await, Some(Outgoing::Text(text)) if text == "hello"));
}

#[tokio::test]
async fn given_live_session_when_duplicate_registers_then_rejected() {
    let (supervisor, _inbox) = supervisor(vec![]);
    let (first, _first_rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);
    let (second, _second_rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);

    supervisor
        .store
        .try_register("survival", first)
        .await
        .unwrap();
    let result = supervisor.store.try_register("survival", second).await;

    assert!(matches!(result, Err(BridgeError::DuplicateIdentity { .. })));
    assert!(supervisor.is_connected("survival").await);
}

#[tokio::test]
async fn given_superseded_identity_when_teardown_then_live_session_untouched() {
    let (supervisor, _inbox) = supervisor(vec![]);
    let (live, _live_rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);
    let (stale, _stale_rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);
    supervisor.store.try_register("survival", live).await.unwrap();

    supervisor.teardown("survival", &stale, false).await;

    assert!(supervisor.is_connected("survival").await);
}

#[tokio::test]
async fn given_registered_identity_when_teardown_then_disconnected() {
    let (supervisor, _inbox) = supervisor(vec![]);
    let (tx, _rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);
    supervisor
        .store
        .try_register("survival", tx.clone())
        .await
        .unwrap();

    supervisor.teardown("survival", &tx, false).await;

    assert!(!supervisor.is_connected("survival").await);
    assert_eq!(
        supervisor.store.state("survival").await,
        ConnectionState::Disconnected
    );
}

#[test]
fn given_close_codes_when_deciding_dial_back_then_only_clean_close_suppresses() {
    assert!(!should_dial_back(Some(CLOSE_NORMAL)));
    assert!(should_dial_back(Some(CLOSE_POLICY_VIOLATION)));
    assert!(should_dial_back(Some(CLOSE_INTERNAL_ERROR)));
    assert!(should_dial_back(None));
}

#[tokio::test]
async fn given_abnormal_loss_when_teardown_then_reconnect_scheduled() {
    let (supervisor, _inbox) = supervisor(vec![profile("survival", true)]);
    let (tx, _rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);
    supervisor
        .store
        .try_register("survival", tx.clone())
        .await
        .unwrap();

    supervisor
        .teardown("survival", &tx, should_dial_back(None))
        .await;
    // Scheduling runs on its own task.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = supervisor.status_snapshot().await;
    let status = &snapshot["survival"];
    assert!(!status.connected);
    assert_eq!(status.state, ConnectionState::Reconnecting);
    assert_eq!(status.reconnect_attempts, 1);
    assert!(status.has_pending_timer);
}

#[tokio::test]
async fn given_clean_close_when_teardown_then_parked_without_timer() {
    let (supervisor, _inbox) = supervisor(vec![profile("survival", true)]);
    let (tx, _rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);
    supervisor
        .store
        .try_register("survival", tx.clone())
        .await
        .unwrap();

    supervisor
        .teardown("survival", &tx, should_dial_back(Some(CLOSE_NORMAL)))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = supervisor.status_snapshot().await;
    let status = &snapshot["survival"];
    assert!(!status.connected);
    assert_eq!(status.state, ConnectionState::Disconnected);
    assert_eq!(status.reconnect_attempts, 0);
    assert!(!status.has_pending_timer);
}

#[tokio::test]
async fn given_inbound_payload_when_dispatch_then_event_delivered() {
    let (supervisor, mut inbox) = supervisor(vec![]);

    supervisor.dispatch("survival", String::from("{\"api\":1}")).await;

    let event = inbox.recv().await.unwrap();
    assert_eq!(event.server_name, "survival");
    assert_eq!(event.payload, "{\"api\":1}");
}

#[tokio::test]
async fn given_only_profiles_when_snapshot_then_enabled_servers_report_disconnected() {
    let (supervisor, _inbox) = supervisor(vec![profile("survival", true), profile("creative", false)]);

    let snapshot = supervisor.status_snapshot().await;

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot["survival"].state, ConnectionState::Disconnected);
    assert!(!snapshot["survival"].connected);
}
