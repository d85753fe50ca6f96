use crate::admin::{CountdownRequest, countdown_seconds_valid};

use mcb_countdown::ShutdownAction;

#[test]
fn given_boundary_durations_when_validated_then_range_is_inclusive() {
    assert!(!countdown_seconds_valid(4));
    assert!(countdown_seconds_valid(5));
    assert!(countdown_seconds_valid(300));
    assert!(!countdown_seconds_valid(301));
}

#[test]
fn given_request_without_seconds_when_deserialized_then_defaults_to_ten() {
    let request: CountdownRequest = serde_json::from_str(r#"{"action":"stop"}"#).unwrap();

    assert_eq!(request.action, ShutdownAction::Stop);
    assert_eq!(request.seconds, 10);
}

#[test]
fn given_restart_request_when_deserialized_then_action_and_seconds_parse() {
    let request: CountdownRequest =
        serde_json::from_str(r#"{"action":"restart","seconds":60}"#).unwrap();

    assert_eq!(request.action, ShutdownAction::Restart);
    assert_eq!(request.seconds, 60);
}

#[test]
fn given_unknown_action_when_deserialized_then_rejected() {
    let request = serde_json::from_str::<CountdownRequest>(r#"{"action":"reboot"}"#);

    assert!(request.is_err());
}
