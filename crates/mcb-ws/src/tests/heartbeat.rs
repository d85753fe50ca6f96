use crate::heartbeat::drain_stale_pong;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::timeout;

#[tokio::test]
async fn given_late_pong_permit_when_drained_then_next_wait_times_out() {
    let signal = Arc::new(Notify::new());
    signal.notify_one();

    drain_stale_pong(&signal).await;

    let wait = timeout(Duration::from_millis(20), signal.notified()).await;
    assert!(wait.is_err());
}

#[tokio::test]
async fn given_drained_signal_when_pong_arrives_then_wait_completes() {
    let signal = Arc::new(Notify::new());
    signal.notify_one();
    drain_stale_pong(&signal).await;

    signal.notify_one();

    let wait = timeout(Duration::from_millis(20), signal.notified()).await;
    assert!(wait.is_ok());
}
