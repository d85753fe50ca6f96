use crate::scheduler::cadence;
use crate::{CountdownScheduler, ServerLink, ShutdownAction};

use mcb_core::{BridgeError, Result};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

#[derive(Default)]
struct RecordingLink {
    fail_titles: bool,
    titles: Mutex<Vec<(String, String)>>,
    commands: Mutex<Vec<String>>,
}

impl RecordingLink {
    fn failing_titles() -> Self {
        Self {
            fail_titles: true,
            ..Self::default()
        }
    }

    fn titles(&self) -> Vec<(String, String)> {
        self.titles.lock().unwrap().clone()
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServerLink for RecordingLink {
    async fn send_title(&self, server: &str, title: &str, subtitle: &str) -> Result<()> {
        if self.fail_titles {
            return Err(BridgeError::not_connected(server));
        }
        self.titles
            .lock()
            .unwrap()
            .push((title.to_string(), subtitle.to_string()));
        Ok(())
    }

    async fn run_command(&self, _server: &str, command: &str) -> Result<String> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(String::new())
    }
}

#[tokio::test(start_paused = true)]
async fn given_five_second_stop_when_expired_then_digit_ticks_and_single_stop() {
    let link = Arc::new(RecordingLink::default());
    let scheduler = CountdownScheduler::new(link.clone());

    scheduler
        .start("survival", 5, ShutdownAction::Stop)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let digits: Vec<String> = link
        .titles()
        .iter()
        .take(5)
        .map(|(title, _)| title.clone())
        .collect();
    assert_eq!(digits, ["5", "4", "3", "2", "1"]);
    assert_eq!(link.commands(), ["stop"]);
    assert!(!scheduler.is_running("survival").await);
}

#[tokio::test(start_paused = true)]
async fn given_failing_notifications_when_expired_then_stop_still_issued_once() {
    let link = Arc::new(RecordingLink::failing_titles());
    let scheduler = CountdownScheduler::new(link.clone());

    scheduler
        .start("survival", 5, ShutdownAction::Stop)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(link.titles().is_empty());
    assert_eq!(link.commands(), ["stop"]);
}

#[tokio::test(start_paused = true)]
async fn given_restart_action_when_expired_then_restart_command() {
    let link = Arc::new(RecordingLink::default());
    let scheduler = CountdownScheduler::new(link.clone());

    scheduler
        .start("survival", 5, ShutdownAction::Restart)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(link.commands(), ["restart"]);
}

#[tokio::test(start_paused = true)]
async fn given_cancel_mid_run_when_time_passes_then_no_further_tick_or_command() {
    let link = Arc::new(RecordingLink::default());
    let scheduler = CountdownScheduler::new(link.clone());

    scheduler
        .start("survival", 60, ShutdownAction::Stop)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(scheduler.cancel("survival").await);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let titles_after_cancel = link.titles().len();

    tokio::time::sleep(Duration::from_secs(120)).await;

    assert!(link.commands().is_empty());
    assert_eq!(link.titles().len(), titles_after_cancel);
    assert!(!scheduler.is_running("survival").await);
}

#[tokio::test(start_paused = true)]
async fn given_running_countdown_when_start_again_then_already_running() {
    let link = Arc::new(RecordingLink::default());
    let scheduler = CountdownScheduler::new(link);

    scheduler
        .start("survival", 60, ShutdownAction::Stop)
        .await
        .unwrap();
    let second = scheduler.start("survival", 30, ShutdownAction::Restart).await;

    assert!(matches!(second, Err(BridgeError::AlreadyRunning { .. })));
    assert!(scheduler.cancel("survival").await);
}

#[tokio::test(start_paused = true)]
async fn given_idle_server_when_cancel_then_false() {
    let link = Arc::new(RecordingLink::default());
    let scheduler = CountdownScheduler::new(link);

    assert!(!scheduler.cancel("survival").await);
}

#[tokio::test(start_paused = true)]
async fn given_running_countdown_when_snapshot_then_remaining_tracks_wall_clock() {
    let link = Arc::new(RecordingLink::default());
    let scheduler = CountdownScheduler::new(link);

    scheduler
        .start("survival", 60, ShutdownAction::Restart)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(12)).await;

    let snapshot = scheduler.status_snapshot().await;
    let status = &snapshot["survival"];
    assert_eq!(status.action, ShutdownAction::Restart);
    assert_eq!(status.total_seconds, 60);
    assert_eq!(status.remaining, 48);
    assert_eq!(status.elapsed_seconds, 12);

    assert!(scheduler.cancel("survival").await);
}

#[test]
fn given_remaining_seconds_when_cadence_then_bands_match() {
    assert_eq!(
        cadence(ShutdownAction::Stop, 3),
        Some((String::from("3"), String::from("Server shutdown imminent")))
    );
    assert!(matches!(cadence(ShutdownAction::Stop, 8), Some((title, _)) if title.contains("countdown")));
    assert!(cadence(ShutdownAction::Stop, 25).is_some());
    assert!(cadence(ShutdownAction::Stop, 40).is_some());
    assert!(cadence(ShutdownAction::Stop, 47).is_none());
}
