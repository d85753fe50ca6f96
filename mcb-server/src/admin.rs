//! Administrative endpoints: manual reconnects and countdown control.

use crate::routes::AppState;

use mcb_core::BridgeError;
use mcb_countdown::{MAX_COUNTDOWN_SECS, MIN_COUNTDOWN_SECS, ShutdownAction};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ReconnectResponse {
    pub rcon: bool,
    pub websocket: bool,
}

/// POST /admin/servers/{server}/reconnect - force both transports of a
/// server through a fresh connect, reporting which ones were eligible.
pub async fn reconnect_handler(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Json<ReconnectResponse> {
    info!("Manual reconnect requested for {}", server);

    Json(ReconnectResponse {
        rcon: state.rcon.force_reconnect(&server).await,
        websocket: state.ws.force_reconnect(&server).await,
    })
}

#[derive(Debug, Deserialize)]
pub struct CountdownRequest {
    pub action: ShutdownAction,
    #[serde(default = "default_countdown_seconds")]
    pub seconds: u64,
}

fn default_countdown_seconds() -> u64 {
    10
}

pub(crate) fn countdown_seconds_valid(seconds: u64) -> bool {
    (MIN_COUNTDOWN_SECS..=MAX_COUNTDOWN_SECS).contains(&seconds)
}

#[derive(Debug, Serialize)]
pub struct CountdownResponse {
    pub status: String,
    pub message: String,
}

/// POST /admin/servers/{server}/countdown - begin a shutdown or restart
/// countdown. `409` while one is already running, `400` for an
/// out-of-range duration.
pub async fn countdown_start_handler(
    State(state): State<AppState>,
    Path(server): Path<String>,
    Json(request): Json<CountdownRequest>,
) -> Result<(StatusCode, Json<CountdownResponse>), (StatusCode, String)> {
    if !countdown_seconds_valid(request.seconds) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "seconds must lie in [{}, {}]",
                MIN_COUNTDOWN_SECS, MAX_COUNTDOWN_SECS
            ),
        ));
    }

    match state
        .scheduler
        .start(&server, request.seconds, request.action)
        .await
    {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(CountdownResponse {
                status: String::from("ok"),
                message: format!("{} in {}s", request.action, request.seconds),
            }),
        )),
        Err(e @ BridgeError::AlreadyRunning { .. }) => {
            warn!("Countdown conflict for {}: {}", server, e);
            Err((StatusCode::CONFLICT, e.to_string()))
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// POST /admin/servers/{server}/countdown/cancel - abort a running
/// countdown; `cancelled: false` when none was running.
pub async fn countdown_cancel_handler(
    State(state): State<AppState>,
    Path(server): Path<String>,
) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: state.scheduler.cancel(&server).await,
    })
}
