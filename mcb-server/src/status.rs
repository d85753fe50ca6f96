use crate::routes::AppState;

use mcb_core::ConnectionStatus;
use mcb_countdown::CountdownStatus;

use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub rcon: HashMap<String, ConnectionStatus>,
    pub websocket: HashMap<String, ConnectionStatus>,
    pub countdowns: HashMap<String, CountdownStatus>,
}

/// GET /status - per-server, per-transport connection state plus any
/// running countdowns.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        rcon: state.rcon.status_snapshot().await,
        websocket: state.ws.status_snapshot().await,
        countdowns: state.scheduler.status_snapshot().await,
    })
}

/// GET /health - is the process alive?
pub async fn liveness() -> Response {
    (StatusCode::OK, "OK").into_response()
}
