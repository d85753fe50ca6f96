use crate::{admin, status};

use mcb_countdown::CountdownScheduler;
use mcb_rcon::RconSupervisor;
use mcb_ws::WsSupervisor;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

/// Shared handles for the HTTP surface.
#[derive(Clone)]
pub struct AppState {
    pub rcon: Arc<RconSupervisor>,
    pub ws: Arc<WsSupervisor>,
    pub scheduler: Arc<CountdownScheduler>,
}

/// Build the application router. The inbound WebSocket endpoint is only
/// mounted when the listener is enabled; status and admin endpoints are
/// always served.
pub fn build_router(state: AppState, ws_path: Option<&str>) -> Router {
    let mut app = Router::new()
        // Health / status endpoints
        .route("/health", get(status::liveness))
        .route("/status", get(status::status_handler))
        // Admin endpoints
        .route(
            "/admin/servers/{server}/reconnect",
            post(admin::reconnect_handler),
        )
        .route(
            "/admin/servers/{server}/countdown",
            post(admin::countdown_start_handler),
        )
        .route(
            "/admin/servers/{server}/countdown/cancel",
            post(admin::countdown_cancel_handler),
        )
        .with_state(state.clone());

    if let Some(path) = ws_path {
        app = app.merge(mcb_ws::router(state.ws, path));
    }

    // CORS middleware (allow all origins for WebSocket)
    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
