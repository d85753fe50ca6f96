use mcb_core::{InboundEvent, ReconnectPolicy};
use mcb_countdown::{BridgeLink, CountdownScheduler};
use mcb_rcon::RconSupervisor;
use mcb_server::{AppState, build_router, logger};
use mcb_ws::WsSupervisor;

use std::error::Error;
use std::sync::Arc;

use log::{debug, error, info};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Inbound payloads buffered between the WebSocket read loops and the
/// dispatch consumer.
const EVENT_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load and validate configuration
    let config = mcb_config::Config::load()?;
    config.validate()?;

    // Construct log file path if configured
    let log_file_path: Option<std::path::PathBuf> = if let Some(ref filename) = config.logging.file
    {
        let config_dir = mcb_config::Config::config_dir()?;
        let log_dir = config_dir.join(&config.logging.dir);

        // Ensure log directory exists
        std::fs::create_dir_all(&log_dir)?;

        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting mcb-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // Inbound event channel: WebSocket payloads flow to the dispatch
    // consumer, which hands them to whatever chat relay sits on top.
    let (events, inbox) = mpsc::channel::<InboundEvent>(EVENT_BUFFER_SIZE);
    spawn_dispatcher(inbox, config.debug);

    let policy = ReconnectPolicy::default();

    let rcon = RconSupervisor::new(config.servers.clone(), policy.clone());
    let ws = WsSupervisor::new(
        config.servers.clone(),
        policy,
        config.listener.password.clone(),
        events,
        config.debug,
    );

    // Initial connection sweep, off the startup path.
    {
        let rcon = Arc::clone(&rcon);
        let ws = Arc::clone(&ws);
        tokio::spawn(async move {
            rcon.connect_all().await;
            ws.connect_all().await;
        });
    }

    // Heartbeat monitors, one per transport.
    mcb_rcon::spawn_heartbeat(Arc::clone(&rcon));
    mcb_ws::spawn_heartbeat(Arc::clone(&ws));

    let scheduler = CountdownScheduler::new(Arc::new(BridgeLink::new(
        Arc::clone(&ws),
        Arc::clone(&rcon),
    )));

    let state = AppState {
        rcon,
        ws,
        scheduler,
    };

    let ws_path = config.listener.enabled.then_some(config.listener.path.as_str());
    let app = build_router(state, ws_path);

    let bind_addr = config.listener.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    let actual_addr = listener.local_addr()?;

    if let Some(path) = ws_path {
        info!("Listening on {} (inbound ws at {})", actual_addr, path);
    } else {
        info!("Listening on {} (inbound ws disabled)", actual_addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received SIGINT (Ctrl+C), shutting down"),
                Err(e) => error!("Failed to listen for SIGINT: {}", e),
            }
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Drain inbound events. This binary stops at logging them; a chat
/// relay embedding these crates would route them onward instead.
fn spawn_dispatcher(mut inbox: mpsc::Receiver<InboundEvent>, debug: bool) {
    tokio::spawn(async move {
        while let Some(event) = inbox.recv().await {
            if debug {
                debug!(
                    "[bridge] {} event ({} bytes)",
                    event.server_name,
                    event.payload.len()
                );
            }
        }
    });
}
