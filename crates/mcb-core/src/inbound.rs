use tokio::sync::mpsc;

/// One raw payload received from a game server over WebSocket.
/// The transport never interprets the content; the dispatch collaborator
/// (chat relay, event router) owns parsing and routing.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub server_name: String,
    pub payload: String,
}

/// Channel end handed to the WebSocket supervisor for forwarding
/// inbound payloads verbatim.
pub type EventSender = mpsc::Sender<InboundEvent>;
