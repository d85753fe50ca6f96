/// Outgoing frame handed to a connection's writer task. One enum for
/// both directions so the store can hold a single handle type whether
/// the peer was accepted inbound or dialed outbound.
#[derive(Debug)]
pub enum Outgoing {
    Text(String),
    Ping,
}
