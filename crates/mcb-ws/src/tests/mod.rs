mod heartbeat;
mod supervisor;
