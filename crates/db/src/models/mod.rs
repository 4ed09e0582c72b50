pub mod heartbeat;
pub mod territory;
