pub mod heartbeat_repo;
pub mod territory_repo;

pub use heartbeat_repo::HeartbeatRepo;
pub use territory_repo::{CommitError, TerritoryRepo};
