pub mod claims;
pub mod presence;
pub mod territories;
