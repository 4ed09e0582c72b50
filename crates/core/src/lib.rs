//! Terraclaim domain logic.
//!
//! Pure, synchronous building blocks for the land-claim engine: sample
//! validation, path recording, loop closure, area, overlap, simplification,
//! density, and territory lifecycle. No database or HTTP dependencies; the
//! `terraclaim-db` and `terraclaim-api` crates supply those.

pub mod area;
pub mod closure;
pub mod density;
pub mod error;
pub mod geodesy;
pub mod lifecycle;
pub mod naming;
pub mod overlap;
pub mod path;
pub mod polygon;
pub mod simplify;
pub mod types;
pub mod validator;
