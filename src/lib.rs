//! ttlkv - an in-memory key/value cache with per-entry TTL
//!
//! Entries leave the cache only by explicit unset or TTL expiration; a
//! single timer, armed at the earliest deadline, evicts keys as their
//! deadlines pass. Textual commands (GET, SET, UNSET, GETTTL, SETTTL,
//! UNSETTTL, UNSETALL) resolve into typed operations against the cache
//! facade, and a thin line-protocol server fronts the whole thing.

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod server;

pub use cache::{Action, Cache, Entry, Outcome};
pub use commands::Command;
pub use config::Config;
pub use error::CacheError;
