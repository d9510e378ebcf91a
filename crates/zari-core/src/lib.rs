//! Shared plumbing for Zari services.
//!
//! Environment config loading, the liveness handler, request-id middleware,
//! tracing setup and serde helpers. No domain types live here.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
