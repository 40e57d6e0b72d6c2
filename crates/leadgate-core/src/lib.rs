//! Shared service plumbing for Leadgate: tracing init, request-id middleware,
//! health endpoints, env config loading, and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
