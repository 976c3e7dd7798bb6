//! Worker HTTP API
//!
//! Endpoints served by a worker. Bodies are the JSON forms of
//! `ExecuteRequest` and `ExecuteResponse`.

/// Executes one chunk and answers with its result.
pub const ENDPOINT_EXECUTE: &str = "/execute";
/// Liveness check.
pub const ENDPOINT_HEALTH: &str = "/health";
