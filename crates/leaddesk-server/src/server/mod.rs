//! Server-side components of the `leaddesk` HTTP service.
//!
//! - [`config`] - CLI/environment configuration and its validation.
//! - [`routes`] - the axum router, handlers and middleware stack.
//! - [`error`] - mapping of service errors onto HTTP responses.
//! - [`payload`] - JSON or urlencoded form request bodies.
//! - [`telemetry`] - logging and optional OpenTelemetry export.

pub mod config;
pub mod error;
pub mod payload;
pub mod routes;
pub mod telemetry;
