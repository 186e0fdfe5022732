//! Observability module
//!
//! Structured logging setup shared by the CLI and the dev server.

pub mod telemetry;
