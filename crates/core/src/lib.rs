//! Shared types, errors, configuration and metric names for scangate.
//!
//! Scangate orchestrates one security-scan daemon lifecycle per build:
//! launch, readiness probe, alert aggregation, threshold classification,
//! guaranteed shutdown. This crate holds everything the session engine and
//! the CLI share.

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- re-exports ---

// Errors
pub use error::{ConfigError, ScangateError};

// Configuration
pub use config::ScangateConfig;

// Domain types
pub use types::{Alert, AlertSummary, SessionResult, Severity};
