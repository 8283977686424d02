//! Error types for the gateway's own components (store, session, pool, HTTP).
//!
//! Distinct from [`crate::client::error::SmppError`], which covers the
//! SMPP wire-protocol client. `GatewayError` wraps that error alongside the
//! gateway's own failure modes: configuration, the database, and request
//! validation.

use thiserror::Error;

/// Errors surfaced by the gateway's core components.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Startup/config failure: bad config file, bad DSN, bad SMPP URI.
    #[error("configuration error: {0}")]
    Config(String),

    /// Message store (database) failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// SMPP URI used a scheme other than `smpp`.
    #[error("unsupported scheme")]
    UnsupportedScheme,

    /// No session pool member is currently in the `Connected` state.
    #[error("no transceivers connected")]
    NoTransceiversConnected,

    /// Underlying SMPP client/protocol failure.
    #[error("smpp error: {0}")]
    Smpp(#[from] crate::client::error::SmppError),

    /// Request-field validation failure.
    #[error("validation error: {0}")]
    Validation(String),
}
