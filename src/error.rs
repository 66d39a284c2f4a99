//! Error types for the statistics client
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use thiserror::Error;

// == Itool Error Enum ==
/// Unified error type for the statistics client.
///
/// Only failures that make a report impossible live here. Lines the parser
/// does not recognize and streams closed before the terminator are not
/// errors; they degrade to skipped lines and partial responses.
#[derive(Error, Debug)]
pub enum ItoolError {
    /// Transport could not be established
    #[error("Connection to {addr} failed: {reason}")]
    Connection { addr: String, reason: String },

    /// Transport was not established within the allowed time
    #[error("Connection to {addr} timed out after {}s", .timeout.as_secs())]
    ConnectTimeout { addr: String, timeout: Duration },

    /// Target address could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Local sockets requested on a platform without them
    #[error("Unsupported transport: {0}")]
    UnsupportedTransport(String),

    /// I/O failure during a request/response exchange
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A derived metric needs a setting the server did not report
    #[error("Missing required setting: {0}")]
    MissingSetting(String),

    /// A setting is present but unusable for the computation
    #[error("Invalid setting {key}: {value}")]
    InvalidSetting { key: String, value: String },

    /// A general stat needed as a baseline is absent or not numeric
    #[error("Missing required stat: {0}")]
    MissingStat(String),
}

// == Result Type Alias ==
/// Convenience Result type for the statistics client.
pub type Result<T> = std::result::Result<T, ItoolError>;
