//! Configuration Module
//!
//! Resolves the server address, the report mode and connection timeouts.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{ItoolError, Result};

// == Public Constants ==
/// Host used when the address names none
pub const DEFAULT_HOST: &str = "localhost";

/// Standard memcached port
pub const DEFAULT_PORT: u16 = 11211;

/// Seconds allowed to establish a TCP connection
pub const DEFAULT_TCP_TIMEOUT: u64 = 30;

/// Seconds allowed to establish a Unix socket connection
pub const DEFAULT_UNIX_TIMEOUT: u64 = 5;

// == Target ==
/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Network endpoint
    Tcp { host: String, port: u16 },
    /// Local socket path
    Unix(PathBuf),
}

impl Target {
    /// Parses `host[:port]` or an absolute socket path.
    ///
    /// A leading `/` selects a Unix socket. An empty host or port falls back
    /// to `localhost` and `11211` respectively.
    pub fn parse(addr: &str) -> Result<Self> {
        if addr.starts_with('/') {
            return Ok(Target::Unix(PathBuf::from(addr)));
        }

        let (host, port) = match addr.rsplit_once(':') {
            Some((host, port)) => (host, port),
            None => (addr, ""),
        };

        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let port = if port.is_empty() {
            DEFAULT_PORT
        } else {
            port.parse::<u16>()
                .map_err(|_| ItoolError::InvalidAddress(format!("bad port in '{}'", addr)))?
        };

        Ok(Target::Tcp {
            host: host.to_string(),
            port,
        })
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::Tcp {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Tcp { host, port } => write!(f, "{}:{}", host, port),
            Target::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

// == Mode ==
/// Report selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Slab table, totals and capacity estimate
    #[default]
    Display,
    /// Key names with expiration status
    Dumpkeys,
    /// Keys with values of non-expired items
    Dump,
    /// Fetch expired keys so the server evicts them
    Removeexp,
    /// Server settings
    Settings,
    /// Item sizes and the memory they waste
    Sizes,
    /// General server stats
    Stats,
}

impl Mode {
    /// Whether the mode can change server state.
    pub fn mutates_server(self) -> bool {
        matches!(self, Mode::Removeexp)
    }
}

// == Output Format ==
/// How the report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// == Config ==
/// Parameters for a single run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server address
    pub target: Target,
    /// Report to produce
    pub mode: Mode,
    /// Output rendering
    pub format: OutputFormat,
    /// Connect timeout for TCP targets
    pub tcp_timeout: Duration,
    /// Connect timeout for Unix socket targets
    pub unix_timeout: Duration,
}

impl Config {
    /// Timeout matching the configured transport.
    pub fn connect_timeout(&self) -> Duration {
        match self.target {
            Target::Tcp { .. } => self.tcp_timeout,
            Target::Unix(_) => self.unix_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: Target::default(),
            mode: Mode::default(),
            format: OutputFormat::default(),
            tcp_timeout: Duration::from_secs(DEFAULT_TCP_TIMEOUT),
            unix_timeout: Duration::from_secs(DEFAULT_UNIX_TIMEOUT),
        }
    }
}
