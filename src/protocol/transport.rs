//! Transport Module
//!
//! Establishes the single byte stream a run talks over.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::info;

use crate::config::Target;
use crate::error::{ItoolError, Result};

// == Transport ==
/// Bidirectional byte stream to the server.
///
/// Implemented for anything readable and writable, so TCP streams, Unix
/// sockets and in-memory pipes are interchangeable.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Connects to `target`, giving up after `timeout`.
///
/// There are no retries: the first failure is returned.
pub async fn connect(target: &Target, timeout: Duration) -> Result<Box<dyn Transport>> {
    let addr = target.to_string();

    let stream: Box<dyn Transport> = match target {
        Target::Tcp { host, port } => {
            let stream = tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), *port)))
                .await
                .map_err(|_| ItoolError::ConnectTimeout {
                    addr: addr.clone(),
                    timeout,
                })?
                .map_err(|e| ItoolError::Connection {
                    addr: addr.clone(),
                    reason: e.to_string(),
                })?;
            stream.set_nodelay(true)?;
            Box::new(stream)
        }
        Target::Unix(path) => connect_unix(path, &addr, timeout).await?,
    };

    info!("Connected to {}", addr);
    Ok(stream)
}

#[cfg(unix)]
async fn connect_unix(
    path: &std::path::Path,
    addr: &str,
    timeout: Duration,
) -> Result<Box<dyn Transport>> {
    let stream = tokio::time::timeout(timeout, tokio::net::UnixStream::connect(path))
        .await
        .map_err(|_| ItoolError::ConnectTimeout {
            addr: addr.to_string(),
            timeout,
        })?
        .map_err(|e| ItoolError::Connection {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
    Ok(Box::new(stream))
}

#[cfg(not(unix))]
async fn connect_unix(
    _path: &std::path::Path,
    addr: &str,
    _timeout: Duration,
) -> Result<Box<dyn Transport>> {
    Err(ItoolError::UnsupportedTransport(format!(
        "Unix sockets are not available on this platform ({})",
        addr
    )))
}
