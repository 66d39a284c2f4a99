//! Line-Response Reader
//!
//! Sends one command line and collects the reply up to its terminator.
//! Commands and replies strictly alternate; nothing is pipelined.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::error::Result;
use crate::protocol::{ValueHeader, CRLF, TERMINATOR};

/// Largest value memcached can store (`item_size_max` tops out at 1 GiB)
const MAX_VALUE_SIZE: usize = 1024 * 1024 * 1024;

// == Line Reader ==
/// Blocking-style request/response exchange over one stream.
#[derive(Debug)]
pub struct LineReader<S> {
    stream: BufReader<S>,
}

impl<S> LineReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    // == Send And Receive ==
    /// Writes `command` followed by CRLF and returns the reply lines.
    ///
    /// The terminator and blank lines are dropped. A `VALUE` header is
    /// followed by its payload read by length, so payload bytes are never
    /// mistaken for the terminator. If the stream closes first, whatever
    /// was collected is returned. An `ERROR`, `CLIENT_ERROR` or
    /// `SERVER_ERROR` line also ends the reply since the server sends no
    /// terminator after it.
    pub async fn send_and_receive(&mut self, command: &str) -> Result<Vec<String>> {
        debug!("> {}", command);
        let request = format!("{}{}", command, CRLF);
        let writer = self.stream.get_mut();
        writer.write_all(request.as_bytes()).await?;
        writer.flush().await?;

        let mut lines = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if self.stream.read_until(b'\n', &mut buf).await? == 0 {
                warn!(
                    "Stream closed before {} for '{}', keeping {} lines",
                    TERMINATOR,
                    command,
                    lines.len()
                );
                break;
            }

            let line = String::from_utf8_lossy(trim_line_end(&buf)).into_owned();
            if line == TERMINATOR {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            if is_error_reply(&line) {
                warn!("Server rejected '{}': {}", command, line);
                lines.push(line);
                break;
            }

            let header = ValueHeader::parse(&line);
            lines.push(line);

            if let Some(header) = header {
                match self.read_payload(header.byte_length).await? {
                    Some(payload) => lines.push(payload),
                    None => {
                        warn!("Value of '{}' incomplete, ending reply", header.key);
                        break;
                    }
                }
            }
        }

        debug!("< {} lines", lines.len());
        Ok(lines)
    }

    /// Reads `len` payload bytes plus the trailing CRLF.
    ///
    /// Returns `None` when the stream ends before the payload does or the
    /// announced length exceeds [`MAX_VALUE_SIZE`].
    async fn read_payload(&mut self, len: usize) -> Result<Option<String>> {
        if len > MAX_VALUE_SIZE {
            warn!("Value length {} exceeds {} bytes", len, MAX_VALUE_SIZE);
            return Ok(None);
        }

        let mut payload = Vec::new();
        (&mut self.stream)
            .take((len + CRLF.len()) as u64)
            .read_to_end(&mut payload)
            .await?;

        if payload.len() < len {
            return Ok(None);
        }
        payload.truncate(len);
        Ok(Some(String::from_utf8_lossy(&payload).into_owned()))
    }
}

fn trim_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

fn is_error_reply(line: &str) -> bool {
    line == "ERROR" || line.starts_with("CLIENT_ERROR") || line.starts_with("SERVER_ERROR")
}
