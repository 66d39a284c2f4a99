//! Stats Client
//!
//! The administrative commands the tool issues, each returning parsed
//! records instead of raw lines.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::error::Result;
use crate::protocol::{CacheDumpEntry, LineReader, ResponseKind, StatLine, StatsMap, ValueHeader};
use crate::slabs::{collect_slab_stats, SlabStats};

// == Stored Value ==
/// A value returned by `get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub header: ValueHeader,
    pub data: String,
}

/// Collects the `STAT <key> <value>` lines of a reply.
pub fn parse_stats(lines: &[String]) -> StatsMap {
    let mut map = StatsMap::new();
    for line in lines {
        match StatLine::classify(ResponseKind::Stats, line) {
            StatLine::Stat { key, value } => map.insert(key, value),
            _ => debug!("Skipping stats line: {}", line),
        }
    }
    map
}

/// Collects `(item size, item count)` pairs of a `stats sizes` reply.
pub fn parse_sizes(lines: &[String]) -> Vec<(u64, u64)> {
    parse_stats(lines)
        .iter()
        .filter_map(|(size, count)| Some((size.parse::<u64>().ok()?, count.parse::<u64>().ok()?)))
        .collect()
}

/// Collects the `ITEM` lines of a cache dump.
pub fn parse_cachedump(lines: &[String]) -> Vec<CacheDumpEntry> {
    lines
        .iter()
        .filter_map(|line| match StatLine::classify(ResponseKind::CacheDump, line) {
            StatLine::CacheDumpItem(entry) => Some(entry),
            _ => {
                debug!("Skipping cachedump line: {}", line);
                None
            }
        })
        .collect()
}

/// Finds the first value of a `get` reply; its payload is the next line.
pub fn parse_value(lines: &[String]) -> Option<StoredValue> {
    lines.iter().enumerate().find_map(|(i, line)| {
        match StatLine::classify(ResponseKind::Value, line) {
            StatLine::ValueHeader(header) => Some(StoredValue {
                header,
                data: lines.get(i + 1).cloned().unwrap_or_default(),
            }),
            _ => None,
        }
    })
}

// == Stats Client ==
/// Typed command set over one connection.
#[derive(Debug)]
pub struct StatsClient<S> {
    reader: LineReader<S>,
}

impl<S> StatsClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            reader: LineReader::new(stream),
        }
    }

    /// `stats`
    pub async fn general_stats(&mut self) -> Result<StatsMap> {
        let lines = self.reader.send_and_receive("stats").await?;
        Ok(parse_stats(&lines))
    }

    /// `stats settings`
    pub async fn settings(&mut self) -> Result<StatsMap> {
        let lines = self.reader.send_and_receive("stats settings").await?;
        Ok(parse_stats(&lines))
    }

    /// `stats slabs` followed by `stats items`
    pub async fn slab_stats(&mut self) -> Result<SlabStats> {
        collect_slab_stats(&mut self.reader).await
    }

    /// `stats sizes`
    pub async fn sizes(&mut self) -> Result<Vec<(u64, u64)>> {
        let lines = self.reader.send_and_receive("stats sizes").await?;
        Ok(parse_sizes(&lines))
    }

    /// `stats cachedump <slab_id> <limit>`
    pub async fn cachedump(&mut self, slab_id: u32, limit: u64) -> Result<Vec<CacheDumpEntry>> {
        let command = format!("stats cachedump {} {}", slab_id, limit);
        let lines = self.reader.send_and_receive(&command).await?;
        Ok(parse_cachedump(&lines))
    }

    /// `get <key>`; `None` on a miss.
    ///
    /// Fetching an expired key makes the server drop it.
    pub async fn get(&mut self, key: &str) -> Result<Option<StoredValue>> {
        let lines = self.reader.send_and_receive(&format!("get {}", key)).await?;
        Ok(parse_value(&lines))
    }
}
