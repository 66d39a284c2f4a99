//! Expiration Classifier
//!
//! memcached reports items without a TTL with the server start time as
//! their expiration, so that time means "never expires".

use std::fmt;

use serde::Serialize;

use crate::error::{ItoolError, Result};
use crate::protocol::StatsMap;

// == Expire Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "seconds_left", rename_all = "snake_case")]
pub enum ExpireStatus {
    NeverExpires,
    Expired,
    Remaining(u64),
}

impl ExpireStatus {
    // == Classify ==
    /// Classifies an item expiring at `expiration` seen at `now` on a
    /// server started at `process_start`. All values are Unix seconds.
    pub fn classify(expiration: i64, now: i64, process_start: i64) -> Self {
        if expiration == process_start {
            ExpireStatus::NeverExpires
        } else if now > expiration {
            ExpireStatus::Expired
        } else {
            ExpireStatus::Remaining(expiration.abs_diff(now))
        }
    }

    pub fn is_expired(self) -> bool {
        self == ExpireStatus::Expired
    }
}

impl fmt::Display for ExpireStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpireStatus::NeverExpires => write!(f, "[never expire]"),
            ExpireStatus::Expired => write!(f, "[expired]"),
            ExpireStatus::Remaining(secs) => write!(f, "{}s left", secs),
        }
    }
}

// == Process Start ==
/// Server start time: `time - uptime` from the general stats.
pub fn process_start(stats: &StatsMap) -> Result<i64> {
    let time: i64 = stats
        .parse("time")
        .ok_or_else(|| ItoolError::MissingStat("time".to_string()))?;
    let uptime: i64 = stats
        .parse("uptime")
        .ok_or_else(|| ItoolError::MissingStat("uptime".to_string()))?;
    time.checked_sub(uptime)
        .ok_or_else(|| ItoolError::MissingStat("uptime".to_string()))
}
