//! Slab Stats Aggregator
//!
//! Merges `stats slabs` and `stats items` into one record per slab class.

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::error::Result;
use crate::protocol::{LineReader, ResponseKind, StatLine, StatsMap};
use crate::slabs::SlabRecord;

// == Slab Stats ==
/// Slab classes keyed by id plus the global `total` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlabStats {
    /// Records ordered by ascending class id
    pub classes: BTreeMap<u32, SlabRecord>,
    /// Global fields of `stats slabs`, in server order
    pub total: StatsMap,
}

impl SlabStats {
    // == From Responses ==
    /// Builds the merged view, slabs lines first then items lines.
    ///
    /// Any id seen in either reply gets a record; fields neither reply
    /// carried stay 0.
    pub fn from_responses(slabs: &[String], items: &[String]) -> Self {
        let mut stats = SlabStats::default();

        for line in slabs {
            match StatLine::classify(ResponseKind::Slabs, line) {
                StatLine::SlabStat {
                    slab_id,
                    property,
                    value,
                } => {
                    stats
                        .classes
                        .entry(slab_id)
                        .or_default()
                        .apply(&property, value);
                }
                StatLine::Stat { key, value } => stats.total.insert(key, value),
                _ => debug!("Skipping slabs line: {}", line),
            }
        }

        for line in items {
            match StatLine::classify(ResponseKind::Items, line) {
                StatLine::ItemStat {
                    slab_id,
                    property,
                    value,
                } => {
                    stats
                        .classes
                        .entry(slab_id)
                        .or_default()
                        .apply(&property, value);
                }
                _ => debug!("Skipping items line: {}", line),
            }
        }

        stats
    }

    pub fn get(&self, slab_id: u32) -> Option<&SlabRecord> {
        self.classes.get(&slab_id)
    }

    /// Classes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SlabRecord)> {
        self.classes.iter().map(|(id, record)| (*id, record))
    }

    /// Classes currently holding items.
    pub fn populated(&self) -> impl Iterator<Item = (u32, &SlabRecord)> {
        self.iter().filter(|(_, record)| record.number > 0)
    }
}

// == Collect ==
/// Runs `stats slabs` then `stats items` and merges the replies.
pub async fn collect_slab_stats<S>(reader: &mut LineReader<S>) -> Result<SlabStats>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let slabs = reader.send_and_receive("stats slabs").await?;
    let items = reader.send_and_receive("stats items").await?;
    Ok(SlabStats::from_responses(&slabs, &items))
}
