//! Report rows
//!
//! Structured data handed to the renderer, one type per table.

use serde::Serialize;

use crate::protocol::{CacheDumpEntry, StatsMap};
use crate::slabs::{waste_percent, CapacityEstimate, ExpireStatus, SlabRecord};

/// One slab class of the `display` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlabRow {
    pub id: u32,
    #[serde(flatten)]
    pub record: SlabRecord,
    pub full: bool,
    pub wasted_percent: f64,
}

impl SlabRow {
    pub fn new(id: u32, record: &SlabRecord) -> Self {
        Self {
            id,
            record: *record,
            full: record.is_full(),
            wasted_percent: record.wasted_percent(),
        }
    }
}

/// Memory limits printed under the `display` totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRow {
    #[serde(flatten)]
    pub estimate: CapacityEstimate,
    pub item_size_max: u64,
    pub growth_factor: f64,
    /// Whether the server evicts, `None` if not reported
    pub evictions: Option<String>,
}

/// `display` mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayReport {
    pub slabs: Vec<SlabRow>,
    pub total: StatsMap,
    pub capacity: CapacityRow,
}

/// `stats` and `settings` modes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldReport {
    pub fields: StatsMap,
}

/// One observed item size of the `sizes` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeRow {
    pub size: u64,
    pub items: u64,
    pub chunk_size: f64,
    pub wasted_percent: f64,
}

/// `sizes` mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizesReport {
    pub rows: Vec<SizeRow>,
}

/// Value fetched for a dumped key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueRow {
    pub flags: u32,
    pub data: String,
}

/// One dumped key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyRow {
    pub slab_id: u32,
    pub key: String,
    pub status: ExpireStatus,
    /// Size as the server described it
    pub size: String,
    pub size_bytes: u64,
    /// Share of the slab chunk the item leaves unused
    pub waste_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueRow>,
}

impl KeyRow {
    pub fn new(slab_id: u32, chunk_size: u64, entry: CacheDumpEntry, status: ExpireStatus) -> Self {
        Self {
            slab_id,
            waste_percent: waste_percent(entry.size_bytes as f64, chunk_size as f64),
            key: entry.key,
            status,
            size: entry.descriptor,
            size_bytes: entry.size_bytes,
            value: None,
        }
    }
}

/// `dumpkeys`, `dump` and `removeexp` modes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumpReport {
    pub items: Vec<KeyRow>,
    /// `get` requests issued: values shown, or expired keys removed
    pub fetched: usize,
}
