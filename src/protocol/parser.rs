//! Reply line classification
//!
//! Every reply line is matched against the shapes its command can produce.
//! Lines that fit none of them become [`StatLine::Unrecognized`] and are
//! skipped by callers, so unexpected server output never aborts a scan.

use serde::Serialize;

// == Response Kind ==
/// Which command produced the lines being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// `stats slabs`
    Slabs,
    /// `stats items`
    Items,
    /// `stats`, `stats settings`, `stats sizes`
    Stats,
    /// `stats cachedump <id> <count>`
    CacheDump,
    /// `get <key>`
    Value,
}

// == Cache Dump Entry ==
/// One `ITEM` line of a cache dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheDumpEntry {
    pub key: String,
    /// Text between `[` and `;`, e.g. `"52 b"`
    pub descriptor: String,
    /// Leading integer of the descriptor, 0 if it has none
    pub size_bytes: u64,
    /// Absolute expiration time as reported by the server
    pub expiration_epoch: i64,
}

// == Value Header ==
/// The `VALUE <key> <flags> <bytes>` line preceding a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueHeader {
    pub key: String,
    pub flags: u32,
    pub byte_length: usize,
}

// == Stat Line ==
/// A reply line tagged by its recognized shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatLine {
    /// `STAT <key> <value>`
    Stat { key: String, value: String },
    /// `STAT <slabId>:<property> <value>`
    SlabStat {
        slab_id: u32,
        property: String,
        value: u64,
    },
    /// `STAT items:<slabId>:<property> <value>`
    ItemStat {
        slab_id: u32,
        property: String,
        value: u64,
    },
    /// `ITEM <key> [<descriptor>; <ttl> s]`
    CacheDumpItem(CacheDumpEntry),
    /// `VALUE <key> <flags> <bytes>`
    ValueHeader(ValueHeader),
    Unrecognized,
}

impl StatLine {
    // == Classify ==
    /// Matches `line` against the shapes `kind` can produce.
    pub fn classify(kind: ResponseKind, line: &str) -> StatLine {
        let parsed = match kind {
            ResponseKind::Slabs => parse_slab_line(line),
            ResponseKind::Items => parse_item_line(line),
            ResponseKind::Stats => parse_stat_line(line),
            ResponseKind::CacheDump => parse_cachedump_line(line).map(StatLine::CacheDumpItem),
            ResponseKind::Value => ValueHeader::parse(line).map(StatLine::ValueHeader),
        };
        parsed.unwrap_or(StatLine::Unrecognized)
    }
}

impl ValueHeader {
    /// Parses a `VALUE` line; a trailing CAS token is tolerated.
    pub fn parse(line: &str) -> Option<ValueHeader> {
        let mut parts = line.split_whitespace();
        if parts.next()? != "VALUE" {
            return None;
        }
        let key = parts.next()?.to_string();
        let flags = parts.next()?.parse().ok()?;
        let byte_length = parts.next()?.parse().ok()?;
        Some(ValueHeader {
            key,
            flags,
            byte_length,
        })
    }
}

/// Splits `STAT <name> <value>` into name and value.
fn stat_fields(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "STAT" {
        return None;
    }
    let name = parts.next()?;
    let value = parts.next()?;
    Some((name, value))
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `<slabId>:<property>` with a numeric id and a word property.
fn slab_property(name: &str) -> Option<(u32, &str)> {
    let (id, property) = name.split_once(':')?;
    if !is_digits(id) || !is_word(property) {
        return None;
    }
    Some((id.parse().ok()?, property))
}

/// Per-class lines need a numeric value; global lines keep theirs raw.
fn parse_slab_line(line: &str) -> Option<StatLine> {
    let (name, value) = stat_fields(line)?;

    if let Some((slab_id, property)) = slab_property(name) {
        if !is_digits(value) {
            return None;
        }
        return Some(StatLine::SlabStat {
            slab_id,
            property: property.to_string(),
            value: value.parse().ok()?,
        });
    }
    if is_word(name) {
        return Some(StatLine::Stat {
            key: name.to_string(),
            value: value.to_string(),
        });
    }
    None
}

fn parse_item_line(line: &str) -> Option<StatLine> {
    let (name, value) = stat_fields(line)?;
    let rest = name.strip_prefix("items:")?;
    let (slab_id, property) = slab_property(rest)?;
    if !is_digits(value) {
        return None;
    }
    Some(StatLine::ItemStat {
        slab_id,
        property: property.to_string(),
        value: value.parse().ok()?,
    })
}

fn parse_stat_line(line: &str) -> Option<StatLine> {
    let (key, value) = stat_fields(line)?;
    Some(StatLine::Stat {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_cachedump_line(line: &str) -> Option<CacheDumpEntry> {
    let rest = line.strip_prefix("ITEM ")?;
    let (key, meta) = rest.split_once(char::is_whitespace)?;
    if key.is_empty() {
        return None;
    }

    // "[<descriptor>; <ttl> s]"; the descriptor may itself contain "; "
    let meta = meta.trim().strip_prefix('[')?.strip_suffix(" s]")?;
    let (descriptor, ttl) = meta.rsplit_once("; ")?;
    if !is_digits(ttl) {
        return None;
    }

    let digits: String = descriptor
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    Some(CacheDumpEntry {
        key: key.to_string(),
        descriptor: descriptor.to_string(),
        size_bytes: digits.parse().unwrap_or(0),
        expiration_epoch: ttl.parse().ok()?,
    })
}
