//! Report rendering
//!
//! Column layouts follow the classic `memcached-tool` output.

use std::fmt;

use crate::report::{DisplayReport, DumpReport, FieldReport, Report, SizesReport};

const KB: f64 = 1024.0;
const MB: f64 = 1024.0 * 1024.0;

/// Formats a byte count as `1.5M`, `2.0K` or `96B`.
pub fn descriptive_size(size: f64) -> String {
    if size >= MB {
        format!("{:.1}M", size / MB)
    } else if size >= KB {
        format!("{:.1}K", size / KB)
    } else {
        format!("{}B", size)
    }
}

/// Same as [`descriptive_size`] for raw stat values; non-numeric values
/// are shown unchanged.
fn descriptive_value(value: &str) -> String {
    value
        .parse::<f64>()
        .map(descriptive_size)
        .unwrap_or_else(|_| value.to_string())
}

/// Renders the report as the text tables printed to the terminal.
pub fn render_text(report: &Report) -> String {
    report.to_string()
}

/// Renders the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Display(display) => fmt::Display::fmt(display, f),
            Report::Stats(fields) | Report::Settings(fields) => fmt::Display::fmt(fields, f),
            Report::Sizes(sizes) => fmt::Display::fmt(sizes, f),
            Report::Dumpkeys(dump) | Report::Dump(dump) => fmt::Display::fmt(dump, f),
            Report::Removeexp(dump) => fmt_removeexp(f, dump),
        }
    }
}

impl fmt::Display for DisplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  # Chunk_Size  Max_age   Pages   Count   Full?  Evicted \
             Evict_Time OOM     Used   Wasted"
        )?;
        for row in &self.slabs {
            let r = &row.record;
            writeln!(
                f,
                "{:>3} {:>10} {:>7}s {:>7} {:>7} {:>7} {:>8} {:>10} {:>3} {:>8} {:>7}%",
                row.id,
                descriptive_size(r.chunk_size as f64),
                r.age,
                r.total_pages,
                r.number,
                if row.full { "yes" } else { "no" },
                r.evicted,
                r.evicted_time,
                r.outofmemory,
                descriptive_size(r.mem_requested as f64),
                row.wasted_percent as i64,
            )?;
        }

        writeln!(f, "\nTotal:")?;
        for (key, value) in self.total.iter() {
            let value = if key == "total_malloced" {
                descriptive_value(value)
            } else {
                value.to_string()
            };
            writeln!(f, "{:<15} {:>12}", key, value)?;
        }

        let capacity = &self.capacity;
        writeln!(
            f,
            "{:<15} {:>12} (real {} - {})",
            "maxbytes",
            descriptive_size(capacity.estimate.maxbytes as f64),
            descriptive_size(capacity.estimate.real_max),
            descriptive_size(capacity.estimate.adjusted_max),
        )?;
        writeln!(
            f,
            "{:<15} {:>12}",
            "item_size_max",
            descriptive_size(capacity.item_size_max as f64)
        )?;
        writeln!(
            f,
            "{:<15} {:>12}",
            "evictions",
            capacity.evictions.as_deref().unwrap_or("-")
        )?;
        writeln!(f, "{:<15} {:>12}", "growth_factor", capacity.growth_factor)
    }
}

impl fmt::Display for FieldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>24} {:>15}", "Field", "Value")?;
        for (key, value) in self.fields.iter() {
            writeln!(f, "{:>24} {:>15}", key, value)?;
        }
        Ok(())
    }
}

impl fmt::Display for SizesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} {:>10} {:>10} {:>10}",
            "Size", "Items", "Chunk_Size", "Wasted"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<10} {:>10} {:>10} {:>9.0}%",
                descriptive_size(row.size as f64),
                row.items,
                descriptive_size(row.chunk_size),
                row.wasted_percent,
            )?;
        }
        Ok(())
    }
}

/// Key listing of `dumpkeys` and `dump`; fetched values follow their key.
impl fmt::Display for DumpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "      {:<40} {:>20} {:>10} {:>8}",
            "Key", "Expire status", "Size", "Waste"
        )?;
        for row in &self.items {
            writeln!(
                f,
                "ITEM  {:<40} {:>20} {:>10} {:>7.0}%",
                row.key,
                row.status.to_string(),
                row.size,
                row.waste_percent,
            )?;
            if let Some(value) = &row.value {
                writeln!(f, "VALUE {:<40} flags={:X}", row.key, value.flags)?;
                writeln!(f, "{}", value.data)?;
            }
        }
        Ok(())
    }
}

fn fmt_removeexp(f: &mut fmt::Formatter<'_>, report: &DumpReport) -> fmt::Result {
    writeln!(
        f,
        "      {:<40} {:>10} {:>10} {:>8}",
        "Key", "Status", "Size", "Waste"
    )?;
    for row in &report.items {
        writeln!(
            f,
            "ITEM  {:<40} {:>10} {:>10} {:>7.0}%",
            row.key,
            row.status.to_string(),
            row.size,
            row.waste_percent,
        )?;
    }
    writeln!(f, "\nRemoved {} expired keys", report.fetched)
}
