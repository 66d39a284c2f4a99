//! Report modes
//!
//! Each mode drives the client through its command sequence and returns
//! the structured report.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::client::StatsClient;
use crate::config::Mode;
use crate::error::Result;
use crate::report::{
    CapacityRow, DisplayReport, DumpReport, FieldReport, KeyRow, Report, SizeRow, SizesReport,
    SlabRow, ValueRow,
};
use crate::slabs::{process_start, waste_percent, CapacityEstimate, ExpireStatus, GrowthProgression};

// == Dump Mode ==
/// What a cache dump does beyond listing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMode {
    /// Keys only
    KeysOnly,
    /// Fetch values of items that have not expired
    KeyValues,
    /// Fetch expired items so the server drops them
    RemoveExpired,
}

/// Produces the report for `mode`; `now` is the current Unix time.
pub async fn run<S>(client: &mut StatsClient<S>, mode: Mode, now: i64) -> Result<Report>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let report = match mode {
        Mode::Display => Report::Display(display(client).await?),
        Mode::Stats => Report::Stats(FieldReport {
            fields: client.general_stats().await?,
        }),
        Mode::Settings => Report::Settings(FieldReport {
            fields: client.settings().await?,
        }),
        Mode::Sizes => Report::Sizes(sizes(client).await?),
        Mode::Dumpkeys => Report::Dumpkeys(dump(client, DumpMode::KeysOnly, now).await?),
        Mode::Dump => Report::Dump(dump(client, DumpMode::KeyValues, now).await?),
        Mode::Removeexp => Report::Removeexp(dump(client, DumpMode::RemoveExpired, now).await?),
    };
    Ok(report)
}

// == Display ==
/// Slab table, global totals and the memory ceiling estimate.
pub async fn display<S>(client: &mut StatsClient<S>) -> Result<DisplayReport>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let slabs = client.slab_stats().await?;
    let settings = client.settings().await?;
    let estimate = CapacityEstimate::from_settings(&settings)?;
    let progression = GrowthProgression::from_settings(&settings)?;

    Ok(DisplayReport {
        slabs: slabs
            .iter()
            .map(|(id, record)| SlabRow::new(id, record))
            .collect(),
        total: slabs.total,
        capacity: CapacityRow {
            estimate,
            item_size_max: progression.item_size_max,
            growth_factor: progression.growth_factor,
            evictions: settings.get("evictions").map(String::from),
        },
    })
}

// == Sizes ==
/// Observed item sizes against the chunk they land in.
pub async fn sizes<S>(client: &mut StatsClient<S>) -> Result<SizesReport>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let settings = client.settings().await?;
    let progression = GrowthProgression::from_settings(&settings)?;

    let rows = client
        .sizes()
        .await?
        .into_iter()
        .map(|(size, items)| {
            let chunk_size = progression.chunk_for_size(size);
            SizeRow {
                size,
                items,
                chunk_size,
                wasted_percent: waste_percent(size as f64, chunk_size),
            }
        })
        .collect();

    Ok(SizesReport { rows })
}

// == Dump ==
/// Walks every populated slab class with `stats cachedump`.
///
/// In [`DumpMode::RemoveExpired`] every expired key is fetched, which
/// makes the server evict it and changes its `get_misses` and
/// `expired_unfetched` counters.
pub async fn dump<S>(client: &mut StatsClient<S>, mode: DumpMode, now: i64) -> Result<DumpReport>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let slabs = client.slab_stats().await?;
    let started = process_start(&client.general_stats().await?)?;

    let mut report = DumpReport {
        items: Vec::new(),
        fetched: 0,
    };

    for (slab_id, record) in slabs.populated() {
        let entries = client.cachedump(slab_id, record.number).await?;
        debug!("Slab {} dumped {} keys", slab_id, entries.len());

        for entry in entries {
            let status = ExpireStatus::classify(entry.expiration_epoch, now, started);
            let mut row = KeyRow::new(slab_id, record.chunk_size, entry, status);

            match mode {
                DumpMode::KeyValues if !status.is_expired() => {
                    row.value = client.get(&row.key).await?.map(|value| ValueRow {
                        flags: value.header.flags,
                        data: value.data,
                    });
                    report.fetched += 1;
                }
                DumpMode::RemoveExpired if status.is_expired() => {
                    client.get(&row.key).await?;
                    report.fetched += 1;
                }
                _ => {}
            }

            report.items.push(row);
        }
    }

    if mode == DumpMode::RemoveExpired {
        info!("Requested removal of {} expired keys", report.fetched);
    }
    Ok(report)
}
