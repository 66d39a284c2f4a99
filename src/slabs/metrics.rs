//! Derived Metrics Module
//!
//! Wasted memory, slab fullness and the chunk size progression used to
//! estimate how much memory the server can really take.
//!
//! Values are exact; rounding happens when a report is rendered.

use serde::Serialize;

use crate::error::{ItoolError, Result};
use crate::protocol::StatsMap;
use crate::slabs::{SlabRecord, BASE_CHUNK_SIZE};

// == Waste ==
/// Percentage of `chunk_size` left unused by an item of `size` bytes.
///
/// 0 when the chunk size is unknown.
pub fn waste_percent(size: f64, chunk_size: f64) -> f64 {
    if chunk_size <= 0.0 {
        return 0.0;
    }
    (1.0 - size / chunk_size) * 100.0
}

/// Share of the memory held by `number` chunks that items did not request.
///
/// 0 for an empty class.
pub fn wasted_memory_percent(mem_requested: u64, chunk_size: u64, number: u64) -> f64 {
    if number == 0 {
        return 0.0;
    }
    waste_percent(mem_requested as f64, chunk_size as f64 * number as f64)
}

impl SlabRecord {
    /// A class is full once no chunk is left at the end of its last page.
    pub fn is_full(&self) -> bool {
        self.free_chunks_end == 0
    }

    pub fn wasted_percent(&self) -> f64 {
        wasted_memory_percent(self.mem_requested, self.chunk_size, self.number)
    }
}

fn require_setting<T: std::str::FromStr>(settings: &StatsMap, key: &str) -> Result<T> {
    let raw = settings
        .get(key)
        .ok_or_else(|| ItoolError::MissingSetting(key.to_string()))?;
    raw.parse().map_err(|_| ItoolError::InvalidSetting {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

// == Growth Progression ==
/// Chunk sizes 96, 96·f, 96·f², … bounded by `item_size_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthProgression {
    pub growth_factor: f64,
    pub item_size_max: u64,
}

impl GrowthProgression {
    /// Validates the parameters; a factor of 1 or less never terminates.
    pub fn new(growth_factor: f64, item_size_max: u64) -> Result<Self> {
        if !growth_factor.is_finite() || growth_factor <= 1.0 {
            return Err(ItoolError::InvalidSetting {
                key: "growth_factor".to_string(),
                value: growth_factor.to_string(),
            });
        }
        if item_size_max == 0 {
            return Err(ItoolError::InvalidSetting {
                key: "item_size_max".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(Self {
            growth_factor,
            item_size_max,
        })
    }

    /// Reads `growth_factor` and `item_size_max` from `stats settings`.
    pub fn from_settings(settings: &StatsMap) -> Result<Self> {
        Self::new(
            require_setting(settings, "growth_factor")?,
            require_setting(settings, "item_size_max")?,
        )
    }

    // == Page Count ==
    /// Number of slab classes: one per chunk size whose next step stays
    /// below `item_size_max`, plus the base class.
    pub fn page_count(&self) -> u64 {
        let max = self.item_size_max as f64;
        let mut pages = 1;
        let mut chunk = BASE_CHUNK_SIZE;
        while chunk * self.growth_factor < max {
            pages += 1;
            chunk *= self.growth_factor;
        }
        pages
    }

    // == Chunk For Size ==
    /// Smallest chunk of the progression holding `size` bytes, clamped to
    /// `item_size_max`.
    pub fn chunk_for_size(&self, size: u64) -> f64 {
        let size = size as f64;
        let max = self.item_size_max as f64;
        let mut chunk = BASE_CHUNK_SIZE;
        while chunk < size && chunk < max {
            chunk *= self.growth_factor;
        }
        chunk.min(max)
    }
}

// == Capacity Estimate ==
/// How much memory the server may actually use compared to `maxbytes`.
///
/// Every class takes at least one page of `item_size_max` bytes, so a
/// small `maxbytes` can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityEstimate {
    /// Configured limit
    pub maxbytes: u64,
    /// Slab classes in the progression
    pub pages: u64,
    /// Larger of one page per class and `maxbytes`
    pub real_max: f64,
    /// One page per class on top of `maxbytes` worth of pages
    pub adjusted_max: f64,
}

impl CapacityEstimate {
    pub fn new(progression: &GrowthProgression, maxbytes: u64) -> Self {
        let page = progression.item_size_max as f64;
        let pages = progression.page_count();
        let maxbytes_f = maxbytes as f64;

        Self {
            maxbytes,
            pages,
            real_max: (page * pages as f64).max(maxbytes_f),
            adjusted_max: page * (pages as f64 + maxbytes_f / page - 1.0),
        }
    }

    /// Reads `growth_factor`, `item_size_max` and `maxbytes`.
    pub fn from_settings(settings: &StatsMap) -> Result<Self> {
        let progression = GrowthProgression::from_settings(settings)?;
        Ok(Self::new(&progression, require_setting(settings, "maxbytes")?))
    }
}
