//! Slabs Module
//!
//! Structured slab records, their aggregation from `stats slabs` and
//! `stats items`, and the metrics derived from them.

mod aggregator;
mod expiration;
mod metrics;
mod record;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use aggregator::{collect_slab_stats, SlabStats};
pub use expiration::{process_start, ExpireStatus};
pub use metrics::{waste_percent, wasted_memory_percent, CapacityEstimate, GrowthProgression};
pub use record::SlabRecord;

// == Public Constants ==
/// Chunk size of the smallest slab class
pub const BASE_CHUNK_SIZE: f64 = 96.0;
