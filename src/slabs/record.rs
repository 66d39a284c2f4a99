//! Slab Record Module
//!
//! One slab class as reported by `stats slabs` and `stats items`.

use serde::Serialize;

// == Slab Record ==
/// Per-class counters. Fields the server did not report stay 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlabRecord {
    /// Allocation unit of the class in bytes
    pub chunk_size: u64,
    /// Age of the oldest item in seconds
    pub age: u64,
    /// Pages assigned to the class
    pub total_pages: u64,
    /// Items stored in the class
    pub number: u64,
    /// Items evicted before expiring
    pub evicted: u64,
    /// Seconds since the last eviction
    pub evicted_time: u64,
    /// Allocations that failed for lack of memory
    pub outofmemory: u64,
    /// Chunks never used at the end of the last page
    pub free_chunks_end: u64,
    /// Bytes requested by the stored items
    pub mem_requested: u64,
}

impl SlabRecord {
    pub fn new() -> Self {
        Self::default()
    }

    // == Apply ==
    /// Sets the field named by a slab or item property.
    ///
    /// Returns false for properties without a field; those are ignored.
    pub fn apply(&mut self, property: &str, value: u64) -> bool {
        let field = match property {
            "chunk_size" => &mut self.chunk_size,
            "age" => &mut self.age,
            "total_pages" => &mut self.total_pages,
            "number" => &mut self.number,
            "evicted" => &mut self.evicted,
            "evicted_time" => &mut self.evicted_time,
            "outofmemory" => &mut self.outofmemory,
            "free_chunks_end" => &mut self.free_chunks_end,
            "mem_requested" => &mut self.mem_requested,
            _ => return false,
        };
        *field = value;
        true
    }
}
