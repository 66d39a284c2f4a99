//! Report Module
//!
//! Builds the structured report of each mode and renders it as text
//! tables or JSON.

mod modes;
mod render;
mod rows;

// Re-export public types
pub use modes::{display, dump, run, sizes, DumpMode};
pub use render::{descriptive_size, render_json, render_text};
pub use rows::{
    CapacityRow, DisplayReport, DumpReport, FieldReport, KeyRow, SizeRow, SizesReport, SlabRow,
    ValueRow,
};

use serde::Serialize;

// == Report ==
/// Output of one run, tagged by mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Report {
    Display(DisplayReport),
    Stats(FieldReport),
    Settings(FieldReport),
    Sizes(SizesReport),
    Dumpkeys(DumpReport),
    Dump(DumpReport),
    Removeexp(DumpReport),
}
