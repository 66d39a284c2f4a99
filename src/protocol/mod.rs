//! Protocol Module
//!
//! Transport, line-oriented request/response exchange and reply line
//! classification for the memcached text protocol.

mod parser;
mod reader;
mod stats_map;
mod transport;

// Re-export public types
pub use parser::{CacheDumpEntry, ResponseKind, StatLine, ValueHeader};
pub use reader::LineReader;
pub use stats_map::StatsMap;
pub use transport::{connect, Transport};

// == Public Constants ==
/// Line that ends every multi-line reply
pub const TERMINATOR: &str = "END";

/// Line ending used by the protocol
pub const CRLF: &str = "\r\n";
