//! memcached-itool - Diagnostic client for the memcached statistics protocol
//!
//! Reads slab, item, settings and cache dump statistics over the text
//! protocol and turns them into reports on memory layout, waste and key
//! expiration.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod report;
pub mod slabs;

pub use client::StatsClient;
pub use config::{Config, Mode, Target};
pub use error::{ItoolError, Result};
