//! Command line definition
//!
//! `memcached-itool <host[:port] | /path/to/socket> [mode]`

use std::time::Duration;

use clap::Parser;

use crate::config::{
    Config, Mode, OutputFormat, Target, DEFAULT_TCP_TIMEOUT, DEFAULT_UNIX_TIMEOUT,
};
use crate::error::Result;

const AFTER_HELP: &str = "\
Examples:
  memcached-itool localhost:11211 display    # shows slabs information (display is default mode)
  memcached-itool localhost:11211 dumpkeys   # dumps only keys names
  memcached-itool localhost:11211 dump       # dumps keys and values, values only for non expired keys
  memcached-itool localhost:11211 removeexp  # remove expired keys (you may need run several times)
  memcached-itool localhost:11211 settings   # shows memcached settings
  memcached-itool localhost:11211 sizes      # group keys by sizes and show how many we waste memory
  memcached-itool localhost:11211 stats      # shows general stats

Warning! dumpkeys, dump, removeexp and sizes modes *will* lock up your cache! It iterates over
*every item* and examines the size. While the operation is fast, if you have many items you could
prevent memcached from serving requests for several seconds.

Warning! dump and removeexp modes influence memcached internal statistics like *expired_unfetched*
and *get_misses*. Only use them for debugging purposes.";

#[derive(Parser, Debug)]
#[command(
    name = "memcached-itool",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect memcached slabs, settings and keys over the text protocol",
    after_help = AFTER_HELP
)]
pub struct Cli {
    #[arg(value_name = "host[:port] | /path/to/socket")]
    pub address: String,

    #[arg(value_enum, default_value_t = Mode::Display)]
    pub mode: Mode,

    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,

    #[arg(short, long, help = "Log protocol traffic to stderr")]
    pub verbose: bool,

    #[arg(
        long,
        env = "ITOOL_TCP_TIMEOUT",
        default_value_t = DEFAULT_TCP_TIMEOUT,
        help = "Seconds allowed to connect over TCP"
    )]
    pub tcp_timeout: u64,

    #[arg(
        long,
        env = "ITOOL_UNIX_TIMEOUT",
        default_value_t = DEFAULT_UNIX_TIMEOUT,
        help = "Seconds allowed to connect to a Unix socket"
    )]
    pub unix_timeout: u64,
}

impl Cli {
    /// Resolves the arguments into a run configuration.
    pub fn into_config(self) -> Result<Config> {
        Ok(Config {
            target: Target::parse(&self.address)?,
            mode: self.mode,
            format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            tcp_timeout: Duration::from_secs(self.tcp_timeout),
            unix_timeout: Duration::from_secs(self.unix_timeout),
        })
    }
}
