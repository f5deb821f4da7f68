//! Command-line arguments.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

/// Printed to stderr whenever the positional arguments are wrong.
pub const USAGE: &str = "Usage: mkhttps <upstream-host> <listen-address>";

#[derive(Debug, Parser)]
#[command(name = "mkhttps")]
#[command(version, about = "Local HTTPS front for a plain HTTP upstream", long_about = None)]
pub struct Args {
    /// host[:port] every request is forwarded to
    pub upstream: String,

    /// address:port to accept TLS connections on
    pub listen: String,

    /// Optional TOML file with listener, identity and observability settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding mkhttps.cert and mkhttps.pem (default: ~/.config)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Outcome of argument parsing that is not a runnable configuration.
#[derive(Debug)]
pub enum ArgsError {
    /// `--help` or `--version`; clap prints it and exits successfully.
    Informational(clap::Error),
    /// Anything else. The caller prints [`USAGE`] and exits with status 1.
    Usage(clap::Error),
}

impl Args {
    /// Parse from an explicit iterator, separating help output from real errors.
    pub fn try_parse_args<I, T>(iter: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter).map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ArgsError::Informational(e),
            _ => ArgsError::Usage(e),
        })
    }
}
