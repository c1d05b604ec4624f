//! Common utilities for the command-line host.

use tracing::level_filters::LevelFilter;

pub mod args;
pub mod config;
pub mod kicks;
pub mod manifest;
pub mod output;

/// Installs the global subscriber; log lines go to stderr so command output
/// stays parseable.
pub fn init_tracing(debug: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::OFF
    } else if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
