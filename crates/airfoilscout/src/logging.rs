//! Diagnostics for airfoilscout.
//!
//! Logs go to stderr; stdout carries only results, so `--format json` output
//! can be piped. The default level is `warn`, which shows skipped catalog
//! entries and nothing else. Per-file progress appears at `-v`.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much diagnostic output to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Warnings, including skipped entries.
    #[default]
    Normal,
    /// Per-file progress and new leaders (`-v`).
    Verbose,
    /// Scores of every candidate and HTTP requests (`-vv`).
    Debug,
    /// Everything (`-vvv`).
    Trace,
}

impl Verbosity {
    /// Map the `-q` flag and the number of `-v` flags to a verbosity.
    /// `-q` wins over any number of `-v`.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, 2) => Self::Debug,
            (false, _) => Self::Trace,
        }
    }

    /// The tracing level for this verbosity.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive scoped to this crate, e.g. `airfoilscout=info`.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("{}={}", env!("CARGO_CRATE_NAME"), self.to_level_filter())
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set and valid, replaces the verbosity-derived directive.
/// Later calls are no-ops.
///
/// ```no_run
/// use airfoilscout::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Route logs through the test harness's captured output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
