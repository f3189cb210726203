//! Command-line interface for airfoilscout.
//!
//! This module provides the CLI structure for the `afscout` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AnalyzeCommand, CatalogCommand, ConfigCommand, FlightArgs, OutputFormat, ScoreCommand,
};

/// afscout - Find the best airfoil for your aircraft
///
/// Downloads every coordinate file from an airfoil catalog, estimates lift and
/// drag for the given flight condition, and reports the airfoil with the best
/// lift-to-drag ratio.
#[derive(Debug, Parser)]
#[command(name = "afscout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score every airfoil in the catalog and report the best
    Analyze(AnalyzeCommand),

    /// Score a single local coordinate file
    Score(ScoreCommand),

    /// List the catalog entries that would be evaluated
    Catalog(CatalogCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}
