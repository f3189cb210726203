//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::airfoil::FlightParameters;

/// Aircraft and flight condition shared by `analyze` and `score`.
#[derive(Debug, Clone, Copy, Args)]
pub struct FlightArgs {
    /// Aircraft weight in newtons
    #[arg(long)]
    pub weight: f64,

    /// Aircraft length (chord) in meters
    #[arg(long)]
    pub length: f64,

    /// Wingspan in meters
    #[arg(long)]
    pub wingspan: f64,

    /// Airspeed in meters per second
    #[arg(long)]
    pub speed: f64,

    /// Angle of attack in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub alpha: f64,
}

impl From<FlightArgs> for FlightParameters {
    fn from(args: FlightArgs) -> Self {
        Self::new(args.weight, args.length, args.wingspan, args.speed, args.alpha)
    }
}

/// Analyze command arguments.
#[derive(Debug, Args)]
pub struct AnalyzeCommand {
    /// Flight condition
    #[command(flatten)]
    pub flight: FlightArgs,

    /// Catalog listing URL (overrides configuration)
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// Number of simultaneous downloads (overrides configuration)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Do not plot airfoil outlines
    #[arg(long)]
    pub no_plot: bool,

    /// Skip the image lookup for the winner
    #[arg(long)]
    pub no_image_search: bool,
}

/// Score command arguments.
#[derive(Debug, Args)]
pub struct ScoreCommand {
    /// Coordinate file to evaluate
    pub file: PathBuf,

    /// Flight condition
    #[command(flatten)]
    pub flight: FlightArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Do not plot the outline
    #[arg(long)]
    pub no_plot: bool,
}

/// Catalog command arguments.
#[derive(Debug, Args)]
pub struct CatalogCommand {
    /// Catalog listing URL (overrides configuration)
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// Maximum number of entries to list
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON lines
    Json,
}
