//! `afscout` - CLI for airfoilscout
//!
//! This binary scores the airfoils of an online coordinate catalog for a
//! given flight condition and reports the best one.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reqwest::Url;
use tokio::sync::mpsc;
use tracing::debug;

use airfoilscout::airfoil::{estimate, AirfoilProfile, FlightParameters};
use airfoilscout::catalog::{load_catalog, CatalogParser};
use airfoilscout::cli::{
    AnalyzeCommand, CatalogCommand, Cli, Command, ConfigCommand, OutputFormat, ScoreCommand,
};
use airfoilscout::fetch::{Fetcher, HttpFetcher};
use airfoilscout::image_search::ImageSearch;
use airfoilscout::present::{
    headline, present_events, render_plot, FinalReport, JsonPresenter, Presenter,
    TerminalPresenter, DEFAULT_PLOT_WIDTH,
};
use airfoilscout::{init_logging, Config, ScoringPipeline};

/// Capacity of the channel between the pipeline and the presenter.
const EVENT_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Only the commands that use the configuration fail on a bad one.
    match cli.command {
        Command::Analyze(cmd) => handle_analyze(load_config(cli.config)?, cmd).await,
        Command::Score(cmd) => handle_score(&cmd),
        Command::Catalog(cmd) => handle_catalog(load_config(cli.config)?, cmd).await,
        Command::Config(cmd) => handle_config(cli.config, cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

fn presenter(format: OutputFormat, no_plot: bool) -> Box<dyn Presenter> {
    match format {
        OutputFormat::Json => Box::new(JsonPresenter::new(io::stdout())),
        OutputFormat::Plain if no_plot => Box::new(TerminalPresenter::new(io::stdout()).without_plot()),
        OutputFormat::Plain => Box::new(TerminalPresenter::new(io::stdout())),
    }
}

async fn handle_analyze(mut config: Config, cmd: AnalyzeCommand) -> anyhow::Result<()> {
    if let Some(url) = cmd.catalog_url {
        config.catalog.url = url;
    }
    if let Some(concurrency) = cmd.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if cmd.no_image_search {
        config.image_search.enabled = false;
    }
    config.validate()?;

    let listing_url = Url::parse(&config.catalog.url)?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(&config)?);
    let pipeline = ScoringPipeline::from_config(&config, Arc::clone(&fetcher))?;
    let image_search = ImageSearch::from_config(&config.image_search, fetcher)?;
    let params = FlightParameters::from(cmd.flight);
    debug!(?params, concurrency = pipeline.concurrency(), "starting analysis");

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let drain = tokio::spawn(present_events(events_rx, presenter(cmd.format, cmd.no_plot)));

    let result = pipeline.run(&listing_url, params, events_tx).await;
    let mut presenter = drain.await.context("presenter task panicked")??;
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_empty_result() => {
            anyhow::bail!("no airfoil in {listing_url} could be scored (rerun with -v for details)")
        }
        Err(e) => return Err(e.into()),
    };

    let searched_image = match &image_search {
        Some(search) => search.lookup(outcome.best.model_token()).await,
        None => None,
    };

    presenter.plot(&outcome.best.coordinates, &outcome.best.name)?;
    presenter.final_result(&FinalReport::new(outcome, searched_image))?;
    Ok(())
}

fn handle_score(cmd: &ScoreCommand) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let profile = AirfoilProfile::parse(&text, &cmd.file.display().to_string())?;
    let record = estimate(&profile.coordinates, &FlightParameters::from(cmd.flight))?;

    match cmd.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "name": profile.name,
                "file": cmd.file,
                "points": profile.coordinates.len(),
                "score": record.score(),
                "performance": record,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if !cmd.no_plot {
                print!(
                    "{}",
                    render_plot(&profile.coordinates, &profile.name, DEFAULT_PLOT_WIDTH)
                );
            }
            println!("{}", headline("Airfoil", &profile.name, &record));
            println!("  Points:       {}", profile.coordinates.len());
            println!("  Max Cl:       {:.4}", record.max_cl);
            println!("  Required Cl:  {:.4}", record.required_cl);
            println!("  Max Cd:       {:.4}", record.max_cd);
            println!("  L/D ratio:    {:.4}", record.ld_ratio);
            println!("  Reynolds:     {:.0}", record.reynolds_number);
            println!("  Mach:         {:.4}", record.mach_number);
        }
    }
    Ok(())
}

async fn handle_catalog(mut config: Config, cmd: CatalogCommand) -> anyhow::Result<()> {
    if let Some(url) = cmd.catalog_url {
        config.catalog.url = url;
    }
    config.validate()?;

    let listing_url = Url::parse(&config.catalog.url)?;
    let fetcher = HttpFetcher::from_config(&config)?;
    let parser = CatalogParser::new(&config.catalog)?;
    let limit = cmd.limit.or_else(|| config.max_entries());
    let entries = load_catalog(&fetcher, &parser, &listing_url, limit).await?;

    match cmd.format {
        OutputFormat::Json => {
            for entry in &entries {
                println!("{}", serde_json::to_string(&entry.to_json())?);
            }
        }
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{:<24} {}", entry.label, entry.data_url);
                if let Some(image) = &entry.image_url {
                    println!("{:<24} image: {image}", "");
                }
                if let Some(reference) = &entry.reference {
                    println!("{:<24} ref:   {reference}", "");
                }
            }
            println!();
            println!("{} entries", entries.len());
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = &load_config(config_path)?;
            if json {
                let mut shown = config.clone();
                if shown.image_search.api_key.is_some() {
                    shown.image_search.api_key = Some("<redacted>".to_string());
                }
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Catalog]");
                println!("  URL:                {}", config.catalog.url);
                println!("  Max entries:        {}", config.catalog.max_entries);
                println!("  Data pattern:       {}", config.catalog.data_file_pattern);
                println!("  Image pattern:      {}", config.catalog.image_file_pattern);
                println!("  Reference marker:   {}", config.catalog.reference_marker);
                println!();
                println!("[Pipeline]");
                println!("  Concurrency:        {}", config.pipeline.concurrency);
                println!(
                    "  Timeout (secs):     {}",
                    config.pipeline.request_timeout_secs
                );
                println!("  User agent:         {}", config.pipeline.user_agent);
                println!();
                println!("[Image search]");
                println!("  Enabled:            {}", config.image_search.enabled);
                println!("  Endpoint:           {}", config.image_search.endpoint);
                println!(
                    "  Credentials:        {}",
                    if config.image_search.is_active() {
                        "configured"
                    } else {
                        "missing"
                    }
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
