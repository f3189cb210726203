//! Concurrent fetch-and-score pipeline.
//!
//! A run loads the catalog, spawns one task per entry, and reduces the
//! results to a single best [`Candidate`]. At most `concurrency` tasks hold a
//! fetch permit at any time. Finished tasks report over a channel whose only
//! reader is the reduction loop, so the running best has a single writer and
//! is updated in completion order.
//!
//! Progress is published as [`RunEvent`]s. The pipeline never renders
//! anything itself.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::airfoil::{estimate, AirfoilProfile, Candidate, CandidateSummary, Enrichment, FlightParameters};
use crate::catalog::{load_catalog, CatalogEntry, CatalogParser};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;

/// Default number of simultaneous fetches.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// The listing was fetched and parsed.
    CatalogLoaded {
        /// Number of entries that will be evaluated.
        entries: usize,
    },
    /// A coordinate file is being fetched.
    Processing {
        /// The coordinate file URL.
        url: String,
    },
    /// An entry produced no candidate.
    Skipped {
        /// The coordinate file URL.
        url: String,
        /// Why it was skipped.
        reason: String,
    },
    /// A candidate beat every candidate seen before it.
    NewBest(CandidateSummary),
    /// All entries have been processed.
    Finished {
        /// Entries that produced a candidate.
        evaluated: usize,
        /// Entries that were skipped.
        skipped: usize,
    },
}

/// The result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// The highest-scoring candidate.
    pub best: Candidate,
    /// Number of catalog entries considered.
    pub entries: usize,
    /// Entries that produced a candidate.
    pub evaluated: usize,
    /// Entries that were skipped.
    pub skipped: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
}

impl RunOutcome {
    /// Wall-clock duration of the run.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Running maximum over candidate scores.
///
/// A candidate replaces the current best only if its score is strictly
/// greater, so ties keep the earlier candidate and NaN never wins.
#[derive(Debug)]
struct BestTracker {
    best: Option<Candidate>,
    best_score: f64,
}

impl BestTracker {
    fn new() -> Self {
        Self {
            best: None,
            best_score: f64::NEG_INFINITY,
        }
    }

    /// Offer a candidate; returns the new best if it took the lead.
    fn offer(&mut self, candidate: Candidate) -> Option<&Candidate> {
        let score = candidate.score();
        if score > self.best_score {
            self.best_score = score;
            self.best = Some(candidate);
            self.best.as_ref()
        } else {
            None
        }
    }

    fn into_best(self) -> Option<Candidate> {
        self.best
    }
}

/// Fetch, parse and score a single catalog entry.
///
/// # Errors
///
/// Returns the transport, parse or data error that prevented the entry from
/// becoming a candidate.
pub async fn score_entry(
    fetcher: &dyn Fetcher,
    entry: &CatalogEntry,
    params: &FlightParameters,
) -> Result<Candidate> {
    let body = fetcher.fetch_text(&entry.data_url).await?;
    let profile = AirfoilProfile::parse(&body, entry.data_url.as_str())?;
    let performance = estimate(&profile.coordinates, params)?;

    Ok(Candidate {
        name: profile.name,
        source_url: entry.data_url.to_string(),
        coordinates: profile.coordinates,
        performance,
        enrichment: Enrichment {
            image_url: entry.image_url.as_ref().map(ToString::to_string),
            reference: entry.reference.clone(),
        },
    })
}

/// Scores every entry of a catalog and keeps the best.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<CatalogParser>,
    concurrency: usize,
    max_entries: Option<usize>,
}

impl ScoringPipeline {
    /// Create a pipeline. A concurrency of 0 is treated as 1.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, parser: CatalogParser, concurrency: usize) -> Self {
        Self {
            fetcher,
            parser: Arc::new(parser),
            concurrency: concurrency.max(1),
            max_entries: None,
        }
    }

    /// Create a pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a catalog pattern does not compile.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let parser = CatalogParser::new(&config.catalog)?;
        Ok(Self::new(fetcher, parser, config.pipeline.concurrency).with_max_entries(config.max_entries()))
    }

    /// Limit the number of catalog entries evaluated.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Number of simultaneous fetches.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Load the listing at `listing_url` and score every entry.
    ///
    /// Events are sent on `events`; a closed receiver does not affect the
    /// run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the listing cannot be fetched and
    /// [`Error::EmptyResult`] if no entry produced a candidate.
    pub async fn run(
        &self,
        listing_url: &Url,
        params: FlightParameters,
        events: mpsc::Sender<RunEvent>,
    ) -> Result<RunOutcome> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let entries = load_catalog(
            self.fetcher.as_ref(),
            &self.parser,
            listing_url,
            self.max_entries,
        )
        .await?;

        self.score_entries(entries, params, events, started_at, clock)
            .await
    }

    async fn score_entries(
        &self,
        entries: Vec<CatalogEntry>,
        params: FlightParameters,
        events: mpsc::Sender<RunEvent>,
        started_at: DateTime<Utc>,
        clock: Instant,
    ) -> Result<RunOutcome> {
        let total = entries.len();
        emit(&events, RunEvent::CatalogLoaded { entries: total }).await;
        info!(entries = total, concurrency = self.concurrency, "scoring catalog");

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let (result_tx, mut result_rx) = mpsc::channel(self.concurrency);
        let mut tasks = JoinSet::new();

        for entry in entries {
            let permits = Arc::clone(&permits);
            let fetcher = Arc::clone(&self.fetcher);
            let result_tx = result_tx.clone();
            let events = events.clone();
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                info!(url = %entry.data_url, "processing");
                emit(
                    &events,
                    RunEvent::Processing {
                        url: entry.data_url.to_string(),
                    },
                )
                .await;
                let outcome = score_entry(fetcher.as_ref(), &entry, &params).await;
                let _ = result_tx.send((entry, outcome)).await;
            });
        }
        drop(result_tx);

        let mut tracker = BestTracker::new();
        let (mut evaluated, mut skipped) = (0, 0);

        while let Some((entry, outcome)) = result_rx.recv().await {
            match outcome {
                Ok(candidate) => {
                    evaluated += 1;
                    debug!(
                        name = %candidate.name,
                        ld_ratio = candidate.score(),
                        "scored candidate"
                    );
                    if let Some(best) = tracker.offer(candidate) {
                        info!(name = %best.name, ld_ratio = best.score(), "new best candidate");
                        let summary = best.summary();
                        emit(&events, RunEvent::NewBest(summary)).await;
                    }
                }
                Err(e) => {
                    skipped += 1;
                    if e.is_candidate_local() {
                        warn!(url = %entry.data_url, error = %e, "skipping candidate");
                    } else {
                        error!(url = %entry.data_url, error = %e, "unexpected error, skipping candidate");
                    }
                    emit(
                        &events,
                        RunEvent::Skipped {
                            url: entry.data_url.to_string(),
                            reason: e.to_string(),
                        },
                    )
                    .await;
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                skipped += 1;
                warn!(error = %e, "scoring task did not complete");
            }
        }

        emit(&events, RunEvent::Finished { evaluated, skipped }).await;

        let best = tracker.into_best().ok_or(Error::EmptyResult)?;
        info!(
            name = %best.name,
            ld_ratio = best.score(),
            evaluated,
            skipped,
            "run finished"
        );

        Ok(RunOutcome {
            best,
            entries: total,
            evaluated,
            skipped,
            started_at,
            elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}

async fn emit(events: &mpsc::Sender<RunEvent>, event: RunEvent) {
    // Nobody listening is fine.
    let _ = events.send(event).await;
}
