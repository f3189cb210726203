//! `airfoilscout` - Find the airfoil with the best lift-to-drag ratio
//!
//! This library fetches an online catalog of airfoil coordinate files,
//! estimates aerodynamic performance for each one under a user-supplied flight
//! condition, and reports the highest scoring candidate.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod airfoil;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod image_search;
pub mod logging;
pub mod pipeline;
pub mod present;

pub use airfoil::{estimate, AirfoilProfile, Candidate, FlightParameters, PerformanceRecord};
pub use catalog::{CatalogEntry, CatalogParser};
pub use config::Config;
pub use error::{Error, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use logging::init_logging;
pub use pipeline::{RunEvent, RunOutcome, ScoringPipeline};
