//! Airfoil data model and performance estimation.
//!
//! - **Profiles**: an airfoil coordinate file is a free-text name line
//!   followed by two-column `x y` lines; [`AirfoilProfile::parse`] keeps the
//!   well-formed lines and drops the rest.
//!
//! - **Estimation**: [`estimate`] turns a [`CoordinateSet`] and the run's
//!   [`FlightParameters`] into a [`PerformanceRecord`] using closed-form
//!   approximations.
//!
//! - **Candidates**: a [`Candidate`] is a scored profile plus whatever
//!   enrichment the catalog provided for it.
//!
//! # Example
//!
//! ```
//! use airfoilscout::airfoil::{estimate, AirfoilProfile, FlightParameters};
//!
//! let profile = AirfoilProfile::parse("DEMO\n1.0 0.0\n0.5 0.05\n0.0 0.0\n", "demo.dat").unwrap();
//! let params = FlightParameters::new(10.0, 0.3, 2.0, 20.0, 5.0);
//! let record = estimate(&profile.coordinates, &params).unwrap();
//! assert_eq!(record.ld_ratio, record.max_cl / record.max_cd);
//! ```

mod candidate;
mod performance;
mod profile;

pub use candidate::{Candidate, CandidateSummary, Enrichment};
pub use performance::{
    estimate, FlightParameters, PerformanceRecord, AIR_DENSITY, KINEMATIC_VISCOSITY,
    OSWALD_EFFICIENCY, PI_APPROX, SPEED_OF_SOUND, STALL_ALPHA_DEG, STALL_MAX_CL,
};
pub use profile::{model_token, AirfoilProfile, CoordinateSet, Point};
