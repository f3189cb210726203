//! Scored airfoil candidates.

use serde::{Deserialize, Serialize};

use super::performance::PerformanceRecord;
use super::profile::{model_token, CoordinateSet};

/// Optional catalog enrichment for a candidate.
///
/// Both fields are best-effort: `None` means the catalog had nothing usable,
/// not that extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Absolute link to a plot image listed next to the coordinate file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Reference note found in the catalog entry text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A successfully fetched, parsed and scored airfoil.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Name line from the coordinate file.
    pub name: String,

    /// Where the coordinate file was fetched from.
    pub source_url: String,

    /// The airfoil outline.
    pub coordinates: CoordinateSet,

    /// Estimated performance under the run's flight parameters.
    pub performance: PerformanceRecord,

    /// Catalog enrichment.
    pub enrichment: Enrichment,
}

impl Candidate {
    /// The ranking score (lift-to-drag ratio).
    #[must_use]
    pub fn score(&self) -> f64 {
        self.performance.score()
    }

    /// The first space-separated token of the name.
    #[must_use]
    pub fn model_token(&self) -> &str {
        model_token(&self.name)
    }

    /// A lightweight copy of the headline fields.
    #[must_use]
    pub fn summary(&self) -> CandidateSummary {
        CandidateSummary {
            name: self.name.clone(),
            source_url: self.source_url.clone(),
            performance: self.performance,
        }
    }
}

/// Headline fields of a candidate, carried by progress events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    /// Name line from the coordinate file.
    pub name: String,
    /// Where the coordinate file was fetched from.
    pub source_url: String,
    /// Estimated performance.
    pub performance: PerformanceRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airfoil::Point;

    fn candidate() -> Candidate {
        Candidate {
            name: "CLARK Y AIRFOIL".to_string(),
            source_url: "https://example.com/coord/clarky.dat".to_string(),
            coordinates: CoordinateSet::new(vec![Point::new(1.0, 0.0), Point::new(0.0, 0.0)]),
            performance: PerformanceRecord {
                max_cl: 1.2,
                required_cl: 0.4,
                max_cd: 0.1,
                ld_ratio: 12.0,
                reynolds_number: 1.0e6,
                mach_number: 0.05,
            },
            enrichment: Enrichment::default(),
        }
    }

    #[test]
    fn test_score_is_ld_ratio() {
        assert!((candidate().score() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_model_token() {
        assert_eq!(candidate().model_token(), "CLARK");
    }

    #[test]
    fn test_summary_copies_headline() {
        let c = candidate();
        let summary = c.summary();
        assert_eq!(summary.name, c.name);
        assert_eq!(summary.source_url, c.source_url);
        assert_eq!(summary.performance, c.performance);
    }

    #[test]
    fn test_enrichment_skips_absent_fields() {
        let json = serde_json::to_string(&Enrichment::default()).unwrap();
        assert_eq!(json, "{}");

        let enrichment = Enrichment {
            image_url: Some("https://example.com/a.gif".to_string()),
            reference: None,
        };
        let json = serde_json::to_string(&enrichment).unwrap();
        assert!(json.contains("image_url"));
        assert!(!json.contains("reference"));
    }
}
