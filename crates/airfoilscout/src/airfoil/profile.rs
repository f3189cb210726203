//! Coordinate sets and the coordinate-file text format.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};

/// A single outline point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Chordwise position.
    pub x: f64,
    /// Thickness-wise position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An ordered airfoil outline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoordinateSet {
    points: Vec<Point>,
}

impl CoordinateSet {
    /// Create a coordinate set from points, preserving their order.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// The points in file order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest and largest y value, or `None` for an empty set.
    #[must_use]
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.points.iter().map(|p| p.y))
    }

    /// Smallest and largest x value, or `None` for an empty set.
    #[must_use]
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.points.iter().map(|p| p.x))
    }
}

impl FromIterator<Point> for CoordinateSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// A parsed coordinate file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirfoilProfile {
    /// The free-text name/description from the first line.
    pub name: String,
    /// The outline points from the remaining lines.
    pub coordinates: CoordinateSet,
}

impl AirfoilProfile {
    /// Parse the coordinate-file text format.
    ///
    /// The first line is the name. Every later line that splits on
    /// whitespace into exactly two numeric tokens becomes a point; all other
    /// lines are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is empty or no line yields a
    /// point.
    pub fn parse(text: &str, source_name: &str) -> Result<Self> {
        let mut lines = text.lines();
        let name = lines
            .next()
            .ok_or_else(|| Error::parse(source_name, "empty coordinate file"))?
            .trim()
            .to_string();

        let coordinates: CoordinateSet = lines.filter_map(parse_point).collect();
        if coordinates.is_empty() {
            return Err(Error::parse(source_name, "no coordinate lines"));
        }

        trace!(source = source_name, points = coordinates.len(), "parsed profile");
        Ok(Self { name, coordinates })
    }

    /// The first space-separated token of the name, used as a search key.
    #[must_use]
    pub fn model_token(&self) -> &str {
        model_token(&self.name)
    }
}

/// The first space-separated token of an airfoil name.
#[must_use]
pub fn model_token(name: &str) -> &str {
    name.split(' ').next().unwrap_or_default()
}

fn parse_point(line: &str) -> Option<Point> {
    let mut tokens = line.split_whitespace();
    let (x, y) = (tokens.next()?, tokens.next()?);
    if tokens.next().is_some() {
        return None;
    }
    Some(Point::new(x.parse().ok()?, y.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_profile() {
        let text = "NACA 0012 AIRFOILS\n1.0 0.0\n0.5 0.06\n0.0 0.0\n";
        let profile = AirfoilProfile::parse(text, "n0012.dat").unwrap();

        assert_eq!(profile.name, "NACA 0012 AIRFOILS");
        assert_eq!(profile.coordinates.len(), 3);
        assert_eq!(profile.coordinates.points()[1], Point::new(0.5, 0.06));
    }

    #[test]
    fn test_parse_drops_three_column_line() {
        let text = "TEST\n1.0 2.0 3.0\n0.5 0.25\n";
        let profile = AirfoilProfile::parse(text, "t.dat").unwrap();

        assert_eq!(profile.coordinates.points(), &[Point::new(0.5, 0.25)]);
    }

    #[test]
    fn test_parse_drops_non_numeric_and_blank_lines() {
        let text = "TEST\n\n  x  y\n1.0   0.0\n\t0.0\t0.1\nabc\n";
        let profile = AirfoilProfile::parse(text, "t.dat").unwrap();

        assert_eq!(
            profile.coordinates.points(),
            &[Point::new(1.0, 0.0), Point::new(0.0, 0.1)]
        );
    }

    #[test]
    fn test_parse_handles_crlf_and_exponents() {
        let text = "CRLF foil\r\n1.0E+00 -1.5e-3\r\n.5 1.\r\n";
        let profile = AirfoilProfile::parse(text, "t.dat").unwrap();

        assert_eq!(profile.name, "CRLF foil");
        assert_eq!(
            profile.coordinates.points(),
            &[Point::new(1.0, -0.0015), Point::new(0.5, 1.0)]
        );
    }

    #[test]
    fn test_parse_empty_text() {
        let err = AirfoilProfile::parse("", "empty.dat").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("empty.dat"));
    }

    #[test]
    fn test_parse_name_only() {
        let err = AirfoilProfile::parse("JUST A NAME\n", "n.dat").unwrap_err();
        assert!(err.to_string().contains("no coordinate lines"));
    }

    #[test]
    fn test_model_token() {
        let profile = AirfoilProfile::parse("E387 (Eppler)\n0 0\n", "e387.dat").unwrap();
        assert_eq!(profile.model_token(), "E387");
        assert_eq!(model_token(""), "");
    }

    #[test]
    fn test_bounds() {
        let set = CoordinateSet::new(vec![
            Point::new(1.0, 0.0),
            Point::new(0.5, 0.08),
            Point::new(0.0, -0.02),
        ]);
        assert_eq!(set.y_bounds(), Some((-0.02, 0.08)));
        assert_eq!(set.x_bounds(), Some((0.0, 1.0)));
        assert_eq!(CoordinateSet::default().y_bounds(), None);
    }

    #[test]
    fn test_coordinate_set_serializes_as_list() {
        let set = CoordinateSet::new(vec![Point::new(1.0, 0.5)]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":0.5}]"#);
    }
}
