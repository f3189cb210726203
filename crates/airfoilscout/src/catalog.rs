//! Catalog listing extraction.
//!
//! The catalog is an HTML page whose anchors point at coordinate files. Each
//! such anchor becomes a [`CatalogEntry`]. An entry extends from its anchor to
//! the next coordinate-file anchor or the next block boundary (`<br>`, list
//! item, paragraph or table row), whichever comes first; enrichment is only
//! looked for inside that extent.
//!
//! Markup is not parsed into a tree. The listing format is loose and only a
//! handful of facts are needed, so anchors are located with regexes and
//! everything else is treated as text.

use regex::Regex;
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;

const ANCHOR_PATTERN: &str = r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))[^>]*>(.*?)</a\s*>"#;
const BOUNDARY_PATTERN: &str = r"(?i)<br\b|</?li\b|</?p\b|</?tr\b";
const TAG_PATTERN: &str = r"(?s)<[^>]*>";
const COMMENT_PATTERN: &str = r"(?s)<!--.*?-->";
const ENTITY_PATTERN: &str = r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,7});";

/// One coordinate file listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Visible anchor text, or the file name when the anchor has none.
    pub label: String,
    /// Absolute URL of the coordinate file.
    pub data_url: Url,
    /// Absolute URL of the plot image linked right after the data file.
    /// `None` when the next link in the entry is missing or not an image.
    pub image_url: Option<Url>,
    /// Text following the reference marker in the entry.
    /// `None` when the marker is absent or nothing follows it.
    pub reference: Option<String>,
}

#[derive(Debug)]
struct Anchor<'a> {
    start: usize,
    end: usize,
    href: &'a str,
    inner: &'a str,
}

/// Extracts [`CatalogEntry`] values from listing markup.
#[derive(Debug, Clone)]
pub struct CatalogParser {
    data_pattern: Regex,
    image_pattern: Regex,
    reference_marker: String,
    anchor: Regex,
    boundary: Regex,
    tag: Regex,
    comment: Regex,
    entity: Regex,
}

impl CatalogParser {
    /// Build a parser from the catalog configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a pattern does not compile.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Ok(Self {
            data_pattern: compile(&config.data_file_pattern)?,
            image_pattern: compile(&config.image_file_pattern)?,
            reference_marker: config.reference_marker.clone(),
            anchor: compile(ANCHOR_PATTERN)?,
            boundary: compile(BOUNDARY_PATTERN)?,
            tag: compile(TAG_PATTERN)?,
            comment: compile(COMMENT_PATTERN)?,
            entity: compile(ENTITY_PATTERN)?,
        })
    }

    /// Extract all coordinate-file entries, in document order.
    ///
    /// Relative links are resolved against `base`. Links that cannot be
    /// resolved are skipped, and anything inside an HTML comment is ignored.
    #[must_use]
    pub fn parse(&self, html: &str, base: &Url) -> Vec<CatalogEntry> {
        let uncommented = self.comment.replace_all(html, "");
        let html: &str = &uncommented;
        let anchors: Vec<Anchor<'_>> = self
            .anchor
            .captures_iter(html)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let href = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
                Some(Anchor {
                    start: whole.start(),
                    end: whole.end(),
                    href: href.as_str().trim(),
                    inner: caps.get(4).map_or("", |m| m.as_str()),
                })
            })
            .collect();

        let data_positions: Vec<usize> = anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| self.data_pattern.is_match(a.href))
            .map(|(i, _)| i)
            .collect();

        let mut entries = Vec::with_capacity(data_positions.len());
        for (n, &i) in data_positions.iter().enumerate() {
            let anchor = &anchors[i];
            let next_data_start = data_positions
                .get(n + 1)
                .map_or(html.len(), |&j| anchors[j].start);
            let extent_end = self
                .boundary
                .find_at(html, anchor.end)
                .map_or(next_data_start, |m| m.start().min(next_data_start));

            let data_url = match base.join(anchor.href) {
                Ok(url) => url,
                Err(e) => {
                    warn!(href = anchor.href, error = %e, "skipping unresolvable catalog link");
                    continue;
                }
            };

            let image_url = anchors
                .get(i + 1)
                .filter(|next| next.start < extent_end && self.image_pattern.is_match(next.href))
                .and_then(|next| base.join(next.href).ok());

            let reference = self.reference(&html[anchor.start..extent_end]);

            let mut label = self.text(anchor.inner);
            if label.is_empty() {
                label = file_name(&data_url).to_string();
            }

            entries.push(CatalogEntry {
                label,
                data_url,
                image_url,
                reference,
            });
        }

        debug!(
            anchors = anchors.len(),
            entries = entries.len(),
            "parsed catalog listing"
        );
        entries
    }

    /// The text between the first and second occurrence of the marker.
    fn reference(&self, fragment: &str) -> Option<String> {
        let text = self.text(fragment);
        let mut parts = text.split(self.reference_marker.as_str());
        parts.next();
        let note = parts
            .next()?
            .trim()
            .trim_start_matches([':', '.'])
            .trim();
        (!note.is_empty()).then(|| note.to_string())
    }

    /// Replace character references; unknown ones are kept verbatim.
    fn decode_entities(&self, text: &str) -> String {
        self.entity
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let body = &caps[1];
                let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                } else if let Some(dec) = body.strip_prefix('#') {
                    dec.parse().ok().and_then(char::from_u32)
                } else {
                    named_entity(body)
                };
                decoded.map_or_else(|| caps[0].to_string(), String::from)
            })
            .into_owned()
    }

    /// Visible text of a markup fragment, with whitespace collapsed.
    fn text(&self, fragment: &str) -> String {
        let stripped = self.tag.replace_all(fragment, " ");
        self.decode_entities(&stripped)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Fetch the listing at `url` and extract its entries.
///
/// # Errors
///
/// Returns [`Error::Transport`] if the listing cannot be retrieved; this is
/// fatal for a run.
pub async fn load_catalog(
    fetcher: &dyn Fetcher,
    parser: &CatalogParser,
    url: &Url,
    limit: Option<usize>,
) -> Result<Vec<CatalogEntry>> {
    let html = fetcher.fetch_text(url).await?;
    let mut entries = parser.parse(&html, url);
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    info!(%url, entries = entries.len(), "loaded catalog");
    Ok(entries)
}

impl CatalogEntry {
    /// JSON view of the entry for machine-readable listings.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "label": self.label,
            "data_url": self.data_url.as_str(),
            "image_url": self.image_url.as_ref().map(Url::as_str),
            "reference": self.reference,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::config(format!("invalid regex pattern {pattern}: {e}")))
}

fn file_name(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_else(|| url.as_str())
}

/// Characters for the named entities that show up in catalog text.
fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "hellip" => '\u{2026}',
        "deg" => '\u{B0}',
        "micro" => '\u{B5}',
        "copy" => '\u{A9}',
        "reg" => '\u{AE}',
        "szlig" => '\u{DF}',
        _ => return latin1_letter(name),
    };
    Some(c)
}

/// Accented Latin-1 letters such as `ouml`, `eacute` or `Aring`.
fn latin1_letter(name: &str) -> Option<char> {
    const ACCENTS: [(&str, &str, &str); 6] = [
        ("grave", "AEIOU", "\u{C0}\u{C8}\u{CC}\u{D2}\u{D9}"),
        ("acute", "AEIOUY", "\u{C1}\u{C9}\u{CD}\u{D3}\u{DA}\u{DD}"),
        ("circ", "AEIOU", "\u{C2}\u{CA}\u{CE}\u{D4}\u{DB}"),
        ("tilde", "ANO", "\u{C3}\u{D1}\u{D5}"),
        ("uml", "AEIOU", "\u{C4}\u{CB}\u{CF}\u{D6}\u{DC}"),
        ("ring", "A", "\u{C5}"),
    ];
    let mut chars = name.chars();
    let letter = chars.next()?;
    let accent = chars.as_str();
    if name == "ccedil" || name == "Ccedil" {
        return Some(if letter.is_lowercase() { '\u{E7}' } else { '\u{C7}' });
    }
    let (_, letters, upper) = ACCENTS.iter().find(|(a, _, _)| *a == accent)?;
    let index = letters.find(letter.to_ascii_uppercase())?;
    let upper = upper.chars().nth(index)?;
    if letter.is_lowercase() {
        // Latin-1 lowercase letters sit 0x20 above their uppercase forms.
        char::from_u32(u32::from(upper) + 0x20)
    } else {
        Some(upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    const LISTING: &str = r#"
<html><body>
<h1>Airfoil Coordinates</h1>
<ul>
<li><a href="coord/a18.dat">A18</a> \ <a href="afplots/a18.gif">plot</a> Archer A18 (original). Ref: Archer Sailplanes</li>
<li><a href='coord/clarky.dat'>CLARK Y</a> Clark Y, no plot listed</li>
<li><a href=coord/e387.dat>E387</a> <a href="notes/e387.html">notes</a> Ref Eppler 387</li>
<li><a href="https://mirror.example.org/foils/n0012.DAT"></a></li>
</ul>
<p>See also <a href="index.html">home</a></p>
</body></html>
"#;

    fn parser() -> CatalogParser {
        CatalogParser::new(&CatalogConfig::default()).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://m-selig.ae.illinois.edu/ads/coord_database.html").unwrap()
    }

    #[test]
    fn test_parse_finds_data_links_in_order() {
        let entries = parser().parse(LISTING, &base());
        let urls: Vec<&str> = entries.iter().map(|e| e.data_url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://m-selig.ae.illinois.edu/ads/coord/a18.dat",
                "https://m-selig.ae.illinois.edu/ads/coord/clarky.dat",
                "https://m-selig.ae.illinois.edu/ads/coord/e387.dat",
                "https://mirror.example.org/foils/n0012.DAT",
            ]
        );
    }

    #[test]
    fn test_parse_sibling_image() {
        let entries = parser().parse(LISTING, &base());

        assert_eq!(
            entries[0].image_url.as_ref().map(Url::as_str),
            Some("https://m-selig.ae.illinois.edu/ads/afplots/a18.gif")
        );
        assert!(entries[1].image_url.is_none());
        // The next link exists but is not an image.
        assert!(entries[2].image_url.is_none());
    }

    #[test]
    fn test_parse_reference_note() {
        let entries = parser().parse(LISTING, &base());

        assert_eq!(entries[0].reference.as_deref(), Some("Archer Sailplanes"));
        assert!(entries[1].reference.is_none());
        assert_eq!(entries[2].reference.as_deref(), Some("Eppler 387"));
    }

    #[test]
    fn test_parse_label_falls_back_to_file_name() {
        let entries = parser().parse(LISTING, &base());

        assert_eq!(entries[0].label, "A18");
        assert_eq!(entries[1].label, "CLARK Y");
        assert_eq!(entries[3].label, "n0012.DAT");
    }

    #[test]
    fn test_entry_extent_stops_at_next_data_link() {
        let html = r#"<a href="a.dat">A</a> <a href="b.dat">B</a> <a href="b.gif">g</a> Ref: only B"#;
        let entries = parser().parse(html, &base());

        assert_eq!(entries.len(), 2);
        assert!(entries[0].image_url.is_none());
        assert!(entries[0].reference.is_none());
        assert!(entries[1].image_url.is_some());
        assert_eq!(entries[1].reference.as_deref(), Some("only B"));
    }

    #[test]
    fn test_entry_extent_stops_at_line_break() {
        let html = r#"<a href="a.dat">A</a><br><a href="a.gif">g</a> Ref: other"#;
        let entries = parser().parse(html, &base());

        assert_eq!(entries.len(), 1);
        assert!(entries[0].image_url.is_none());
        assert!(entries[0].reference.is_none());
    }

    #[test]
    fn test_reference_stops_at_second_marker() {
        let html = r#"<a href="a.dat">A</a> Ref: first &amp; only Ref: second"#;
        let entries = parser().parse(html, &base());

        assert_eq!(entries[0].reference.as_deref(), Some("first & only"));
    }

    #[test]
    fn test_reference_marker_with_nothing_after() {
        let html = r#"<a href="a.dat">A</a> Ref"#;
        let entries = parser().parse(html, &base());

        assert!(entries[0].reference.is_none());
    }

    #[test]
    fn test_parse_no_matching_links() {
        let html = r#"<a href="index.html">home</a> <a href="plot.gif">plot</a>"#;
        assert!(parser().parse(html, &base()).is_empty());
    }

    #[test]
    fn test_parse_ignores_commented_out_links() {
        let html = r#"<!-- <a href="coord/old.dat">old</a>
<a href="afplots/old.gif">plot</a> --><li><a href="coord/goe.dat">GOE</a> Ref: Goettingen</li>"#;
        let entries = parser().parse(html, &base());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "GOE");
        assert_eq!(
            entries[0].data_url.as_str(),
            "https://m-selig.ae.illinois.edu/ads/coord/goe.dat"
        );
        assert_eq!(entries[0].reference.as_deref(), Some("Goettingen"));
    }

    #[test]
    fn test_reference_decodes_character_references() {
        let html = r#"<a href="goe.dat">GOE</a> Ref: G&ouml;ttingen &#8211; AVA &#x2F; Pr&eacute;vost &Ccedil;a &bogus;"#;
        let entries = parser().parse(html, &base());

        assert_eq!(
            entries[0].reference.as_deref(),
            Some("G\u{F6}ttingen \u{2013} AVA / Pr\u{E9}vost \u{C7}a &bogus;")
        );
    }

    #[test]
    fn test_custom_patterns() {
        let config = CatalogConfig {
            data_file_pattern: r"\.txt$".to_string(),
            reference_marker: "Source".to_string(),
            ..CatalogConfig::default()
        };
        let parser = CatalogParser::new(&config).unwrap();
        let html = r#"<a href="x.txt">X</a> Source: lab notes<br><a href="y.dat">Y</a>"#;
        let entries = parser.parse(html, &base());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].reference.as_deref(), Some("lab notes"));
    }

    #[test]
    fn test_entry_to_json() {
        let entries = parser().parse(LISTING, &base());
        let json = entries[0].to_json();

        assert_eq!(json["label"], "A18");
        assert_eq!(
            json["image_url"],
            "https://m-selig.ae.illinois.edu/ads/afplots/a18.gif"
        );
        assert!(entries[1].to_json()["image_url"].is_null());
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config = CatalogConfig {
            data_file_pattern: "[".to_string(),
            ..CatalogConfig::default()
        };
        assert!(matches!(
            CatalogParser::new(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_catalog_applies_limit() {
        let url = base();
        let fetcher = StaticFetcher::new().body(url.as_str(), LISTING);

        let entries = load_catalog(&fetcher, &parser(), &url, Some(2)).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_load_catalog_unreachable() {
        let url = base();
        let fetcher = StaticFetcher::new().status(url.as_str(), 503);

        let err = load_catalog(&fetcher, &parser(), &url, None).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
