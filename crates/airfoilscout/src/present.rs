//! Presentation of run progress and results.
//!
//! A [`Presenter`] owns all display state. During a run it is driven by
//! [`present_events`], which drains the pipeline's event channel; afterwards
//! the caller hands it the [`FinalReport`] and the winning outline to plot.

use std::io::Write;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::airfoil::{CoordinateSet, PerformanceRecord};
use crate::error::Result;
use crate::pipeline::{RunEvent, RunOutcome};

/// Shown when the winning candidate has no reference note.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Default plot width in terminal columns.
pub const DEFAULT_PLOT_WIDTH: usize = 72;

/// Format the one-line summary used for interim and final results.
#[must_use]
pub fn headline(prefix: &str, name: &str, record: &PerformanceRecord) -> String {
    format!(
        "{prefix}: {name}: L/D ratio: {:.2}, Cl: {:.2}, Cd: {:.2}",
        record.ld_ratio, record.max_cl, record.max_cd
    )
}

/// Everything shown for the winning candidate.
#[derive(Debug, Clone, Serialize)]
pub struct FinalReport {
    /// The run outcome, including the best candidate.
    #[serde(flatten)]
    pub outcome: RunOutcome,
    /// Image found by image search, if any.
    pub searched_image: Option<String>,
}

impl FinalReport {
    /// Create a report.
    #[must_use]
    pub fn new(outcome: RunOutcome, searched_image: Option<String>) -> Self {
        Self {
            outcome,
            searched_image,
        }
    }

    /// The image to show: the search result, else the catalog's plot image.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.searched_image
            .as_deref()
            .or(self.outcome.best.enrichment.image_url.as_deref())
    }

    /// The reference note, or [`NO_DESCRIPTION`].
    #[must_use]
    pub fn description(&self) -> &str {
        self.outcome
            .best
            .enrichment
            .reference
            .as_deref()
            .unwrap_or(NO_DESCRIPTION)
    }
}

/// A sink for run progress and results.
pub trait Presenter: Send {
    /// Draw an airfoil outline.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    fn plot(&mut self, coordinates: &CoordinateSet, title: &str) -> Result<()>;

    /// Show a progress message.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    fn status(&mut self, message: &str) -> Result<()>;

    /// Show the final result.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    fn final_result(&mut self, report: &FinalReport) -> Result<()>;

    /// React to a pipeline event.
    ///
    /// The default shows each new leader and the final tally.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    fn event(&mut self, event: &RunEvent) -> Result<()> {
        match event {
            RunEvent::CatalogLoaded { entries } => {
                self.status(&format!("Found {entries} airfoil files"))
            }
            RunEvent::NewBest(summary) => {
                self.status(&headline("Current Best", &summary.name, &summary.performance))
            }
            RunEvent::Finished { evaluated, skipped } => {
                self.status(&format!("Evaluated {evaluated} airfoils, skipped {skipped}"))
            }
            RunEvent::Processing { .. } | RunEvent::Skipped { .. } => Ok(()),
        }
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn plot(&mut self, coordinates: &CoordinateSet, title: &str) -> Result<()> {
        (**self).plot(coordinates, title)
    }

    fn status(&mut self, message: &str) -> Result<()> {
        (**self).status(message)
    }

    fn final_result(&mut self, report: &FinalReport) -> Result<()> {
        (**self).final_result(report)
    }

    fn event(&mut self, event: &RunEvent) -> Result<()> {
        (**self).event(event)
    }
}

/// Feed every event from `events` to `presenter` until the channel closes.
///
/// Returns the presenter so it can render the final result.
///
/// # Errors
///
/// Returns the first presenter error.
pub async fn present_events<P: Presenter>(
    mut events: mpsc::Receiver<RunEvent>,
    mut presenter: P,
) -> Result<P> {
    while let Some(event) = events.recv().await {
        presenter.event(&event)?;
    }
    Ok(presenter)
}

/// Human-readable output.
#[derive(Debug)]
pub struct TerminalPresenter<W> {
    out: W,
    plot_width: Option<usize>,
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Create a presenter that plots at the default width.
    pub fn new(out: W) -> Self {
        Self {
            out,
            plot_width: Some(DEFAULT_PLOT_WIDTH),
        }
    }

    /// Disable outline plots.
    #[must_use]
    pub fn without_plot(mut self) -> Self {
        self.plot_width = None;
        self
    }

    /// Consume the presenter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn plot(&mut self, coordinates: &CoordinateSet, title: &str) -> Result<()> {
        if let Some(width) = self.plot_width {
            write!(self.out, "{}", render_plot(coordinates, title, width))?;
        }
        Ok(())
    }

    fn status(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{message}")?;
        Ok(())
    }

    fn final_result(&mut self, report: &FinalReport) -> Result<()> {
        let best = &report.outcome.best;
        let perf = &best.performance;
        writeln!(self.out)?;
        writeln!(self.out, "{}", headline("Best Airfoil", &best.name, perf))?;
        writeln!(self.out, "  Max Cl:       {:.4}", perf.max_cl)?;
        writeln!(self.out, "  Required Cl:  {:.4}", perf.required_cl)?;
        writeln!(self.out, "  Max Cd:       {:.4}", perf.max_cd)?;
        writeln!(self.out, "  L/D ratio:    {:.4}", perf.ld_ratio)?;
        writeln!(self.out, "  Reynolds:     {:.0}", perf.reynolds_number)?;
        writeln!(self.out, "  Mach:         {:.4}", perf.mach_number)?;
        writeln!(self.out, "  Source:       {}", best.source_url)?;
        writeln!(self.out, "  Image:        {}", report.image().unwrap_or("none"))?;
        writeln!(self.out, "  Description:  {}", report.description())?;
        writeln!(
            self.out,
            "  Evaluated {} of {} files in {:.1}s",
            report.outcome.evaluated,
            report.outcome.entries,
            report.outcome.elapsed().as_secs_f64()
        )?;
        Ok(())
    }
}

/// JSON lines output: one object per event and one for the final report.
#[derive(Debug)]
pub struct JsonPresenter<W> {
    out: W,
}

impl<W: Write + Send> JsonPresenter<W> {
    /// Create a JSON presenter.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the presenter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write + Send> Presenter for JsonPresenter<W> {
    fn plot(&mut self, _coordinates: &CoordinateSet, _title: &str) -> Result<()> {
        Ok(())
    }

    fn status(&mut self, message: &str) -> Result<()> {
        self.line(&serde_json::json!({ "event": "status", "message": message }))
    }

    fn final_result(&mut self, report: &FinalReport) -> Result<()> {
        self.line(&serde_json::json!({ "event": "result", "report": report }))
    }

    fn event(&mut self, event: &RunEvent) -> Result<()> {
        self.line(event)
    }
}

/// Render an outline as an ASCII scatter plot.
///
/// Axes are scaled equally, assuming terminal cells twice as tall as wide.
/// A `-` line marks `y = 0` when it is in range.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_plot(coordinates: &CoordinateSet, title: &str, width: usize) -> String {
    let mut out = format!("{title}\n");
    let (Some((x_min, x_max)), Some((y_min, y_max))) =
        (coordinates.x_bounds(), coordinates.y_bounds())
    else {
        out.push_str("(no points)\n");
        return out;
    };

    let width = width.max(8);
    let x_span = (x_max - x_min).max(f64::EPSILON);
    let y_span = (y_max - y_min).max(f64::EPSILON);
    let ratio = y_span / x_span * width as f64 / 2.0;
    let rows = if ratio.is_finite() {
        ratio.ceil().clamp(3.0, 40.0) as usize
    } else {
        3
    };

    let row_of = |y: f64| (((y_max - y) / y_span * (rows - 1) as f64).round() as usize).min(rows - 1);
    let col_of = |x: f64| (((x - x_min) / x_span * (width - 1) as f64).round() as usize).min(width - 1);

    let mut grid = vec![vec![' '; width]; rows];
    if y_min <= 0.0 && y_max >= 0.0 {
        grid[row_of(0.0)].fill('-');
    }
    for point in coordinates.points() {
        grid[row_of(point.y)][col_of(point.x)] = '*';
    }

    for row in grid {
        let line: String = row.into_iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(&format!("x: {x_min:.3} .. {x_max:.3}   y: {y_min:.3} .. {y_max:.3}\n"));
    out
}
