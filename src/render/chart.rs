//! Text chart renderer.
//!
//! Draws a horizontal bar per data row using the first numeric data cell.
//! Row labels are the row header values joined with " / ".

use super::{truncate, Renderer, Surface};
use crate::config::RenderRequest;
use crate::response::{Cell, QueryResultEnvelope};

/// Bar length for the largest value when zoom is enabled.
const WIDE_BAR: usize = 50;

/// Bar length for the largest value when zoom is disabled.
const NARROW_BAR: usize = 25;

/// Labels longer than this are truncated.
const MAX_LABEL_WIDTH: usize = 30;

/// Submodes drawn natively; everything else falls back to bars.
const BAR_MODES: &[&str] = &["bar", "horizontal", "stackedBar"];

/// Renders a query result as a bar chart.
pub struct ChartRenderer {
    envelope: QueryResultEnvelope,
    request: RenderRequest,
}

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq)]
struct Point {
    label: String,
    value: f64,
    display: String,
}

impl ChartRenderer {
    /// Creates a chart renderer for the given result.
    pub fn new(envelope: QueryResultEnvelope, request: RenderRequest) -> Self {
        Self { envelope, request }
    }

    /// Renders the chart to lines of text.
    pub fn render_to_lines(&self) -> Vec<String> {
        if let Some(error) = self.envelope.error.as_deref().filter(|e| !e.is_empty()) {
            return vec![format!("Error: {error}")];
        }

        let points = self.points();
        if points.is_empty() {
            return vec!["(empty result)".to_string()];
        }

        let scale = if self.request.zoom { WIDE_BAR } else { NARROW_BAR };
        let max = points
            .iter()
            .map(|p| p.value.abs())
            .fold(0.0_f64, f64::max);
        let label_width = points
            .iter()
            .map(|p| p.label.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_LABEL_WIDTH);

        let mut lines = vec![self.heading()];
        for point in &points {
            let length = if max > 0.0 && point.value > 0.0 {
                ((point.value / max) * scale as f64).round() as usize
            } else {
                0
            };
            lines.push(format!(
                "{:<label_width$} │{} {}",
                truncate(&point.label, label_width),
                "█".repeat(length),
                point.display
            ));
        }
        lines
    }

    fn heading(&self) -> String {
        let name = self.envelope.query.name.as_deref().unwrap_or("Chart");
        match self.request.mode.as_deref() {
            None => name.to_string(),
            Some(mode) if BAR_MODES.contains(&mode) => format!("{name} ({mode})"),
            Some(mode) => format!("{name} ({mode}, drawn as bars)"),
        }
    }

    /// Extracts one point per row that has a numeric data cell.
    fn points(&self) -> Vec<Point> {
        self.envelope
            .rows()
            .iter()
            .filter_map(|row| {
                let cell = row.iter().find(|c| c.numeric_value().is_some())?;
                let value = cell.numeric_value()?;
                let label = row
                    .iter()
                    .filter(|c| c.is_row_header() && !c.value.is_empty())
                    .map(|c| c.value.as_str())
                    .collect::<Vec<_>>()
                    .join(" / ");
                Some(Point {
                    label,
                    value,
                    display: display_value(cell),
                })
            })
            .collect()
    }
}

impl Renderer for ChartRenderer {
    fn render(&self, surface: &dyn Surface) {
        surface.set_text(&self.request.html_object, &self.render_to_lines().join("\n"));
    }
}

fn display_value(cell: &Cell) -> String {
    if cell.value.is_empty() {
        cell.numeric_value().map(|v| v.to_string()).unwrap_or_default()
    } else {
        cell.value.clone()
    }
}
