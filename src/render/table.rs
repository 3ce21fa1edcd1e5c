//! Text table renderer.
//!
//! Renders the flattened cellset as a box-drawn table with auto-sized
//! columns. The `sparkline` and `sparkbar` submodes add a trend column
//! built from each row's data cells.

use super::{truncate, Renderer, Surface};
use crate::config::RenderRequest;
use crate::response::{Cell, QueryResultEnvelope};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Glyphs used for trend columns, lowest to highest.
const SPARK_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Table submodes that add a trend column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrendStyle {
    Line,
    Bar,
}

impl TrendStyle {
    fn from_mode(mode: Option<&str>) -> Option<Self> {
        match mode {
            Some("sparkline") => Some(Self::Line),
            Some("sparkbar") => Some(Self::Bar),
            _ => None,
        }
    }
}

/// Renders a query result as a text table.
pub struct TableRenderer {
    envelope: QueryResultEnvelope,
    request: RenderRequest,
}

impl TableRenderer {
    /// Creates a table renderer for the given result.
    pub fn new(envelope: QueryResultEnvelope, request: RenderRequest) -> Self {
        Self { envelope, request }
    }

    /// Renders the table to lines of text.
    pub fn render_to_lines(&self) -> Vec<String> {
        if let Some(error) = self.envelope.error.as_deref().filter(|e| !e.is_empty()) {
            return vec![format!("Error: {error}")];
        }

        let grid = self.build_grid();
        if grid.is_empty() {
            return vec!["(empty result)".to_string()];
        }

        let header_rows = self.header_row_count();
        let widths = Self::calculate_column_widths(&grid);

        let mut lines = Vec::with_capacity(grid.len() + 4);
        lines.push(Self::render_border(&widths, '┌', '┬', '┐'));
        for (i, row) in grid.iter().enumerate() {
            if i == header_rows && header_rows > 0 {
                lines.push(Self::render_border(&widths, '├', '┼', '┤'));
            }
            lines.push(Self::render_row(row, &widths));
        }
        lines.push(Self::render_border(&widths, '└', '┴', '┘'));
        lines.push(self.footer(grid.len() - header_rows));
        lines
    }

    /// Number of leading rows that are column headers.
    fn header_row_count(&self) -> usize {
        self.envelope
            .rows()
            .iter()
            .take_while(|row| row.iter().any(Cell::is_column_header))
            .count()
    }

    /// Converts the cellset to display strings, padding ragged rows and
    /// appending the trend column when a trend submode is active.
    fn build_grid(&self) -> Vec<Vec<String>> {
        let rows = self.envelope.rows();
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        if column_count == 0 {
            return Vec::new();
        }

        let trend = TrendStyle::from_mode(self.request.mode.as_deref());
        let header_rows = self.header_row_count();

        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let mut out: Vec<String> = row.iter().map(|cell| cell.value.clone()).collect();
                out.resize(column_count, String::new());
                if let Some(style) = trend {
                    let cell = if i + 1 == header_rows {
                        "Trend".to_string()
                    } else if i < header_rows {
                        String::new()
                    } else {
                        let values: Vec<f64> = row.iter().filter_map(Cell::numeric_value).collect();
                        trend_glyphs(&values, style)
                    };
                    out.push(cell);
                }
                out
            })
            .collect()
    }

    /// Calculates the width of each column from its widest value.
    fn calculate_column_widths(grid: &[Vec<String>]) -> Vec<usize> {
        let column_count = grid.first().map(Vec::len).unwrap_or(0);
        let mut widths = vec![MIN_COLUMN_WIDTH; column_count];

        for row in grid {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.chars().count());
            }
        }

        widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
    }

    fn render_border(widths: &[usize], left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = widths.iter().map(|&w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(&mid.to_string()))
    }

    fn render_row(row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(value, &width)| format!(" {:<width$} ", truncate(value, width)))
            .collect();
        format!("│{}│", cells.join("│"))
    }

    fn footer(&self, data_rows: usize) -> String {
        let mut footer = format!(
            "{} row{}",
            data_rows,
            if data_rows == 1 { "" } else { "s" }
        );
        if let Some(runtime) = self.envelope.runtime {
            footer.push_str(&format!(" ({runtime}ms)"));
        }
        footer
    }
}

impl Renderer for TableRenderer {
    fn render(&self, surface: &dyn Surface) {
        surface.set_text(&self.request.html_object, &self.render_to_lines().join("\n"));
    }
}

/// Maps values onto spark glyphs, scaled between the row's min and max.
fn trend_glyphs(values: &[f64], style: TrendStyle) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let top = (SPARK_GLYPHS.len() - 1) as f64;

    let glyphs = values.iter().map(|&v| {
        let level = if span > 0.0 {
            ((v - min) / span * top).round() as usize
        } else {
            0
        };
        SPARK_GLYPHS[level.min(SPARK_GLYPHS.len() - 1)]
    });

    match style {
        TrendStyle::Line => glyphs.collect(),
        TrendStyle::Bar => glyphs.map(String::from).collect::<Vec<_>>().join(" "),
    }
}
