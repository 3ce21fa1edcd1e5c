//! Query result types for saiku-embed.
//!
//! Models the JSON envelope returned by the export endpoint. Only the fields
//! this crate reads are typed; everything else is kept in `extra` so
//! renderers supplied by the embedding application still see it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Property carrying the server-preferred render kind.
pub const RENDER_MODE_PROPERTY: &str = "saiku.ui.render.mode";

/// Property carrying the server-preferred render submode.
pub const RENDER_TYPE_PROPERTY: &str = "saiku.ui.render.type";

/// Cell type markers used by the flattened formatter.
pub const COLUMN_HEADER: &str = "COLUMN_HEADER";
pub const ROW_HEADER: &str = "ROW_HEADER";
pub const ROW_HEADER_HEADER: &str = "ROW_HEADER_HEADER";
pub const DATA_CELL: &str = "DATA_CELL";

/// The response of one export request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResultEnvelope {
    /// The query that produced this result, including its properties bag.
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: QueryInfo,

    /// Result grid, row-major.
    #[serde(default)]
    pub cellset: Option<Vec<Vec<Cell>>>,

    /// Number of rows in `cellset`.
    #[serde(default)]
    pub height: Option<u64>,

    /// Number of columns in `cellset`.
    #[serde(default)]
    pub width: Option<u64>,

    /// Server-side execution time in milliseconds.
    #[serde(default)]
    pub runtime: Option<u64>,

    /// Server-side error message, if the query itself failed.
    #[serde(default)]
    pub error: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryResultEnvelope {
    /// Returns the render kind hint, if the server sent a non-empty one.
    pub fn render_mode_hint(&self) -> Option<&str> {
        self.query.property_str(RENDER_MODE_PROPERTY)
    }

    /// Returns the render submode hint, if the server sent a non-empty one.
    pub fn render_type_hint(&self) -> Option<&str> {
        self.query.property_str(RENDER_TYPE_PROPERTY)
    }

    /// Returns the result rows, or an empty slice when there is no cellset.
    pub fn rows(&self) -> &[Vec<Cell>] {
        self.cellset.as_deref().unwrap_or(&[])
    }

    /// Returns true if the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

/// Deserializes an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Query metadata echoed by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    #[serde(default)]
    pub name: Option<String>,

    /// Free-form properties, including presentation hints.
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryInfo {
    /// Returns a string property, treating null and empty strings as absent.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        match self.properties.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// One cell of the flattened result grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Formatted value as shown to users.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,

    /// Cell type marker (`COLUMN_HEADER`, `ROW_HEADER`, `DATA_CELL`, ...).
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub cell_type: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
}

impl Cell {
    /// Creates a cell with the given value and type.
    pub fn new(value: impl Into<String>, cell_type: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            cell_type: cell_type.into(),
            properties: Map::new(),
        }
    }

    pub fn is_column_header(&self) -> bool {
        self.cell_type == COLUMN_HEADER || self.cell_type == ROW_HEADER_HEADER
    }

    pub fn is_row_header(&self) -> bool {
        self.cell_type == ROW_HEADER
    }

    pub fn is_data(&self) -> bool {
        self.cell_type == DATA_CELL
    }

    /// Returns the numeric value of a data cell.
    ///
    /// Prefers the unformatted `raw` property; falls back to the formatted
    /// value with grouping separators removed.
    pub fn numeric_value(&self) -> Option<f64> {
        if !self.is_data() {
            return None;
        }
        match self.properties.get("raw") {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => {
                if let Ok(x) = s.trim().parse() {
                    return Some(x);
                }
            }
            _ => {}
        }
        let cleaned: String = self
            .value
            .chars()
            .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
            .collect();
        cleaned.parse().ok()
    }
}
