//! Report value types
//!
//! Cell values, report rows, colors and the descriptors returned to callers.

use crate::domain::errors::ReportError;
use crate::domain::result::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A scalar spreadsheet cell
///
/// The empty cell is the empty string; missing cells in remote responses are
/// materialized as `Text("")` rather than omitted.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// The empty cell
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            // Whole numbers go out as integers so ids don't render as "1.0"
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::String(s) => CellValue::Text(s),
            serde_json::Value::Number(n) => CellValue::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Null => CellValue::empty(),
            other => CellValue::Text(other.to_string()),
        })
    }
}

/// An ordered sequence of cells aligned with a section's columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRow(pub Vec<CellValue>);

impl ReportRow {
    pub fn cells(&self) -> &[CellValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<CellValue>> for ReportRow {
    fn from(cells: Vec<CellValue>) -> Self {
        ReportRow(cells)
    }
}

/// Converts rows into the plain matrix the value endpoints expect
pub fn rows_to_matrix(rows: &[ReportRow]) -> Vec<Vec<CellValue>> {
    rows.iter().map(|r| r.0.clone()).collect()
}

/// Fills gaps in a ragged value matrix with empty cells
///
/// Rows are widened to `width` (or the widest row when unbounded) and the
/// matrix is extended to `height` rows when given.
pub fn pad_matrix(
    mut rows: Vec<Vec<CellValue>>,
    width: Option<usize>,
    height: Option<usize>,
) -> Vec<Vec<CellValue>> {
    if let Some(height) = height {
        if rows.len() < height {
            rows.resize_with(height, Vec::new);
        }
    }
    let width = width.unwrap_or_else(|| rows.iter().map(Vec::len).max().unwrap_or_default());
    for row in &mut rows {
        if row.len() < width {
            row.resize_with(width, CellValue::empty);
        }
    }
    rows
}

/// Color with normalized channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    red: f64,
    green: f64,
    blue: f64,
}

impl Rgb {
    /// Header background of every export
    pub const BRAND_HEADER: Rgb = Rgb {
        red: 0.1,
        green: 0.35,
        blue: 0.2,
    };
    pub const WHITE: Rgb = Rgb {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };
    pub const BLACK: Rgb = Rgb {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };
    /// Default header background of `format_range_header`
    pub const LIGHT_GREY: Rgb = Rgb {
        red: 0.9,
        green: 0.9,
        blue: 0.9,
    };

    /// Creates a color, rejecting channels outside [0, 1]
    pub fn new(red: f64, green: f64, blue: f64) -> Result<Self> {
        for (name, v) in [("red", red), ("green", green), ("blue", blue)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ReportError::InvalidArgument(format!(
                    "color channel {name}={v} is outside [0, 1]"
                )));
            }
        }
        Ok(Self { red, green, blue })
    }

    /// Creates a color, clamping channels into [0, 1]
    pub fn clamped(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
        }
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    /// Checks the channels of a color built by deserialization or by hand
    pub fn validate(&self) -> Result<()> {
        Rgb::new(self.red, self.green, self.blue).map(|_| ())
    }
}

/// Spreadsheet id plus its sheet titles in tab order
///
/// Fetched per gateway call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetDescriptor {
    pub spreadsheet_id: String,
    pub sheet_titles: Vec<String>,

    /// Browser link, when the service returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SpreadsheetDescriptor {
    /// Title of the first sheet
    pub fn first_sheet(&self) -> Option<&str> {
        self.sheet_titles.first().map(String::as_str)
    }
}

/// Outcome of one export call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResult {
    pub file_id: String,
    pub title: String,
    pub web_view_link: String,
    pub created_at: DateTime<Utc>,

    /// Number of data rows written below the header
    pub record_count: usize,
}

/// A stored file as listed by the file-storage service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
    pub modified_time: Option<DateTime<Utc>>,
    pub web_view_link: Option<String>,
}
