//! Cell addressing
//!
//! Two coordinate systems coexist and must not be mixed:
//!
//! - [`A1Range`] is the 1-based, inclusive spreadsheet notation (`A1:C3`) used
//!   by value reads, writes, appends and clears.
//! - [`GridRange`] and [`IndexSpan`] are 0-based with an exclusive end, used
//!   by formatting, merges and row/column insertion or deletion.
//!
//! Both types validate on construction, so a value that exists is well formed.
//! Code above the gateway builds them from counts (`A1Range::block`,
//! `GridRange::header`) and never computes raw offsets.

use crate::domain::errors::ReportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Largest column the service accepts (`ZZZ`)
pub const MAX_COLUMNS: usize = 18_278;

/// Converts a 1-based column number to letters (1 → A, 27 → AA)
pub fn column_letter(column: usize) -> Result<String> {
    if column == 0 || column > MAX_COLUMNS {
        return Err(ReportError::InvalidArgument(format!(
            "column number {column} is outside 1..={MAX_COLUMNS}"
        )));
    }
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    Ok(letters.iter().rev().collect())
}

/// Converts column letters to a 1-based column number (A → 1, AA → 27)
pub fn column_number(letters: &str) -> Result<usize> {
    if letters.is_empty() || letters.len() > 3 || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ReportError::InvalidArgument(format!(
            "'{letters}' is not a column letter"
        )));
    }
    Ok(letters
        .to_ascii_uppercase()
        .bytes()
        .fold(0, |acc, b| acc * 26 + (b - b'A' + 1) as usize))
}

/// Quotes a sheet name for use in a range when it contains spaces or quotes
pub fn quote_sheet_name(name: &str) -> String {
    if name.contains(' ') || name.contains('\'') {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

fn unquote_sheet_name(name: &str) -> String {
    match name.strip_prefix('\'').and_then(|n| n.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => name.to_string(),
    }
}

fn endpoint_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]{0,3})([0-9]{0,7})$").expect("static regex"))
}

/// One corner of an A1 range; either part may be open (`A`, `3`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Endpoint {
    column: Option<usize>,
    row: Option<usize>,
}

impl Endpoint {
    fn parse(text: &str) -> Result<Self> {
        let invalid = || ReportError::InvalidArgument(format!("'{text}' is not a valid A1 reference"));
        let caps = endpoint_regex().captures(text).ok_or_else(invalid)?;
        let letters = &caps[1];
        let digits = &caps[2];
        if letters.is_empty() && digits.is_empty() {
            return Err(invalid());
        }
        let column = if letters.is_empty() {
            None
        } else {
            Some(column_number(letters)?)
        };
        let row = if digits.is_empty() {
            None
        } else {
            match digits.parse::<usize>() {
                Ok(0) | Err(_) => return Err(invalid()),
                Ok(r) => Some(r),
            }
        };
        Ok(Self { column, row })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(c) = self.column {
            // column numbers are validated on construction
            f.write_str(&column_letter(c).map_err(|_| fmt::Error)?)?;
        }
        if let Some(r) = self.row {
            write!(f, "{r}")?;
        }
        Ok(())
    }
}

/// A 1-based, inclusive A1 range, optionally qualified with a sheet name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    sheet: Option<String>,
    start: Endpoint,
    end: Option<Endpoint>,
}

impl A1Range {
    /// Parses `A1`, `A1:C3`, `A:C`, `2:5` or `'Sheet name'!A1:C3`
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (sheet, cells) = match text.rfind('!') {
            Some(pos) => {
                let sheet = &text[..pos];
                if sheet.is_empty() {
                    return Err(ReportError::InvalidArgument(format!(
                        "'{text}' has an empty sheet name"
                    )));
                }
                (Some(unquote_sheet_name(sheet)), &text[pos + 1..])
            }
            None => (None, text),
        };

        let mut parts = cells.split(':');
        let start = Endpoint::parse(parts.next().unwrap_or_default())?;
        let end = parts.next().map(Endpoint::parse).transpose()?;
        if parts.next().is_some() {
            return Err(ReportError::InvalidArgument(format!(
                "'{text}' has more than two corners"
            )));
        }

        if let Some(end) = end {
            // A:C and 2:5 need matching shapes on both sides
            if start.column.is_none() != end.column.is_none() && start.row.is_none() != end.row.is_none() {
                return Err(ReportError::InvalidArgument(format!(
                    "'{text}' mixes a column range with a row range"
                )));
            }
            if let (Some(a), Some(b)) = (start.column, end.column) {
                if a > b {
                    return Err(ReportError::InvalidArgument(format!(
                        "'{text}' ends before it starts"
                    )));
                }
            }
            if let (Some(a), Some(b)) = (start.row, end.row) {
                if a > b {
                    return Err(ReportError::InvalidArgument(format!(
                        "'{text}' ends before it starts"
                    )));
                }
            }
        } else if start.column.is_none() || start.row.is_none() {
            return Err(ReportError::InvalidArgument(format!(
                "'{text}' is not a complete cell reference"
            )));
        }

        Ok(Self { sheet, start, end })
    }

    /// `A1:<col><rows>` covering a block of `rows` by `cols` cells
    pub fn block(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(ReportError::InvalidArgument(format!(
                "cannot address an empty block ({rows}x{cols})"
            )));
        }
        column_letter(cols)?;
        Ok(Self {
            sheet: None,
            start: Endpoint {
                column: Some(1),
                row: Some(1),
            },
            end: Some(Endpoint {
                column: Some(cols),
                row: Some(rows),
            }),
        })
    }

    /// A single cell from 1-based row and column numbers
    pub fn cell(row: usize, column: usize) -> Result<Self> {
        if row == 0 {
            return Err(ReportError::InvalidArgument("row numbers start at 1".to_string()));
        }
        column_letter(column)?;
        Ok(Self {
            sheet: None,
            start: Endpoint {
                column: Some(column),
                row: Some(row),
            },
            end: None,
        })
    }

    /// The whole row `row:row`
    pub fn row(row: usize) -> Result<Self> {
        if row == 0 {
            return Err(ReportError::InvalidArgument("row numbers start at 1".to_string()));
        }
        let endpoint = Endpoint {
            column: None,
            row: Some(row),
        };
        Ok(Self {
            sheet: None,
            start: endpoint,
            end: Some(endpoint),
        })
    }

    /// The whole column `X:X`
    pub fn column(letters: &str) -> Result<Self> {
        let endpoint = Endpoint {
            column: Some(column_number(letters)?),
            row: None,
        };
        Ok(Self {
            sheet: None,
            start: endpoint,
            end: Some(endpoint),
        })
    }

    /// Sheet named inside the range text, if any
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    /// Returns the range bound to `sheet` unless it already names one
    pub fn on_sheet(mut self, sheet: Option<&str>) -> Self {
        if self.sheet.is_none() {
            self.sheet = sheet.map(str::to_string);
        }
        self
    }

    /// True when the range addresses exactly one cell
    pub fn is_single_cell(&self) -> bool {
        let complete = self.start.column.is_some() && self.start.row.is_some();
        match self.end {
            None => complete,
            Some(end) => complete && end == self.start,
        }
    }

    /// 1-based first row and column; an open side starts at 1
    pub fn top_left(&self) -> (usize, usize) {
        (self.start.row.unwrap_or(1), self.start.column.unwrap_or(1))
    }

    /// 1-based last row and column, `None` where the range is open
    pub fn bottom_right(&self) -> (Option<usize>, Option<usize>) {
        match self.end {
            Some(end) => (end.row, end.column),
            None => (self.start.row, self.start.column),
        }
    }

    /// Rejects value matrices that are empty or larger than a bounded range
    pub fn check_fits<T>(&self, values: &[Vec<T>]) -> Result<()> {
        if values.is_empty() || values.iter().all(Vec::is_empty) {
            return Err(ReportError::InvalidArgument(format!(
                "no values to write to {self}"
            )));
        }
        let widest = values.iter().map(Vec::len).max().unwrap_or_default();
        if self.end.is_some() {
            if let Some(width) = self.width().filter(|w| widest > *w) {
                return Err(ReportError::InvalidArgument(format!(
                    "{widest} columns do not fit into {self} ({width} wide)"
                )));
            }
            if let Some(height) = self.height().filter(|h| values.len() > *h) {
                return Err(ReportError::InvalidArgument(format!(
                    "{} rows do not fit into {self} ({height} high)",
                    values.len()
                )));
            }
        }
        Ok(())
    }

    /// Number of columns, when both column bounds are known
    pub fn width(&self) -> Option<usize> {
        let start = self.start.column?;
        let end = match self.end {
            Some(e) => e.column?,
            None => start,
        };
        Some(end - start + 1)
    }

    /// Number of rows, when both row bounds are known
    pub fn height(&self) -> Option<usize> {
        let start = self.start.row?;
        let end = match self.end {
            Some(e) => e.row?,
            None => start,
        };
        Some(end - start + 1)
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "{}!", quote_sheet_name(sheet))?;
        }
        write!(f, "{}", self.start)?;
        if let Some(end) = &self.end {
            write!(f, ":{end}")?;
        }
        Ok(())
    }
}

/// A 0-based rectangle with exclusive end bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRange {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl GridRange {
    /// Validates that both spans are non-empty
    pub fn new(start_row: usize, end_row: usize, start_col: usize, end_col: usize) -> Result<Self> {
        if start_row >= end_row || start_col >= end_col {
            return Err(ReportError::InvalidArgument(format!(
                "empty grid range rows {start_row}..{end_row}, columns {start_col}..{end_col} (end is exclusive)"
            )));
        }
        if end_col > MAX_COLUMNS {
            return Err(ReportError::InvalidArgument(format!(
                "grid range ends past column {MAX_COLUMNS}"
            )));
        }
        Ok(Self {
            start_row,
            end_row,
            start_col,
            end_col,
        })
    }

    /// The first row across `columns` columns
    pub fn header(columns: usize) -> Result<Self> {
        Self::new(0, 1, 0, columns)
    }

    /// Data row `n` (0-based, the header excluded) of a table with a header row
    pub fn body_cell(data_row: usize, column: usize) -> Result<Self> {
        Self::new(data_row + 1, data_row + 2, column, column + 1)
    }

    pub fn rows(&self) -> usize {
        self.end_row - self.start_row
    }

    pub fn columns(&self) -> usize {
        self.end_col - self.start_col
    }

    /// The same cells in A1 notation
    pub fn to_a1(&self) -> Result<A1Range> {
        let start = Endpoint {
            column: Some(self.start_col + 1),
            row: Some(self.start_row + 1),
        };
        let end = Endpoint {
            column: Some(self.end_col),
            row: Some(self.end_row),
        };
        Ok(A1Range {
            sheet: None,
            start,
            end: Some(end),
        })
    }
}

/// A 0-based, end-exclusive span of rows or columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpan {
    pub start: usize,
    pub end: usize,
}

impl IndexSpan {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(ReportError::InvalidArgument(format!(
                "empty index span {start}..{end} (end is exclusive)"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}
