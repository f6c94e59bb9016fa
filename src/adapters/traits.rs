//! Collaborator traits
//!
//! The export core talks to three outside systems through these traits: the
//! remote spreadsheet service, the file store that holds the spreadsheets,
//! and the CRUD layer that owns the records. Google-backed and in-memory
//! implementations live next to this module.

use crate::domain::{
    CellValue, FileDescriptor, GridRange, IndexSpan, Record, Result, Rgb, Section,
    SpreadsheetDescriptor,
};
use async_trait::async_trait;

/// MIME type of a native spreadsheet in the file store
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Remote spreadsheet operations
///
/// Every operation is one remote call against the spreadsheet named by
/// `spreadsheet_id`; implementations keep no mirror of remote state.
///
/// # Addressing
///
/// Value operations (`read_*`, `write_*`, `append_rows`, `clear_range`) take
/// 1-based A1 text such as `"A1:C3"` or `"'My sheet'!B2"`. When the text does
/// not name a sheet, `sheet` selects one; `None` means the first sheet.
///
/// Structural and formatting operations take [`IndexSpan`] and [`GridRange`],
/// which are 0-based with an exclusive end.
///
/// # Errors
///
/// - `Authentication` for missing or rejected credentials
/// - `NotFound` for an unknown spreadsheet, sheet or range
/// - `RateLimit` once the retry budget is spent
/// - `InvalidArgument` for malformed ranges, empty spans or value matrices
#[async_trait]
pub trait SpreadsheetGateway: Send + Sync {
    /// Create a new spreadsheet with one default sheet
    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetDescriptor>;

    /// Spreadsheet id and sheet titles in tab order
    async fn get_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetDescriptor>;

    /// Sheet titles in tab order
    async fn get_sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        Ok(self.get_metadata(spreadsheet_id).await?.sheet_titles)
    }

    /// Numeric id of the sheet called `name`
    async fn get_sheet_id(&self, spreadsheet_id: &str, name: &str) -> Result<i64>;

    /// Add a sheet with the given grid size, returning its id
    async fn create_sheet(&self, spreadsheet_id: &str, title: &str, rows: usize, cols: usize)
        -> Result<i64>;

    async fn rename_sheet(&self, spreadsheet_id: &str, from: &str, to: &str) -> Result<()>;

    async fn delete_sheet(&self, spreadsheet_id: &str, name: &str) -> Result<()>;

    /// Values of a range; gaps inside the range come back as empty strings
    ///
    /// A bounded range always yields its full height and width, trailing
    /// empty rows included.
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        a1_range: &str,
        sheet: Option<&str>,
    ) -> Result<Vec<Vec<CellValue>>>;

    /// Every value of a sheet
    async fn read_entire_sheet(&self, spreadsheet_id: &str, sheet: &str)
        -> Result<Vec<Vec<CellValue>>>;

    /// Values of the 1-based row `row`
    async fn read_row(
        &self,
        spreadsheet_id: &str,
        row: usize,
        sheet: Option<&str>,
    ) -> Result<Vec<CellValue>>;

    /// Values of the column with letters `column`
    async fn read_column(
        &self,
        spreadsheet_id: &str,
        column: &str,
        sheet: Option<&str>,
    ) -> Result<Vec<CellValue>>;

    /// Overwrite a range starting at its top-left cell
    async fn write_range(
        &self,
        spreadsheet_id: &str,
        a1_range: &str,
        values: &[Vec<CellValue>],
        sheet: Option<&str>,
    ) -> Result<()>;

    /// Overwrite a single cell
    async fn write_cell(
        &self,
        spreadsheet_id: &str,
        a1_cell: &str,
        value: CellValue,
        sheet: Option<&str>,
    ) -> Result<()>;

    /// Add rows after the last non-empty row
    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        values: &[Vec<CellValue>],
        sheet: Option<&str>,
    ) -> Result<()>;

    async fn insert_rows(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()>;

    async fn insert_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan)
        -> Result<()>;

    async fn delete_rows(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()>;

    async fn delete_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan)
        -> Result<()>;

    /// Clear values (formatting stays)
    async fn clear_range(&self, spreadsheet_id: &str, a1_range: &str, sheet: Option<&str>)
        -> Result<()>;

    async fn clear_sheet(&self, spreadsheet_id: &str, sheet: &str) -> Result<()>;

    async fn merge_cells(&self, spreadsheet_id: &str, sheet: &str, range: GridRange) -> Result<()>;

    /// Bold, centered header on a light grey background
    async fn format_range_header(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: GridRange,
    ) -> Result<()> {
        self.format_range_header_colored(spreadsheet_id, sheet, range, Rgb::LIGHT_GREY, Rgb::BLACK)
            .await
    }

    /// Bold, centered header with explicit background and text colors
    async fn format_range_header_colored(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: GridRange,
        background: Rgb,
        text: Rgb,
    ) -> Result<()>;

    /// Background color of a range
    async fn format_range_background(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: GridRange,
        color: Rgb,
    ) -> Result<()> {
        self.format_ranges_background(spreadsheet_id, sheet, &[(range, color)])
            .await
    }

    /// Background colors of several ranges in one request
    async fn format_ranges_background(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        ranges: &[(GridRange, Rgb)],
    ) -> Result<()>;

    /// Fit column widths to their content
    async fn auto_resize_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan)
        -> Result<()>;
}

/// File store holding the exported spreadsheets
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Create an empty file of `mime_type`, inside `folder_id` when given
    async fn create_in_folder(
        &self,
        name: &str,
        mime_type: &str,
        folder_id: Option<&str>,
    ) -> Result<FileDescriptor>;

    /// Make `folder_id` the only parent of `file_id`
    async fn move_to_folder(&self, file_id: &str, folder_id: &str) -> Result<FileDescriptor>;

    /// Spreadsheets directly inside `folder_id` whose name starts with `name_prefix`
    ///
    /// `NotFound` when the folder does not exist.
    async fn list(&self, folder_id: &str, name_prefix: &str) -> Result<Vec<FileDescriptor>>;
}

/// Narrowing applied by the record source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFilter {
    /// Maximum number of records returned
    pub limit: Option<usize>,

    /// Only records with this status value
    pub status: Option<String>,
}

impl EntityFilter {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            status: None,
        }
    }

    /// Applies the filter to records already in memory
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        let filtered = records.into_iter().filter(|r| match &self.status {
            Some(status) => &r.status_key() == status,
            None => true,
        });
        match self.limit {
            Some(limit) => filtered.take(limit).collect(),
            None => filtered.collect(),
        }
    }
}

/// Source of CRM records, owned by the CRUD layer
#[async_trait]
pub trait EntityProvider: Send + Sync {
    /// Records of `section` in the provider's order
    async fn list_entities(&self, section: Section, filter: &EntityFilter) -> Result<Vec<Record>>;
}
