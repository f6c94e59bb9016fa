//! Domain models and types for CRM report exports.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Sections and schemas** ([`Section`], [`SectionSchema`])
//! - **Records** handed over by the CRUD layer ([`Record`], [`Client`], [`Deal`], [`Task`])
//! - **Report values** ([`CellValue`], [`ReportRow`], [`Rgb`], [`ExportResult`], [`FileDescriptor`])
//! - **Addressing** for the two coordinate systems ([`A1Range`], [`GridRange`], [`IndexSpan`])
//! - **Error types** ([`ReportError`], [`RemoteError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ReportError>`]:
//!
//! ```rust
//! use crm_reports::domain::{ReportError, Result, Section};
//!
//! fn parse(name: &str) -> Result<Section> {
//!     name.parse()
//! }
//!
//! assert!(matches!(parse("invoices"), Err(ReportError::InvalidArgument(_))));
//! ```

pub mod addressing;
pub mod errors;
pub mod records;
pub mod report;
pub mod result;
pub mod section;

// Re-export commonly used types for convenience
pub use addressing::{column_letter, column_number, quote_sheet_name, A1Range, GridRange, IndexSpan};
pub use errors::{RemoteError, ReportError};
pub use records::{
    records_from_json, Client, ClientStatus, Deal, DealStatus, FieldValue, Record, Task,
};
pub use report::{
    pad_matrix, rows_to_matrix, CellValue, ExportResult, FileDescriptor, ReportRow, Rgb,
    SpreadsheetDescriptor,
};
pub use result::Result;
pub use section::{Column, ColumnKey, Section, SectionSchema, NOTES_MAX_CHARS};
