//! Exportable sections and their column schemas
//!
//! Each section has a statically declared, ordered column list. Column order
//! is part of the report contract: historical reports of the same section
//! stay comparable because the order never changes between exports.

use crate::domain::errors::ReportError;
use crate::domain::report::Rgb;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three exportable record categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Clients,
    Deals,
    Tasks,
}

impl Section {
    /// All sections in display order
    pub const ALL: [Section; 3] = [Section::Clients, Section::Deals, Section::Tasks];

    /// Lowercase identifier used on the command line and in file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Clients => "clients",
            Section::Deals => "deals",
            Section::Tasks => "tasks",
        }
    }

    /// Name prefix shared by every export artifact of this section
    ///
    /// The catalog relies on this prefix to find earlier reports, so it must
    /// not be a prefix of another section's title.
    pub fn title_prefix(&self) -> &'static str {
        match self {
            Section::Clients => "CRM Report Clients",
            Section::Deals => "CRM Report Deals",
            Section::Tasks => "CRM Report Tasks",
        }
    }

    /// Title for a new export artifact created at `at`
    pub fn report_title(&self, at: DateTime<Utc>) -> String {
        format!("{} {}", self.title_prefix(), at.format("%Y-%m-%d %H-%M-%S-%3f"))
    }

    /// Column schema for this section
    pub fn schema(&self) -> &'static SectionSchema {
        match self {
            Section::Clients => &CLIENTS_SCHEMA,
            Section::Deals => &DEALS_SCHEMA,
            Section::Tasks => &TASKS_SCHEMA,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clients" => Ok(Section::Clients),
            "deals" => Ok(Section::Deals),
            "tasks" => Ok(Section::Tasks),
            other => Err(ReportError::InvalidArgument(format!(
                "Unknown section '{other}'. Must be one of: clients, deals, tasks"
            ))),
        }
    }
}

/// Field a column reads from a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Id,
    Name,
    Email,
    Phone,
    Title,
    Description,
    ClientId,
    DealId,
    Amount,
    Status,
    Completed,
    Notes,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

/// A named report column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Header text
    pub header: &'static str,

    /// Record field the column is filled from
    pub key: ColumnKey,

    /// Text longer than this many characters is cut
    pub max_chars: Option<usize>,
}

impl Column {
    const fn new(header: &'static str, key: ColumnKey) -> Self {
        Self {
            header,
            key,
            max_chars: None,
        }
    }

    const fn truncated(header: &'static str, key: ColumnKey, max_chars: usize) -> Self {
        Self {
            header,
            key,
            max_chars: Some(max_chars),
        }
    }
}

/// Maximum length of free-text notes in a report cell
pub const NOTES_MAX_CHARS: usize = 500;

/// Fixed, ordered column list of one section
#[derive(Debug)]
pub struct SectionSchema {
    pub section: Section,
    pub columns: &'static [Column],

    /// Column whose value drives status highlighting
    pub status_column: Option<ColumnKey>,
}

impl SectionSchema {
    /// Header texts in column order
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// 0-based position of the status column
    pub fn status_index(&self) -> Option<usize> {
        let key = self.status_column?;
        self.columns.iter().position(|c| c.key == key)
    }

    /// Highlight color for a status value
    pub fn status_color(&self, status: &str) -> Option<Rgb> {
        let rgb = match (self.section, status) {
            (Section::Clients, "active") => (0.2, 0.7, 0.4),
            (Section::Clients, "archived") => (0.6, 0.6, 0.6),
            (Section::Deals, "draft") => (0.6, 0.6, 0.6),
            (Section::Deals, "in_progress") => (0.35, 0.55, 0.9),
            (Section::Deals, "won") => (0.2, 0.7, 0.4),
            (Section::Deals, "lost") => (0.9, 0.35, 0.3),
            (Section::Tasks, "true") => (0.2, 0.7, 0.4),
            (Section::Tasks, "false") => (0.75, 0.75, 0.75),
            _ => return None,
        };
        Some(Rgb::clamped(rgb.0, rgb.1, rgb.2))
    }
}

static CLIENTS_SCHEMA: SectionSchema = SectionSchema {
    section: Section::Clients,
    columns: &[
        Column::new("ID", ColumnKey::Id),
        Column::new("Name", ColumnKey::Name),
        Column::new("Email", ColumnKey::Email),
        Column::new("Phone", ColumnKey::Phone),
        Column::new("Status", ColumnKey::Status),
        Column::truncated("Notes", ColumnKey::Notes, NOTES_MAX_CHARS),
    ],
    status_column: Some(ColumnKey::Status),
};

static DEALS_SCHEMA: SectionSchema = SectionSchema {
    section: Section::Deals,
    columns: &[
        Column::new("ID", ColumnKey::Id),
        Column::new("Title", ColumnKey::Title),
        Column::new("Client ID", ColumnKey::ClientId),
        Column::new("Amount", ColumnKey::Amount),
        Column::new("Status", ColumnKey::Status),
        Column::truncated("Notes", ColumnKey::Notes, NOTES_MAX_CHARS),
        Column::new("Created", ColumnKey::CreatedAt),
        Column::new("Updated", ColumnKey::UpdatedAt),
    ],
    status_column: Some(ColumnKey::Status),
};

static TASKS_SCHEMA: SectionSchema = SectionSchema {
    section: Section::Tasks,
    columns: &[
        Column::new("ID", ColumnKey::Id),
        Column::new("Title", ColumnKey::Title),
        Column::truncated("Description", ColumnKey::Description, NOTES_MAX_CHARS),
        Column::new("Client ID", ColumnKey::ClientId),
        Column::new("Deal ID", ColumnKey::DealId),
        Column::new("Completed", ColumnKey::Completed),
        Column::new("Due", ColumnKey::DueDate),
        Column::new("Created", ColumnKey::CreatedAt),
        Column::new("Updated", ColumnKey::UpdatedAt),
    ],
    status_column: Some(ColumnKey::Completed),
};
