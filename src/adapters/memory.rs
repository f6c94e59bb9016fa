//! In-memory backends
//!
//! [`MemoryWorkspace`] plays both the spreadsheet service and the file store,
//! following the same addressing rules and error kinds as the Google
//! adapters. It backs `export --dry-run` and the test suites, which use its
//! call log and failure injection to observe the export sequence.

use super::traits::{EntityFilter, EntityProvider, FileStorage, SpreadsheetGateway, SPREADSHEET_MIME_TYPE};
use crate::domain::{
    column_number, pad_matrix, A1Range, CellValue, FileDescriptor, GridRange, IndexSpan, Record,
    ReportError, Result, Rgb, Section, SpreadsheetDescriptor,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

const DEFAULT_SHEET_TITLE: &str = "Sheet1";
const DEFAULT_ROWS: usize = 1000;
const DEFAULT_COLUMNS: usize = 26;

/// One header format request as applied to a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFormat {
    pub range: GridRange,
    pub background: Rgb,
    pub text: Rgb,
}

/// A sheet held by the workspace
#[derive(Debug, Clone)]
pub struct StoredSheet {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: usize,
    pub column_count: usize,
    pub cells: Vec<Vec<CellValue>>,
    pub merges: Vec<GridRange>,
    pub header_formats: Vec<HeaderFormat>,
    pub backgrounds: Vec<(GridRange, Rgb)>,
    pub resized_columns: Vec<IndexSpan>,
}

impl StoredSheet {
    fn new(sheet_id: i64, title: &str, rows: usize, cols: usize) -> Self {
        Self {
            sheet_id,
            title: title.to_string(),
            row_count: rows,
            column_count: cols,
            cells: Vec::new(),
            merges: Vec::new(),
            header_formats: Vec::new(),
            backgrounds: Vec::new(),
            resized_columns: Vec::new(),
        }
    }

    /// Cell at 1-based `row`, `col`, empty when never written
    fn cell(&self, row: usize, col: usize) -> CellValue {
        self.cells
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or_default()
    }

    fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.cells.len() < row {
            self.cells.resize_with(row, Vec::new);
        }
        let cells = &mut self.cells[row - 1];
        if cells.len() < col {
            cells.resize_with(col, CellValue::empty);
        }
        cells[col - 1] = value;
        self.row_count = self.row_count.max(row);
        self.column_count = self.column_count.max(col);
    }

    /// Number of rows up to the last one holding a value
    fn used_rows(&self) -> usize {
        self.cells
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_empty()))
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn used_columns(&self) -> usize {
        self.cells
            .iter()
            .map(|r| r.iter().rposition(|c| !c.is_empty()).map(|i| i + 1).unwrap_or(0))
            .max()
            .unwrap_or(0)
    }

    /// Values of a range the way the values API returns them: trailing
    /// empty cells and rows dropped, then padded to a bounded width
    fn values(&self, range: &A1Range) -> Vec<Vec<CellValue>> {
        let (first_row, first_col) = range.top_left();
        let (last_row, last_col) = range.bottom_right();
        let last_row = last_row.unwrap_or_else(|| self.used_rows());
        let last_col = last_col.unwrap_or_else(|| self.used_columns());

        let mut rows: Vec<Vec<CellValue>> = (first_row..=last_row)
            .map(|r| {
                let mut row: Vec<CellValue> = (first_col..=last_col).map(|c| self.cell(r, c)).collect();
                while row.last().is_some_and(CellValue::is_empty) {
                    row.pop();
                }
                row
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        pad_matrix(rows, range.width(), None)
    }

    fn write(&mut self, range: &A1Range, values: &[Vec<CellValue>]) {
        let (first_row, first_col) = range.top_left();
        for (r, row) in values.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                self.set(first_row + r, first_col + c, value.clone());
            }
        }
    }

    fn clear(&mut self, range: &A1Range) {
        let (first_row, first_col) = range.top_left();
        let (last_row, last_col) = range.bottom_right();
        let last_row = last_row.unwrap_or(self.cells.len());
        for row in first_row..=last_row.min(self.cells.len()) {
            let cells = &mut self.cells[row - 1];
            let last_col = last_col.unwrap_or(cells.len()).min(cells.len());
            for col in first_col..=last_col {
                cells[col - 1] = CellValue::empty();
            }
        }
    }

    fn check_span(&self, span: IndexSpan, limit: usize, what: &str) -> Result<()> {
        if span.end > limit {
            return Err(ReportError::InvalidArgument(format!(
                "{what} {}..{} past the end of sheet '{}' ({limit} {what})",
                span.start, span.end, self.title
            )));
        }
        Ok(())
    }
}

/// A file held by the workspace; spreadsheets carry sheets
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
    pub modified_time: DateTime<Utc>,
    pub sheets: Vec<StoredSheet>,
    next_sheet_id: i64,
}

impl StoredFile {
    fn web_view_link(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}/edit", self.id)
    }

    fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            modified_time: Some(self.modified_time),
            web_view_link: Some(self.web_view_link()),
        }
    }

    fn spreadsheet_descriptor(&self) -> SpreadsheetDescriptor {
        SpreadsheetDescriptor {
            spreadsheet_id: self.id.clone(),
            sheet_titles: self.sheets.iter().map(|s| s.title.clone()).collect(),
            url: Some(self.web_view_link()),
        }
    }

    fn sheet(&self, name: Option<&str>) -> Result<&StoredSheet> {
        let found = match name {
            Some(name) => self.sheets.iter().find(|s| s.title == name),
            None => self.sheets.first(),
        };
        found.ok_or_else(|| self.missing_sheet(name))
    }

    fn sheet_mut(&mut self, name: Option<&str>) -> Result<&mut StoredSheet> {
        let missing = self.missing_sheet(name);
        self.modified_time = Utc::now();
        let found = match name {
            Some(name) => self.sheets.iter_mut().find(|s| s.title == name),
            None => self.sheets.first_mut(),
        };
        found.ok_or(missing)
    }

    fn missing_sheet(&self, name: Option<&str>) -> ReportError {
        ReportError::NotFound(format!(
            "sheet '{}' in spreadsheet {}",
            name.unwrap_or("<first>"),
            self.id
        ))
    }
}

#[derive(Default)]
struct WorkspaceState {
    files: HashMap<String, StoredFile>,
    folders: HashSet<String>,
    calls: Vec<String>,
    failures: HashMap<String, fn() -> ReportError>,
}

/// Spreadsheet service plus file store kept in process memory
pub struct MemoryWorkspace {
    state: Mutex<WorkspaceState>,
}

impl Default for MemoryWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorkspace {
    /// Empty workspace holding only the `root` folder
    pub fn new() -> Self {
        let mut state = WorkspaceState::default();
        state.folders.insert("root".to_string());
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkspaceState> {
        // a panicking test thread must not hide the workspace from the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records the call and returns the state unless a failure is injected
    async fn begin(&self, op: &str) -> Result<MutexGuard<'_, WorkspaceState>> {
        tokio::task::yield_now().await;
        let mut state = self.lock();
        state.calls.push(op.to_string());
        if let Some(failure) = state.failures.get(op) {
            return Err(failure());
        }
        Ok(state)
    }

    async fn with_file<T>(
        &self,
        op: &str,
        spreadsheet_id: &str,
        f: impl FnOnce(&mut StoredFile) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.begin(op).await?;
        let file = state
            .files
            .get_mut(spreadsheet_id)
            .ok_or_else(|| ReportError::NotFound(format!("spreadsheet {spreadsheet_id}")))?;
        f(file)
    }

    /// Registers a folder so files can be moved into and listed from it
    pub fn create_folder(&self, folder_id: &str) {
        self.lock().folders.insert(folder_id.to_string());
    }

    /// Makes every later call of `op` fail with the produced error
    pub fn fail_on(&self, op: &str, error: fn() -> ReportError) {
        self.lock().failures.insert(op.to_string(), error);
    }

    /// Removes every injected failure
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Operation names in call order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.as_str() == op).count()
    }

    /// Copy of a stored file
    pub fn file(&self, file_id: &str) -> Option<StoredFile> {
        self.lock().files.get(file_id).cloned()
    }

    /// Copies of every stored file
    pub fn files(&self) -> Vec<StoredFile> {
        self.lock().files.values().cloned().collect()
    }

    /// Adds a spreadsheet with a fixed modification time, bypassing the call log
    pub fn seed_spreadsheet(&self, folder_id: &str, name: &str, modified_time: DateTime<Utc>) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut state = self.lock();
        state.folders.insert(folder_id.to_string());
        state.files.insert(
            id.clone(),
            new_spreadsheet(&id, name, vec![folder_id.to_string()], modified_time),
        );
        id
    }
}

fn new_spreadsheet(id: &str, name: &str, parents: Vec<String>, modified_time: DateTime<Utc>) -> StoredFile {
    StoredFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: SPREADSHEET_MIME_TYPE.to_string(),
        parents,
        modified_time,
        sheets: vec![StoredSheet::new(0, DEFAULT_SHEET_TITLE, DEFAULT_ROWS, DEFAULT_COLUMNS)],
        next_sheet_id: 1,
    }
}

fn parse_range(a1_range: &str, sheet: Option<&str>) -> Result<A1Range> {
    Ok(A1Range::parse(a1_range)?.on_sheet(sheet))
}

#[async_trait]
impl SpreadsheetGateway for MemoryWorkspace {
    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetDescriptor> {
        let mut state = self.begin("create_spreadsheet").await?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let file = new_spreadsheet(&id, title, vec!["root".to_string()], Utc::now());
        let descriptor = file.spreadsheet_descriptor();
        state.files.insert(id, file);
        Ok(descriptor)
    }

    async fn get_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetDescriptor> {
        self.with_file("get_metadata", spreadsheet_id, |f| Ok(f.spreadsheet_descriptor()))
            .await
    }

    async fn get_sheet_id(&self, spreadsheet_id: &str, name: &str) -> Result<i64> {
        self.with_file("get_sheet_id", spreadsheet_id, |f| Ok(f.sheet(Some(name))?.sheet_id))
            .await
    }

    async fn create_sheet(&self, spreadsheet_id: &str, title: &str, rows: usize, cols: usize) -> Result<i64> {
        self.with_file("create_sheet", spreadsheet_id, |f| {
            if rows == 0 || cols == 0 {
                return Err(ReportError::InvalidArgument(format!(
                    "sheet '{title}' needs at least one row and one column"
                )));
            }
            if f.sheets.iter().any(|s| s.title == title) {
                return Err(ReportError::InvalidArgument(format!(
                    "a sheet named '{title}' already exists"
                )));
            }
            let sheet_id = f.next_sheet_id;
            f.next_sheet_id += 1;
            f.sheets.push(StoredSheet::new(sheet_id, title, rows, cols));
            f.modified_time = Utc::now();
            Ok(sheet_id)
        })
        .await
    }

    async fn rename_sheet(&self, spreadsheet_id: &str, from: &str, to: &str) -> Result<()> {
        self.with_file("rename_sheet", spreadsheet_id, |f| {
            if from != to && f.sheets.iter().any(|s| s.title == to) {
                return Err(ReportError::InvalidArgument(format!(
                    "a sheet named '{to}' already exists"
                )));
            }
            f.sheet_mut(Some(from))?.title = to.to_string();
            Ok(())
        })
        .await
    }

    async fn delete_sheet(&self, spreadsheet_id: &str, name: &str) -> Result<()> {
        self.with_file("delete_sheet", spreadsheet_id, |f| {
            f.sheet(Some(name))?;
            if f.sheets.len() == 1 {
                return Err(ReportError::InvalidArgument(
                    "cannot delete the only sheet of a spreadsheet".to_string(),
                ));
            }
            f.sheets.retain(|s| s.title != name);
            f.modified_time = Utc::now();
            Ok(())
        })
        .await
    }

    async fn read_range(
        &self,
        spreadsheet_id: &str,
        a1_range: &str,
        sheet: Option<&str>,
    ) -> Result<Vec<Vec<CellValue>>> {
        let range = parse_range(a1_range, sheet)?;
        self.with_file("read_range", spreadsheet_id, |f| {
            let values = f.sheet(range.sheet())?.values(&range);
            Ok(pad_matrix(values, range.width(), range.height()))
        })
        .await
    }

    async fn read_entire_sheet(&self, spreadsheet_id: &str, sheet: &str) -> Result<Vec<Vec<CellValue>>> {
        self.with_file("read_entire_sheet", spreadsheet_id, |f| {
            let stored = f.sheet(Some(sheet))?;
            Ok(match stored.used_rows() {
                0 => Vec::new(),
                rows => pad_matrix(stored.values(&A1Range::parse(&format!("1:{rows}"))?), None, None),
            })
        })
        .await
    }

    async fn read_row(&self, spreadsheet_id: &str, row: usize, sheet: Option<&str>) -> Result<Vec<CellValue>> {
        let range = A1Range::row(row)?.on_sheet(sheet);
        self.with_file("read_row", spreadsheet_id, |f| {
            Ok(f.sheet(range.sheet())?
                .values(&range)
                .into_iter()
                .next()
                .unwrap_or_default())
        })
        .await
    }

    async fn read_column(
        &self,
        spreadsheet_id: &str,
        column: &str,
        sheet: Option<&str>,
    ) -> Result<Vec<CellValue>> {
        let col = column_number(column)?;
        self.with_file("read_column", spreadsheet_id, |f| {
            let stored = f.sheet(sheet)?;
            let mut values: Vec<CellValue> =
                (1..=stored.cells.len()).map(|r| stored.cell(r, col)).collect();
            while values.last().is_some_and(CellValue::is_empty) {
                values.pop();
            }
            Ok(values)
        })
        .await
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        a1_range: &str,
        values: &[Vec<CellValue>],
        sheet: Option<&str>,
    ) -> Result<()> {
        let range = parse_range(a1_range, sheet)?;
        range.check_fits(values)?;
        self.with_file("write_range", spreadsheet_id, |f| {
            f.sheet_mut(range.sheet())?.write(&range, values);
            Ok(())
        })
        .await
    }

    async fn write_cell(
        &self,
        spreadsheet_id: &str,
        a1_cell: &str,
        value: CellValue,
        sheet: Option<&str>,
    ) -> Result<()> {
        let range = parse_range(a1_cell, sheet)?;
        if !range.is_single_cell() {
            return Err(ReportError::InvalidArgument(format!(
                "'{a1_cell}' is not a single cell"
            )));
        }
        self.with_file("write_cell", spreadsheet_id, |f| {
            f.sheet_mut(range.sheet())?.write(&range, &[vec![value]]);
            Ok(())
        })
        .await
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        values: &[Vec<CellValue>],
        sheet: Option<&str>,
    ) -> Result<()> {
        A1Range::cell(1, 1)?.check_fits(values)?;
        self.with_file("append_rows", spreadsheet_id, |f| {
            let stored = f.sheet_mut(sheet)?;
            let anchor = A1Range::cell(stored.used_rows() + 1, 1)?;
            stored.write(&anchor, values);
            Ok(())
        })
        .await
    }

    async fn insert_rows(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.with_file("insert_rows", spreadsheet_id, |f| {
            let stored = f.sheet_mut(Some(sheet))?;
            stored.check_span(IndexSpan::new(span.start, span.start + 1)?, stored.row_count + 1, "rows")?;
            if span.start < stored.cells.len() {
                let tail = stored.cells.split_off(span.start);
                stored.cells.resize_with(span.end, Vec::new);
                stored.cells.extend(tail);
            }
            stored.row_count += span.len();
            Ok(())
        })
        .await
    }

    async fn insert_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.with_file("insert_columns", spreadsheet_id, |f| {
            let stored = f.sheet_mut(Some(sheet))?;
            stored.check_span(
                IndexSpan::new(span.start, span.start + 1)?,
                stored.column_count + 1,
                "columns",
            )?;
            for row in &mut stored.cells {
                if span.start < row.len() {
                    let tail = row.split_off(span.start);
                    row.resize_with(span.end, CellValue::empty);
                    row.extend(tail);
                }
            }
            stored.column_count += span.len();
            Ok(())
        })
        .await
    }

    async fn delete_rows(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.with_file("delete_rows", spreadsheet_id, |f| {
            let stored = f.sheet_mut(Some(sheet))?;
            stored.check_span(span, stored.row_count, "rows")?;
            let end = span.end.min(stored.cells.len());
            if span.start < end {
                stored.cells.drain(span.start..end);
            }
            stored.row_count -= span.len();
            Ok(())
        })
        .await
    }

    async fn delete_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.with_file("delete_columns", spreadsheet_id, |f| {
            let stored = f.sheet_mut(Some(sheet))?;
            stored.check_span(span, stored.column_count, "columns")?;
            for row in &mut stored.cells {
                let end = span.end.min(row.len());
                if span.start < end {
                    row.drain(span.start..end);
                }
            }
            stored.column_count -= span.len();
            Ok(())
        })
        .await
    }

    async fn clear_range(&self, spreadsheet_id: &str, a1_range: &str, sheet: Option<&str>) -> Result<()> {
        let range = parse_range(a1_range, sheet)?;
        self.with_file("clear_range", spreadsheet_id, |f| {
            f.sheet_mut(range.sheet())?.clear(&range);
            Ok(())
        })
        .await
    }

    async fn clear_sheet(&self, spreadsheet_id: &str, sheet: &str) -> Result<()> {
        self.with_file("clear_sheet", spreadsheet_id, |f| {
            f.sheet_mut(Some(sheet))?.cells.clear();
            Ok(())
        })
        .await
    }

    async fn merge_cells(&self, spreadsheet_id: &str, sheet: &str, range: GridRange) -> Result<()> {
        self.with_file("merge_cells", spreadsheet_id, |f| {
            f.sheet_mut(Some(sheet))?.merges.push(range);
            Ok(())
        })
        .await
    }

    async fn format_range_header_colored(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: GridRange,
        background: Rgb,
        text: Rgb,
    ) -> Result<()> {
        background.validate()?;
        text.validate()?;
        self.with_file("format_range_header", spreadsheet_id, |f| {
            f.sheet_mut(Some(sheet))?.header_formats.push(HeaderFormat {
                range,
                background,
                text,
            });
            Ok(())
        })
        .await
    }

    async fn format_ranges_background(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        ranges: &[(GridRange, Rgb)],
    ) -> Result<()> {
        for (_, color) in ranges {
            color.validate()?;
        }
        self.with_file("format_range_background", spreadsheet_id, |f| {
            f.sheet_mut(Some(sheet))?.backgrounds.extend_from_slice(ranges);
            Ok(())
        })
        .await
    }

    async fn auto_resize_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.with_file("auto_resize_columns", spreadsheet_id, |f| {
            f.sheet_mut(Some(sheet))?.resized_columns.push(span);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl FileStorage for MemoryWorkspace {
    async fn create_in_folder(
        &self,
        name: &str,
        mime_type: &str,
        folder_id: Option<&str>,
    ) -> Result<FileDescriptor> {
        let mut state = self.begin("create_in_folder").await?;
        let folder = folder_id.unwrap_or("root");
        if !state.folders.contains(folder) {
            return Err(ReportError::NotFound(format!("folder {folder}")));
        }
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut file = new_spreadsheet(&id, name, vec![folder.to_string()], Utc::now());
        file.mime_type = mime_type.to_string();
        if mime_type != SPREADSHEET_MIME_TYPE {
            file.sheets.clear();
        }
        let descriptor = file.descriptor();
        state.files.insert(id, file);
        Ok(descriptor)
    }

    async fn move_to_folder(&self, file_id: &str, folder_id: &str) -> Result<FileDescriptor> {
        let mut state = self.begin("move_to_folder").await?;
        if !state.folders.contains(folder_id) {
            return Err(ReportError::NotFound(format!("folder {folder_id}")));
        }
        let file = state
            .files
            .get_mut(file_id)
            .ok_or_else(|| ReportError::NotFound(format!("file {file_id}")))?;
        file.parents = vec![folder_id.to_string()];
        Ok(file.descriptor())
    }

    async fn list(&self, folder_id: &str, name_prefix: &str) -> Result<Vec<FileDescriptor>> {
        let state = self.begin("list").await?;
        if !state.folders.contains(folder_id) {
            return Err(ReportError::NotFound(format!("folder {folder_id}")));
        }
        let mut files: Vec<&StoredFile> = state
            .files
            .values()
            .filter(|f| f.mime_type == SPREADSHEET_MIME_TYPE)
            .filter(|f| f.parents.iter().any(|p| p == folder_id))
            .filter(|f| f.name.starts_with(name_prefix))
            .collect();
        files.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));
        Ok(files.into_iter().map(StoredFile::descriptor).collect())
    }
}

/// Record source over fixed per-section lists
#[derive(Default)]
pub struct MemoryEntityProvider {
    records: Mutex<HashMap<Section, Vec<Record>>>,
    failure: Mutex<Option<fn() -> ReportError>>,
}

impl MemoryEntityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the records of `section`
    pub fn with_records(self, section: Section, records: Vec<Record>) -> Self {
        self.set_records(section, records);
        self
    }

    pub fn set_records(&self, section: Section, records: Vec<Record>) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(section, records);
    }

    /// Makes every later listing fail with the produced error
    pub fn fail_with(&self, error: fn() -> ReportError) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }
}

#[async_trait]
impl EntityProvider for MemoryEntityProvider {
    async fn list_entities(&self, section: Section, filter: &EntityFilter) -> Result<Vec<Record>> {
        if let Some(failure) = *self.failure.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(failure());
        }
        let records = self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&section)
            .cloned()
            .unwrap_or_default();
        Ok(filter.apply(records))
    }
}
