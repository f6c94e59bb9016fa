//! Export orchestrator - runs one section export end to end
//!
//! The remote calls of an export are strictly sequential: create the
//! spreadsheet, write the values, format, then move the file. Nothing is
//! rolled back. When a step after creation fails the partially written
//! spreadsheet stays in the caller's root folder and the error is returned.

use crate::adapters::traits::{EntityFilter, EntityProvider, FileStorage, SpreadsheetGateway};
use crate::config::ExportConfig;
use crate::core::report::ReportBuilder;
use crate::core::settings::SettingsStore;
use crate::domain::{
    rows_to_matrix, A1Range, ExportResult, GridRange, IndexSpan, Record, RemoteError,
    ReportError, ReportRow, Result, Rgb, Section, SpreadsheetDescriptor,
};
use crate::{log_export_complete, log_export_start};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// Folder id meaning "the caller's root"; files created there are not moved
pub const ROOT_FOLDER: &str = "root";

/// Browser link used when the services return none
pub fn spreadsheet_link(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Export orchestrator
pub struct ExportOrchestrator {
    gateway: Arc<dyn SpreadsheetGateway>,
    storage: Arc<dyn FileStorage>,
    entities: Arc<dyn EntityProvider>,
    settings: Arc<SettingsStore>,
    builder: ReportBuilder,
    options: ExportConfig,
}

impl ExportOrchestrator {
    pub fn new(
        gateway: Arc<dyn SpreadsheetGateway>,
        storage: Arc<dyn FileStorage>,
        entities: Arc<dyn EntityProvider>,
        settings: Arc<SettingsStore>,
        options: ExportConfig,
    ) -> Self {
        Self {
            gateway,
            storage,
            entities,
            settings,
            builder: ReportBuilder::new(),
            options,
        }
    }

    /// Destination folder of the next export, `None` for the caller's root
    ///
    /// The override wins, then the saved `folder_id`, then the configured default.
    pub async fn resolve_folder(&self, folder_override: Option<&str>) -> Option<String> {
        let saved = self.settings.get().await.folder_id;
        non_empty(folder_override)
            .or(non_empty(saved.as_deref()))
            .or(non_empty(self.options.default_folder_id.as_deref()))
            .filter(|f| *f != ROOT_FOLDER)
            .map(str::to_string)
    }

    /// Header and value rows the export of `section` would write
    pub async fn build_rows(&self, section: Section) -> Result<(Vec<Record>, Vec<ReportRow>)> {
        let filter = EntityFilter::with_limit(self.options.max_records);
        let records = self.entities.list_entities(section, &filter).await?;
        let rows = self.builder.build(section, &records)?;
        Ok((records, rows))
    }

    /// Exports `section` into a new spreadsheet
    ///
    /// # Errors
    ///
    /// Any gateway, storage or record-source error, unchanged. Errors after
    /// the spreadsheet was created leave it behind.
    pub async fn export(&self, section: Section, folder_override: Option<&str>) -> Result<ExportResult> {
        let started = Instant::now();
        let folder = self.resolve_folder(folder_override).await;
        log_export_start!(section, folder.as_deref().unwrap_or(ROOT_FOLDER));

        let (records, rows) = self.build_rows(section).await?;

        let created_at = Utc::now();
        let title = section.report_title(created_at);
        let spreadsheet = self.gateway.create_spreadsheet(&title).await?;
        let spreadsheet_id = spreadsheet.spreadsheet_id.clone();

        let web_view_link = match self
            .populate(section, &spreadsheet, &records, &rows, folder.as_deref())
            .await
        {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(
                    spreadsheet_id = %spreadsheet_id,
                    title = %title,
                    error = %e,
                    "Export failed after the spreadsheet was created; it is left in place"
                );
                return Err(e);
            }
        };

        let result = ExportResult {
            file_id: spreadsheet_id,
            title,
            web_view_link,
            created_at,
            record_count: records.len(),
        };
        log_export_complete!(result.file_id, result.record_count, started.elapsed());
        Ok(result)
    }

    /// Writes, formats and places a freshly created spreadsheet
    async fn populate(
        &self,
        section: Section,
        spreadsheet: &SpreadsheetDescriptor,
        records: &[Record],
        rows: &[ReportRow],
        folder: Option<&str>,
    ) -> Result<String> {
        let id = spreadsheet.spreadsheet_id.as_str();
        let sheet = spreadsheet.first_sheet().ok_or_else(|| {
            ReportError::Remote(RemoteError::InvalidResponse(format!(
                "spreadsheet {id} was created without a sheet"
            )))
        })?;
        let schema = section.schema();
        let width = schema.width();

        let range = A1Range::block(rows.len(), width)?.on_sheet(Some(sheet));
        self.gateway
            .write_range(id, &range.to_string(), &rows_to_matrix(rows), None)
            .await?;

        self.gateway
            .format_range_header_colored(
                id,
                sheet,
                GridRange::header(width)?,
                Rgb::BRAND_HEADER,
                Rgb::WHITE,
            )
            .await?;

        if self.options.highlight_status && !records.is_empty() {
            if let Some(status_index) = schema.status_index() {
                let highlights = records
                    .iter()
                    .enumerate()
                    .filter_map(|(i, record)| {
                        schema
                            .status_color(&record.status_key())
                            .map(|color| GridRange::body_cell(i, status_index).map(|g| (g, color)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.gateway
                    .format_ranges_background(id, sheet, &highlights)
                    .await?;
            }
        }

        if self.options.auto_resize_columns {
            self.gateway
                .auto_resize_columns(id, sheet, IndexSpan::new(0, width)?)
                .await?;
        }

        let moved_link = match folder {
            Some(folder) => self.storage.move_to_folder(id, folder).await?.web_view_link,
            None => None,
        };

        Ok(moved_link
            .or_else(|| spreadsheet.url.clone())
            .unwrap_or_else(|| spreadsheet_link(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryEntityProvider, MemoryWorkspace};
    use crate::core::settings::CredentialConfig;
    use crate::domain::{records_from_json, CellValue};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        workspace: Arc<MemoryWorkspace>,
        settings: Arc<SettingsStore>,
        orchestrator: ExportOrchestrator,
    }

    async fn fixture(records: Vec<Record>, options: ExportConfig) -> Fixture {
        let dir = TempDir::new().unwrap();
        let settings = Arc::new(
            SettingsStore::open(dir.path().join("settings.json"), dir.path())
                .await
                .unwrap(),
        );
        let workspace = Arc::new(MemoryWorkspace::new());
        let entities = Arc::new(MemoryEntityProvider::new().with_records(Section::Clients, records));
        let orchestrator = ExportOrchestrator::new(
            workspace.clone(),
            workspace.clone(),
            entities,
            settings.clone(),
            options,
        );
        Fixture {
            _dir: dir,
            workspace,
            settings,
            orchestrator,
        }
    }

    fn acme() -> Vec<Record> {
        records_from_json(
            Section::Clients,
            r#"[{"id":1,"name":"Acme","email":"a@x.com","phone":null,"status":"active","notes":null}]"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_export_writes_header_and_rows() {
        let f = fixture(acme(), ExportConfig::default()).await;
        let result = f.orchestrator.export(Section::Clients, None).await.unwrap();

        assert_eq!(result.record_count, 1);
        assert!(result.title.starts_with("CRM Report Clients "));

        let file = f.workspace.file(&result.file_id).unwrap();
        let sheet = &file.sheets[0];
        assert_eq!(sheet.cells[1][1], CellValue::from("Acme"));
        assert_eq!(sheet.header_formats.len(), 1);
        assert_eq!(sheet.header_formats[0].background, Rgb::BRAND_HEADER);
        assert_eq!(sheet.backgrounds.len(), 1);
        assert_eq!(file.parents, vec![ROOT_FOLDER]);
    }

    #[tokio::test]
    async fn test_call_order() {
        let f = fixture(acme(), ExportConfig::default()).await;
        f.workspace.create_folder("F1");
        f.orchestrator.export(Section::Clients, Some("F1")).await.unwrap();

        assert_eq!(
            f.workspace.calls(),
            vec![
                "create_spreadsheet",
                "write_range",
                "format_range_header",
                "format_range_background",
                "auto_resize_columns",
                "move_to_folder",
            ]
        );
    }

    #[tokio::test]
    async fn test_optional_formatting_can_be_disabled() {
        let options = ExportConfig {
            highlight_status: false,
            auto_resize_columns: false,
            ..ExportConfig::default()
        };
        let f = fixture(acme(), options).await;
        f.orchestrator.export(Section::Clients, None).await.unwrap();
        assert_eq!(
            f.workspace.calls(),
            vec!["create_spreadsheet", "write_range", "format_range_header"]
        );
    }

    #[tokio::test]
    async fn test_folder_resolution_order() {
        let options = ExportConfig {
            default_folder_id: Some("CFG".to_string()),
            ..ExportConfig::default()
        };
        let f = fixture(Vec::new(), options).await;
        assert_eq!(f.orchestrator.resolve_folder(None).await.as_deref(), Some("CFG"));

        f.settings
            .save(CredentialConfig {
                folder_id: Some("SAVED".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(f.orchestrator.resolve_folder(None).await.as_deref(), Some("SAVED"));
        assert_eq!(
            f.orchestrator.resolve_folder(Some("OVR")).await.as_deref(),
            Some("OVR")
        );
        assert_eq!(f.orchestrator.resolve_folder(Some("root")).await, None);
    }

    #[tokio::test]
    async fn test_failure_after_creation_leaves_orphan() {
        let f = fixture(acme(), ExportConfig::default()).await;
        f.workspace
            .fail_on("format_range_header", || ReportError::NotFound("sheet".to_string()));

        let err = f.orchestrator.export(Section::Clients, None).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(f.workspace.files().len(), 1);
        assert_eq!(f.workspace.call_count("move_to_folder"), 0);
    }

    #[tokio::test]
    async fn test_record_source_failure_creates_nothing() {
        let f = fixture(acme(), ExportConfig::default()).await;
        let entities = Arc::new(MemoryEntityProvider::new());
        entities.fail_with(|| ReportError::Io("disk".to_string()));
        let orchestrator = ExportOrchestrator::new(
            f.workspace.clone(),
            f.workspace.clone(),
            entities,
            f.settings.clone(),
            ExportConfig::default(),
        );

        assert!(orchestrator.export(Section::Clients, None).await.is_err());
        assert!(f.workspace.calls().is_empty());
    }
}
