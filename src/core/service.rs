//! Report service
//!
//! Entry point for callers above the export subsystem. Wires the settings
//! store, the spreadsheet gateway, the file storage and the record source
//! into an [`ExportOrchestrator`] and a [`ReportCatalog`].

use crate::adapters::google;
use crate::adapters::memory::MemoryWorkspace;
use crate::adapters::records::JsonDirEntityProvider;
use crate::adapters::traits::{EntityProvider, FileStorage, SpreadsheetGateway};
use crate::config::{ExportConfig, ReportsConfig};
use crate::core::catalog::ReportCatalog;
use crate::core::export::ExportOrchestrator;
use crate::core::settings::{CredentialConfig, CredentialKind, SettingsStore};
use crate::domain::{ExportResult, FileDescriptor, ReportRow, Result, Section};
use std::path::Path;
use std::sync::Arc;

/// Facade over export, listing and settings
pub struct ReportService {
    orchestrator: ExportOrchestrator,
    catalog: ReportCatalog,
    settings: Arc<SettingsStore>,
}

impl ReportService {
    pub fn new(
        gateway: Arc<dyn SpreadsheetGateway>,
        storage: Arc<dyn FileStorage>,
        entities: Arc<dyn EntityProvider>,
        settings: Arc<SettingsStore>,
        export: ExportConfig,
    ) -> Self {
        let catalog = ReportCatalog::new(storage.clone(), settings.clone())
            .with_default_folder(export.default_folder_id.clone());
        let orchestrator = ExportOrchestrator::new(gateway, storage, entities, settings.clone(), export);
        Self {
            orchestrator,
            catalog,
            settings,
        }
    }

    /// Service talking to Google, reading records from the configured data directory
    ///
    /// Credentials are resolved lazily, so a service can be built before any
    /// credential file has been configured.
    pub async fn from_config(config: &ReportsConfig) -> Result<Self> {
        let settings = Arc::new(SettingsStore::from_config(&config.settings).await?);
        let (sheets, drive) = google::connect_with_settings(&config.google, settings.clone())?;
        let entities = Arc::new(JsonDirEntityProvider::new(&config.records.data_dir));

        tracing::debug!(
            settings = %settings.path().display(),
            data_dir = %config.records.data_dir,
            "Report service ready"
        );

        Ok(Self::new(
            Arc::new(sheets),
            Arc::new(drive),
            entities,
            settings,
            config.export.clone(),
        ))
    }

    /// Service backed by an in-process workspace, for dry runs
    ///
    /// The resolved destination folder is created in the workspace so that
    /// placement succeeds.
    pub async fn in_memory(
        config: &ReportsConfig,
        entities: Arc<dyn EntityProvider>,
    ) -> Result<(Self, Arc<MemoryWorkspace>)> {
        let settings = Arc::new(SettingsStore::from_config(&config.settings).await?);
        let workspace = Arc::new(MemoryWorkspace::new());
        let service = Self::new(
            workspace.clone(),
            workspace.clone(),
            entities,
            settings,
            config.export.clone(),
        );
        if let Some(folder) = service.resolve_folder(None).await {
            workspace.create_folder(&folder);
        }
        Ok((service, workspace))
    }

    pub async fn export(&self, section: Section, folder_override: Option<&str>) -> Result<ExportResult> {
        self.orchestrator.export(section, folder_override).await
    }

    /// Rows an export of `section` would write, without touching remote state
    pub async fn preview(&self, section: Section) -> Result<Vec<ReportRow>> {
        Ok(self.orchestrator.build_rows(section).await?.1)
    }

    pub async fn resolve_folder(&self, folder_override: Option<&str>) -> Option<String> {
        self.orchestrator.resolve_folder(folder_override).await
    }

    pub async fn list_files(&self, section: Section) -> Result<Vec<FileDescriptor>> {
        self.catalog.list_files(section).await
    }

    pub async fn list_all(&self) -> Result<Vec<(Section, Vec<FileDescriptor>)>> {
        self.catalog.list_all().await
    }

    pub async fn get_settings(&self) -> CredentialConfig {
        self.settings.get().await
    }

    pub async fn save_settings(&self, config: CredentialConfig) -> Result<CredentialConfig> {
        self.settings.save(config).await
    }

    pub async fn update_settings(&self, patch: CredentialConfig) -> Result<CredentialConfig> {
        self.settings.update(patch).await
    }

    pub async fn import_credential(
        &self,
        kind: CredentialKind,
        source: impl AsRef<Path>,
    ) -> Result<CredentialConfig> {
        self.settings.import_credential(kind, source).await
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }
}
