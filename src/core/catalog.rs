//! Report catalog
//!
//! Read-only listing of previously exported spreadsheets. A section's reports
//! are the spreadsheets in the destination folder whose name starts with the
//! section's title prefix.

use crate::adapters::traits::FileStorage;
use crate::core::export::ROOT_FOLDER;
use crate::core::settings::SettingsStore;
use crate::domain::{FileDescriptor, Result, Section};
use futures::future::try_join_all;
use std::sync::Arc;

/// Lists exported reports per section
pub struct ReportCatalog {
    storage: Arc<dyn FileStorage>,
    settings: Arc<SettingsStore>,
    default_folder: Option<String>,
}

impl ReportCatalog {
    pub fn new(storage: Arc<dyn FileStorage>, settings: Arc<SettingsStore>) -> Self {
        Self {
            storage,
            settings,
            default_folder: None,
        }
    }

    /// Folder consulted when the settings name none
    pub fn with_default_folder(mut self, folder: Option<String>) -> Self {
        self.default_folder = folder.filter(|f| !f.trim().is_empty());
        self
    }

    async fn folder(&self) -> String {
        self.settings
            .get()
            .await
            .folder_id
            .or_else(|| self.default_folder.clone())
            .unwrap_or_else(|| ROOT_FOLDER.to_string())
    }

    /// Reports of `section`, most recently modified first
    ///
    /// A missing folder yields an empty list; other errors are returned.
    pub async fn list_files(&self, section: Section) -> Result<Vec<FileDescriptor>> {
        let folder = self.folder().await;
        let prefix = section.title_prefix();

        let mut files = match self.storage.list(&folder, prefix).await {
            Ok(files) => files,
            Err(e) if e.is_not_found() => {
                tracing::warn!(folder = %folder, section = %section, "Report folder not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        files.retain(|f| f.name.starts_with(prefix));
        files.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));

        tracing::debug!(section = %section, folder = %folder, count = files.len(), "Reports listed");
        Ok(files)
    }

    /// Reports of every section, listed concurrently
    pub async fn list_all(&self) -> Result<Vec<(Section, Vec<FileDescriptor>)>> {
        let listings = try_join_all(Section::ALL.iter().map(|s| self.list_files(*s))).await?;
        Ok(Section::ALL.into_iter().zip(listings).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryWorkspace;
    use crate::core::settings::CredentialConfig;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    async fn settings(dir: &TempDir, folder: Option<&str>) -> Arc<SettingsStore> {
        let store = SettingsStore::open(dir.path().join("s.json"), dir.path())
            .await
            .unwrap();
        if let Some(folder) = folder {
            store
                .save(CredentialConfig {
                    folder_id: Some(folder.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_lists_only_section_prefix_newest_first() {
        let dir = TempDir::new().unwrap();
        let ws = Arc::new(MemoryWorkspace::new());
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let older = ws.seed_spreadsheet("F1", "CRM Report Deals 2026-01-01", base);
        let newer = ws.seed_spreadsheet("F1", "CRM Report Deals 2026-01-02", base + Duration::days(1));
        ws.seed_spreadsheet("F1", "CRM Report Clients 2026-01-03", base);
        ws.seed_spreadsheet("F1", "Budget", base);

        let catalog = ReportCatalog::new(ws, settings(&dir, Some("F1")).await);
        let ids: Vec<_> = catalog
            .list_files(Section::Deals)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[tokio::test]
    async fn test_missing_folder_is_empty() {
        let dir = TempDir::new().unwrap();
        let catalog = ReportCatalog::new(
            Arc::new(MemoryWorkspace::new()),
            settings(&dir, Some("gone")).await,
        );
        assert!(catalog.list_files(Section::Tasks).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let dir = TempDir::new().unwrap();
        let ws = Arc::new(MemoryWorkspace::new());
        ws.fail_on("list", || crate::domain::ReportError::authentication("denied", "share"));
        let catalog = ReportCatalog::new(ws, settings(&dir, None).await);
        assert!(catalog.list_files(Section::Clients).await.is_err());
    }

    #[tokio::test]
    async fn test_list_all_covers_every_section() {
        let dir = TempDir::new().unwrap();
        let ws = Arc::new(MemoryWorkspace::new());
        ws.seed_spreadsheet("root", "CRM Report Tasks 2026-02-01", Utc::now());

        let catalog = ReportCatalog::new(ws, settings(&dir, None).await);
        let all = catalog.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].0, Section::Tasks);
        assert_eq!(all[2].1.len(), 1);
        assert!(all[0].1.is_empty());
    }
}
