//! Record source reading JSON exports of the CRUD layer
//!
//! Each section lives in `<data_dir>/<section>.json` as an array of records.
//! A missing file means the section has no records yet.

use super::traits::{EntityFilter, EntityProvider};
use crate::domain::{records_from_json, Record, ReportError, Result, Section};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads section files from one directory on every call
pub struct JsonDirEntityProvider {
    data_dir: PathBuf,
}

impl JsonDirEntityProvider {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// File holding the records of `section`
    pub fn section_path(&self, section: Section) -> PathBuf {
        self.data_dir.join(format!("{}.json", section.as_str()))
    }
}

#[async_trait]
impl EntityProvider for JsonDirEntityProvider {
    async fn list_entities(&self, section: Section, filter: &EntityFilter) -> Result<Vec<Record>> {
        let path = self.section_path(section);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No record file, section is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let records = records_from_json(section, &content).map_err(|e| {
            ReportError::Serialization(format!("{}: {e}", path.display()))
        })?;

        tracing::debug!(
            section = %section,
            total = records.len(),
            limit = ?filter.limit,
            "Records loaded"
        );
        Ok(filter.apply(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty_section() {
        let dir = TempDir::new().unwrap();
        let provider = JsonDirEntityProvider::new(dir.path());
        let records = provider
            .list_entities(Section::Deals, &EntityFilter::default())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_reads_section_file_with_limit() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("clients.json"),
            r#"[
                {"id": 1, "name": "Acme", "status": "active"},
                {"id": 2, "name": "Globex", "status": "archived"},
                {"id": 3, "name": "Initech", "status": "active"}
            ]"#,
        )
        .unwrap();

        let provider = JsonDirEntityProvider::new(dir.path());
        let records = provider
            .list_entities(Section::Clients, &EntityFilter::with_limit(2))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.section() == Section::Clients));
    }

    #[tokio::test]
    async fn test_malformed_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tasks.json"), "{").unwrap();
        let provider = JsonDirEntityProvider::new(dir.path());
        let err = provider
            .list_entities(Section::Tasks, &EntityFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Serialization(_)));
    }
}
