//! Drive API v3 file storage
//!
//! Spreadsheets are created by the Sheets API in the caller's root folder and
//! then re-parented here. Listing is scoped to one folder and to non-trashed
//! native spreadsheets.

use super::client::GoogleApiClient;
use crate::adapters::traits::{FileStorage, SPREADSHEET_MIME_TYPE};
use crate::config::GoogleConfig;
use crate::domain::{FileDescriptor, ReportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use url::Url;

const FILE_FIELDS: &str = "id,name,mimeType,modifiedTime,webViewLink";
const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    web_view_link: Option<String>,
}

impl From<DriveFile> for FileDescriptor {
    fn from(file: DriveFile) -> Self {
        FileDescriptor {
            id: file.id,
            name: file.name,
            modified_time: file.modified_time,
            web_view_link: file.web_view_link,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileParents {
    #[serde(default)]
    parents: Vec<String>,
}

/// Escapes a value for use inside a single-quoted Drive query literal
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Drive search expression for spreadsheets in `folder_id` named like `prefix`
pub fn listing_query(folder_id: &str, name_prefix: &str) -> String {
    let mut query = format!(
        "trashed = false and mimeType = '{SPREADSHEET_MIME_TYPE}' and '{}' in parents",
        escape_query_literal(folder_id)
    );
    if !name_prefix.is_empty() {
        query.push_str(&format!(
            " and name contains '{}'",
            escape_query_literal(name_prefix)
        ));
    }
    query
}

/// File storage backed by the Google Drive REST API
pub struct GoogleDriveStorage {
    api: GoogleApiClient,
    base_url: String,
}

impl GoogleDriveStorage {
    pub fn new(api: GoogleApiClient, config: &GoogleConfig) -> Self {
        Self {
            api,
            base_url: config.drive_base_url.clone(),
        }
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = GoogleApiClient::endpoint(&self.base_url, segments)?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    /// Fails with `NotFound` unless `folder_id` names a folder
    async fn ensure_folder(&self, folder_id: &str) -> Result<()> {
        if folder_id == "root" {
            return Ok(());
        }
        let url = self.url(
            &["files", folder_id],
            &[("fields", "id,mimeType,trashed"), ("supportsAllDrives", "true")],
        )?;
        let folder: serde_json::Value = self.api.send(Method::GET, url, None).await?;
        let is_folder = folder["mimeType"] == "application/vnd.google-apps.folder";
        let trashed = folder["trashed"].as_bool().unwrap_or(false);
        if !is_folder || trashed {
            return Err(ReportError::NotFound(format!("folder {folder_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl FileStorage for GoogleDriveStorage {
    async fn create_in_folder(
        &self,
        name: &str,
        mime_type: &str,
        folder_id: Option<&str>,
    ) -> Result<FileDescriptor> {
        let url = self.url(
            &["files"],
            &[("fields", FILE_FIELDS), ("supportsAllDrives", "true")],
        )?;
        let mut body = json!({ "name": name, "mimeType": mime_type });
        if let Some(folder_id) = folder_id {
            body["parents"] = json!([folder_id]);
        }
        let created: DriveFile = self.api.send(Method::POST, url, Some(&body)).await?;

        tracing::info!(file_id = %created.id, folder = ?folder_id, "File created");
        Ok(created.into())
    }

    async fn move_to_folder(&self, file_id: &str, folder_id: &str) -> Result<FileDescriptor> {
        let url = self.url(
            &["files", file_id],
            &[("fields", "parents"), ("supportsAllDrives", "true")],
        )?;
        let current: FileParents = self.api.send(Method::GET, url, None).await?;
        let previous = current
            .parents
            .iter()
            .filter(|p| p.as_str() != folder_id)
            .cloned()
            .collect::<Vec<_>>()
            .join(",");

        let mut query = vec![
            ("addParents", folder_id),
            ("fields", FILE_FIELDS),
            ("supportsAllDrives", "true"),
        ];
        if !previous.is_empty() {
            query.push(("removeParents", previous.as_str()));
        }
        let url = self.url(&["files", file_id], &query)?;
        let moved: DriveFile = self.api.send(Method::PATCH, url, Some(&json!({}))).await?;

        tracing::info!(file_id, folder_id, "File moved");
        Ok(moved.into())
    }

    async fn list(&self, folder_id: &str, name_prefix: &str) -> Result<Vec<FileDescriptor>> {
        self.ensure_folder(folder_id).await?;

        let q = listing_query(folder_id, name_prefix);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("q", q.as_str()),
                ("fields", "nextPageToken,files(id,name,mimeType,modifiedTime,webViewLink)"),
                ("orderBy", "modifiedTime desc"),
                ("pageSize", PAGE_SIZE),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let url = self.url(&["files"], &query)?;
            let page: FileList = self.api.send(Method::GET, url, None).await?;

            files.extend(
                page.files
                    .into_iter()
                    .filter(|f| f.name.starts_with(name_prefix))
                    .map(FileDescriptor::from),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(folder_id, name_prefix, count = files.len(), "Files listed");
        Ok(files)
    }
}
