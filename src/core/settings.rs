//! Credential settings store
//!
//! The settings record (destination folder, service-account key path, OAuth
//! client-secret path) is the only process-wide mutable state of the
//! exporter. [`SettingsStore`] owns it with a fixed lifecycle:
//!
//! 1. **Load on start**: [`SettingsStore::open`] reads the JSON file once; a
//!    missing file yields an all-unset record.
//! 2. **Serve from cache**: [`SettingsStore::get`] clones the cached record.
//! 3. **Replace on save**: [`SettingsStore::save`] validates, rewrites the file
//!    through a temp file and rename, then swaps the cached `Arc` in one step.
//!
//! Saves are serialized by a writer lock. Readers racing a save observe either
//! the old record or the new one, never a mix.

use crate::config::SettingsConfig;
use crate::domain::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Credential configuration record
///
/// An unset field means "use the default" and is never an error by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Drive folder new reports are moved into
    #[serde(default)]
    pub folder_id: Option<String>,

    /// Service-account key file
    #[serde(default)]
    pub credentials_path: Option<String>,

    /// OAuth client-secret file carrying a refresh token
    #[serde(default)]
    pub client_secret_path: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CredentialConfig {
    /// Trims every field and turns empty strings into `None`
    pub fn normalized(self) -> Self {
        Self {
            folder_id: non_empty(self.folder_id),
            credentials_path: non_empty(self.credentials_path),
            client_secret_path: non_empty(self.client_secret_path),
        }
    }

    /// Fields set in `patch` replace the fields of `self`
    pub fn merged(&self, patch: &CredentialConfig) -> Self {
        let patch = patch.clone().normalized();
        Self {
            folder_id: patch.folder_id.or_else(|| self.folder_id.clone()),
            credentials_path: patch
                .credentials_path
                .or_else(|| self.credentials_path.clone()),
            client_secret_path: patch
                .client_secret_path
                .or_else(|| self.client_secret_path.clone()),
        }
    }

    /// True when no credential file is configured
    pub fn has_credentials(&self) -> bool {
        self.credentials_path.is_some() || self.client_secret_path.is_some()
    }
}

/// Kinds of credential files the store can import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    ServiceAccount,
    ClientSecret,
}

impl CredentialKind {
    /// Settings field holding the path of this kind
    pub fn field_name(&self) -> &'static str {
        match self {
            CredentialKind::ServiceAccount => "credentials_path",
            CredentialKind::ClientSecret => "client_secret_path",
        }
    }

    /// File name used when the file is copied into the credentials directory
    pub fn canonical_file_name(&self) -> &'static str {
        match self {
            CredentialKind::ServiceAccount => "service_account.json",
            CredentialKind::ClientSecret => "client_secret.json",
        }
    }

    /// `config` with this kind's path field set to `path`
    fn pointed_at(&self, config: &CredentialConfig, path: &str) -> CredentialConfig {
        let mut patch = CredentialConfig::default();
        match self {
            CredentialKind::ServiceAccount => patch.credentials_path = Some(path.to_string()),
            CredentialKind::ClientSecret => patch.client_secret_path = Some(path.to_string()),
        }
        config.merged(&patch)
    }
}

/// Checks that `path` names a readable `.json` file holding a JSON object
///
/// # Errors
///
/// `Validation` naming `field` when the extension, the file or its content is wrong.
pub async fn validate_credential_file(field: &str, path: &str) -> Result<()> {
    let has_json_extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !has_json_extension {
        return Err(ReportError::Validation(format!(
            "{field} '{path}' must reference a .json credential file"
        )));
    }

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        ReportError::Validation(format!("{field} '{path}' cannot be read: {e}"))
    })?;

    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(serde_json::Value::Object(_)) => Ok(()),
        Ok(_) => Err(ReportError::Validation(format!(
            "{field} '{path}' must contain a JSON object"
        ))),
        Err(e) => Err(ReportError::Validation(format!(
            "{field} '{path}' is not valid JSON: {e}"
        ))),
    }
}

/// Process-wide owner of the credential settings record
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    credentials_dir: PathBuf,
    current: RwLock<Arc<CredentialConfig>>,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Opens the store described by the `[settings]` configuration section
    pub async fn from_config(config: &SettingsConfig) -> Result<Self> {
        Self::open(&config.path, &config.credentials_dir).await
    }

    /// Loads the record at `path`
    ///
    /// A missing file yields the all-unset record. An unreadable or corrupt
    /// file is logged and treated the same way, so a broken record can be
    /// repaired with a save.
    pub async fn open(path: impl AsRef<Path>, credentials_dir: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let initial = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<CredentialConfig>(&content) {
                Ok(config) => config.normalized(),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Settings file is not valid JSON, starting with empty settings"
                    );
                    CredentialConfig::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CredentialConfig::default(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Settings file cannot be read, starting with empty settings"
                );
                CredentialConfig::default()
            }
        };

        tracing::debug!(
            path = %path.display(),
            folder_set = initial.folder_id.is_some(),
            credentials_set = initial.has_credentials(),
            "Settings loaded"
        );

        Ok(Self {
            path,
            credentials_dir: credentials_dir.as_ref().to_path_buf(),
            current: RwLock::new(Arc::new(initial)),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the persisted record
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last successfully saved record
    pub async fn get(&self) -> CredentialConfig {
        self.current.read().await.as_ref().clone()
    }

    /// Validates and stores `config`, replacing the whole record
    ///
    /// # Errors
    ///
    /// `Validation` when a credential path is wrong; nothing is written and
    /// the previous record stays in effect. `Io` when the file can't be written.
    pub async fn save(&self, config: CredentialConfig) -> Result<CredentialConfig> {
        let _guard = self.write_lock.lock().await;
        self.save_locked(config.normalized()).await
    }

    /// Merges the set fields of `patch` over the current record and saves it
    pub async fn update(&self, patch: CredentialConfig) -> Result<CredentialConfig> {
        let _guard = self.write_lock.lock().await;
        let merged = self.current.read().await.merged(&patch);
        self.save_locked(merged).await
    }

    /// Copies a credential file into the credentials directory and points the settings at it
    ///
    /// The source and the rest of the resulting record are validated before
    /// the canonical file is replaced.
    pub async fn import_credential(
        &self,
        kind: CredentialKind,
        source: impl AsRef<Path>,
    ) -> Result<CredentialConfig> {
        let source = source.as_ref();
        let destination = self.credentials_dir.join(kind.canonical_file_name());

        let _guard = self.write_lock.lock().await;
        let current = self.current.read().await.as_ref().clone();
        validate_record(&kind.pointed_at(&current, &source.to_string_lossy())).await?;

        tokio::fs::create_dir_all(&self.credentials_dir).await?;
        let staged = destination.with_extension("json.tmp");
        tokio::fs::copy(source, &staged).await?;
        tokio::fs::rename(&staged, &destination).await?;

        let destination = destination.to_string_lossy().to_string();
        tracing::info!(
            field = kind.field_name(),
            destination = %destination,
            "Credential file imported"
        );
        self.save_locked(kind.pointed_at(&current, &destination)).await
    }

    async fn save_locked(&self, config: CredentialConfig) -> Result<CredentialConfig> {
        validate_record(&config).await?;

        self.persist(&config).await?;

        *self.current.write().await = Arc::new(config.clone());

        tracing::info!(
            path = %self.path.display(),
            folder_set = config.folder_id.is_some(),
            credentials_set = config.has_credentials(),
            "Settings saved"
        );
        Ok(config)
    }

    async fn persist(&self, config: &CredentialConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

async fn validate_record(config: &CredentialConfig) -> Result<()> {
    if let Some(path) = &config.credentials_path {
        validate_credential_file("credentials_path", path).await?;
    }
    if let Some(path) = &config.client_secret_path {
        validate_credential_file("client_secret_path", path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> SettingsStore {
        SettingsStore::open(dir.path().join("settings.json"), dir.path().join("creds"))
            .await
            .unwrap()
    }

    fn write_json(dir: &TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_get_before_any_save_is_unset() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        assert_eq!(store.get().await, CredentialConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_get_returns_saved_values() {
        let dir = TempDir::new().unwrap();
        let key = write_json(&dir, "key.json", r#"{"type":"service_account"}"#);
        let store = store(&dir).await;

        let config = CredentialConfig {
            folder_id: Some("F1".to_string()),
            credentials_path: Some(key.clone()),
            client_secret_path: None,
        };
        store.save(config.clone()).await.unwrap();

        assert_eq!(store.get().await, config);
    }

    #[tokio::test]
    async fn test_bad_extension_is_rejected_and_prior_value_kept() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store
            .save(CredentialConfig {
                folder_id: Some("F0".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = store
            .save(CredentialConfig {
                folder_id: Some("F1".to_string()),
                credentials_path: Some("bad.txt".to_string()),
                client_secret_path: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::Validation(_)));
        assert_eq!(store.get().await.folder_id.as_deref(), Some("F0"));

        let reopened = SettingsStore::open(store.path(), dir.path()).await.unwrap();
        assert_eq!(reopened.get().await.folder_id.as_deref(), Some("F0"));
    }

    #[tokio::test]
    async fn test_invalid_json_content_is_rejected() {
        let dir = TempDir::new().unwrap();
        let broken = write_json(&dir, "broken.json", "{not json");
        let store = store(&dir).await;

        let err = store
            .save(CredentialConfig {
                client_secret_path: Some(broken),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("client_secret_path"));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_empty_strings_become_unset() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let saved = store
            .save(CredentialConfig {
                folder_id: Some("  ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.folder_id, None);
    }

    #[tokio::test]
    async fn test_update_merges_set_fields() {
        let dir = TempDir::new().unwrap();
        let key = write_json(&dir, "key.json", "{}");
        let store = store(&dir).await;
        store
            .save(CredentialConfig {
                folder_id: Some("F1".to_string()),
                credentials_path: Some(key.clone()),
                client_secret_path: None,
            })
            .await
            .unwrap();

        let updated = store
            .update(CredentialConfig {
                folder_id: Some("F2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.folder_id.as_deref(), Some("F2"));
        assert_eq!(updated.credentials_path.as_deref(), Some(key.as_str()));
    }

    #[tokio::test]
    async fn test_reopen_loads_persisted_record() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store
            .save(CredentialConfig {
                folder_id: Some("F9".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let reopened = SettingsStore::open(store.path(), dir.path()).await.unwrap();
        assert_eq!(reopened.get().await.folder_id.as_deref(), Some("F9"));
    }

    #[tokio::test]
    async fn test_corrupt_settings_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_json(&dir, "settings.json", "][");
        let store = SettingsStore::open(&path, dir.path()).await.unwrap();
        assert_eq!(store.get().await, CredentialConfig::default());
    }

    #[tokio::test]
    async fn test_import_copies_under_canonical_name() {
        let dir = TempDir::new().unwrap();
        let source = write_json(&dir, "downloaded-key-123.json", r#"{"client_email":"x"}"#);
        let store = store(&dir).await;

        let saved = store
            .import_credential(CredentialKind::ServiceAccount, &source)
            .await
            .unwrap();

        let expected = dir.path().join("creds").join("service_account.json");
        assert!(expected.exists());
        assert_eq!(
            saved.credentials_path.as_deref(),
            Some(expected.to_string_lossy().as_ref())
        );
    }

    #[tokio::test]
    async fn test_import_rejects_non_json_source() {
        let dir = TempDir::new().unwrap();
        let source = write_json(&dir, "secret.txt", "{}");
        let store = store(&dir).await;

        let err = store
            .import_credential(CredentialKind::ClientSecret, &source)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(!dir.path().join("creds").exists());
    }

    #[tokio::test]
    async fn test_rejected_import_leaves_canonical_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let first = write_json(&dir, "first.json", r#"{"who":"A"}"#);
        store
            .import_credential(CredentialKind::ServiceAccount, &first)
            .await
            .unwrap();

        let secret = write_json(&dir, "x.json", "{}");
        store
            .update(CredentialConfig {
                client_secret_path: Some(secret.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        std::fs::remove_file(&secret).unwrap();
        let before = store.get().await;

        let second = write_json(&dir, "second.json", r#"{"who":"B"}"#);
        let err = store
            .import_credential(CredentialKind::ServiceAccount, &second)
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::Validation(_)));
        assert_eq!(store.get().await, before);
        let canonical = dir.path().join("creds").join("service_account.json");
        let on_disk = std::fs::read_to_string(canonical).unwrap();
        assert!(on_disk.contains("\"A\""));
        assert!(!dir.path().join("creds").join("service_account.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_records() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store(&dir).await);

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for i in 0..20 {
                    store
                        .save(CredentialConfig {
                            folder_id: Some(format!("F{i}")),
                            credentials_path: None,
                            client_secret_path: None,
                        })
                        .await
                        .unwrap();
                }
            })
        };

        for _ in 0..50 {
            let seen = store.get().await;
            assert!(seen.credentials_path.is_none());
            if let Some(folder) = seen.folder_id {
                assert!(folder.starts_with('F'));
            }
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
        assert_eq!(store.get().await.folder_id.as_deref(), Some("F19"));
    }
}
