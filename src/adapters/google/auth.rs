//! OAuth2 access tokens for the Google APIs
//!
//! Two credential kinds are supported:
//!
//! - **Service account key** (`credentials_path`): a signed RS256 JWT is
//!   exchanged for an access token (`urn:ietf:params:oauth:grant-type:jwt-bearer`).
//! - **OAuth client secret** (`client_secret_path`): a stored refresh token is
//!   exchanged for an access token (`grant_type=refresh_token`). The refresh
//!   token is read from the file itself (`authorized_user` layout), from a
//!   top-level `refresh_token` field, or from a `token_drive_user.json` file
//!   next to it.
//!
//! Tokens are cached until one minute before they expire.
//! [`SettingsTokenProvider`] picks the credential kind from the current
//! settings record on every call, so a settings change applies to the next
//! remote call without a restart.

use crate::config::{secret_string, SecretString};
use crate::core::settings::{CredentialConfig, SettingsStore};
use crate::domain::{RemoteError, ReportError, Result};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

/// Scopes requested for every token: spreadsheet contents plus file placement
pub const GOOGLE_SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

/// Token endpoint used when a credential file doesn't name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// File the interactive consent flow stores the user refresh token in
pub const USER_TOKEN_FILE_NAME: &str = "token_drive_user.json";

const JWT_LIFETIME_SECS: u64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for the Google APIs
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently valid access token
    ///
    /// # Errors
    ///
    /// `Authentication` when no credentials are configured or the token
    /// endpoint rejects them.
    async fn access_token(&self) -> Result<SecretString>;

    /// Forget any cached token so the next call fetches a fresh one
    async fn invalidate(&self) {}
}

/// Fixed token, for tests and pre-authorized environments
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(secret_string(token.into()))
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<SecretString> {
        Ok(self.0.clone())
    }
}

#[derive(Debug)]
struct CachedToken {
    token: SecretString,
    expires_at: SystemTime,
}

#[derive(Debug, Default)]
struct TokenCache(RwLock<Option<CachedToken>>);

impl TokenCache {
    async fn fresh(&self) -> Option<SecretString> {
        let cached = self.0.read().await;
        cached
            .as_ref()
            .filter(|t| t.expires_at > SystemTime::now() + REFRESH_MARGIN)
            .map(|t| t.token.clone())
    }

    async fn store(&self, token: SecretString, expires_in: u64) {
        *self.0.write().await = Some(CachedToken {
            token,
            expires_at: SystemTime::now() + Duration::from_secs(expires_in),
        });
    }

    async fn clear(&self) {
        *self.0.write().await = None;
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: SecretString,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    JWT_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Posts a token request form and maps failures to report errors
async fn exchange(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
    hint: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ReportError::Remote(RemoteError::Timeout(e.to_string()))
            } else {
                ReportError::Remote(RemoteError::ConnectionFailed(format!(
                    "token endpoint {token_uri}: {e}"
                )))
            }
        })?;

    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<TokenErrorBody>(&body)
            .map(|b| match b.error_description {
                Some(description) => format!("{}: {}", b.error, description),
                None => b.error,
            })
            .unwrap_or(body);

        return Err(match status {
            400 | 401 | 403 => ReportError::authentication(
                format!("token request rejected ({status}): {message}"),
                hint,
            ),
            429 => ReportError::RateLimit {
                attempts: 1,
                message,
            },
            500..=599 => ReportError::Remote(RemoteError::ServerError { status, message }),
            _ => ReportError::Remote(RemoteError::ClientError { status, message }),
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| ReportError::Remote(RemoteError::InvalidResponse(e.to_string())))
}

async fn read_credential_file(path: &Path, field: &str) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        ReportError::authentication(
            format!("cannot read {field} '{}': {e}", path.display()),
            format!(
                "check that the file exists or set `{field}` with `crm-reports settings set --{}`",
                field.replace('_', "-")
            ),
        )
    })
}

#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: SecretString,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

const SERVICE_ACCOUNT_HINT: &str =
    "import a valid service account key with `crm-reports settings import service-account <file>`";

/// Service-account key authenticator
#[derive(Debug)]
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    client: Client,
    cache: TokenCache,
}

impl ServiceAccountAuth {
    /// Reads a JSON key file
    pub async fn from_file(path: impl AsRef<Path>, client: Client) -> Result<Self> {
        let content = read_credential_file(path.as_ref(), "credentials_path").await?;
        Self::from_json(&content, client)
    }

    /// Parses JSON key content
    pub fn from_json(json: &str, client: Client) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(json).map_err(|e| {
            ReportError::authentication(
                format!("service account key is invalid: {e}"),
                SERVICE_ACCOUNT_HINT,
            )
        })?;
        Ok(Self {
            key,
            client,
            cache: TokenCache::default(),
        })
    }

    /// Email the service account acts as
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn token_uri(&self) -> &str {
        self.key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn signed_assertion(&self) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ReportError::Other(format!("system clock before epoch: {e}")))?
            .as_secs();

        let claims = JwtClaims {
            iss: &self.key.client_email,
            scope: GOOGLE_SCOPES,
            aud: self.token_uri(),
            iat: now,
            exp: now + JWT_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.key.private_key.expose_secret().as_str().as_bytes())
            .map_err(|e| {
                ReportError::authentication(
                    format!("service account private key is unusable: {e}"),
                    SERVICE_ACCOUNT_HINT,
                )
            })?;

        encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| {
            ReportError::authentication(format!("cannot sign token request: {e}"), SERVICE_ACCOUNT_HINT)
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<SecretString> {
        if let Some(token) = self.cache.fresh().await {
            return Ok(token);
        }

        let assertion = self.signed_assertion()?;
        let response = exchange(
            &self.client,
            self.token_uri(),
            &[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &assertion),
            ],
            SERVICE_ACCOUNT_HINT,
        )
        .await?;

        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = response.expires_in,
            "Service account token acquired"
        );
        self.cache
            .store(response.access_token.clone(), response.expires_in)
            .await;
        Ok(response.access_token)
    }

    async fn invalidate(&self) {
        self.cache.clear().await;
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: SecretString,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    refresh_token: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    #[serde(default)]
    installed: Option<ClientSection>,
    #[serde(default)]
    web: Option<ClientSection>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(flatten)]
    top_level: Option<ClientSection>,
}

#[derive(Debug, Deserialize)]
struct StoredUserToken {
    #[serde(default)]
    refresh_token: Option<SecretString>,
}

const CLIENT_SECRET_HINT: &str =
    "provide an OAuth client secret with a refresh token (`authorized_user` JSON) via `crm-reports settings import client-secret <file>`";

/// OAuth user-credential authenticator driven by a refresh token
#[derive(Debug)]
pub struct AuthorizedUserAuth {
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
    token_uri: String,
    client: Client,
    cache: TokenCache,
}

impl AuthorizedUserAuth {
    /// Reads a client-secret file and locates its refresh token
    pub async fn from_file(path: impl AsRef<Path>, client: Client) -> Result<Self> {
        let path = path.as_ref();
        let content = read_credential_file(path, "client_secret_path").await?;
        let sibling = match path.parent() {
            Some(dir) => tokio::fs::read_to_string(dir.join(USER_TOKEN_FILE_NAME))
                .await
                .ok(),
            None => None,
        };
        Self::from_json(&content, sibling.as_deref(), client)
    }

    /// Parses client-secret JSON, optionally with a stored user token document
    pub fn from_json(json: &str, stored_token: Option<&str>, client: Client) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(json).map_err(|e| {
            ReportError::authentication(format!("client secret file is invalid: {e}"), CLIENT_SECRET_HINT)
        })?;

        let is_authorized_user = file.kind.as_deref() == Some("authorized_user");
        let section = file
            .installed
            .or(file.web)
            .or(file.top_level)
            .ok_or_else(|| {
                ReportError::authentication(
                    "client secret file has no `installed`, `web` or `authorized_user` client",
                    CLIENT_SECRET_HINT,
                )
            })?;

        let refresh_token = section
            .refresh_token
            .clone()
            .or_else(|| {
                stored_token
                    .and_then(|t| serde_json::from_str::<StoredUserToken>(t).ok())
                    .and_then(|t| t.refresh_token)
            })
            .ok_or_else(|| {
                ReportError::authentication(
                    "client secret file has no refresh token; interactive consent is not available",
                    CLIENT_SECRET_HINT,
                )
            })?;

        tracing::debug!(
            client_id = %section.client_id,
            authorized_user = is_authorized_user,
            "OAuth client credentials loaded"
        );

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
            refresh_token,
            token_uri: section
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            client,
            cache: TokenCache::default(),
        })
    }
}

#[async_trait]
impl TokenProvider for AuthorizedUserAuth {
    async fn access_token(&self) -> Result<SecretString> {
        if let Some(token) = self.cache.fresh().await {
            return Ok(token);
        }

        let response = exchange(
            &self.client,
            &self.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("client_id", &self.client_id),
                ("client_secret", self.client_secret.expose_secret().as_str()),
                ("refresh_token", self.refresh_token.expose_secret().as_str()),
            ],
            CLIENT_SECRET_HINT,
        )
        .await?;

        tracing::debug!(expires_in = response.expires_in, "User access token refreshed");
        self.cache
            .store(response.access_token.clone(), response.expires_in)
            .await;
        Ok(response.access_token)
    }

    async fn invalidate(&self) {
        self.cache.clear().await;
    }
}

/// Credential file selected from the settings record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    ClientSecret(String),
    ServiceAccount(String),
}

impl CredentialSource {
    /// The client secret wins when both are configured
    pub fn from_settings(settings: &CredentialConfig) -> Result<Self> {
        if let Some(path) = &settings.client_secret_path {
            return Ok(CredentialSource::ClientSecret(path.clone()));
        }
        if let Some(path) = &settings.credentials_path {
            return Ok(CredentialSource::ServiceAccount(path.clone()));
        }
        Err(ReportError::missing_credentials("credentials_path"))
    }

    async fn build(&self, client: Client) -> Result<Arc<dyn TokenProvider>> {
        Ok(match self {
            CredentialSource::ClientSecret(path) => {
                Arc::new(AuthorizedUserAuth::from_file(path, client).await?)
            }
            CredentialSource::ServiceAccount(path) => {
                Arc::new(ServiceAccountAuth::from_file(path, client).await?)
            }
        })
    }
}

/// Token provider following the live settings record
pub struct SettingsTokenProvider {
    settings: Arc<SettingsStore>,
    client: Client,
    current: Mutex<Option<(CredentialSource, Arc<dyn TokenProvider>)>>,
}

impl SettingsTokenProvider {
    pub fn new(settings: Arc<SettingsStore>, client: Client) -> Self {
        Self {
            settings,
            client,
            current: Mutex::new(None),
        }
    }

    async fn provider(&self) -> Result<Arc<dyn TokenProvider>> {
        let source = CredentialSource::from_settings(&self.settings.get().await)?;

        let mut current = self.current.lock().await;
        if let Some((cached_source, provider)) = current.as_ref() {
            if *cached_source == source {
                return Ok(Arc::clone(provider));
            }
        }

        tracing::info!(source = ?source, "Loading Google credentials");
        let provider = source.build(self.client.clone()).await?;
        *current = Some((source, Arc::clone(&provider)));
        Ok(provider)
    }
}

#[async_trait]
impl TokenProvider for SettingsTokenProvider {
    async fn access_token(&self) -> Result<SecretString> {
        self.provider().await?.access_token().await
    }

    async fn invalidate(&self) {
        let provider = self.current.lock().await.as_ref().map(|(_, p)| Arc::clone(p));
        if let Some(provider) = provider {
            provider.invalidate().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_source_prefers_client_secret() {
        let settings = CredentialConfig {
            folder_id: None,
            credentials_path: Some("sa.json".to_string()),
            client_secret_path: Some("cs.json".to_string()),
        };
        assert_eq!(
            CredentialSource::from_settings(&settings).unwrap(),
            CredentialSource::ClientSecret("cs.json".to_string())
        );
    }

    #[test]
    fn test_credential_source_requires_a_path() {
        let err = CredentialSource::from_settings(&CredentialConfig::default()).unwrap_err();
        assert!(matches!(err, ReportError::Authentication { .. }));
        assert!(err.to_string().contains("credentials_path"));
    }

    #[test]
    fn test_service_account_key_rejects_garbage() {
        let err = ServiceAccountAuth::from_json("{}", Client::new()).unwrap_err();
        assert!(matches!(err, ReportError::Authentication { .. }));
    }

    #[test]
    fn test_authorized_user_layout() {
        let json = r#"{
            "type": "authorized_user",
            "client_id": "id",
            "client_secret": "secret",
            "refresh_token": "1//refresh"
        }"#;
        let auth = AuthorizedUserAuth::from_json(json, None, Client::new()).unwrap();
        assert_eq!(auth.client_id, "id");
        assert_eq!(auth.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_installed_layout_uses_stored_token() {
        let json = r#"{"installed": {
            "client_id": "id",
            "client_secret": "secret",
            "token_uri": "http://localhost/token"
        }}"#;
        let stored = r#"{"refresh_token": "1//stored"}"#;
        let auth = AuthorizedUserAuth::from_json(json, Some(stored), Client::new()).unwrap();
        assert_eq!(auth.refresh_token.expose_secret().as_str(), "1//stored");
        assert_eq!(auth.token_uri, "http://localhost/token");
    }

    #[test]
    fn test_installed_layout_without_refresh_token() {
        let json = r#"{"installed": {"client_id": "id", "client_secret": "secret"}}"#;
        let err = AuthorizedUserAuth::from_json(json, None, Client::new()).unwrap_err();
        match err {
            ReportError::Authentication { message, hint } => {
                assert!(message.contains("refresh token"));
                assert!(hint.contains("client-secret"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_static_token() {
        let token = StaticToken::new("abc").access_token().await.unwrap();
        assert_eq!(token.expose_secret().as_str(), "abc");
    }
}
