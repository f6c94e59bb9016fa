//! Google Sheets and Drive adapters

pub mod auth;
pub mod client;
pub mod drive;
pub mod sheets;

pub use auth::{
    AuthorizedUserAuth, CredentialSource, ServiceAccountAuth, SettingsTokenProvider, StaticToken,
    TokenProvider, GOOGLE_SCOPES,
};
pub use client::{classify, http_client, GoogleApiClient};
pub use drive::GoogleDriveStorage;
pub use sheets::GoogleSheetsGateway;

use crate::config::GoogleConfig;
use crate::core::settings::SettingsStore;
use crate::domain::Result;
use std::sync::Arc;

/// Gateway and storage sharing one authorized client
pub fn connect(
    config: &GoogleConfig,
    tokens: Arc<dyn TokenProvider>,
) -> Result<(GoogleSheetsGateway, GoogleDriveStorage)> {
    let api = GoogleApiClient::new(http_client(config)?, tokens, config.retry.clone());
    Ok((
        GoogleSheetsGateway::new(api.clone(), config),
        GoogleDriveStorage::new(api, config),
    ))
}

/// Gateway and storage authorized by whatever the settings record names
pub fn connect_with_settings(
    config: &GoogleConfig,
    settings: Arc<SettingsStore>,
) -> Result<(GoogleSheetsGateway, GoogleDriveStorage)> {
    let tokens = SettingsTokenProvider::new(settings, http_client(config)?);
    connect(config, Arc::new(tokens))
}
