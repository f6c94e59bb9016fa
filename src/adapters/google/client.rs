//! Authorized JSON client shared by the Sheets and Drive adapters
//!
//! Every call carries a bearer token from the configured
//! [`TokenProvider`]. Failed responses are classified into report errors by
//! [`classify`]; only rate-limit failures are retried, with jittered
//! exponential backoff bounded by [`RetryConfig`].

use super::auth::TokenProvider;
use crate::config::{GoogleConfig, RetryConfig};
use crate::domain::{RemoteError, ReportError, Result};
use reqwest::{Client, ClientBuilder, Method};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client used for API and token requests
pub fn http_client(config: &GoogleConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| ReportError::Configuration(format!("Failed to build HTTP client: {e}")))
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorReason>,
    #[serde(default)]
    details: Vec<ApiErrorReason>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorReason {
    #[serde(default)]
    reason: Option<String>,
}

impl ApiErrorBody {
    fn has_reason(&self, wanted: &[&str]) -> bool {
        self.errors
            .iter()
            .chain(self.details.iter())
            .filter_map(|r| r.reason.as_deref())
            .any(|r| wanted.iter().any(|w| w.eq_ignore_ascii_case(r)))
    }
}

const SHARE_HINT: &str =
    "share the spreadsheet or folder with the account the configured credentials belong to";

/// Maps a failed API response to a report error
///
/// Google error bodies look like
/// `{"error": {"code": 403, "message": "...", "status": "...", "errors": [{"reason": "..."}]}}`;
/// anything else is kept as raw text.
pub fn classify(status: u16, body: &str) -> ReportError {
    let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error = envelope.error;
    let message = if error.message.is_empty() {
        body.trim().to_string()
    } else {
        error.message.clone()
    };

    match status {
        401 => ReportError::authentication(
            format!("credentials were rejected: {message}"),
            "check the configured credential file or import a new one with `crm-reports settings import`",
        ),
        403 if error.has_reason(&[
            "storageQuotaExceeded",
            "teamDriveFileLimitExceeded",
        ]) || message.to_lowercase().contains("storage quota") =>
        {
            ReportError::QuotaExceeded(message)
        }
        403 if error.has_reason(&[
            "rateLimitExceeded",
            "userRateLimitExceeded",
            "RATE_LIMIT_EXCEEDED",
            "quotaExceeded",
            "dailyLimitExceeded",
        ]) =>
        {
            ReportError::RateLimit {
                attempts: 1,
                message,
            }
        }
        403 => ReportError::authentication(format!("access denied: {message}"), SHARE_HINT),
        404 => ReportError::NotFound(message),
        // the values API reports unknown sheet names as unparsable ranges
        400 if message.contains("Unable to parse range") => ReportError::NotFound(message),
        429 => ReportError::RateLimit {
            attempts: 1,
            message,
        },
        400 => ReportError::InvalidArgument(message),
        500..=599 => ReportError::Remote(RemoteError::ServerError { status, message }),
        _ => ReportError::Remote(RemoteError::ClientError {
            status,
            message: match error.status {
                Some(code) => format!("{code}: {message}"),
                None => message,
            },
        }),
    }
}

/// Delay before the retry following `attempt` failed attempts
///
/// `initial * multiplier^(attempt-1)` capped at `max_delay_ms`, then jittered
/// into the upper half of that value.
pub(crate) fn backoff_delay_ms(retry: &RetryConfig, attempt: usize) -> u64 {
    let exponent = attempt.saturating_sub(1) as i32;
    let delay = (retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent))
        .min(retry.max_delay_ms as f64) as u64;
    let half = delay / 2;
    let jitter = rand::Rng::gen_range(&mut rand::thread_rng(), 0..=half);
    (delay - half) + jitter
}

/// Bearer-authenticated JSON client for the Google REST APIs
#[derive(Clone)]
pub struct GoogleApiClient {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryConfig,
}

impl GoogleApiClient {
    pub fn new(client: Client, tokens: Arc<dyn TokenProvider>, retry: RetryConfig) -> Self {
        Self {
            client,
            tokens,
            retry,
        }
    }

    /// `base` with `segments` appended as percent-encoded path segments
    pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base)
            .map_err(|e| ReportError::Configuration(format!("invalid API base URL '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ReportError::Configuration(format!("API base URL '{base}' cannot have a path")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one request, retrying rate-limited attempts
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        self.retry_request(|| self.send_once(method.clone(), url.clone(), body))
            .await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let token = self.tokens.access_token().await?;

        tracing::debug!(method = %method, path = %url.path(), "Google API request");

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(token.expose_secret().as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ReportError::Remote(RemoteError::Timeout(e.to_string()))
            } else {
                ReportError::Remote(RemoteError::ConnectionFailed(e.to_string()))
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ReportError::Remote(RemoteError::InvalidResponse(e.to_string())))?;

        if !(200..300).contains(&status) {
            if status == 401 {
                self.tokens.invalidate().await;
            }
            return Err(classify(status, &text));
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| ReportError::Remote(RemoteError::InvalidResponse(e.to_string())))
    }

    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        return Err(match e {
                            ReportError::RateLimit { message, .. } => ReportError::RateLimit {
                                attempts: attempt,
                                message,
                            },
                            other => other,
                        });
                    }

                    let delay_ms = backoff_delay_ms(&self.retry, attempt);
                    crate::log_retry_attempt!(attempt, max_attempts, delay_ms, e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
