//! Scraping backend client.
//!
//! The backend logs into the student portal on the user's behalf and
//! returns the attendance table as JSON. Only the raw counts are kept;
//! statistics are always recomputed locally.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bunkmeter_core::model::SubjectRecord;
use bunkmeter_core::traits::AttendanceSource;

use crate::error::SourceError;

const FETCH_PATH: &str = "/api/attendance/fetch";
const HEALTH_PATH: &str = "/health";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// The backend's scraper rate-limit window.
const DEFAULT_RETRY_AFTER_SECS: u64 = 15 * 60;

/// Portal login credentials.
///
/// Note: Custom Debug impl masks the password to prevent accidental exposure in logs.
#[derive(Clone)]
pub struct Credentials {
    register_number: String,
    password: String,
}

impl Credentials {
    /// Validate and build credentials. The register number is trimmed.
    pub fn new(register_number: &str, password: &str) -> anyhow::Result<Self> {
        let register_number = register_number.trim();
        anyhow::ensure!(
            (3..=50).contains(&register_number.chars().count()),
            "invalid register number format"
        );
        anyhow::ensure!(
            (1..=100).contains(&password.chars().count()),
            "invalid password format"
        );
        Ok(Self {
            register_number: register_number.to_string(),
            password: password.to_string(),
        })
    }

    pub fn register_number(&self) -> &str {
        &self.register_number
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("register_number", &self.register_number)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchRequest<'a> {
    register_number: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct FetchResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    subjects: Vec<SubjectRecord>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Backend health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

/// Attendance source backed by the scraping service.
pub struct RemoteSource {
    base_url: String,
    credentials: Option<Credentials>,
    timeout_secs: u64,
}

impl RemoteSource {
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: Some(credentials),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// A source without credentials; only [`RemoteSource::health`] works.
    pub fn anonymous(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Request timeout in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    /// A client lives for exactly one request and is dropped on every exit path.
    fn client(&self) -> Result<reqwest::Client, SourceError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| SourceError::NetworkError(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout(self.timeout_secs)
        } else {
            SourceError::NetworkError(e.to_string())
        }
    }

    /// Ask the backend to scrape the portal and return the raw counts.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_records(&self) -> Result<Vec<SubjectRecord>, SourceError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| SourceError::InvalidRequest("no credentials configured".into()))?;
        tracing::info!(
            register_number = %credentials.register_number,
            "requesting attendance from scraping backend"
        );

        let body = FetchRequest {
            register_number: &credentials.register_number,
            password: &credentials.password,
        };

        let response = self
            .client()?
            .post(format!("{}{}", self.base_url, FETCH_PATH))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(SourceError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(classify_failure(status, message));
        }

        let parsed: FetchResponse = response.json().await.map_err(|e| SourceError::ScrapeFailed {
            status,
            message: format!("failed to parse response: {e}"),
        })?;

        if !parsed.success {
            let message = parsed
                .error
                .unwrap_or_else(|| "backend reported failure".to_string());
            return Err(classify_failure(status, message));
        }
        if parsed.subjects.is_empty() {
            return Err(SourceError::NoData);
        }

        tracing::info!(subjects = parsed.subjects.len(), "attendance fetched");
        Ok(parsed.subjects)
    }

    /// Query the backend's health endpoint.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn health(&self) -> Result<HealthStatus, SourceError> {
        let response = self
            .client()?
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::ScrapeFailed {
                status,
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::ScrapeFailed {
                status,
                message: format!("failed to parse health response: {e}"),
            })
    }
}

/// Map a failed backend answer onto a [`SourceError`].
///
/// The backend reports portal login failures as a generic scraping error,
/// so the message is inspected as well as the status.
fn classify_failure(status: u16, message: String) -> SourceError {
    match status {
        400 => SourceError::InvalidRequest(message),
        401 | 403 => SourceError::AuthenticationFailed(message),
        _ if message.to_lowercase().contains("login failed") => {
            SourceError::AuthenticationFailed(message)
        }
        _ if message.to_lowercase().contains("no attendance data") => SourceError::NoData,
        _ => SourceError::ScrapeFailed { status, message },
    }
}

#[async_trait]
impl AttendanceSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch(&self) -> anyhow::Result<Vec<SubjectRecord>> {
        Ok(self.fetch_records().await?)
    }
}
