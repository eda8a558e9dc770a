//! Analytics API HTTP client.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{AppError, Result};
use crate::export::{ExportFormat, ExportRequest};
use crate::models::PerformanceData;
use crate::query::PerformanceQuery;

const PERFORMANCE_PATH: &str = "/api/analytics/performance";

/// Longest server error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Client for the performance analytics backend.
#[derive(Clone)]
pub struct AnalyticsClient {
    client: Client,
    base_url: String,
}

impl AnalyticsClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The API root (e.g., "http://localhost:8080")
    /// * `timeout_secs` - Per-request timeout
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch team and self performance for a query.
    pub async fn fetch_performance(&self, query: &PerformanceQuery) -> Result<PerformanceData> {
        let url = format!("{base}{PERFORMANCE_PATH}", base = self.base_url);
        let params = query.to_params();
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.client.get(&url).query(&params).send().await?;
        let body = check_status(response).await?.text().await?;

        serde_json::from_str(&body).map_err(|e| AppError::parse(format!("Invalid performance response: {e}")))
    }

    /// Request a server-rendered export and return the file bytes.
    pub async fn export(&self, format: ExportFormat, request: &ExportRequest) -> Result<Vec<u8>> {
        let url = format!("{base}{path}", base = self.base_url, path = format.endpoint());
        tracing::debug!(
            "POST {} ({} team records, period {})",
            url,
            request.team_performance.len(),
            request.period.label
        );

        let response = self.client.post(&url).json(request).send().await?;
        let bytes = check_status(response).await?.bytes().await?;

        Ok(bytes.to_vec())
    }

    /// Test connection to the backend.
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{base}/", base = self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(!response.status().is_server_error())
    }
}

/// Turn a non-success response into [`AppError::Server`].
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY).rev().find(|i| message.is_char_boundary(*i)).unwrap_or(0);
        message.truncate(cut);
    }
    if message.trim().is_empty() {
        message = status.canonical_reason().unwrap_or("request failed").to_string();
    }

    Err(AppError::Server {
        status: status.as_u16(),
        message,
    })
}
