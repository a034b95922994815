/// Analysis API client: the only module that talks to the NLP service over HTTP.
///
/// Handlers and the session never call `reqwest` directly; they go through the
/// `AnalysisApi` trait so tests can substitute a spy.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::analysis::{
    AnalysisResult, BatchRequest, BatchResult, FetchJobRequest, FetchedJob, JobInput, Received,
};

#[cfg(test)]
pub mod spy;

const ANALYZE_PATH: &str = "/api/v1/analysis/analyze";
const BATCH_PATH: &str = "/api/v1/analysis/batch";
const FETCH_JOB_PATH: &str = "/api/v1/analysis/fetch-job";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// The service's own `detail` field, when it sent one.
        detail: Option<String>,
    },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Server-supplied detail if present, otherwise `fallback`.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// FastAPI-style error body. `detail` is a string for handled errors and a
/// list of field errors for request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

/// The three upstream operations the explorer depends on.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn analyze(&self, job: &JobInput) -> Result<Received<AnalysisResult>, ApiError>;
    async fn analyze_batch(&self, jobs: &[JobInput]) -> Result<Received<BatchResult>, ApiError>;
    async fn fetch_job(&self, url: &str) -> Result<FetchedJob, ApiError>;
}

/// `AnalysisApi` over JSON/HTTP. No retries: the user resubmits.
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    base_url: String,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Analysis service returned {} for {}: {}", status, path, body);
            let detail = extract_detail(&body);
            let message = detail.clone().unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
                detail,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Parse)
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn analyze(&self, job: &JobInput) -> Result<Received<AnalysisResult>, ApiError> {
        self.post_json(ANALYZE_PATH, job).await
    }

    async fn analyze_batch(&self, jobs: &[JobInput]) -> Result<Received<BatchResult>, ApiError> {
        self.post_json(BATCH_PATH, &BatchRequest { jobs }).await
    }

    async fn fetch_job(&self, url: &str) -> Result<FetchedJob, ApiError> {
        self.post_json(FETCH_JOB_PATH, &FetchJobRequest { url }).await
    }
}
