//! In-memory `AnalysisApi` that records calls and answers from fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use super::{AnalysisApi, ApiError};
use crate::models::analysis::fixtures::{analysis, batch, received, skill};
use crate::models::analysis::{AnalysisResult, BatchResult, FetchedJob, JobInput, Received};

#[derive(Default)]
pub struct SpyApi {
    analyze_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    fail: bool,
    /// When set, the next `analyze` call waits for this before answering.
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl SpyApi {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn gated(gate: oneshot::Receiver<()>) -> Self {
        Self {
            gate: Mutex::new(Some(gate)),
            ..Self::default()
        }
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn service_error(&self) -> ApiError {
        ApiError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
            detail: None,
        }
    }

    fn analysis_for(job: &JobInput) -> AnalysisResult {
        analysis(
            job.title.as_deref(),
            vec![
                skill("Rust", "programming_languages", 3, 0.95),
                skill("PostgreSQL", "databases", 1, 0.8),
                skill("Kubernetes", "devops_tools", 1, 0.7),
            ],
        )
    }
}

#[async_trait]
impl AnalysisApi for SpyApi {
    async fn analyze(&self, job: &JobInput) -> Result<Received<AnalysisResult>, ApiError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail {
            return Err(self.service_error());
        }
        Ok(received(Self::analysis_for(job)))
    }

    async fn analyze_batch(&self, jobs: &[JobInput]) -> Result<Received<BatchResult>, ApiError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(self.service_error());
        }
        Ok(received(batch(jobs.iter().map(Self::analysis_for).collect())))
    }

    async fn fetch_job(&self, url: &str) -> Result<FetchedJob, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail || url.contains("unsupported") {
            return Err(ApiError::Api {
                status: 400,
                message: "Invalid URL format".to_string(),
                detail: Some("Invalid URL format".to_string()),
            });
        }
        Ok(FetchedJob {
            title: "Staff Platform Engineer".to_string(),
            description: "Design and operate Rust services on Kubernetes with PostgreSQL."
                .to_string(),
        })
    }
}
