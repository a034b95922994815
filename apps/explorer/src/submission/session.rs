//! Analysis session: owns loading/result/error state for the single and batch paths.
//!
//! Every submission gets a token from a monotonic counter. Only a response that
//! carries the latest token is applied; anything older is dropped on arrival.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api_client::AnalysisApi;
use crate::models::analysis::{AggregatedSkill, AnalysisResult, BatchResult, Received, Skill};
use crate::submission::assembler::{assemble, RawEntry, Route, Submission, ValidationError};
use crate::view::aggregate::aggregation_mismatches;
use crate::view::table::{is_sortable, SortField, SortState, ViewControls};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubmissionToken(u64);

/// Successful upstream response for one submission.
#[derive(Debug, Clone)]
pub enum Outcome {
    Single(Received<AnalysisResult>),
    Batch(Received<BatchResult>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Result,
    BatchResult,
    Error,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("No analysis result is loaded")]
    NoResult,

    #[error("Cannot sort this table by {0:?}")]
    UnsupportedSort(SortField),
}

#[derive(Debug, Default)]
pub struct Session {
    latest: u64,
    pending: Option<(SubmissionToken, Route)>,
    result: Option<Received<AnalysisResult>>,
    batch_result: Option<Received<BatchResult>>,
    error: Option<String>,
    warning: Option<String>,
    controls: Option<ViewControls>,
}

impl Session {
    /// The single phase the UI should show.
    pub fn phase(&self) -> Phase {
        if self.pending.is_some() {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.result.is_some() {
            Phase::Result
        } else if self.batch_result.is_some() {
            Phase::BatchResult
        } else {
            Phase::Idle
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref().map(|r| &r.value)
    }

    pub fn batch_result(&self) -> Option<&BatchResult> {
        self.batch_result.as_ref().map(|b| &b.value)
    }

    /// The result on screen with the body it arrived in, for export.
    pub fn shown_received(&self) -> Option<ShownReceived<'_>> {
        match self.phase() {
            Phase::Result => self.result.as_ref().map(ShownReceived::Single),
            Phase::BatchResult => self.batch_result.as_ref().map(ShownReceived::Batch),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn pending_route(&self) -> Option<Route> {
        self.pending.map(|(_, route)| route)
    }

    pub fn controls(&self) -> Option<&ViewControls> {
        self.controls.as_ref()
    }

    /// Enters loading for a new submission. Clears the error and the result of
    /// the other arity; a same-arity result stays until the response lands.
    pub fn begin(&mut self, route: Route, warning: Option<String>) -> SubmissionToken {
        self.latest += 1;
        let token = SubmissionToken(self.latest);

        self.pending = Some((token, route));
        self.error = None;
        self.warning = warning;
        match route {
            Route::Single => self.batch_result = None,
            Route::Batch => self.result = None,
        }

        token
    }

    /// Applies a response. Returns `false` when `token` was superseded and the
    /// response was dropped.
    pub fn apply(&mut self, token: SubmissionToken, response: Result<Outcome, String>) -> bool {
        if token != SubmissionToken(self.latest) {
            debug!(
                "Discarding stale response for submission {:?} (latest is {})",
                token, self.latest
            );
            return false;
        }

        self.pending = None;

        match response {
            Ok(Outcome::Single(result)) => {
                for issue in result.value.consistency_issues() {
                    warn!("Analysis {} is inconsistent: {issue}", result.value.id);
                }
                self.controls = Some(ViewControls::for_rows::<Skill>());
                self.batch_result = None;
                self.result = Some(result);
            }
            Ok(Outcome::Batch(batch)) => {
                for issue in batch
                    .value
                    .consistency_issues()
                    .into_iter()
                    .chain(aggregation_mismatches(&batch.value))
                {
                    warn!("Batch {} is inconsistent: {issue}", batch.value.id);
                }
                self.controls = Some(ViewControls::for_rows::<AggregatedSkill>());
                self.result = None;
                self.batch_result = Some(batch);
            }
            Err(message) => {
                self.result = None;
                self.batch_result = None;
                self.controls = None;
                self.error = Some(message);
            }
        }

        true
    }

    /// Back to idle. Responses still in flight become stale.
    pub fn reset(&mut self) {
        self.latest += 1;
        self.pending = None;
        self.result = None;
        self.batch_result = None;
        self.error = None;
        self.warning = None;
        self.controls = None;
    }

    /// Column-header click on whichever table is showing.
    pub fn click_sort(&mut self, field: SortField) -> Result<SortState, SessionError> {
        let sortable = match self.phase() {
            Phase::Result => is_sortable::<Skill>(field),
            Phase::BatchResult => is_sortable::<AggregatedSkill>(field),
            _ => return Err(SessionError::NoResult),
        };
        if !sortable {
            return Err(SessionError::UnsupportedSort(field));
        }

        let controls = self.controls.as_mut().ok_or(SessionError::NoResult)?;
        controls.sort = controls.sort.click(field);
        Ok(controls.sort)
    }

    pub fn set_category_filter(&mut self, category: &str) -> Result<(), SessionError> {
        if !matches!(self.phase(), Phase::Result | Phase::BatchResult) {
            return Err(SessionError::NoResult);
        }
        let controls = self.controls.as_mut().ok_or(SessionError::NoResult)?;
        controls.category_filter = category.to_string();
        Ok(())
    }

    /// The projection inputs for the table on screen: skills or aggregated skills.
    pub fn shown(&self) -> Option<Shown<'_>> {
        let controls = self.controls.as_ref()?;
        match self.phase() {
            Phase::Result => self.result().map(|r| Shown::Single(r, controls)),
            Phase::BatchResult => self.batch_result().map(|b| Shown::Batch(b, controls)),
            _ => None,
        }
    }
}

/// A result currently on screen together with its table controls.
pub enum Shown<'a> {
    Single(&'a AnalysisResult, &'a ViewControls),
    Batch(&'a BatchResult, &'a ViewControls),
}

pub enum ShownReceived<'a> {
    Single(&'a Received<AnalysisResult>),
    Batch(&'a Received<BatchResult>),
}

/// What happened to one `submit` call.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub submission: SubmissionToken,
    pub route: Route,
    pub jobs: usize,
    pub warning: Option<String>,
    /// `false` when a newer submission or a reset superseded this one.
    pub applied: bool,
    pub failure: Option<String>,
}

/// Assembles `entries`, calls the matching endpoint and applies the response.
///
/// The session lock is released while the request is in flight, so a later
/// submission can overtake this one.
pub async fn submit(
    api: &dyn AnalysisApi,
    session: &Mutex<Session>,
    entries: &[RawEntry],
) -> Result<SubmitReport, ValidationError> {
    let assembled = assemble(entries)?;
    let warning = assembled.warning();
    let route = assembled.submission.route();
    let jobs = assembled.submission.job_count();

    let token = session.lock().await.begin(route, warning.clone());
    info!("Submission {:?}: {} job(s) via {:?}", token, jobs, route);

    let response = match &assembled.submission {
        Submission::Single(job) => api
            .analyze(job)
            .await
            .map(Outcome::Single)
            .map_err(|e| format!("Failed to analyze job description: {e}")),
        Submission::Batch(batch) => api
            .analyze_batch(batch)
            .await
            .map(Outcome::Batch)
            .map_err(|e| format!("Failed to analyze job descriptions: {e}")),
    };

    let failure = response.as_ref().err().cloned();
    if let Some(message) = &failure {
        warn!("Submission {:?} failed: {message}", token);
    }

    let applied = session.lock().await.apply(token, response);

    Ok(SubmitReport {
        submission: token,
        route,
        jobs,
        warning,
        applied,
        failure,
    })
}
