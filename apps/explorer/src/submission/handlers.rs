use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::submission::assembler::RawEntry;
use crate::submission::form::FormView;
use crate::submission::session::{submit, SubmitReport};
use crate::view::summary::SessionView;

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub entries: Vec<RawEntry>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub report: SubmitReport,
    pub session: SessionView,
}

#[derive(Deserialize)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct FetchRequest {
    pub url: String,
}

async fn run_submission(state: &AppState, entries: &[RawEntry]) -> Result<SubmitResponse, AppError> {
    let report = submit(state.api.as_ref(), &state.session, entries).await?;

    // A superseded failure was never shown, so it is not an error for this caller.
    if report.applied {
        if let Some(failure) = &report.failure {
            return Err(AppError::Upstream(failure.clone()));
        }
    }

    let session = SessionView::from(&*state.session.lock().await);
    Ok(SubmitResponse { report, session })
}

/// POST /api/v1/session/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    Ok(Json(run_submission(&state, &req.entries).await?))
}

/// POST /api/v1/session/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    session.reset();
    info!("Session reset");
    Json(SessionView::from(&*session))
}

/// GET /api/v1/form
pub async fn handle_get_form(State(state): State<AppState>) -> Json<FormView> {
    Json(FormView::from(&*state.form.lock().await))
}

/// POST /api/v1/form/entries
pub async fn handle_add_entry(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<FormView>), AppError> {
    let mut form = state.form.lock().await;
    form.add()?;
    Ok((StatusCode::CREATED, Json(FormView::from(&*form))))
}

/// PATCH /api/v1/form/entries/:id
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<FormView>, AppError> {
    let mut form = state.form.lock().await;
    form.update(id, req.title, req.description)?;
    Ok(Json(FormView::from(&*form)))
}

/// DELETE /api/v1/form/entries/:id
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<FormView>, AppError> {
    let mut form = state.form.lock().await;
    form.remove(id)?;
    Ok(Json(FormView::from(&*form)))
}

/// POST /api/v1/form/entries/:id/fetch
///
/// The form stays unlocked while the page is scraped; edits made meanwhile are
/// overwritten only if this fetch is still the entry's latest.
pub async fn handle_fetch_entry(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<FormView>, AppError> {
    let ticket = state.form.lock().await.begin_fetch(id, &req.url)?;

    let response = state.api.fetch_job(req.url.trim()).await.map_err(|e| {
        warn!("Fetching job for entry {id} failed: {e}");
        e.detail_or("Failed to fetch job from URL")
    });

    let mut form = state.form.lock().await;
    form.finish_fetch(ticket, response);
    Ok(Json(FormView::from(&*form)))
}

/// POST /api/v1/form/clear
pub async fn handle_clear_form(State(state): State<AppState>) -> Json<FormView> {
    let mut form = state.form.lock().await;
    form.clear();
    Json(FormView::from(&*form))
}

/// POST /api/v1/form/submit
pub async fn handle_submit_form(
    State(state): State<AppState>,
) -> Result<Json<SubmitResponse>, AppError> {
    let entries = state.form.lock().await.raw_entries();
    Ok(Json(run_submission(&state, &entries).await?))
}
