use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;
use crate::submission::session::{SessionError, Shown, ShownReceived};
use crate::view::charts::{bar_series, pie_series, BarDatum, PieSeries};
use crate::view::export::{export_analysis, export_batch};
use crate::view::summary::SessionView;
use crate::view::table::{
    table_view, AggregatedRow, SkillRow, SortField, SortState, TableView, ViewControls,
};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableResponse {
    Single(TableView<SkillRow>),
    Batch(TableView<AggregatedRow>),
}

#[derive(Deserialize)]
pub struct SortRequest {
    pub field: SortField,
}

#[derive(Deserialize)]
pub struct FilterRequest {
    pub category: String,
}

#[derive(Deserialize)]
pub struct BarQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(SessionView::from(&*session))
}

/// GET /api/v1/session/table
pub async fn handle_get_table(
    State(state): State<AppState>,
) -> Result<Json<TableResponse>, AppError> {
    let session = state.session.lock().await;
    let table = match session.shown().ok_or(SessionError::NoResult)? {
        Shown::Single(result, controls) => {
            TableResponse::Single(table_view(&result.skills, controls, |s| SkillRow::from(s)))
        }
        Shown::Batch(batch, controls) => {
            TableResponse::Batch(table_view(&batch.aggregated_skills, controls, |s| {
                AggregatedRow::new(s, batch.total_jobs)
            }))
        }
    };
    Ok(Json(table))
}

/// POST /api/v1/session/sort
pub async fn handle_sort(
    State(state): State<AppState>,
    Json(req): Json<SortRequest>,
) -> Result<Json<SortState>, AppError> {
    let sort = state.session.lock().await.click_sort(req.field)?;
    Ok(Json(sort))
}

/// POST /api/v1/session/filter
pub async fn handle_filter(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> Result<Json<ViewControls>, AppError> {
    let mut session = state.session.lock().await;
    session.set_category_filter(&req.category)?;
    let controls = session.controls().cloned().ok_or(SessionError::NoResult)?;
    Ok(Json(controls))
}

/// GET /api/v1/session/charts/bar?limit=
pub async fn handle_bar_chart(
    State(state): State<AppState>,
    Query(params): Query<BarQuery>,
) -> Result<Json<Vec<BarDatum>>, AppError> {
    let session = state.session.lock().await;
    let series = match session.shown().ok_or(SessionError::NoResult)? {
        Shown::Single(result, _) => bar_series(&result.skills, params.limit),
        Shown::Batch(batch, _) => bar_series(&batch.aggregated_skills, params.limit),
    };
    Ok(Json(series))
}

/// GET /api/v1/session/charts/pie
pub async fn handle_pie_chart(State(state): State<AppState>) -> Result<Json<PieSeries>, AppError> {
    let session = state.session.lock().await;
    let series = match session.shown().ok_or(SessionError::NoResult)? {
        Shown::Single(result, _) => pie_series(&result.categories),
        Shown::Batch(batch, _) => pie_series(&batch.category_breakdown),
    };
    Ok(Json(series))
}

/// GET /api/v1/session/export
pub async fn handle_export(State(state): State<AppState>) -> Result<Response, AppError> {
    let session = state.session.lock().await;
    let file = match session.shown_received().ok_or(SessionError::NoResult)? {
        ShownReceived::Single(result) => export_analysis(result),
        ShownReceived::Batch(batch) => export_batch(batch),
    }
    .map_err(anyhow::Error::from)?;

    tracing::info!("Exporting {}", file.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.contents,
    )
        .into_response())
}
