pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::submission::handlers as submission;
use crate::view::handlers as view;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session: submit, inspect and reshape the current result
        .route("/api/v1/session", get(view::handle_get_session))
        .route("/api/v1/session/submit", post(submission::handle_submit))
        .route("/api/v1/session/reset", post(submission::handle_reset))
        .route("/api/v1/session/sort", post(view::handle_sort))
        .route("/api/v1/session/filter", post(view::handle_filter))
        .route("/api/v1/session/table", get(view::handle_get_table))
        .route("/api/v1/session/charts/bar", get(view::handle_bar_chart))
        .route("/api/v1/session/charts/pie", get(view::handle_pie_chart))
        .route("/api/v1/session/export", get(view::handle_export))
        // Job form
        .route("/api/v1/form", get(submission::handle_get_form))
        .route("/api/v1/form/entries", post(submission::handle_add_entry))
        .route(
            "/api/v1/form/entries/:id",
            patch(submission::handle_update_entry).delete(submission::handle_remove_entry),
        )
        .route(
            "/api/v1/form/entries/:id/fetch",
            post(submission::handle_fetch_entry),
        )
        .route("/api/v1/form/clear", post(submission::handle_clear_form))
        .route("/api/v1/form/submit", post(submission::handle_submit_form))
        .with_state(state)
}
