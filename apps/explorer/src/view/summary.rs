//! Session snapshot and result headers shown above the tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::analysis::{AnalysisResult, BatchResult};
use crate::submission::assembler::Route;
use crate::submission::session::{Phase, Session};
use crate::view::format::percent_label;
use crate::view::table::ViewControls;

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub pending_route: Option<Route>,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub controls: Option<ViewControls>,
    pub summary: Option<ResultSummary>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        let summary = match session.phase() {
            Phase::Result => session.result().map(|r| ResultSummary::Single(r.into())),
            Phase::BatchResult => session
                .batch_result()
                .map(|b| ResultSummary::Batch(b.into())),
            _ => None,
        };

        Self {
            phase: session.phase(),
            pending_route: session.pending_route(),
            warning: session.warning().map(str::to_string),
            error: session.error().map(str::to_string),
            controls: summary.as_ref().and(session.controls().cloned()),
            summary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultSummary {
    Single(SingleSummary),
    Batch(BatchSummary),
}

#[derive(Debug, Clone, Serialize)]
pub struct SingleSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub total_skills_found: u32,
    pub category_count: usize,
}

impl From<&AnalysisResult> for SingleSummary {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            id: result.id,
            title: result.title.clone(),
            analyzed_at: result.analyzed_at,
            total_skills_found: result.total_skills_found,
            category_count: result.categories.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub jobs_analyzed: u32,
    pub unique_skills: usize,
    /// `"N/A"` when no skill was found in any job.
    pub top_skill: String,
    pub top_skill_percentage: Option<String>,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: Uuid,
    /// The job title, or `Job #n` when none was given.
    pub label: String,
    pub total_skills_found: u32,
    pub analyzed_on: NaiveDate,
}

impl From<&BatchResult> for BatchSummary {
    fn from(batch: &BatchResult) -> Self {
        let top = batch.top_skills.first();
        Self {
            id: batch.id,
            analyzed_at: batch.analyzed_at,
            jobs_analyzed: batch.total_jobs,
            unique_skills: batch.aggregated_skills.len(),
            top_skill: top.map_or_else(|| "N/A".to_string(), |s| s.name.clone()),
            top_skill_percentage: top.map(|s| percent_label(s.percentage)),
            jobs: batch
                .individual_analyses
                .iter()
                .enumerate()
                .map(|(index, analysis)| JobSummary {
                    id: analysis.id,
                    label: analysis
                        .title
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| format!("Job #{}", index + 1)),
                    total_skills_found: analysis.total_skills_found,
                    analyzed_on: analysis.analyzed_at.date_naive(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::fixtures::{analysis, batch, received, skill};
    use crate::submission::session::Outcome;

    #[test]
    fn test_batch_summary_labels_untitled_jobs() {
        let result = batch(vec![
            analysis(Some("Backend Engineer"), vec![skill("Rust", "programming_languages", 2, 0.9)]),
            analysis(None, vec![skill("Rust", "programming_languages", 1, 0.9)]),
        ]);
        let summary = BatchSummary::from(&result);
        assert_eq!(summary.jobs_analyzed, 2);
        assert_eq!(summary.jobs[0].label, "Backend Engineer");
        assert_eq!(summary.jobs[1].label, "Job #2");
        assert_eq!(summary.top_skill, "Rust");
        assert_eq!(summary.top_skill_percentage.as_deref(), Some("100%"));
    }

    #[test]
    fn test_batch_summary_without_skills() {
        let result = batch(vec![analysis(None, vec![]), analysis(None, vec![])]);
        let summary = BatchSummary::from(&result);
        assert_eq!(summary.top_skill, "N/A");
        assert_eq!(summary.top_skill_percentage, None);
        assert_eq!(summary.unique_skills, 0);
    }

    #[test]
    fn test_session_view_idle() {
        let view = SessionView::from(&Session::default());
        assert_eq!(view.phase, Phase::Idle);
        assert!(view.summary.is_none());
        assert!(view.controls.is_none());
    }

    #[test]
    fn test_session_view_hides_retained_result_while_loading() {
        let mut session = Session::default();
        let t = session.begin(Route::Single, None);
        session.apply(
            t,
            Ok(Outcome::Single(received(analysis(None, vec![skill("Go", "programming_languages", 1, 0.9)])))),
        );
        session.begin(Route::Single, None);

        let view = SessionView::from(&session);
        assert_eq!(view.phase, Phase::Loading);
        assert_eq!(view.pending_route, Some(Route::Single));
        assert!(view.summary.is_none());
    }

    #[test]
    fn test_session_view_serializes_summary_kind() {
        let mut session = Session::default();
        let t = session.begin(Route::Single, None);
        session.apply(
            t,
            Ok(Outcome::Single(received(analysis(Some("SRE"), vec![skill("Go", "programming_languages", 1, 0.9)])))),
        );
        let value = serde_json::to_value(SessionView::from(&session)).unwrap();
        assert_eq!(value["phase"], "result");
        assert_eq!(value["summary"]["kind"], "single");
        assert_eq!(value["summary"]["title"], "SRE");
        assert_eq!(value["controls"]["sort"]["field"], "count");
    }
}
