//! Table projection: filter by category, then stable-sort by the selected column.
//!
//! Every projection starts again from the immutable result held by the session,
//! so re-applying the same controls always yields the same rows.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::{AggregatedSkill, Skill};
use crate::view::format::{
    category_color, category_label, confidence_percent, percent_label,
};

/// Filter value that keeps every category.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Category,
    Count,
    Confidence,
    TotalCount,
    AppearedInJobs,
    Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    /// Column-header click: the same field flips direction, a new field starts descending.
    pub fn click(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            Self::descending(field)
        }
    }
}

/// Sort and filter selection for whichever table is on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewControls {
    pub sort: SortState,
    pub category_filter: String,
}

impl ViewControls {
    pub fn for_rows<R: TableRow>() -> Self {
        Self {
            sort: SortState::descending(R::DEFAULT_SORT),
            category_filter: ALL_CATEGORIES.to_string(),
        }
    }
}

pub enum SortKey {
    Text(String),
    Number(f64),
}

/// A record that can be shown as a table row.
pub trait TableRow {
    const SORTABLE: &'static [SortField];
    const DEFAULT_SORT: SortField;

    fn category(&self) -> &str;

    /// `None` when the field is not a column of this table.
    fn sort_key(&self, field: SortField) -> Option<SortKey>;
}

impl TableRow for Skill {
    const SORTABLE: &'static [SortField] = &[
        SortField::Name,
        SortField::Count,
        SortField::Category,
        SortField::Confidence,
    ];
    const DEFAULT_SORT: SortField = SortField::Count;

    fn category(&self) -> &str {
        &self.category
    }

    fn sort_key(&self, field: SortField) -> Option<SortKey> {
        match field {
            SortField::Name => Some(SortKey::Text(self.name.to_lowercase())),
            SortField::Category => Some(SortKey::Text(self.category.to_lowercase())),
            SortField::Count => Some(SortKey::Number(f64::from(self.count))),
            SortField::Confidence => Some(SortKey::Number(self.confidence)),
            _ => None,
        }
    }
}

impl TableRow for AggregatedSkill {
    const SORTABLE: &'static [SortField] = &[
        SortField::Name,
        SortField::AppearedInJobs,
        SortField::Percentage,
        SortField::TotalCount,
        SortField::Category,
    ];
    const DEFAULT_SORT: SortField = SortField::Percentage;

    fn category(&self) -> &str {
        &self.category
    }

    fn sort_key(&self, field: SortField) -> Option<SortKey> {
        match field {
            SortField::Name => Some(SortKey::Text(self.name.to_lowercase())),
            SortField::Category => Some(SortKey::Text(self.category.to_lowercase())),
            SortField::TotalCount => Some(SortKey::Number(f64::from(self.total_count))),
            SortField::AppearedInJobs => Some(SortKey::Number(f64::from(self.appeared_in_jobs))),
            SortField::Percentage => Some(SortKey::Number(self.percentage)),
            _ => None,
        }
    }
}

pub fn is_sortable<R: TableRow>(field: SortField) -> bool {
    R::SORTABLE.contains(&field)
}

fn compare<R: TableRow>(a: &R, b: &R, field: SortField) -> Ordering {
    match (a.sort_key(field), b.sort_key(field)) {
        (Some(SortKey::Text(x)), Some(SortKey::Text(y))) => x.cmp(&y),
        (Some(SortKey::Number(x)), Some(SortKey::Number(y))) => x.total_cmp(&y),
        _ => Ordering::Equal,
    }
}

/// `"all"` keeps everything; anything else is an exact, case-sensitive category match.
pub fn filter_rows<'a, R: TableRow>(rows: &'a [R], category_filter: &str) -> Vec<&'a R> {
    if category_filter == ALL_CATEGORIES {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| row.category() == category_filter)
        .collect()
}

/// Stable sort; ties keep their source order in both directions.
pub fn sort_rows<R: TableRow>(rows: &mut [&R], sort: SortState) {
    match sort.direction {
        SortDirection::Asc => rows.sort_by(|a, b| compare(*a, *b, sort.field)),
        SortDirection::Desc => rows.sort_by(|a, b| compare(*b, *a, sort.field)),
    }
}

pub fn project<'a, R: TableRow>(rows: &'a [R], controls: &ViewControls) -> Vec<&'a R> {
    let mut projected = filter_rows(rows, &controls.category_filter);
    sort_rows(&mut projected, controls.sort);
    projected
}

/// `"all"` followed by each distinct category in first-seen order.
pub fn category_options<R: TableRow>(rows: &[R]) -> Vec<String> {
    let mut options = vec![ALL_CATEGORIES.to_string()];
    for row in rows {
        if !options.iter().skip(1).any(|c| c == row.category()) {
            options.push(row.category().to_string());
        }
    }
    options
}

// ────────────────────────────────────────────────────────────────────────────
// Row shapes handed to the renderer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub value: String,
    pub label: String,
}

impl CategoryOption {
    fn new(value: String) -> Self {
        let label = if value == ALL_CATEGORIES {
            "All Categories".to_string()
        } else {
            category_label(&value)
        };
        Self { value, label }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillRow {
    pub id: Uuid,
    pub name: String,
    pub count: u32,
    pub category: String,
    pub category_label: String,
    pub confidence: f64,
    pub confidence_percent: u32,
    pub color: &'static str,
}

impl From<&Skill> for SkillRow {
    fn from(skill: &Skill) -> Self {
        Self {
            id: skill.id,
            name: skill.name.clone(),
            count: skill.count,
            category: skill.category.clone(),
            category_label: category_label(&skill.category),
            confidence: skill.confidence,
            confidence_percent: confidence_percent(skill.confidence),
            color: category_color(&skill.category),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregatedRow {
    pub name: String,
    pub appeared_in_jobs: u32,
    pub total_jobs: u32,
    /// e.g. "2 of 3 jobs"
    pub appears_in_label: String,
    pub percentage: f64,
    pub percentage_label: String,
    pub total_count: u32,
    pub category: String,
    pub category_label: String,
    pub color: &'static str,
}

impl AggregatedRow {
    pub fn new(skill: &AggregatedSkill, total_jobs: u32) -> Self {
        Self {
            name: skill.name.clone(),
            appeared_in_jobs: skill.appeared_in_jobs,
            total_jobs,
            appears_in_label: format!("{} of {} jobs", skill.appeared_in_jobs, total_jobs),
            percentage: skill.percentage,
            percentage_label: percent_label(skill.percentage),
            total_count: skill.total_count,
            category: skill.category.clone(),
            category_label: category_label(&skill.category),
            color: category_color(&skill.category),
        }
    }
}

/// Everything a table needs for one render.
#[derive(Debug, Clone, Serialize)]
pub struct TableView<Row> {
    pub controls: ViewControls,
    pub categories: Vec<CategoryOption>,
    /// Rows left after filtering.
    pub shown: usize,
    pub rows: Vec<Row>,
}

pub fn table_view<'a, R, Row, F>(source: &'a [R], controls: &ViewControls, shape: F) -> TableView<Row>
where
    R: TableRow,
    F: Fn(&'a R) -> Row,
{
    let rows: Vec<Row> = project(source, controls).into_iter().map(shape).collect();
    TableView {
        controls: controls.clone(),
        categories: category_options(source)
            .into_iter()
            .map(CategoryOption::new)
            .collect(),
        shown: rows.len(),
        rows,
    }
}
