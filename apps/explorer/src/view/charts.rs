//! Chart series: bar chart of the most frequent skills and pie chart of categories.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::analysis::{AggregatedSkill, Skill};
use crate::view::format::{category_color, category_label, confidence_percent};

/// Slices at or below this share of the total get no inline label.
const INLINE_LABEL_MIN_SHARE: f64 = 5.0;

/// A record that can be plotted as a bar.
pub trait BarSource {
    /// Bars shown when the caller gives no limit.
    const DEFAULT_LIMIT: usize;

    fn name(&self) -> &str;
    fn category(&self) -> &str;
    /// Raw occurrence count the bar height is taken from.
    fn raw_count(&self) -> u32;
    fn confidence(&self) -> Option<f64>;
}

impl BarSource for Skill {
    const DEFAULT_LIMIT: usize = 15;

    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn raw_count(&self) -> u32 {
        self.count
    }
    fn confidence(&self) -> Option<f64> {
        Some(self.confidence)
    }
}

impl BarSource for AggregatedSkill {
    const DEFAULT_LIMIT: usize = 20;

    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn raw_count(&self) -> u32 {
        self.total_count
    }
    fn confidence(&self) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDatum {
    pub name: String,
    pub value: u32,
    pub color: &'static str,
    pub category: String,
    pub category_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_percent: Option<u32>,
}

/// Top `limit` entries by raw count, descending. Ignores table sort and filter.
pub fn bar_series<S: BarSource>(source: &[S], limit: Option<usize>) -> Vec<BarDatum> {
    let limit = limit.unwrap_or(S::DEFAULT_LIMIT);
    let mut ranked: Vec<&S> = source.iter().collect();
    ranked.sort_by(|a, b| b.raw_count().cmp(&a.raw_count()));

    ranked
        .into_iter()
        .take(limit)
        .map(|s| BarDatum {
            name: s.name().to_string(),
            value: s.raw_count(),
            color: category_color(s.category()),
            category: s.category().to_string(),
            category_label: category_label(s.category()),
            confidence_percent: s.confidence().map(confidence_percent),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub key: String,
    pub label: String,
    pub value: u32,
    pub color: &'static str,
    /// Share of the total, 0 – 100.
    pub percentage: f64,
    /// Tooltip text, one decimal.
    pub percentage_label: String,
    /// `None` for thin slices; the tooltip still carries the numbers.
    pub inline_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSeries {
    pub total: u32,
    pub slices: Vec<PieSlice>,
}

/// Category → count map as pie slices, largest first.
pub fn pie_series(categories: &BTreeMap<String, u32>) -> PieSeries {
    let total: u32 = categories.values().sum();

    let mut slices: Vec<PieSlice> = categories
        .iter()
        .map(|(key, &value)| {
            let percentage = if total > 0 {
                100.0 * f64::from(value) / f64::from(total)
            } else {
                0.0
            };
            let label = category_label(key);
            let inline_label = (percentage > INLINE_LABEL_MIN_SHARE)
                .then(|| format!("{label} {percentage:.0}%"));
            PieSlice {
                key: key.clone(),
                label,
                value,
                color: category_color(key),
                percentage,
                percentage_label: format!("{percentage:.1}%"),
                inline_label,
            }
        })
        .collect();

    slices.sort_by(|a, b| b.value.cmp(&a.value));

    PieSeries { total, slices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::fixtures::{aggregated, skill};

    #[test]
    fn test_bar_series_takes_top_by_count() {
        let skills = vec![
            skill("Go", "programming_languages", 1, 0.9),
            skill("React", "frameworks", 7, 0.8),
            skill("AWS", "cloud_platforms", 3, 0.7),
            skill("Vue", "frameworks", 7, 0.6),
        ];
        let bars = bar_series(&skills, Some(3));
        let names: Vec<&str> = bars.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["React", "Vue", "AWS"]);
        assert_eq!(bars[0].color, "#10b981");
        assert_eq!(bars[0].confidence_percent, Some(80));
        assert_eq!(bars[2].category_label, "Cloud Platforms");
    }

    #[test]
    fn test_bar_series_limit_larger_than_source() {
        let skills = vec![skill("Go", "programming_languages", 1, 0.9)];
        assert_eq!(bar_series(&skills, None).len(), 1);
    }

    #[test]
    fn test_default_bar_limit_per_result_kind() {
        let skills: Vec<Skill> = (0..25)
            .map(|i| skill(&format!("skill-{i}"), "other", i, 0.5))
            .collect();
        assert_eq!(bar_series(&skills, None).len(), 15);

        let rows: Vec<AggregatedSkill> = (0..25)
            .map(|i| aggregated(&format!("skill-{i}"), "other", i, 1, 2))
            .collect();
        assert_eq!(bar_series(&rows, None).len(), 20);
        assert_eq!(bar_series(&rows, Some(5)).len(), 5);
    }

    #[test]
    fn test_bar_series_for_batch_uses_total_count() {
        let rows = vec![
            aggregated("Python", "programming_languages", 2, 2, 3),
            aggregated("Docker", "devops_tools", 9, 1, 3),
        ];
        let bars = bar_series(&rows, Some(10));
        assert_eq!(bars[0].name, "Docker");
        assert_eq!(bars[0].value, 9);
        assert_eq!(bars[0].confidence_percent, None);
    }

    #[test]
    fn test_pie_series_sorted_with_percentages() {
        let mut categories = BTreeMap::new();
        categories.insert("databases".to_string(), 2);
        categories.insert("frameworks".to_string(), 6);
        categories.insert("programming_languages".to_string(), 12);

        let pie = pie_series(&categories);
        assert_eq!(pie.total, 20);
        assert_eq!(pie.slices[0].label, "Programming Languages");
        assert_eq!(pie.slices[0].percentage_label, "60.0%");
        assert_eq!(pie.slices[1].value, 6);
        assert_eq!(pie.slices[2].key, "databases");
        let sum: f64 = pie.slices.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_thin_slices_have_no_inline_label() {
        let mut categories = BTreeMap::new();
        categories.insert("frameworks".to_string(), 96);
        categories.insert("security".to_string(), 4);

        let pie = pie_series(&categories);
        assert_eq!(pie.slices[0].inline_label.as_deref(), Some("Frameworks 96%"));
        assert_eq!(pie.slices[1].inline_label, None);
        assert_eq!(pie.slices[1].percentage_label, "4.0%");
    }

    #[test]
    fn test_exactly_five_percent_has_no_inline_label() {
        let mut categories = BTreeMap::new();
        categories.insert("frameworks".to_string(), 95);
        categories.insert("security".to_string(), 5);
        let pie = pie_series(&categories);
        assert_eq!(pie.slices[1].inline_label, None);
    }

    #[test]
    fn test_pie_series_empty() {
        let pie = pie_series(&BTreeMap::new());
        assert_eq!(pie.total, 0);
        assert!(pie.slices.is_empty());
    }
}
