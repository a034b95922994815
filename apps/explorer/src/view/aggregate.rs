//! Client-side re-derivation of aggregated skills from individual analyses.
//!
//! The service computes `aggregated_skills` itself; this is used to cross-check
//! a received batch before it is shown.

use std::collections::HashMap;

use crate::models::analysis::{job_share, AggregatedSkill, AnalysisResult, BatchResult};

/// Merges skills by name across `analyses`.
///
/// `total_count` sums raw occurrences, `appeared_in_jobs` counts each job at
/// most once, and `percentage` is the job share (unrounded). The category is
/// the one seen first. Output is ordered by `total_count` descending, ties in
/// first-seen order.
pub fn merge_analyses(analyses: &[AnalysisResult]) -> Vec<AggregatedSkill> {
    let total_jobs = analyses.len() as u32;
    let mut merged: Vec<AggregatedSkill> = Vec::new();
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();

    for analysis in analyses {
        let mut seen_in_job: Vec<usize> = Vec::new();

        for skill in &analysis.skills {
            let index = *index_by_name.entry(skill.name.as_str()).or_insert_with(|| {
                merged.push(AggregatedSkill {
                    name: skill.name.clone(),
                    total_count: 0,
                    appeared_in_jobs: 0,
                    percentage: 0.0,
                    category: skill.category.clone(),
                });
                merged.len() - 1
            });

            merged[index].total_count += skill.count;
            if !seen_in_job.contains(&index) {
                seen_in_job.push(index);
                merged[index].appeared_in_jobs += 1;
            }
        }
    }

    for skill in &mut merged {
        skill.percentage = job_share(skill.appeared_in_jobs, total_jobs);
    }
    merged.sort_by(|a, b| b.total_count.cmp(&a.total_count));
    merged
}

/// Skills whose received aggregate differs from the one derived from the batch's
/// own individual analyses.
pub fn aggregation_mismatches(batch: &BatchResult) -> Vec<String> {
    let received: HashMap<&str, &AggregatedSkill> = batch
        .aggregated_skills
        .iter()
        .map(|s| (s.name.as_str(), s))
        .collect();

    merge_analyses(&batch.individual_analyses)
        .into_iter()
        .filter_map(|derived| match received.get(derived.name.as_str()) {
            None => Some(format!("'{}' is missing from aggregated_skills", derived.name)),
            Some(got)
                if got.total_count != derived.total_count
                    || got.appeared_in_jobs != derived.appeared_in_jobs =>
            {
                Some(format!(
                    "'{}' aggregates to {} occurrences in {} jobs, received {} in {}",
                    derived.name,
                    derived.total_count,
                    derived.appeared_in_jobs,
                    got.total_count,
                    got.appeared_in_jobs
                ))
            }
            Some(_) => None,
        })
        .collect()
}
