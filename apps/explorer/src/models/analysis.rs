use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Upstream rounds aggregated percentages to one decimal place.
const PERCENTAGE_TOLERANCE: f64 = 0.051;

/// One extracted skill as returned by the NLP service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub count: u32,
    pub category: String,
    /// 0.0 – 1.0
    pub confidence: f64,
}

/// Result of analyzing a single job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_service_time")]
    pub analyzed_at: DateTime<Utc>,
    pub skills: Vec<Skill>,
    pub total_skills_found: u32,
    /// Number of skill records per category.
    pub categories: BTreeMap<String, u32>,
}

/// A skill merged by name across several analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSkill {
    pub name: String,
    pub total_count: u32,
    pub appeared_in_jobs: u32,
    /// 100 * appeared_in_jobs / total_jobs
    pub percentage: f64,
    pub category: String,
}

/// Result of analyzing 2..=10 job descriptions together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub id: Uuid,
    #[serde(deserialize_with = "deserialize_service_time")]
    pub analyzed_at: DateTime<Utc>,
    pub total_jobs: u32,
    pub aggregated_skills: Vec<AggregatedSkill>,
    pub individual_analyses: Vec<AnalysisResult>,
    pub top_skills: Vec<AggregatedSkill>,
    pub category_breakdown: BTreeMap<String, u32>,
}

/// A service response together with the JSON body it was parsed from.
///
/// `raw` keeps fields, key order and timestamp text exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct Received<T> {
    pub value: T,
    pub raw: Value,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Received<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let value = T::deserialize(&raw).map_err(serde::de::Error::custom)?;
        Ok(Self { value, raw })
    }
}

/// The service stamps results with naive UTC times (`2024-05-01T12:30:00.123456`).
/// RFC 3339 with an offset is accepted as well.
fn parse_service_time(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|t| t.and_utc()))
}

fn deserialize_service_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_service_time(&raw).map_err(serde::de::Error::custom)
}

/// Wire shape of one job submitted for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInput {
    pub job_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchRequest<'a> {
    pub jobs: &'a [JobInput],
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchJobRequest<'a> {
    pub url: &'a str,
}

/// Job posting scraped by the URL-fetch service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedJob {
    pub title: String,
    pub description: String,
}

/// Tally of skill records per category. Each record counts once, whatever its `count`.
pub fn tally_categories(skills: &[Skill]) -> BTreeMap<String, u32> {
    let mut tally = BTreeMap::new();
    for skill in skills {
        *tally.entry(skill.category.clone()).or_insert(0) += 1;
    }
    tally
}

impl AnalysisResult {
    /// Lists every way this result disagrees with its own invariants.
    /// Empty when the payload is internally consistent.
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.total_skills_found as usize != self.skills.len() {
            issues.push(format!(
                "total_skills_found is {} but {} skills were returned",
                self.total_skills_found,
                self.skills.len()
            ));
        }

        if tally_categories(&self.skills) != self.categories {
            issues.push("categories do not match the per-category skill tally".to_string());
        }

        issues
    }
}

impl BatchResult {
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.individual_analyses.len() != self.total_jobs as usize {
            issues.push(format!(
                "total_jobs is {} but {} individual analyses were returned",
                self.total_jobs,
                self.individual_analyses.len()
            ));
        }

        for skill in &self.aggregated_skills {
            if skill.appeared_in_jobs > self.total_jobs {
                issues.push(format!(
                    "'{}' appears in {} jobs out of {}",
                    skill.name, skill.appeared_in_jobs, self.total_jobs
                ));
            }
            if self.total_jobs > 0 {
                let expected = job_share(skill.appeared_in_jobs, self.total_jobs);
                if (skill.percentage - expected).abs() > PERCENTAGE_TOLERANCE {
                    issues.push(format!(
                        "'{}' percentage is {} but its job share is {expected:.2}",
                        skill.name, skill.percentage
                    ));
                }
            }
        }

        for (index, analysis) in self.individual_analyses.iter().enumerate() {
            for issue in analysis.consistency_issues() {
                issues.push(format!("job #{}: {issue}", index + 1));
            }
        }

        issues
    }
}

/// Percentage of jobs a skill appeared in, not of occurrences.
pub fn job_share(appeared_in_jobs: u32, total_jobs: u32) -> f64 {
    if total_jobs == 0 {
        return 0.0;
    }
    100.0 * f64::from(appeared_in_jobs) / f64::from(total_jobs)
}
