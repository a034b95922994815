//! Request assembler: splits raw entries into valid and skipped, then picks
//! the single or batch endpoint by how many survive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::analysis::JobInput;

pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// One job as typed or imported by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Job description must be at least {MIN_DESCRIPTION_CHARS} characters long")]
    NoValidEntries,
}

/// Which upstream endpoint a submission goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Single,
    Batch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Single(JobInput),
    Batch(Vec<JobInput>),
}

impl Submission {
    pub fn route(&self) -> Route {
        match self {
            Submission::Single(_) => Route::Single,
            Submission::Batch(_) => Route::Batch,
        }
    }

    pub fn job_count(&self) -> usize {
        match self {
            Submission::Single(_) => 1,
            Submission::Batch(jobs) => jobs.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub submission: Submission,
    pub skipped: usize,
}

impl Assembled {
    /// Non-fatal notice when some entries were dropped.
    pub fn warning(&self) -> Option<String> {
        (self.skipped > 0).then(|| {
            format!(
                "{} job description(s) were skipped (too short)",
                self.skipped
            )
        })
    }
}

pub fn is_valid_description(description: &str) -> bool {
    description.trim().chars().count() >= MIN_DESCRIPTION_CHARS
}

fn to_job_input(entry: &RawEntry) -> JobInput {
    let title = entry
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    JobInput {
        job_description: entry.description.clone(),
        title,
    }
}

/// Fails only when no entry is valid. One valid entry → single, two or more → batch.
pub fn assemble(entries: &[RawEntry]) -> Result<Assembled, ValidationError> {
    let mut valid: Vec<JobInput> = entries
        .iter()
        .filter(|e| is_valid_description(&e.description))
        .map(to_job_input)
        .collect();

    let skipped = entries.len() - valid.len();

    let submission = match valid.len() {
        0 => return Err(ValidationError::NoValidEntries),
        1 => Submission::Single(valid.remove(0)),
        _ => Submission::Batch(valid),
    };

    Ok(Assembled {
        submission,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: Option<&str>, len: usize) -> RawEntry {
        RawEntry {
            title: title.map(str::to_string),
            description: "a".repeat(len),
        }
    }

    #[test]
    fn test_single_valid_entry_routes_single() {
        let assembled = assemble(&[entry(Some("Backend Engineer"), 60)]).unwrap();
        assert_eq!(assembled.submission.route(), Route::Single);
        assert_eq!(assembled.skipped, 0);
        assert_eq!(assembled.warning(), None);
    }

    #[test]
    fn test_two_valid_entries_route_batch() {
        let assembled = assemble(&[entry(None, 60), entry(None, 80)]).unwrap();
        assert_eq!(assembled.submission.route(), Route::Batch);
        assert_eq!(assembled.submission.job_count(), 2);
    }

    #[test]
    fn test_no_valid_entries_is_error() {
        let err = assemble(&[entry(None, 10), entry(None, 49)]).unwrap_err();
        assert_eq!(err, ValidationError::NoValidEntries);
        assert_eq!(
            err.to_string(),
            "Job description must be at least 50 characters long"
        );
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(assemble(&[]).is_err());
    }

    #[test]
    fn test_partial_validity_proceeds_with_warning() {
        let assembled = assemble(&[entry(None, 60), entry(None, 5), entry(None, 70)]).unwrap();
        assert_eq!(assembled.skipped, 1);
        assert_eq!(assembled.submission.job_count(), 2);
        assert_eq!(
            assembled.warning().as_deref(),
            Some("1 job description(s) were skipped (too short)")
        );
    }

    #[test]
    fn test_one_valid_of_two_routes_single() {
        let assembled = assemble(&[entry(None, 5), entry(None, 70)]).unwrap();
        assert_eq!(assembled.submission.route(), Route::Single);
        assert_eq!(assembled.skipped, 1);
    }

    #[test]
    fn test_length_measured_after_trim() {
        let padded = RawEntry {
            title: None,
            description: format!("   {}   ", "b".repeat(49)),
        };
        assert!(!is_valid_description(&padded.description));
        assert!(is_valid_description(&"b".repeat(50)));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 25 two-byte characters: 50 bytes but only 25 chars
        assert!(!is_valid_description(&"é".repeat(25)));
        assert!(is_valid_description(&"é".repeat(50)));
    }

    #[test]
    fn test_blank_title_omitted_and_title_trimmed() {
        let assembled = assemble(&[entry(Some("   "), 60), entry(Some("  SRE  "), 60)]).unwrap();
        match assembled.submission {
            Submission::Batch(jobs) => {
                assert_eq!(jobs[0].title, None);
                assert_eq!(jobs[1].title.as_deref(), Some("SRE"));
            }
            other => panic!("expected batch, got {other:?}"),
        }
    }
}
