use serde_json::Value;

use crate::models::analysis::{AnalysisResult, BatchResult, Received};

/// A result serialized for download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Pretty-printed copy of the body the service sent, named `skills-analysis-<id>.json`.
pub fn export_analysis(result: &Received<AnalysisResult>) -> Result<ExportFile, serde_json::Error> {
    export(format!("skills-analysis-{}.json", result.value.id), &result.raw)
}

/// Pretty-printed copy of the body the service sent, named `batch-analysis-<id>.json`.
pub fn export_batch(result: &Received<BatchResult>) -> Result<ExportFile, serde_json::Error> {
    export(format!("batch-analysis-{}.json", result.value.id), &result.raw)
}

fn export(file_name: String, raw: &Value) -> Result<ExportFile, serde_json::Error> {
    Ok(ExportFile {
        file_name,
        contents: serde_json::to_string_pretty(raw)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::fixtures::{analysis, batch, received, skill};

    const SERVICE_BODY: &str = r#"{
        "id": "7f1c2a44-7c1e-4b0e-9a57-1d7a4c9e2b10",
        "title": null,
        "analyzed_at": "2024-05-01T12:30:00.123456",
        "skills": [
            {"id": "0e7c6d4b-2f7e-4a53-8d39-5b1f0b8e6a01", "name": "React", "count": 3, "category": "frameworks", "confidence": 0.92},
            {"id": "5a0f5f0e-3c9e-4b8e-9f6a-2e6d8b7c4d02", "name": "PostgreSQL", "count": 1, "category": "databases", "confidence": 0.8}
        ],
        "total_skills_found": 2,
        "categories": {"frameworks": 1, "databases": 1},
        "extraction_ms": 41
    }"#;

    #[test]
    fn test_single_export_is_the_received_body() {
        let result: Received<AnalysisResult> = serde_json::from_str(SERVICE_BODY).unwrap();
        let file = export_analysis(&result).unwrap();
        assert_eq!(
            file.file_name,
            "skills-analysis-7f1c2a44-7c1e-4b0e-9a57-1d7a4c9e2b10.json"
        );
        assert!(file.contents.contains('\n'), "expected pretty-printed JSON");

        let exported: Value = serde_json::from_str(&file.contents).unwrap();
        let sent: Value = serde_json::from_str(SERVICE_BODY).unwrap();
        assert_eq!(exported, sent);
        assert!(exported.get("title").is_some());
        assert_eq!(exported["analyzed_at"], "2024-05-01T12:30:00.123456");
        assert_eq!(exported["extraction_ms"], 41);
    }

    #[test]
    fn test_export_keeps_category_order() {
        let result: Received<AnalysisResult> = serde_json::from_str(SERVICE_BODY).unwrap();
        let file = export_analysis(&result).unwrap();
        let frameworks = file.contents.find("\"frameworks\": 1").unwrap();
        let databases = file.contents.find("\"databases\": 1").unwrap();
        assert!(frameworks < databases);
    }

    #[test]
    fn test_batch_export_name() {
        let result = received(batch(vec![
            analysis(None, vec![skill("Rust", "programming_languages", 2, 0.9)]),
            analysis(None, vec![skill("Go", "programming_languages", 1, 0.9)]),
        ]));
        let file = export_batch(&result).unwrap();
        assert_eq!(file.file_name, format!("batch-analysis-{}.json", result.value.id));
        assert!(file.contents.contains("\"aggregated_skills\""));
    }
}
