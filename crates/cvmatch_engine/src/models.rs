//! Typed views of the service's JSON payloads.
use std::collections::BTreeMap;

use cvmatch_core::TaskResult;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchScore {
    pub resume_id: String,
    #[serde(default)]
    pub resume_name: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub job_title: String,
    pub overall_score: f64,
    #[serde(default)]
    pub skills_score: f64,
    #[serde(default)]
    pub education_score: f64,
    #[serde(default)]
    pub experience_score: f64,
    #[serde(default)]
    pub keyword_match_score: f64,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobDescription {
    pub id: String,
    pub title: String,
    pub company: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub created_date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedResume {
    pub file_name: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
}

/// Batch matching answers with one score list per job id.
pub type BatchMatches = BTreeMap<String, Vec<MatchScore>>;

/// Decodes a JSON result into `T`; `None` for download results.
pub fn decode_result<T: DeserializeOwned>(result: &TaskResult) -> Option<Result<T, serde_json::Error>> {
    match result {
        TaskResult::Json(value) => Some(T::deserialize(value)),
        TaskResult::Downloaded { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn match_scores_decode_with_missing_optional_fields() {
        let result = TaskResult::Json(json!([{ "resume_id": "r1", "overall_score": 87 }]));
        let scores: Vec<MatchScore> = decode_result(&result).unwrap().unwrap();
        assert_eq!(scores[0].resume_id, "r1");
        assert_eq!(scores[0].overall_score, 87.0);
        assert!(scores[0].matched_skills.is_empty());
    }

    #[test]
    fn batch_matches_are_keyed_by_job() {
        let result = TaskResult::Json(json!({
            "1": [{ "resume_id": "r1", "overall_score": 40.5 }],
            "2": []
        }));
        let batch: BatchMatches = decode_result(&result).unwrap().unwrap();
        assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["1", "2"]);
    }
}
