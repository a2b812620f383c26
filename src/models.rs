use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u32,
    pub name: String,
    pub major: String,
    pub gpa: f64,
    pub peer_score: f64,
    pub experience_score: f64,
    /// Pre-computed ranking value; never derived from the sub-scores here.
    pub composite_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl SurveyResponse {
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorSummary {
    pub major: String,
    pub count: usize,
    pub avg_gpa: f64,
    pub avg_composite_score: f64,
}
