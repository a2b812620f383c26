use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
    error::AppError,
    models::{MajorSummary, Student, SurveyResponse},
    query::{self, StudentFilter},
    report,
    state::AppState,
};

#[derive(Debug, Default)]
pub struct StudentParams {
    pub major: Option<String>,
    pub min_gpa: Option<String>,
}

impl StudentParams {
    /// Repeated keys keep their first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "major" if params.major.is_none() => params.major = Some(value),
                "minGpa" if params.min_gpa.is_none() => params.min_gpa = Some(value),
                _ => {}
            }
        }

        params
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

pub fn parse_min_gpa(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn student_filter(params: StudentParams, strict: bool) -> Result<StudentFilter, AppError> {
    let min_gpa = match params.min_gpa.as_deref() {
        None | Some("") => None,
        Some(raw) => match parse_min_gpa(raw) {
            Some(value) => Some(value),
            None if strict => {
                return Err(AppError::InvalidParameter {
                    name: "minGpa",
                    value: raw.to_string(),
                })
            }
            None => {
                warn!("Ignoring malformed minGpa {raw:?}");
                None
            }
        },
    };

    Ok(StudentFilter::new(params.major, min_gpa))
}

pub async fn students_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Student>>, AppError> {
    let filter = student_filter(StudentParams::from_pairs(pairs), state.strict_params)?;
    if !filter.is_empty() {
        debug!("Filtering students by {filter:?}");
    }
    let ranked = query::rank_students(state.students.as_slice(), &filter);

    Ok(Json(ranked))
}

pub async fn summary_handler(State(state): State<Arc<AppState>>) -> Json<Vec<MajorSummary>> {
    Json(report::summarize_by_major(state.students.as_slice()))
}

pub async fn survey_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Ack>, AppError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejecting malformed survey body: {e}");
        AppError::MalformedPayload
    })?;
    let response = SurveyResponse::new(payload);

    state
        .surveys
        .save_survey_response(&response)
        .await
        .map_err(|e| {
            error!("Failed to save survey {}: {e}", response.id);
            AppError::SurveySave(e)
        })?;

    info!("Saved survey {}", response.id);
    Ok(Ack::ok())
}

pub async fn opt_in_handler(Path(token): Path<String>, body: Bytes) -> Json<Ack> {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => info!("Opt-in submitted for token {token}: {payload}"),
        Err(_) => info!(
            "Opt-in submitted for token {token} with raw body {:?}",
            String::from_utf8_lossy(&body)
        ),
    }

    Ack::ok()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        body::to_bytes,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use serde_json::json;

    use super::*;
    use crate::{
        seed::{demo_roster, StudentSnapshot},
        survey::{MemorySurveyStore, StoreError, SurveyStore},
    };

    struct FailingStore;

    #[async_trait]
    impl SurveyStore for FailingStore {
        async fn save_survey_response(&self, _: &SurveyResponse) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(
                "connection refused: db.internal:5432".to_string(),
            ))
        }
    }

    fn state_with(surveys: Arc<dyn SurveyStore>, strict_params: bool) -> Arc<AppState> {
        let students = StudentSnapshot::new(demo_roster()).unwrap();
        AppState::new(students, surveys, strict_params)
    }

    fn demo_state() -> Arc<AppState> {
        state_with(Arc::new(MemorySurveyStore::new()), false)
    }

    fn pairs(items: &[(&str, &str)]) -> Query<Vec<(String, String)>> {
        Query(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ids(students: &[Student]) -> Vec<u32> {
        students.iter().map(|s| s.id).collect()
    }

    #[test]
    fn min_gpa_parsing() {
        assert_eq!(parse_min_gpa("3.5"), Some(3.5));
        assert_eq!(parse_min_gpa(" 3 "), Some(3.0));
        assert_eq!(parse_min_gpa("abc"), None);
        assert_eq!(parse_min_gpa("NaN"), None);
        assert_eq!(parse_min_gpa("inf"), None);
    }

    #[test]
    fn repeated_params_keep_first_value() {
        let Query(items) = pairs(&[
            ("minGpa", "3.9"),
            ("major", "Finance"),
            ("minGpa", "1"),
            ("major", "Marketing"),
            ("sort", "name"),
        ]);
        let params = StudentParams::from_pairs(items);

        assert_eq!(params.min_gpa.as_deref(), Some("3.9"));
        assert_eq!(params.major.as_deref(), Some("Finance"));
    }

    #[tokio::test]
    async fn lists_all_students_ranked() {
        let Json(students) = students_handler(State(demo_state()), pairs(&[]))
            .await
            .unwrap();

        assert_eq!(students.len(), 10);
        assert_eq!(ids(&students), vec![1, 9, 4, 3, 2, 7, 10, 5, 8, 6]);
    }

    #[tokio::test]
    async fn filters_by_major_and_min_gpa() {
        let Json(students) = students_handler(
            State(demo_state()),
            pairs(&[("major", "Computer Science"), ("minGpa", "3.5")]),
        )
        .await
        .unwrap();

        assert_eq!(ids(&students), vec![1, 4]);
    }

    #[tokio::test]
    async fn empty_major_is_ignored() {
        let Json(students) =
            students_handler(State(demo_state()), pairs(&[("major", ""), ("minGpa", "")]))
                .await
                .unwrap();
        assert_eq!(students.len(), 10);
    }

    #[tokio::test]
    async fn lenient_mode_ignores_malformed_min_gpa() {
        let Json(students) = students_handler(State(demo_state()), pairs(&[("minGpa", "abc")]))
            .await
            .unwrap();
        assert_eq!(students.len(), 10);
    }

    #[tokio::test]
    async fn duplicate_min_gpa_uses_first() {
        let Json(students) = students_handler(
            State(demo_state()),
            pairs(&[("minGpa", "3.9"), ("minGpa", "1")]),
        )
        .await
        .unwrap();
        assert_eq!(ids(&students), vec![1, 9]);
    }

    #[tokio::test]
    async fn strict_mode_rejects_malformed_min_gpa() {
        let state = state_with(Arc::new(MemorySurveyStore::new()), true);
        let err = students_handler(State(state), pairs(&[("minGpa", "abc")]))
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Invalid minGpa: abc" })
        );
    }

    #[tokio::test]
    async fn summary_covers_every_major() {
        let Json(summaries) = summary_handler(State(demo_state())).await;
        assert_eq!(summaries.len(), 5);
        assert_eq!(summaries.iter().map(|s| s.count).sum::<usize>(), 10);
    }

    #[tokio::test]
    async fn survey_submit_persists() {
        let store = Arc::new(MemorySurveyStore::new());
        let state = state_with(store.clone(), false);

        let Json(ack) = survey_handler(
            State(state),
            Bytes::from_static(br#"{"nominees":["Maya Chen"]}"#),
        )
        .await
        .unwrap();

        assert_eq!(ack, Ack { ok: true });
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn malformed_survey_body_is_a_json_400() {
        let store = Arc::new(MemorySurveyStore::new());
        let state = state_with(store.clone(), false);

        let err = survey_handler(State(state), Bytes::from_static(b"{bad"))
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Malformed payload" })
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn survey_failure_hides_store_error() {
        let state = state_with(Arc::new(FailingStore), false);
        let err = survey_handler(State(state), Bytes::from_static(br#"{"nominees":[]}"#))
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "Failed to save survey" }));
        assert!(!body.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn opt_in_always_acknowledges() {
        let Json(ack) = opt_in_handler(
            Path("tok_4f2a".to_string()),
            Bytes::from_static(br#"{"email":"maya@example.edu"}"#),
        )
        .await;
        assert!(ack.ok);

        for body in [&b""[..], &b"not json"[..]] {
            let response = opt_in_handler(Path("tok_4f2a".to_string()), Bytes::from(body))
                .await
                .into_response();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await, json!({ "ok": true }));
        }
    }
}
