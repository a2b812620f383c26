use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use thiserror::Error;

use crate::models::SurveyResponse;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SurveyStore: Send + Sync {
    async fn save_survey_response(&self, response: &SurveyResponse) -> Result<(), StoreError>;
}

pub struct PgSurveyStore {
    pool: PgPool,
}

impl PgSurveyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveyStore for PgSurveyStore {
    async fn save_survey_response(&self, response: &SurveyResponse) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO signl.survey_responses (id, payload, submitted_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(response.id)
        .bind(Json(&response.payload))
        .bind(response.submitted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySurveyStore {
    responses: Mutex<Vec<SurveyResponse>>,
}

impl MemorySurveyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SurveyStore for MemorySurveyStore {
    async fn save_survey_response(&self, response: &SurveyResponse) -> Result<(), StoreError> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(response.clone());
        Ok(())
    }
}
