use std::sync::Arc;

use crate::{seed::StudentSnapshot, survey::SurveyStore};

pub struct AppState {
    pub students: StudentSnapshot,
    pub surveys: Arc<dyn SurveyStore>,
    pub strict_params: bool,
}

impl AppState {
    pub fn new(
        students: StudentSnapshot,
        surveys: Arc<dyn SurveyStore>,
        strict_params: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            students,
            surveys,
            strict_params,
        })
    }
}
