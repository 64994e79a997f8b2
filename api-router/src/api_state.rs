use std::sync::Arc;

use common::{error::AppError, utils::config::AppConfig};
use retrieval_pipeline::VerseEngine;

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<VerseEngine>,
}

impl ApiState {
    pub const fn new(engine: Arc<VerseEngine>) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self::new(Arc::new(VerseEngine::from_config(config)?)))
    }
}
