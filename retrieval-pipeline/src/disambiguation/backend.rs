use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use common::{
    error::AppError,
    utils::config::{BackendConfig, BackendKind},
};
use tracing::{info, warn};

use super::{chat::ChatCompletionsBackend, ollama::OllamaBackend};

/// A remote text-generation endpoint consulted to pick among candidates.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Upper bound for a single attempt. `None` waits indefinitely.
    fn timeout(&self) -> Option<Duration>;

    /// Raw model output for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

pub type SharedBackend = Arc<dyn GenerationBackend>;

/// Instantiate the configured backends in priority order, skipping the ones
/// that lack credentials.
pub fn build_backends(configs: &[BackendConfig]) -> Result<Vec<SharedBackend>, AppError> {
    let mut backends: Vec<SharedBackend> = Vec::with_capacity(configs.len());

    for config in configs {
        if !config.is_configured() {
            warn!(
                backend = %config.name,
                "Disambiguation backend is missing credentials; skipping it"
            );
            continue;
        }

        let backend: SharedBackend = match config.kind {
            BackendKind::Ollama => Arc::new(OllamaBackend::from_config(config)?),
            BackendKind::ChatCompletions => Arc::new(ChatCompletionsBackend::from_config(config)?),
        };

        info!(
            backend = %config.name,
            kind = ?config.kind,
            model = %config.model,
            timeout = ?config.timeout(),
            "Disambiguation backend registered"
        );
        backends.push(backend);
    }

    if backends.is_empty() {
        warn!("No disambiguation backend configured; ambiguous phrases resolve to the top candidate");
    }

    Ok(backends)
}
