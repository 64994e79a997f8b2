use std::time::Duration;

use async_openai::error::OpenAIError;
use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Corpus unavailable: {0}")]
    CorpusUnavailable(String),
    #[error("Backend {backend} unreachable: {reason}")]
    BackendUnreachable { backend: String, reason: String },
    #[error("Backend {backend} timed out after {timeout:?}")]
    BackendTimeout { backend: String, timeout: Duration },
    #[error("Backend {backend} returned a malformed response: {reason}")]
    BackendMalformedResponse { backend: String, reason: String },
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("LLM parsing error: {0}")]
    LLMParsing(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl AppError {
    /// Per-attempt backend failures are recovered by trying the next backend.
    pub const fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::BackendUnreachable { .. }
                | Self::BackendTimeout { .. }
                | Self::BackendMalformedResponse { .. }
                | Self::OpenAI(_)
                | Self::LLMParsing(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_are_classified() {
        let timeout = AppError::BackendTimeout {
            backend: "primary".into(),
            timeout: Duration::from_secs(20),
        };
        assert!(timeout.is_backend_failure());
        assert_eq!(timeout.to_string(), "Backend primary timed out after 20s");

        let corpus = AppError::CorpusUnavailable("biblia.txt".into());
        assert!(!corpus.is_backend_failure());
        assert_eq!(corpus.to_string(), "Corpus unavailable: biblia.txt");
    }
}
