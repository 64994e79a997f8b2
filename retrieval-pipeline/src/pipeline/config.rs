use common::utils::config::AppConfig;
use serde::{Deserialize, Serialize};

/// Tunable parameters that govern each matching stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalTuning {
    /// Shortlist size handed to the disambiguation backends.
    pub candidate_limit: usize,
    /// Query tokens shorter than this are too common to rank on.
    pub min_token_chars: usize,
    /// Normalized queries shorter than this skip the containment tier. Zero disables the gate.
    #[serde(default)]
    pub exact_min_query_chars: usize,
}

impl Default for RetrievalTuning {
    fn default() -> Self {
        Self {
            candidate_limit: 3,
            min_token_chars: 4,
            exact_min_query_chars: 0,
        }
    }
}

impl RetrievalTuning {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            candidate_limit: config.candidate_limit,
            min_token_chars: config.min_token_chars,
            exact_min_query_chars: config.exact_min_query_chars,
        }
    }
}
