pub mod disambiguation;
pub mod matching;
pub mod pipeline;
pub mod scoring;

use common::storage::types::verse_record::VerseRecord;
use serde::Serialize;

pub use pipeline::{RetrievalTuning, VerseEngine};

/// Outcome of analyzing a phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RetrievalResult {
    Found {
        reference: String,
        text: String,
        /// Short annotation such as a confidence label. May be empty.
        context: String,
    },
    NotFound,
}

impl RetrievalResult {
    pub fn found(verse: &VerseRecord, context: String) -> Self {
        Self::Found {
            reference: verse.reference().to_string(),
            text: verse.text().to_string(),
            context,
        }
    }

    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// `"<reference> - <text>"`, the form shown to players.
    pub fn passage(&self) -> Option<String> {
        match self {
            Self::Found {
                reference, text, ..
            } => Some(format!("{reference} - {text}")),
            Self::NotFound => None,
        }
    }
}
