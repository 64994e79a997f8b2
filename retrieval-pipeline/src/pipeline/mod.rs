mod assemble;
mod config;

pub use assemble::assemble;
pub use config::RetrievalTuning;

use std::{sync::Arc, time::Instant};

use common::{
    error::AppError,
    storage::store::CorpusStore,
    utils::{config::AppConfig, normalize::normalize},
};
use tracing::{info, instrument};

use crate::{
    disambiguation::{backend::build_backends, Disambiguator},
    matching::Matcher,
    RetrievalResult,
};

/// Phrase-to-verse engine: corpus, matcher and disambiguator wired together.
pub struct VerseEngine {
    corpus: Arc<CorpusStore>,
    matcher: Matcher,
    disambiguator: Disambiguator,
    tuning: RetrievalTuning,
}

impl VerseEngine {
    pub fn new(corpus: Arc<CorpusStore>, disambiguator: Disambiguator, tuning: RetrievalTuning) -> Self {
        Self {
            corpus,
            matcher: Matcher::new(&tuning),
            disambiguator,
            tuning,
        }
    }

    /// Build the engine from configuration. The corpus itself is read lazily
    /// on the first call to [`VerseEngine::analyze`] or [`VerseEngine::warm_up`].
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        config.validate()?;

        let backends = build_backends(&config.backends)?;
        Ok(Self::new(
            Arc::new(CorpusStore::from_config(config)),
            Disambiguator::new(backends),
            RetrievalTuning::from_config(config),
        ))
    }

    pub fn corpus(&self) -> &Arc<CorpusStore> {
        &self.corpus
    }

    pub const fn tuning(&self) -> &RetrievalTuning {
        &self.tuning
    }

    /// Force the corpus load. Returns whether the corpus is usable.
    pub async fn warm_up(&self) -> bool {
        self.corpus.index().await.is_some()
    }

    /// Identify the verse `phrase` refers to. Never fails: a missing corpus,
    /// an unmatched phrase or a blank input all report [`RetrievalResult::NotFound`].
    #[instrument(skip_all)]
    pub async fn analyze(&self, phrase: &str) -> RetrievalResult {
        let input_chars = phrase.chars().count();
        let preview: String = phrase.chars().take(120).collect();
        let preview_clean = preview.replace('\n', " ");
        let preview_len = preview_clean.chars().count();
        info!(
            input_chars,
            preview_truncated = input_chars > preview_len,
            preview = %preview_clean,
            "Analyzing phrase"
        );

        if normalize(phrase).is_empty() {
            return RetrievalResult::NotFound;
        }

        let Some(index) = self.corpus.index().await else {
            return RetrievalResult::NotFound;
        };

        let start = Instant::now();

        if let Some(verse) = self.matcher.find_exact(phrase, &index) {
            info!(
                reference = %verse.reference(),
                elapsed_ms = start.elapsed().as_millis(),
                "Exact match"
            );
            return assemble(Some(verse), &[], None);
        }

        let candidates = self
            .matcher
            .find_candidates(phrase, &index, self.tuning.candidate_limit);
        if candidates.is_empty() {
            info!(elapsed_ms = start.elapsed().as_millis(), "No candidate verses");
            return RetrievalResult::NotFound;
        }

        info!(
            candidates = candidates.len(),
            top_score = candidates.first().map_or(0, |top| top.score),
            "Consulting disambiguation backends"
        );

        let decision = self.disambiguator.disambiguate(phrase, &candidates).await;
        let decided_by = decision
            .as_ref()
            .map_or("top_candidate", |decision| decision.backend.as_str())
            .to_string();
        let result = assemble(None, &candidates, decision);

        info!(
            found = result.is_found(),
            decided_by = %decided_by,
            elapsed_ms = start.elapsed().as_millis(),
            "Phrase analyzed"
        );
        result
    }
}
