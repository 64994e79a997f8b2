use common::{
    storage::{corpus::CorpusIndex, types::verse_record::VerseRecord},
    utils::normalize::normalize,
};

use crate::{
    pipeline::RetrievalTuning,
    scoring::{discriminative_terms, overlap_score, sort_by_score_desc, Scored},
};

/// A verse provisionally matching a query, with its lexical-overlap score.
pub type MatchCandidate<'a> = Scored<&'a VerseRecord>;

/// Deterministic two-tier matcher: containment first, then term overlap.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    min_token_chars: usize,
    exact_min_query_chars: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(&RetrievalTuning::default())
    }
}

impl Matcher {
    pub const fn new(tuning: &RetrievalTuning) -> Self {
        Self {
            min_token_chars: tuning.min_token_chars,
            exact_min_query_chars: tuning.exact_min_query_chars,
        }
    }

    /// First verse, in corpus order, whose normalized text contains the
    /// normalized query or is contained by it.
    ///
    /// Very short queries can hit unrelated verses through containment;
    /// `exact_min_query_chars` sets a floor below which this tier is skipped.
    pub fn find_exact<'a>(&self, query: &str, index: &'a CorpusIndex) -> Option<&'a VerseRecord> {
        let query = normalize(query);
        if query.is_empty() || query.chars().count() < self.exact_min_query_chars {
            return None;
        }

        index.iter().find(|verse| {
            let text = verse.normalized_text();
            !text.is_empty() && (text.contains(&query) || query.contains(text))
        })
    }

    /// Up to `limit` verses ranked by how many distinct query terms they contain.
    pub fn find_candidates<'a>(
        &self,
        query: &str,
        index: &'a CorpusIndex,
        limit: usize,
    ) -> Vec<MatchCandidate<'a>> {
        let query = normalize(query);
        let terms = discriminative_terms(&query, self.min_token_chars);
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<MatchCandidate<'a>> = index
            .iter()
            .filter_map(|verse| {
                let score = overlap_score(&terms, verse.normalized_text());
                (score > 0).then(|| Scored::new(verse, score))
            })
            .collect();

        sort_by_score_desc(&mut candidates);
        candidates.truncate(limit);
        candidates
    }
}
