use common::storage::types::verse_record::VerseRecord;

use crate::{disambiguation::Decision, matching::MatchCandidate, RetrievalResult};

/// Merge matcher and disambiguator outcomes. The first applicable rule wins:
/// exact match, no candidates, backend decision, then the top candidate.
pub fn assemble(
    exact: Option<&VerseRecord>,
    candidates: &[MatchCandidate<'_>],
    decision: Option<Decision<'_>>,
) -> RetrievalResult {
    if let Some(verse) = exact {
        return RetrievalResult::found(verse, String::new());
    }

    let Some(top) = candidates.first() else {
        return RetrievalResult::NotFound;
    };

    match decision {
        Some(decision) => RetrievalResult::found(decision.verse, decision.context),
        None => RetrievalResult::found(top.item, String::new()),
    }
}
