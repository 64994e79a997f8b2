use std::cmp::Reverse;

/// Generic wrapper combining an item with its lexical-overlap score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scored<T> {
    pub item: T,
    pub score: usize,
}

impl<T> Scored<T> {
    pub const fn new(item: T, score: usize) -> Self {
        Self { item, score }
    }
}

/// Distinct whitespace tokens of a normalized query with at least
/// `min_chars` characters, in first-seen order.
pub fn discriminative_terms(normalized_query: &str, min_chars: usize) -> Vec<&str> {
    let mut terms: Vec<&str> = Vec::new();
    for token in normalized_query.split_whitespace() {
        if token.chars().count() >= min_chars && !terms.contains(&token) {
            terms.push(token);
        }
    }
    terms
}

/// Number of terms occurring as substrings of `normalized_text`.
pub fn overlap_score(terms: &[&str], normalized_text: &str) -> usize {
    terms
        .iter()
        .filter(|term| normalized_text.contains(**term))
        .count()
}

/// Highest score first. Stable, so equal scores keep their incoming order.
pub fn sort_by_score_desc<T>(items: &mut [Scored<T>]) {
    items.sort_by_key(|scored| Reverse(scored.score));
}
