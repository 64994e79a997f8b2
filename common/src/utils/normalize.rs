use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical comparison form shared by the corpus and incoming queries.
///
/// Lowercases, decomposes (NFD), strips combining marks, keeps only
/// letters, digits and whitespace, and collapses whitespace runs into a
/// single space. Total and idempotent.
pub fn normalize(text: &str) -> String {
    // Lowercasing first: some lowercase mappings emit combining marks
    // (e.g. 'İ'), and those must be stripped in the same pass.
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
