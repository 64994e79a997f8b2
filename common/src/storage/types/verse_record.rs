use serde::Serialize;

use crate::utils::normalize::normalize;

/// One canonical verse of the reference corpus.
///
/// Fields are read-only outside the crate; the loader may still extend the
/// text while it accumulates continuation lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseRecord {
    reference: String,
    text: String,
    #[serde(skip)]
    normalized_text: String,
}

impl VerseRecord {
    pub fn new(reference: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            reference: reference.into(),
            normalized_text: normalize(&text),
            text,
        }
    }

    /// Builds the `"Book Chapter:Verse"` reference form.
    pub fn format_reference(book: &str, chapter: u32, verse: u32) -> String {
        format!("{book} {chapter}:{verse}")
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    pub(crate) fn append_continuation(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(line);
        self.normalized_text = normalize(&self.text);
    }
}
