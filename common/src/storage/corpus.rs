use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use tracing::{debug, warn};

use crate::{
    error::AppError,
    storage::types::verse_record::VerseRecord,
    utils::{config::AppConfig, normalize::normalize},
};

/// Layout rules for the flat reference text.
#[derive(Debug, Clone, Default)]
pub struct CorpusFormat {
    boilerplate: Vec<String>,
    /// Normalized book names. Empty means "any non-numeric name".
    books: HashSet<String>,
}

impl CorpusFormat {
    pub fn new<B, K>(boilerplate: B, books: K) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        Self {
            boilerplate: boilerplate
                .into_iter()
                .map(Into::<String>::into)
                .filter(|marker| !marker.is_empty())
                .collect(),
            books: books
                .into_iter()
                .map(|book| normalize(book.as_ref()))
                .filter(|book| !book.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.boilerplate.clone(), &config.canonical_books)
    }

    fn is_boilerplate(&self, line: &str) -> bool {
        self.boilerplate.iter().any(|marker| line.contains(marker))
    }

    fn accepts_book(&self, name: &str) -> bool {
        if self.books.is_empty() {
            leading_number(name).is_none()
        } else {
            self.books.contains(&normalize(name))
        }
    }

    fn classify<'a>(&self, raw: &'a str) -> Line<'a> {
        let line = raw.trim();
        if line.is_empty() || self.is_boilerplate(line) {
            return Line::Skip;
        }

        if let Some((book, chapter)) = split_heading(line) {
            if self.accepts_book(book) {
                return Line::Heading { book, chapter };
            }
        }

        if let Some((number, rest)) = leading_number(line) {
            if rest.is_empty() {
                // Bare page/line numbers carry no text.
                return Line::Skip;
            }
            return Line::VerseStart {
                number,
                text: rest,
            };
        }

        Line::Continuation(line)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Skip,
    Heading { book: &'a str, chapter: u32 },
    VerseStart { number: u32, text: &'a str },
    Continuation(&'a str),
}

fn parse_number(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// `"12 rest of line"` -> `(12, "rest of line")`; a lone `"12"` -> `(12, "")`.
fn leading_number(line: &str) -> Option<(u32, &str)> {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => parse_number(head).map(|n| (n, rest.trim())),
        None => parse_number(line).map(|n| (n, "")),
    }
}

/// `"<name> <number>"` at end of line.
fn split_heading(line: &str) -> Option<(&str, u32)> {
    let (name, number) = line.rsplit_once(char::is_whitespace)?;
    let chapter = parse_number(number)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, chapter))
}

/// Ordered, duplicate-free collection of verses. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    verses: Vec<VerseRecord>,
    positions: HashMap<String, usize>,
}

impl CorpusIndex {
    /// Builds an index from already-structured verses, dropping repeated references.
    pub fn from_verses(verses: impl IntoIterator<Item = VerseRecord>) -> Self {
        let mut index = Self::default();
        for verse in verses {
            index.push(verse);
        }
        index
    }

    pub fn parse(source: &str, format: &CorpusFormat) -> Self {
        let mut parser = CorpusParser::default();
        for line in source.lines() {
            parser.feed(format.classify(line));
        }
        parser.finish()
    }

    pub async fn load(path: &Path, format: &CorpusFormat) -> Result<Self, AppError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::CorpusUnavailable(path.display().to_string()));
            }
            Err(err) => return Err(AppError::Io(err)),
        };

        let source = String::from_utf8_lossy(&bytes);
        Ok(Self::parse(&source, format))
    }

    pub fn verses(&self) -> &[VerseRecord] {
        &self.verses
    }

    pub fn iter(&self) -> impl Iterator<Item = &VerseRecord> {
        self.verses.iter()
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn get(&self, reference: &str) -> Option<&VerseRecord> {
        self.positions
            .get(reference)
            .and_then(|position| self.verses.get(*position))
    }

    fn push(&mut self, verse: VerseRecord) {
        if self.positions.contains_key(verse.reference()) {
            warn!(
                reference = %verse.reference(),
                "Duplicate verse reference in corpus; keeping the first occurrence"
            );
            return;
        }
        self.positions
            .insert(verse.reference().to_owned(), self.verses.len());
        self.verses.push(verse);
    }
}

#[derive(Default)]
struct CorpusParser {
    book: Option<String>,
    chapter: u32,
    pending: Option<VerseRecord>,
    index: CorpusIndex,
}

impl CorpusParser {
    fn feed(&mut self, line: Line<'_>) {
        match line {
            Line::Skip => {}
            Line::Heading { book, chapter } => {
                self.book = Some(book.to_owned());
                self.chapter = chapter;
            }
            Line::VerseStart { number, text } => {
                self.flush();
                match &self.book {
                    Some(book) => {
                        let reference = VerseRecord::format_reference(book, self.chapter, number);
                        self.pending = Some(VerseRecord::new(reference, text));
                    }
                    None => debug!(number, "Dropping verse line found before any heading"),
                }
            }
            Line::Continuation(text) => match self.pending.as_mut() {
                Some(verse) => verse.append_continuation(text),
                None => debug!("Dropping stray line outside of any verse"),
            },
        }
    }

    fn flush(&mut self) {
        if let Some(verse) = self.pending.take() {
            self.index.push(verse);
        }
    }

    fn finish(mut self) -> CorpusIndex {
        self.flush();
        self.index
    }
}
