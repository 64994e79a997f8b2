use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::storage::corpus::{CorpusFormat, CorpusIndex};
use crate::utils::config::AppConfig;

/// Lazily-built, process-lifetime owner of the corpus index.
///
/// The first caller of [`CorpusStore::index`] parses the file; concurrent
/// callers wait on the same initialization and every caller afterwards gets
/// the same shared index. A missing corpus is remembered as unavailable and is
/// not retried.
pub struct CorpusStore {
    path: PathBuf,
    format: CorpusFormat,
    index: OnceCell<Option<Arc<CorpusIndex>>>,
}

impl CorpusStore {
    /// Create a store that will read `path` on first use.
    pub fn new(path: impl Into<PathBuf>, format: CorpusFormat) -> Self {
        Self {
            path: path.into(),
            format,
            index: OnceCell::new(),
        }
    }

    /// Create a store from application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.corpus_path, CorpusFormat::from_config(config))
    }

    /// Create a store around an index that is already built.
    ///
    /// Useful for tests and for embedding the engine with an in-memory corpus.
    pub fn preloaded(index: CorpusIndex) -> Self {
        Self {
            path: PathBuf::new(),
            format: CorpusFormat::default(),
            index: OnceCell::new_with(Some(Some(Arc::new(index)))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared index, or `None` when the corpus could not be loaded.
    pub async fn index(&self) -> Option<Arc<CorpusIndex>> {
        self.index
            .get_or_init(|| async {
                match CorpusIndex::load(&self.path, &self.format).await {
                    Ok(index) => {
                        info!(
                            path = %self.path.display(),
                            verses = index.len(),
                            "Corpus index loaded"
                        );
                        Some(Arc::new(index))
                    }
                    Err(err) => {
                        error!(
                            path = %self.path.display(),
                            error = %err,
                            "Corpus could not be loaded; every query will report not found"
                        );
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Whether initialization has already run (successfully or not).
    pub fn is_initialized(&self) -> bool {
        self.index.initialized()
    }
}
