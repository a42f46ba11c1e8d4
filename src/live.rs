use crate::{Matches, Record, SearchOptions, TrackSearcher};
use parking_lot::RwLock;
use search_cancel::CancellationToken;
use std::{collections::BTreeMap, sync::Arc};

/// Shared, mutable key to record map.
pub type SharedCorpus<K, R> = Arc<RwLock<BTreeMap<K, R>>>;

/// A [`TrackSearcher`] bound to a corpus that other threads keep mutating,
/// e.g. a library scanner adding tracks while the user types.
///
/// Each evaluation holds the read lock for its whole duration, so writers
/// wait and never mutate the corpus mid search.
pub struct LiveSearch<K, R> {
    corpus: SharedCorpus<K, R>,
    searcher: TrackSearcher,
}

impl<K: Ord, R: Record> LiveSearch<K, R> {
    pub fn new(corpus: SharedCorpus<K, R>, options: SearchOptions) -> Self {
        Self {
            corpus,
            searcher: TrackSearcher::new(options),
        }
    }

    /// Handle for writers.
    pub fn corpus(&self) -> SharedCorpus<K, R> {
        Arc::clone(&self.corpus)
    }

    pub fn searcher(&self) -> &TrackSearcher {
        &self.searcher
    }

    pub fn set_query(&mut self, query: &str) {
        self.searcher.set_query(query);
    }

    /// Runs the current query and hands the borrowed matches to `f` while
    /// the read lock is held.
    pub fn with_results<T>(&self, f: impl FnOnce(Matches<'_, K, R>) -> T) -> T {
        let corpus = self.corpus.read();
        f(self.searcher.get_results(&*corpus))
    }

    /// Like [`LiveSearch::with_results`], `None` when `token` got cancelled.
    pub fn with_results_cancellable<T>(
        &self,
        token: CancellationToken,
        f: impl FnOnce(Matches<'_, K, R>) -> T,
    ) -> Option<T> {
        let corpus = self.corpus.read();
        self.searcher.get_results_with_token(&*corpus, token).map(f)
    }
}

impl<K: Ord + Clone, R: Record + Clone> LiveSearch<K, R> {
    /// Owned copy of the matches.
    pub fn get_results(&self) -> BTreeMap<K, R> {
        self.with_results(|matches| {
            matches
                .into_iter()
                .map(|(key, record)| (key.clone(), record.clone()))
                .collect()
        })
    }
}
