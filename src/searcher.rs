use crate::{Matches, Record, evaluate, evaluate_with};
use search_cancel::CancellationToken;
use std::time::Instant;
use tracing::{debug, info};
use track_syntax::{Token, tokenize_query};

/// Fields a bare keyword is looked up in.
pub const DEFAULT_KEYWORD_FIELDS: [&str; 4] = ["artist", "albumartist", "album", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub keyword_fields: Vec<String>,
    /// Keep at most this many results, in key order.
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            keyword_fields: DEFAULT_KEYWORD_FIELDS.map(str::to_string).to_vec(),
            limit: None,
        }
    }
}

impl SearchOptions {
    pub fn with_keyword_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keyword_fields = fields
            .into_iter()
            .map(|field| field.into().to_lowercase())
            .collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One-shot search with the default options.
///
/// ```
/// use std::collections::BTreeMap;
/// use tracksearch::{Track, search};
///
/// let corpus = BTreeMap::from([
///     (1, Track::new().with_tag("album", "Chimera").with_tag("rating", 4)),
///     (2, Track::new().with_tag("album", "Karma").with_tag("rating", 2)),
/// ]);
/// let matches = search("rating > 3", &corpus);
/// assert_eq!(matches.keys().copied().collect::<Vec<_>>(), [&1]);
/// ```
pub fn search<'c, K, R, C>(query: &str, corpus: C) -> Matches<'c, K, R>
where
    C: IntoIterator<Item = (&'c K, &'c R)>,
    K: Ord + 'c,
    R: Record + 'c,
{
    evaluate(&tokenize_query(query), corpus)
}

/// Keeps a parsed query around so it can be re-run as the corpus changes.
#[derive(Debug, Clone, Default)]
pub struct TrackSearcher {
    options: SearchOptions,
    query: String,
    tokens: Vec<Token>,
}

impl TrackSearcher {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            query: String::new(),
            tokens: Vec::new(),
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn set_query(&mut self, query: &str) {
        self.tokens = tokenize_query(query);
        self.query = query.to_string();
        debug!("Query {query:?} parsed into {:?}", self.tokens);
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn search<'c, K, R, C>(&mut self, query: &str, corpus: C) -> Matches<'c, K, R>
    where
        C: IntoIterator<Item = (&'c K, &'c R)>,
        K: Ord + 'c,
        R: Record + 'c,
    {
        self.set_query(query);
        self.get_results(corpus)
    }

    pub fn get_results<'c, K, R, C>(&self, corpus: C) -> Matches<'c, K, R>
    where
        C: IntoIterator<Item = (&'c K, &'c R)>,
        K: Ord + 'c,
        R: Record + 'c,
    {
        self.get_results_with_token(corpus, CancellationToken::noop())
            .unwrap_or_default()
    }

    /// `None` when `token` got cancelled mid search.
    pub fn get_results_with_token<'c, K, R, C>(
        &self,
        corpus: C,
        token: CancellationToken,
    ) -> Option<Matches<'c, K, R>>
    where
        C: IntoIterator<Item = (&'c K, &'c R)>,
        K: Ord + 'c,
        R: Record + 'c,
    {
        let search_time = Instant::now();
        let candidates = corpus.into_iter().collect();
        let mut matches = evaluate_with(&self.tokens, candidates, &self.options, token)?;
        if let Some(limit) = self.options.limit {
            while matches.len() > limit {
                matches.pop_last();
            }
        }
        info!("Search time: {:?}", search_time.elapsed());
        Some(matches)
    }
}
