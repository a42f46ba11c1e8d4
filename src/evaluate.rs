use crate::{FieldValue, Record, SearchOptions, record::parse_number};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use search_cancel::{CANCEL_CHECK_INTERVAL, CancellationToken};
use std::collections::BTreeMap;
use tracing::warn;
use track_syntax::{Comparison, NULL_VALUE, Predicate, Token, fold_diacritics};

/// Borrowed subset of a corpus, ordered by key.
pub type Matches<'c, K, R> = BTreeMap<&'c K, &'c R>;

static DEFAULT_OPTIONS: Lazy<SearchOptions> = Lazy::new(SearchOptions::default);

/// Two numbers closer than this compare equal in an exact match against a
/// numeric tag.
const NUMERIC_EPSILON: f64 = 1e-4;

/// Returns the records of `corpus` matching every token of `tokens`, using
/// the default keyword fields.
///
/// ```
/// use std::collections::BTreeMap;
/// use tracksearch::{Track, evaluate, tokenize_query};
///
/// let corpus = BTreeMap::from([
///     ("k1", Track::new().with_tag("artist", "Delerium")),
///     ("k2", Track::new().with_tag("artist", "Boards of Canada")),
/// ]);
/// let matches = evaluate(&tokenize_query("! artist==delerium"), &corpus);
/// assert_eq!(matches.keys().copied().collect::<Vec<_>>(), [&"k2"]);
/// ```
pub fn evaluate<'c, K, R, C>(tokens: &[Token], corpus: C) -> Matches<'c, K, R>
where
    C: IntoIterator<Item = (&'c K, &'c R)>,
    K: Ord + 'c,
    R: Record + 'c,
{
    let candidates = corpus.into_iter().collect();
    // a noop token is never cancelled
    evaluate_with(tokens, candidates, &DEFAULT_OPTIONS, CancellationToken::noop())
        .unwrap_or_default()
}

/// Narrows `candidates` through `tokens` head to tail, an implicit AND.
///
/// Returns `None` as soon as `cancel` reports a newer search.
pub fn evaluate_with<'c, K: Ord, R: Record>(
    tokens: &[Token],
    candidates: Matches<'c, K, R>,
    options: &SearchOptions,
    cancel: CancellationToken,
) -> Option<Matches<'c, K, R>> {
    let mut current = candidates;
    for token in tokens {
        if cancel.is_cancelled() {
            return None;
        }
        if current.is_empty() {
            break;
        }
        current = evaluate_token(token, current, options, cancel)?;
    }
    Some(current)
}

fn evaluate_token<'c, K: Ord, R: Record>(
    token: &Token,
    current: Matches<'c, K, R>,
    options: &SearchOptions,
    cancel: CancellationToken,
) -> Option<Matches<'c, K, R>> {
    match token {
        Token::Leaf(leaf) => filter_leaf(leaf, current, options, cancel),
        Token::Group(inner) => evaluate_with(inner, current, options, cancel),
        Token::Not(inner) => {
            let excluded = evaluate_token(inner, current.clone(), options, cancel)?;
            if excluded.is_empty() {
                return Some(current);
            }
            retain_records(current, cancel, |key, _| !excluded.contains_key(key))
        }
        Token::Or(left, right) => {
            let mut matched = evaluate_token(left, current.clone(), options, cancel)?;
            // records the left side already took skip the right side
            let rest = retain_records(current, cancel, |key, _| !matched.contains_key(key))?;
            matched.extend(evaluate_token(right, rest, options, cancel)?);
            Some(matched)
        }
    }
}

fn filter_leaf<'c, K: Ord, R: Record>(
    leaf: &str,
    current: Matches<'c, K, R>,
    options: &SearchOptions,
    cancel: CancellationToken,
) -> Option<Matches<'c, K, R>> {
    if matches!(leaf, "(" | ")" | "!" | "|") {
        warn!("Unexpected structural leaf {leaf:?}, skipping");
        return Some(current);
    }
    let matcher = match LeafMatcher::new(leaf, options) {
        Ok(matcher) => matcher,
        Err(err) => {
            warn!("Invalid leaf {leaf:?}, skipping: {err}");
            return Some(current);
        }
    };
    retain_records(current, cancel, |_, record| matcher.matches(record))
}

fn retain_records<'c, K: Ord, R>(
    current: Matches<'c, K, R>,
    cancel: CancellationToken,
    mut predicate: impl FnMut(&'c K, &'c R) -> bool,
) -> Option<Matches<'c, K, R>> {
    let mut kept = BTreeMap::new();
    for (i, (key, record)) in current.into_iter().enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return None;
        }
        if predicate(key, record) {
            kept.insert(key, record);
        }
    }
    Some(kept)
}

/// A leaf compiled once per evaluation. Textual values are folded and
/// lowercased the same way record texts are.
enum LeafMatcher<'q> {
    Exact {
        field: &'q str,
        value: String,
        number: Option<f64>,
    },
    Unset {
        field: &'q str,
    },
    Contains {
        field: &'q str,
        value: String,
    },
    Greater {
        field: &'q str,
        bound: f64,
    },
    Less {
        field: &'q str,
        bound: f64,
    },
    Regex {
        field: &'q str,
        regex: Regex,
    },
    Keyword {
        fields: &'q [String],
        value: String,
    },
    /// Numeric comparison against a value that is not a number.
    Never,
}

impl<'q> LeafMatcher<'q> {
    fn new(leaf: &'q str, options: &'q SearchOptions) -> Result<Self, regex::Error> {
        let (field, comparison, value) = match Predicate::parse(leaf) {
            Predicate::Keyword(value) => {
                return Ok(LeafMatcher::Keyword {
                    fields: &options.keyword_fields,
                    value: normalize(value),
                });
            }
            Predicate::Field {
                field,
                comparison,
                value,
            } => (field, comparison, value),
        };
        let matcher = match comparison {
            Comparison::Exact if value == NULL_VALUE => LeafMatcher::Unset { field },
            Comparison::Exact => LeafMatcher::Exact {
                field,
                value: normalize(value),
                number: parse_number(value),
            },
            Comparison::Contains => LeafMatcher::Contains {
                field,
                value: normalize(value),
            },
            Comparison::Greater => match parse_number(value) {
                Some(bound) => LeafMatcher::Greater { field, bound },
                None => LeafMatcher::Never,
            },
            Comparison::Less => match parse_number(value) {
                Some(bound) => LeafMatcher::Less { field, bound },
                None => LeafMatcher::Never,
            },
            Comparison::Regex => LeafMatcher::Regex {
                field,
                regex: RegexBuilder::new(&fold_diacritics(value))
                    .case_insensitive(true)
                    .build()?,
            },
        };
        Ok(matcher)
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            LeafMatcher::Exact {
                field,
                value,
                number,
            } => {
                let field = record.field(field);
                if let (FieldValue::Number(actual), Some(expected)) = (&field, number) {
                    return (actual - expected).abs() < NUMERIC_EPSILON;
                }
                field.texts().iter().any(|text| normalize(text) == *value)
            }
            LeafMatcher::Unset { field } => record.field(field).is_empty(),
            LeafMatcher::Contains { field, value } => contains(&record.field(field), value),
            LeafMatcher::Greater { field, bound } => record
                .field(field)
                .as_number()
                .is_some_and(|number| number > *bound),
            LeafMatcher::Less { field, bound } => record
                .field(field)
                .as_number()
                .is_some_and(|number| number < *bound),
            LeafMatcher::Regex { field, regex } => record
                .field(field)
                .texts()
                .iter()
                .any(|text| regex.is_match(&fold_diacritics(text))),
            LeafMatcher::Keyword { fields, value } => fields
                .iter()
                .any(|field| contains(&record.field(field), value)),
            LeafMatcher::Never => false,
        }
    }
}

fn contains(field: &FieldValue<'_>, needle: &str) -> bool {
    field.texts().iter().any(|text| normalize(text).contains(needle))
}

/// Latin accents folded, then lowercased.
fn normalize(text: &str) -> String {
    fold_diacritics(text).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Track;
    use track_syntax::tokenize_query;

    fn corpus() -> BTreeMap<u32, Track> {
        BTreeMap::from([
            (
                1,
                Track::new()
                    .with_tag("artist", vec!["Delerium", "Sarah McLachlan"])
                    .with_tag("title", "Silence")
                    .with_tag("bpm", "128.00")
                    .with_tag("genre", ""),
            ),
            (
                2,
                Track::new()
                    .with_tag("artist", "Boards of Canada")
                    .with_tag("title", "Olson")
                    .with_tag("bpm", 90),
            ),
            (3, Track::new().with_tag("title", "Untitled")),
        ])
    }

    fn keys(query: &str) -> Vec<u32> {
        let corpus = corpus();
        evaluate(&tokenize_query(query), &corpus)
            .into_keys()
            .copied()
            .collect()
    }

    #[test]
    fn list_fields_match_items_and_joined_form() {
        assert_eq!(keys("artist==delerium"), [1]);
        assert_eq!(keys("artist==\"sarah mclachlan\""), [1]);
        assert_eq!(keys("artist==\"Delerium / Sarah McLachlan\""), [1]);
        assert_eq!(keys("artist=\"m / s\""), [1]);
    }

    #[test]
    fn numeric_equality_only_for_number_tags() {
        assert_eq!(keys("bpm==90.00001"), [2]);
        assert_eq!(keys("bpm==90"), [2]);
        assert!(keys("bpm==90.1").is_empty());
        // text tags compare as text
        assert!(keys("bpm==128").is_empty());
        assert_eq!(keys("bpm==\"128.00\""), [1]);

        let corpus = BTreeMap::from([
            ("a", Track::new().with_tag("title", "1")),
            ("b", Track::new().with_tag("title", "01")),
        ]);
        let matches = evaluate(&tokenize_query("title==1"), &corpus);
        assert_eq!(matches.into_keys().copied().collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn numeric_comparisons_skip_non_numbers() {
        assert_eq!(keys("bpm>100"), [1]);
        assert_eq!(keys("bpm<100"), [2]);
        assert!(keys("title>1").is_empty());
        assert!(keys("bpm>fast").is_empty());
    }

    #[test]
    fn null_value_matches_missing_and_empty() {
        assert_eq!(keys("genre==__null__"), [1, 2, 3]);
        assert_eq!(keys("artist==__null__"), [3]);
        assert_eq!(keys("! artist==__null__"), [1, 2]);
    }

    #[test]
    fn regex_leaves() {
        assert_eq!(keys("title~^s"), [1]);
        assert_eq!(keys("title~\"n$\""), [2]);
        assert_eq!(keys("artist~\"canada|mclachlan\""), [1, 2]);
    }

    #[test]
    fn regex_escapes_keep_their_case() {
        let corpus = BTreeMap::from([
            ("a", Track::new().with_tag("title", "abc")),
            ("b", Track::new().with_tag("title", "123")),
        ]);
        let run = |query: &str| {
            evaluate(&tokenize_query(query), &corpus)
                .into_keys()
                .copied()
                .collect::<Vec<_>>()
        };
        assert_eq!(run("title~\"^\\D+$\""), ["a"]);
        assert_eq!(run("title~\"^\\d+$\""), ["b"]);
        assert_eq!(run("title!~\"\\D\""), ["b"]);
    }

    #[test]
    fn invalid_regex_leaves_candidates_unfiltered() {
        assert_eq!(keys("title~\"(\""), [1, 2, 3]);
        assert_eq!(keys("title~\"(\" bpm>100"), [1]);
    }

    #[test]
    fn keywords_scan_keyword_fields() {
        assert_eq!(keys("olson"), [2]);
        assert_eq!(keys("SARAH"), [1]);
        // bpm is not a keyword field
        assert!(keys("128").is_empty());

        let corpus = corpus();
        let options = SearchOptions::default().with_keyword_fields(["bpm"]);
        let matches = evaluate_with(
            &tokenize_query("128"),
            corpus.iter().collect(),
            &options,
            CancellationToken::noop(),
        )
        .unwrap();
        assert_eq!(matches.into_keys().copied().collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn structural_leaf_is_skipped() {
        let corpus = corpus();
        let tokens = [Token::leaf("|"), Token::leaf("title=o")];
        assert_eq!(
            evaluate(&tokens, &corpus).into_keys().copied().collect::<Vec<_>>(),
            [2]
        );
    }

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(keys(""), [1, 2, 3]);
    }

    #[test]
    fn cancelled_token_stops_evaluation() {
        let corpus = corpus();
        let stale = CancellationToken::new(1);
        let _newer = CancellationToken::new(2);
        assert!(
            evaluate_with(
                &tokenize_query("title=o"),
                corpus.iter().collect(),
                &SearchOptions::default(),
                stale,
            )
            .is_none()
        );
        // nothing to do, nothing to poll
        assert!(
            evaluate_with(&[], corpus.iter().collect(), &SearchOptions::default(), stale)
                .is_some()
        );
    }
}
