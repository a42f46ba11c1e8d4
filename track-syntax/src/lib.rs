//! # Track search syntax
//!
//! `track-syntax` turns the collection search box language into a reduced
//! token tree so the search engine can walk it without caring about quoting,
//! keyword spelling or operator spacing. The pipeline is three pure steps:
//!
//! 1. [`lex_query`] normalizes the raw string into [`Lexeme`]s,
//! 2. [`reduce_tokens`] folds parentheses, `!` and `|` into structural
//!    [`Token`]s,
//! 3. [`optimize_tokens`] reorders the top level so the most selective
//!    filters run first.
//!
//! [`tokenize_query`] runs all three.
//!
//! ## Example
//! ```
//! use track_syntax::{tokenize_query, Token};
//!
//! let tokens = tokenize_query("rating>3 (album=karma | album=chimera) Artist==Delerium");
//! // exact/contains filters first, then other leaves, then structural nodes
//! assert_eq!(tokens[0], Token::Leaf("artist==delerium".into()));
//! assert_eq!(tokens[1], Token::Leaf("rating>3".into()));
//! assert!(matches!(&tokens[2], Token::Group(inner) if matches!(inner[0], Token::Or(..))));
//! ```

mod criteria;
mod fold;
mod lex;
mod predicate;
mod reduce;

pub use criteria::*;
pub use fold::fold_diacritics;
pub use lex::{Lexeme, lex_query};
pub use predicate::*;
pub use reduce::reduce_tokens;

use std::fmt;

/// Parses a query string into an optimized token tree.
///
/// Never fails: malformed input (unbalanced quotes or parentheses, dangling
/// operators) degrades into the closest tree that can be built.
pub fn tokenize_query(input: &str) -> Vec<Token> {
    optimize_tokens(reduce_tokens(lex_query(input)))
}

/// A node of the reduced query tree. A `Vec<Token>` is an implicit AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Field comparison (`artist==delerium`, `rating>3`) or bare keyword.
    ///
    /// ```
    /// use track_syntax::{tokenize_query, Token};
    /// assert_eq!(tokenize_query("Chimera"), [Token::Leaf("chimera".into())]);
    /// ```
    Leaf(String),
    /// Parenthesized sub query.
    ///
    /// ```
    /// use track_syntax::{tokenize_query, Token};
    /// let tokens = tokenize_query("(a b)");
    /// assert!(matches!(&tokens[0], Token::Group(inner) if inner.len() == 2));
    /// ```
    Group(Vec<Token>),
    /// Negation of exactly the token following `!`/`NOT`.
    ///
    /// ```
    /// use track_syntax::{tokenize_query, Token};
    /// let tokens = tokenize_query("NOT live");
    /// assert_eq!(tokens, [Token::Not(Box::new(Token::Leaf("live".into())))]);
    /// ```
    Not(Box<Token>),
    /// Disjunction of the tokens on both sides of `|`/`OR`.
    ///
    /// ```
    /// use track_syntax::{tokenize_query, Token};
    /// let tokens = tokenize_query("a OR b");
    /// assert!(matches!(&tokens[0], Token::Or(..)));
    /// ```
    Or(Box<Token>, Box<Token>),
}

impl Token {
    pub fn leaf(text: impl Into<String>) -> Self {
        Token::Leaf(text.into())
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Token::Leaf(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, Token::Leaf(_))
    }
}

/// Renders the token back into query syntax that lexes to the same tree.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Leaf(text) if needs_quoting(text) => write!(f, "\"{text}\""),
            Token::Leaf(text) => f.write_str(text),
            Token::Group(inner) => {
                f.write_str("(")?;
                for token in inner {
                    write!(f, " {token}")?;
                }
                f.write_str(" )")
            }
            Token::Not(inner) => write!(f, "! {inner}"),
            Token::Or(left, right) => write!(f, "{left} | {right}"),
        }
    }
}

fn needs_quoting(text: &str) -> bool {
    text.is_empty()
        || matches!(text, "(" | ")" | "!" | "|")
        || text
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, '(' | ')' | '|' | '&'))
}

/// Moves the most selective leaves to the front of the top level.
///
/// Leaves containing `=` (exact and contains comparisons) come first, then
/// the remaining leaves (keywords and numeric comparisons), then structural
/// nodes. Relative order inside each bucket is kept and nested levels are
/// left untouched: every filter is an idempotent predicate, so the order only
/// changes how fast the candidate set shrinks, never the result.
pub fn optimize_tokens(mut tokens: Vec<Token>) -> Vec<Token> {
    tokens.sort_by_key(selectivity_rank);
    tokens
}

fn selectivity_rank(token: &Token) -> u8 {
    match token {
        Token::Leaf(text) if text.contains('=') => 0,
        Token::Leaf(_) => 1,
        Token::Group(_) | Token::Not(_) | Token::Or(..) => 2,
    }
}
