#![allow(dead_code)]
//! Shared helpers for `track-syntax` integration tests.

use track_syntax::*;

pub fn leaf(text: &str) -> Token {
    Token::leaf(text)
}

pub fn not(token: Token) -> Token {
    Token::Not(Box::new(token))
}

pub fn or(left: Token, right: Token) -> Token {
    Token::Or(Box::new(left), Box::new(right))
}

pub fn group(tokens: Vec<Token>) -> Token {
    Token::Group(tokens)
}

/// Reduced but not optimized.
pub fn parse_raw(input: &str) -> Vec<Token> {
    reduce_tokens(lex_query(input))
}

pub fn parse_ok(input: &str) -> Vec<Token> {
    tokenize_query(input)
}

/// Panics when a structural symbol survived reduction as a leaf.
pub fn assert_fully_reduced(tokens: &[Token]) {
    for token in tokens {
        match token {
            Token::Leaf(text) => assert!(
                !matches!(text.as_str(), "(" | ")" | "!" | "|"),
                "operator left as leaf: {text:?}"
            ),
            Token::Group(inner) => assert_fully_reduced(inner),
            Token::Not(inner) => assert_fully_reduced(std::slice::from_ref(inner.as_ref())),
            Token::Or(left, right) => {
                assert_fully_reduced(std::slice::from_ref(left.as_ref()));
                assert_fully_reduced(std::slice::from_ref(right.as_ref()));
            }
        }
    }
}
