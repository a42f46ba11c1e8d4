use crate::{
    fold_diacritics,
    predicate::{CompoundOp, find_compound_op, lowercase_outside_regex},
};

/// Flat output of [`lex_query`]; the input of [`crate::reduce_tokens`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    /// `(`
    Open,
    /// `)`
    Close,
    /// `!` or `NOT`
    Not,
    /// `|` or `OR`
    Or,
    /// Anything else. Quoted text always lands here, even `"("`.
    Text(String),
}

/// Normalizes a raw query into a flat lexeme list.
///
/// Outside double quotes `|`, `!` and parentheses become standalone tokens,
/// `&`/`AND` become plain whitespace (AND is implicit), `OR`/`NOT` become
/// `|`/`!`, and whitespace around comparison operators is removed so
/// `rating > 3` and `rating>3` read the same. Quoted runs are glued back into
/// single tokens with the quotes removed. Accents on Latin letters are folded
/// and every token is lowercased, except the pattern after a `~`, whose
/// escapes (`\D`, `\p{Lu}`) depend on case.
///
/// Compound comparisons are rewritten into the native operators:
/// `f!=v` → `! f=v`, `f!==v` → `! f==v`, `f!~v` → `! f~v`,
/// `f>=v` → `( f>v | f==v )` and `f<=v` → `( f<v | f==v )`.
///
/// ```
/// use track_syntax::{lex_query, Lexeme};
///
/// assert_eq!(
///     lex_query("NOT(artist = \"Boards of Canada\")"),
///     [
///         Lexeme::Not,
///         Lexeme::Open,
///         Lexeme::Text("artist=boards of canada".into()),
///         Lexeme::Close,
///     ]
/// );
/// ```
pub fn lex_query(input: &str) -> Vec<Lexeme> {
    let padded = format!(" {} ", fold_diacritics(input));
    let normalized = map_unquoted(&padded, normalize_segment);
    let raw: Vec<&str> = normalized.split_whitespace().collect();

    let mut lexemes = Vec::with_capacity(raw.len());
    let mut index = 0;
    while index < raw.len() {
        let token = raw[index];
        index += 1;

        if token.contains('"') {
            let mut merged = token.to_string();
            // an unterminated quote swallows the rest of the query
            while merged.matches('"').count() < 2 && index < raw.len() {
                merged.push(' ');
                merged.push_str(raw[index]);
                index += 1;
            }
            let text = strip_outer_quotes(&merged);
            if !text.is_empty() {
                push_text(&mut lexemes, &text);
            }
            continue;
        }

        match token {
            "(" => lexemes.push(Lexeme::Open),
            ")" => lexemes.push(Lexeme::Close),
            "!" => lexemes.push(Lexeme::Not),
            "|" => lexemes.push(Lexeme::Or),
            _ => push_text(&mut lexemes, token),
        }
    }
    lexemes
}

fn push_text(lexemes: &mut Vec<Lexeme>, text: &str) {
    let text = lowercase_outside_regex(text);
    let Some((at, op)) = find_compound_op(&text) else {
        lexemes.push(Lexeme::Text(text));
        return;
    };
    let field = &text[..at];
    let value = &text[at + op.symbol().len()..];
    if field.trim().is_empty() {
        lexemes.push(Lexeme::Text(text));
        return;
    }

    match op {
        CompoundOp::NotExact => {
            lexemes.push(Lexeme::Not);
            lexemes.push(Lexeme::Text(format!("{field}=={value}")));
        }
        CompoundOp::NotContains => {
            lexemes.push(Lexeme::Not);
            lexemes.push(Lexeme::Text(format!("{field}={value}")));
        }
        CompoundOp::NotRegex => {
            lexemes.push(Lexeme::Not);
            lexemes.push(Lexeme::Text(format!("{field}~{value}")));
        }
        CompoundOp::AtLeast | CompoundOp::AtMost => {
            let strict = if op == CompoundOp::AtLeast { '>' } else { '<' };
            lexemes.extend([
                Lexeme::Open,
                Lexeme::Text(format!("{field}{strict}{value}")),
                Lexeme::Or,
                Lexeme::Text(format!("{field}=={value}")),
                Lexeme::Close,
            ]);
        }
    }
}

/// Applies `f` to the parts of `text` that sit outside double quotes.
fn map_unquoted(text: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (index, segment) in text.split('"').enumerate() {
        if index > 0 {
            out.push('"');
        }
        if index % 2 == 0 {
            out.push_str(&f(segment));
        } else {
            out.push_str(segment);
        }
    }
    out
}

fn normalize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() * 2);
    let mut chars = segment.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '|' => out.push_str(" | "),
            // `!=`, `!==` and `!~` are comparison operators, not negations
            '!' if matches!(chars.peek(), Some('=' | '~')) => out.push(ch),
            '!' => out.push_str(" ! "),
            '&' => out.push(' '),
            '(' => out.push_str(" ( "),
            ')' => out.push_str(" ) "),
            _ => out.push(ch),
        }
    }
    collapse_operator_whitespace(replace_keywords(out))
}

fn replace_keywords(mut text: String) -> String {
    const KEYWORDS: [(&str, &str); 3] = [(" OR ", " | "), (" NOT ", " ! "), (" AND ", " ")];
    // `a OR OR b` leaves the second keyword behind after one pass
    for _ in 0..=text.len() {
        let before = text.clone();
        for (from, to) in KEYWORDS {
            if text.contains(from) {
                text = text.replace(from, to);
            }
        }
        if text == before {
            break;
        }
    }
    text
}

fn collapse_operator_whitespace(mut text: String) -> String {
    const PATTERNS: [(&str, &str); 10] = [
        (" =", "="),
        ("= ", "="),
        (" >", ">"),
        ("> ", ">"),
        (" <", "<"),
        ("< ", "<"),
        (" ~", "~"),
        ("~ ", "~"),
        (" !=", "!="),
        (" !~", "!~"),
    ];
    // every replacement shrinks the string, so an unchanged length is a fixed point
    for _ in 0..=text.len() {
        let before = text.len();
        for (from, to) in PATTERNS {
            if text.contains(from) {
                text = text.replace(from, to);
            }
        }
        if text.len() == before {
            break;
        }
    }
    text
}

/// Removes the first and the last `"` of a merged token.
fn strip_outer_quotes(token: &str) -> String {
    let (Some(first), Some(last)) = (token.find('"'), token.rfind('"')) else {
        return token.to_string();
    };
    let mut out = String::with_capacity(token.len());
    out.push_str(&token[..first]);
    if last > first {
        out.push_str(&token[first + 1..last]);
        out.push_str(&token[last + 1..]);
    } else {
        out.push_str(&token[first + 1..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Lexeme {
        Lexeme::Text(value.to_string())
    }

    #[test]
    fn operator_spacing_is_normalized() {
        for query in ["rating>3", "rating > 3", "rating >3", "rating>  3", "RATING  >   3"] {
            assert_eq!(lex_query(query), [text("rating>3")], "query: {query:?}");
        }
        for query in ["artist=del", "artist = del", "artist =del", "artist= del"] {
            assert_eq!(lex_query(query), [text("artist=del")], "query: {query:?}");
        }
    }

    #[test]
    fn keywords_are_case_sensitive_whole_words() {
        assert_eq!(lex_query("a OR b"), [text("a"), Lexeme::Or, text("b")]);
        assert_eq!(lex_query("a or b"), [text("a"), text("or"), text("b")]);
        assert_eq!(lex_query("ORCHESTRA"), [text("orchestra")]);
        assert_eq!(lex_query("a AND b"), [text("a"), text("b")]);
        assert_eq!(lex_query("a & b"), [text("a"), text("b")]);
        assert_eq!(lex_query("NOT a"), [Lexeme::Not, text("a")]);
        assert_eq!(lex_query("a OR OR b"), [text("a"), Lexeme::Or, Lexeme::Or, text("b")]);
    }

    #[test]
    fn symbols_do_not_need_spaces() {
        assert_eq!(
            lex_query("!(a|b)"),
            [
                Lexeme::Not,
                Lexeme::Open,
                text("a"),
                Lexeme::Or,
                text("b"),
                Lexeme::Close
            ]
        );
    }

    #[test]
    fn quoted_text_is_literal() {
        assert_eq!(lex_query("\"(live)\""), [text("(live)")]);
        assert_eq!(lex_query("\"(\""), [text("(")]);
        assert_eq!(lex_query("title=\"a | b\""), [text("title=a | b")]);
        assert_eq!(lex_query("title=\"Rock AND Roll\""), [text("title=rock and roll")]);
    }

    #[test]
    fn unterminated_quote_swallows_the_rest() {
        assert_eq!(lex_query("artist=\"boards of canada"), [text("artist=boards of canada")]);
        assert_eq!(lex_query("\""), Vec::<Lexeme>::new());
    }

    #[test]
    fn empty_quotes_are_dropped() {
        assert_eq!(lex_query("\"\" a"), [text("a")]);
    }

    #[test]
    fn compound_comparisons_are_expanded() {
        assert_eq!(lex_query("album!=karma"), [Lexeme::Not, text("album=karma")]);
        assert_eq!(lex_query("album != karma"), [Lexeme::Not, text("album=karma")]);
        assert_eq!(lex_query("album!==karma"), [Lexeme::Not, text("album==karma")]);
        assert_eq!(lex_query("album!~^k"), [Lexeme::Not, text("album~^k")]);
        assert_eq!(
            lex_query("rating >= 4"),
            [
                Lexeme::Open,
                text("rating>4"),
                Lexeme::Or,
                text("rating==4"),
                Lexeme::Close
            ]
        );
        assert_eq!(
            lex_query("year<=\"1999\""),
            [
                Lexeme::Open,
                text("year<1999"),
                Lexeme::Or,
                text("year==1999"),
                Lexeme::Close
            ]
        );
    }

    #[test]
    fn compound_operator_inside_value_is_kept() {
        assert_eq!(lex_query("title=\"a>=b\""), [text("title=a>=b")]);
        assert_eq!(lex_query("title==x!=y"), [text("title==x!=y")]);
    }

    #[test]
    fn regex_patterns_keep_their_case() {
        assert_eq!(lex_query("Title~\"\\D+\""), [text("title~\\D+")]);
        assert_eq!(lex_query("TITLE ~ \\S"), [text("title~\\S")]);
        assert_eq!(lex_query("Genre!~\"^\\p{Lu}\""), [Lexeme::Not, text("genre~^\\p{Lu}")]);
        // only the leftmost operator decides
        assert_eq!(lex_query("Title=\"A~B\""), [text("title=a~b")]);
    }

    #[test]
    fn latin_accents_are_folded() {
        for query in ["motley crue", "mötley crüe", "motley crüe", "MÖTLEY CRÜE"] {
            assert_eq!(lex_query(query), [text("motley"), text("crue")], "query: {query:?}");
        }
        assert_eq!(lex_query("artist=\"Björk\""), [text("artist=bjork")]);
        assert_eq!(lex_query("中"), [text("中")]);
    }

    #[test]
    fn strip_outer_quotes_keeps_inner_quotes() {
        assert_eq!(strip_outer_quotes("a\"b\"c\"d"), "ab\"cd");
        assert_eq!(strip_outer_quotes("\"abc"), "abc");
        assert_eq!(strip_outer_quotes("abc"), "abc");
    }
}
