/// Value that stands for "tag is not set" in an exact comparison
/// (`genre==__null__`).
pub const NULL_VALUE: &str = "__null__";

/// Native comparison operators a leaf can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `field==value`: whole value equality.
    Exact,
    /// `field=value`: substring match.
    Contains,
    /// `field>value`: numeric greater-than.
    Greater,
    /// `field<value`: numeric less-than.
    Less,
    /// `field~value`: regular expression search.
    Regex,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Exact => "==",
            Comparison::Contains => "=",
            Comparison::Greater => ">",
            Comparison::Less => "<",
            Comparison::Regex => "~",
        }
    }
}

/// What a single leaf token asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
    Field {
        field: &'a str,
        comparison: Comparison,
        value: &'a str,
    },
    /// Bare word matched against the keyword fields.
    Keyword(&'a str),
}

impl<'a> Predicate<'a> {
    /// Classifies a leaf by its leftmost operator, so a value may itself
    /// contain operator characters (`title==a=b` compares against `a=b`).
    ///
    /// ```
    /// use track_syntax::{Comparison, Predicate};
    ///
    /// assert_eq!(
    ///     Predicate::parse("rating>3"),
    ///     Predicate::Field { field: "rating", comparison: Comparison::Greater, value: "3" }
    /// );
    /// assert_eq!(Predicate::parse("\"olson\""), Predicate::Keyword("olson"));
    /// ```
    pub fn parse(leaf: &'a str) -> Self {
        match find_comparison(leaf) {
            Some((at, comparison)) => Predicate::Field {
                field: leaf[..at].trim(),
                comparison,
                value: clean_value(&leaf[at + comparison.symbol().len()..]),
            },
            None => Predicate::Keyword(clean_value(leaf)),
        }
    }

    /// `field==__null__`
    pub fn is_null_check(&self) -> bool {
        matches!(
            self,
            Predicate::Field {
                comparison: Comparison::Exact,
                value: NULL_VALUE,
                ..
            }
        )
    }
}

fn clean_value(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

fn find_comparison(leaf: &str) -> Option<(usize, Comparison)> {
    leaf.char_indices().find_map(|(at, ch)| {
        let comparison = match ch {
            '=' if leaf[at..].starts_with("==") => Comparison::Exact,
            '=' => Comparison::Contains,
            '>' => Comparison::Greater,
            '<' => Comparison::Less,
            '~' => Comparison::Regex,
            _ => return None,
        };
        Some((at, comparison))
    })
}

/// Lowercases `text`, leaving the pattern after a leading `~` operator as
/// typed. `\D` and `\d` are different classes.
pub(crate) fn lowercase_outside_regex(text: &str) -> String {
    let regex_at = text.char_indices().find_map(|(at, ch)| match ch {
        '~' => Some(Some(at)),
        '=' | '>' | '<' => Some(None),
        _ => None,
    });
    match regex_at.flatten() {
        Some(at) => format!("{}{}", text[..at].to_lowercase(), &text[at..]),
        None => text.to_lowercase(),
    }
}

/// Operators the lexer rewrites into native ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompoundOp {
    NotExact,
    NotContains,
    NotRegex,
    AtLeast,
    AtMost,
}

impl CompoundOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            CompoundOp::NotExact => "!==",
            CompoundOp::NotContains => "!=",
            CompoundOp::NotRegex => "!~",
            CompoundOp::AtLeast => ">=",
            CompoundOp::AtMost => "<=",
        }
    }
}

/// Returns the leftmost operator of `text` when it is a compound one.
pub(crate) fn find_compound_op(text: &str) -> Option<(usize, CompoundOp)> {
    for (at, ch) in text.char_indices() {
        let rest = &text[at..];
        let op = match ch {
            '!' if rest.starts_with("!==") => CompoundOp::NotExact,
            '!' if rest.starts_with("!=") => CompoundOp::NotContains,
            '!' if rest.starts_with("!~") => CompoundOp::NotRegex,
            '>' if rest.starts_with(">=") => CompoundOp::AtLeast,
            '<' if rest.starts_with("<=") => CompoundOp::AtMost,
            '=' | '>' | '<' | '~' => return None,
            _ => continue,
        };
        return Some((at, op));
    }
    None
}
