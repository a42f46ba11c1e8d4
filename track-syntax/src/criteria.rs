//! Smart playlist rules rendered into query strings.

use crate::NULL_VALUE;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A single condition from the smart playlist editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Is(String),
    IsNot(String),
    Contains(String),
    DoesNotContain(String),
    Regex(String),
    NotRegex(String),
    /// The tag has a value.
    IsSet,
    /// The tag is missing or empty.
    IsNotSet,
    GreaterThan(String),
    LessThan(String),
    AtLeast(String),
    AtMost(String),
    /// Inclusive on both ends.
    Between(String, String),
    /// Timestamp tag (seconds since the epoch) no older than the duration.
    InTheLast(Duration),
    /// Timestamp tag older than the duration.
    NotInTheLast(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub field: String,
    pub criterion: Criterion,
}

impl Rule {
    pub fn new(field: impl Into<String>, criterion: Criterion) -> Self {
        Self {
            field: field.into(),
            criterion,
        }
    }

    /// ```
    /// use track_syntax::{Criterion, Rule};
    ///
    /// let rule = Rule::new("rating", Criterion::AtLeast("4".into()));
    /// assert_eq!(rule.to_query(), "( rating>\"4\" | rating==\"4\" )");
    /// ```
    pub fn to_query(&self) -> String {
        self.to_query_at(SystemTime::now())
    }

    /// Renders relative time criteria against `now`.
    ///
    /// ```
    /// use std::time::{Duration, UNIX_EPOCH};
    /// use track_syntax::{Criterion, Rule};
    ///
    /// let now = UNIX_EPOCH + Duration::from_secs(10_000);
    /// let rule = Rule::new("date_added", Criterion::NotInTheLast(Duration::from_secs(600)));
    /// assert_eq!(rule.to_query_at(now), "date_added<\"9400\"");
    /// ```
    pub fn to_query_at(&self, now: SystemTime) -> String {
        let field = self.field.trim();
        match &self.criterion {
            Criterion::Is(value) => format!("{field}=={}", quote(value)),
            Criterion::IsNot(value) => format!("! {field}=={}", quote(value)),
            Criterion::Contains(value) => format!("{field}={}", quote(value)),
            Criterion::DoesNotContain(value) => format!("! {field}={}", quote(value)),
            Criterion::Regex(value) => format!("{field}~{}", quote(value)),
            Criterion::NotRegex(value) => format!("! {field}~{}", quote(value)),
            Criterion::IsSet => format!("! {field}=={NULL_VALUE}"),
            Criterion::IsNotSet => format!("{field}=={NULL_VALUE}"),
            Criterion::GreaterThan(value) => format!("{field}>{}", quote(value)),
            Criterion::LessThan(value) => format!("{field}<{}", quote(value)),
            Criterion::AtLeast(value) => inclusive(field, '>', value),
            Criterion::AtMost(value) => inclusive(field, '<', value),
            Criterion::Between(low, high) => format!(
                "( {} {} )",
                inclusive(field, '>', low),
                inclusive(field, '<', high)
            ),
            Criterion::InTheLast(window) => inclusive(field, '>', &cutoff(now, *window)),
            Criterion::NotInTheLast(window) => {
                format!("{field}<{}", quote(&cutoff(now, *window)))
            }
        }
    }
}

fn cutoff(now: SystemTime, window: Duration) -> String {
    now.checked_sub(window)
        .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |since_epoch| since_epoch.as_secs())
        .to_string()
}

fn inclusive(field: &str, strict: char, value: &str) -> String {
    let value = quote(value);
    format!("( {field}{strict}{value} | {field}=={value} )")
}

// values cannot carry quotes of their own
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', ""))
}

/// A set of rules combined with AND, or with OR when `match_any` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartFilter {
    pub rules: Vec<Rule>,
    pub match_any: bool,
}

impl SmartFilter {
    pub fn new(match_any: bool) -> Self {
        Self {
            rules: Vec::new(),
            match_any,
        }
    }

    pub fn with_rule(mut self, field: impl Into<String>, criterion: Criterion) -> Self {
        self.rules.push(Rule::new(field, criterion));
        self
    }

    /// An empty filter renders to an empty query, which matches everything.
    pub fn to_query(&self) -> String {
        self.to_query_at(SystemTime::now())
    }

    pub fn to_query_at(&self, now: SystemTime) -> String {
        let rules = self.rules.iter().map(|rule| rule.to_query_at(now));
        if self.match_any {
            rules
                .map(|rule| format!("( {rule} )"))
                .collect::<Vec<_>>()
                .join(" | ")
        } else {
            rules.collect::<Vec<_>>().join(" ")
        }
    }
}
