use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::BTreeMap};

/// What a record holds under a field name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Text(Cow<'a, str>),
    List(Cow<'a, [String]>),
    Number(f64),
}

impl FieldValue<'_> {
    /// Absent, empty text, or a list of empty items.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Absent => true,
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::List(items) => items.iter().all(|item| item.is_empty()),
            FieldValue::Number(_) => false,
        }
    }

    /// Numbers, numeric text, and single item lists holding a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            FieldValue::Text(text) => parse_number(text),
            FieldValue::List(items) => match items.as_ref() {
                [only] => parse_number(only),
                _ => None,
            },
            FieldValue::Absent => None,
        }
    }

    /// ```
    /// use tracksearch::FieldValue;
    ///
    /// let artists = vec!["Delerium".to_string(), "Sarah McLachlan".to_string()];
    /// assert_eq!(
    ///     FieldValue::List(artists.into()).to_display_string(),
    ///     "Delerium / Sarah McLachlan"
    /// );
    /// assert_eq!(FieldValue::Number(4.0).to_display_string(), "4");
    /// ```
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Absent => String::new(),
            FieldValue::Text(text) => text.to_string(),
            FieldValue::List(items) => items.join(" / "),
            FieldValue::Number(number) => number.to_string(),
        }
    }

    /// Strings a textual comparison is tried against: each list item, then
    /// the joined display string.
    pub fn texts(&self) -> Vec<Cow<'_, str>> {
        match self {
            FieldValue::Absent => Vec::new(),
            FieldValue::Text(text) => vec![Cow::Borrowed(&**text)],
            FieldValue::List(items) => {
                let mut texts: Vec<Cow<'_, str>> =
                    items.iter().map(|item| Cow::Borrowed(item.as_str())).collect();
                if items.len() > 1 {
                    texts.push(Cow::Owned(self.to_display_string()));
                }
                texts
            }
            FieldValue::Number(_) => vec![Cow::Owned(self.to_display_string())],
        }
    }
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Read access the search engine needs from a record. Unknown fields are
/// [`FieldValue::Absent`].
pub trait Record {
    fn field(&self, name: &str) -> FieldValue<'_>;
}

impl<T: Record + ?Sized> Record for &T {
    fn field(&self, name: &str) -> FieldValue<'_> {
        (**self).field(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl TagValue {
    pub fn as_field(&self) -> FieldValue<'_> {
        match self {
            TagValue::Number(number) => FieldValue::Number(*number),
            TagValue::Text(text) => FieldValue::Text(Cow::Borrowed(text)),
            TagValue::List(items) => FieldValue::List(Cow::Borrowed(items)),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Number(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        TagValue::Number(value.into())
    }
}

impl From<Vec<String>> for TagValue {
    fn from(value: Vec<String>) -> Self {
        TagValue::List(value)
    }
}

impl From<Vec<&str>> for TagValue {
    fn from(value: Vec<&str>) -> Self {
        TagValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// A song's tags. Tag names are case-insensitive and stored lowercased.
///
/// ```
/// use tracksearch::{FieldValue, Record, Track};
///
/// let track = Track::new().with_tag("Artist", "Delerium").with_tag("rating", 4);
/// assert_eq!(track.field("artist").to_display_string(), "Delerium");
/// assert_eq!(track.field("rating").as_number(), Some(4.0));
/// assert_eq!(track.field("genre"), FieldValue::Absent);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, TagValue>",
    into = "BTreeMap<String, TagValue>"
)]
pub struct Track {
    tags: BTreeMap<String, TagValue>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, name: &str, value: impl Into<TagValue>) -> Self {
        self.set_tag(name, value);
        self
    }

    pub fn set_tag(&mut self, name: &str, value: impl Into<TagValue>) -> Option<TagValue> {
        self.tags.insert(name.to_lowercase(), value.into())
    }

    pub fn remove_tag(&mut self, name: &str) -> Option<TagValue> {
        self.tags.remove(&name.to_lowercase())
    }

    pub fn tag(&self, name: &str) -> Option<&TagValue> {
        if name.chars().any(char::is_uppercase) {
            self.tags.get(&name.to_lowercase())
        } else {
            self.tags.get(name)
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Record for Track {
    fn field(&self, name: &str) -> FieldValue<'_> {
        self.tag(name).map_or(FieldValue::Absent, TagValue::as_field)
    }
}

impl From<BTreeMap<String, TagValue>> for Track {
    fn from(tags: BTreeMap<String, TagValue>) -> Self {
        Self {
            tags: tags
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), value))
                .collect(),
        }
    }
}

impl From<Track> for BTreeMap<String, TagValue> {
    fn from(track: Track) -> Self {
        track.tags
    }
}
