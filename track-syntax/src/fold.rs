use std::borrow::Cow;
use unicode_normalization::{UnicodeNormalization, char::canonical_combining_class};

/// Strips accents from Latin letters so `mötley crüe` reads `motley crue`.
///
/// Marks on other scripts are kept, so `中` or Hangul syllables come back
/// unchanged.
///
/// ```
/// use track_syntax::fold_diacritics;
///
/// assert_eq!(fold_diacritics("Mötley Crüe"), "Motley Crue");
/// assert_eq!(fold_diacritics("中"), "中");
/// ```
pub fn fold_diacritics(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    let mut latin_base = false;
    let mut kept = String::with_capacity(text.len());
    for ch in text.nfd() {
        if canonical_combining_class(ch) != 0 {
            if latin_base {
                continue;
            }
        } else {
            latin_base = ch.is_ascii_alphabetic();
        }
        kept.push(ch);
    }
    Cow::Owned(kept.nfc().collect())
}
