//! Text normalization applied to every free-text column.
//!
//! [`clean_txt`] is a fixed composition of the `remove_*` steps below. The
//! order is part of the contract: digits go first, then `#`, then e-mail and
//! URL tokens, emoji, ASCII punctuation, and finally whitespace. Changing it
//! changes the output of existing datasets.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static NUMBERS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S*@\S*\s?").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s\n\r]+").unwrap());

// A pictograph plus whatever modifies it: skin tones, VS16, keycap, and
// ZWJ-joined pictographs (family and profession sequences).
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[\p{Emoji_Presentation}\p{Extended_Pictographic}]",
        r"[\p{Emoji_Modifier}\x{FE0F}\x{20E3}]*",
        r"(?:\x{200D}[\p{Emoji_Presentation}\p{Extended_Pictographic}][\p{Emoji_Modifier}\x{FE0F}]*)*",
    ))
    .unwrap()
});

/// How [`word_count`] counts words in cleaned text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordCountMode {
    /// Segments produced by splitting on a single ASCII space. An empty
    /// string counts as one segment.
    #[default]
    Delimiter,
    /// Whitespace-separated tokens. An empty string counts as zero.
    Tokens,
}

/// Strip every run of digits, including non-ASCII decimal digits.
pub fn remove_numbers(txt: &str) -> String {
    NUMBERS_RE.replace_all(txt, "").into_owned()
}

/// Remove `#` characters, leaving the hashtag word in place.
pub fn remove_hash(txt: &str) -> String {
    txt.replace('#', "")
}

/// Drops e-mail-like tokens (with one trailing whitespace) and then URLs.
pub fn remove_urls_email(txt: &str) -> String {
    let without_email = EMAIL_RE.replace_all(txt, "");
    URL_RE.replace_all(&without_email, "").into_owned()
}

/// Remove emoji along with their modifiers and ZWJ continuations.
pub fn remove_emojis(txt: &str) -> String {
    EMOJI_RE.replace_all(txt, "").into_owned()
}

/// Removes the 32 ASCII punctuation characters. Unicode punctuation such as
/// curly quotes or em-dashes is left alone.
pub fn remove_punctuation(txt: &str) -> String {
    txt.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

pub fn remove_whitespace(txt: &str) -> String {
    txt.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Run the full cleaning pipeline on `txt`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_txt("Read #2 at https://x.co/a!"), "Read at");
/// ```
pub fn clean_txt(txt: &str) -> String {
    let txt = remove_numbers(txt);
    let txt = remove_hash(&txt);
    let txt = remove_urls_email(&txt);
    let txt = remove_emojis(&txt);
    let txt = remove_punctuation(&txt);
    remove_whitespace(&txt)
}

/// Count the words in already-cleaned text.
///
/// # Arguments
///
/// * `txt` - Output of [`clean_txt`]
/// * `mode` - Counting rule, see [`WordCountMode`]
///
/// # Returns
///
/// The segment or token count. For `""` that is 1 in
/// [`WordCountMode::Delimiter`] and 0 in [`WordCountMode::Tokens`].
pub fn word_count(txt: &str, mode: WordCountMode) -> usize {
    match mode {
        WordCountMode::Delimiter => txt.split(' ').count(),
        WordCountMode::Tokens => txt.split_whitespace().count(),
    }
}

/// String form of a JSON value before it enters the cleaner.
///
/// Strings are taken verbatim, numbers in decimal form, booleans as
/// `True`/`False` (the spelling existing exports use), null as empty, and
/// arrays/objects as compact JSON.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
