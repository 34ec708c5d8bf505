//! Page text tokenizer
//!
//! Turns raw HTML into lowercase terms: script and style blocks are removed,
//! remaining tags are stripped, common entities are decoded, and the text is
//! split on every non-alphanumeric character.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref SCRIPT_OR_STYLE: Regex =
        Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref ENTITY: Regex = Regex::new(r"&(nbsp|amp|lt|gt|quot|#39|apos);").unwrap();
}

/// Decodes the entities commonly found in page text
///
/// Each entity is decoded exactly once, so `&amp;lt;` becomes `&lt;`.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "nbsp" => " ",
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            _ => "'",
        })
        .into_owned()
}

/// Removes script/style blocks and all markup, leaving the visible text
pub fn strip_markup(html: &str) -> String {
    let without_blocks = SCRIPT_OR_STYLE.replace_all(html, " ");
    TAG.replace_all(&without_blocks, " ").into_owned()
}

/// Lowercases text and splits it on non-alphanumeric characters
///
/// Used for both page text and search queries so the two agree on terms.
pub fn split_terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokenizes HTML page content into index terms, in document order
///
/// # Examples
///
/// ```
/// use site_sift::index::tokenize;
///
/// let terms = tokenize("<p>Hello&nbsp;World</p><script>var x;</script>");
/// assert_eq!(terms, vec!["hello", "world"]);
/// ```
pub fn tokenize(html: &str) -> Vec<String> {
    split_terms(&decode_entities(&strip_markup(html)))
}
