//! Text normalization — markup stripping and whitespace collapse.
//!
//! Message bodies arrive as HTML or plain text. Classification and training
//! both tokenize on whitespace, so everything funnels through `normalize`:
//! strip tags, collapse whitespace runs to single spaces, trim.

use scraper::Html;

/// Strip all markup from a fragment, keeping text content only.
///
/// Plain text without tags passes through unchanged (modulo entity
/// decoding). Never fails; unparseable input degrades to whatever text
/// nodes the parser recovers.
pub fn strip_markup(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    fragment.root_element().text().collect::<Vec<_>>().join(" ")
}

/// Normalize raw HTML or plain text into tokenizable text.
///
/// Collapses runs of spaces, tabs, and newlines into single spaces and
/// trims. Empty input yields empty output.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let text = strip_markup(raw);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
