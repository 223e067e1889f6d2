//! Rewrites in-band exercise markers into search links.
//!
//! The generator wraps exercise names in `<<<` and `>>>`. Each marker becomes
//! a markdown link whose label is the exercise name and whose target is a web
//! search for instructions on doing it.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

const OPEN: &str = "<<<";
const SEARCH_BASE: &str = "https://www.google.com/search?q=";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    // Non-greedy, so the body stops at the first closing delimiter. A marker
    // never spans a line break.
    Regex::new(r"<<<([^\r\n]*?)>>>").expect("marker pattern is valid")
});

/// Search URL for instructions on performing `term`.
pub fn search_url(term: &str) -> String {
    format!("{SEARCH_BASE}{}", urlencoding::encode(&format!("how to do {term}")))
}

/// Replaces every `<<<X>>>` marker with `[X](search_url(X))`.
///
/// Single left-to-right pass; replacement text is never rescanned. Empty,
/// unterminated and line-spanning markers are kept verbatim. When a marker
/// body itself contains an opening delimiter, only the innermost one starts
/// the marker. Brackets in the label are backslash-escaped.
pub fn linkify(text: &str) -> Cow<'_, str> {
    MARKER.replace_all(text, |caps: &Captures<'_>| {
        let body = &caps[1];
        let (verbatim, term) = match body.rfind(OPEN) {
            Some(pos) => (format!("{OPEN}{}", &body[..pos]), &body[pos + OPEN.len()..]),
            None => (String::new(), body),
        };

        if term.is_empty() {
            return caps[0].to_string();
        }
        format!("{verbatim}[{}]({})", escape_label(term), search_url(term))
    })
}

// Brackets and backslashes would otherwise end or alter the link text.
fn escape_label(term: &str) -> Cow<'_, str> {
    if !term.contains(['[', ']', '\\']) {
        return Cow::Borrowed(term);
    }
    let mut escaped = String::with_capacity(term.len() + 4);
    for c in term.chars() {
        if matches!(c, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}
