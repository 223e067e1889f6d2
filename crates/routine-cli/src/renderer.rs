//! Terminal rendering of markdown output via termimad, with a plain text
//! fallback.
//!
//! Routines link every exercise to a search URL. termimad prints link syntax
//! literally, so rich output replaces each link with its bold label and a
//! reference number, and lists the URLs once after the text.

use std::borrow::Cow;
use std::sync::LazyLock;

use anyhow::Result;
use regex::{Captures, Regex};
use termimad::{crossterm::style::Color, MadSkin};

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[((?:\\.|[^\]\\])+)\]\((https?://[^)\s]+)\)").expect("link pattern is valid")
});

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();

        skin.set_headers_fg(Color::Green);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to stdout
    pub fn render(&self, markdown: &str) -> Result<()> {
        if self.rich_enabled {
            self.skin.print_text(&reference_links(markdown));
        } else {
            print!("{markdown}");
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Rewrites `[label](url)` as `**label** [n]` and appends `[n] url` lines.
/// A URL linked more than once keeps its first number.
fn reference_links(markdown: &str) -> Cow<'_, str> {
    let mut targets: Vec<String> = Vec::new();
    let body = LINK.replace_all(markdown, |caps: &Captures<'_>| {
        let url = &caps[2];
        let number = match targets.iter().position(|t| t == url) {
            Some(index) => index + 1,
            None => {
                targets.push(url.to_string());
                targets.len()
            }
        };
        format!("**{}** [{number}]", unescape_label(&caps[1]))
    });

    if targets.is_empty() {
        return body;
    }

    let mut out = body.into_owned();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    for (index, url) in targets.iter().enumerate() {
        out.push_str(&format!("[{}] {url}\n", index + 1));
    }
    Cow::Owned(out)
}

fn unescape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut chars = label.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer() {
        let renderer = TerminalRenderer::new(false);
        assert!(!renderer.rich_enabled);
        assert!(renderer.render("# Plan 1\n").is_ok());
    }

    #[test]
    fn test_default_is_rich() {
        assert!(TerminalRenderer::default().rich_enabled);
    }

    #[test]
    fn test_links_become_numbered_references() {
        let out = reference_links(
            "| [Burpees](https://www.google.com/search?q=how%20to%20do%20Burpees) | 3 |\n\
             | [Plank](https://www.google.com/search?q=how%20to%20do%20Plank) | 2 |\n\
             Repeat [Burpees](https://www.google.com/search?q=how%20to%20do%20Burpees).\n",
        );

        assert_eq!(
            out,
            "| **Burpees** [1] | 3 |\n\
             | **Plank** [2] | 2 |\n\
             Repeat **Burpees** [1].\n\
             \n\
             [1] https://www.google.com/search?q=how%20to%20do%20Burpees\n\
             [2] https://www.google.com/search?q=how%20to%20do%20Plank\n"
        );
    }

    #[test]
    fn test_escaped_label_is_unescaped() {
        let out = reference_links("Do [Curl \\[EZ bar\\]](https://example.com/curl)");
        assert!(out.starts_with("Do **Curl [EZ bar]** [1]\n\n[1] https://example.com/curl"));
    }

    #[test]
    fn test_text_without_links_is_borrowed() {
        assert!(matches!(reference_links("- Email: not attached\n"), Cow::Borrowed(_)));
    }
}
