//! Syntax highlighting of a whole document in one pass.
//!
//! The code of every section is joined with a divider comment, highlighted
//! once so the highlighter sees the file in context, and the output is cut
//! back into per-section fragments at the highlighted dividers.

pub mod plain;
pub mod pygments;

pub use plain::PlainHighlighter;
pub use pygments::Pygmentize;

use regex::Regex;

use crate::error::{LitdocError, Result};
use crate::html::escape_html;
use crate::languages::LanguageDescriptor;
use crate::segment::Section;

/// Markup a highlighter wraps around its output.
pub const HIGHLIGHT_START: &str = "<div class=\"highlight\"><pre>";
pub const HIGHLIGHT_END: &str = "</pre></div>";

const DIVIDER_WORD: &str = "DIVIDER";

/// Turns code in a named language into HTML wrapped in
/// [`HIGHLIGHT_START`]/[`HIGHLIGHT_END`].
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language_name: &str) -> Result<String>;
}

/// Which highlighter a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HighlighterChoice {
    /// Pygments when installed, plain otherwise
    #[default]
    Auto,
    Pygments,
    Plain,
}

/// Builds the highlighter for `choice`, probing for `pygmentize` on `Auto`.
pub fn select(choice: HighlighterChoice) -> Box<dyn Highlighter> {
    match choice {
        HighlighterChoice::Pygments => Box::new(Pygmentize::new()),
        HighlighterChoice::Plain => Box::new(PlainHighlighter),
        HighlighterChoice::Auto => {
            let pygments = Pygmentize::new();
            if pygments.is_available() {
                tracing::debug!("Highlighting with pygmentize");
                Box::new(pygments)
            } else {
                tracing::warn!("pygmentize not found, code will not be syntax highlighted");
                Box::new(PlainHighlighter)
            }
        }
    }
}

/// Separator placed between code fragments and the pattern that finds it
/// again in highlighted output.
pub struct Divider {
    text: String,
    pattern: Regex,
}

impl Divider {
    pub fn for_language(language: &LanguageDescriptor) -> Self {
        let (open, close) = match (&language.line_comment, &language.block_comment) {
            (Some(token), _) => (token.as_str(), ""),
            (None, Some((start, end))) => (start.as_str(), end.as_str()),
            (None, None) => ("#", ""),
        };

        let text = format!("\n{open}{DIVIDER_WORD}{close}\n");
        let rendered = regex::escape(&escape_html(&format!("{open}{DIVIDER_WORD}{close}")));
        let pattern = Regex::new(&format!(
            r#"\n*(?:<span class="[^"]*">)?{rendered}(?:</span>)?\n*"#
        ))
        .expect("escaped divider is a valid pattern");

        Self { text, pattern }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cuts highlighted output (outer markup already removed) at each divider.
    pub fn split<'a>(&self, highlighted: &'a str) -> Vec<&'a str> {
        self.pattern.split(highlighted).collect()
    }
}

/// Removes the outer `<div><pre>` markup, tolerating surrounding whitespace.
fn strip_wrapper(output: &str) -> &str {
    let trimmed = output.trim();
    let inner = trimmed.strip_prefix(HIGHLIGHT_START).unwrap_or(trimmed);
    inner.strip_suffix(HIGHLIGHT_END).unwrap_or(inner)
}

fn wrap(fragment: &str) -> String {
    format!("{HIGHLIGHT_START}{fragment}{HIGHLIGHT_END}")
}

/// Fills in `code_html` for every section with a single highlighter call.
///
/// A fragment count that differs from the section count is logged and
/// repaired: missing fragments become empty blocks, surplus fragments are
/// appended to the last section.
pub fn highlight_all(
    sections: &mut [Section],
    language: &LanguageDescriptor,
    highlighter: &dyn Highlighter,
) -> Result<()> {
    if sections.is_empty() {
        return Ok(());
    }

    let divider = Divider::for_language(language);
    let joined = sections
        .iter()
        .map(|s| s.code_text.as_str())
        .collect::<Vec<_>>()
        .join(divider.text());

    let output = highlighter.highlight(&joined, &language.name)?;
    let mut fragments: Vec<String> = divider
        .split(strip_wrapper(&output))
        .into_iter()
        .map(str::to_string)
        .collect();

    if fragments.len() != sections.len() {
        let mismatch = LitdocError::HighlighterMismatch {
            expected: sections.len(),
            found: fragments.len(),
        };
        tracing::warn!("{}", mismatch);

        if fragments.len() > sections.len() {
            let surplus = fragments.split_off(sections.len());
            if let Some(last) = fragments.last_mut() {
                for extra in surplus {
                    last.push('\n');
                    last.push_str(&extra);
                }
            }
        }
    }

    for (i, section) in sections.iter_mut().enumerate() {
        let fragment = fragments.get(i).map(String::as_str).unwrap_or("");
        section.code_html = Some(wrap(fragment));
    }

    Ok(())
}
