//! Rewrites in-doc markup before Markdown rendering.
//!
//! - `=== Name ===` lines become anchored headings (`## <span id="name" ...>`),
//!   one `#` per leading `=` up to six.
//! - `[[file]]` and `[[file#section]]` become Markdown links to the page
//!   generated for `file`. A reference written right after a backtick is kept
//!   literally so it can be shown inside inline code.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::LitdocError;

static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(=+)([^=\n]+)=*[ \t]*$").expect("header pattern is valid"));

static CROSSREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]\n]+)\]\]").expect("crossref pattern is valid"));

/// Lowercased, trimmed, spaces replaced by hyphens.
pub fn sanitize_section_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Applies header and cross-reference rewriting to one section's doc text.
///
/// `resolve` maps a referenced source path to the href of its page, or
/// `None` when no page can be named for it; such references stay literal.
pub fn preprocess(doc_text: &str, resolve: &dyn Fn(&str) -> Option<String>) -> String {
    let with_headers = HEADER.replace_all(doc_text, |caps: &Captures| {
        let level = caps[1].len().min(6);
        let name = caps[2].trim();
        let id = sanitize_section_name(name);
        format!("{} <span id=\"{id}\" href=\"{id}\">{name}</span>", "#".repeat(level))
    });

    let text = with_headers.as_ref();
    CROSSREF
        .replace_all(text, |caps: &Captures| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let start = caps.get(0).map_or(0, |m| m.start());
            if text[..start].ends_with('`') {
                return whole.to_string();
            }
            match link_for(&caps[1], resolve) {
                Some(link) => link,
                None => whole.to_string(),
            }
        })
        .into_owned()
}

fn link_for(reference: &str, resolve: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    let (target, anchor) = match reference.split_once('#') {
        Some((target, anchor)) => (target.trim(), Some(sanitize_section_name(anchor))),
        None => (reference.trim(), None),
    };

    // `[[#section]]` points into the current page
    let href = if target.is_empty() {
        match &anchor {
            Some(anchor) if !anchor.is_empty() => format!("#{anchor}"),
            _ => {
                warn_unresolved(reference);
                return None;
            }
        }
    } else {
        let Some(page) = resolve(target) else {
            warn_unresolved(reference);
            return None;
        };
        match &anchor {
            Some(anchor) if !anchor.is_empty() => format!("{page}#{anchor}"),
            _ => page,
        }
    };

    Some(format!("[{}]({})", reference.trim(), href))
}

fn warn_unresolved(reference: &str) {
    let err = LitdocError::DestinationResolution(reference.to_string());
    tracing::warn!("{}; leaving it as text", err);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_page(target: &str) -> Option<String> {
        let stem = target.rsplit_once('.').map_or(target, |(stem, _)| stem);
        Some(format!("{stem}.html"))
    }

    fn unresolvable(_target: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_sanitize_section_name() {
        assert_eq!(sanitize_section_name("  Getting Started "), "getting-started");
        assert_eq!(sanitize_section_name("Setup"), "setup");
    }

    #[test]
    fn test_header_rewrite() {
        let out = preprocess("== Getting Started ==\nText", &html_page);
        assert_eq!(
            out,
            "## <span id=\"getting-started\" href=\"getting-started\">Getting Started</span>\nText"
        );
    }

    #[test]
    fn test_header_level_capped() {
        let out = preprocess("========Deep", &html_page);
        assert!(out.starts_with("###### <span id=\"deep\""));
    }

    #[test]
    fn test_header_only_at_line_start() {
        let out = preprocess("a == b", &html_page);
        assert_eq!(out, "a == b");
    }

    #[test]
    fn test_crossref_to_file() {
        assert_eq!(preprocess("See [[util.py]].", &html_page), "See [util.py](util.html).");
    }

    #[test]
    fn test_crossref_with_anchor() {
        assert_eq!(
            preprocess("[[a.py#setup]]", &html_page),
            "[a.py#setup](a.html#setup)"
        );
    }

    #[test]
    fn test_crossref_anchor_is_sanitized() {
        assert_eq!(
            preprocess("[[a.py#Getting Started]]", &html_page),
            "[a.py#Getting Started](a.html#getting-started)"
        );
    }

    #[test]
    fn test_crossref_same_page_anchor() {
        assert_eq!(preprocess("[[#Setup]]", &unresolvable), "[#Setup](#setup)");
    }

    #[test]
    fn test_crossref_after_backtick_is_literal() {
        let text = "Write `[[file.py]]` to link.";
        assert_eq!(preprocess(text, &html_page), text);
    }

    #[test]
    fn test_adjacent_crossrefs() {
        assert_eq!(
            preprocess("[[a.py]][[b.py]]", &html_page),
            "[a.py](a.html)[b.py](b.html)"
        );
    }

    #[test]
    fn test_unresolved_crossref_stays_literal() {
        assert_eq!(preprocess("see [[missing]]", &unresolvable), "see [[missing]]");
        assert_eq!(preprocess("[[#]]", &html_page), "[[#]]");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let text = "Nothing to rewrite here.\nNot even [single] brackets.";
        let once = preprocess(text, &html_page);
        assert_eq!(once, text);
        assert_eq!(preprocess(&once, &html_page), once);
    }
}
