use super::{Highlighter, HIGHLIGHT_END, HIGHLIGHT_START};
use crate::error::Result;
use crate::html::escape_html;

/// Escapes code without colouring it. Used when Pygments is unavailable.
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language_name: &str) -> Result<String> {
        Ok(format!("{}{}{}", HIGHLIGHT_START, escape_html(code), HIGHLIGHT_END))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::highlight_all;
    use crate::languages::LanguageDescriptor;
    use crate::segment::Section;

    #[test]
    fn test_plain_escapes_and_wraps() {
        let html = PlainHighlighter.highlight("if a < b {}", "rust").unwrap();
        assert_eq!(html, "<div class=\"highlight\"><pre>if a &lt; b {}</pre></div>");
    }

    #[test]
    fn test_plain_round_trips_through_dividers() {
        let lang = LanguageDescriptor::new("c", "c", Some("//")).with_block("/*", "*/");
        let mut sections: Vec<Section> = ["int a;\n", "int b;\n"]
            .iter()
            .enumerate()
            .map(|(i, code)| Section::new(i, String::new(), code.to_string()))
            .collect();

        highlight_all(&mut sections, &lang, &PlainHighlighter).unwrap();
        assert_eq!(
            sections[0].code_html.as_deref(),
            Some("<div class=\"highlight\"><pre>int a;</pre></div>")
        );
        assert_eq!(
            sections[1].code_html.as_deref(),
            Some("<div class=\"highlight\"><pre>int b;\n</pre></div>")
        );
    }
}
