//! Splitting source text into documentation/code sections.

pub mod engine;
pub mod prelude;

pub use engine::{Accumulator, State, Step, Syntax};

use std::path::PathBuf;
use std::sync::Arc;

use crate::languages::LanguageDescriptor;

/// One (doc, code) pair rendered side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Zero-based position within the document
    pub ordinal: usize,
    pub doc_text: String,
    pub code_text: String,
    /// Rendered Markdown, filled in after segmentation
    pub doc_html: Option<String>,
    /// Highlighted code, filled in after segmentation
    pub code_html: Option<String>,
}

impl Section {
    pub fn new(ordinal: usize, doc_text: String, code_text: String) -> Self {
        Self {
            ordinal,
            doc_text,
            code_text,
            doc_html: None,
            code_html: None,
        }
    }
}

/// Sections of one source file plus the language they were cut with.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: PathBuf,
    pub language: Arc<LanguageDescriptor>,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new(source: PathBuf, text: &str, language: Arc<LanguageDescriptor>) -> Self {
        let sections = segment(text, &language);
        Self {
            source,
            language,
            sections,
        }
    }
}

/// Splits `text` into sections using the comment syntax of `language`.
///
/// Never fails; malformed input at worst shifts section boundaries.
pub fn segment(text: &str, language: &LanguageDescriptor) -> Vec<Section> {
    let lines = prelude::strip_prelude(text.lines().collect(), language);
    let syntax = Syntax::new(language);

    let mut acc = Accumulator::default();
    let mut state = State::Code;
    let mut sections = Vec::new();

    for line in lines {
        let step = engine::step(state, line, &syntax, &mut acc);
        state = step.next;
        if let Some(flushed) = step.emitted {
            sections.push(Section::new(sections.len(), flushed.doc_text, flushed.code_text));
        }
    }

    if let Some(flushed) = acc.finish() {
        sections.push(Section::new(sections.len(), flushed.doc_text, flushed.code_text));
    }

    tracing::trace!("Segmented {} lines into {} sections", text.lines().count(), sections.len());
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageRegistry;

    fn lang(ext: &str) -> Arc<LanguageDescriptor> {
        LanguageRegistry::new().get_by_extension(ext).unwrap()
    }

    fn pairs(sections: &[Section]) -> Vec<(&str, &str)> {
        sections
            .iter()
            .map(|s| (s.doc_text.as_str(), s.code_text.as_str()))
            .collect()
    }

    #[test]
    fn test_comment_then_code() {
        let sections = segment("# hello\nprint(1)\n", &lang("py"));
        assert_eq!(pairs(&sections), vec![("hello\n", "print(1)\n")]);
        assert_eq!(sections[0].ordinal, 0);
        assert!(sections[0].doc_html.is_none());
    }

    #[test]
    fn test_docstring_block_then_code() {
        let sections = segment("\"\"\"\nhello\n\"\"\"\nprint(1)\n", &lang("py"));
        assert_eq!(pairs(&sections), vec![("hello\n", ""), ("", "print(1)\n")]);
        assert_eq!(sections[1].ordinal, 1);
    }

    #[test]
    fn test_empty_input_has_no_sections() {
        assert!(segment("", &lang("py")).is_empty());
        assert!(segment("\n\n   \n", &lang("py")).is_empty());
    }

    #[test]
    fn test_crlf_input() {
        let sections = segment("# hi\r\nx = 1\r\n", &lang("py"));
        assert_eq!(pairs(&sections), vec![("hi\n", "x = 1\n")]);
    }

    #[test]
    fn test_shebang_and_coding_are_skipped() {
        let source = "#!/usr/bin/env python\n# -*- coding: utf-8 -*-\ndef foo():\n    return True\n";
        let sections = segment(source, &lang("py"));
        assert_eq!(pairs(&sections), vec![("", "def foo():\n    return True\n")]);
    }

    #[test]
    fn test_python_same_line_comment_stays_code() {
        let sections = segment("print('hello') # this is a comment\n", &lang("py"));
        assert_eq!(
            pairs(&sections),
            vec![("", "print('hello') # this is a comment\n")]
        );
    }

    #[test]
    fn test_multiline_string_literal_is_not_docs() {
        let source = "def f():\n    x = \"\"\"\n    # inside\n    \"\"\"\n    return x\n";
        let sections = segment(source, &lang("py"));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].doc_text, "");
        assert_eq!(sections[0].code_text, source);
    }

    #[test]
    fn test_pydoc_sections() {
        let source = "\
\"\"\"
Module docs.
\"\"\"

def a():
    \"\"\"A docs.\"\"\"
    return 1

def b():
    return 2
";
        let sections = segment(source, &lang("py"));
        assert_eq!(
            pairs(&sections),
            vec![
                ("Module docs.\n", ""),
                ("A docs.\n", "\ndef a():\n"),
                ("", "    return 1\n\ndef b():\n    return 2\n"),
            ]
        );
    }

    #[test]
    fn test_single_comments_java() {
        let source = "// a\nint x;\n// b\nint y;\n";
        let sections = segment(source, &lang("java"));
        assert_eq!(pairs(&sections), vec![("a\n", "int x;\n"), ("b\n", "int y;\n")]);
    }

    #[test]
    fn test_java_docblock_leads_method() {
        let source = "/**\n * Adds two numbers.\n */\npublic int add(int a, int b) {\n    return a + b;\n}\n";
        let sections = segment(source, &lang("java"));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].doc_text, "Adds two numbers.\n");
        assert!(sections[0].code_text.starts_with("public int add"));
    }

    #[test]
    fn test_ruby_begin_end_block() {
        let source = "=begin\nRuby docs\n=end\nputs 1\n";
        let sections = segment(source, &lang("rb"));
        assert_eq!(pairs(&sections), vec![("Ruby docs\n", "puts 1\n")]);
    }

    #[test]
    fn test_erlang_without_block_tokens() {
        let source = "%% doc\nfoo() -> ok.\n";
        let sections = segment(source, &lang("erl"));
        assert_eq!(pairs(&sections), vec![("doc\n", "foo() -> ok.\n")]);
    }

    #[test]
    fn test_ordinals_are_sequential() {
        let source = "# a\nx\n# b\ny\n# c\nz\n";
        let sections = segment(source, &lang("py"));
        let ordinals: Vec<usize> = sections.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn test_open_preformatted_closed_at_end_of_input() {
        let sections = segment("\"\"\"Usage:\n    run it\n", &lang("py"));
        assert_eq!(sections[0].doc_text, "Usage:\n<pre>\nrun it\n</pre>\n");
    }
}
