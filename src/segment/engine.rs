//! Line-by-line state machine that splits source text into doc/code runs.
//!
//! Each call to [`step`] consumes one line, updates the [`Accumulator`] and
//! reports the next [`State`] plus, at a section boundary, the section that
//! was finalized. Rules are checked in a fixed priority order:
//!
//! 1. block comment delimiters (inline `/* x */`, opening, closing)
//! 2. lines inside a block comment, including preformatted spans
//! 3. line comments
//! 4. definition lines that start a new section
//! 5. plain code
//!
//! Block comments whose start and end tokens are identical (`"""`) are
//! docstring-style: the doc belongs to the code *before* it, so closing such a
//! block finalizes the pending section. Distinct tokens (`/* */`) lead the code
//! that follows, like line comments do.
//!
//! A docstring token also delimits string literals. A code line that does not
//! start with the token but holds an odd number of them opens a verbatim
//! literal; everything up to the line that closes it stays code.

use regex::Regex;

use crate::html::escape_html;
use crate::languages::LanguageDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Code,
    LineCommentRun,
    BlockComment,
    PreformattedInBlock,
    VerbatimLiteral,
}

impl State {
    pub fn in_block(self) -> bool {
        matches!(self, State::BlockComment | State::PreformattedInBlock)
    }
}

/// Comment matchers compiled once per document.
pub struct Syntax<'a> {
    language: &'a LanguageDescriptor,
    line_comment: Option<Regex>,
    continuation: Option<&'static str>,
}

impl<'a> Syntax<'a> {
    pub fn new(language: &'a LanguageDescriptor) -> Self {
        let line_comment = language.line_comment.as_deref().map(|token| {
            let markers = language
                .doc_markers
                .iter()
                .filter(|m| !m.is_empty())
                .map(|m| regex::escape(m))
                .collect::<Vec<_>>();
            let marker = if markers.is_empty() {
                String::new()
            } else {
                format!("(?:{})?", markers.join("|"))
            };
            Regex::new(&format!(r"^\s*{}{}\s?", regex::escape(token), marker))
                .expect("escaped comment token is a valid pattern")
        });

        // `/* ... */` blocks conventionally prefix inner lines with `*`
        let continuation = match language.block_start() {
            Some(start) if start.ends_with('*') => Some("*"),
            _ => None,
        };

        Self {
            language,
            line_comment,
            continuation,
        }
    }

    pub fn language(&self) -> &LanguageDescriptor {
        self.language
    }

    fn block(&self) -> Option<(&str, &str)> {
        self.language
            .block_comment
            .as_ref()
            .map(|(start, end)| (start.as_str(), end.as_str()))
    }

    fn strip_line_comment<'l>(&self, line: &'l str) -> Option<&'l str> {
        let found = self.line_comment.as_ref()?.find(line)?;
        Some(&line[found.end()..])
    }

    /// Drops a leading `*` (and one space) from a line inside a `/* */` block.
    fn strip_continuation<'l>(&self, line: &'l str) -> &'l str {
        let Some(marker) = self.continuation else {
            return line;
        };
        let body = line.trim_start();
        match body.strip_prefix(marker) {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
            None => line,
        }
    }

    fn toggles_literal(&self, line: &str) -> bool {
        match &self.language.block_comment {
            Some((start, end)) if start == end => line.matches(start.as_str()).count() % 2 == 1,
            _ => false,
        }
    }

    fn is_docstring_style(&self) -> bool {
        self.language.has_symmetric_block()
    }
}

/// A section finalized by a flush, before it is given its ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flushed {
    pub doc_text: String,
    pub code_text: String,
}

/// Pending doc and code text of the section being built.
#[derive(Debug, Default)]
pub struct Accumulator {
    docs: String,
    code: String,
    has_code: bool,
    after_decorator: bool,
    /// Pending code waits for the first doc line of the open block
    flush_on_doc: bool,
    block_indent: usize,
    pre_indent: Option<usize>,
}

impl Accumulator {
    fn push_doc(&mut self, text: &str) {
        self.docs.push_str(text);
        self.docs.push('\n');
    }

    fn push_code(&mut self, line: &str) {
        self.code.push_str(line);
        self.code.push('\n');
    }

    fn has_docs(&self) -> bool {
        !self.docs.trim().is_empty()
    }

    fn close_preformatted(&mut self) {
        if self.pre_indent.take().is_some() {
            self.docs.push_str("</pre>\n");
        }
    }

    /// Finalizes the pending section and resets the accumulators.
    /// Returns `None` when both doc and code are empty.
    pub fn flush(&mut self) -> Option<Flushed> {
        let doc_text = normalize_doc(&self.docs);
        let code_text = normalize_code(&self.code);

        self.docs.clear();
        self.code.clear();
        self.has_code = false;
        self.after_decorator = false;

        if doc_text.is_empty() && code_text.is_empty() {
            None
        } else {
            Some(Flushed {
                doc_text,
                code_text,
            })
        }
    }

    /// End of input: closes an open preformatted span and flushes.
    pub fn finish(&mut self) -> Option<Flushed> {
        self.close_preformatted();
        self.flush()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Step {
    pub next: State,
    pub emitted: Option<Flushed>,
}

impl Step {
    fn to(next: State) -> Self {
        Self {
            next,
            emitted: None,
        }
    }

    fn flushing(next: State, emitted: Option<Flushed>) -> Self {
        Self { next, emitted }
    }
}

/// Consumes one line of input.
pub fn step(state: State, line: &str, syntax: &Syntax, acc: &mut Accumulator) -> Step {
    if state == State::VerbatimLiteral {
        return literal_line(line, syntax, acc);
    }

    if let Some((start, end)) = syntax.block() {
        let trimmed = line.trim();
        if state.in_block() {
            if trimmed.starts_with(end) || trimmed.ends_with(end) {
                return close_block(trimmed, start, end, syntax, acc);
            }
            return block_line(state, line, syntax, acc);
        }
        if trimmed.starts_with(start) {
            return match inline_comment(trimmed, start, end) {
                Some(interior) => inline_block(state, syntax.strip_continuation(&interior).trim(), syntax, acc),
                None => open_block(line, &trimmed[start.len()..], syntax, acc),
            };
        }
    }

    if let Some(text) = syntax.strip_line_comment(line) {
        return line_comment(text, acc);
    }

    if line.trim().is_empty() {
        return blank_line(state, line, acc);
    }

    code_line(line, syntax, acc)
}

/// Text of `/* x */` on a single line with both tokens removed.
fn inline_comment(trimmed: &str, start: &str, end: &str) -> Option<String> {
    let rest = trimmed.strip_prefix(start)?;
    let pos = rest.find(end)?;
    Some(format!("{}{}", &rest[..pos], &rest[pos + end.len()..]))
}

fn inline_block(state: State, interior: &str, syntax: &Syntax, acc: &mut Accumulator) -> Step {
    if !interior.is_empty() {
        acc.push_doc(interior);
    }
    if syntax.is_docstring_style() && acc.has_code {
        return Step::flushing(State::Code, acc.flush());
    }
    Step::to(state)
}

fn open_block(line: &str, after_start: &str, syntax: &Syntax, acc: &mut Accumulator) -> Step {
    let interior = syntax.strip_continuation(after_start.trim()).trim();

    // A docstring's opening text stays with the pending code; closing the
    // block pairs them.
    let leads_code = !syntax.is_docstring_style() && acc.has_code;
    let emitted = if leads_code && !interior.is_empty() {
        acc.flush()
    } else {
        None
    };

    acc.flush_on_doc = leads_code && interior.is_empty();
    acc.block_indent = indent_of(line);
    acc.pre_indent = None;
    if !interior.is_empty() {
        acc.push_doc(interior);
    }

    Step::flushing(State::BlockComment, emitted)
}

fn block_line(state: State, line: &str, syntax: &Syntax, acc: &mut Accumulator) -> Step {
    let content = syntax.strip_continuation(line);
    if content.trim().is_empty() {
        acc.docs.push('\n');
        return Step::to(state);
    }

    let emitted = if std::mem::take(&mut acc.flush_on_doc) {
        acc.flush()
    } else {
        None
    };

    let indent = indent_of(content);
    acc.block_indent = acc.block_indent.min(indent);

    let next = match acc.pre_indent {
        Some(pre) if indent > acc.block_indent => {
            let pre = pre.min(indent);
            acc.pre_indent = Some(pre);
            acc.push_doc(&escape_html(strip_indent(content, pre).trim_end()));
            State::PreformattedInBlock
        }
        Some(_) => {
            acc.close_preformatted();
            acc.push_doc(content.trim());
            State::BlockComment
        }
        None if indent > acc.block_indent => {
            acc.docs.push_str("<pre>\n");
            acc.pre_indent = Some(indent);
            acc.push_doc(&escape_html(content.trim()));
            State::PreformattedInBlock
        }
        None => {
            acc.push_doc(content.trim());
            State::BlockComment
        }
    };
    Step::flushing(next, emitted)
}

fn close_block(trimmed: &str, start: &str, end: &str, syntax: &Syntax, acc: &mut Accumulator) -> Step {
    let stripped = trimmed.replace(end, "").replace(start, "");
    let interior = syntax.strip_continuation(stripped.trim()).trim();

    acc.close_preformatted();
    if !interior.is_empty() {
        if std::mem::take(&mut acc.flush_on_doc) {
            let emitted = acc.flush();
            acc.push_doc(interior);
            return Step::flushing(State::Code, emitted);
        }
        acc.push_doc(interior);
    }
    acc.flush_on_doc = false;

    if syntax.is_docstring_style() && acc.has_docs() {
        return Step::flushing(State::Code, acc.flush());
    }
    Step::to(State::Code)
}

fn line_comment(text: &str, acc: &mut Accumulator) -> Step {
    let emitted = if acc.has_code {
        acc.flush()
    } else {
        // Only blank lines can be pending here; they would lead the next code
        acc.code.clear();
        None
    };
    acc.push_doc(text);
    Step::flushing(State::LineCommentRun, emitted)
}

fn blank_line(state: State, line: &str, acc: &mut Accumulator) -> Step {
    if state == State::LineCommentRun {
        acc.docs.push('\n');
        return Step::to(State::LineCommentRun);
    }
    acc.push_code(line);
    Step::to(State::Code)
}

fn code_line(line: &str, syntax: &Syntax, acc: &mut Accumulator) -> Step {
    let language = syntax.language();
    let body = line.trim_start();

    let decorator = language
        .decorator_prefix
        .as_deref()
        .is_some_and(|prefix| body.starts_with(prefix));
    let definition = decorator
        || language
            .definition_prefixes
            .iter()
            .any(|prefix| body.starts_with(prefix.as_str()));

    // A definition after documented code starts its own section, unless a
    // decorator on the previous line already claimed it.
    let emitted = if definition && acc.has_code && acc.has_docs() && !acc.after_decorator {
        acc.flush()
    } else {
        None
    };

    acc.push_code(line);
    acc.has_code = true;
    acc.after_decorator = decorator;

    let next = if syntax.toggles_literal(line) {
        State::VerbatimLiteral
    } else {
        State::Code
    };
    Step::flushing(next, emitted)
}

fn literal_line(line: &str, syntax: &Syntax, acc: &mut Accumulator) -> Step {
    acc.push_code(line);
    acc.has_code = true;
    if syntax.toggles_literal(line) {
        Step::to(State::Code)
    } else {
        Step::to(State::VerbatimLiteral)
    }
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn strip_indent(line: &str, n: usize) -> &str {
    let skip: usize = line
        .chars()
        .take(n)
        .take_while(|c| c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    &line[skip..]
}

/// Drops leading and trailing blank lines; ends non-empty text with one `\n`.
fn normalize_doc(docs: &str) -> String {
    let lines: Vec<&str> = docs.lines().collect();
    let Some(first) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let last = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(first);

    let mut out = lines[first..=last].join("\n");
    out.push('\n');
    out
}

/// Drops trailing blank lines; ends non-empty text with one `\n`.
fn normalize_code(code: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();
    let Some(last) = lines.iter().rposition(|l| !l.trim().is_empty()) else {
        return String::new();
    };

    let mut out = lines[..=last].join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> LanguageDescriptor {
        LanguageDescriptor::new("py", "python", Some("#"))
            .with_block("\"\"\"", "\"\"\"")
            .with_definitions(&["def ", "class "])
            .with_decorator("@")
    }

    fn c() -> LanguageDescriptor {
        LanguageDescriptor::new("c", "c", Some("//")).with_block("/*", "*/")
    }

    fn run(lang: &LanguageDescriptor, lines: &[&str]) -> (State, Vec<Flushed>, Accumulator) {
        let syntax = Syntax::new(lang);
        let mut acc = Accumulator::default();
        let mut state = State::Code;
        let mut out = Vec::new();
        for line in lines {
            let step = step(state, line, &syntax, &mut acc);
            state = step.next;
            out.extend(step.emitted);
        }
        (state, out, acc)
    }

    #[test]
    fn test_line_comment_enters_comment_run() {
        let lang = python();
        let (state, emitted, acc) = run(&lang, &["# hello"]);
        assert_eq!(state, State::LineCommentRun);
        assert!(emitted.is_empty());
        assert_eq!(acc.docs, "hello\n");
    }

    #[test]
    fn test_line_comment_strips_only_one_space() {
        let lang = python();
        let (_, _, acc) = run(&lang, &["#     indented example"]);
        assert_eq!(acc.docs, "    indented example\n");
    }

    #[test]
    fn test_doc_markers_are_stripped_with_the_token() {
        let lang = c().with_doc_markers(&["/", "!"]);
        let (_, _, acc) = run(&lang, &["//! Crate docs.", "/// Item docs.", "//plain", "//"]);
        assert_eq!(acc.docs, "Crate docs.\nItem docs.\nplain\n\n");
    }

    #[test]
    fn test_doc_marker_absent_keeps_extra_slash() {
        let (_, _, acc) = run(&c(), &["/// Item docs."]);
        assert_eq!(acc.docs, "/ Item docs.\n");
    }

    #[test]
    fn test_comment_after_code_flushes() {
        let lang = python();
        let (state, emitted, acc) = run(&lang, &["# a", "x = 1", "# b"]);
        assert_eq!(state, State::LineCommentRun);
        assert_eq!(
            emitted,
            vec![Flushed {
                doc_text: "a\n".to_string(),
                code_text: "x = 1\n".to_string()
            }]
        );
        assert_eq!(acc.docs, "b\n");
    }

    #[test]
    fn test_blank_line_in_comment_run_is_paragraph_break() {
        let lang = python();
        let (_, emitted, mut acc) = run(&lang, &["# a", "", "# b", "x"]);
        assert!(emitted.is_empty());
        let section = acc.finish().unwrap();
        assert_eq!(section.doc_text, "a\n\nb\n");
        assert_eq!(section.code_text, "x\n");
    }

    #[test]
    fn test_leading_blank_code_dropped_before_comment() {
        let lang = python();
        let (_, emitted, mut acc) = run(&lang, &["", "", "# a", "x"]);
        assert!(emitted.is_empty());
        assert_eq!(acc.finish().unwrap().code_text, "x\n");
    }

    #[test]
    fn test_block_open_and_close() {
        let lang = python();
        let (state, emitted, _) = run(&lang, &["\"\"\"", "hello"]);
        assert_eq!(state, State::BlockComment);
        assert!(emitted.is_empty());

        let (state, emitted, _) = run(&lang, &["\"\"\"", "hello", "\"\"\""]);
        assert_eq!(state, State::Code);
        assert_eq!(emitted[0].doc_text, "hello\n");
        assert_eq!(emitted[0].code_text, "");
    }

    #[test]
    fn test_docstring_pairs_with_preceding_definition() {
        let lang = python();
        let (_, emitted, _) = run(
            &lang,
            &["def f():", "    \"\"\"", "    Does things.", "    \"\"\"", "    return 1"],
        );
        assert_eq!(
            emitted,
            vec![Flushed {
                doc_text: "Does things.\n".to_string(),
                code_text: "def f():\n".to_string()
            }]
        );
    }

    #[test]
    fn test_docstring_text_on_opening_line_joins_pending_code() {
        let lang = python();
        let (state, emitted, acc) = run(&lang, &["x = 1", "\"\"\"Heading"]);
        assert_eq!(state, State::BlockComment);
        assert!(emitted.is_empty());
        assert_eq!(acc.code, "x = 1\n");
        assert_eq!(acc.docs, "Heading\n");
    }

    #[test]
    fn test_docstring_summary_on_opening_line_pairs_with_definition() {
        let lang = python();
        let (_, emitted, mut acc) = run(
            &lang,
            &[
                "def f():",
                "    \"\"\"Summary line.",
                "",
                "    More detail.",
                "    \"\"\"",
                "    return 1",
            ],
        );
        assert_eq!(
            emitted,
            vec![Flushed {
                doc_text: "Summary line.\n\nMore detail.\n".to_string(),
                code_text: "def f():\n".to_string()
            }]
        );
        assert_eq!(acc.finish().unwrap().code_text, "    return 1\n");
    }

    #[test]
    fn test_c_block_with_text_after_code_flushes_first() {
        let lang = c();
        let (state, emitted, acc) = run(&lang, &["int x;", "/* Next."]);
        assert_eq!(state, State::BlockComment);
        assert_eq!(emitted[0].code_text, "int x;\n");
        assert_eq!(acc.docs, "Next.\n");
    }

    #[test]
    fn test_inline_docstring_stays_out_of_block() {
        let lang = python();
        let (state, emitted, _) = run(&lang, &["def f():", "    \"\"\"Short doc.\"\"\""]);
        assert_eq!(state, State::Code);
        assert_eq!(emitted[0].doc_text, "Short doc.\n");
        assert_eq!(emitted[0].code_text, "def f():\n");
    }

    #[test]
    fn test_inline_c_comment_joins_current_docs() {
        let lang = c();
        let (state, emitted, acc) = run(&lang, &["/* Header */"]);
        assert_eq!(state, State::Code);
        assert!(emitted.is_empty());
        assert_eq!(acc.docs, "Header\n");
    }

    #[test]
    fn test_c_block_leads_following_code() {
        let lang = c();
        let (_, emitted, mut acc) = run(&lang, &["/*", " * Adds.", " */", "int add();"]);
        assert!(emitted.is_empty());
        let section = acc.finish().unwrap();
        assert_eq!(section.doc_text, "Adds.\n");
        assert_eq!(section.code_text, "int add();\n");
    }

    #[test]
    fn test_bare_c_block_opener_after_code_splits_at_first_doc_line() {
        let lang = c();
        let (_, emitted, mut acc) = run(&lang, &["int x;", "/**", " * Next.", " */", "int y;"]);
        assert_eq!(
            emitted,
            vec![Flushed {
                doc_text: String::new(),
                code_text: "int x;\n".to_string()
            }]
        );
        let section = acc.finish().unwrap();
        assert_eq!(section.doc_text, "Next.\n");
        assert_eq!(section.code_text, "int y;\n");
    }

    #[test]
    fn test_empty_c_block_after_code_does_not_split() {
        let lang = c();
        let (_, emitted, _) = run(&lang, &["int x;", "/*", " */", "int y;"]);
        assert!(emitted.is_empty());
    }

    #[test]
    fn test_continuation_marker_on_open_line() {
        let lang = c();
        let (_, _, acc) = run(&lang, &["/** Summary", " * more"]);
        assert_eq!(acc.docs, "Summary\nmore\n");
    }

    #[test]
    fn test_preformatted_span_in_block() {
        let lang = python();
        let (state, _, acc) = run(&lang, &["\"\"\"Install with", "", "    pip install x"]);
        assert_eq!(state, State::PreformattedInBlock);
        assert_eq!(acc.docs, "Install with\n\n<pre>\npip install x\n");
    }

    #[test]
    fn test_preformatted_span_closes_at_baseline() {
        let lang = python();
        let (state, _, acc) = run(
            &lang,
            &["\"\"\"", "Example:", "    if a < b:", "        go()", "Done."],
        );
        assert_eq!(state, State::BlockComment);
        assert_eq!(
            acc.docs,
            "Example:\n<pre>\nif a &lt; b:\n    go()\n</pre>\nDone.\n"
        );
    }

    #[test]
    fn test_preformatted_span_closes_with_block() {
        let lang = python();
        let (_, emitted, _) = run(&lang, &["\"\"\"Run:", "    make", "\"\"\""]);
        assert_eq!(emitted[0].doc_text, "Run:\n<pre>\nmake\n</pre>\n");
    }

    #[test]
    fn test_block_base_indent_is_stripped() {
        let lang = python();
        let (_, emitted, _) = run(
            &lang,
            &["class A:", "    \"\"\"", "    Text.", "        code", "    \"\"\""],
        );
        assert_eq!(emitted[0].doc_text, "Text.\n<pre>\ncode\n</pre>\n");
    }

    #[test]
    fn test_verbatim_literal_is_code() {
        let lang = python();
        let (state, emitted, acc) = run(&lang, &["x = \"\"\"", "# not a comment", "\"\"\""]);
        assert_eq!(state, State::Code);
        assert!(emitted.is_empty());
        assert_eq!(acc.code, "x = \"\"\"\n# not a comment\n\"\"\"\n");
        assert!(acc.docs.is_empty());
    }

    #[test]
    fn test_balanced_literal_on_one_line_stays_code() {
        let lang = python();
        let (state, _, _) = run(&lang, &["x = \"\"\"one\"\"\""]);
        assert_eq!(state, State::Code);
    }

    #[test]
    fn test_definition_after_documented_code_flushes() {
        let lang = python();
        let (_, emitted, _) = run(&lang, &["# doc", "x = 1", "def f():"]);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].code_text, "x = 1\n");
    }

    #[test]
    fn test_definition_without_docs_does_not_flush() {
        let lang = python();
        let (_, emitted, _) = run(&lang, &["x = 1", "def f():", "class A:"]);
        assert!(emitted.is_empty());
    }

    #[test]
    fn test_decorator_keeps_definition_together() {
        let lang = python();
        let (_, emitted, mut acc) = run(
            &lang,
            &["# doc", "x = 1", "@cached", "def f():", "    pass"],
        );
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].code_text, "x = 1\n");
        assert_eq!(acc.finish().unwrap().code_text, "@cached\ndef f():\n    pass\n");
    }

    #[test]
    fn test_flush_skips_empty_section() {
        let mut acc = Accumulator::default();
        assert_eq!(acc.flush(), None);
        acc.push_code("   ");
        assert_eq!(acc.flush(), None);
    }

    #[test]
    fn test_normalize_doc_trims_blank_edges() {
        assert_eq!(normalize_doc("\n\n  text\nmore\n\n\n"), "  text\nmore\n");
        assert_eq!(normalize_doc("\n \n"), "");
    }

    #[test]
    fn test_normalize_code_keeps_leading_lines() {
        assert_eq!(normalize_code("\nx\n\n\n"), "\nx\n");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn test_strip_indent() {
        assert_eq!(strip_indent("        code", 4), "    code");
        assert_eq!(strip_indent("  x", 4), "x");
    }
}
