//! HTML output: Markdown docs, page templates and the index page.

pub mod index;
pub mod markdown;
pub mod page;

pub use index::{render_index, IndexEntry, INDEX_NAME};
pub use markdown::render_markdown;
pub use page::{PageContext, PageTemplate, SectionView, STYLESHEET, STYLESHEET_NAME};

use crate::crossref::preprocess;
use crate::segment::Section;

/// Fills in `doc_html` for every section.
pub fn render_docs(sections: &mut [Section], resolve: &dyn Fn(&str) -> Option<String>) {
    for section in sections {
        let text = preprocess(&section.doc_text, resolve);
        section.doc_html = Some(render_markdown(&text));
    }
}
