//! Page assembly through a minijinja template.
//!
//! Templates see `title`, `stylesheet`, `source` and `sections`, where each
//! section has `num`, `docs_html` and `code_html`. Values are inserted as-is;
//! the HTML fragments are already escaped by the renderers that produced them.

use std::path::Path;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::error::Result;
use crate::segment::Document;

pub const STYLESHEET: &str = include_str!("resources/litdoc.css");
pub const STYLESHEET_NAME: &str = "litdoc.css";

const BUILTIN_PAGE: &str = include_str!("resources/page.html");
const PAGE_NAME: &str = "page.html";

#[derive(Debug, Serialize)]
pub struct SectionView<'a> {
    pub num: usize,
    pub docs_html: &'a str,
    pub code_html: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub title: String,
    pub stylesheet: String,
    pub source: String,
    pub sections: Vec<SectionView<'a>>,
}

impl<'a> PageContext<'a> {
    /// Context for a rendered document; missing HTML renders as empty.
    pub fn for_document(document: &'a Document, stylesheet: &str) -> Self {
        let title = document
            .source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| document.source.display().to_string());

        let sections = document
            .sections
            .iter()
            .map(|section| SectionView {
                num: section.ordinal,
                docs_html: section.doc_html.as_deref().unwrap_or(""),
                code_html: section.code_html.as_deref().unwrap_or(""),
            })
            .collect();

        Self {
            title,
            stylesheet: stylesheet.to_string(),
            source: document.source.display().to_string(),
            sections,
        }
    }
}

pub struct PageTemplate {
    env: Environment<'static>,
}

impl PageTemplate {
    pub fn builtin() -> Self {
        let mut env = Self::environment();
        env.add_template(PAGE_NAME, BUILTIN_PAGE)
            .expect("built-in page template is valid");
        Self { env }
    }

    /// Compiles a user-supplied template; syntax errors surface here.
    pub fn from_source(source: impl Into<String>) -> Result<Self> {
        let mut env = Self::environment();
        env.add_template_owned(PAGE_NAME, source.into())?;
        Ok(Self { env })
    }

    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading page template from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_source(source)
    }

    fn environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env
    }

    pub fn render(&self, page: &PageContext) -> Result<String> {
        Ok(self.env.get_template(PAGE_NAME)?.render(page)?)
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}
