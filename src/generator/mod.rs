//! Turning source files into pages on disk.
//!
//! Per file: read and decode, resolve the language, segment, highlight all
//! code in one call, render the docs, fill the page template. Files share
//! nothing mutable, so a run processes them in parallel.

pub mod destination;
pub mod progress;
pub mod walker;
pub mod watcher;

pub use destination::{ensure_directory, OutputLayout};
pub use progress::{ProgressSnapshot, RunProgress};
pub use walker::SourceWalker;
pub use watcher::{watch, ContentHashes, SourceWatcher};

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{LitdocError, Result};
use crate::highlight::{self, highlight_all, Highlighter, HighlighterChoice};
use crate::languages::{GuesserChain, LanguageGuesser, LanguageRegistry};
use crate::render::{render_docs, render_index, IndexEntry, PageContext, PageTemplate};
use crate::render::{INDEX_NAME, STYLESHEET, STYLESHEET_NAME};
use crate::segment::Document;

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub outdir: PathBuf,
    /// Mirror source directories under `outdir` instead of flattening
    pub preserve_paths: bool,
    /// Language name that overrides extension lookup for every file
    pub language: Option<String>,
    pub index: bool,
    /// Report failing files and carry on instead of aborting the run
    pub skip_bad_files: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            outdir: PathBuf::from("docs"),
            preserve_paths: false,
            language: None,
            index: false,
            skip_bad_files: false,
        }
    }
}

/// Outcome of [`Generator::process`].
#[derive(Debug, Default)]
pub struct RunReport {
    pub written: Vec<IndexEntry>,
    pub failures: Vec<(PathBuf, LitdocError)>,
}

pub struct Generator {
    options: GeneratorOptions,
    layout: OutputLayout,
    registry: LanguageRegistry,
    guesser: Box<dyn LanguageGuesser>,
    highlighter: Box<dyn Highlighter>,
    template: PageTemplate,
}

impl Generator {
    /// Built-in languages, shebang + pygmentize guessing, automatic
    /// highlighter selection and the built-in page template.
    pub fn new(options: GeneratorOptions) -> Self {
        let layout = OutputLayout::new(options.outdir.clone(), options.preserve_paths);
        Self {
            options,
            layout,
            registry: LanguageRegistry::new(),
            guesser: Box::new(GuesserChain::default()),
            highlighter: highlight::select(HighlighterChoice::Auto),
            template: PageTemplate::builtin(),
        }
    }

    pub fn with_registry(mut self, registry: LanguageRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_guesser(mut self, guesser: Box<dyn LanguageGuesser>) -> Self {
        self.guesser = guesser;
        self
    }

    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn with_template(mut self, template: PageTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Segments and renders `text` as the content of `source`.
    pub fn document(&self, source: &Path, text: &str) -> Result<Document> {
        let language = self.registry.resolve(
            source,
            Some(text),
            self.options.language.as_deref(),
            self.guesser.as_ref(),
        )?;
        tracing::debug!("{} is {}", source.display(), language.name);

        let mut document = Document::new(source.to_path_buf(), text, language);
        highlight_all(&mut document.sections, &document.language, self.highlighter.as_ref())?;

        let resolve = |target: &str| match self.layout.crossref_href(source, target) {
            Ok(href) => Some(href),
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        };
        render_docs(&mut document.sections, &resolve);

        Ok(document)
    }

    /// Full HTML page for `source`.
    pub fn generate_documentation(&self, source: &Path) -> Result<String> {
        let text = read_source(source)?;
        let document = self.document(source, &text)?;
        let stylesheet = self.layout.stylesheet_href(source)?;
        self.template.render(&PageContext::for_document(&document, &stylesheet))
    }

    /// Generates and writes the page for `source`, returning its index entry.
    pub fn write_page(&self, source: &Path) -> Result<IndexEntry> {
        let page = self.layout.relative_page(source)?;
        let dest = self.layout.destination(source)?;
        let html = self.generate_documentation(source)?;

        if let Some(parent) = dest.parent() {
            ensure_directory(parent)?;
        }
        std::fs::write(&dest, html)?;

        Ok(IndexEntry {
            source: source.to_path_buf(),
            page,
        })
    }

    pub fn write_stylesheet(&self) -> Result<()> {
        ensure_directory(self.layout.outdir())?;
        std::fs::write(self.layout.outdir().join(STYLESHEET_NAME), STYLESHEET)?;
        Ok(())
    }

    pub fn write_index(&self, entries: &[IndexEntry]) -> Result<PathBuf> {
        let path = self.layout.outdir().join(INDEX_NAME);
        std::fs::write(&path, render_index(entries)?)?;
        Ok(path)
    }

    /// Generates pages for all `sources` in parallel.
    ///
    /// Without `skip_bad_files` the first failure (in source order) is
    /// returned; otherwise failures are reported and collected.
    pub fn process(&self, sources: &[PathBuf], progress: &RunProgress) -> Result<RunReport> {
        let mut report = RunReport::default();
        if sources.is_empty() {
            return Ok(report);
        }

        self.write_stylesheet()?;

        let results: Vec<(PathBuf, Result<IndexEntry>)> = sources
            .par_iter()
            .map(|source| {
                let result = self.write_page(source);
                match &result {
                    Ok(entry) => {
                        progress.inc();
                        progress.println(&format!(
                            "litdoc = {} -> {}",
                            source.display(),
                            self.layout.outdir().join(&entry.page).display()
                        ));
                    }
                    Err(e) => {
                        progress.inc_error();
                        progress.println(&format!("litdoc = {} failed: {}", source.display(), e));
                    }
                }
                (source.clone(), result)
            })
            .collect();

        for (source, result) in results {
            match result {
                Ok(entry) => report.written.push(entry),
                Err(e) if self.options.skip_bad_files => report.failures.push((source, e)),
                Err(e) => return Err(e),
            }
        }

        if self.options.index {
            let path = self.write_index(&report.written)?;
            tracing::info!("Wrote index {}", path.display());
        }

        Ok(report)
    }
}

/// Reads `source` as UTF-8, dropping a byte order mark.
pub fn read_source(source: &Path) -> Result<String> {
    let bytes = std::fs::read(source).map_err(|e| {
        LitdocError::Io(std::io::Error::new(e.kind(), format!("{}: {}", source.display(), e)))
    })?;
    let text = String::from_utf8(bytes).map_err(|_| LitdocError::Decoding {
        path: source.display().to_string(),
    })?;

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
