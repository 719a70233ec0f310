//! Where pages go and how pages link to each other.
//!
//! With `preserve_paths` off, `lib/example.py` becomes `docs/example.html`.
//! With it on, it becomes `docs/lib/example.html`. Only normal path
//! components survive (`..` pops, roots are dropped), so no page is ever
//! written outside the output directory.

use std::path::{Component, Path, PathBuf};

use crate::error::{LitdocError, Result};
use crate::render::STYLESHEET_NAME;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    outdir: PathBuf,
    preserve_paths: bool,
}

impl OutputLayout {
    pub fn new(outdir: impl Into<PathBuf>, preserve_paths: bool) -> Self {
        Self {
            outdir: outdir.into(),
            preserve_paths,
        }
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Page path for `source`, relative to the output directory.
    pub fn relative_page(&self, source: &Path) -> Result<PathBuf> {
        let normalized = normalize(source);
        let mut page = if self.preserve_paths {
            normalized
        } else {
            normalized.file_name().map(PathBuf::from).unwrap_or_default()
        };

        if page.file_name().is_none() {
            return Err(LitdocError::DestinationResolution(source.display().to_string()));
        }
        page.set_extension("html");
        Ok(page)
    }

    pub fn destination(&self, source: &Path) -> Result<PathBuf> {
        Ok(self.outdir.join(self.relative_page(source)?))
    }

    /// Stylesheet href as seen from the page of `source`.
    pub fn stylesheet_href(&self, source: &Path) -> Result<String> {
        let page = self.relative_page(source)?;
        Ok(relative_href(&page, Path::new(STYLESHEET_NAME)))
    }

    /// Href from the page of `from` to the page of `target`, where `target`
    /// is written relative to the directory of `from`.
    pub fn crossref_href(&self, from: &Path, target: &str) -> Result<String> {
        let target = target.trim();
        if target.is_empty() {
            return Err(LitdocError::DestinationResolution(target.to_string()));
        }

        let base = from.parent().unwrap_or_else(|| Path::new(""));
        let from_page = self.relative_page(from)?;
        let to_page = self.relative_page(&base.join(target))?;
        Ok(relative_href(&from_page, &to_page))
    }
}

/// Lexically resolves `.` and `..` and keeps only normal components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// Forward-slash path from the directory of `from` to `to`, both relative
/// to the same root.
fn relative_href(from: &Path, to: &Path) -> String {
    let from_dir: Vec<_> = from.parent().map(|p| p.components().collect()).unwrap_or_default();
    let to_parts: Vec<_> = to.components().collect();

    let common = from_dir
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from_dir.len() - common];
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// Creates `dir` and its parents; existing directories are fine, including
/// ones created concurrently by another worker.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}
