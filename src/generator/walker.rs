use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{LitdocError, Result};
use crate::languages::LanguageRegistry;

/// Expands command line arguments into the list of source files.
///
/// Files are taken as given. Directories are walked (hidden files and
/// gitignored paths skipped) keeping only registered extensions. Arguments
/// that do not exist but contain glob metacharacters are expanded.
pub struct SourceWalker<'a> {
    registry: &'a LanguageRegistry,
}

impl<'a> SourceWalker<'a> {
    pub fn new(registry: &'a LanguageRegistry) -> Self {
        Self { registry }
    }

    /// Sorted and de-duplicated sources for `args`.
    pub fn collect(&self, args: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut sources = BTreeSet::new();

        for arg in args {
            if arg.is_dir() {
                sources.extend(self.walk(arg));
            } else if arg.exists() {
                sources.insert(arg.clone());
            } else if is_glob(arg) {
                let matches = self.expand(arg)?;
                if matches.is_empty() {
                    tracing::warn!("Pattern {} matched no files", arg.display());
                }
                sources.extend(matches);
            } else {
                return Err(LitdocError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("No such file or directory: {}", arg.display()),
                )));
            }
        }

        Ok(sources.into_iter().collect())
    }

    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .build();

        walker
            .flatten()
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && self.is_supported(path))
            .collect()
    }

    fn expand(&self, pattern: &Path) -> Result<Vec<PathBuf>> {
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern)
            .map_err(|e| LitdocError::Config(format!("Invalid pattern {}: {}", pattern, e)))?;

        Ok(paths
            .flatten()
            .filter(|path| path.is_file())
            .collect())
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.registry.get_for_file(path).is_some()
    }
}

fn is_glob(path: &Path) -> bool {
    path.to_string_lossy().contains(['*', '?', '['])
}
