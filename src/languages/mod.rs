pub mod builtin;
pub mod config;
pub mod guess;

pub use config::{LanguageConfig, LanguageEntry, CONFIG_FILENAME};
pub use guess::{GuesserChain, LanguageGuesser, PygmentizeGuesser, ShebangGuesser};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{LitdocError, Result};

/// Lexer names a guesser may report that differ from the registered name.
const NAME_ALIASES: &[(&str, &str)] = &[
    ("coffeescript", "coffee-script"),
    ("coffee", "coffee-script"),
    ("python3", "python"),
    ("py3", "python"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("zsh", "bash"),
    ("c++", "cpp"),
    ("c#", "csharp"),
    ("js", "javascript"),
    ("golang", "go"),
];

/// Comment syntax of one language, keyed by file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDescriptor {
    /// Extension without the leading dot
    pub extension: String,
    /// Name handed to the highlighter to select a grammar
    pub name: String,
    pub line_comment: Option<String>,
    /// Characters that may follow the line comment token to mark a doc
    /// comment (`/` and `!` turn `//` into `///` and `//!`)
    pub doc_markers: Vec<String>,
    /// Block delimiters, always both or neither
    pub block_comment: Option<(String, String)>,
    /// Line prefixes that introduce a definition (`def `, `class `, ...)
    pub definition_prefixes: Vec<String>,
    /// Prefix of a decorator/annotation line that binds to the next definition
    pub decorator_prefix: Option<String>,
}

impl LanguageDescriptor {
    pub fn new(extension: &str, name: &str, line_comment: Option<&str>) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            name: name.to_string(),
            line_comment: line_comment.map(str::to_string),
            doc_markers: Vec::new(),
            block_comment: None,
            definition_prefixes: Vec::new(),
            decorator_prefix: None,
        }
    }

    pub fn with_block(mut self, start: &str, end: &str) -> Self {
        self.block_comment = Some((start.to_string(), end.to_string()));
        self
    }

    pub fn with_definitions(mut self, prefixes: &[&str]) -> Self {
        self.definition_prefixes = prefixes.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_doc_markers(mut self, markers: &[&str]) -> Self {
        self.doc_markers = markers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_decorator(mut self, prefix: &str) -> Self {
        self.decorator_prefix = Some(prefix.to_string());
        self
    }

    pub fn block_start(&self) -> Option<&str> {
        self.block_comment.as_ref().map(|(start, _)| start.as_str())
    }

    pub fn block_end(&self) -> Option<&str> {
        self.block_comment.as_ref().map(|(_, end)| end.as_str())
    }

    /// True when one token both opens and closes a block, as `"""` does.
    pub fn has_symmetric_block(&self) -> bool {
        matches!(&self.block_comment, Some((start, end)) if start == end)
    }
}

/// Immutable lookup from extension or name to a [`LanguageDescriptor`].
pub struct LanguageRegistry {
    languages: HashMap<String, Arc<LanguageDescriptor>>,
    extension_map: HashMap<String, Arc<LanguageDescriptor>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::from_descriptors(builtin::descriptors())
    }

    /// Built-in languages plus the entries of a language config file.
    /// Config entries win over built-ins that share an extension or name.
    pub fn with_config(config: &LanguageConfig) -> Result<Self> {
        let mut descriptors = builtin::descriptors();
        for extra in config.descriptors()? {
            descriptors.retain(|d| d.extension != extra.extension);
            descriptors.push(extra);
        }
        Ok(Self::from_descriptors(descriptors))
    }

    fn from_descriptors(descriptors: Vec<LanguageDescriptor>) -> Self {
        let mut languages = HashMap::new();
        let mut extension_map = HashMap::new();

        for descriptor in descriptors {
            let descriptor = Arc::new(descriptor);
            extension_map.insert(descriptor.extension.clone(), Arc::clone(&descriptor));
            languages.insert(descriptor.name.clone(), descriptor);
        }

        Self {
            languages,
            extension_map,
        }
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<LanguageDescriptor>> {
        self.languages.get(name).cloned()
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<LanguageDescriptor>> {
        let ext = ext.trim_start_matches('.');
        self.extension_map.get(ext).cloned()
    }

    pub fn get_for_file(&self, path: &Path) -> Option<Arc<LanguageDescriptor>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }

    /// Resolve the language of a source file.
    ///
    /// A forced name wins; otherwise the extension is tried, then the
    /// guesser is asked about the content.
    pub fn resolve(
        &self,
        path: &Path,
        content: Option<&str>,
        forced_name: Option<&str>,
        guesser: &dyn LanguageGuesser,
    ) -> Result<Arc<LanguageDescriptor>> {
        if let Some(name) = forced_name {
            return self.get_by_name(name).ok_or_else(|| LitdocError::UnknownLanguage {
                path: name.to_string(),
                suggestion: self.closest_name(name),
            });
        }

        if let Some(language) = self.get_for_file(path) {
            return Ok(language);
        }

        let guessed = content.and_then(|code| guesser.guess(code));
        tracing::debug!("Guessed language for {}: {:?}", path.display(), guessed);

        guessed
            .and_then(|name| self.get_by_guessed_name(&name))
            .ok_or_else(|| LitdocError::UnknownLanguage {
                path: path.display().to_string(),
                suggestion: None,
            })
    }

    /// Looks up a guessed lexer name: registered name, then alias, then as
    /// an extension.
    fn get_by_guessed_name(&self, name: &str) -> Option<Arc<LanguageDescriptor>> {
        let name = name.trim().to_lowercase();
        self.get_by_name(&name)
            .or_else(|| {
                NAME_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == name)
                    .and_then(|(_, canonical)| self.get_by_name(canonical))
            })
            .or_else(|| self.get_by_extension(&name))
    }

    fn closest_name(&self, name: &str) -> Option<String> {
        let wanted = name.to_lowercase();
        self.languages
            .keys()
            .map(|known| (strsim::jaro_winkler(&wanted, known), known))
            .filter(|(score, _)| *score >= 0.8)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, known)| known.clone())
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
