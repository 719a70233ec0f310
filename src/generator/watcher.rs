use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use xxhash_rust::xxh3::xxh3_64;

use super::Generator;
use crate::error::{LitdocError, Result};

/// Debounced change notifications for the directories holding the sources.
pub struct SourceWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    receiver: Receiver<std::result::Result<Vec<DebouncedEvent>, notify::Error>>,
}

impl SourceWatcher {
    pub fn new(sources: &[PathBuf]) -> Result<Self> {
        let (tx, rx) = channel();

        let mut debouncer = new_debouncer(Duration::from_millis(500), tx)
            .map_err(|e| LitdocError::Watcher(e.to_string()))?;

        let dirs: BTreeSet<PathBuf> = sources.iter().map(|s| watch_dir(s)).collect();
        for dir in &dirs {
            debouncer
                .watcher()
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| LitdocError::Watcher(format!("{}: {}", dir.display(), e)))?;
        }

        Ok(Self {
            _debouncer: debouncer,
            receiver: rx,
        })
    }

    /// Blocks until the next batch of events and returns the files that
    /// still exist. `None` once the watcher has shut down.
    pub fn recv(&self) -> Option<Vec<PathBuf>> {
        match self.receiver.recv() {
            Ok(Ok(events)) => Some(
                events
                    .into_iter()
                    .map(|e| e.path)
                    .filter(|path| path.is_file())
                    .collect(),
            ),
            Ok(Err(e)) => {
                tracing::warn!("Watch error: {}", e);
                Some(Vec::new())
            }
            Err(_) => None,
        }
    }
}

fn watch_dir(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Last seen content hash of each watched source, keyed by canonical path.
pub struct ContentHashes {
    sources: HashMap<PathBuf, PathBuf>,
    hashes: HashMap<PathBuf, u64>,
}

impl ContentHashes {
    pub fn new(sources: &[PathBuf]) -> Self {
        let mut tracked = Self {
            sources: HashMap::new(),
            hashes: HashMap::new(),
        };
        for source in sources {
            let key = canonical(source);
            if let Ok(bytes) = std::fs::read(source) {
                tracked.hashes.insert(key.clone(), xxh3_64(&bytes));
            }
            tracked.sources.insert(key, source.clone());
        }
        tracked
    }

    /// The source behind an event path, if it is watched and its content
    /// differs from the last time it was seen.
    pub fn changed(&mut self, event_path: &Path) -> Option<PathBuf> {
        let key = canonical(event_path);
        let source = self.sources.get(&key)?;

        let bytes = std::fs::read(source).ok()?;
        let hash = xxh3_64(&bytes);
        if self.hashes.insert(key, hash) == Some(hash) {
            return None;
        }
        Some(source.clone())
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Regenerates a source's page whenever its content changes. Runs until
/// the watcher shuts down.
pub fn watch(generator: &Generator, sources: &[PathBuf]) -> Result<()> {
    let watcher = SourceWatcher::new(sources)?;
    let mut hashes = ContentHashes::new(sources);
    println!("Watching {} files for changes...", sources.len());

    while let Some(paths) = watcher.recv() {
        for path in paths {
            let Some(source) = hashes.changed(&path) else {
                continue;
            };
            match generator.write_page(&source) {
                Ok(entry) => println!(
                    "litdoc = {} -> {}",
                    source.display(),
                    generator.layout().outdir().join(entry.page).display()
                ),
                Err(e) => eprintln!("Error regenerating {}: {}", source.display(), e),
            }
        }
    }

    Ok(())
}
