//! Index page linking every generated page, nested by directory.
//!
//! Names and hrefs are escaped before they reach the template, which inserts
//! them as-is.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;

use super::page::STYLESHEET_NAME;
use crate::error::Result;
use crate::html::escape_html;

pub const INDEX_NAME: &str = "index.html";

const INDEX_TEMPLATE: &str = include_str!("resources/index.html");

static INDEX_ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_template(INDEX_NAME, INDEX_TEMPLATE)
        .expect("built-in index template is valid");
    env
});

/// One generated page, as seen from the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub source: PathBuf,
    /// Page path relative to the output directory
    pub page: PathBuf,
}

/// A directory (no `href`) or a page link in the rendered tree.
#[derive(Debug, Serialize)]
struct IndexNode {
    name: String,
    href: Option<String>,
    children: Vec<IndexNode>,
}

#[derive(Serialize)]
struct IndexContext<'a> {
    stylesheet: &'a str,
    tree: Vec<IndexNode>,
}

#[derive(Default)]
struct DirNode {
    dirs: BTreeMap<String, DirNode>,
    files: Vec<(String, String)>,
}

impl DirNode {
    fn insert(&mut self, entry: &IndexEntry) {
        let components: Vec<String> = entry
            .page
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let Some((_, dirs)) = components.split_last() else {
            return;
        };

        let mut node = self;
        for dir in dirs {
            node = node.dirs.entry(dir.clone()).or_default();
        }

        let label = entry
            .source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.source.display().to_string());
        node.files.push((label, href(&entry.page)));
    }

    /// Subdirectories first, then pages in insertion order.
    fn into_nodes(self) -> Vec<IndexNode> {
        let dirs = self.dirs.into_iter().map(|(name, child)| IndexNode {
            name: escape_html(&name),
            href: None,
            children: child.into_nodes(),
        });
        let files = self.files.into_iter().map(|(label, link)| IndexNode {
            name: escape_html(&label),
            href: Some(escape_html(&link)),
            children: Vec::new(),
        });
        dirs.chain(files).collect()
    }
}

/// Forward-slash href for a relative page path.
fn href(page: &Path) -> String {
    page.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub fn render_index(entries: &[IndexEntry]) -> Result<String> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.page.cmp(&b.page));

    let mut root = DirNode::default();
    for entry in &sorted {
        root.insert(entry);
    }

    let context = IndexContext {
        stylesheet: STYLESHEET_NAME,
        tree: root.into_nodes(),
    };
    Ok(INDEX_ENV.get_template(INDEX_NAME)?.render(&context)?)
}
