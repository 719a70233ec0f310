pub mod crossref;
pub mod error;
pub mod generator;
pub mod highlight;
pub mod html;
pub mod languages;
pub mod render;
pub mod segment;

pub use crossref::{preprocess, sanitize_section_name};
pub use error::{LitdocError, Result};
pub use generator::{Generator, GeneratorOptions, OutputLayout, RunReport};
pub use highlight::{highlight_all, Divider, Highlighter, HighlighterChoice, PlainHighlighter, Pygmentize};
pub use languages::{LanguageDescriptor, LanguageGuesser, LanguageRegistry};
pub use render::PageTemplate;
pub use segment::{segment, Document, Section};
