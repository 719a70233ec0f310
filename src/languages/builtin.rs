//! Built-in comment syntax table.
//!
//! To document another language, add a row here (or declare it in a
//! `.litdoc.yml` language config).

use super::LanguageDescriptor;

const HASH: &str = "#";
const SLASH_SLASH: &str = "//";
const DASH_DASH: &str = "--";
const SLASH_STAR: &str = "/*";
const STAR_SLASH: &str = "*/";
const TRIPLE_QUOTE: &str = "\"\"\"";

const PYTHON_DEFINITIONS: &[&str] = &["def ", "class ", "async def "];
const JS_DEFINITIONS: &[&str] = &[
    "function ",
    "class ",
    "async function ",
    "export function ",
    "export class ",
    "export default function ",
    "export default class ",
];
const RUBY_DEFINITIONS: &[&str] = &["def ", "class ", "module "];

fn c_like(extension: &str, name: &str) -> LanguageDescriptor {
    LanguageDescriptor::new(extension, name, Some(SLASH_SLASH)).with_block(SLASH_STAR, STAR_SLASH)
}

fn python_like(extension: &str, name: &str) -> LanguageDescriptor {
    LanguageDescriptor::new(extension, name, Some(HASH))
        .with_block(TRIPLE_QUOTE, TRIPLE_QUOTE)
        .with_definitions(PYTHON_DEFINITIONS)
        .with_decorator("@")
}

pub fn descriptors() -> Vec<LanguageDescriptor> {
    vec![
        LanguageDescriptor::new("coffee", "coffee-script", Some(HASH))
            .with_block("###", "###")
            .with_definitions(&["class "]),
        LanguageDescriptor::new("pl", "perl", Some(HASH)).with_definitions(&["sub ", "package "]),
        LanguageDescriptor::new("sql", "sql", Some(DASH_DASH)).with_block(SLASH_STAR, STAR_SLASH),
        LanguageDescriptor::new("sh", "bash", Some(HASH)),
        c_like("c", "c"),
        c_like("h", "c"),
        c_like("cl", "c"),
        c_like("cpp", "cpp").with_definitions(&["class ", "struct ", "namespace ", "template"]),
        c_like("hpp", "cpp").with_definitions(&["class ", "struct ", "namespace ", "template"]),
        c_like("cc", "cpp").with_definitions(&["class ", "struct ", "namespace ", "template"]),
        c_like("cs", "csharp"),
        c_like("java", "java").with_decorator("@"),
        c_like("js", "javascript").with_definitions(JS_DEFINITIONS),
        c_like("php", "php").with_definitions(&["function ", "class "]),
        c_like("go", "go").with_definitions(&["func ", "type "]),
        c_like("rs", "rust")
            .with_doc_markers(&["/", "!"])
            .with_definitions(&["fn ", "pub fn ", "struct ", "pub struct ", "enum ", "pub enum ", "impl ", "trait "])
            .with_decorator("#["),
        LanguageDescriptor::new("rb", "ruby", Some(HASH))
            .with_block("=begin", "=end")
            .with_definitions(RUBY_DEFINITIONS),
        python_like("py", "python"),
        python_like("pyx", "cython"),
        LanguageDescriptor::new("scm", "scheme", Some(";;")).with_block("#|", "|#"),
        LanguageDescriptor::new("lua", "lua", Some(DASH_DASH))
            .with_block("--[[", "--]]")
            .with_definitions(&["function ", "local function "]),
        LanguageDescriptor::new("erl", "erlang", Some("%%")),
        LanguageDescriptor::new("tcl", "tcl", Some(HASH)).with_definitions(&["proc "]),
        LanguageDescriptor::new("hs", "haskell", Some(DASH_DASH)).with_block("{-", "-}"),
    ]
}
