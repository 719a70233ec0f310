//! Content-based language detection for files whose extension is unknown.

use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::highlight::pygments::pipe_through;

static SHEBANG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#!\s*(?:\S*/)?(?:env\s+(?:-\S+\s+)*)?([A-Za-z_\-]+?)[\d.]*(?:\s|$)")
        .expect("shebang pattern is valid")
});

/// Reports the name of the language a piece of source text is written in.
pub trait LanguageGuesser: Send + Sync {
    fn guess(&self, content: &str) -> Option<String>;
}

/// Reads the interpreter named on a `#!` line.
pub struct ShebangGuesser;

impl LanguageGuesser for ShebangGuesser {
    fn guess(&self, content: &str) -> Option<String> {
        let first = content.lines().next()?;
        let interpreter = SHEBANG.captures(first)?.get(1)?.as_str();

        let name = match interpreter {
            "python" | "pypy" => "python",
            "ruby" => "ruby",
            "perl" => "perl",
            "bash" | "sh" | "zsh" | "dash" => "bash",
            "node" | "nodejs" => "javascript",
            "lua" | "luajit" => "lua",
            "tclsh" | "wish" => "tcl",
            "escript" => "erlang",
            "runghc" | "runhaskell" => "haskell",
            "coffee" => "coffee-script",
            _ => return None,
        };
        Some(name.to_string())
    }
}

/// Asks `pygmentize -C` which lexer fits the content.
pub struct PygmentizeGuesser {
    program: String,
}

impl PygmentizeGuesser {
    pub fn new() -> Self {
        Self::with_program("pygmentize")
    }

    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for PygmentizeGuesser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageGuesser for PygmentizeGuesser {
    fn guess(&self, content: &str) -> Option<String> {
        let mut command = Command::new(&self.program);
        command.arg("-C");

        match pipe_through(command, content) {
            Ok(output) => {
                let name = output.trim();
                // "text" is pygments' answer when it has no idea
                if name.is_empty() || name == "text" {
                    None
                } else {
                    Some(name.to_string())
                }
            }
            Err(e) => {
                tracing::debug!("Language guessing via {} failed: {}", self.program, e);
                None
            }
        }
    }
}

/// Tries each guesser in order and returns the first answer.
pub struct GuesserChain {
    guessers: Vec<Box<dyn LanguageGuesser>>,
}

impl GuesserChain {
    pub fn new(guessers: Vec<Box<dyn LanguageGuesser>>) -> Self {
        Self { guessers }
    }
}

impl Default for GuesserChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ShebangGuesser),
            Box::new(PygmentizeGuesser::new()),
        ])
    }
}

impl LanguageGuesser for GuesserChain {
    fn guess(&self, content: &str) -> Option<String> {
        self.guessers.iter().find_map(|g| g.guess(content))
    }
}
