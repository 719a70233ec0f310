use std::io::Write;
use std::process::{Command, Stdio};

use super::Highlighter;
use crate::error::{LitdocError, Result};

/// Highlights through the `pygmentize` command line tool.
pub struct Pygmentize {
    program: String,
}

impl Pygmentize {
    pub fn new() -> Self {
        Self::with_program("pygmentize")
    }

    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// True when the program starts and reports its version.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Default for Pygmentize {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for Pygmentize {
    fn highlight(&self, code: &str, language_name: &str) -> Result<String> {
        let mut command = Command::new(&self.program);
        command.args(["-l", language_name, "-f", "html"]);
        // PHP sources rarely open with `<?php` in every fragment
        if language_name == "php" {
            command.args(["-O", "startinline=true"]);
        }
        pipe_through(command, code)
    }
}

/// Runs `command` with `input` on stdin and returns its stdout.
pub(crate) fn pipe_through(mut command: Command, input: &str) -> Result<String> {
    let program = command.get_program().to_string_lossy().into_owned();

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| LitdocError::Highlighter(format!("Failed to run {}: {}", program, e)))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| LitdocError::Highlighter(format!("No stdin for {}", program)))?;

    // Written from a separate thread so a full stdout pipe cannot deadlock us
    let input = input.to_owned();
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child.wait_with_output()?;
    if let Ok(Err(e)) = writer.join() {
        tracing::debug!("Writing to {} stopped early: {}", program, e);
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LitdocError::Highlighter(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
