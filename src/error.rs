use thiserror::Error;

#[derive(Error, Debug)]
pub enum LitdocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Can't figure out the language of {path}{}", suggestion_hint(.suggestion))]
    UnknownLanguage {
        path: String,
        suggestion: Option<String>,
    },

    #[error("Failed to decode {path} as UTF-8")]
    Decoding { path: String },

    #[error("Highlighter returned {found} fragments for {expected} sections")]
    HighlighterMismatch { expected: usize, found: usize },

    #[error("Cannot resolve cross-reference target: {0}")]
    DestinationResolution(String),

    #[error("Highlighter error: {0}")]
    Highlighter(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Watcher error: {0}")]
    Watcher(String),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

impl From<minijinja::Error> for LitdocError {
    fn from(e: minijinja::Error) -> Self {
        LitdocError::Template(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LitdocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_message_without_suggestion() {
        let err = LitdocError::UnknownLanguage {
            path: "LICENSE".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "Can't figure out the language of LICENSE");
    }

    #[test]
    fn test_unknown_language_message_with_suggestion() {
        let err = LitdocError::UnknownLanguage {
            path: "pyhton".to_string(),
            suggestion: Some("python".to_string()),
        };
        assert!(err.to_string().ends_with("(did you mean 'python'?)"));
    }
}
