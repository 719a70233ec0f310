//! Lines dropped before segmentation: interpreter directives and Python
//! encoding declarations.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::languages::LanguageDescriptor;

static CODING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"coding[:=]\s*([-\w.]+)").expect("coding pattern is valid"));

pub fn strip_prelude<'a>(mut lines: Vec<&'a str>, language: &LanguageDescriptor) -> Vec<&'a str> {
    if lines.first().is_some_and(|first| first.starts_with("#!")) {
        lines.remove(0);
    }

    if language.name == "python" {
        if let Some(pos) = lines.iter().take(2).position(|line| CODING.is_match(line)) {
            lines.remove(pos);
        }
    }

    lines
}
