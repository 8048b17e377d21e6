//! Named `$placeholder` discovery and rewriting.
//!
//! Statements name their parameters `$name`. Text inside single- or
//! double-quoted literals is skipped, so `'$5 off'` is not a parameter.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::DbError;

/// How a store escapes quotes inside string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Backslash escapes in both quote kinds (CozoDB, JSON-style strings).
    Backslash,
    /// SQL with `standard_conforming_strings`: a backslash is literal and
    /// only a doubled quote escapes.
    Standard,
}

impl QuoteStyle {
    fn regex(self) -> &'static Regex {
        match self {
            QuoteStyle::Backslash => &BACKSLASH_PLACEHOLDER_REGEX,
            QuoteStyle::Standard => &STANDARD_PLACEHOLDER_REGEX,
        }
    }
}

/// Quoted literals are matched first so placeholders inside them are skipped.
static BACKSLASH_PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'(?:[^'\\]|\\.|'')*'|"(?:[^"\\]|\\.)*"|\$([A-Za-z_][A-Za-z0-9_]*)"#).unwrap()
});

static STANDARD_PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|\$([A-Za-z_][A-Za-z0-9_]*)"#).unwrap()
});

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Placeholder names in order of first appearance, without repeats.
pub fn placeholder_names(text: &str, style: QuoteStyle) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in style.regex().captures_iter(text) {
        if let Some(name) = caps.get(1) {
            if !names.iter().any(|n| n == name.as_str()) {
                names.push(name.as_str().to_string());
            }
        }
    }
    names
}

/// Rewrite `$name` placeholders to positional `$1..$n`.
///
/// Positions follow first appearance; a name used twice maps to the same
/// position. Returns the rewritten text and the names in position order.
/// Literals are read with [`QuoteStyle::Standard`].
pub fn to_positional(text: &str) -> (String, Vec<String>) {
    let mut names: Vec<String> = Vec::new();
    let rewritten = STANDARD_PLACEHOLDER_REGEX.replace_all(text, |caps: &Captures<'_>| match caps.get(1) {
        Some(name) => {
            let position = match names.iter().position(|n| n == name.as_str()) {
                Some(index) => index + 1,
                None => {
                    names.push(name.as_str().to_string());
                    names.len()
                }
            };
            format!("${position}")
        }
        None => caps[0].to_string(),
    });
    (rewritten.into_owned(), names)
}

/// Table and column names spliced into generated statements must be plain
/// identifiers.
pub fn validate_identifier(name: &str) -> Result<(), DbError> {
    if IDENTIFIER_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(DbError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}
