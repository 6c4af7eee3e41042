//! Error type for BibTeX parsing.

use thiserror::Error;

/// The BibTeX text does not conform to the record grammar.
///
/// Line and column are 1-based and point at the offending character (or one
/// past the end of input for truncated documents).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed BibTeX at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// Line of the offending character.
    pub line: usize,
    /// Column of the offending character.
    pub column: usize,
    /// What was expected or found.
    pub message: String,
}

impl ParseError {
    /// Creates a parse error at the given location.
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}
