//! Typed parse errors for the strict entry points.

use thiserror::Error;

/// Failure raised by the `_strict` parser variants, carrying the
/// 1-based source line it was found on.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("malformed number '{0}'")]
    MalformedNumber(String),
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("index {0} out of range ({1} elements parsed)")]
    IndexOutOfRange(i64, usize),
    #[error("face has {0} vertex references, need at least 3")]
    FaceTooShort(usize),
}

impl ErrorKind {
    pub(crate) fn at(self, line: usize) -> ParseError {
        ParseError { line, kind: self }
    }
}
