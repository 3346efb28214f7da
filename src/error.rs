//! Formatting errors.

use thiserror::Error as ThisError;

/// Category of a formatting error.
///
/// Syntax and validation problems surface through the same channel and differ
/// only by kind and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed placeholder or spec grammar (unmatched brace, invalid fill
    /// character, missing precision digits and so on).
    Syntax,
    /// Automatic (`{}`) and manual (`{0}`) argument indexing were mixed within
    /// one format string.
    IndexingConflict,
    /// An argument index or name resolved to no supplied argument.
    ArgumentOutOfRange,
    /// A spec feature is incompatible with the bound argument's type,
    /// e.g. a sign flag on a string.
    TypeMismatch,
    /// A parsed width or precision exceeds the representable positive range.
    Overflow,
}

/// Error produced while formatting.
///
/// Carries the *original* format string and the absolute byte offset at which
/// the error was detected, so callers can point a caret at the right column of
/// the string they wrote.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{message} (at byte {offset} of {fmt_string:?})")]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
    fmt_string: String,
    offset: usize,
}

impl Error {
    pub(crate) fn new(
        kind: ErrorKind,
        message: &'static str,
        fmt_string: &str,
        offset: usize,
    ) -> Self {
        Self {
            kind,
            message,
            fmt_string: fmt_string.to_owned(),
            offset,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Fixed, human-readable description of what went wrong.
    pub fn message(&self) -> &'static str {
        self.message
    }

    /// The full format string the failed call was invoked with, untouched by
    /// parsing progress.
    pub fn format_string(&self) -> &str {
        &self.fmt_string
    }

    /// Absolute byte offset into [`Self::format_string()`] at which the error
    /// was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_original_string() {
        let err = Error::new(ErrorKind::Syntax, "\"}\" expected", "{0:x", 4);
        let rendered = err.to_string();
        assert!(rendered.contains("\"}\" expected"), "{rendered}");
        assert!(rendered.contains("byte 4"), "{rendered}");
        assert!(rendered.contains("{0:x"), "{rendered}");
    }
}
