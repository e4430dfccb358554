//! Error types for xmlsort

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }

    /// Resolve a byte offset into a line/column position within `source`.
    ///
    /// Offsets past the end are clamped to the end of the input.
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line: u32 = 1;
        let mut col: u32 = 1;
        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line = line.saturating_add(1);
                col = 1;
            } else {
                col = col.saturating_add(1);
            }
        }
        Self::new(offset, line, col)
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed markup reported by the XML reader
    Syntax,
    MismatchedEndTag { expected: String, found: String },
    EmptyDocument,
    MultipleRoots,
    /// Non-whitespace text outside of the root element
    TextOutsideRoot,
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
    /// Serializing the tree back to text failed
    Write,
    Io,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "xml syntax error"),
            Self::MismatchedEndTag { expected, found } => {
                write!(f, "mismatched end tag: expected </{expected}>, found </{found}>")
            }
            Self::EmptyDocument => write!(f, "empty document: no root element"),
            Self::MultipleRoots => write!(f, "multiple root elements"),
            Self::TextOutsideRoot => write!(f, "text outside of the root element"),
            Self::MaxDepthExceeded { max } => {
                write!(f, "max depth exceeded: {max}")
            }
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::Write => write!(f, "failed to write xml"),
            Self::Io => write!(f, "i/o error"),
            Self::Config => write!(f, "invalid configuration"),
        }
    }
}

/// Main error type for xmlsort
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, offset: usize, line: u32, col: u32) -> Self {
        let pos = Pos::new(offset, line, col);
        Self::new(kind, Span::at(pos))
    }

    /// Errors that are not tied to a location in the document
    pub fn detached(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::with_message(kind, Span::empty(), message)
    }

    /// Whether the error came from reading the input document
    pub const fn is_parse_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Syntax
                | ErrorKind::MismatchedEndTag { .. }
                | ErrorKind::EmptyDocument
                | ErrorKind::MultipleRoots
                | ErrorKind::TextOutsideRoot
                | ErrorKind::MaxDepthExceeded { .. }
                | ErrorKind::MaxSizeExceeded { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span == Span::empty() {
            write!(f, "{}", self.message)
        } else {
            write!(
                f,
                "error at line {}, column {}: {}",
                self.span.start.line, self.span.start.col, self.message
            )
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::detached(ErrorKind::Io, err.to_string())
    }
}

/// Result type alias for xmlsort
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        let pos = Pos::new(42, 10, 5);
        assert_eq!(pos.to_string(), "42:10:5");
    }

    #[test]
    fn test_locate_counts_lines_and_columns() {
        let source = "<a>\n  <b/>\n</a>";
        assert_eq!(Pos::locate(source, 0), Pos::new(0, 1, 1));
        assert_eq!(Pos::locate(source, 6), Pos::new(6, 2, 3));
        assert_eq!(Pos::locate(source, 999).line, 3);
    }

    #[test]
    fn test_error_creation() {
        let err = Error::at(ErrorKind::Syntax, 0, 1, 1);
        assert_eq!(err.kind(), &ErrorKind::Syntax);
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_error_display() {
        let err = Error::at(ErrorKind::MultipleRoots, 10, 2, 5);
        let display = err.to_string();
        assert!(display.contains("line 2, column 5"));
        assert!(display.contains("multiple root elements"));
    }

    #[test]
    fn test_detached_error_display_is_bare_message() {
        let err = Error::detached(ErrorKind::Io, "permission denied");
        assert_eq!(err.to_string(), "permission denied");
        assert!(!err.is_parse_error());
    }
}
