//! Error types for schema resolution, record decoding and tree extraction.

use std::io;
use std::path::PathBuf;

/// Error raised while resolving a column schema or extractor configuration.
///
/// Configuration errors are always fatal and surface at construction time,
/// before any tree is read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {format} schema description: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("unsupported description format for {}: expected .xml, .yaml, .yml or .json", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("invalid column indices '{0}': expected six comma-separated integers")]
    InvalidIndices(String),

    #[error("invalid extractor config: {0}")]
    Invalid(String),
}

/// Error raised when a single input line cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("line {line}: expected at least {expected} columns, found {found}")]
    TooFewColumns {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {column} value '{value}' is not an integer")]
    InvalidInteger {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: HEAD value {value} is out of range")]
    HeadOutOfRange { line: usize, value: i64 },
}

impl FormatError {
    /// The 1-based line number within the stream where decoding failed.
    pub fn line(&self) -> usize {
        match self {
            FormatError::TooFewColumns { line, .. } => *line,
            FormatError::InvalidInteger { line, .. } => *line,
            FormatError::HeadOutOfRange { line, .. } => *line,
        }
    }

    /// Attach the stream line number to an error raised by [`Record::decode`].
    ///
    /// [`Record::decode`]: crate::record::Record::decode
    pub fn at_line(mut self, number: usize) -> Self {
        match &mut self {
            FormatError::TooFewColumns { line, .. } => *line = number,
            FormatError::InvalidInteger { line, .. } => *line = number,
            FormatError::HeadOutOfRange { line, .. } => *line = number,
        }
        self
    }
}

/// Error raised while reading the next tree from a stream.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("node {dependent} refers to head position {head}, but the tree only has {len} nodes")]
    UnresolvedHead {
        dependent: usize,
        head: usize,
        len: usize,
    },

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}
