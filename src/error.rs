use std::io;
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A key/value line appeared before any `[section]` header.
    #[error("document contains no section headers (line {line}: {text:?})")]
    MissingHeader { line: usize, text: String },

    #[error("section name cannot be empty (line {line})")]
    SectionNameEmpty { line: usize },

    #[error("unterminated section header (line {line}: {text:?})")]
    UnterminatedHeader { line: usize, text: String },

    #[error("cannot parse line {line}: {text:?}")]
    InvalidLine { line: usize, text: String },

    #[error("no section: {section:?}")]
    SectionNotFound { section: String },

    #[error("no option {key:?} in section {section:?}")]
    OptionNotFound { section: String, key: String },

    /// The [`Config`](crate::Config) owning a section has been dropped.
    #[error("section {section:?} outlived its document")]
    Detached { section: String },

    #[error("cannot read a boolean from {text:?}")]
    InvalidBoolean { text: String },

    #[error("cannot read an integer from {text:?}")]
    InvalidInteger {
        text: String,
        #[source]
        source: ParseIntError,
    },

    #[error("cannot read a float from {text:?}")]
    InvalidFloat {
        text: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("unexpected load option {name:?}")]
    InvalidArgument { name: String },

    #[error("failed to read or write data")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingHeader,
    Syntax,
    NotFound,
    ValueParse,
    InvalidArgument,
    Io,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Self::MissingHeader { .. } => ErrorKind::MissingHeader,
            Self::SectionNameEmpty { .. }
            | Self::UnterminatedHeader { .. }
            | Self::InvalidLine { .. } => ErrorKind::Syntax,
            Self::SectionNotFound { .. }
            | Self::OptionNotFound { .. }
            | Self::Detached { .. } => ErrorKind::NotFound,
            Self::InvalidBoolean { .. }
            | Self::InvalidInteger { .. }
            | Self::InvalidFloat { .. } => ErrorKind::ValueParse,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Moves a reported line number up by `count`, for input parsed behind extra leading lines.
    #[must_use]
    pub(crate) fn lines_above(mut self, count: usize) -> Self {
        match &mut self {
            Self::MissingHeader { line, .. }
            | Self::SectionNameEmpty { line }
            | Self::UnterminatedHeader { line, .. }
            | Self::InvalidLine { line, .. } => *line = line.saturating_sub(count),
            _ => {}
        }

        self
    }
}
