use std::io;

use thiserror::Error;

/// Errors raised while decoding one line of a recipe graph file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed tag `{0}`")]
    MalformedTag(String),
    #[error("malformed dependency list `{0}`")]
    MalformedDependencyList(String),
    #[error("unknown position marker `{0}`")]
    UnknownPositionMarker(String),
    #[error("malformed line: {0}")]
    MalformedLine(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn at_line(line: usize, source: ParseError) -> Self {
        Error::Parse { line, source }
    }

    /// Returns the underlying parse error, if any.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match *self {
            Error::Parse { ref source, .. } => Some(source),
            Error::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
