//! Purpose: Error modeling for formatting and registration operations.
//! Exports: `Error`, `ErrorKind`.
//! Role: Shared error type for the crate's fallible surface.
//! Invariants: Nothing here crosses the C callback boundary; the dispatch
//! shims swallow these values rather than propagating them.

use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Alloc,
    Usage,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn display_includes_kind_and_message() {
        let err = Error::new(ErrorKind::Alloc).with_message("buffer allocation failed");
        assert_eq!(err.to_string(), "Alloc: buffer allocation failed");
    }

    #[test]
    fn kind_is_preserved() {
        assert_eq!(Error::new(ErrorKind::Usage).kind(), ErrorKind::Usage);
    }
}
