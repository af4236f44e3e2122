use crate::diagnostics::Diagnostic;
use crate::span::Span;
use std::collections::TryReserveError;
use std::fmt::{Display, Formatter};
use std::result;
use thiserror::Error;

/// The single located error record a code generator attaches on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMsg {
    pub span: Span,
    pub message: String,
}

impl ErrorMsg {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.message.clone())
            .with_span(self.span)
            .with_code("codegen")
    }
}

impl Display for ErrorMsg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Codegen failure at {0}")]
    Codegen(ErrorMsg),
    #[error("Out of memory: {0}")]
    OutOfMemory(String),
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    /// Failure record for errors raised while generating code.
    pub fn codegen_msg(&self) -> Option<&ErrorMsg> {
        match self {
            Error::Codegen(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Codegen(msg) => msg.to_diagnostic(),
            other => Diagnostic::error(other.to_string()),
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(e: TryReserveError) -> Self {
        Error::OutOfMemory(e.to_string())
    }
}

// Convert from std::io::Error to our Error type
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}
impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Generic(s.to_string())
    }
}
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
