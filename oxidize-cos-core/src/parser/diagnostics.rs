//! Recoverable parse diagnostics
//!
//! Fatal problems are [`ParseError`]s. Everything the parser recovers from
//! is reported as a [`ParseWarning`] attached to the value it produced, so
//! the caller decides how strict to be.

use super::{ParseError, ParseResult, Position};
use std::fmt;

/// A recovered irregularity in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Input ended inside a literal string; the string was closed there
    UnterminatedString { position: Position },

    /// A number exceeded the safe-integer threshold
    NumberTooLarge {
        position: Position,
        lexeme: String,
        capped: bool,
    },

    /// A declared stream `Length` did not lead to `endstream`
    StreamLengthMismatch { position: Position, declared: usize },

    /// A `#` in a name was not followed by two hex digits
    MalformedNameEscape { position: Position },
}

impl ParseWarning {
    pub fn position(&self) -> Position {
        match self {
            ParseWarning::UnterminatedString { position }
            | ParseWarning::NumberTooLarge { position, .. }
            | ParseWarning::StreamLengthMismatch { position, .. }
            | ParseWarning::MalformedNameEscape { position } => *position,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::UnterminatedString { position } => {
                write!(f, "Unterminated string starting at {position}")
            }
            ParseWarning::NumberTooLarge {
                position,
                lexeme,
                capped: true,
            } => write!(
                f,
                "Number too large at {position}: {lexeme}, using MAX_SAFE_INTEGER instead"
            ),
            ParseWarning::NumberTooLarge {
                position,
                lexeme,
                capped: false,
            } => write!(f, "Number too large at {position}: {lexeme}, not capping"),
            ParseWarning::StreamLengthMismatch { position, declared } => write!(
                f,
                "Stream at {position} declares Length {declared} but endstream is elsewhere"
            ),
            ParseWarning::MalformedNameEscape { position } => {
                write!(f, "Malformed #xx escape in name at {position}, kept verbatim")
            }
        }
    }
}

/// A parsed value together with the warnings raised while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub warnings: Vec<ParseWarning>,
}

impl<T> Parsed<T> {
    pub fn new(value: T, warnings: Vec<ParseWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Discard the warnings
    pub fn into_value(self) -> T {
        self.value
    }

    /// Treat a recovered unterminated string as the error it would have been
    ///
    /// Informational warnings (number capping, stream length recovery, name
    /// escapes) do not make the value invalid and are ignored here.
    pub fn strict(self) -> ParseResult<T> {
        for warning in &self.warnings {
            if let ParseWarning::UnterminatedString { position } = warning {
                return Err(ParseError::UnterminatedString {
                    position: *position,
                });
            }
        }
        Ok(self.value)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}
