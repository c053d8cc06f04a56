//! PDF Object Parser Module
//!
//! This module implements the low-level COS object syntax of ISO 32000-1
//! Section 7.3: booleans, numbers, names, literal and hexadecimal strings,
//! arrays, dictionaries, streams and indirect references. Parsing works over
//! an in-memory byte buffer and decrypts strings and stream bodies through
//! the [`crate::encryption::CipherTransformFactory`] registered on the
//! [`PdfContext`].

pub mod context;
pub mod cursor;
pub mod diagnostics;
pub mod lexer;
pub mod object_parser;
pub mod objects;
pub mod options;

use crate::encryption::EncryptionError;

pub use self::context::PdfContext;
pub use self::cursor::{ByteCursor, Checkpoint, Position};
pub use self::diagnostics::{ParseWarning, Parsed};
pub use self::lexer::{Lexer, RawNumber};
pub use self::object_parser::ObjectParser;
pub use self::objects::{
    DictRole, ObjectId, PdfArray, PdfDictionary, PdfHexString, PdfName, PdfObject, PdfStream,
    PdfString,
};
pub use self::options::{ParseOptions, MAX_RECURSION_DEPTH, MAX_SAFE_INTEGER};

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// PDF Parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse PDF object starting at {position}: unexpected byte {}", describe_byte(.byte))]
    UnexpectedByte { position: Position, byte: u8 },

    #[error("Unexpected end of input at {position} while parsing {context}")]
    UnexpectedEof {
        position: Position,
        context: &'static str,
    },

    #[error("Expected next byte to be {} at {position}, found {}", describe_byte(.expected), describe_found(.found))]
    NextByteAssertion {
        position: Position,
        expected: u8,
        found: Option<u8>,
    },

    #[error("Failed to parse number at {position}: '{lexeme}'")]
    NumberParsing { position: Position, lexeme: String },

    #[error("Invalid offset {offset}: buffer length is {len}")]
    InvalidOffset { offset: usize, len: usize },

    #[error("Unterminated literal string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("Failed to parse PDF stream starting at {position}: no matching endstream")]
    StreamBoundary { position: Position },

    #[error("Maximum nesting depth {max_depth} exceeded at {position}")]
    RecursionLimit { position: Position, max_depth: usize },

    #[error("Failed to decrypt contents of object {id}: {source}")]
    Decryption {
        id: ObjectId,
        #[source]
        source: EncryptionError,
    },
}

impl ParseError {
    /// Position at which the error was detected, when it has one
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::UnexpectedByte { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::NextByteAssertion { position, .. }
            | ParseError::NumberParsing { position, .. }
            | ParseError::UnterminatedString { position }
            | ParseError::StreamBoundary { position }
            | ParseError::RecursionLimit { position, .. } => Some(*position),
            ParseError::InvalidOffset { .. } | ParseError::Decryption { .. } => None,
        }
    }
}

fn describe_byte(byte: &u8) -> String {
    describe_found(&Some(*byte))
}

fn describe_found(byte: &Option<u8>) -> String {
    match *byte {
        Some(b) if b.is_ascii_graphic() => format!("'{}' (0x{b:02X})", b as char),
        Some(b) => format!("0x{b:02X}"),
        None => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_byte_display() {
        let err = ParseError::UnexpectedByte {
            position: Position::new(2, 5, 17),
            byte: b'}',
        };
        let msg = err.to_string();
        assert!(msg.contains("line 2, column 5"));
        assert!(msg.contains("offset 17"));
        assert!(msg.contains("'}' (0x7D)"));
    }

    #[test]
    fn test_next_byte_assertion_at_eof_display() {
        let err = ParseError::NextByteAssertion {
            position: Position::new(1, 4, 3),
            expected: b'>',
            found: None,
        };
        assert!(err.to_string().ends_with("found end of input"));
    }

    #[test]
    fn test_non_printable_byte_display() {
        assert_eq!(describe_byte(&0x00), "0x00");
        assert_eq!(describe_byte(&b' '), "0x20");
        assert_eq!(describe_found(&None), "end of input");
    }

    #[test]
    fn test_error_position_accessor() {
        let position = Position::new(1, 1, 0);
        assert_eq!(
            ParseError::StreamBoundary { position }.position(),
            Some(position)
        );
        assert_eq!(
            ParseError::InvalidOffset { offset: 9, len: 4 }.position(),
            None
        );
    }
}
