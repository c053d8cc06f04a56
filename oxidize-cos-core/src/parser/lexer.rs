//! PDF Lexer
//!
//! Byte-level building blocks shared by the object parser, according to
//! ISO 32000-1 Section 7.2: whitespace and comment skipping, exact keyword
//! matching with rollback, and raw number lexing.

use super::cursor::{ByteCursor, Position};
use super::diagnostics::ParseWarning;
use super::options::{ParseOptions, MAX_SAFE_INTEGER};
use super::{ParseError, ParseResult};

/// Byte sequences recognized by the lexer
pub mod keywords {
    pub const TRUE: &[u8] = b"true";
    pub const FALSE: &[u8] = b"false";
    pub const NULL: &[u8] = b"null";
    pub const STREAM: &[u8] = b"stream";
    pub const ENDSTREAM: &[u8] = b"endstream";

    /// Accepted spellings of `stream` plus the end-of-line that follows it,
    /// longest first so the whole EOL is consumed
    pub const STREAM_OPENERS: [&[u8]; 5] = [
        b"stream \r\n",
        b"stream\r\n",
        b"stream\r",
        b"stream\n",
        STREAM,
    ];

    /// Accepted spellings of `endstream` plus the end-of-line before it,
    /// longest first so the EOL is excluded from stream contents
    pub const STREAM_CLOSERS: [&[u8]; 4] = [
        b"\r\nendstream",
        b"\rendstream",
        b"\nendstream",
        ENDSTREAM,
    ];
}

/// PDF whitespace: space, tab, CR, LF, form feed, NUL
#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

/// PDF delimiters: `( ) < > [ ] { } / %`
#[inline]
pub fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Bytes that can start a number
#[inline]
pub fn is_numeric(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'+' | b'-' | b'.')
}

/// A lexed number, before it becomes a [`super::PdfObject`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawNumber {
    Integer(i64),
    Real(f64),
}

impl RawNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            RawNumber::Integer(i) => i as f64,
            RawNumber::Real(r) => r,
        }
    }

    /// Usable as the object number of a reference
    pub fn as_object_number(self) -> Option<u32> {
        match self {
            RawNumber::Integer(i) => u32::try_from(i).ok(),
            RawNumber::Real(_) => None,
        }
    }

    /// Usable as the generation number of a reference
    pub fn as_generation(self) -> Option<u16> {
        match self {
            RawNumber::Integer(i) => u16::try_from(i).ok(),
            RawNumber::Real(_) => None,
        }
    }
}

/// Lexer over an in-memory buffer
///
/// Owns the cursor and the diagnostic sink: every warning is logged through
/// `tracing` when raised and, if enabled, kept until drained.
#[derive(Debug)]
pub struct Lexer {
    cursor: ByteCursor,
    options: ParseOptions,
    warnings: Vec<ParseWarning>,
}

impl Lexer {
    pub fn new(cursor: ByteCursor, options: ParseOptions) -> Self {
        Self {
            cursor,
            options,
            warnings: Vec::new(),
        }
    }

    pub fn cursor(&self) -> &ByteCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut ByteCursor {
        &mut self.cursor
    }

    pub fn into_cursor(self) -> ByteCursor {
        self.cursor
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Record a recovered irregularity
    pub fn warn(&mut self, warning: ParseWarning) {
        tracing::warn!("{warning}");
        if self.options.collect_warnings {
            self.warnings.push(warning);
        }
    }

    /// Take all warnings recorded since the last call
    pub fn take_warnings(&mut self) -> Vec<ParseWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Forget warnings raised by a lookahead that was rolled back
    pub fn truncate_warnings(&mut self, count: usize) {
        self.warnings.truncate(count);
    }

    /// Skip whitespace and `%` comments until neither is next
    pub fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.skip_whitespace();
            if !self.skip_comment() {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.cursor.peek().is_some_and(is_whitespace) {
            self.cursor.next_byte();
        }
    }

    /// Skip a comment up to, not including, the end of line
    fn skip_comment(&mut self) -> bool {
        if self.cursor.peek() != Some(b'%') {
            return false;
        }
        while let Some(byte) = self.cursor.peek() {
            if byte == b'\n' || byte == b'\r' {
                break;
            }
            self.cursor.next_byte();
        }
        true
    }

    /// Consume `keyword` if it is next; otherwise leave the cursor untouched
    pub fn match_keyword(&mut self, keyword: &[u8]) -> bool {
        if self.cursor.starts_with(keyword) {
            self.cursor.skip(keyword.len());
            true
        } else {
            false
        }
    }

    /// Consume the first of `keywords` that is next, returning its length
    pub fn match_any_keyword(&mut self, keywords: &[&[u8]]) -> Option<usize> {
        keywords
            .iter()
            .find(|keyword| self.match_keyword(keyword))
            .map(|keyword| keyword.len())
    }

    /// Lex `[+-]digits[.digits]`
    ///
    /// Integers that do not fit `i64` become reals. Magnitudes above
    /// [`MAX_SAFE_INTEGER`] raise a warning and are clamped when
    /// `cap_numbers` is enabled.
    pub fn parse_raw_number(&mut self) -> ParseResult<RawNumber> {
        let start = self.cursor.offset();
        let mut lexeme = String::new();

        // Integer part, including the sign or a leading '.'
        while let Some(byte) = self.cursor.peek() {
            let sign = byte == b'+' || byte == b'-';
            if !is_numeric(byte) || (sign && !lexeme.is_empty()) {
                break;
            }
            self.cursor.next_byte();
            lexeme.push(byte as char);
            if byte == b'.' {
                break;
            }
        }

        // Fractional part
        while let Some(byte) = self.cursor.peek() {
            if !byte.is_ascii_digit() {
                break;
            }
            self.cursor.next_byte();
            lexeme.push(byte as char);
        }

        // Line and column are only computed when something is reported
        let value = Self::convert_number(&lexeme).ok_or_else(|| ParseError::NumberParsing {
            position: self.cursor.position_at(start),
            lexeme: lexeme.clone(),
        })?;

        if value.as_f64().abs() > MAX_SAFE_INTEGER as f64 {
            let position = self.cursor.position_at(start);
            return Ok(self.handle_large_number(value, lexeme, position));
        }

        Ok(value)
    }

    fn convert_number(lexeme: &str) -> Option<RawNumber> {
        let is_real = lexeme.contains('.');
        if !is_real {
            if let Ok(i) = lexeme.parse::<i64>() {
                return Some(RawNumber::Integer(i));
            }
        }

        // `1.`, `.5` and `-.5` are fine; a lone sign or dot is not
        if !lexeme.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        lexeme
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .map(RawNumber::Real)
    }

    fn handle_large_number(
        &mut self,
        value: RawNumber,
        lexeme: String,
        position: Position,
    ) -> RawNumber {
        let capped = self.options.cap_numbers;
        self.warn(ParseWarning::NumberTooLarge {
            position,
            lexeme,
            capped,
        });

        if !capped {
            return value;
        }
        if value.as_f64().is_sign_negative() {
            RawNumber::Integer(-MAX_SAFE_INTEGER)
        } else {
            RawNumber::Integer(MAX_SAFE_INTEGER)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer_for(input: &'static [u8]) -> Lexer {
        Lexer::new(ByteCursor::new(input), ParseOptions::default())
    }

    #[test]
    fn test_character_classes() {
        for b in [b' ', b'\t', b'\r', b'\n', 0x0C, 0x00] {
            assert!(is_whitespace(b), "{b:#x} should be whitespace");
        }
        assert!(!is_whitespace(0x0B));
        for b in b"()<>[]{}/%" {
            assert!(is_delimiter(*b));
        }
        assert!(!is_delimiter(b'#'));
        assert!(is_numeric(b'.') && is_numeric(b'-') && is_numeric(b'7'));
        assert!(!is_numeric(b'e'));
    }

    #[test]
    fn test_skip_whitespace_and_comments() {
        let mut lexer = lexer_for(b"  % a comment\r\n\t%another\n\x00\x0C42");
        lexer.skip_whitespace_and_comments();
        assert_eq!(lexer.cursor().peek(), Some(b'4'));

        // Idempotent
        let offset = lexer.cursor().offset();
        lexer.skip_whitespace_and_comments();
        assert_eq!(lexer.cursor().offset(), offset);
    }

    #[test]
    fn test_comment_at_end_of_input() {
        let mut lexer = lexer_for(b"% trailing comment");
        lexer.skip_whitespace_and_comments();
        assert!(lexer.cursor().done());
    }

    #[test]
    fn test_match_keyword_rolls_back() {
        let mut lexer = lexer_for(b"trux");

        assert!(!lexer.match_keyword(keywords::TRUE));
        assert_eq!(lexer.cursor().offset(), 0);
        assert!(lexer.match_keyword(b"tru"));
        assert_eq!(lexer.cursor().offset(), 3);
        assert!(!lexer.match_keyword(b"xyz"));
        assert_eq!(lexer.cursor().offset(), 3);
    }

    #[test]
    fn test_match_keyword_at_end_of_input() {
        let mut lexer = lexer_for(b"nul");
        assert!(!lexer.match_keyword(keywords::NULL));
        assert_eq!(lexer.cursor().offset(), 0);
    }

    #[test]
    fn test_stream_openers_consume_whole_eol() {
        let mut lexer = lexer_for(b"stream\r\nDATA");
        assert_eq!(lexer.match_any_keyword(&keywords::STREAM_OPENERS), Some(8));
        assert_eq!(lexer.cursor().peek(), Some(b'D'));

        let mut lexer = lexer_for(b"stream \r\nDATA");
        assert_eq!(lexer.match_any_keyword(&keywords::STREAM_OPENERS), Some(9));

        let mut lexer = lexer_for(b"streamDATA");
        assert_eq!(lexer.match_any_keyword(&keywords::STREAM_OPENERS), Some(6));

        let mut lexer = lexer_for(b"strea");
        assert_eq!(lexer.match_any_keyword(&keywords::STREAM_OPENERS), None);
        assert_eq!(lexer.cursor().offset(), 0);
    }

    #[test]
    fn test_parse_raw_numbers() {
        let cases: &[(&'static [u8], RawNumber)] = &[
            (b"0", RawNumber::Integer(0)),
            (b"+123", RawNumber::Integer(123)),
            (b"-456", RawNumber::Integer(-456)),
            (b"-0", RawNumber::Integer(0)),
            (b"12.34", RawNumber::Real(12.34)),
            (b".5", RawNumber::Real(0.5)),
            (b"-.25", RawNumber::Real(-0.25)),
            (b"5.", RawNumber::Real(5.0)),
            (b"9876543210", RawNumber::Integer(9_876_543_210)),
        ];

        for (input, expected) in cases {
            let mut lexer = lexer_for(*input);
            assert_eq!(lexer.parse_raw_number().unwrap(), *expected, "input {input:?}");
            assert!(lexer.cursor().done());
        }
    }

    #[test]
    fn test_parse_raw_number_stops_at_delimiter() {
        let mut lexer = lexer_for(b"2.75/Name");
        assert_eq!(lexer.parse_raw_number().unwrap(), RawNumber::Real(2.75));
        assert_eq!(lexer.cursor().peek(), Some(b'/'));

        // Only one '.' belongs to a number
        let mut lexer = lexer_for(b"1.2.3");
        assert_eq!(lexer.parse_raw_number().unwrap(), RawNumber::Real(1.2));
        assert_eq!(lexer.cursor().offset(), 3);

        // A sign only leads a number
        let mut lexer = lexer_for(b"12-3");
        assert_eq!(lexer.parse_raw_number().unwrap(), RawNumber::Integer(12));
        assert_eq!(lexer.parse_raw_number().unwrap(), RawNumber::Integer(-3));
    }

    #[test]
    fn test_parse_raw_number_rejects_bare_sign() {
        for input in [&b"-"[..], b".", b"+-", b"-x"] {
            let mut lexer = Lexer::new(ByteCursor::new(input), ParseOptions::default());
            let err = lexer.parse_raw_number().unwrap_err();
            assert!(
                matches!(err, ParseError::NumberParsing { .. }),
                "input {input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_large_number_kept_with_warning() {
        let mut lexer = lexer_for(b"99999999999999999999");
        let value = lexer.parse_raw_number().unwrap();

        assert_eq!(value, RawNumber::Real(99_999_999_999_999_999_999.0));
        let warnings = lexer.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ParseWarning::NumberTooLarge { capped: false, .. }
        ));
        assert!(lexer.take_warnings().is_empty());
    }

    #[test]
    fn test_truncate_warnings_after_rollback() {
        let mut lexer = lexer_for(b"1 99999999999999999999");
        lexer.parse_raw_number().unwrap();
        let mark = lexer.warning_count();
        let checkpoint = lexer.cursor().checkpoint();

        lexer.skip_whitespace_and_comments();
        lexer.parse_raw_number().unwrap();
        assert_eq!(lexer.warning_count(), mark + 1);

        lexer.cursor_mut().restore(checkpoint);
        lexer.truncate_warnings(mark);
        assert_eq!(lexer.cursor().offset(), 1);
        assert!(lexer.take_warnings().is_empty());
    }

    #[test]
    fn test_large_number_capped() {
        let options = ParseOptions {
            cap_numbers: true,
            ..ParseOptions::default()
        };
        let mut lexer = Lexer::new(ByteCursor::new(&b"9007199254740993 -1e"[..]), options);

        assert_eq!(
            lexer.parse_raw_number().unwrap(),
            RawNumber::Integer(MAX_SAFE_INTEGER)
        );
        lexer.skip_whitespace_and_comments();
        assert_eq!(lexer.parse_raw_number().unwrap(), RawNumber::Integer(-1));

        let mut lexer = Lexer::new(
            ByteCursor::new(&b"-90071992547409930"[..]),
            ParseOptions::lenient(),
        );
        assert_eq!(
            lexer.parse_raw_number().unwrap(),
            RawNumber::Integer(-MAX_SAFE_INTEGER)
        );
    }

    #[test]
    fn test_safe_integer_boundary_is_not_capped() {
        let options = ParseOptions::lenient();
        let mut lexer = Lexer::new(ByteCursor::new(&b"9007199254740991"[..]), options);

        assert_eq!(
            lexer.parse_raw_number().unwrap(),
            RawNumber::Integer(MAX_SAFE_INTEGER)
        );
        assert!(lexer.take_warnings().is_empty());
    }

    #[test]
    fn test_warnings_not_collected_when_disabled() {
        let options = ParseOptions {
            collect_warnings: false,
            ..ParseOptions::default()
        };
        let mut lexer = Lexer::new(ByteCursor::new(&b"99999999999999999999"[..]), options);
        lexer.parse_raw_number().unwrap();
        assert!(lexer.take_warnings().is_empty());
    }

    #[test]
    fn test_raw_number_reference_components() {
        assert_eq!(RawNumber::Integer(12).as_object_number(), Some(12));
        assert_eq!(RawNumber::Integer(-1).as_object_number(), None);
        assert_eq!(RawNumber::Real(1.0).as_object_number(), None);
        assert_eq!(RawNumber::Integer(65535).as_generation(), Some(65535));
        assert_eq!(RawNumber::Integer(65536).as_generation(), None);
    }
}
