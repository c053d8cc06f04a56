//! PDF Object Parser
//!
//! Recursive descent over the COS object grammar of ISO 32000-1 Section 7.3.
//! One parser is bound to one byte buffer and one [`PdfContext`]; every call
//! to [`ObjectParser::parse_object`] reads a single object starting at the
//! current offset and leaves the cursor right after it.
//!
//! Strings, hex strings and stream bodies are decrypted with the cipher
//! transform of the enclosing indirect object, once per value, as soon as
//! their raw bytes are known.

use super::context::PdfContext;
use super::cursor::{ByteCursor, Position};
use super::diagnostics::{ParseWarning, Parsed};
use super::lexer::{is_delimiter, is_numeric, is_whitespace, keywords, Lexer, RawNumber};
use super::objects::{
    ObjectId, PdfArray, PdfDictionary, PdfHexString, PdfName, PdfObject, PdfStream, PdfString,
};
use super::options::ParseOptions;
use super::{ParseError, ParseResult};
use crate::encryption::decrypt_for;
use bytes::Bytes;
use indexmap::IndexMap;

/// Parser for COS objects in an in-memory buffer
#[derive(Debug)]
pub struct ObjectParser<'ctx> {
    lexer: Lexer,
    context: &'ctx mut PdfContext,
    depth: usize,
}

impl<'ctx> ObjectParser<'ctx> {
    /// Parser with default options positioned at the start of `bytes`
    pub fn for_bytes(bytes: impl Into<Bytes>, context: &'ctx mut PdfContext) -> Self {
        Self::with_options(bytes, context, ParseOptions::default())
    }

    pub fn with_options(
        bytes: impl Into<Bytes>,
        context: &'ctx mut PdfContext,
        options: ParseOptions,
    ) -> Self {
        Self::from_cursor(ByteCursor::new(bytes), context, options)
    }

    /// Parser continuing from an already positioned cursor
    pub fn from_cursor(
        cursor: ByteCursor,
        context: &'ctx mut PdfContext,
        options: ParseOptions,
    ) -> Self {
        Self {
            lexer: Lexer::new(cursor, options),
            context,
            depth: 0,
        }
    }

    pub fn context(&self) -> &PdfContext {
        &*self.context
    }

    pub fn context_mut(&mut self) -> &mut PdfContext {
        &mut *self.context
    }

    pub fn options(&self) -> &ParseOptions {
        self.lexer.options()
    }

    pub fn offset(&self) -> usize {
        self.lexer.cursor().offset()
    }

    pub fn position(&self) -> Position {
        self.lexer.cursor().position()
    }

    pub fn is_done(&self) -> bool {
        self.lexer.cursor().done()
    }

    /// Jump to an absolute offset, e.g. one taken from a cross-reference table
    pub fn move_to(&mut self, offset: usize) -> ParseResult<()> {
        self.lexer.cursor_mut().move_to(offset)
    }

    pub fn skip_whitespace_and_comments(&mut self) {
        self.lexer.skip_whitespace_and_comments();
    }

    /// Consume `keyword` if it is next, e.g. the `endobj` after an object body
    pub fn match_keyword(&mut self, keyword: &[u8]) -> bool {
        self.lexer.match_keyword(keyword)
    }

    /// Give the cursor back, e.g. to hand the buffer to another parser
    pub fn into_cursor(self) -> ByteCursor {
        self.lexer.into_cursor()
    }

    /// Parse the object at the current offset
    ///
    /// `id` is the identity of the enclosing indirect object. Strings and
    /// streams anywhere inside the object are decrypted under it when the
    /// context carries a cipher transform factory; with `None` nothing is
    /// decrypted.
    pub fn parse_object(&mut self, id: Option<ObjectId>) -> ParseResult<Parsed<PdfObject>> {
        self.depth = 0;
        // Drop leftovers of a previous call that failed
        self.lexer.take_warnings();

        let value = self.parse_value(id)?;
        Ok(Parsed::new(value, self.lexer.take_warnings()))
    }

    fn parse_value(&mut self, id: Option<ObjectId>) -> ParseResult<PdfObject> {
        self.lexer.skip_whitespace_and_comments();

        if self.lexer.match_keyword(keywords::TRUE) {
            return Ok(PdfObject::Boolean(true));
        }
        if self.lexer.match_keyword(keywords::FALSE) {
            return Ok(PdfObject::Boolean(false));
        }
        if self.lexer.match_keyword(keywords::NULL) {
            return Ok(PdfObject::Null);
        }

        let cursor = self.lexer.cursor();
        match cursor.peek() {
            Some(b'<') if cursor.peek_ahead(1) == Some(b'<') => self.parse_dictionary_or_stream(id),
            Some(b'<') => self.parse_hex_string(id),
            Some(b'(') => self.parse_literal_string(id),
            Some(b'/') => self.parse_name().map(PdfObject::Name),
            Some(b'[') => self.parse_array(id),
            Some(byte) if is_numeric(byte) => self.parse_number_or_reference(),
            Some(byte) => Err(ParseError::UnexpectedByte {
                position: cursor.position(),
                byte,
            }),
            None => Err(ParseError::UnexpectedEof {
                position: cursor.position(),
                context: "object",
            }),
        }
    }

    fn enter_container(&mut self) -> ParseResult<()> {
        let max_depth = self.lexer.options().max_depth;
        if self.depth >= max_depth {
            return Err(ParseError::RecursionLimit {
                position: self.position(),
                max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave_container(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// `N`, or `N G R` when a generation number and `R` follow
    fn parse_number_or_reference(&mut self) -> ParseResult<PdfObject> {
        let first = self.lexer.parse_raw_number()?;
        let checkpoint = self.lexer.cursor().checkpoint();
        let warning_mark = self.lexer.warning_count();

        if let Some(id) = self.parse_reference_tail(first) {
            return Ok(PdfObject::Reference(id));
        }

        self.lexer.cursor_mut().restore(checkpoint);
        self.lexer.truncate_warnings(warning_mark);
        Ok(match first {
            RawNumber::Integer(i) => PdfObject::Integer(i),
            RawNumber::Real(r) => PdfObject::Real(r),
        })
    }

    /// Lookahead for `G R`; the caller restores the cursor on `None`
    fn parse_reference_tail(&mut self, first: RawNumber) -> Option<ObjectId> {
        let number = first.as_object_number()?;

        self.lexer.skip_whitespace_and_comments();
        if !self.lexer.cursor().peek().is_some_and(|b| b.is_ascii_digit()) {
            return None;
        }
        let generation = self.lexer.parse_raw_number().ok()?.as_generation()?;

        self.lexer.skip_whitespace_and_comments();
        self.lexer
            .match_keyword(b"R")
            .then_some(ObjectId::new(number, generation))
    }

    fn parse_literal_string(&mut self, id: Option<ObjectId>) -> ParseResult<PdfObject> {
        let start = self.offset();
        self.lexer.cursor_mut().assert_next(b'(')?;

        let mut bytes = Vec::new();
        let mut nesting = 1usize;
        loop {
            let Some(byte) = self.lexer.cursor_mut().next_byte() else {
                let position = self.lexer.cursor().position_at(start);
                if !self.lexer.options().lenient_syntax {
                    return Err(ParseError::UnterminatedString { position });
                }
                self.lexer
                    .warn(ParseWarning::UnterminatedString { position });
                break;
            };

            match byte {
                b'(' => {
                    nesting += 1;
                    bytes.push(byte);
                }
                b')' => {
                    nesting -= 1;
                    if nesting == 0 {
                        break;
                    }
                    bytes.push(byte);
                }
                b'\\' => self.read_escape(&mut bytes),
                _ => bytes.push(byte),
            }
        }

        let bytes = self.decrypt(id, &bytes)?.unwrap_or(bytes);
        Ok(PdfObject::String(PdfString::new(bytes)))
    }

    /// Decode the escape sequence following a backslash
    fn read_escape(&mut self, out: &mut Vec<u8>) {
        let cursor = self.lexer.cursor_mut();
        // A backslash at end of input escapes nothing
        let Some(byte) = cursor.next_byte() else {
            return;
        };

        match byte {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'0'..=b'7' => {
                let mut value = u32::from(byte - b'0');
                for _ in 0..2 {
                    match cursor.peek() {
                        Some(digit @ b'0'..=b'7') => {
                            cursor.next_byte();
                            value = value * 8 + u32::from(digit - b'0');
                        }
                        _ => break,
                    }
                }
                // \777 does not fit a byte; keep the low 8 bits
                out.push((value & 0xFF) as u8);
            }
            // Line continuation
            b'\r' => {
                if cursor.peek() == Some(b'\n') {
                    cursor.next_byte();
                }
            }
            b'\n' => {}
            // `\\`, `\(`, `\)` and unknown escapes: the backslash is dropped
            other => out.push(other),
        }
    }

    fn parse_hex_string(&mut self, id: Option<ObjectId>) -> ParseResult<PdfObject> {
        let cursor = self.lexer.cursor_mut();
        cursor.assert_next(b'<')?;

        let start = cursor.offset();
        while cursor.peek().is_some_and(|b| b != b'>') {
            cursor.next_byte();
        }
        let text = cursor.slice(start, cursor.offset());
        cursor.assert_next(b'>')?;

        let hex = PdfHexString::new(latin1(&text));
        let hex = match self.decrypt(id, &hex.decode())? {
            Some(plain) => PdfHexString::from_bytes(&plain),
            None => hex,
        };
        Ok(PdfObject::HexString(hex))
    }

    fn parse_name(&mut self) -> ParseResult<PdfName> {
        let cursor = self.lexer.cursor_mut();
        cursor.assert_next(b'/')?;

        let start = cursor.offset();
        while cursor
            .peek()
            .is_some_and(|b| !is_whitespace(b) && !is_delimiter(b))
        {
            cursor.next_byte();
        }
        let raw = cursor.slice(start, cursor.offset());

        let name = if self.lexer.options().decode_name_escapes && raw.contains(&b'#') {
            self.decode_name_escapes(&raw, start)
        } else {
            name_text(raw.to_vec())
        };
        Ok(self.context.intern(&name))
    }

    /// Resolve `#xx` escapes; malformed ones are kept verbatim
    fn decode_name_escapes(&mut self, raw: &[u8], start: usize) -> String {
        let mut decoded = Vec::with_capacity(raw.len());
        let mut idx = 0;
        while idx < raw.len() {
            let byte = raw[idx];
            if byte == b'#' {
                let escaped = raw
                    .get(idx + 1..idx + 3)
                    .and_then(|digits| std::str::from_utf8(digits).ok())
                    .and_then(|digits| u8::from_str_radix(digits, 16).ok());
                match escaped {
                    Some(value) if raw[idx + 1].is_ascii_hexdigit() => {
                        decoded.push(value);
                        idx += 3;
                        continue;
                    }
                    _ => {
                        let position = self.lexer.cursor().position_at(start + idx);
                        self.lexer
                            .warn(ParseWarning::MalformedNameEscape { position });
                    }
                }
            }
            decoded.push(byte);
            idx += 1;
        }
        name_text(decoded)
    }

    fn parse_array(&mut self, id: Option<ObjectId>) -> ParseResult<PdfObject> {
        self.enter_container()?;
        self.lexer.cursor_mut().assert_next(b'[')?;

        let mut array = PdfArray::new();
        loop {
            self.lexer.skip_whitespace_and_comments();
            match self.lexer.cursor().peek() {
                Some(b']') => {
                    self.lexer.cursor_mut().next_byte();
                    break;
                }
                Some(_) => array.push(self.parse_value(id)?),
                None => {
                    return Err(ParseError::UnexpectedEof {
                        position: self.position(),
                        context: "array",
                    })
                }
            }
        }

        self.leave_container();
        Ok(PdfObject::Array(array))
    }

    fn parse_dictionary(&mut self, id: Option<ObjectId>) -> ParseResult<PdfDictionary> {
        self.enter_container()?;
        self.lexer.cursor_mut().assert_next(b'<')?;
        self.lexer.cursor_mut().assert_next(b'<')?;

        let mut entries = IndexMap::new();
        loop {
            self.lexer.skip_whitespace_and_comments();
            let cursor = self.lexer.cursor();
            match cursor.peek() {
                Some(b'>') if cursor.peek_ahead(1) == Some(b'>') => {
                    self.lexer.cursor_mut().skip(2);
                    break;
                }
                Some(b'/') => {
                    let key = self.parse_name()?;
                    let value = self.parse_value(id)?;
                    // Later duplicates overwrite earlier values
                    entries.insert(key, value);
                }
                Some(byte) => {
                    return Err(ParseError::UnexpectedByte {
                        position: cursor.position(),
                        byte,
                    })
                }
                None => {
                    return Err(ParseError::UnexpectedEof {
                        position: cursor.position(),
                        context: "dictionary",
                    })
                }
            }
        }

        self.leave_container();
        Ok(PdfDictionary::from_entries(entries))
    }

    fn parse_dictionary_or_stream(&mut self, id: Option<ObjectId>) -> ParseResult<PdfObject> {
        let dict_start = self.offset();
        let dict = self.parse_dictionary(id)?;

        let after_dict = self.lexer.cursor().checkpoint();
        self.lexer.skip_whitespace_and_comments();
        if self
            .lexer
            .match_any_keyword(&keywords::STREAM_OPENERS)
            .is_none()
        {
            self.lexer.cursor_mut().restore(after_dict);
            return Ok(PdfObject::Dictionary(dict));
        }

        let start = self.offset();
        let declared = self.declared_length(&dict);
        let end = match declared.and_then(|length| self.confirm_declared_end(start, length)) {
            Some(end) => end,
            None => {
                if let Some(declared) = declared {
                    let position = self.lexer.cursor().position_at(start);
                    self.lexer
                        .warn(ParseWarning::StreamLengthMismatch { position, declared });
                }
                self.lexer.cursor_mut().move_to(start)?;
                self.scan_for_stream_end(dict_start)?
            }
        };

        let data = self.lexer.cursor().slice(start, end);
        let decrypted = self.decrypt(id, &data)?;
        let stream = PdfStream::new(dict, data, start..end);
        Ok(PdfObject::Stream(match decrypted {
            Some(plain) => stream.with_decrypted(plain),
            None => stream,
        }))
    }

    /// Numeric `Length`, following a reference through the registry
    fn declared_length(&self, dict: &PdfDictionary) -> Option<usize> {
        let length = match dict.get("Length")? {
            PdfObject::Reference(id) => self.context.lookup(*id)?,
            direct => direct,
        };
        let usable = match length {
            PdfObject::Integer(i) => usize::try_from(*i).ok(),
            // `/Length 5.0` from sloppy writers
            PdfObject::Real(r) if r.fract() == 0.0 && *r >= 0.0 => Some(*r as usize),
            _ => None,
        };
        if usable.is_none() {
            tracing::debug!("Ignoring unusable stream Length {:?}", length);
        }
        usable
    }

    /// End offset if `endstream` follows `length` bytes after `start`
    fn confirm_declared_end(&mut self, start: usize, length: usize) -> Option<usize> {
        let end = start.checked_add(length)?;
        self.lexer.cursor_mut().move_to(end).ok()?;
        self.lexer.skip_whitespace_and_comments();
        self.lexer.match_keyword(keywords::ENDSTREAM).then_some(end)
    }

    /// Find the `endstream` balancing the current stream, counting any
    /// nested `stream` keywords
    fn scan_for_stream_end(&mut self, stream_start: usize) -> ParseResult<usize> {
        tracing::debug!(
            "Scanning for endstream of stream at offset {}",
            stream_start
        );

        let mut nesting = 1usize;
        while !self.lexer.cursor().done() {
            let before = self.offset();
            if self
                .lexer
                .match_any_keyword(&keywords::STREAM_CLOSERS)
                .is_some()
            {
                nesting -= 1;
                if nesting == 0 {
                    return Ok(before);
                }
            } else if self.lexer.match_keyword(keywords::STREAM) {
                nesting += 1;
            } else {
                self.lexer.cursor_mut().next_byte();
            }
        }

        Err(ParseError::StreamBoundary {
            position: self.lexer.cursor().position_at(stream_start),
        })
    }

    /// Plaintext of `data` under `id`, or `None` when nothing applies
    fn decrypt(&self, id: Option<ObjectId>, data: &[u8]) -> ParseResult<Option<Vec<u8>>> {
        let (Some(id), Some(factory)) = (id, self.context.crypto()) else {
            return Ok(None);
        };
        decrypt_for(factory.as_ref(), id, data)
            .map(Some)
            .map_err(|source| ParseError::Decryption { id, source })
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Names are usually UTF-8; anything else is kept byte for byte as Latin-1
fn name_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| latin1(err.as_bytes()))
}
