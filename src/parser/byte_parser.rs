//! Low-level byte-by-byte parser for ASCII text.
//!
//! This module provides [ByteParser] for text-based formats with support
//! for peeking, consuming, comment skipping, quote-aware label parsing and
//! number parsing. Used as the foundation for the Newick parser and the
//! partition file reader.

use crate::parser::byte_source::{ByteSource, InMemoryByteSource};
use crate::parser::parsing_error::ParsingError;
use std::io::Read;
use std::path::Path;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser for ASCII text.
///
/// # Example
/// ```
/// use fungphy::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  [comment] (A,B);");
/// parser.skip_comment_and_whitespace().unwrap();
/// assert!(parser.consume_if(b'('));
/// assert_eq!(parser.parse_label(b",);").unwrap(), "A");
/// ```
pub struct ByteParser<S: ByteSource> {
    source: S,
}

impl ByteParser<InMemoryByteSource> {
    /// Creates a new [ByteParser] for the given string by copying it.
    pub fn for_str(input: &str) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.as_bytes().to_vec()))
    }

    /// Creates a new [ByteParser] holding the full contents of the file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        Ok(Self::new(InMemoryByteSource::from_file(path)?))
    }

    /// Creates a new [ByteParser] holding everything `reader` yields.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParsingError> {
        Ok(Self::new(InMemoryByteSource::from_reader(reader)?))
    }
}

impl<S: ByteSource> ByteParser<S> {
    /// Creates a new [ByteParser] from a byte source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Peeks at the current byte without consuming it.
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.source.peek()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    /// Skips (consumes) all consecutive whitespace characters.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
                self.next_byte();
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a square bracket comment `[...]` if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    /// * `Err(ParsingError)` - Comment was opened but never closed
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if !self.consume_if(b'[') {
            return Ok(false);
        }

        while let Some(b) = self.next_byte() {
            if b == b']' {
                return Ok(true);
            }
        }

        Err(ParsingError::unclosed_comment(self))
    }

    /// Skips (consumes) all consecutive whitespace and comments.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();

        while self.skip_comment()? {
            self.skip_whitespace();
        }

        Ok(())
    }

    /// Checks if the current byte matches the target byte (case-insensitive for ASCII).
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek()
            .is_some_and(|b| b.eq_ignore_ascii_case(&ch))
    }

    /// Consumes the current byte if it matches the target byte (case-insensitive).
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.next_byte();
            true
        } else {
            false
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }

    /// Returns the current parser position (byte offset) in the input.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Returns a string from up to `k` bytes from the current position for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        String::from_utf8_lossy(&self.source.get_context(k)).into_owned()
    }

    /// Parses a label (quoted or unquoted) with the given delimiter set.
    ///
    /// Leading whitespace and comments are skipped first.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        self.skip_comment_and_whitespace()?;

        if self.peek() == Some(b'\'') {
            self.parse_quoted_label()
        } else {
            Ok(self.parse_unquoted_label(delimiters))
        }
    }

    /// Parses a label enclosed in single quotes, where internal single quotes
    /// are doubled (e.g. `'Wilson''s'` becomes `Wilson's`).
    ///
    /// # Errors
    /// Returns an error if the closing quote is missing.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        self.next_byte(); // opening '

        let mut label = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') => {
                    if self.peek() == Some(b'\'') {
                        label.push(b'\'');
                        self.next_byte();
                    } else {
                        break;
                    }
                }
                Some(b) => label.push(b),
                None => return Err(ParsingError::unexpected_eof(self)),
            }
        }

        Ok(String::from_utf8_lossy(&label).into_owned())
    }

    /// Parses an unquoted label until any of the given delimiters (or EOF) is encountered.
    ///
    /// The delimiter is not consumed.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> String {
        let mut label = Vec::new();
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            label.push(b);
            self.next_byte();
        }

        String::from_utf8_lossy(&label).into_owned()
    }

    /// Consumes the longest run of bytes that can make up a decimal number,
    /// including scientific notation (e.g. `1.5e-10`), and returns it.
    pub fn take_number_str(&mut self) -> String {
        let mut number = String::new();
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                number.push(b as char);
                self.next_byte();
            } else {
                break;
            }
        }
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_comment_and_whitespace() {
        let mut parser = ByteParser::for_str("[Go] \n[Keep going]   \t\n  END");
        parser.skip_comment_and_whitespace().unwrap();
        assert_eq!(parser.next_byte(), Some(b'E'));
    }

    #[test]
    fn test_unclosed_comment() {
        let mut parser = ByteParser::for_str("[never closed");
        assert!(parser.skip_comment().is_err());
    }

    #[test]
    fn test_quoted_label_with_escaped_quote() {
        let mut parser = ByteParser::for_str("'Baillon''s Crake':1.0");
        assert_eq!(parser.parse_label(b":").unwrap(), "Baillon's Crake");
        assert_eq!(parser.peek(), Some(b':'));
    }

    #[test]
    fn test_unterminated_quoted_label() {
        let mut parser = ByteParser::for_str("'open ended");
        assert!(parser.parse_quoted_label().is_err());
    }

    #[test]
    fn test_take_number_str() {
        let mut parser = ByteParser::for_str("1.5e-3,rest");
        assert_eq!(parser.take_number_str(), "1.5e-3");
        assert_eq!(parser.peek(), Some(b','));
    }
}
