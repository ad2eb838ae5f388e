//! Byte sources consumed by [ByteParser](super::ByteParser).
//!
//! Tree files, Newick strings and partition files of a phylogeny run are
//! small, so a single in-memory source serves all of them.

use std::io::Read;
use std::path::Path;

/// UTF-8 byte order mark, written by some editors and spreadsheet exports
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================#=
/// Interface of a source of bytes consumed by a [ByteParser](super::ByteParser).
pub trait ByteSource {
    /// Returns the current byte without consuming it, `None` at the end.
    fn peek(&self) -> Option<u8>;

    /// Returns the current byte and advances past it.
    fn next_byte(&mut self) -> Option<u8>;

    /// Offset of the current byte.
    fn position(&self) -> usize;

    /// Up to `k` bytes from the current position, without consuming them.
    fn peek_slice(&self, k: usize) -> &[u8];

    /// Copy of up to `k` upcoming bytes, reported in error messages.
    fn get_context(&self, k: usize) -> Vec<u8> {
        self.peek_slice(k).to_vec()
    }

    fn is_eof(&self) -> bool;
}

// =#========================================================================#=
// IN MEMORY BYTE SOURCE
// =#========================================================================#=
/// Byte source owning the complete input.
///
/// A leading UTF-8 byte order mark is skipped; positions still count from
/// the first byte of the input.
pub struct InMemoryByteSource {
    input: Vec<u8>,
    pos: usize,
}

impl InMemoryByteSource {
    /// Wraps `bytes`.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let pos = if bytes.starts_with(UTF8_BOM) {
            UTF8_BOM.len()
        } else {
            0
        };
        Self { input: bytes, pos }
    }

    /// Reads `reader` to its end.
    pub fn from_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents)?;
        Ok(Self::from_vec(contents))
    }

    /// Reads the entire file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::from_vec(std::fs::read(path)?))
    }
}

impl ByteSource for InMemoryByteSource {
    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    fn peek_slice(&self, k: usize) -> &[u8] {
        let start = self.pos.min(self.input.len());
        let end = self.pos.saturating_add(k).min(self.input.len());
        &self.input[start..end]
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_byte_order_mark() {
        let mut source = InMemoryByteSource::from_vec(b"\xEF\xBB\xBF(A,B);".to_vec());
        assert_eq!(source.position(), 3);
        assert_eq!(source.next_byte(), Some(b'('));
        assert_eq!(source.peek_slice(100), b"A,B);");
    }

    #[test]
    fn test_from_reader() {
        let mut source = InMemoryByteSource::from_reader("ITS = 1-4".as_bytes()).unwrap();
        assert_eq!(source.get_context(3), b"ITS".to_vec());
        while source.next_byte().is_some() {}
        assert!(source.is_eof());
        assert!(source.peek_slice(5).is_empty());
    }
}
