//! Error types for parsing Newick strings, partition files, FASTA and
//! tabular input.
//!
//! This module provides [ParsingError] and [ParsingErrorType] for
//! representing and reporting errors that occur while reading the inputs of
//! the pipeline.

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use std::error::Error;
use std::fmt;

/// Default length of context provided by error from parser
const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSING ERROR TYPE
// =#========================================================================#=
/// Error types that can occur while parsing input files.
#[derive(PartialEq, Debug, Clone)]
pub enum ParsingErrorType {
    IoError(String),
    UnexpectedEOF,
    UnclosedComment,
    InvalidNewickString(String),
    InvalidPartition(String),
    InvalidFasta(String),
    InvalidTable(String),
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================#=
/// Parsing error with contextual information (position and surrounding bytes).
#[derive(Debug)]
pub struct ParsingError {
    kind: ParsingErrorType,
    position: usize,
    context: String,
}

impl ParsingError {
    /// Create a [ParsingError] from an error type and parser state
    pub fn from_parser<S: ByteSource>(kind: ParsingErrorType, parser: &ByteParser<S>) -> Self {
        Self {
            kind,
            position: parser.position(),
            context: parser.get_context_as_string(DEFAULT_CONTEXT_LENGTH),
        }
    }

    /// Create a [ParsingError] without parser context (e.g. for line-based formats)
    pub fn without_context(kind: ParsingErrorType) -> Self {
        Self {
            kind,
            position: 0,
            context: String::new(),
        }
    }

    /// Convenience constructor for UnexpectedEOF
    pub fn unexpected_eof<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnexpectedEOF, parser)
    }

    /// Convenience constructor for UnclosedComment
    pub fn unclosed_comment<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedComment, parser)
    }

    /// Convenience constructor for InvalidNewickString
    pub fn invalid_newick_string<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidNewickString(msg), parser)
    }

    /// Convenience constructor for InvalidPartition
    pub fn invalid_partition<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidPartition(msg), parser)
    }

    /// Convenience constructor for InvalidFasta
    pub fn invalid_fasta(msg: String) -> Self {
        Self::without_context(ParsingErrorType::InvalidFasta(msg))
    }

    /// Convenience constructor for InvalidTable
    pub fn invalid_table(msg: String) -> Self {
        Self::without_context(ParsingErrorType::InvalidTable(msg))
    }

    /// Get the error kind
    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Get the position where the error occurred
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ParsingErrorType::IoError(msg) => write!(f, "IO error - {msg}")?,
            ParsingErrorType::UnexpectedEOF => write!(f, "Unexpected end of file")?,
            ParsingErrorType::UnclosedComment => write!(f, "Unclosed comment")?,
            ParsingErrorType::InvalidNewickString(msg) => {
                write!(f, "Invalid newick string: {msg}")?
            }
            ParsingErrorType::InvalidPartition(msg) => write!(f, "Invalid partition - {msg}")?,
            ParsingErrorType::InvalidFasta(msg) => write!(f, "Invalid FASTA - {msg}")?,
            ParsingErrorType::InvalidTable(msg) => write!(f, "Invalid table - {msg}")?,
        }

        // Line-based formats report without byte position
        if !self.context.is_empty() || self.position > 0 {
            write!(f, " at position {}", self.position)?;
        }

        if !self.context.is_empty() {
            write!(
                f,
                "\n  Context (next {} bytes): {}",
                self.context.len(),
                self.context
            )?;
        }

        Ok(())
    }
}

impl Error for ParsingError {}

impl From<std::io::Error> for ParsingError {
    fn from(err: std::io::Error) -> Self {
        Self::without_context(ParsingErrorType::IoError(err.to_string()))
    }
}

impl From<csv::Error> for ParsingError {
    fn from(err: csv::Error) -> Self {
        Self::invalid_table(err.to_string())
    }
}
