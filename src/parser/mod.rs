//! Low-level parsing infrastructure.
//!
//! Provides the byte parser shared by the Newick reader and the partition
//! file reader, the [ParsingError] type reported for all malformed input,
//! and label escaping helpers.

pub mod byte_parser;
pub mod byte_source;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParsingError, ParsingErrorType};
