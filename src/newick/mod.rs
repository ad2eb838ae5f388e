//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick format strings
//! into [`PhyloTree`]s, and [`to_newick`] / [`write_newick_file`] to write
//! them back.
//!
//! # Quick API
//! For simple use cases with default settings:
//! * [`parse_file`] - parses a file, returns all [`PhyloTree`]s
//! * [`parse_reader`] - parses everything a reader yields, e.g. stdin
//! * [`parse_str`] - parses a single string, returns a [`PhyloTree`]
//!
//! # Full API
//! For more control, configure a [`NewickParser`] and provide a [`ByteParser`]:
//! * [`NewickParser::parse_str`] - parse a single tree
//! * [`NewickParser::parse_all`] - parse all trees until EOF
//!
//! # Format
//! The Newick format has the following simple grammar:
//! * `tree ::= vertex ';'`
//! * `vertex ::= leaf | inner_vertex`
//! * `inner_vertex ::= '(' vertex (',' vertex)* ')' [label] [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Comments are square brackets and can occur anywhere where whitespace is allowed
//! * Labels of inner vertices carry support values as written by tree
//!   inference tools, e.g. `(A,B)95:0.01`

mod defs;
mod parser;
pub mod writer;

pub use self::parser::NewickParser;
pub use self::writer::{NewickStyle, to_newick, write_newick_file};

use crate::model::PhyloTree;
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;
use std::io::Read;
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a Newick file eagerly and returns all trees.
///
/// Trees are named after the file, with a `#n` suffix (1-based) if the file
/// holds more than one tree, so that errors about them can name their source.
///
/// # Arguments
/// * `path` - Path to the file with semicolon-separated list of Newick strings
///
/// # Returns
/// * `Vec<PhyloTree>` - All parsed trees
/// * [`ParsingError`] - If file reading fails or Newick format is invalid
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<PhyloTree>, ParsingError> {
    let byte_parser = ByteParser::from_file(path.as_ref())?;
    let trees = NewickParser::new().parse_all(byte_parser)?;
    Ok(name_trees(trees, &path.as_ref().display().to_string()))
}

/// Parses all trees `reader` yields, e.g. standard input, naming them after
/// `source` like [parse_file] does.
pub fn parse_reader<R: Read>(reader: R, source: &str) -> Result<Vec<PhyloTree>, ParsingError> {
    let trees = NewickParser::new().parse_all(ByteParser::from_reader(reader)?)?;
    Ok(name_trees(trees, source))
}

fn name_trees(mut trees: Vec<PhyloTree>, source: &str) -> Vec<PhyloTree> {
    let multiple = trees.len() > 1;
    for (i, tree) in trees.iter_mut().enumerate() {
        if multiple {
            tree.set_name(format!("{}#{}", source, i + 1));
        } else {
            tree.set_name(source.to_string());
        }
    }
    trees
}

/// Parses a single Newick string to obtain a [`PhyloTree`].
///
/// # Example
/// ```
/// use fungphy::newick::parse_str;
///
/// let tree = parse_str("(1042,(2210,3377)98);").unwrap();
/// assert_eq!(tree.leaf_names(), vec!["1042", "2210", "3377"]);
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<PhyloTree, ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    NewickParser::new().parse_str(&mut byte_parser)
}
