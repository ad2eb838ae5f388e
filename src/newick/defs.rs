//! Constants for the Newick parser and writer.

/// Newick label delimiters: parentheses, comma, colon, semicolon, whitespace, comment start
pub(crate) const NEWICK_LABEL_DELIMITERS: &[u8] = b"([,:; \n\t\r)]";

/// Separator of the per-tree values in a merged support label, e.g. `100/87/-`
pub(crate) const MULTI_SUPPORT_SEPARATOR: char = '/';

/// Extra buffer in Newick string length/capacity estimate
pub(crate) const BUFFER_CHARS: usize = 10;
