//! Structs and logic to parse Newick strings.
//!
//! This module provides the [NewickParser] struct, which offers methods
//! to parse files or single strings into [PhyloTree]s.

use crate::model::support::Support;
use crate::model::tree::{PhyloTree, VertexIndex};
use crate::model::vertex::BranchLength;
use crate::newick::defs::{MULTI_SUPPORT_SEPARATOR, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;
use log::warn;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================#=
/// Parser (configuration) for single/multiple Newick format phylogenetic
/// trees with any number of children per vertex.
///
/// # Configuration
/// * [`with_supports(bool)`](Self::with_supports)
///     - Whether labels of inner vertices that are numbers (`95`, `0.87`) or
///       merged supports (`100/87/-`) are read as support values (default)
///       or kept as vertex names.
///
/// # Parsing
/// * [`parse_str`](Self::parse_str) - Parse single tree
/// * [`parse_all`](Self::parse_all) - Parse all trees eagerly
///
/// # Example
/// ```
/// use fungphy::newick::NewickParser;
/// use fungphy::parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("((1:0.1,2:0.2)95:0.05,3:0.3,4:0.1);");
/// let tree = NewickParser::new().parse_str(&mut byte_parser).unwrap();
/// assert_eq!(tree.num_leaves(), 4);
/// assert_eq!(tree.root().children().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct NewickParser {
    parse_supports: bool,
}

impl Default for NewickParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NewickParser {
    /// Creates a new [NewickParser] reading numeric inner labels as supports.
    pub fn new() -> Self {
        Self {
            parse_supports: true,
        }
    }

    /// Configures whether numeric inner labels are read as support values.
    pub fn with_supports(mut self, parse_supports: bool) -> Self {
        self.parse_supports = parse_supports;
        self
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl NewickParser {
    /// Parses all Newick trees from the byte source until EOF.
    ///
    /// # Arguments
    /// * `byte_parser` - A byte parser with underlying source containing only
    ///   Newick strings, except for whitespace and `[...]` comments.
    ///
    /// # Returns
    /// * `Ok(Vec<PhyloTree>)` - All parsed trees
    /// * `Err(ParsingError)` - If any tree fails to parse
    pub fn parse_all<B: ByteSource>(
        &self,
        mut byte_parser: ByteParser<B>,
    ) -> Result<Vec<PhyloTree>, ParsingError> {
        let mut trees = Vec::new();
        loop {
            byte_parser.skip_comment_and_whitespace()?;
            if byte_parser.is_eof() {
                break;
            }
            trees.push(self.parse_str(&mut byte_parser)?);
        }
        Ok(trees)
    }

    /// Parses a single Newick tree from the given [ByteParser].
    ///
    /// # Arguments
    /// * `parser` - The byte parser positioned at the start of a Newick tree string
    ///
    /// # Returns
    /// * `Ok(PhyloTree)` - The parsed phylogenetic tree
    /// * `Err(ParsingError)` - If the Newick format is invalid
    pub fn parse_str<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
    ) -> Result<PhyloTree, ParsingError> {
        let mut tree = PhyloTree::new();

        parser.skip_comment_and_whitespace()?;
        let root_index = self.parse_vertex(parser, &mut tree)?;

        // Consume the terminating semicolon
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }

        tree.set_root(root_index);
        Ok(tree)
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl NewickParser {
    /// Parses a vertex (either inner vertex or leaf) and returns its index:
    /// - Skips leading comments and whitespace
    /// - Dispatches to `parse_inner_vertex` if starts with `(`, otherwise `parse_leaf`
    fn parse_vertex<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        tree: &mut PhyloTree,
    ) -> Result<VertexIndex, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.peek_is(b'(') {
            self.parse_inner_vertex(parser, tree)
        } else {
            self.parse_leaf(parser, tree)
        }
    }

    /// Parses inner vertex, adds it to tree, and returns its index:
    /// - `(child[,child...])[label][:branch_length]`
    fn parse_inner_vertex<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        tree: &mut PhyloTree,
    ) -> Result<VertexIndex, ParsingError> {
        let children = self.parse_children(parser, tree)?;
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        let branch_length = self.parse_branch_length(parser)?;

        let index = tree.add_inner(children, branch_length);
        self.apply_inner_label(tree, index, label);

        Ok(index)
    }

    /// Parses the parenthesized children list and returns their indices:
    /// - Expects parser at opening `(`
    fn parse_children<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        tree: &mut PhyloTree,
    ) -> Result<Vec<VertexIndex>, ParsingError> {
        if !parser.consume_if(b'(') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected '(' before children but found {:?}", next_char),
            ));
        }

        let mut children = Vec::new();
        loop {
            children.push(self.parse_vertex(parser, tree)?);

            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b',') {
                continue;
            }
            if parser.consume_if(b')') {
                break;
            }

            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ',' or ')' after child but found {:?}", next_char),
            ));
        }

        Ok(children)
    }

    /// Parses leaf vertex and adds it to tree:
    /// - `label[:branch_length]`
    /// - Expects parser at start of label
    fn parse_leaf<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        tree: &mut PhyloTree,
    ) -> Result<VertexIndex, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        if label.is_empty() {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected leaf label but found {:?}", next_char),
            ));
        }

        let branch_length = self.parse_branch_length(parser)?;
        Ok(tree.add_leaf(label, branch_length))
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports scientific notation (e.g., `1.5e-10`)
    /// - Negative lengths, as emitted by some distance methods, are clamped to zero
    fn parse_branch_length<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
    ) -> Result<Option<BranchLength>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let branch_length_str = parser.take_number_str();
        let value: f64 = branch_length_str.parse().map_err(|_| {
            ParsingError::invalid_newick_string(
                parser,
                format!("Invalid branch length: {}", branch_length_str),
            )
        })?;

        match BranchLength::try_new(value) {
            Some(branch_length) => Ok(Some(branch_length)),
            None if value < 0.0 => {
                warn!("Clamping negative branch length {value} to 0");
                Ok(Some(BranchLength::new(0.0)))
            }
            None => Err(ParsingError::invalid_newick_string(
                parser,
                format!("Invalid branch length: {}", branch_length_str),
            )),
        }
    }

    /// Interprets the label of an inner vertex as support, merged supports
    /// or name.
    fn apply_inner_label(&self, tree: &mut PhyloTree, index: VertexIndex, label: String) {
        if label.is_empty() {
            return;
        }

        let vertex = tree.vertex_mut(index);
        if self.parse_supports {
            if let Ok(value) = label.parse::<f64>() {
                vertex.set_support(Some(value));
                return;
            }
            if label.contains(MULTI_SUPPORT_SEPARATOR) {
                let supports: Result<Vec<Support>, _> = label
                    .split(MULTI_SUPPORT_SEPARATOR)
                    .map(str::parse::<Support>)
                    .collect();
                if let Ok(supports) = supports {
                    vertex.set_support(supports.first().and_then(Support::value));
                    vertex.set_multi_support(Some(supports));
                    return;
                }
            }
        }
        vertex.set_name(Some(label));
    }
}
