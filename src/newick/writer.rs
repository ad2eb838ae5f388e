//! Newick format writing.

use crate::model::support::Support;
use crate::model::tree::{PhyloTree, VertexIndex};
use crate::model::vertex::{BranchLength, Vertex};
use crate::newick::defs::{BUFFER_CHARS, MULTI_SUPPORT_SEPARATOR};
use crate::parser::utils::escape_label;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Style for serializing a tree to Newick format,
/// controlling which labels inner vertices get.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewickStyle {
    /// Bare topology with leaf names and branch lengths
    Topology,
    /// Inner vertices labelled with their support value, or their name
    #[default]
    Support,
    /// Inner vertices labelled with merged supports, e.g. `100/87/-`,
    /// falling back to [NewickStyle::Support]
    MultiSupport,
}

/// Writes given list of trees to a file in Newick format, one tree per line.
///
/// # Arguments
/// * `file` - The file to write to
/// * `trees` - Trees to write
/// * `style` - Which inner labels to write
///
/// # Errors
/// Returns an I/O error if writing fails.
pub fn write_newick_file(file: File, trees: &[PhyloTree], style: NewickStyle) -> io::Result<()> {
    let Some(first) = trees.first() else {
        return Ok(());
    };

    let mut writer = BufWriter::new(file);
    let estimated_capacity = estimate_newick_len(first);
    for tree in trees {
        let newick = to_newick_with_capacity(tree, style, estimated_capacity);
        writer.write_all(newick.as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

/// Returns the Newick representation of this tree with closing semicolon.
///
/// # Example
/// ```
/// use fungphy::newick::{parse_str, to_newick, NewickStyle};
///
/// let tree = parse_str("((A:1,B:2)95:0.5,C:1);").unwrap();
/// assert_eq!(to_newick(&tree, NewickStyle::Support), "((A:1,B:2)95:0.5,C:1);");
/// assert_eq!(to_newick(&tree, NewickStyle::Topology), "((A:1,B:2):0.5,C:1);");
/// ```
pub fn to_newick(tree: &PhyloTree, style: NewickStyle) -> String {
    to_newick_with_capacity(tree, style, estimate_newick_len(tree))
}

/// Returns the Newick representation of a tree with pre-allocated capacity.
pub(crate) fn to_newick_with_capacity(
    tree: &PhyloTree,
    style: NewickStyle,
    estimated_capacity: usize,
) -> String {
    // Helper for adding branch lengths
    fn build_newick_branch_length(newick: &mut String, branch_length: Option<BranchLength>) {
        if let Some(branch_length) = branch_length {
            newick.push(':');
            newick.push_str(&(*branch_length).to_string());
        }
    }

    // Recursive helper for building the Newick string
    fn build_newick(tree: &PhyloTree, newick: &mut String, index: VertexIndex, style: NewickStyle) {
        let vertex = &tree[index];

        if vertex.is_leaf() {
            if let Some(name) = vertex.name() {
                newick.push_str(&escape_label(name));
            }
        } else {
            newick.push('(');
            for (i, &child) in vertex.children().iter().enumerate() {
                if i > 0 {
                    newick.push(',');
                }
                build_newick(tree, newick, child, style);
            }
            newick.push(')');

            if let Some(label) = inner_label(vertex, style) {
                newick.push_str(&escape_label(&label));
            }
        }

        if !vertex.is_root() {
            build_newick_branch_length(newick, vertex.branch_length());
        }
    }

    let mut newick = String::with_capacity(estimated_capacity);
    if tree.is_root_set() {
        build_newick(tree, &mut newick, tree.root_index(), style);
    }
    newick.push(';');

    newick
}

/// Label written after the closing parenthesis of an inner vertex.
fn inner_label(vertex: &Vertex, style: NewickStyle) -> Option<String> {
    let support_or_name = || {
        vertex
            .support()
            .map(|s| Support::Value(s).to_string())
            .or_else(|| vertex.name().map(str::to_string))
    };

    match style {
        NewickStyle::Topology => None,
        NewickStyle::Support => support_or_name(),
        NewickStyle::MultiSupport => match vertex.multi_support() {
            Some(supports) => Some(
                supports
                    .iter()
                    .map(Support::to_string)
                    .collect::<Vec<_>>()
                    .join(&MULTI_SUPPORT_SEPARATOR.to_string()),
            ),
            None => support_or_name(),
        },
    }
}

/// Estimates the length of a Newick string for a given tree.
///
/// Used to pre-allocate string capacity for efficient writing.
pub(crate) fn estimate_newick_len(tree: &PhyloTree) -> usize {
    // Each inner vertex: "()" plus a support label, e.g. "100"
    const INNER_VERTEX_CHARS: usize = 6;
    // Branch lengths: ~20 chars each (e.g., ":0.009529961339106089")
    const BRANCH_LENGTH_CHARS: usize = 20;

    let label_capacity: usize = tree
        .vertices()
        .iter()
        .filter(|v| v.is_leaf())
        .filter_map(|v| v.name())
        .map(|name| name.len() + 1) // +1 for ','
        .sum();
    let structure_capacity = (tree.num_vertices() - tree.num_leaves()) * INNER_VERTEX_CHARS;
    let branch_capacity = if tree.vertices_have_branch_lengths() {
        tree.num_vertices() * BRANCH_LENGTH_CHARS
    } else {
        0
    };

    label_capacity + structure_capacity + branch_capacity + BUFFER_CHARS
}
