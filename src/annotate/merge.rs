//! Merging support values of several analyses onto one tree.
//!
//! Clades are matched by the set of leaf names below them, so differences in
//! child order or elsewhere in the topology don't prevent a match.
//! Precomputing all clades per tree makes this O(N · L log L) per tree
//! rather than the pairwise O(N² · L); it is still meant for trees of tens
//! to a few hundred leaves.

use crate::error::{PipelineError, Result};
use crate::model::support::Support;
use crate::model::tree::{PhyloTree, VertexIndex};
use log::{debug, warn};
use std::collections::HashMap;

/// Subject naming tree `index` of the merge input in errors and logs.
pub(crate) fn tree_subject(tree: &PhyloTree, index: usize) -> String {
    match tree.name() {
        Some(name) => name.to_string(),
        None => format!("tree #{}", index + 1),
    }
}

/// Copies `trees[base_index]` and attaches to each of its inner, non-root
/// vertices the supports of the matching clade in every tree.
///
/// # Arguments
/// * `trees` - Analyses to merge, in the order their values are listed
/// * `base_index` - Tree whose topology is kept
/// * `strict` - Fail instead of annotating partially if leaf sets differ
///
/// # Returns
/// The base tree with `multi_support` set on every inner, non-root vertex:
/// the base support first, then one entry per other tree in input order,
/// [Support::Missing] where the clade is absent or carries no value.
///
/// # Errors
/// * `EmptyInput` if `trees` is empty or `base_index` is out of range
/// * `LeafSetMismatch` in strict mode, naming the first deviating tree
pub fn merge_support_values(
    trees: &[PhyloTree],
    base_index: usize,
    strict: bool,
) -> Result<PhyloTree> {
    if trees.is_empty() {
        return Err(PipelineError::empty_input("trees"));
    }
    let Some(base) = trees.get(base_index) else {
        return Err(PipelineError::empty_input(format!("tree #{}", base_index + 1)));
    };
    let base_subject = tree_subject(base, base_index);

    let others: Vec<(usize, &PhyloTree)> = trees
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != base_index)
        .collect();

    check_leaf_sets(base, &base_subject, &others, strict)?;

    let other_clades: Vec<(&PhyloTree, HashMap<Vec<&str>, VertexIndex>)> = others
        .iter()
        .map(|&(_, tree)| (tree, clade_index(tree)))
        .collect();

    let base_clades = base.clades();
    let mut assignments = Vec::new();
    let mut num_unmatched = 0;
    for vertex in base.pre_order_iter() {
        if vertex.is_leaf() || vertex.is_root() {
            continue;
        }

        let clade = &base_clades[vertex.index()];
        let mut supports = Vec::with_capacity(trees.len());
        supports.push(Support::from(vertex.support()));
        for (tree, index) in &other_clades {
            match index.get(clade) {
                Some(&matched) => supports.push(Support::from(tree[matched].support())),
                None => {
                    num_unmatched += 1;
                    supports.push(Support::Missing);
                }
            }
        }
        assignments.push((vertex.index(), supports));
    }

    debug!(
        "Merged supports of {} trees onto {} clades of {} ({} unmatched)",
        trees.len(),
        assignments.len(),
        base_subject,
        num_unmatched
    );

    let mut merged = base.clone();
    for (index, supports) in assignments {
        merged.vertex_mut(index).set_multi_support(Some(supports));
    }
    Ok(merged)
}

/// Maps the sorted leaf names of every non-root clade to its vertex.
fn clade_index(tree: &PhyloTree) -> HashMap<Vec<&str>, VertexIndex> {
    let mut index = HashMap::with_capacity(tree.num_vertices());
    for (vertex_index, clade) in tree.clades().into_iter().enumerate() {
        if tree[vertex_index].is_root() {
            continue;
        }
        // Unary vertices share the clade of their child
        index.entry(clade).or_insert(vertex_index);
    }
    index
}

fn check_leaf_sets(
    base: &PhyloTree,
    base_subject: &str,
    others: &[(usize, &PhyloTree)],
    strict: bool,
) -> Result<()> {
    let mut base_leaves = base.leaf_names();
    base_leaves.sort_unstable();

    for &(i, tree) in others {
        let mut leaves = tree.leaf_names();
        leaves.sort_unstable();
        if leaves == base_leaves {
            continue;
        }

        let subject = tree_subject(tree, i);
        let msg = format!(
            "{} leaves, {} in {}",
            leaves.len(),
            base_leaves.len(),
            base_subject
        );
        if strict {
            return Err(PipelineError::leaf_set_mismatch(subject, msg));
        }
        warn!("Leaf set of {subject} differs ({msg}), merging partially");
    }
    Ok(())
}
