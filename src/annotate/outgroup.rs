//! Rooting trees on an outgroup given by species names.

use crate::error::{PipelineError, Result};
use crate::model::taxon::TaxonLookup;
use crate::model::tree::{PhyloTree, VertexIndex};
use log::{info, warn};

/// Returns the leaves whose taxon matches any of the species `names`.
pub fn find_outgroup_leaves<L: TaxonLookup>(
    tree: &PhyloTree,
    lookup: &L,
    names: &[String],
) -> Vec<VertexIndex> {
    tree.leaf_indices()
        .into_iter()
        .filter(|&leaf| {
            tree[leaf]
                .name()
                .and_then(|id| lookup.taxon(id))
                .is_some_and(|taxon| names.iter().any(|n| taxon.matches_species(n)))
        })
        .collect()
}

/// Roots `tree` on the leaf matching `names`, or on the most recent common
/// ancestor if several leaves match.
///
/// If that ancestor is the current root, the tree is first rerooted on a
/// leaf outside the outgroup, so the outgroup becomes a clade.
///
/// # Errors
/// `NoOutgroupMatch` naming the tree if no leaf matches.
pub fn root_on_outgroup<L: TaxonLookup>(
    tree: &mut PhyloTree,
    lookup: &L,
    names: &[String],
) -> Result<()> {
    let subject = tree.name().unwrap_or("tree").to_string();

    let leaves = find_outgroup_leaves(tree, lookup, names);
    let Some(mut target) = tree.mrca(&leaves) else {
        return Err(PipelineError::no_outgroup_match(subject, names));
    };

    if target == tree.root_index() {
        let Some(pivot) = tree
            .leaf_indices()
            .into_iter()
            .find(|leaf| !leaves.contains(leaf))
        else {
            warn!("Outgroup of {subject} spans all leaves, leaving root in place");
            return Ok(());
        };

        tree.set_outgroup(pivot);
        let leaves = find_outgroup_leaves(tree, lookup, names);
        match tree.mrca(&leaves) {
            Some(mrca) => target = mrca,
            None => return Err(PipelineError::no_outgroup_match(subject, names)),
        }
    }

    // Indices change on rerooting
    let outgroup: Vec<String> = tree
        .leaf_names_below(target)
        .into_iter()
        .map(str::to_string)
        .collect();
    tree.set_outgroup(target);
    info!("Rooted {} on outgroup {}", subject, outgroup.join(", "));
    Ok(())
}
