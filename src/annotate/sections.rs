//! Colored overlays for taxonomic sections.

use crate::config::{AnnotationConfig, DEFAULT_PALETTE};
use crate::model::taxon::TaxonLookup;
use crate::model::tree::{PhyloTree, VertexIndex};
use std::collections::HashMap;

/// A section drawn onto the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionAnnotation {
    /// Section name
    pub section: String,
    /// Display color from the palette
    pub color: String,
    /// Most recent common ancestor of the section's leaves, or its only leaf
    pub vertex: VertexIndex,
    /// Leaf the section label is placed at, the first one encountered
    pub anchor: VertexIndex,
    /// All leaves of the section in pre-order
    pub leaves: Vec<VertexIndex>,
}

/// Groups leaves by section and places one annotation per section.
///
/// Sections are ordered by their first leaf in pre-order and colored by
/// cycling through the palette. Leaves without section, or whose section
/// equals the configured exclusion marker (ignoring ASCII case), are
/// skipped.
pub fn annotate_sections<L: TaxonLookup>(
    tree: &PhyloTree,
    lookup: &L,
    config: &AnnotationConfig,
) -> Vec<SectionAnnotation> {
    let mut groups: Vec<(String, Vec<VertexIndex>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for leaf in tree.leaf_indices() {
        let section = tree[leaf]
            .name()
            .and_then(|id| lookup.taxon(id))
            .and_then(|taxon| taxon.section.as_deref());
        let Some(section) = section else {
            continue;
        };
        if config
            .exclude_section
            .as_deref()
            .is_some_and(|excluded| excluded.eq_ignore_ascii_case(section))
        {
            continue;
        }

        match positions.get(section) {
            Some(&position) => groups[position].1.push(leaf),
            None => {
                positions.insert(section.to_string(), groups.len());
                groups.push((section.to_string(), vec![leaf]));
            }
        }
    }

    let palette: Vec<&str> = if config.palette.is_empty() {
        DEFAULT_PALETTE.to_vec()
    } else {
        config.palette.iter().map(String::as_str).collect()
    };

    groups
        .into_iter()
        .enumerate()
        .filter_map(|(i, (section, leaves))| {
            let vertex = tree.mrca(&leaves)?;
            Some(SectionAnnotation {
                section,
                color: palette[i % palette.len()].to_string(),
                vertex,
                anchor: leaves[0],
                leaves,
            })
        })
        .collect()
}
