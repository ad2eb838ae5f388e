//! Tree annotation: support merging, outgroup rooting, leaf labels and
//! section overlays.
//!
//! The overlay lives next to the tree in an [AnnotatedTree]; the tree
//! itself only gains merged supports and a new root.
//!
//! # Example
//! ```
//! use fungphy::annotate::TreeAnnotator;
//! use fungphy::config::AnnotationConfig;
//! use fungphy::model::TaxonMetadata;
//! use fungphy::newick::parse_str;
//! use std::collections::HashMap;
//!
//! let mut taxa = HashMap::new();
//! for (id, epithet) in [("1", "niger"), ("2", "tubingensis"), ("3", "flavus")] {
//!     taxa.insert(id.to_string(), TaxonMetadata::new("Aspergillus", epithet));
//! }
//! let config = AnnotationConfig {
//!     outgroup: vec!["flavus".to_string()],
//!     ..Default::default()
//! };
//!
//! let trees = vec![parse_str("(1,2,3);").unwrap(), parse_str("(1,(2,3)70);").unwrap()];
//! let annotated = TreeAnnotator::new(&taxa, config).annotate(trees).unwrap();
//! assert!(annotated.tree().is_rooted());
//! ```

pub mod display;
pub mod labels;
pub mod merge;
pub mod outgroup;
pub mod sections;

pub use labels::LeafLabel;
pub use merge::merge_support_values;
pub use outgroup::root_on_outgroup;
pub use sections::SectionAnnotation;

use crate::config::AnnotationConfig;
use crate::error::{PipelineError, Result};
use crate::model::support::SupportScale;
use crate::model::taxon::TaxonLookup;
use crate::model::tree::{PhyloTree, VertexIndex};
use crate::newick::NewickStyle;
use log::debug;
use std::fmt::Write;

// =#========================================================================#=
// TREE ANNOTATOR
// =#========================================================================#=
/// Annotates trees with taxon metadata from a [TaxonLookup].
pub struct TreeAnnotator<L> {
    lookup: L,
    config: AnnotationConfig,
}

impl<L: TaxonLookup> TreeAnnotator<L> {
    /// Creates an annotator resolving leaves through `lookup`.
    pub fn new(lookup: L, config: AnnotationConfig) -> Self {
        Self { lookup, config }
    }

    /// The configuration in use
    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    /// Roots, merges and decorates `trees`.
    ///
    /// Each tree is rooted on the configured outgroup first, so clades are
    /// compared under the same rooting. With more than one tree, supports of
    /// all trees are merged onto the first one.
    ///
    /// # Errors
    /// * `EmptyInput` if `trees` is empty
    /// * `NoOutgroupMatch` if an outgroup is set and matches no leaf of a tree
    /// * `LeafSetMismatch` if leaf sets differ in strict mode
    pub fn annotate(&self, mut trees: Vec<PhyloTree>) -> Result<AnnotatedTree> {
        if trees.is_empty() {
            return Err(PipelineError::empty_input("trees"));
        }

        if !self.config.outgroup.is_empty() {
            for (i, tree) in trees.iter_mut().enumerate() {
                if tree.name().is_none() {
                    tree.set_name(format!("tree #{}", i + 1));
                }
                root_on_outgroup(tree, &self.lookup, &self.config.outgroup)?;
            }
        }

        let mut tree = if trees.len() > 1 {
            merge_support_values(&trees, 0, self.config.strict)?
        } else {
            trees.swap_remove(0)
        };

        if self.config.flip {
            tree.flip();
        }

        debug!(
            "Annotating tree with {} leaves, {} internal vertices, total length {:.4}",
            tree.num_leaves(),
            tree.num_internal(),
            tree.total_branch_length()
        );
        Ok(self.decorate(tree))
    }

    /// Attaches leaf labels and sections to `tree` as is.
    pub fn decorate(&self, tree: PhyloTree) -> AnnotatedTree {
        let leaf_labels = labels::label_leaves(&tree, &self.lookup, &self.config);
        let sections = sections::annotate_sections(&tree, &self.lookup, &self.config);
        AnnotatedTree {
            tree,
            leaf_labels,
            sections,
            scale: self.config.support_scale,
        }
    }
}

// =#========================================================================#=
// ANNOTATED TREE
// =#========================================================================#=
/// A tree together with its display overlay.
#[derive(Debug, Clone)]
pub struct AnnotatedTree {
    tree: PhyloTree,
    /// Indexed by vertex
    leaf_labels: Vec<Option<LeafLabel>>,
    sections: Vec<SectionAnnotation>,
    scale: SupportScale,
}

impl AnnotatedTree {
    /// The rooted, merged tree
    pub fn tree(&self) -> &PhyloTree {
        &self.tree
    }

    /// Label of leaf `index`, `None` for inner vertices and unknown taxa
    pub fn leaf_label(&self, index: VertexIndex) -> Option<&LeafLabel> {
        self.leaf_labels.get(index).and_then(Option::as_ref)
    }

    /// Section overlays in encounter order
    pub fn sections(&self) -> &[SectionAnnotation] {
        &self.sections
    }

    /// Support label of vertex `index`, see [display::support_label]
    pub fn support_label(&self, index: VertexIndex) -> Option<String> {
        display::support_label(&self.tree, index, self.scale)
    }

    /// Newick string of the tree, merged supports as `a/b/c` labels.
    pub fn to_newick(&self) -> String {
        self.tree.to_newick(NewickStyle::MultiSupport)
    }

    /// Renders the tree as indented text with leaf labels, support labels
    /// and a legend of the sections.
    pub fn render_text(&self) -> String {
        let mut out = self.tree.draw(|vertex| {
            let index = vertex.index();
            if vertex.is_leaf() {
                let mut text = match self.leaf_label(index) {
                    Some(label) => label.to_string(),
                    None => vertex.name().unwrap_or_default().to_string(),
                };
                for section in self.sections.iter().filter(|s| s.anchor == index) {
                    let _ = write!(text, "  <{}>", section.section);
                }
                text
            } else {
                self.support_label(index).unwrap_or_default()
            }
        });

        for section in &self.sections {
            let _ = writeln!(
                out,
                "{} {}: {} leaves below [{}]",
                section.color,
                section.section,
                section.leaves.len(),
                section.vertex
            );
        }
        out
    }
}
