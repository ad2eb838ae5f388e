//! Data model of the pipeline.
//!
//! * Sequences: [SequenceSet] of one marker, [MarkerAlignment] after
//!   alignment, [Supermatrix] after concatenation with its [Partition]s
//! * Trees: [PhyloTree] over [Vertex]es carrying [Support] values
//! * Taxonomy: [TaxonMetadata] resolved through a [TaxonLookup]

/// Aligned sequences of one marker
pub mod alignment;
/// Column ranges of a supermatrix
pub mod partition;
/// Identified sequences
pub mod sequence;
/// Concatenation of alignments
pub mod supermatrix;
/// Support values and scales
pub mod support;
/// Taxonomic metadata of leaves
pub mod taxon;
/// Phylogenetic tree structure and operations
pub mod tree;
/// Tree vertex and branch length
pub mod vertex;

pub use alignment::MarkerAlignment;
pub use partition::Partition;
pub use sequence::{SequenceRecord, SequenceSet};
pub use supermatrix::{Supermatrix, SupermatrixBuilder, TaxonPolicy};
pub use support::{Support, SupportScale};
pub use taxon::{TaxonLookup, TaxonMetadata};
pub use tree::{PhyloTree, VertexIndex};
pub use vertex::{BranchLength, Vertex};
