//! Fungphy builds and annotates multi-marker phylogenies of fungal strains.
//!
//! The pipeline runs in stages, each usable on its own:
//! - Alignment: per-marker [SequenceSet]s are aligned with MAFFT or MUSCLE
//!   through an [AlignmentRunner](align::AlignmentRunner), optionally
//!   trimmed of gap-rich columns. Independent markers align in parallel.
//! - Concatenation: a [SupermatrixBuilder] joins marker alignments into one
//!   supermatrix, padding absent taxa with gaps and recording 1-based
//!   partitions (`ITS = 1-520`). A partitioned alignment can be split back.
//! - Tree inference: [FastTree](align::FastTree) runs on the supermatrix.
//! - Annotation: a [TreeAnnotator](annotate::TreeAnnotator) roots trees on
//!   an outgroup, merges the supports of several trees of the same taxa,
//!   and derives leaf labels and section overlays from taxon metadata.
//!
//! Around the pipeline:
//! - Newick reading and writing ([newick]), FASTA I/O ([fasta]), RAxML-style
//!   partition files ([model::partition]).
//! - A flat-file [StrainStore](store::StrainStore) of strain taxonomy and
//!   marker sequences, and an accession [Summary](summary::Summary) table.
//!
//! Trees use an arena: vertices live in a vector and refer to each other by
//! [VertexIndex](model::VertexIndex).
//!
//! # Example
//! ```
//! use fungphy::model::{MarkerAlignment, SequenceSet, SupermatrixBuilder};
//!
//! let its = MarkerAlignment::new(SequenceSet::from_pairs("ITS", [("1", "AC-T"), ("2", "ACGT")])?)?;
//! let bena = MarkerAlignment::new(SequenceSet::from_pairs("BenA", [("1", "GA"), ("3", "GG")])?)?;
//!
//! let matrix = SupermatrixBuilder::new().add(its).add(bena).build()?;
//! assert_eq!(matrix.num_taxa(), 3);
//! assert_eq!(matrix.get("3"), Some("----GG"));
//! assert_eq!(matrix.raxml_partitions(), "ITS = 1-4\nBenA = 5-6\n");
//! # Ok::<(), fungphy::PipelineError>(())
//! ```
//!
//! Merge supports of two trees:
//! ```
//! use fungphy::annotate::merge_support_values;
//! use fungphy::newick::{parse_str, NewickStyle};
//!
//! let ml = parse_str("((A,B)95,(C,D)80);")?;
//! let bayes = parse_str("((A,B)1,(C,D)0.9);")?;
//! let merged = merge_support_values(&[ml, bayes], 0, true)?;
//! assert_eq!(merged.to_newick(NewickStyle::MultiSupport), "((A,B)95/1,(C,D)80/0.9);");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod align;
pub mod annotate;
pub mod config;
pub mod error;
pub mod fasta;
pub mod model;
pub mod newick;
pub mod parser;
pub mod store;
pub mod summary;

pub use crate::error::{PipelineError, PipelineErrorType, Result};
pub use crate::model::{
    MarkerAlignment, PhyloTree, SequenceSet, Supermatrix, SupermatrixBuilder, Support,
};
pub use crate::parser::ParsingError;

use std::path::Path;

// ============================================================================
// Quick API
// ============================================================================
/// Parses a Newick string using default settings.
///
/// See [`newick::parse_str`] for full documentation.
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> std::result::Result<PhyloTree, ParsingError> {
    newick::parse_str(newick)
}

/// Parses all trees of a Newick file using default settings.
///
/// See [`newick::parse_file`] for full documentation.
pub fn parse_newick_file<P: AsRef<Path>>(path: P) -> std::result::Result<Vec<PhyloTree>, ParsingError> {
    newick::parse_file(path)
}
