//! Alignment of marker sequences and tree inference via external tools.
//!
//! [AlignmentRunner] wraps any [SequenceAligner] and enforces what the
//! pipeline relies on: the aligned rows are exactly the input identifiers in
//! input order, all of equal length, uppercase, optionally trimmed of
//! gap-rich columns. [ExternalAligner] runs MAFFT or MUSCLE;
//! [FastTree] infers a tree from a supermatrix.
//!
//! # Example
//! ```no_run
//! use fungphy::align::{align, AlignmentTool};
//! use fungphy::config::AlignConfig;
//! use fungphy::model::SequenceSet;
//!
//! let its = SequenceSet::from_pairs("ITS", [("1", "ACGTTG"), ("2", "ACGTG")])?;
//! let config = AlignConfig::for_tool(AlignmentTool::Muscle).with_trimming(0.5);
//! let msa = align(&its, &config)?;
//! println!("{} columns", msa.num_columns());
//! # Ok::<(), fungphy::PipelineError>(())
//! ```

pub mod external;
pub mod fasttree;

pub use external::{ExternalAligner, ToolCommand};
pub use fasttree::{FastTree, TreeInference};

use crate::config::{AlignConfig, MAFFT_BIN_ENV, MUSCLE_BIN_ENV};
use crate::error::{PipelineError, PipelineErrorType, Result};
use crate::model::alignment::MarkerAlignment;
use crate::model::sequence::{SequenceRecord, SequenceSet};
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =#========================================================================#=
// ALIGNMENT TOOL
// =#========================================================================#=
/// Supported alignment programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignmentTool {
    /// MAFFT, run with automatic strategy selection
    Mafft,
    /// MUSCLE v3 command line
    Muscle,
}

impl AlignmentTool {
    /// Default program name looked up on `PATH`
    pub fn program(&self) -> &'static str {
        match self {
            AlignmentTool::Mafft => "mafft",
            AlignmentTool::Muscle => "muscle",
        }
    }

    /// Environment variable overriding the executable
    pub fn env_var(&self) -> &'static str {
        match self {
            AlignmentTool::Mafft => MAFFT_BIN_ENV,
            AlignmentTool::Muscle => MUSCLE_BIN_ENV,
        }
    }
}

impl FromStr for AlignmentTool {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mafft" => Ok(AlignmentTool::Mafft),
            "muscle" => Ok(AlignmentTool::Muscle),
            _ => Err(PipelineError::unsupported_tool(s)),
        }
    }
}

impl fmt::Display for AlignmentTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

// =#========================================================================#=
// SEQUENCE ALIGNER
// =#========================================================================#=
/// Something that turns raw sequences into aligned ones.
///
/// Implementations only run the tool; validation and trimming are done by
/// [AlignmentRunner]. Aligners are shared between worker threads.
pub trait SequenceAligner: Sync {
    /// Short name for log output
    fn name(&self) -> &str;

    /// Aligns `sequences`, returning the tool's rows in any order.
    ///
    /// # Errors
    /// `AlignmentTool` naming the marker if the tool fails.
    fn align_raw(&self, sequences: &SequenceSet) -> Result<SequenceSet>;
}

// =#========================================================================#=
// ALIGNMENT RUNNER
// =#========================================================================#=
/// Runs a [SequenceAligner] and checks, reorders and trims its output.
#[derive(Debug, Clone)]
pub struct AlignmentRunner<A> {
    aligner: A,
    trim: bool,
    gap_threshold: f64,
}

impl AlignmentRunner<ExternalAligner> {
    /// Creates a runner for the external tool selected in `config`.
    pub fn from_config(config: &AlignConfig) -> Self {
        Self::new(ExternalAligner::new(config), config)
    }
}

impl<A: SequenceAligner> AlignmentRunner<A> {
    /// Creates a runner using `aligner`, trimming as set in `config`.
    pub fn new(aligner: A, config: &AlignConfig) -> Self {
        Self {
            aligner,
            trim: config.trim,
            gap_threshold: config.gap_threshold,
        }
    }

    /// The wrapped aligner
    pub fn aligner(&self) -> &A {
        &self.aligner
    }

    /// Aligns one marker.
    ///
    /// # Returns
    /// Alignment with exactly the input identifiers in input order, all rows
    /// of equal length and uppercase.
    ///
    /// # Errors
    /// * `EmptyInput` if `sequences` is empty, or trimming removed every column
    /// * `AlignmentTool` if the tool fails, or its output misses or adds
    ///   identifiers or has rows of unequal length
    pub fn align(&self, sequences: &SequenceSet) -> Result<MarkerAlignment> {
        let marker = sequences.name();
        if sequences.is_empty() {
            return Err(PipelineError::empty_input(marker));
        }

        let aligned = if sequences.len() == 1 {
            // Nothing to align against
            sequences.clone()
        } else {
            self.aligner.align_raw(sequences)?
        };

        let rows = remap_by_id(sequences, &aligned)?;
        let alignment = MarkerAlignment::new(SequenceSet::new(marker, rows)?).map_err(|e| {
            match e.kind() {
                PipelineErrorType::InvalidAlignment(msg) => {
                    PipelineError::alignment_tool(marker, msg.clone())
                }
                _ => e,
            }
        })?;

        let alignment = if self.trim {
            alignment.trim_gappy_columns(self.gap_threshold)?
        } else {
            alignment
        };

        info!(
            "Aligned {} sequences of {} with {} into {} columns",
            alignment.num_rows(),
            marker,
            self.aligner.name(),
            alignment.num_columns()
        );
        Ok(alignment)
    }

    /// Aligns all markers on the current rayon thread pool.
    ///
    /// Markers share no state, so they run in parallel; the call returns once
    /// all of them are done. Results are in input order, and a failing marker
    /// does not affect the others.
    pub fn align_all(&self, sets: &[SequenceSet]) -> Vec<Result<MarkerAlignment>> {
        sets.par_iter().map(|set| self.align(set)).collect()
    }

    /// Aligns all markers, logging and skipping those that fail.
    pub fn align_all_lenient(&self, sets: &[SequenceSet]) -> Vec<MarkerAlignment> {
        self.align_all(sets)
            .into_iter()
            .filter_map(|result| match result {
                Ok(alignment) => Some(alignment),
                Err(e) => {
                    warn!("Skipping marker: {e}");
                    None
                }
            })
            .collect()
    }
}

/// Aligns `sequences` with the external tool selected in `config`.
pub fn align(sequences: &SequenceSet, config: &AlignConfig) -> Result<MarkerAlignment> {
    AlignmentRunner::from_config(config).align(sequences)
}

/// Orders `aligned` rows like `input`, uppercasing them.
fn remap_by_id(input: &SequenceSet, aligned: &SequenceSet) -> Result<Vec<SequenceRecord>> {
    let marker = input.name();
    let by_id: HashMap<&str, &str> = aligned
        .iter()
        .map(|r| (r.id(), r.sequence()))
        .collect();

    if let Some(extra) = aligned.ids().find(|id| !input.contains(id)) {
        return Err(PipelineError::alignment_tool(
            marker,
            format!("output contains unknown identifier '{extra}'"),
        ));
    }

    input
        .ids()
        .map(|id| match by_id.get(id) {
            Some(sequence) => Ok(SequenceRecord::new(id, sequence.to_ascii_uppercase())),
            None => Err(PipelineError::alignment_tool(
                marker,
                format!("output lacks identifier '{id}'"),
            )),
        })
        .collect()
}
