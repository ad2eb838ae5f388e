//! Aligned sequences of a single marker.

use crate::error::{PipelineError, Result};
use crate::model::sequence::{GAP, SequenceRecord, SequenceSet};

// =#========================================================================#=
// MARKER ALIGNMENT
// =#========================================================================#=
/// One marker's aligned [SequenceSet], all rows of identical length.
///
/// # Invariants
/// - At least one row
/// - Every row has exactly [num_columns](Self::num_columns) symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerAlignment {
    sequences: SequenceSet,
    num_columns: usize,
}

impl MarkerAlignment {
    /// Wraps an aligned set, checking that all rows share the same length.
    ///
    /// # Errors
    /// * `EmptyInput` naming the marker if the set has no records or its
    ///   rows have no columns
    /// * `InvalidAlignment` naming the marker and first offending row if
    ///   row lengths differ
    pub fn new(sequences: SequenceSet) -> Result<Self> {
        let num_columns = match sequences.iter().next() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(PipelineError::empty_input(sequences.name())),
        };

        if let Some(ragged) = sequences.iter().find(|r| r.len() != num_columns) {
            return Err(PipelineError::invalid_alignment(
                sequences.name(),
                format!(
                    "row '{}' has {} columns, expected {}",
                    ragged.id(),
                    ragged.len(),
                    num_columns
                ),
            ));
        }

        Ok(Self {
            sequences,
            num_columns,
        })
    }

    /// Marker name
    pub fn name(&self) -> &str {
        self.sequences.name()
    }

    /// Number of alignment columns (length of every row)
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Number of rows (taxa)
    pub fn num_rows(&self) -> usize {
        self.sequences.len()
    }

    /// The aligned rows
    pub fn sequences(&self) -> &SequenceSet {
        &self.sequences
    }

    /// Aligned row of taxon `id`, if present
    pub fn get(&self, id: &str) -> Option<&str> {
        self.sequences.get(id)
    }

    /// Renders the alignment as FASTA in row order.
    pub fn to_fasta(&self) -> String {
        self.sequences.to_fasta()
    }

    /// Fraction of gap symbols over all cells.
    pub fn gap_fraction(&self) -> f64 {
        let cells = self.num_columns * self.num_rows();
        if cells == 0 {
            return 0.0;
        }
        let gaps: usize = self
            .sequences
            .iter()
            .map(|r| r.sequence().bytes().filter(|&b| b == GAP).count())
            .sum();
        gaps as f64 / cells as f64
    }

    /// Removes every column whose fraction of gap symbols is above `gap_threshold`.
    ///
    /// # Errors
    /// `EmptyInput` naming the marker if no column remains.
    pub fn trim_gappy_columns(&self, gap_threshold: f64) -> Result<Self> {
        let rows: Vec<&[u8]> = self
            .sequences
            .iter()
            .map(|r| r.sequence().as_bytes())
            .collect();
        let num_rows = rows.len() as f64;

        let keep: Vec<usize> = (0..self.num_columns)
            .filter(|&col| {
                let gaps = rows.iter().filter(|row| row[col] == GAP).count();
                (gaps as f64 / num_rows) <= gap_threshold
            })
            .collect();

        if keep.is_empty() {
            return Err(PipelineError::empty_input(format!(
                "{} (trimming removed every column)",
                self.name()
            )));
        }

        let records = self
            .sequences
            .iter()
            .zip(rows)
            .map(|(record, row)| {
                let trimmed: String = keep.iter().map(|&col| row[col] as char).collect();
                SequenceRecord::new(record.id(), trimmed)
            })
            .collect();

        Self::new(SequenceSet::new(self.name(), records)?)
    }
}
