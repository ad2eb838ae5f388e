//! Concatenation of marker alignments into a partitioned supermatrix.

use crate::error::{PipelineError, Result};
use crate::model::alignment::MarkerAlignment;
use crate::model::partition::{Partition, check_contiguous};
use crate::model::sequence::{GAP, SequenceRecord, SequenceSet};
use log::{debug, info, warn};
use std::collections::HashSet;

/// Name under which the concatenated rows are reported
pub const SUPERMATRIX_NAME: &str = "supermatrix";

/// Which taxa end up in a supermatrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaxonPolicy {
    /// Every taxon of any marker; absent markers are padded with gaps
    #[default]
    Union,
    /// Only taxa present in every marker
    Intersection,
}

// =#========================================================================#=
// SUPERMATRIX
// =#========================================================================#=
/// Concatenated alignment of several markers plus its partition map.
///
/// # Invariants
/// - Every row has [num_columns](Self::num_columns) symbols
/// - Partitions are contiguous from column 1, in marker order, and cover all columns
#[derive(Debug, Clone)]
pub struct Supermatrix {
    rows: SequenceSet,
    partitions: Vec<Partition>,
}

impl Supermatrix {
    /// Concatenates `alignments` in the given order, padding absent taxa
    /// with gaps. See [SupermatrixBuilder] for other policies.
    ///
    /// # Example
    /// ```
    /// use fungphy::model::{MarkerAlignment, SequenceSet, Supermatrix};
    ///
    /// let its = SequenceSet::from_pairs("ITS", [("1", "AC-T"), ("2", "ACGT")]).unwrap();
    /// let ben = SequenceSet::from_pairs("BenA", [("2", "GG"), ("3", "GA")]).unwrap();
    /// let matrix = Supermatrix::build(&[
    ///     MarkerAlignment::new(its).unwrap(),
    ///     MarkerAlignment::new(ben).unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(matrix.get("1"), Some("AC-T--"));
    /// assert_eq!(matrix.get("3"), Some("----GA"));
    /// assert_eq!(matrix.raxml_partitions(), "ITS = 1-4\nBenA = 5-6\n");
    /// ```
    pub fn build(alignments: &[MarkerAlignment]) -> Result<Self> {
        SupermatrixBuilder::new().extend(alignments.iter().cloned()).build()
    }

    /// Splits a concatenated alignment back into its markers.
    ///
    /// Rows consisting only of gaps within a partition are dropped from that
    /// marker, as they stem from padding an absent taxon.
    ///
    /// # Errors
    /// * `InvalidAlignment` if partitions are not contiguous from column 1
    ///   or don't cover the alignment
    /// * `EmptyInput` naming the marker if no row has data within a partition
    pub fn from_partitioned(
        alignment: &MarkerAlignment,
        partitions: &[Partition],
    ) -> Result<Vec<MarkerAlignment>> {
        if partitions.is_empty() {
            return Err(PipelineError::empty_input(alignment.name()));
        }
        check_contiguous(partitions, Some(alignment.num_columns()))
            .map_err(|msg| PipelineError::invalid_alignment(alignment.name(), msg))?;

        partitions
            .iter()
            .map(|partition| {
                let records: Vec<SequenceRecord> = alignment
                    .sequences()
                    .iter()
                    .filter_map(|row| {
                        // Rows are ASCII, so byte ranges are character ranges
                        let slice = &row.sequence()[partition.range()];
                        if slice.bytes().all(|b| b == GAP) {
                            None
                        } else {
                            Some(SequenceRecord::new(row.id(), slice))
                        }
                    })
                    .collect();
                debug!(
                    "Split {} rows for {} ({})",
                    records.len(),
                    partition.name(),
                    partition
                );
                MarkerAlignment::new(SequenceSet::new(partition.name(), records)?)
            })
            .collect()
    }

    /// Taxon identifiers in row order
    pub fn taxa(&self) -> impl Iterator<Item = &str> {
        self.rows.ids()
    }

    /// Number of taxa (rows)
    pub fn num_taxa(&self) -> usize {
        self.rows.len()
    }

    /// Total number of columns, the sum of all marker lengths
    pub fn num_columns(&self) -> usize {
        self.partitions.last().map_or(0, Partition::end)
    }

    /// Concatenated row of `taxon`, if present
    pub fn get(&self, taxon: &str) -> Option<&str> {
        self.rows.get(taxon)
    }

    /// The concatenated rows
    pub fn rows(&self) -> &SequenceSet {
        &self.rows
    }

    /// Partitions in marker order
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Renders the rows as FASTA in taxon order.
    pub fn to_fasta(&self) -> String {
        self.rows.to_fasta()
    }

    /// Renders the partition map, one `name = start-end` line per marker.
    pub fn raxml_partitions(&self) -> String {
        self.partitions
            .iter()
            .map(|p| format!("{p}\n"))
            .collect()
    }

    /// Returns the rows as a single alignment, e.g. as tree inference input.
    pub fn to_alignment(&self) -> Result<MarkerAlignment> {
        MarkerAlignment::new(self.rows.clone())
    }
}

// =#========================================================================#=
// SUPERMATRIX BUILDER
// =#========================================================================#=
/// Collects marker alignments and concatenates them into a [Supermatrix].
///
/// Taxa are ordered by first occurrence across the markers in the order
/// they were added.
#[derive(Debug, Clone, Default)]
pub struct SupermatrixBuilder {
    alignments: Vec<MarkerAlignment>,
    policy: TaxonPolicy,
}

impl SupermatrixBuilder {
    /// Creates an empty builder with [TaxonPolicy::Union].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets which taxa to keep.
    pub fn with_policy(mut self, policy: TaxonPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Appends a marker alignment.
    pub fn add(mut self, alignment: MarkerAlignment) -> Self {
        self.alignments.push(alignment);
        self
    }

    /// Appends marker alignments in order.
    pub fn extend<I: IntoIterator<Item = MarkerAlignment>>(mut self, alignments: I) -> Self {
        self.alignments.extend(alignments);
        self
    }

    /// Concatenates all added alignments.
    ///
    /// # Errors
    /// * `EmptyInput` if no alignment was added, or the intersection of taxa is empty
    pub fn build(self) -> Result<Supermatrix> {
        if self.alignments.is_empty() {
            return Err(PipelineError::empty_input(SUPERMATRIX_NAME));
        }

        let mut seen_markers = HashSet::new();
        for alignment in &self.alignments {
            if !seen_markers.insert(alignment.name()) {
                warn!("Marker {} is concatenated more than once", alignment.name());
            }
        }

        let taxa = self.select_taxa();
        if taxa.is_empty() {
            return Err(PipelineError::empty_input(SUPERMATRIX_NAME));
        }

        let mut partitions = Vec::with_capacity(self.alignments.len());
        let mut start = 1;
        for alignment in &self.alignments {
            let end = start + alignment.num_columns() - 1;
            partitions.push(Partition::new(alignment.name(), start, end));
            start = end + 1;
        }
        let total_columns = start - 1;

        let mut num_padded = 0;
        let records = taxa
            .into_iter()
            .map(|taxon| {
                let mut row = String::with_capacity(total_columns);
                for alignment in &self.alignments {
                    match alignment.get(taxon) {
                        Some(sequence) => row.push_str(sequence),
                        None => {
                            num_padded += 1;
                            row.extend(std::iter::repeat_n(GAP as char, alignment.num_columns()));
                        }
                    }
                }
                SequenceRecord::new(taxon, row)
            })
            .collect::<Vec<_>>();

        if num_padded > 0 {
            debug!("Padded {num_padded} absent marker sequences with gaps");
        }
        info!(
            "Concatenated {} markers for {} taxa into {} columns",
            partitions.len(),
            records.len(),
            total_columns
        );

        Ok(Supermatrix {
            rows: SequenceSet::new(SUPERMATRIX_NAME, records)?,
            partitions,
        })
    }

    /// Taxa by first occurrence, filtered by the policy.
    fn select_taxa(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let union: Vec<&str> = self
            .alignments
            .iter()
            .flat_map(|a| a.sequences().ids())
            .filter(|id| seen.insert(*id))
            .collect();

        match self.policy {
            TaxonPolicy::Union => union,
            TaxonPolicy::Intersection => union
                .into_iter()
                .filter(|id| self.alignments.iter().all(|a| a.get(id).is_some()))
                .collect(),
        }
    }
}
