//! Ordered collections of identified sequences.
//!
//! A [SequenceSet] holds the (identifier, sequence) pairs of one marker,
//! either raw as retrieved from the strain store or a FASTA file, or aligned
//! as returned by an alignment tool.

use crate::error::{PipelineError, Result};
use std::collections::HashMap;

/// Gap character used in alignments and for padding absent taxa.
pub const GAP: u8 = b'-';

// =#========================================================================#=
// SEQUENCE RECORD
// =#========================================================================#=
/// A single identified sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    id: String,
    sequence: String,
}

impl SequenceRecord {
    /// Creates a new record.
    pub fn new<I: Into<String>, S: Into<String>>(id: I, sequence: S) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    /// Identifier of this record, e.g. strain id or accession
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sequence of this record
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Length of the sequence in symbols
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Returns this record as a FASTA entry `>{id}\n{sequence}` (no trailing newline).
    pub fn to_fasta(&self) -> String {
        format!(">{}\n{}", self.id, self.sequence)
    }
}

// =#========================================================================#=
// SEQUENCE SET
// =#========================================================================#=
/// Ordered, immutable collection of records with unique identifiers.
///
/// The `name` is the marker the sequences belong to and is used to name
/// this set in errors and log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSet {
    name: String,
    records: Vec<SequenceRecord>,
    index: HashMap<String, usize>,
}

impl SequenceSet {
    /// Creates a new set, keeping the order of `records`.
    ///
    /// Sequences are handled column by column, one byte per symbol, so only
    /// ASCII symbols are accepted.
    ///
    /// # Errors
    /// Returns an [InvalidAlignment](crate::error::PipelineErrorType::InvalidAlignment)
    /// error naming the set if an identifier occurs twice or a sequence holds
    /// a non-ASCII symbol.
    pub fn new<N: Into<String>>(name: N, records: Vec<SequenceRecord>) -> Result<Self> {
        let name = name.into();
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if !record.sequence.is_ascii() {
                return Err(PipelineError::invalid_alignment(
                    name,
                    format!("sequence of '{}' holds non-ASCII symbols", record.id),
                ));
            }
            if index.insert(record.id.clone(), i).is_some() {
                return Err(PipelineError::invalid_alignment(
                    name,
                    format!("duplicate identifier '{}'", record.id),
                ));
            }
        }

        Ok(Self {
            name,
            records,
            index,
        })
    }

    /// Creates a new set from `(identifier, sequence)` pairs.
    pub fn from_pairs<N, I, K, V>(name: N, pairs: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let records = pairs
            .into_iter()
            .map(|(id, seq)| SequenceRecord::new(id, seq))
            .collect();
        Self::new(name, records)
    }

    /// Name of the marker this set belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this set has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SequenceRecord> {
        self.records.iter()
    }

    /// Returns the records in order.
    pub fn records(&self) -> &[SequenceRecord] {
        &self.records
    }

    /// Iterates over the identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id())
    }

    /// Returns whether a record with identifier `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the sequence of the record with identifier `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(|&i| self.records[i].sequence())
    }

    /// Returns a copy of this set under a new name.
    pub fn renamed<N: Into<String>>(&self, name: N) -> Self {
        Self {
            name: name.into(),
            records: self.records.clone(),
            index: self.index.clone(),
        }
    }

    /// Renders all records as FASTA, one `>{id}\n{sequence}` entry per line pair.
    pub fn to_fasta(&self) -> String {
        self.records
            .iter()
            .map(SequenceRecord::to_fasta)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a SequenceSet {
    type Item = &'a SequenceRecord;
    type IntoIter = std::slice::Iter<'a, SequenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineErrorType;

    #[test]
    fn test_duplicate_identifier() {
        let err = SequenceSet::from_pairs("BenA", [("1", "ACGT"), ("1", "ACGA")]).unwrap_err();
        assert!(matches!(err.kind(), PipelineErrorType::InvalidAlignment(_)));
        assert_eq!(err.subject(), "BenA");
    }

    #[test]
    fn test_non_ascii_sequence() {
        let err = SequenceSet::from_pairs("ITS", [("1", "ACGT"), ("2", "AC\u{00c5}T")]).unwrap_err();
        assert!(matches!(err.kind(), PipelineErrorType::InvalidAlignment(_)));

        let set = SequenceSet::from_pairs("ITS", [("1", "acgt-N")]).unwrap();
        assert_eq!(set.get("1"), Some("acgt-N"));
    }
}
