//! Reading and writing FASTA files.
//!
//! Alignment tools exchange sequences as FASTA; the pipeline reads raw and
//! aligned marker sequences from it and writes alignments and supermatrices
//! back to it.

use crate::error::{PipelineError, Result};
use crate::model::sequence::{SequenceRecord, SequenceSet};
use crate::parser::ParsingError;
use bio::io::fasta;
use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Placeholder in output file templates replaced by the marker name
pub const TEMPLATE_PLACEHOLDER: char = '*';

/// Reads all records from FASTA `reader` into a set named `name`.
///
/// # Errors
/// * `Parsing` if a record is malformed, has an empty identifier or an empty sequence
/// * `InvalidAlignment` on duplicate identifiers
/// * `EmptyInput` if there are no records
pub fn read_fasta<R: Read>(reader: R, name: &str) -> Result<SequenceSet> {
    let mut records = Vec::new();

    for result in fasta::Reader::new(reader).records() {
        let record = result.map_err(|e| {
            PipelineError::parsing(name, ParsingError::invalid_fasta(e.to_string()))
        })?;
        record.check().map_err(|e| {
            PipelineError::parsing(
                name,
                ParsingError::invalid_fasta(format!("record {}: {}", records.len() + 1, e)),
            )
        })?;
        if record.seq().is_empty() {
            return Err(PipelineError::parsing(
                name,
                ParsingError::invalid_fasta(format!("empty sequence for '{}'", record.id())),
            ));
        }

        let sequence = String::from_utf8_lossy(record.seq()).into_owned();
        records.push(SequenceRecord::new(record.id(), sequence));
    }

    if records.is_empty() {
        return Err(PipelineError::empty_input(name));
    }
    debug!("Read {} sequences for {}", records.len(), name);

    SequenceSet::new(name, records)
}

/// Reads FASTA from a string.
///
/// # Example
/// ```
/// use fungphy::fasta::read_fasta_str;
///
/// let set = read_fasta_str(">1042\nACGT\n>2210\nAC-T\n", "ITS").unwrap();
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.get("2210"), Some("AC-T"));
/// ```
pub fn read_fasta_str(text: &str, name: &str) -> Result<SequenceSet> {
    read_fasta(text.as_bytes(), name)
}

/// Reads a FASTA file; the set is named after the file stem unless `name` is given.
pub fn read_fasta_file<P: AsRef<Path>>(path: P, name: Option<&str>) -> Result<SequenceSet> {
    let path = path.as_ref();
    let name = match name {
        Some(name) => name.to_string(),
        None => file_stem(path),
    };
    let file = File::open(path).map_err(|e| PipelineError::io(path.display().to_string(), e))?;
    read_fasta(file, &name)
}

/// Writes `records` as FASTA to `writer`.
pub fn write_fasta<'a, W, I>(writer: W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    let mut writer = fasta::Writer::new(writer);
    for record in records {
        writer.write(record.id(), None, record.sequence().as_bytes())?;
    }
    writer.flush()
}

/// Writes `set` to the FASTA file at `path`.
pub fn write_fasta_file<P: AsRef<Path>>(path: P, set: &SequenceSet) -> Result<()> {
    let path = path.as_ref();
    let subject = path.display().to_string();
    let file = File::create(path).map_err(|e| PipelineError::io(&subject, e))?;
    write_fasta(BufWriter::new(file), set).map_err(|e| PipelineError::io(&subject, e))?;
    debug!("Wrote {} sequences of {} to {}", set.len(), set.name(), subject);
    Ok(())
}

/// Replaces every `*` in `template` by `marker`, e.g. `out/*.msa` to `out/ITS.msa`.
///
/// Templates without placeholder are returned unchanged.
pub fn expand_template(template: &str, marker: &str) -> PathBuf {
    PathBuf::from(template.replace(TEMPLATE_PLACEHOLDER, marker))
}

/// Name of a file without directory and extension.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
