//! Flat-file strain store: strain taxonomy and marker sequences read from
//! two delimited tables.
//!
//! `strains.csv` columns:
//! `id,genus,subgenus,section,species,strain_names,type_strain,is_ex_type`,
//! where `strain_names` is `;`-separated with the preferred designation first.
//!
//! `markers.csv` columns: `strain_id,marker,accession,sequence`.
//!
//! # Example
//! ```
//! use fungphy::model::TaxonLookup;
//! use fungphy::store::{StrainFilter, StrainStore};
//!
//! let strains = "\
//! id,genus,subgenus,section,species,strain_names,type_strain,is_ex_type
//! 1,Aspergillus,Circumdati,Nigri,niger,CBS 554.65;ATCC 16888,CBS 554.65,true
//! 2,Aspergillus,Circumdati,Flavi,flavus,CBS 100927,,
//! ";
//! let markers = "\
//! strain_id,marker,accession,sequence
//! 1,ITS,MH855854,ACGT
//! 2,ITS,,ACGA
//! ";
//! let store = StrainStore::from_readers(strains.as_bytes(), markers.as_bytes()).unwrap();
//! let nigri = store.filter(&StrainFilter::default().with_sections(["Nigri"]));
//! assert_eq!(nigri, vec!["1"]);
//! assert_eq!(store.taxon("2").unwrap().species_name(), "Aspergillus flavus");
//! ```

use crate::error::{PipelineError, Result};
use crate::model::sequence::{SequenceRecord, SequenceSet};
use crate::model::taxon::{TaxonLookup, TaxonMetadata};
use crate::parser::parsing_error::ParsingError;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Separator of the designations in the `strain_names` column
pub const STRAIN_NAME_SEPARATOR: char = ';';

// ============================================================================
// Table rows
// ============================================================================
/// One row of the strain table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainRecord {
    /// Strain identifier, used as leaf name and FASTA header
    pub id: String,
    /// Genus, e.g. `Aspergillus`
    pub genus: String,
    pub subgenus: Option<String>,
    pub section: Option<String>,
    /// Species epithet
    pub species: String,
    /// Culture collection designations joined by [STRAIN_NAME_SEPARATOR]
    #[serde(default)]
    pub strain_names: String,
    /// Designation of the species' type strain, if known
    pub type_strain: Option<String>,
    /// Whether this strain is ex-type; unparsable values read as unknown
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub is_ex_type: Option<bool>,
}

impl StrainRecord {
    fn to_metadata(&self) -> TaxonMetadata {
        TaxonMetadata {
            subgenus: self.subgenus.clone(),
            section: self.section.clone(),
            strain_names: self
                .strain_names
                .split(STRAIN_NAME_SEPARATOR)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            type_strain: self.type_strain.clone(),
            is_ex_type: self.is_ex_type.unwrap_or(false),
            ..TaxonMetadata::new(&self.genus, &self.species)
        }
    }
}

/// One row of the marker table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    /// Identifier of the owning strain in the strain table
    pub strain_id: String,
    /// Marker name, e.g. `ITS` or `BenA`
    pub marker: String,
    /// GenBank accession
    pub accession: Option<String>,
    /// Unaligned sequence; blank values are skipped when sequences are taken
    pub sequence: String,
}

/// Which identifier heads the sequences taken from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequenceHeader {
    /// Strain identifier, matching tree leaves and metadata
    #[default]
    StrainId,
    /// Marker accession; markers without accession are left out
    Accession,
}

// ============================================================================
// Filter
// ============================================================================
/// Selects strains by taxonomy or identifier. Empty criteria match all;
/// non-empty criteria must all match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrainFilter {
    pub genera: Vec<String>,
    pub subgenera: Vec<String>,
    pub sections: Vec<String>,
    /// Species epithets or full species names
    pub species: Vec<String>,
    /// Strain identifiers, compared exactly
    pub ids: Vec<String>,
}

fn to_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

fn contains_ignore_case(values: &[String], value: Option<&str>) -> bool {
    values.is_empty()
        || value.is_some_and(|value| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
}

impl StrainFilter {
    /// Restricts to the given genera, ignoring case.
    pub fn with_genera<I: IntoIterator<Item = S>, S: Into<String>>(mut self, genera: I) -> Self {
        self.genera = to_strings(genera);
        self
    }

    /// Restricts to the given subgenera, ignoring case.
    pub fn with_subgenera<I: IntoIterator<Item = S>, S: Into<String>>(mut self, subgenera: I) -> Self {
        self.subgenera = to_strings(subgenera);
        self
    }

    /// Restricts to the given sections, ignoring case.
    pub fn with_sections<I: IntoIterator<Item = S>, S: Into<String>>(mut self, sections: I) -> Self {
        self.sections = to_strings(sections);
        self
    }

    /// Restricts to the given species, by epithet or species name.
    pub fn with_species<I: IntoIterator<Item = S>, S: Into<String>>(mut self, species: I) -> Self {
        self.species = to_strings(species);
        self
    }

    /// Restricts to the given strain identifiers.
    pub fn with_ids<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.ids = to_strings(ids);
        self
    }

    /// Whether no criterion is set
    pub fn is_empty(&self) -> bool {
        self.genera.is_empty()
            && self.subgenera.is_empty()
            && self.sections.is_empty()
            && self.species.is_empty()
            && self.ids.is_empty()
    }

    fn matches(&self, id: &str, taxon: &TaxonMetadata) -> bool {
        (self.ids.is_empty() || self.ids.iter().any(|i| i == id))
            && contains_ignore_case(&self.genera, Some(&taxon.genus))
            && contains_ignore_case(&self.subgenera, taxon.subgenus.as_deref())
            && contains_ignore_case(&self.sections, taxon.section.as_deref())
            && (self.species.is_empty() || self.species.iter().any(|s| taxon.matches_species(s)))
    }
}

// =#========================================================================#=
// STRAIN STORE
// =#========================================================================#=
/// Read-only store of strains and their marker sequences.
#[derive(Debug, Clone, Default)]
pub struct StrainStore {
    /// Strain ids in table order
    ids: Vec<String>,
    taxa: HashMap<String, TaxonMetadata>,
    markers: Vec<MarkerRecord>,
    /// Strain id -> indices into `markers`
    markers_by_strain: HashMap<String, Vec<usize>>,
}

impl StrainStore {
    /// Loads the strain and marker tables from files.
    ///
    /// # Errors
    /// `Parsing` naming the offending file if a table can't be read.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(strains: P, markers: Q) -> Result<Self> {
        let (strains, markers) = (strains.as_ref(), markers.as_ref());
        let strain_rows = read_table(open(strains)?)
            .map_err(|e| PipelineError::parsing(strains.display().to_string(), e))?;
        let marker_rows = read_table(open(markers)?)
            .map_err(|e| PipelineError::parsing(markers.display().to_string(), e))?;

        let store = Self::from_records(strain_rows, marker_rows)
            .map_err(|e| PipelineError::parsing(strains.display().to_string(), e))?;
        info!(
            "Loaded {} strains and {} marker sequences",
            store.num_strains(),
            store.markers.len()
        );
        Ok(store)
    }

    /// Reads the strain and marker tables from comma-separated readers with
    /// header rows.
    pub fn from_readers<R: Read, S: Read>(strains: R, markers: S) -> std::result::Result<Self, ParsingError> {
        Self::from_records(read_table(strains)?, read_table(markers)?)
    }

    /// Builds the store from table rows.
    ///
    /// # Errors
    /// `InvalidTable` on duplicate strain ids. Markers of unknown strains are
    /// skipped with a warning.
    pub fn from_records(
        strains: Vec<StrainRecord>,
        markers: Vec<MarkerRecord>,
    ) -> std::result::Result<Self, ParsingError> {
        let mut store = Self::default();

        for strain in strains {
            if store.taxa.contains_key(&strain.id) {
                return Err(ParsingError::invalid_table(format!(
                    "duplicate strain id '{}'",
                    strain.id
                )));
            }
            store.taxa.insert(strain.id.clone(), strain.to_metadata());
            store.ids.push(strain.id);
        }

        for marker in markers {
            if !store.taxa.contains_key(&marker.strain_id) {
                warn!(
                    "Skipping {} sequence of unknown strain '{}'",
                    marker.marker, marker.strain_id
                );
                continue;
            }
            store
                .markers_by_strain
                .entry(marker.strain_id.clone())
                .or_default()
                .push(store.markers.len());
            store.markers.push(marker);
        }

        Ok(store)
    }

    /// Number of strains
    pub fn num_strains(&self) -> usize {
        self.ids.len()
    }

    /// Strain ids in table order
    pub fn strain_ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Ids of the strains matching `filter`, in table order.
    pub fn filter(&self, filter: &StrainFilter) -> Vec<&str> {
        let ids: Vec<&str> = self
            .ids
            .iter()
            .filter(|id| filter.matches(id, &self.taxa[id.as_str()]))
            .map(String::as_str)
            .collect();
        debug!("{} of {} strains match filter", ids.len(), self.ids.len());
        ids
    }

    /// Marker records of strain `strain_id`
    pub fn markers_of(&self, strain_id: &str) -> impl Iterator<Item = &MarkerRecord> {
        self.markers_by_strain
            .get(strain_id)
            .into_iter()
            .flatten()
            .map(|&i| &self.markers[i])
    }

    /// Names of all markers present in the store, in first-seen order.
    pub fn marker_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for marker in &self.markers {
            if !names.contains(&marker.marker.as_str()) {
                names.push(&marker.marker);
            }
        }
        names
    }

    /// Marker record of `marker` for strain `strain_id`, the first one if
    /// the strain has several.
    pub fn marker(&self, strain_id: &str, marker: &str) -> Option<&MarkerRecord> {
        self.markers_of(strain_id).find(|m| m.marker == marker)
    }

    /// Accession of `marker` for strain `strain_id`
    pub fn accession(&self, strain_id: &str, marker: &str) -> Option<&str> {
        self.marker(strain_id, marker)?.accession.as_deref()
    }

    /// Collects the `marker` sequences of the given strains, in the given order.
    ///
    /// Strains lacking the marker, or whose sequence is empty, are left out.
    ///
    /// # Errors
    /// * `EmptyInput` naming the marker if no strain has it
    /// * `InvalidAlignment` if two sequences share a header
    pub fn marker_sequences<'a, I>(
        &self,
        strain_ids: I,
        marker: &str,
        header: SequenceHeader,
    ) -> Result<SequenceSet>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut records = Vec::new();
        for id in strain_ids {
            let Some(record) = self.marker(id, marker) else {
                debug!("Strain {id} has no {marker} sequence");
                continue;
            };
            let sequence = record.sequence.trim();
            if sequence.is_empty() {
                warn!("Strain {id} has an empty {marker} sequence, skipping");
                continue;
            }
            let head = match header {
                SequenceHeader::StrainId => id,
                SequenceHeader::Accession => match record.accession.as_deref() {
                    Some(accession) => accession,
                    None => {
                        warn!("Strain {id} has no {marker} accession, skipping");
                        continue;
                    }
                },
            };
            records.push(SequenceRecord::new(head, sequence));
        }

        if records.is_empty() {
            return Err(PipelineError::empty_input(marker));
        }
        SequenceSet::new(marker, records)
    }
}

impl TaxonLookup for StrainStore {
    fn taxon(&self, leaf_id: &str) -> Option<&TaxonMetadata> {
        self.taxa.get(leaf_id)
    }
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| PipelineError::io(path.display().to_string(), e))
}

fn read_table<T, R>(reader: R) -> std::result::Result<Vec<T>, ParsingError>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRAINS: &str = "\
id,genus,subgenus,section,species,strain_names,type_strain,is_ex_type
1,Aspergillus,Circumdati,Nigri,niger,CBS 554.65;ATCC 16888,CBS 554.65,true
2,Aspergillus,Circumdati,Nigri,tubingensis,CBS 134.48,CBS 134.48,false
3,Aspergillus,Circumdati,Flavi,flavus,CBS 100927,,
4,Penicillium,,Citrina,citrinum,DTO 115-B6,,
";

    const MARKERS: &str = "\
strain_id,marker,accession,sequence
1,ITS,MH855854,ACGT
1,BenA,EF661089,GGCA
2,ITS,,ACGA
3,BenA,EF661171,GGTA
9,ITS,X1,AAAA
";

    fn store() -> StrainStore {
        StrainStore::from_readers(STRAINS.as_bytes(), MARKERS.as_bytes()).unwrap()
    }

    #[test]
    fn test_metadata() {
        let store = store();
        assert_eq!(store.num_strains(), 4);
        let niger = store.taxon("1").unwrap();
        assert_eq!(niger.strain_names, vec!["CBS 554.65", "ATCC 16888"]);
        assert!(niger.is_ex_type);
        assert_eq!(niger.section.as_deref(), Some("Nigri"));

        let citrinum = store.taxon("4").unwrap();
        assert_eq!(citrinum.subgenus, None);
        assert!(!citrinum.is_ex_type);
    }

    #[test]
    fn test_filter() {
        let store = store();
        assert_eq!(store.filter(&StrainFilter::default()), vec!["1", "2", "3", "4"]);
        assert_eq!(
            store.filter(&StrainFilter::default().with_genera(["aspergillus"]).with_sections(["Nigri"])),
            vec!["1", "2"]
        );
        assert_eq!(
            store.filter(&StrainFilter::default().with_species(["A. flavus", "citrinum"])),
            vec!["3", "4"]
        );
        assert_eq!(store.filter(&StrainFilter::default().with_subgenera(["Circumdati"]).with_ids(["2", "4"])), vec!["2"]);
    }

    #[test]
    fn test_marker_sequences() {
        let store = store();
        let its = store
            .marker_sequences(["1", "2", "3"], "ITS", SequenceHeader::StrainId)
            .unwrap();
        assert_eq!(its.ids().collect::<Vec<_>>(), vec!["1", "2"]);

        let by_accession = store
            .marker_sequences(["1", "2"], "ITS", SequenceHeader::Accession)
            .unwrap();
        assert_eq!(by_accession.ids().collect::<Vec<_>>(), vec!["MH855854"]);

        assert_eq!(store.marker_names(), vec!["ITS", "BenA"]);
        assert_eq!(store.accession("3", "BenA"), Some("EF661171"));
        assert!(store.marker_sequences(["4"], "ITS", SequenceHeader::StrainId).is_err());
    }

    #[test]
    fn test_duplicate_strain_id() {
        let strains = "id,genus,subgenus,section,species,strain_names,type_strain,is_ex_type\n\
                       1,Aspergillus,,,niger,,,\n\
                       1,Aspergillus,,,flavus,,,\n";
        let markers = "strain_id,marker,accession,sequence\n";
        assert!(StrainStore::from_readers(strains.as_bytes(), markers.as_bytes()).is_err());
    }
}
