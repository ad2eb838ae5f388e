//! Table of marker accessions per strain.

use crate::model::taxon::TaxonLookup;
use crate::parser::parsing_error::ParsingError;
use crate::store::StrainStore;
use std::io::Read;

/// Header of the first column
pub const ORGANISM_HEADER: &str = "Organism";

/// Accession table: one row per strain, one column per marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Summary {
    /// Creates a table from `headers` and `rows`; rows are not checked
    /// against the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Builds the table for the given strains and markers.
    ///
    /// The first cell of a row is the strain's species name followed by its
    /// first designation. A strain without a marker, or with an unnamed
    /// accession, gets an empty cell so columns stay aligned.
    pub fn from_strains<'a, I, S>(store: &StrainStore, strain_ids: I, markers: &[S]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        S: AsRef<str>,
    {
        let mut headers = vec![ORGANISM_HEADER.to_string()];
        headers.extend(markers.iter().map(|m| m.as_ref().to_string()));

        let rows = strain_ids
            .into_iter()
            .map(|id| {
                let organism = match store.taxon(id) {
                    Some(taxon) => match taxon.first_strain_name() {
                        Some(strain) => format!("{} {}", taxon.species_name(), strain),
                        None => taxon.species_name(),
                    },
                    None => id.to_string(),
                };
                let mut row = vec![organism];
                row.extend(
                    markers
                        .iter()
                        .map(|m| store.accession(id, m.as_ref()).unwrap_or_default().to_string()),
                );
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Reads a delimited table; the first row is taken as headers if
    /// `has_headers` is set.
    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        has_headers: bool,
    ) -> Result<Self, ParsingError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(has_headers)
            .flexible(true)
            .from_reader(reader);

        let headers = if has_headers {
            reader.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    /// Column headers, empty if the table was read without them.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in insertion order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows, not counting headers.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Formats the table with `delimiter`, one line per row, without
    /// trailing newline. Cells containing the delimiter are quoted.
    pub fn format(&self, delimiter: u8, show_headers: bool) -> Result<String, ParsingError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(Vec::new());

        if show_headers {
            writer.write_record(&self.headers)?;
        }
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ParsingError::invalid_table(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| ParsingError::invalid_table(e.to_string()))?;
        Ok(text.trim_end_matches('\n').to_string())
    }
}

impl<'a> IntoIterator for &'a Summary {
    type Item = &'a Vec<String>;
    type IntoIter = std::slice::Iter<'a, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> StrainStore {
        let strains = "id,genus,subgenus,section,species,strain_names,type_strain,is_ex_type\n\
                       1,Aspergillus,,Nigri,niger,CBS 554.65,,\n\
                       2,Aspergillus,,Flavi,flavus,,,\n";
        let markers = "strain_id,marker,accession,sequence\n\
                       1,ITS,MH855854,ACGT\n\
                       1,BenA,EF661089,GGCA\n\
                       2,BenA,EF661171,GGTA\n";
        StrainStore::from_readers(strains.as_bytes(), markers.as_bytes()).unwrap()
    }

    #[test]
    fn test_missing_marker_keeps_columns() {
        let summary = Summary::from_strains(&store(), ["1", "2"], &["ITS", "BenA"]);
        assert_eq!(summary.headers(), ["Organism", "ITS", "BenA"]);
        assert_eq!(summary.rows()[1], ["Aspergillus flavus", "", "EF661171"]);
        assert_eq!(
            summary.format(b'\t', false).unwrap(),
            "Aspergillus niger CBS 554.65\tMH855854\tEF661089\nAspergillus flavus\t\tEF661171"
        );
    }

    #[test]
    fn test_read_back() {
        let summary = Summary::from_strains(&store(), ["1", "2"], &["ITS", "BenA"]);
        let text = summary.format(b',', true).unwrap();
        let read = Summary::from_reader(text.as_bytes(), b',', true).unwrap();
        assert_eq!(read, summary);
    }
}
