//! Taxonomic metadata of the strains at tree leaves.

use std::collections::{BTreeMap, HashMap};

// =#========================================================================#=
// TAXON METADATA
// =#========================================================================#=
/// Taxonomy and designations of one strain, resolved from a leaf identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonMetadata {
    /// Genus, e.g. `Aspergillus`
    pub genus: String,
    /// Subgenus, e.g. `Circumdati`
    pub subgenus: Option<String>,
    /// Section, e.g. `Nigri`
    pub section: Option<String>,
    /// Species epithet, e.g. `niger`
    pub epithet: String,
    /// Known strain designations, preferred first
    pub strain_names: Vec<String>,
    /// Designation of the type strain of the species, if known
    pub type_strain: Option<String>,
    /// Whether this strain is ex-type
    pub is_ex_type: bool,
}

impl TaxonMetadata {
    /// Creates metadata for a strain of species `genus epithet`.
    pub fn new<G: Into<String>, E: Into<String>>(genus: G, epithet: E) -> Self {
        Self {
            genus: genus.into(),
            epithet: epithet.into(),
            ..Default::default()
        }
    }

    /// Full species name, e.g. `Aspergillus niger`
    pub fn species_name(&self) -> String {
        format!("{} {}", self.genus, self.epithet)
    }

    /// Abbreviated species name, e.g. `A. niger`
    pub fn short_species_name(&self) -> String {
        match self.genus.chars().next() {
            Some(initial) => format!("{}. {}", initial, self.epithet),
            None => self.epithet.clone(),
        }
    }

    /// First known strain designation
    pub fn first_strain_name(&self) -> Option<&str> {
        self.strain_names.first().map(String::as_str)
    }

    /// Returns whether `name` designates this species: the epithet, the full
    /// or the abbreviated species name, ignoring ASCII case.
    pub fn matches_species(&self, name: &str) -> bool {
        let name = name.trim();
        name.eq_ignore_ascii_case(&self.epithet)
            || name.eq_ignore_ascii_case(&self.species_name())
            || name.eq_ignore_ascii_case(&self.short_species_name())
    }
}

// =#========================================================================#=
// TAXON LOOKUP
// =#========================================================================#=
/// Read-only mapping from leaf identifier to [TaxonMetadata].
pub trait TaxonLookup {
    /// Returns the metadata of the strain with identifier `leaf_id`.
    fn taxon(&self, leaf_id: &str) -> Option<&TaxonMetadata>;
}

impl TaxonLookup for HashMap<String, TaxonMetadata> {
    fn taxon(&self, leaf_id: &str) -> Option<&TaxonMetadata> {
        self.get(leaf_id)
    }
}

impl TaxonLookup for BTreeMap<String, TaxonMetadata> {
    fn taxon(&self, leaf_id: &str) -> Option<&TaxonMetadata> {
        self.get(leaf_id)
    }
}

impl<T: TaxonLookup + ?Sized> TaxonLookup for &T {
    fn taxon(&self, leaf_id: &str) -> Option<&TaxonMetadata> {
        (**self).taxon(leaf_id)
    }
}
