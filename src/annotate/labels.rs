//! Leaf labels built from taxon metadata.

use crate::config::AnnotationConfig;
use crate::model::taxon::{TaxonLookup, TaxonMetadata};
use crate::model::tree::PhyloTree;
use log::warn;
use std::fmt;

// =#========================================================================#=
// LEAF LABEL
// =#========================================================================#=
/// Display label of a leaf: abbreviated species name plus strain designation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafLabel {
    /// Abbreviated species name, e.g. `A. niger`
    pub species: String,
    /// Designation shown after the species, if any is known
    pub strain: Option<String>,
    /// Whether the ex-type glyph is appended
    pub ex_type: bool,
    /// Whether the label is set in bold
    pub bold: bool,
}

impl LeafLabel {
    /// Builds the label of a strain.
    ///
    /// The designation is the type strain if the species is listed in
    /// `show_type` and has one, otherwise the first strain name. Ex-type
    /// strains not shown under their type designation get the type glyph.
    pub fn new(taxon: &TaxonMetadata, config: &AnnotationConfig) -> Self {
        let lists = |set: &std::collections::BTreeSet<String>| {
            set.iter().any(|name| taxon.matches_species(name))
        };

        let type_designation = taxon
            .type_strain
            .as_deref()
            .filter(|_| lists(&config.show_type));
        let shown_as_type = type_designation.is_some();
        let strain = type_designation
            .or_else(|| taxon.first_strain_name())
            .map(str::to_string);

        Self {
            species: taxon.short_species_name(),
            strain,
            ex_type: taxon.is_ex_type && !shown_as_type,
            bold: lists(&config.bold),
        }
    }

    /// Renders the label as HTML, e.g. `<i>A. niger</i>  CBS 554.65<sup>T</sup>`.
    pub fn to_html(&self) -> String {
        let mut html = format!("<i>{}</i>", self.species);
        if let Some(strain) = &self.strain {
            html.push_str("  ");
            html.push_str(strain);
        }
        if self.ex_type {
            html.push_str("<sup>T</sup>");
        }
        if self.bold {
            html = format!("<b>{html}</b>");
        }
        html
    }
}

impl fmt::Display for LeafLabel {
    /// Plain text rendering, e.g. `A. niger  CBS 554.65^T`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.species)?;
        if let Some(strain) = &self.strain {
            write!(f, "  {strain}")?;
        }
        if self.ex_type {
            f.write_str("^T")?;
        }
        Ok(())
    }
}

/// Builds the labels of all leaves of `tree`.
///
/// # Returns
/// Vector indexed by vertex; `None` for inner vertices and for leaves
/// without metadata, which keep their identifier.
pub fn label_leaves<L: TaxonLookup>(
    tree: &PhyloTree,
    lookup: &L,
    config: &AnnotationConfig,
) -> Vec<Option<LeafLabel>> {
    let mut labels = vec![None; tree.num_vertices()];
    for vertex in tree.vertices().iter().filter(|v| v.is_leaf()) {
        let Some(name) = vertex.name() else {
            continue;
        };
        match lookup.taxon(name) {
            Some(taxon) => labels[vertex.index()] = Some(LeafLabel::new(taxon, config)),
            None => warn!("No taxon metadata for leaf {name}"),
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn niger() -> TaxonMetadata {
        TaxonMetadata {
            strain_names: vec!["CBS 554.65".to_string(), "ATCC 16888".to_string()],
            type_strain: Some("CBS 554.65".to_string()),
            is_ex_type: true,
            ..TaxonMetadata::new("Aspergillus", "niger")
        }
    }

    #[test]
    fn test_ex_type_glyph() {
        let label = LeafLabel::new(&niger(), &AnnotationConfig::default());
        assert_eq!(label.to_html(), "<i>A. niger</i>  CBS 554.65<sup>T</sup>");
        assert_eq!(label.to_string(), "A. niger  CBS 554.65^T");
    }

    #[test]
    fn test_shown_as_type_and_bold() {
        let config = AnnotationConfig {
            show_type: ["niger".to_string()].into(),
            bold: ["Aspergillus niger".to_string()].into(),
            ..Default::default()
        };
        let label = LeafLabel::new(&niger(), &config);
        assert_eq!(label.to_html(), "<b><i>A. niger</i>  CBS 554.65</b>");
    }

    #[test]
    fn test_plain_strain() {
        let taxon = TaxonMetadata {
            strain_names: vec!["DTO 115-B6".to_string()],
            ..TaxonMetadata::new("Penicillium", "citrinum")
        };
        let label = LeafLabel::new(&taxon, &AnnotationConfig::default());
        assert_eq!(label.to_html(), "<i>P. citrinum</i>  DTO 115-B6");
    }
}
