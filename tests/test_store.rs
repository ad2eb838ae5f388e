use fungphy::annotate::TreeAnnotator;
use fungphy::config::AnnotationConfig;
use fungphy::model::TaxonLookup;
use fungphy::newick::parse_str;
use fungphy::store::{SequenceHeader, StrainFilter, StrainStore};
use fungphy::summary::Summary;
use fungphy::PipelineErrorType;
use std::io::Write;
use tempfile::NamedTempFile;

const STRAINS: &str = "\
id, genus, subgenus, section, species, strain_names, type_strain, is_ex_type
1042, Aspergillus, Circumdati, Nigri, niger, CBS 554.65;ATCC 16888, CBS 554.65, true
2210, Aspergillus, Circumdati, Nigri, tubingensis, CBS 134.48, CBS 134.48, yes
3377, Aspergillus, Circumdati, Flavi, flavus, CBS 100927, CBS 100927, true
4810, Aspergillus, Fumigati, Fumigati, fumigatus, , ,
";

const MARKERS: &str = "\
strain_id,marker,accession,sequence
1042,ITS,MH855854,ACGTACGT
1042,BenA,EF661089,GGCATT
2210,ITS,EF661193,ACGTTCGT
3377,ITS,EF661560,ACCTACGT
3377,CaM,EF661508,TTGACA
4810,BenA,,GGCTTT
2210,CaM,,
";

fn table(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn load() -> StrainStore {
    let (strains, markers) = (table(STRAINS), table(MARKERS));
    StrainStore::load(strains.path(), markers.path()).unwrap()
}

#[test]
fn test_load_tables() {
    let store = load();
    assert_eq!(store.num_strains(), 4);
    assert_eq!(store.strain_ids().collect::<Vec<_>>(), vec!["1042", "2210", "3377", "4810"]);
    assert_eq!(store.marker_names(), vec!["ITS", "BenA", "CaM"]);

    let tubingensis = store.taxon("2210").unwrap();
    assert_eq!(tubingensis.species_name(), "Aspergillus tubingensis");
    // Unparsable flags read as unknown
    assert!(!tubingensis.is_ex_type);

    let fumigatus = store.taxon("4810").unwrap();
    assert!(fumigatus.strain_names.is_empty());
    assert_eq!(fumigatus.type_strain, None);
}

#[test]
fn test_missing_table() {
    let strains = table(STRAINS);
    let err = StrainStore::load(strains.path(), "no/such/markers.csv").unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::Io(_)));
    assert_eq!(err.subject(), "no/such/markers.csv");
}

#[test]
fn test_malformed_table() {
    let strains = table("id,genus\n1042,Aspergillus\n");
    let markers = table(MARKERS);
    let err = StrainStore::load(strains.path(), markers.path()).unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::Parsing(_)));
    assert_eq!(err.subject(), strains.path().display().to_string());
}

#[test]
fn test_marker_sets_of_filtered_strains() {
    let store = load();
    let circumdati = store.filter(&StrainFilter::default().with_subgenera(["circumdati"]));
    assert_eq!(circumdati, vec!["1042", "2210", "3377"]);

    let its = store
        .marker_sequences(circumdati.iter().copied(), "ITS", SequenceHeader::StrainId)
        .unwrap();
    assert_eq!(its.len(), 3);
    assert_eq!(its.get("3377"), Some("ACCTACGT"));

    let bena = store
        .marker_sequences(store.strain_ids(), "BenA", SequenceHeader::Accession)
        .unwrap();
    assert_eq!(bena.ids().collect::<Vec<_>>(), vec!["EF661089"]);

    // The CaM row of 2210 has no sequence
    let err = store
        .marker_sequences(["2210"], "CaM", SequenceHeader::StrainId)
        .unwrap_err();
    assert_eq!(err.kind(), &PipelineErrorType::EmptyInput);
    assert_eq!(err.subject(), "CaM");
}

#[test]
fn test_store_labels_tree() {
    let store = load();
    let config = AnnotationConfig {
        outgroup: vec!["A. flavus".to_string()],
        show_type: ["tubingensis".to_string()].into(),
        ..AnnotationConfig::default()
    };
    let tree = parse_str("((1042,2210)98,3377,4810);").unwrap();
    let annotated = TreeAnnotator::new(&store, config).annotate(vec![tree]).unwrap();
    let tree = annotated.tree();

    let first = tree.root().children()[0];
    assert_eq!(tree[first].name(), Some("3377"));

    let niger = annotated.leaf_label(tree.find_leaf("1042").unwrap()).unwrap();
    assert_eq!(niger.to_string(), "A. niger  CBS 554.65^T");
    let tubingensis = annotated.leaf_label(tree.find_leaf("2210").unwrap()).unwrap();
    assert_eq!(tubingensis.to_string(), "A. tubingensis  CBS 134.48");
    let fumigatus = annotated.leaf_label(tree.find_leaf("4810").unwrap()).unwrap();
    assert_eq!(fumigatus.to_string(), "A. fumigatus");
}

#[test]
fn test_summary_table() {
    let store = load();
    let summary = Summary::from_strains(&store, store.strain_ids(), &["ITS", "BenA", "CaM"]);
    assert_eq!(summary.len(), 4);

    let expected = "\
Organism\tITS\tBenA\tCaM
Aspergillus niger CBS 554.65\tMH855854\tEF661089\t
Aspergillus tubingensis CBS 134.48\tEF661193\t\t
Aspergillus flavus CBS 100927\tEF661560\t\tEF661508
Aspergillus fumigatus\t\t\t";
    assert_eq!(summary.format(b'\t', true).unwrap(), expected);

    let read = Summary::from_reader(expected.as_bytes(), b'\t', true).unwrap();
    assert_eq!(read, summary);
}
