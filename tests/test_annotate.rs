use fungphy::annotate::{TreeAnnotator, merge_support_values};
use fungphy::config::AnnotationConfig;
use fungphy::model::{PhyloTree, Support, SupportScale, TaxonMetadata};
use fungphy::newick::parse_str;
use fungphy::PipelineErrorType;
use std::collections::HashMap;

fn clade(tree: &PhyloTree, leaves: &[&str]) -> usize {
    let indices: Vec<usize> = leaves.iter().map(|l| tree.find_leaf(l).unwrap()).collect();
    tree.mrca(&indices).unwrap()
}

// --- TESTS MERGING ---
#[test]
fn test_merge_identical_topologies() {
    let trees = vec![
        parse_str("((1,2)95,(3,4)80,5);").unwrap(),
        parse_str("((2,1)0.9,(3,4)0.7,5);").unwrap(),
    ];
    let merged = merge_support_values(&trees, 0, true).unwrap();

    let one_two = clade(&merged, &["1", "2"]);
    assert_eq!(
        merged[one_two].multi_support().unwrap(),
        &[Support::Value(95.0), Support::Value(0.9)]
    );
    let three_four = clade(&merged, &["3", "4"]);
    assert_eq!(merged[three_four].multi_support().unwrap()[1], Support::Value(0.7));

    // Leaves and root carry nothing
    assert!(merged.root().multi_support().is_none());
    assert!(merged.vertices().iter().filter(|v| v.is_leaf()).all(|v| v.multi_support().is_none()));
}

#[test]
fn test_merge_missing_clade() {
    let trees = vec![
        parse_str("((1,2)95,(3,4)80,5);").unwrap(),
        parse_str("((1,3)70,2,4,5);").unwrap(),
        parse_str("((1,2),(3,4)60,5);").unwrap(),
    ];
    let merged = merge_support_values(&trees, 0, false).unwrap();

    let one_two = clade(&merged, &["1", "2"]);
    assert_eq!(
        merged[one_two].multi_support().unwrap(),
        &[Support::Value(95.0), Support::Missing, Support::Missing]
    );
    assert_eq!(
        merged.to_newick(fungphy::newick::NewickStyle::MultiSupport),
        "((1,2)95/-/-,(3,4)80/-/60,5);"
    );
}

#[test]
fn test_merge_leaf_set_mismatch() {
    let trees = vec![
        parse_str("((1,2)95,(3,4)80,5);").unwrap(),
        parse_str("((1,2)90,3,4);").unwrap(),
    ];

    let err = merge_support_values(&trees, 0, true).unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::LeafSetMismatch(_)));
    assert_eq!(err.subject(), "tree #2");

    let merged = merge_support_values(&trees, 0, false).unwrap();
    let one_two = clade(&merged, &["1", "2"]);
    assert_eq!(
        merged[one_two].multi_support().unwrap(),
        &[Support::Value(95.0), Support::Value(90.0)]
    );
}

#[test]
fn test_merge_without_trees() {
    let err = merge_support_values(&[], 0, false).unwrap_err();
    assert_eq!(err.kind(), &PipelineErrorType::EmptyInput);
}

// --- TESTS ANNOTATOR ---
fn taxon(epithet: &str, section: &str, strain: &str) -> TaxonMetadata {
    TaxonMetadata {
        section: Some(section.to_string()),
        strain_names: vec![strain.to_string()],
        ..TaxonMetadata::new("Aspergillus", epithet)
    }
}

fn strain_taxa() -> HashMap<String, TaxonMetadata> {
    let mut taxa = HashMap::new();
    taxa.insert(
        "42".to_string(),
        TaxonMetadata {
            type_strain: Some("CBS 100927".to_string()),
            is_ex_type: true,
            ..taxon("flavus", "Flavi", "CBS 100927")
        },
    );
    taxa.insert("5".to_string(), taxon("niger", "Nigri", "CBS 554.65"));
    taxa.insert("7".to_string(), taxon("tubingensis", "Nigri", "CBS 134.48"));
    taxa.insert("9".to_string(), taxon("niger", "Nigri", "CBS 101883"));
    taxa.insert("11".to_string(), taxon("welwitschiae", "Nigri", "CBS 139.54"));
    taxa.insert("13".to_string(), taxon("ochraceus", "Circumdati", "CBS 108.08"));
    taxa
}

fn analyses() -> Vec<PhyloTree> {
    vec![
        parse_str("(42:0.4,((5:0.1,7:0.2)80:0.1,(9:0.3,11:0.2)70:0.2)90:0.3,13:0.5);").unwrap(),
        parse_str("(42,((5,7)100,(9,11)87.3)100,13);").unwrap(),
        parse_str("(42,((5,9)60,(7,11)50)100,13);").unwrap(),
    ]
}

fn config() -> AnnotationConfig {
    AnnotationConfig {
        outgroup: vec!["flavus".to_string()],
        bold: ["niger".to_string()].into(),
        palette: vec!["red".to_string(), "blue".to_string()],
        ..AnnotationConfig::default()
    }
}

#[test]
fn test_annotate_merged_analyses() {
    let annotator = TreeAnnotator::new(strain_taxa(), config());
    let annotated = annotator.annotate(analyses()).unwrap();
    let tree = annotated.tree();

    assert!(tree.is_rooted());
    let first = tree.root().children()[0];
    assert_eq!(tree[first].name(), Some("42"));

    let nigri = clade(tree, &["5", "11"]);
    assert_eq!(annotated.support_label(nigri), Some("90/*/*".to_string()));
    let five_seven = clade(tree, &["5", "7"]);
    assert_eq!(annotated.support_label(five_seven), Some("80/*/-".to_string()));
    let nine_eleven = clade(tree, &["9", "11"]);
    assert_eq!(annotated.support_label(nine_eleven), Some("70/87.3/-".to_string()));

    // Children of a bifurcating root show nothing
    let rest = tree.root().children()[1];
    assert_eq!(annotated.support_label(rest), None);
    assert_eq!(annotated.support_label(tree.root_index()), None);
}

#[test]
fn test_leaf_labels() {
    let annotator = TreeAnnotator::new(strain_taxa(), config());
    let annotated = annotator.annotate(analyses()).unwrap();
    let tree = annotated.tree();

    let flavus = annotated.leaf_label(tree.find_leaf("42").unwrap()).unwrap();
    assert_eq!(flavus.to_string(), "A. flavus  CBS 100927^T");
    assert!(!flavus.bold);

    let niger = annotated.leaf_label(tree.find_leaf("9").unwrap()).unwrap();
    assert_eq!(niger.to_string(), "A. niger  CBS 101883");
    assert!(niger.bold);

    assert!(annotated.leaf_label(tree.root_index()).is_none());
}

#[test]
fn test_sections_cycle_palette() {
    let annotator = TreeAnnotator::new(strain_taxa(), config());
    let annotated = annotator.annotate(analyses()).unwrap();
    let tree = annotated.tree();
    let sections = annotated.sections();

    let names: Vec<&str> = sections.iter().map(|s| s.section.as_str()).collect();
    assert_eq!(names, vec!["Flavi", "Nigri", "Circumdati"]);
    let colors: Vec<&str> = sections.iter().map(|s| s.color.as_str()).collect();
    assert_eq!(colors, vec!["red", "blue", "red"]);

    let nigri = &sections[1];
    assert_eq!(nigri.vertex, clade(tree, &["5", "7", "9", "11"]));
    assert_eq!(nigri.anchor, tree.find_leaf("5").unwrap());
    assert_eq!(nigri.leaves.len(), 4);

    // Single-leaf sections sit on the leaf itself
    assert_eq!(sections[0].vertex, tree.find_leaf("42").unwrap());
}

#[test]
fn test_excluded_section() {
    let config = AnnotationConfig {
        exclude_section: Some("CIRCUMDATI".to_string()),
        ..config()
    };
    let annotated = TreeAnnotator::new(strain_taxa(), config)
        .annotate(analyses())
        .unwrap();
    let names: Vec<&str> = annotated.sections().iter().map(|s| s.section.as_str()).collect();
    assert_eq!(names, vec!["Flavi", "Nigri"]);
}

#[test]
fn test_render_text() {
    let annotator = TreeAnnotator::new(strain_taxa(), config());
    let annotated = annotator.annotate(analyses()).unwrap();
    let nigri = clade(annotated.tree(), &["5", "7", "9", "11"]);

    let text = annotated.render_text();
    assert!(text.contains("A. flavus  CBS 100927^T  <Flavi>"));
    assert!(text.contains("A. niger  CBS 554.65  <Nigri>"));
    assert!(text.contains("70/87.3/-"));
    assert!(text.contains(&format!("blue Nigri: 4 leaves below [{nigri}]")));
}

#[test]
fn test_single_tree_keeps_supports() {
    let trees = analyses().into_iter().take(1).collect();
    let annotated = TreeAnnotator::new(strain_taxa(), config()).annotate(trees).unwrap();
    let tree = annotated.tree();

    let five_seven = clade(tree, &["5", "7"]);
    assert!(tree[five_seven].multi_support().is_none());
    assert_eq!(annotated.support_label(five_seven), Some("80".to_string()));
}

#[test]
fn test_flip_after_rooting() {
    let config = AnnotationConfig {
        flip: true,
        ..config()
    };
    let annotated = TreeAnnotator::new(strain_taxa(), config)
        .annotate(analyses())
        .unwrap();
    let tree = annotated.tree();
    let last = tree.root().children()[1];
    assert_eq!(tree[last].name(), Some("42"));
}

#[test]
fn test_unrooted_without_outgroup() {
    let config = AnnotationConfig {
        support_scale: SupportScale::Percentage,
        ..AnnotationConfig::default()
    };
    let annotated = TreeAnnotator::new(strain_taxa(), config)
        .annotate(vec![parse_str("((5,7)100,42,99);").unwrap()])
        .unwrap();
    let tree = annotated.tree();

    assert_eq!(tree.root().children().len(), 3);
    assert_eq!(annotated.support_label(clade(tree, &["5", "7"])), Some("*".to_string()));
    // Unknown leaves keep their identifier
    assert!(annotated.leaf_label(tree.find_leaf("99").unwrap()).is_none());
    assert!(annotated.render_text().contains("] 99"));
}

#[test]
fn test_annotator_errors() {
    let annotator = TreeAnnotator::new(strain_taxa(), config());
    let err = annotator.annotate(Vec::new()).unwrap_err();
    assert_eq!(err.kind(), &PipelineErrorType::EmptyInput);

    let err = annotator
        .annotate(vec![parse_str("(5,7,9);").unwrap()])
        .unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::NoOutgroupMatch(_)));
    assert_eq!(err.subject(), "tree #1");

    let strict = AnnotationConfig {
        strict: true,
        ..config()
    };
    let mut trees = analyses();
    trees.push(parse_str("(42,(5,7),9);").unwrap());
    let err = TreeAnnotator::new(strain_taxa(), strict).annotate(trees).unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::LeafSetMismatch(_)));
    assert_eq!(err.subject(), "tree #4");
}
