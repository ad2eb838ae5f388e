use fungphy::align::AlignmentRunner;
use fungphy::config::AlignConfig;
use fungphy::fasta::{read_fasta_file, read_fasta_str, write_fasta_file};
use fungphy::model::partition::{parse_partitions, read_partitions};
use fungphy::model::{
    MarkerAlignment, Partition, SequenceSet, Supermatrix, SupermatrixBuilder, TaxonPolicy,
};
use fungphy::PipelineErrorType;
use std::io::Write;
use tempfile::NamedTempFile;

fn alignment(name: &str, rows: &[(&str, &str)]) -> MarkerAlignment {
    MarkerAlignment::new(SequenceSet::from_pairs(name, rows.iter().copied()).unwrap()).unwrap()
}

fn uniform(name: &str, ids: &[&str], base: char, len: usize) -> MarkerAlignment {
    let row: String = std::iter::repeat_n(base, len).collect();
    let rows: Vec<(&str, &str)> = ids.iter().map(|id| (*id, row.as_str())).collect();
    alignment(name, &rows)
}

#[test]
fn test_partitions_follow_marker_order() {
    let its = uniform("ITS", &["1", "2"], 'A', 520);
    let bena = uniform("BenA", &["1", "2"], 'C', 480);
    let matrix = SupermatrixBuilder::new().add(its).add(bena).build().unwrap();

    assert_eq!(
        matrix.partitions(),
        &[Partition::new("ITS", 1, 520), Partition::new("BenA", 521, 1000)]
    );
    assert_eq!(matrix.num_columns(), 1000);
    assert_eq!(matrix.raxml_partitions(), "ITS = 1-520\nBenA = 521-1000\n");
}

#[test]
fn test_absent_taxa_are_gap_padded() {
    let its = uniform("ITS", &["1", "2"], 'A', 5);
    let bena = uniform("BenA", &["2", "3"], 'C', 3);
    let cam = uniform("CaM", &["4"], 'G', 2);
    let matrix = Supermatrix::build(&[its, bena, cam]).unwrap();

    // Taxa in order of first occurrence
    assert_eq!(matrix.taxa().collect::<Vec<_>>(), vec!["1", "2", "3", "4"]);
    assert_eq!(matrix.get("1"), Some("AAAAA-----"));
    assert_eq!(matrix.get("2"), Some("AAAAACCC--"));
    assert_eq!(matrix.get("3"), Some("-----CCC--"));
    assert_eq!(matrix.get("4"), Some("--------GG"));
    assert!(matrix.rows().iter().all(|r| r.len() == matrix.num_columns()));
}

#[test]
fn test_intersection_policy() {
    let its = uniform("ITS", &["1", "2", "3"], 'A', 2);
    let bena = uniform("BenA", &["3", "2"], 'C', 2);
    let matrix = SupermatrixBuilder::new()
        .with_policy(TaxonPolicy::Intersection)
        .extend([its, bena])
        .build()
        .unwrap();
    assert_eq!(matrix.taxa().collect::<Vec<_>>(), vec!["2", "3"]);

    let disjoint = SupermatrixBuilder::new()
        .with_policy(TaxonPolicy::Intersection)
        .add(uniform("ITS", &["1"], 'A', 2))
        .add(uniform("BenA", &["2"], 'C', 2))
        .build();
    assert_eq!(disjoint.unwrap_err().kind(), &PipelineErrorType::EmptyInput);
}

#[test]
fn test_build_is_deterministic() {
    // Taxa 7 and 3 first appear in later markers
    let markers = vec![
        alignment("ITS", &[("5", "AC-T"), ("1", "ACGT")]),
        alignment("BenA", &[("7", "GGA"), ("1", "GG-"), ("3", "GCA")]),
        alignment("CaM", &[("3", "TT"), ("9", "TA")]),
    ];

    let first = SupermatrixBuilder::new().extend(markers.clone()).build().unwrap();
    let second = SupermatrixBuilder::new().extend(markers.clone()).build().unwrap();

    assert_eq!(first.taxa().collect::<Vec<_>>(), vec!["5", "1", "7", "3", "9"]);
    assert_eq!(first.to_fasta(), second.to_fasta());
    assert_eq!(first.raxml_partitions(), second.raxml_partitions());
    assert_eq!(first.raxml_partitions(), "ITS = 1-4\nBenA = 5-7\nCaM = 8-9\n");
    assert_eq!(Supermatrix::build(&markers).unwrap().to_fasta(), first.to_fasta());
}

#[test]
fn test_marker_without_columns() {
    let empty = SequenceSet::from_pairs("ITS", [("1", "")]).unwrap();
    let err = MarkerAlignment::new(empty).unwrap_err();
    assert_eq!(err.kind(), &PipelineErrorType::EmptyInput);
    assert_eq!(err.subject(), "ITS");

    // A single unaligned sequence is taken as is and must not reach the builder
    let runner = AlignmentRunner::from_config(&AlignConfig::default());
    let single = SequenceSet::from_pairs("ITS", [("1", "")]).unwrap();
    assert_eq!(runner.align(&single).unwrap_err().kind(), &PipelineErrorType::EmptyInput);
}

#[test]
fn test_no_alignments() {
    let err = SupermatrixBuilder::new().build().unwrap_err();
    assert_eq!(err.kind(), &PipelineErrorType::EmptyInput);
}

#[test]
fn test_split_partitioned_alignment() {
    let its = alignment("ITS", &[("1", "AC-T"), ("2", "ACGT")]);
    let bena = alignment("BenA", &[("2", "GA"), ("3", "G-")]);
    let matrix = Supermatrix::build(&[its.clone(), bena.clone()]).unwrap();

    let markers =
        Supermatrix::from_partitioned(&matrix.to_alignment().unwrap(), matrix.partitions()).unwrap();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].sequences(), its.sequences());
    assert_eq!(markers[1].sequences(), bena.sequences());
}

#[test]
fn test_split_rejects_partial_cover() {
    let matrix = alignment("supermatrix", &[("1", "ACGTAC")]);
    let err = Supermatrix::from_partitioned(&matrix, &[Partition::new("ITS", 1, 4)]).unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::InvalidAlignment(_)));

    let gap = [Partition::new("ITS", 1, 2), Partition::new("BenA", 4, 6)];
    assert!(Supermatrix::from_partitioned(&matrix, &gap).is_err());
}

#[test]
fn test_partition_file_formats() {
    let text = "# written by fungphy\nDNA, ITS = 1-520\n\nBenA = 521-1000\n";
    let partitions = parse_partitions(text).unwrap();
    assert_eq!(
        partitions,
        vec![Partition::new("ITS", 1, 520), Partition::new("BenA", 521, 1000)]
    );

    assert!(parse_partitions("ITS = 10-5\n").is_err());
    assert!(parse_partitions("ITS 1-5\n").is_err());
}

#[test]
fn test_files_round_trip() {
    let fasta = ">1\nAC-T--\n>2\nACGTGA\n>3\n----GG\n";
    let rows = read_fasta_str(fasta, "supermatrix").unwrap();
    let matrix = MarkerAlignment::new(rows).unwrap();

    let mut partition_file = NamedTempFile::new().unwrap();
    write!(partition_file, "ITS = 1-4\nBenA = 5-6\n").unwrap();
    let partitions = read_partitions(partition_file.path()).unwrap();

    let markers = Supermatrix::from_partitioned(&matrix, &partitions).unwrap();
    let out = NamedTempFile::new().unwrap();
    write_fasta_file(out.path(), markers[1].sequences()).unwrap();

    let bena = read_fasta_file(out.path(), Some("BenA")).unwrap();
    assert_eq!(bena.ids().collect::<Vec<_>>(), vec!["2", "3"]);
    assert_eq!(bena.get("3"), Some("GG"));
}
