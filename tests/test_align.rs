use fungphy::align::{AlignmentRunner, AlignmentTool, SequenceAligner};
use fungphy::config::AlignConfig;
use fungphy::model::{SequenceRecord, SequenceSet};
use fungphy::{PipelineError, PipelineErrorType, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Pads sequences with trailing gaps to equal length, returning them
/// lowercase and in reverse order like some tools do.
#[derive(Default)]
struct PaddingAligner {
    calls: AtomicUsize,
}

impl SequenceAligner for PaddingAligner {
    fn name(&self) -> &str {
        "padding"
    }

    fn align_raw(&self, sequences: &SequenceSet) -> Result<SequenceSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if sequences.name() == "broken" {
            return Err(PipelineError::alignment_tool(
                sequences.name(),
                "exit status 1".to_string(),
            ));
        }

        let width = sequences.iter().map(|r| r.len()).max().unwrap_or(0);
        let records = sequences
            .iter()
            .rev()
            .map(|r| {
                let mut row = r.sequence().to_ascii_lowercase();
                row.extend(std::iter::repeat_n('-', width - r.len()));
                SequenceRecord::new(r.id(), row)
            })
            .collect();
        SequenceSet::new(sequences.name(), records)
    }
}

/// Returns its input untouched, whether aligned or not, minus the first row
/// if `drop_first` is set.
struct EchoAligner {
    drop_first: bool,
}

impl SequenceAligner for EchoAligner {
    fn name(&self) -> &str {
        "echo"
    }

    fn align_raw(&self, sequences: &SequenceSet) -> Result<SequenceSet> {
        let skip = usize::from(self.drop_first);
        SequenceSet::new(
            sequences.name(),
            sequences.iter().skip(skip).cloned().collect(),
        )
    }
}

fn its() -> SequenceSet {
    SequenceSet::from_pairs("ITS", [("1042", "ACGTAC"), ("2210", "ACG"), ("3377", "ACGTA")]).unwrap()
}

#[test]
fn test_rows_follow_input_order() {
    let runner = AlignmentRunner::new(PaddingAligner::default(), &AlignConfig::default());
    let msa = runner.align(&its()).unwrap();

    assert_eq!(msa.name(), "ITS");
    assert_eq!(msa.num_columns(), 6);
    assert_eq!(
        msa.sequences().ids().collect::<Vec<_>>(),
        vec!["1042", "2210", "3377"]
    );
    assert_eq!(msa.get("2210"), Some("ACG---"));
}

#[test]
fn test_trimming() {
    let config = AlignConfig::default().with_trimming(0.5);
    let runner = AlignmentRunner::new(PaddingAligner::default(), &config);
    let msa = runner.align(&its()).unwrap();

    // Column 6 is a gap in two of three rows
    assert_eq!(msa.num_columns(), 5);
    assert_eq!(msa.get("1042"), Some("ACGTA"));
}

#[test]
fn test_single_sequence_skips_tool() {
    let runner = AlignmentRunner::new(PaddingAligner::default(), &AlignConfig::default());
    let single = SequenceSet::from_pairs("BenA", [("1042", "ggca")]).unwrap();
    let msa = runner.align(&single).unwrap();

    assert_eq!(msa.get("1042"), Some("GGCA"));
    assert_eq!(runner.aligner().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_empty_input() {
    let runner = AlignmentRunner::new(PaddingAligner::default(), &AlignConfig::default());
    let empty = SequenceSet::new("CaM", Vec::new()).unwrap();
    let err = runner.align(&empty).unwrap_err();
    assert_eq!(err.kind(), &PipelineErrorType::EmptyInput);
    assert_eq!(err.subject(), "CaM");
}

#[test]
fn test_lost_identifier() {
    let runner = AlignmentRunner::new(EchoAligner { drop_first: true }, &AlignConfig::default());
    let err = runner.align(&its()).unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::AlignmentTool(_)));
    assert_eq!(err.subject(), "ITS");
}

#[test]
fn test_ragged_output() {
    let runner = AlignmentRunner::new(EchoAligner { drop_first: false }, &AlignConfig::default());
    let err = runner.align(&its()).unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::AlignmentTool(_)));
}

#[test]
fn test_failing_marker_does_not_stop_others() {
    let runner = AlignmentRunner::new(PaddingAligner::default(), &AlignConfig::default());
    let sets = vec![
        its(),
        SequenceSet::from_pairs("broken", [("1", "A"), ("2", "AC")]).unwrap(),
        SequenceSet::from_pairs("BenA", [("1", "GG"), ("2", "G")]).unwrap(),
    ];

    let results = runner.align_all(&sets);
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().name(), "BenA");

    let aligned = runner.align_all_lenient(&sets);
    let names: Vec<&str> = aligned.iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["ITS", "BenA"]);
}

#[test]
fn test_tool_names() {
    assert_eq!("mafft".parse::<AlignmentTool>().unwrap(), AlignmentTool::Mafft);
    assert_eq!("MUSCLE".parse::<AlignmentTool>().unwrap(), AlignmentTool::Muscle);

    let err = "clustalw".parse::<AlignmentTool>().unwrap_err();
    assert!(matches!(err.kind(), PipelineErrorType::UnsupportedTool(_)));
}
