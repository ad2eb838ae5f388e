//! Errors raised by the alignment, concatenation and annotation pipeline.
//!
//! Every [PipelineError] names its `subject`, the marker, tree input or
//! file the failure belongs to, so that bad source data can be traced back.

use crate::parser::ParsingError;
use std::error::Error;
use std::fmt;

// =#========================================================================#=
// PIPELINE ERROR TYPE
// =#========================================================================#=
/// Kinds of failures in the pipeline.
#[derive(PartialEq, Debug, Clone)]
pub enum PipelineErrorType {
    /// No sequences, alignments or trees were supplied
    EmptyInput,
    /// External alignment tool failed or produced unusable output
    AlignmentTool(String),
    /// External tree inference tool failed or produced unusable output
    TreeBuild(String),
    /// Tool name not among the supported choices
    UnsupportedTool(String),
    /// Outgroup names did not resolve to any leaf
    NoOutgroupMatch(String),
    /// Trees to be merged do not share the same leaf set (strict mode)
    LeafSetMismatch(String),
    /// Input alignment is malformed, e.g. rows of unequal length
    InvalidAlignment(String),
    /// Reading or writing failed
    Io(String),
    /// Input could not be parsed
    Parsing(String),
}

// =#========================================================================#=
// PIPELINE ERROR
// =#========================================================================#=
/// Error of a pipeline operation, with the name of the offending input.
#[derive(Debug, Clone)]
pub struct PipelineError {
    kind: PipelineErrorType,
    subject: String,
}

impl PipelineError {
    /// Creates a new error of the given kind about `subject`.
    pub fn new<S: Into<String>>(kind: PipelineErrorType, subject: S) -> Self {
        Self {
            kind,
            subject: subject.into(),
        }
    }

    /// Convenience constructor for EmptyInput
    pub fn empty_input<S: Into<String>>(subject: S) -> Self {
        Self::new(PipelineErrorType::EmptyInput, subject)
    }

    /// Convenience constructor for AlignmentTool
    pub fn alignment_tool<S: Into<String>>(subject: S, msg: String) -> Self {
        Self::new(PipelineErrorType::AlignmentTool(msg), subject)
    }

    /// Convenience constructor for TreeBuild
    pub fn tree_build<S: Into<String>>(subject: S, msg: String) -> Self {
        Self::new(PipelineErrorType::TreeBuild(msg), subject)
    }

    /// Convenience constructor for UnsupportedTool
    pub fn unsupported_tool(name: &str) -> Self {
        Self::new(PipelineErrorType::UnsupportedTool(name.to_string()), name)
    }

    /// Convenience constructor for NoOutgroupMatch
    pub fn no_outgroup_match<S: Into<String>>(subject: S, names: &[String]) -> Self {
        Self::new(PipelineErrorType::NoOutgroupMatch(names.join(", ")), subject)
    }

    /// Convenience constructor for LeafSetMismatch
    pub fn leaf_set_mismatch<S: Into<String>>(subject: S, msg: String) -> Self {
        Self::new(PipelineErrorType::LeafSetMismatch(msg), subject)
    }

    /// Convenience constructor for InvalidAlignment
    pub fn invalid_alignment<S: Into<String>>(subject: S, msg: String) -> Self {
        Self::new(PipelineErrorType::InvalidAlignment(msg), subject)
    }

    /// Wraps a [ParsingError] raised while reading `subject`.
    pub fn parsing<S: Into<String>>(subject: S, err: ParsingError) -> Self {
        Self::new(PipelineErrorType::Parsing(err.to_string()), subject)
    }

    /// Wraps an I/O error raised while accessing `subject`.
    pub fn io<S: Into<String>>(subject: S, err: std::io::Error) -> Self {
        Self::new(PipelineErrorType::Io(err.to_string()), subject)
    }

    /// Get the error kind
    pub fn kind(&self) -> &PipelineErrorType {
        &self.kind
    }

    /// Get the name of the marker, tree or file this error is about
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let subject = &self.subject;
        match &self.kind {
            PipelineErrorType::EmptyInput => write!(f, "[{subject}] No input supplied"),
            PipelineErrorType::AlignmentTool(msg) => {
                write!(f, "[{subject}] Alignment tool failed - {msg}")
            }
            PipelineErrorType::TreeBuild(msg) => {
                write!(f, "[{subject}] Tree building failed - {msg}")
            }
            PipelineErrorType::UnsupportedTool(name) => {
                write!(f, "Unsupported tool '{name}'")
            }
            PipelineErrorType::NoOutgroupMatch(names) => {
                write!(f, "[{subject}] No leaf matches outgroup {names}")
            }
            PipelineErrorType::LeafSetMismatch(msg) => {
                write!(f, "[{subject}] Leaf sets differ - {msg}")
            }
            PipelineErrorType::InvalidAlignment(msg) => {
                write!(f, "[{subject}] Invalid alignment - {msg}")
            }
            PipelineErrorType::Io(msg) => write!(f, "[{subject}] IO error - {msg}"),
            PipelineErrorType::Parsing(msg) => write!(f, "[{subject}] {msg}"),
        }
    }
}

impl Error for PipelineError {}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
