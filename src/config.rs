//! Configuration values passed explicitly to each pipeline step.

use crate::align::AlignmentTool;
use crate::model::support::SupportScale;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// Default maximal fraction of gaps in a column kept when trimming
pub const DEFAULT_GAP_THRESHOLD: f64 = 0.5;

/// Default colors cycled through for section annotations
pub const DEFAULT_PALETTE: &[&str] = &[
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#a65628", "#f781bf", "#999999",
];

/// Environment variable overriding the MAFFT executable
pub const MAFFT_BIN_ENV: &str = "FUNGPHY_MAFFT_BIN";
/// Environment variable overriding the MUSCLE executable
pub const MUSCLE_BIN_ENV: &str = "FUNGPHY_MUSCLE_BIN";
/// Environment variable overriding the FastTree executable
pub const FASTTREE_BIN_ENV: &str = "FUNGPHY_FASTTREE_BIN";

// ============================================================================
// Alignment
// ============================================================================
/// Settings of the alignment step.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    /// Alignment tool to run
    pub tool: AlignmentTool,
    /// Whether to remove gap-rich columns after aligning
    pub trim: bool,
    /// Columns with a larger fraction of gaps are removed when trimming
    pub gap_threshold: f64,
    /// Explicit path of the tool executable
    pub executable: Option<PathBuf>,
    /// Deadline for a single tool run
    pub timeout: Option<Duration>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            tool: AlignmentTool::Mafft,
            trim: false,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            executable: None,
            timeout: None,
        }
    }
}

impl AlignConfig {
    /// Creates the default configuration for `tool`.
    pub fn for_tool(tool: AlignmentTool) -> Self {
        Self {
            tool,
            ..Default::default()
        }
    }

    /// Enables trimming of columns with more than `gap_threshold` gaps.
    pub fn with_trimming(mut self, gap_threshold: f64) -> Self {
        self.trim = true;
        self.gap_threshold = gap_threshold;
        self
    }
}

// ============================================================================
// Tree building
// ============================================================================
/// Settings of the tree inference step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeBuildConfig {
    /// Generalized time-reversible model instead of Jukes-Cantor
    pub gtr: bool,
    /// Gamma-distributed rate variation among sites
    pub gamma: bool,
    /// Whether sequences are nucleotides (protein otherwise)
    pub nucleotide: bool,
    /// Explicit path of the tool executable
    pub executable: Option<PathBuf>,
    /// Deadline for the tool run
    pub timeout: Option<Duration>,
}

impl TreeBuildConfig {
    /// Nucleotide analysis with the given model flags.
    pub fn nucleotide(gtr: bool, gamma: bool) -> Self {
        Self {
            gtr,
            gamma,
            nucleotide: true,
            ..Default::default()
        }
    }
}

// ============================================================================
// Annotation
// ============================================================================
/// Settings of tree annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationConfig {
    /// Species epithets whose leaves are printed in bold
    pub bold: BTreeSet<String>,
    /// Species epithets whose leaves show the type strain designation
    pub show_type: BTreeSet<String>,
    /// Species names to root the tree on
    pub outgroup: Vec<String>,
    /// Sections named like this are not annotated
    pub exclude_section: Option<String>,
    /// Colors cycled through for section annotations
    pub palette: Vec<String>,
    /// Scale of the support values
    pub support_scale: SupportScale,
    /// Fail instead of annotating partially if merged trees differ in leaves
    pub strict: bool,
    /// Reverse child order at every vertex
    pub flip: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            bold: BTreeSet::new(),
            show_type: BTreeSet::new(),
            outgroup: Vec::new(),
            exclude_section: None,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            support_scale: SupportScale::Auto,
            strict: false,
            flip: false,
        }
    }
}
