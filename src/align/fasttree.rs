//! Tree inference from a supermatrix with FastTree.

use crate::align::external::{ToolCommand, resolve_executable, write_temp_fasta};
use crate::config::{FASTTREE_BIN_ENV, TreeBuildConfig};
use crate::error::{PipelineError, Result};
use crate::model::supermatrix::{SUPERMATRIX_NAME, Supermatrix};
use crate::model::tree::PhyloTree;
use crate::newick;
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default FastTree program name
const FASTTREE_PROGRAM: &str = "FastTree";

/// Something that infers a Newick tree from a supermatrix.
pub trait TreeInference {
    /// Infers a tree and returns it as Newick string.
    ///
    /// # Errors
    /// `TreeBuild` if the tool fails or its output is not a Newick tree.
    fn infer(&self, matrix: &Supermatrix) -> Result<String>;

    /// Infers a tree and parses it. The tree is named after the matrix so
    /// later errors point back to it.
    fn infer_tree(&self, matrix: &Supermatrix) -> Result<PhyloTree> {
        let newick = self.infer(matrix)?;
        let tree = newick::parse_str(&newick)
            .map_err(|e| PipelineError::tree_build(SUPERMATRIX_NAME, e.to_string()))?;
        Ok(tree.with_name(format!("{SUPERMATRIX_NAME} tree")))
    }
}

// =#========================================================================#=
// FASTTREE
// =#========================================================================#=
/// [TreeInference] running FastTree:
/// `FastTree [-nt] [-gtr] [-gamma] -quiet -nopr <input>`
#[derive(Debug, Clone)]
pub struct FastTree {
    executable: PathBuf,
    gtr: bool,
    gamma: bool,
    nucleotide: bool,
    timeout: Option<Duration>,
}

impl FastTree {
    /// Creates the adapter for the model selected in `config`.
    pub fn new(config: &TreeBuildConfig) -> Self {
        Self {
            executable: resolve_executable(
                config.executable.as_deref(),
                FASTTREE_BIN_ENV,
                FASTTREE_PROGRAM,
            ),
            gtr: config.gtr,
            gamma: config.gamma,
            nucleotide: config.nucleotide,
            timeout: config.timeout,
        }
    }

    /// Builds the command line for the alignment in `input`.
    pub fn command(&self, input: &Path) -> ToolCommand {
        let mut command =
            ToolCommand::new(self.executable.clone(), FASTTREE_BIN_ENV).timeout(self.timeout);
        if self.nucleotide {
            command = command.arg("-nt");
        }
        if self.gtr {
            command = command.arg("-gtr");
        }
        if self.gamma {
            command = command.arg("-gamma");
        }
        command.arg("-quiet").arg("-nopr").arg(input)
    }
}

impl TreeInference for FastTree {
    fn infer(&self, matrix: &Supermatrix) -> Result<String> {
        let input = write_temp_fasta(matrix.rows())
            .map_err(|e| PipelineError::io(SUPERMATRIX_NAME, e))?;

        let output = self
            .command(input.path())
            .run()
            .map_err(|msg| PipelineError::tree_build(SUPERMATRIX_NAME, msg))?;

        let newick = output.trim().to_string();
        if let Err(e) = newick::parse_str(&newick) {
            return Err(PipelineError::tree_build(
                SUPERMATRIX_NAME,
                format!("output is not a Newick tree: {e}"),
            ));
        }

        info!(
            "Inferred tree for {} taxa over {} columns",
            matrix.num_taxa(),
            matrix.num_columns()
        );
        Ok(newick)
    }
}
