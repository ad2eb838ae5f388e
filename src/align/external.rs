//! Running external programs: alignment tools and tree inference.
//!
//! Input goes through a temporary FASTA file, output is captured from
//! stdout. Executables resolve from explicit configuration, then an
//! environment variable, then the plain program name on `PATH`.

use crate::align::{AlignmentTool, SequenceAligner};
use crate::config::AlignConfig;
use crate::error::{PipelineError, Result};
use crate::fasta::{read_fasta_str, write_fasta};
use crate::model::sequence::SequenceSet;
use log::{debug, trace};
use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

/// Interval for polling a running tool with a deadline
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// =#========================================================================#=
// TOOL COMMAND
// =#========================================================================#=
/// Invocation of an external program whose result is read from stdout.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
    env_var: &'static str,
}

impl ToolCommand {
    /// Creates a command for `program`; `env_var` is named in error messages
    /// as the way to override the executable.
    pub fn new(program: PathBuf, env_var: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
            env_var,
        }
    }

    /// Appends an argument.
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets a deadline after which the program gets killed.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path or name of the program
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments in order
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Runs the program to completion and returns its stdout.
    ///
    /// # Errors
    /// A message describing why the program could not be started, was
    /// killed at the deadline, or exited unsuccessfully (with its stderr).
    pub fn run(&self) -> std::result::Result<String, String> {
        debug!("Running {} {:?}", self.program.display(), self.args);

        let mut stdout = tempfile::tempfile().map_err(|e| format!("no temporary file: {e}"))?;
        let mut stderr = tempfile::tempfile().map_err(|e| format!("no temporary file: {e}"))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(clone_handle(&stdout)?)
            .stderr(clone_handle(&stderr)?)
            .spawn()
            .map_err(|e| {
                format!(
                    "could not execute '{}' (set {} to override): {}",
                    self.program.display(),
                    self.env_var,
                    e
                )
            })?;

        let started = Instant::now();
        let status = loop {
            match child.try_wait().map_err(|e| e.to_string())? {
                Some(status) => break status,
                None => {
                    if self.timeout.is_some_and(|limit| started.elapsed() >= limit) {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(format!(
                            "'{}' timed out after {:?}",
                            self.program.display(),
                            started.elapsed()
                        ));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        };
        trace!("{} finished in {:?}", self.program.display(), started.elapsed());

        let out = read_back(&mut stdout)?;
        if !status.success() {
            let err = read_back(&mut stderr)?;
            let detail = if !err.trim().is_empty() {
                err.trim().to_string()
            } else {
                format!("exit status {status}")
            };
            return Err(format!("'{}' failed: {}", self.program.display(), detail));
        }

        Ok(out)
    }
}

fn clone_handle(file: &File) -> std::result::Result<Stdio, String> {
    file.try_clone()
        .map(Stdio::from)
        .map_err(|e| format!("no temporary file: {e}"))
}

fn read_back(file: &mut File) -> std::result::Result<String, String> {
    let mut buffer = String::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_string(&mut buffer))
        .map_err(|e| format!("could not read tool output: {e}"))?;
    Ok(buffer)
}

/// Resolves the executable: explicit path, then `env_var`, then `default`.
pub fn resolve_executable(explicit: Option<&Path>, env_var: &str, default: &str) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var_os(env_var) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default),
    }
}

/// Writes `set` to a temporary FASTA file that lives as long as the handle.
pub(crate) fn write_temp_fasta(set: &SequenceSet) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("fungphy-")
        .suffix(".fasta")
        .tempfile()?;
    write_fasta(&mut file, set)?;
    file.flush()?;
    Ok(file)
}

// =#========================================================================#=
// EXTERNAL ALIGNER
// =#========================================================================#=
/// [SequenceAligner] running MAFFT or MUSCLE.
///
/// * MAFFT: `mafft --auto --quiet <input>`
/// * MUSCLE: `muscle -in <input> -quiet`
#[derive(Debug, Clone)]
pub struct ExternalAligner {
    tool: AlignmentTool,
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl ExternalAligner {
    /// Creates an aligner for the tool selected in `config`.
    pub fn new(config: &AlignConfig) -> Self {
        let executable = resolve_executable(
            config.executable.as_deref(),
            config.tool.env_var(),
            config.tool.program(),
        );
        Self {
            tool: config.tool,
            executable,
            timeout: config.timeout,
        }
    }

    /// Tool this aligner runs
    pub fn tool(&self) -> AlignmentTool {
        self.tool
    }

    /// Builds the command line for aligning `input`.
    pub fn command(&self, input: &Path) -> ToolCommand {
        let command = ToolCommand::new(self.executable.clone(), self.tool.env_var())
            .timeout(self.timeout);
        match self.tool {
            AlignmentTool::Mafft => command.arg("--auto").arg("--quiet").arg(input),
            AlignmentTool::Muscle => command.arg("-in").arg(input).arg("-quiet"),
        }
    }
}

impl SequenceAligner for ExternalAligner {
    fn name(&self) -> &str {
        self.tool.program()
    }

    fn align_raw(&self, sequences: &SequenceSet) -> Result<SequenceSet> {
        let marker = sequences.name();
        let input = write_temp_fasta(sequences).map_err(|e| PipelineError::io(marker, e))?;

        let output = self
            .command(input.path())
            .run()
            .map_err(|msg| PipelineError::alignment_tool(marker, msg))?;

        read_fasta_str(&output, marker).map_err(|e| {
            PipelineError::alignment_tool(marker, format!("unreadable output: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_executable_wins() {
        let path = resolve_executable(Some(Path::new("/opt/mafft")), "FUNGPHY_TEST_UNSET", "mafft");
        assert_eq!(path, PathBuf::from("/opt/mafft"));
        let path = resolve_executable(None, "FUNGPHY_TEST_UNSET", "mafft");
        assert_eq!(path, PathBuf::from("mafft"));
    }

    #[test]
    fn test_command_lines() {
        let mafft = ExternalAligner::new(&AlignConfig::for_tool(AlignmentTool::Mafft));
        let args: Vec<_> = mafft.command(Path::new("in.fasta")).args().to_vec();
        assert_eq!(args, vec!["--auto", "--quiet", "in.fasta"]);

        let muscle = ExternalAligner::new(&AlignConfig::for_tool(AlignmentTool::Muscle));
        let args: Vec<_> = muscle.command(Path::new("in.fasta")).args().to_vec();
        assert_eq!(args, vec!["-in", "in.fasta", "-quiet"]);
    }

    #[test]
    fn test_missing_program_names_override() {
        let err = ToolCommand::new(PathBuf::from("/nonexistent/fungphy-tool"), MISSING_ENV)
            .run()
            .unwrap_err();
        assert!(err.contains(MISSING_ENV));
    }

    const MISSING_ENV: &str = "FUNGPHY_TEST_BIN";
}
