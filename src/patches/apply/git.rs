//! `git am` subprocess.

use std::process::{Command, Output};

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{PatchError, io_error};

use super::{ApplyOutcome, MailboxApply};

const DEFAULT_GIT_PROGRAM: &str = "git";

/// Applies patches by running `git am` against a work tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitMailboxApply {
    program: String,
    work_tree: Option<Utf8PathBuf>,
}

impl GitMailboxApply {
    /// Runs `git` in `work_tree`, or in the current directory when `None`.
    #[must_use]
    pub fn new(work_tree: Option<Utf8PathBuf>) -> Self {
        Self {
            program: DEFAULT_GIT_PROGRAM.to_owned(),
            work_tree,
        }
    }

    /// Uses a different git executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments for one invocation, including the `-C` prefix.
    pub(crate) fn arguments(&self, git_args: &[&str]) -> Vec<String> {
        let mut args = Vec::with_capacity(git_args.len() + 2);
        if let Some(work_tree) = &self.work_tree {
            args.push("-C".to_owned());
            args.push(work_tree.to_string());
        }
        args.extend(git_args.iter().map(|arg| (*arg).to_owned()));
        args
    }

    fn run(&self, git_args: &[&str]) -> Result<Output, PatchError> {
        let args = self.arguments(git_args);
        tracing::debug!(program = %self.program, ?args, "running git");
        Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|error| PatchError::Git {
                message: format!("failed to run {}: {error}", self.program),
            })
    }

    /// `git -C` changes directory before reading the patch path.
    fn resolve_patch(&self, patch: &Utf8Path) -> Result<Utf8PathBuf, PatchError> {
        if self.work_tree.is_none() || patch.is_absolute() {
            return Ok(patch.to_path_buf());
        }
        patch
            .canonicalize_utf8()
            .map_err(|error| io_error(&format!("resolve {patch}"), &error))
    }

    /// Whether an `am` session is waiting to be resumed or aborted.
    ///
    /// `git am` rejects malformed patches, a dirty index, or a missing
    /// identity before it creates a session; aborting then fails.
    fn session_in_progress(&self) -> Result<bool, PatchError> {
        let output = self.run(&["rev-parse", "--git-path", "rebase-apply"])?;
        if !output.status.success() {
            return Err(PatchError::Git {
                message: format!(
                    "git rev-parse --git-path failed: {}",
                    combined_output(&output)
                ),
            });
        }

        let reported = Utf8PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        let session = match &self.work_tree {
            Some(work_tree) if reported.is_relative() => work_tree.join(reported),
            _ => reported,
        };
        Ok(session.is_dir())
    }
}

impl Default for GitMailboxApply {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MailboxApply for GitMailboxApply {
    fn apply(&self, patch: &Utf8Path) -> Result<ApplyOutcome, PatchError> {
        let resolved = self.resolve_patch(patch)?;
        let output = self.run(&["am", resolved.as_str()])?;
        if output.status.success() {
            Ok(ApplyOutcome::Applied)
        } else {
            Ok(ApplyOutcome::Conflict {
                details: combined_output(&output),
            })
        }
    }

    fn abort(&self) -> Result<(), PatchError> {
        if !self.session_in_progress()? {
            tracing::debug!("no am session to abort");
            return Ok(());
        }
        let output = self.run(&["am", "--abort"])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(PatchError::Git {
                message: format!("git am --abort failed: {}", combined_output(&output)),
            })
        }
    }
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    [stdout.trim(), stderr.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
