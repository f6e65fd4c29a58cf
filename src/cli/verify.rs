//! Verify operation: check applied patches against a release branch.

use std::io;

use camino::Utf8Path;
use milepatch::{MilepatchConfig, PatchError, verify_applied};

use super::Completion;
use super::output::write_verify_report;

/// Checks that every subject in the configured `done` directory appears on
/// `branch` since its most recent release tag.
///
/// # Errors
///
/// Returns [`PatchError::Git`] when the repository or branch cannot be read,
/// [`PatchError::NoReleaseTags`] when the branch has no `<branch>.*` tag,
/// and [`PatchError::NoAppliedPatches`] when nothing has been applied.
pub fn run(
    config: &MilepatchConfig,
    repository: &Utf8Path,
    branch: &str,
) -> Result<Completion, PatchError> {
    let store = config.patch_directory();
    let report = verify_applied(repository, branch, &store)?;

    write_verify_report(&mut io::stdout().lock(), &report)?;
    Ok(if report.is_complete() {
        Completion::Complete
    } else {
        Completion::Incomplete
    })
}
