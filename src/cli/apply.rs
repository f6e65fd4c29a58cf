//! Apply operation: feed pending patches to `git am`.

use std::io;

use camino::Utf8PathBuf;
use milepatch::{GitMailboxApply, MilepatchConfig, PatchApplier, PatchDirectory, PatchError};

use super::output::write_apply_report;
use super::{Completion, open_manifest, telemetry_sink};

/// Applies the pending patches in `directory` in name order.
///
/// Returns [`Completion::Incomplete`] when `git am` rejects a patch; the
/// rejected patch stays pending and nothing after it is attempted.
///
/// # Errors
///
/// Returns [`PatchError::MissingPatchDirectory`] when `directory` does not
/// exist, [`PatchError::Git`] when `git` cannot be run, and I/O errors while
/// moving patches.
pub fn run(config: &MilepatchConfig, directory: Utf8PathBuf) -> Result<Completion, PatchError> {
    let store = PatchDirectory::new(directory);
    let mailbox = GitMailboxApply::new(config.work_tree());
    let telemetry = telemetry_sink(config);
    let manifest = open_manifest(config, telemetry.as_ref())?;

    let report = PatchApplier::new(&mailbox, &store)
        .with_manifest(manifest.as_ref())
        .with_telemetry(telemetry.as_ref())
        .apply_pending()?;

    write_apply_report(&mut io::stdout().lock(), &report)?;
    Ok(if report.is_complete() {
        Completion::Complete
    } else {
        Completion::Incomplete
    })
}
