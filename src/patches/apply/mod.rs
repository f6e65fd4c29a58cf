//! Applies pending patches with `git am`, one at a time, in name order.
//!
//! Each applied patch moves into `done`. The first patch git cannot apply
//! stops the run: `git am --abort` restores the work tree and the patch stays
//! pending so it can be fixed by hand.

mod git;

pub use git::GitMailboxApply;

use camino::Utf8Path;

use crate::error::PatchError;
use crate::persistence::PatchManifest;
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::name::PatchFileName;
use super::store::PatchDirectory;

/// Result of applying a single patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The patch applied and was committed.
    Applied,
    /// The patch did not apply.
    Conflict {
        /// Output of the failed command.
        details: String,
    },
}

/// Applies mailbox patches to a work tree.
#[cfg_attr(test, mockall::automock)]
pub trait MailboxApply {
    /// Applies one patch file.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Git`] when the apply command cannot be run at
    /// all; a patch that runs but fails is an [`ApplyOutcome::Conflict`].
    fn apply(&self, patch: &Utf8Path) -> Result<ApplyOutcome, PatchError>;

    /// Abandons a failed apply and restores the work tree.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Git`] when the abort fails.
    fn abort(&self) -> Result<(), PatchError>;
}

/// Where an apply run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyHalt {
    /// Patch that failed to apply; still pending.
    pub patch: PatchFileName,
    /// Output of the failed apply.
    pub details: String,
}

/// Outcome of an apply run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Patches applied and moved to `done`, in order.
    pub applied: Vec<PatchFileName>,
    /// The failing patch when the run stopped early.
    pub halted: Option<ApplyHalt>,
}

impl ApplyReport {
    /// Returns true when every pending patch applied.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.halted.is_none()
    }
}

/// Drives a [`MailboxApply`] over the pending patches of a directory.
pub struct PatchApplier<'a, Apply>
where
    Apply: MailboxApply,
{
    mailbox: &'a Apply,
    store: &'a PatchDirectory,
    manifest: Option<&'a PatchManifest>,
    telemetry: &'a dyn TelemetrySink,
}

impl<'a, Apply> PatchApplier<'a, Apply>
where
    Apply: MailboxApply,
{
    /// Creates an applier for the pending patches in `store`.
    #[must_use]
    pub const fn new(mailbox: &'a Apply, store: &'a PatchDirectory) -> Self {
        Self {
            mailbox,
            store,
            manifest: None,
            telemetry: &NoopTelemetrySink,
        }
    }

    /// Also stamps applied patches in the manifest.
    #[must_use]
    pub const fn with_manifest(mut self, manifest: Option<&'a PatchManifest>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Records telemetry for applied patches and halts.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Applies every pending patch, stopping at the first conflict.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::MissingPatchDirectory`] when the directory does
    /// not exist, and git, I/O, or manifest failures unchanged. A conflict is
    /// not an error; it is reported in [`ApplyReport::halted`].
    pub fn apply_pending(&self) -> Result<ApplyReport, PatchError> {
        let pending = self.store.pending()?;
        tracing::info!(count = pending.len(), directory = %self.store.root(), "applying patches");

        let mut report = ApplyReport::default();
        for name in pending {
            let path = self.store.pending_path(&name);
            match self.mailbox.apply(&path)? {
                ApplyOutcome::Applied => {
                    self.record_applied(&name)?;
                    report.applied.push(name);
                }
                ApplyOutcome::Conflict { details } => {
                    tracing::warn!(patch = %name, "patch failed to apply, aborting");
                    self.mailbox.abort()?;
                    self.telemetry.record(TelemetryEvent::ApplyHalted {
                        file_name: name.as_str().to_owned(),
                    });
                    report.halted = Some(ApplyHalt {
                        patch: name,
                        details,
                    });
                    break;
                }
            }
        }
        Ok(report)
    }

    fn record_applied(&self, name: &PatchFileName) -> Result<(), PatchError> {
        self.store.mark_done(name)?;
        tracing::info!(patch = %name, "patch applied");

        if let Some(manifest) = self.manifest
            && !manifest.mark_applied(name, PatchManifest::now_unix_seconds())?
        {
            tracing::debug!(patch = %name, "applied patch is not in the manifest");
        }
        self.telemetry.record(TelemetryEvent::PatchApplied {
            file_name: name.as_str().to_owned(),
        });
        Ok(())
    }
}
