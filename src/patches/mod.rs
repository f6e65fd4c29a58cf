//! Patch files: naming, storage, fetching, applying, and verification.
//!
//! A milestone's merged pull requests become mailbox patches named by merge
//! time in a patch directory. Applying them moves each into `done`;
//! verification checks that everything in `done` reached the release branch.

mod apply;
mod fetch;
mod name;
mod store;
mod verify;

pub use apply::{
    ApplyHalt, ApplyOutcome, ApplyReport, GitMailboxApply, MailboxApply, PatchApplier,
};
pub use fetch::{FetchReport, MilestoneFetcher, UnmilestonedFix};
pub use name::{PATCH_EXTENSION, PatchFileName, PatchRecord};
pub use store::{DONE_DIR, PatchDirectory};
pub use verify::{MissingSubject, VerifyReport, verify_applied};

#[cfg(test)]
pub use apply::MockMailboxApply;
