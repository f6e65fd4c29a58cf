//! Patch records and the timestamp-ordered file names they are stored under.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::PatchError;
use crate::github::PullRequestNumber;

/// Extension every stored patch carries.
pub const PATCH_EXTENSION: &str = ".patch";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// File name of a stored patch.
///
/// Names built by [`PatchFileName::for_pull_request`] start with the merge
/// timestamp, so lexical order is merge order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatchFileName(String);

impl PatchFileName {
    /// Builds the name `<merged_at>--PR<number>.patch`.
    #[must_use]
    pub fn for_pull_request(merged_at: DateTime<Utc>, number: PullRequestNumber) -> Self {
        Self(format!(
            "{}--PR{}{PATCH_EXTENSION}",
            merged_at.format(TIMESTAMP_FORMAT),
            number.get()
        ))
    }

    /// Validates an existing file name.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::InvalidPatchName`] when the name is empty, lacks
    /// the `.patch` extension, or contains a path separator.
    pub fn parse(name: &str) -> Result<Self, PatchError> {
        let valid = name.len() > PATCH_EXTENSION.len()
            && name.ends_with(PATCH_EXTENSION)
            && !name.contains(['/', '\\']);
        if valid {
            Ok(Self(name.to_owned()))
        } else {
            Err(PatchError::InvalidPatchName {
                name: name.to_owned(),
            })
        }
    }

    /// Borrow the file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatchFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatchFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A downloaded patch, held in memory until it is written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    /// When the pull request was merged.
    pub merged_at: DateTime<Utc>,
    /// Pull request the patch came from.
    pub pull_request: PullRequestNumber,
    /// Mailbox-formatted patch text.
    pub content: String,
}

impl PatchRecord {
    /// The file name this record is stored under.
    #[must_use]
    pub fn file_name(&self) -> PatchFileName {
        PatchFileName::for_pull_request(self.merged_at, self.pull_request)
    }
}
