//! Checks that applied patches landed on a release branch.
//!
//! The branch is compared against its latest release tag: every commit
//! reachable from the branch but not from the tag contributes a subject,
//! and every patch in `done` must match one of them.

mod subjects;

use std::collections::BTreeMap;

use camino::Utf8Path;
use git2::{Oid, Repository};

use crate::error::PatchError;

use super::name::PatchFileName;
use super::store::PatchDirectory;

/// A patch subject with no matching commit on the branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSubject {
    /// Subject line from the patch.
    pub subject: String,
    /// Applied patch that carries the subject.
    pub patch: PatchFileName,
}

/// Outcome of a verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Tag the branch was compared against.
    pub last_tag: String,
    /// Commits on the branch since the tag.
    pub commits: usize,
    /// Distinct patch subjects checked.
    pub subjects: usize,
    /// Subjects without a matching commit.
    pub missing: Vec<MissingSubject>,
}

impl VerifyReport {
    /// Returns true when every subject was found on the branch.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Verifies that every patch in `store`'s `done` directory appears on
/// `branch` since its latest `<branch>.*` tag.
///
/// # Errors
///
/// Returns [`PatchError::Git`] when the repository or branch cannot be
/// read, [`PatchError::NoReleaseTags`] when no tag matches, and
/// [`PatchError::NoAppliedPatches`] when `done` holds no patches.
pub fn verify_applied(
    repository: &Utf8Path,
    branch: &str,
    store: &PatchDirectory,
) -> Result<VerifyReport, PatchError> {
    let repo = Repository::open(repository)?;
    let last_tag = last_release_tag(&repo, branch)?;
    let commits = subjects_since(&repo, &last_tag, branch)?;
    tracing::debug!(tag = %last_tag, commits = commits.len(), "loaded branch history");

    let applied = applied_subjects(store)?;
    let missing = applied
        .iter()
        .filter(|(subject, _)| !is_accounted_for(subject, &commits))
        .map(|(subject, patch)| MissingSubject {
            subject: subject.clone(),
            patch: patch.clone(),
        })
        .collect();

    Ok(VerifyReport {
        last_tag,
        commits: commits.len(),
        subjects: applied.len(),
        missing,
    })
}

/// Latest tag named `<branch>.*`, in lexical order.
fn last_release_tag(repo: &Repository, branch: &str) -> Result<String, PatchError> {
    let pattern = format!("{branch}.*");
    let names = repo.tag_names(Some(&pattern))?;
    names
        .iter()
        .flatten()
        .max()
        .map(str::to_owned)
        .ok_or(PatchError::NoReleaseTags { pattern })
}

fn subjects_since(
    repo: &Repository,
    tag: &str,
    branch: &str,
) -> Result<Vec<String>, PatchError> {
    let tag_commit = repo.revparse_single(tag)?.peel_to_commit()?.id();
    let branch_commit = repo.revparse_single(branch)?.peel_to_commit()?.id();

    let mut walk = repo.revwalk()?;
    walk.push(branch_commit)?;
    walk.hide(tag_commit)?;
    walk.map(|oid| commit_subject(repo, oid?)).collect()
}

fn commit_subject(repo: &Repository, oid: Oid) -> Result<String, PatchError> {
    let commit = repo.find_commit(oid)?;
    Ok(commit.summary().unwrap_or_default().to_owned())
}

/// Subjects of every applied patch, each mapped to the last patch carrying it.
fn applied_subjects(
    store: &PatchDirectory,
) -> Result<BTreeMap<String, PatchFileName>, PatchError> {
    let done = store.done()?;
    if done.is_empty() {
        return Err(PatchError::NoAppliedPatches {
            path: store.done_root().to_string(),
        });
    }

    let mut applied = BTreeMap::new();
    for name in done {
        let contents = store.read_done(&name)?;
        for subject in subjects::mailbox_subjects(&contents) {
            applied.insert(subject, name.clone());
        }
    }
    Ok(applied)
}

/// Mailbox subjects may be truncated, so containment counts as a match.
fn is_accounted_for(subject: &str, commits: &[String]) -> bool {
    commits
        .iter()
        .any(|commit| commit == subject || commit.contains(subject))
}

#[cfg(test)]
mod tests;
