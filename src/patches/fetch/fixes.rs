//! Matches closed issues against the merge commits of milestoned pull
//! requests.

use crate::github::IssueEvent;

const CLOSED: &str = "closed";
const MERGED: &str = "merged";

/// A closed issue whose closing commit belongs to no merged pull request on
/// the milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmilestonedFix {
    /// Issue number.
    pub issue: u64,
    /// Link to the issue.
    pub url: String,
    /// Commit that closed the issue.
    pub commit: String,
}

/// Commit that closed an issue, if GitHub recorded one.
///
/// An issue closed by merging a pull request has no commit on its `closed`
/// event; the event that follows references the commit instead.
pub(super) fn closing_commit(events: &[IssueEvent]) -> Option<&str> {
    let mut from_close = events.iter().skip_while(|event| event.event != CLOSED);
    let closed = from_close.next()?;
    closed
        .commit_id
        .as_deref()
        .or_else(|| from_close.next()?.commit_id.as_deref())
}

/// Commit a pull request was merged as.
pub(super) fn merge_commit(events: &[IssueEvent]) -> Option<&str> {
    events
        .iter()
        .find(|event| event.event == MERGED)
        .and_then(|event| event.commit_id.as_deref())
}
