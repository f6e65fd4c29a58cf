//! Data models for milestones and the closed items attached to them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Milestone metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    /// Milestone number.
    pub number: u64,
    /// Milestone title, usually the release version.
    pub title: String,
}

/// What kind of tracker entry a milestone item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneItemKind {
    /// A plain issue.
    Issue,
    /// A pull request, merged when `merged_at` is present.
    PullRequest {
        /// Merge time reported by GitHub.
        merged_at: Option<DateTime<Utc>>,
    },
}

/// A closed issue or pull request tagged with a milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneItem {
    /// Issue or pull request number.
    pub number: u64,
    /// Title if present.
    pub title: Option<String>,
    /// HTML URL for displaying to a user.
    pub html_url: Option<String>,
    /// When the item was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Issue or pull request.
    pub kind: MilestoneItemKind,
}

impl MilestoneItem {
    /// Returns true when the item is a pull request.
    #[must_use]
    pub const fn is_pull_request(&self) -> bool {
        matches!(self.kind, MilestoneItemKind::PullRequest { .. })
    }

    /// Merge time for merged pull requests, `None` otherwise.
    #[must_use]
    pub const fn merged_at(&self) -> Option<DateTime<Utc>> {
        match self.kind {
            MilestoneItemKind::PullRequest { merged_at } => merged_at,
            MilestoneItemKind::Issue => None,
        }
    }

    /// Link to the item, falling back to a plain `#number` label.
    #[must_use]
    pub fn display_url(&self) -> String {
        self.html_url
            .clone()
            .unwrap_or_else(|| format!("#{}", self.number))
    }
}

/// One entry from the event list of an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEvent {
    /// Event name, such as `closed`, `referenced`, or `merged`.
    pub event: String,
    /// Commit the event points at, if any.
    pub commit_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiMilestone {
    pub(crate) number: u64,
    pub(crate) title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiIssue {
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) html_url: Option<String>,
    pub(crate) closed_at: Option<DateTime<Utc>>,
    pub(crate) pull_request: Option<ApiIssuePullRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiIssuePullRequest {
    #[serde(default)]
    pub(crate) merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiIssueEvent {
    pub(crate) event: String,
    #[serde(default)]
    pub(crate) commit_id: Option<String>,
}

impl From<ApiIssueEvent> for IssueEvent {
    fn from(value: ApiIssueEvent) -> Self {
        Self {
            event: value.event,
            commit_id: value.commit_id,
        }
    }
}

impl From<ApiMilestone> for Milestone {
    fn from(value: ApiMilestone) -> Self {
        Self {
            number: value.number,
            title: value.title,
        }
    }
}

impl From<ApiIssue> for MilestoneItem {
    fn from(value: ApiIssue) -> Self {
        let kind = value
            .pull_request
            .map_or(MilestoneItemKind::Issue, |pull| {
                MilestoneItemKind::PullRequest {
                    merged_at: pull.merged_at,
                }
            });
        Self {
            number: value.number,
            title: value.title,
            html_url: value.html_url,
            closed_at: value.closed_at,
            kind,
        }
    }
}
