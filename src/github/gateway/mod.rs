//! Gateways for loading milestone data through Octocrab.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests.

mod client;
mod error_mapping;
mod http_utils;
mod milestone;

pub use milestone::OctocrabMilestoneGateway;

use async_trait::async_trait;

use crate::error::PatchError;
use crate::github::locator::{MilestoneNumber, PullRequestNumber, RepositoryLocator};
use crate::github::models::{IssueEvent, Milestone, MilestoneItem};

/// Gateway that can load milestones, their closed items, patches, and event
/// lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MilestoneGateway: Send + Sync {
    /// Fetch the milestone metadata.
    async fn milestone(
        &self,
        locator: &RepositoryLocator,
        milestone: MilestoneNumber,
    ) -> Result<Milestone, PatchError>;

    /// Fetch every closed issue and pull request tagged with the milestone.
    async fn closed_items(
        &self,
        locator: &RepositoryLocator,
        milestone: MilestoneNumber,
    ) -> Result<Vec<MilestoneItem>, PatchError>;

    /// Download the mailbox-formatted patch of a pull request.
    async fn pull_request_patch(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<String, PatchError>;

    /// Fetch every event on an issue or pull request, oldest first.
    async fn issue_events(
        &self,
        locator: &RepositoryLocator,
        number: u64,
    ) -> Result<Vec<IssueEvent>, PatchError>;
}
