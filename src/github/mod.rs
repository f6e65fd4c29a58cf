//! GitHub milestone intake.
//!
//! This module wraps Octocrab to parse repository identifiers, validate
//! personal access tokens, load milestones with their closed items, and
//! download pull request patches and event lists. Errors are mapped into [`PatchError`]
//! variants so callers never see Octocrab internals.
//!
//! [`PatchError`]: crate::PatchError

pub mod gateway;
pub mod locator;
pub mod models;

pub use gateway::{MilestoneGateway, OctocrabMilestoneGateway};
pub use locator::{
    MilestoneNumber, PersonalAccessToken, PullRequestNumber, RepositoryLocator, RepositoryName,
    RepositoryOwner,
};
pub use models::{IssueEvent, Milestone, MilestoneItem, MilestoneItemKind};

#[cfg(test)]
pub use gateway::MockMilestoneGateway;

#[cfg(test)]
mod tests;
