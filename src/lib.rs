//! milepatch library crate: milestone patch queues for stable releases.
//!
//! The library asks GitHub for the merged pull requests on a milestone,
//! stores each as a mailbox patch named by merge time, applies the queue
//! with `git am`, and verifies that applied patches reached the release
//! branch.

pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod patches;
pub mod persistence;
pub mod telemetry;

pub use config::MilepatchConfig;
pub use error::PatchError;
pub use github::{
    MilestoneGateway, MilestoneNumber, OctocrabMilestoneGateway, PersonalAccessToken,
    RepositoryLocator,
};
pub use patches::{
    ApplyReport, FetchReport, GitMailboxApply, MilestoneFetcher, PatchApplier, PatchDirectory,
    PatchFileName, VerifyReport, verify_applied,
};
pub use persistence::PatchManifest;
