//! Downloads the patches of every merged pull request on a milestone.

mod fixes;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::error::PatchError;
use crate::github::{
    Milestone, MilestoneGateway, MilestoneItem, MilestoneItemKind, MilestoneNumber,
    PullRequestNumber, RepositoryLocator,
};
use crate::persistence::{FetchedPatch, PatchManifest};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::name::{PatchFileName, PatchRecord};
use super::store::PatchDirectory;
use fixes::{closing_commit, merge_commit};

pub use fixes::UnmilestonedFix;

/// Outcome of fetching a milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// The milestone that was fetched.
    pub milestone: Milestone,
    /// Closed plain issues on the milestone.
    pub closed_issues: usize,
    /// Merged pull requests on the milestone.
    pub merged_pull_requests: usize,
    /// Patches written by this run, in merge order.
    pub fetched: Vec<PatchFileName>,
    /// Patches that already existed and were left alone.
    pub skipped: Vec<PatchFileName>,
    /// Closed issues fixed by a commit outside the milestone's pull requests.
    pub unmilestoned_fixes: Vec<UnmilestonedFix>,
}

/// A merged pull request waiting to be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MergedPull {
    merged_at: DateTime<Utc>,
    number: PullRequestNumber,
}

/// Closed items split into plain issues and merged pull requests.
struct Partition<'items> {
    issues: Vec<&'items MilestoneItem>,
    merged: Vec<MergedPull>,
}

/// Fetches milestone patches into a patch directory through a gateway.
pub struct MilestoneFetcher<'client, Gateway>
where
    Gateway: MilestoneGateway,
{
    client: &'client Gateway,
    store: &'client PatchDirectory,
    manifest: Option<&'client PatchManifest>,
    telemetry: &'client dyn TelemetrySink,
    verify_fixes: bool,
}

impl<'client, Gateway> MilestoneFetcher<'client, Gateway>
where
    Gateway: MilestoneGateway,
{
    /// Creates a fetcher writing into `store`.
    #[must_use]
    pub const fn new(client: &'client Gateway, store: &'client PatchDirectory) -> Self {
        Self {
            client,
            store,
            manifest: None,
            telemetry: &NoopTelemetrySink,
            verify_fixes: true,
        }
    }

    /// Also consults and updates the manifest.
    #[must_use]
    pub const fn with_manifest(mut self, manifest: Option<&'client PatchManifest>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Records telemetry for every written patch.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: &'client dyn TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Turns the check that closed issues were fixed by milestoned pull
    /// requests on or off. It is on by default.
    #[must_use]
    pub const fn with_fix_verification(mut self, enabled: bool) -> Self {
        self.verify_fixes = enabled;
        self
    }

    /// Fetches every merged pull request on the milestone that has not been
    /// fetched before.
    ///
    /// Nothing is downloaded when any pull request on the milestone was
    /// closed without being merged. Unless disabled, closed issues whose
    /// closing commit is not the merge commit of a milestoned pull request
    /// are reported in [`FetchReport::unmilestoned_fixes`].
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::UnmergedPullRequest`] for a closed, unmerged pull
    /// request, any gateway failure unchanged, and I/O or manifest failures
    /// while recording patches.
    pub async fn fetch(
        &self,
        locator: &RepositoryLocator,
        milestone: MilestoneNumber,
    ) -> Result<FetchReport, PatchError> {
        let details = self.client.milestone(locator, milestone).await?;
        let items = self.client.closed_items(locator, milestone).await?;
        let Partition { issues, merged } = partition_items(&items)?;
        tracing::info!(
            milestone = %details.title,
            closed_issues = issues.len(),
            merged_pull_requests = merged.len(),
            "milestone loaded"
        );

        let unmilestoned_fixes = if self.verify_fixes && !issues.is_empty() {
            self.unmilestoned_fixes(locator, &issues, &merged).await?
        } else {
            Vec::new()
        };

        let mut fetched = Vec::new();
        let mut skipped = Vec::new();
        for pull in &merged {
            let file_name = PatchFileName::for_pull_request(pull.merged_at, pull.number);
            if self.already_fetched(&file_name)? {
                tracing::debug!(file = %file_name, "patch already fetched, skipping");
                skipped.push(file_name);
                continue;
            }

            let content = self.client.pull_request_patch(locator, pull.number).await?;
            let record = PatchRecord {
                merged_at: pull.merged_at,
                pull_request: pull.number,
                content,
            };
            fetched.push(self.store_record(&record)?);
        }

        Ok(FetchReport {
            milestone: details,
            closed_issues: issues.len(),
            merged_pull_requests: merged.len(),
            fetched,
            skipped,
            unmilestoned_fixes,
        })
    }

    async fn unmilestoned_fixes(
        &self,
        locator: &RepositoryLocator,
        issues: &[&MilestoneItem],
        merged: &[MergedPull],
    ) -> Result<Vec<UnmilestonedFix>, PatchError> {
        let mut merge_commits = BTreeSet::new();
        for pull in merged {
            let events = self.client.issue_events(locator, pull.number.get()).await?;
            match merge_commit(&events) {
                Some(commit) => {
                    merge_commits.insert(commit.to_owned());
                }
                None => tracing::warn!(
                    pull_request = pull.number.get(),
                    "merged pull request has no merge commit event"
                ),
            }
        }

        let mut unmilestoned = Vec::new();
        for issue in issues {
            let events = self.client.issue_events(locator, issue.number).await?;
            let Some(commit) = closing_commit(&events) else {
                tracing::info!(issue = issue.number, "issue was closed without a commit");
                continue;
            };
            if merge_commits.contains(commit) {
                continue;
            }
            tracing::warn!(
                issue = issue.number,
                commit,
                "no pull request on the milestone closed this issue"
            );
            unmilestoned.push(UnmilestonedFix {
                issue: issue.number,
                url: issue.display_url(),
                commit: commit.to_owned(),
            });
        }
        Ok(unmilestoned)
    }

    fn already_fetched(&self, file_name: &PatchFileName) -> Result<bool, PatchError> {
        if self.store.contains(file_name)? {
            return Ok(true);
        }
        match self.manifest {
            Some(manifest) => Ok(manifest.contains(file_name)?),
            None => Ok(false),
        }
    }

    fn store_record(&self, record: &PatchRecord) -> Result<PatchFileName, PatchError> {
        let file_name = record.file_name();
        let path = self.store.write_pending(&file_name, &record.content)?;
        tracing::info!(path = %path, "patch written");

        if let Some(manifest) = self.manifest {
            manifest.record_fetched(FetchedPatch {
                file_name: &file_name,
                pr_number: record.pull_request,
                merged_at: record.merged_at,
                fetched_at_unix: PatchManifest::now_unix_seconds(),
            })?;
        }
        self.telemetry.record(TelemetryEvent::PatchFetched {
            pr_number: record.pull_request.get(),
            file_name: file_name.as_str().to_owned(),
            bytes: u64::try_from(record.content.len()).unwrap_or(u64::MAX),
        });
        Ok(file_name)
    }
}

/// Splits plain issues from merged pull requests, ordering the latter by
/// merge time with ties broken by number.
fn partition_items(items: &[MilestoneItem]) -> Result<Partition<'_>, PatchError> {
    let mut issues = Vec::new();
    let mut merged = Vec::new();
    for item in items {
        match item.kind {
            MilestoneItemKind::Issue => issues.push(item),
            MilestoneItemKind::PullRequest { merged_at: None } => {
                return Err(PatchError::UnmergedPullRequest {
                    number: item.number,
                    url: item.display_url(),
                });
            }
            MilestoneItemKind::PullRequest {
                merged_at: Some(merged_at),
            } => merged.push(MergedPull {
                merged_at,
                number: PullRequestNumber::new(item.number)?,
            }),
        }
    }
    merged.sort_by_key(|pull| (pull.merged_at, pull.number));
    Ok(Partition { issues, merged })
}
