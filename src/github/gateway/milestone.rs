//! Octocrab implementation of the milestone gateway.

use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::{Octocrab, Page};

use crate::error::PatchError;
use crate::github::locator::{
    MilestoneNumber, PersonalAccessToken, PullRequestNumber, RepositoryLocator,
};
use crate::github::models::{
    ApiIssue, ApiIssueEvent, ApiMilestone, IssueEvent, Milestone, MilestoneItem,
};

use super::MilestoneGateway;
use super::client::build_octocrab_client;
use super::error_mapping::{map_http_error, map_octocrab_error};
use super::http_utils::{extract_github_message, patch_headers};

const PER_PAGE: &str = "100";

/// Octocrab-backed milestone gateway.
pub struct OctocrabMilestoneGateway {
    client: Octocrab,
}

impl OctocrabMilestoneGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the given token and repository.
    ///
    /// # Errors
    ///
    /// Returns `PatchError::InvalidUrl` when the base URI cannot be parsed or
    /// `PatchError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &PersonalAccessToken,
        locator: &RepositoryLocator,
    ) -> Result<Self, PatchError> {
        let octocrab = build_octocrab_client(token, locator.api_base().as_str())?;
        Ok(Self::new(octocrab))
    }
}

#[async_trait]
impl MilestoneGateway for OctocrabMilestoneGateway {
    async fn milestone(
        &self,
        locator: &RepositoryLocator,
        milestone: MilestoneNumber,
    ) -> Result<Milestone, PatchError> {
        tracing::debug!(
            repository = %locator.slug(),
            milestone = milestone.get(),
            "loading milestone"
        );
        self.client
            .get::<ApiMilestone, _, _>(locator.milestone_path(milestone), None::<&()>)
            .await
            .map(ApiMilestone::into)
            .map_err(|error| map_octocrab_error("milestone", &error))
    }

    async fn closed_items(
        &self,
        locator: &RepositoryLocator,
        milestone: MilestoneNumber,
    ) -> Result<Vec<MilestoneItem>, PatchError> {
        let milestone_str = milestone.get().to_string();
        let query_params = [
            ("milestone", milestone_str.as_str()),
            ("state", "closed"),
            ("per_page", PER_PAGE),
        ];

        let page = self
            .client
            .get::<Page<ApiIssue>, _, _>(locator.issues_path(), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("closed issues", &error))?;

        let items: Vec<MilestoneItem> = self
            .client
            .all_pages(page)
            .await
            .map(|issues| issues.into_iter().map(ApiIssue::into).collect())
            .map_err(|error| map_octocrab_error("closed issues", &error))?;

        tracing::debug!(count = items.len(), "loaded closed milestone items");
        Ok(items)
    }

    async fn pull_request_patch(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<String, PatchError> {
        let uri: Uri = locator
            .pull_request_path(number)
            .parse::<Uri>()
            .map_err(|error| PatchError::InvalidUrl(error.to_string()))?;

        let response = self
            .client
            ._get_with_headers(uri, Some(patch_headers()))
            .await
            .map_err(|error| map_octocrab_error("pull request patch", &error))?;

        let status = response.status();
        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(|error| PatchError::Api {
                message: format!("pull request patch response decode failed: {error}"),
            })?;

        if status == StatusCode::OK {
            Ok(body)
        } else {
            Err(map_http_error(
                "pull request patch",
                status,
                extract_github_message(&body),
            ))
        }
    }

    async fn issue_events(
        &self,
        locator: &RepositoryLocator,
        number: u64,
    ) -> Result<Vec<IssueEvent>, PatchError> {
        let page = self
            .client
            .get::<Page<ApiIssueEvent>, _, _>(
                locator.issue_events_path(number),
                Some(&[("per_page", PER_PAGE)]),
            )
            .await
            .map_err(|error| map_octocrab_error("issue events", &error))?;

        let events: Vec<IssueEvent> = self
            .client
            .all_pages(page)
            .await
            .map(|events| events.into_iter().map(ApiIssueEvent::into).collect())
            .map_err(|error| map_octocrab_error("issue events", &error))?;

        tracing::debug!(number, count = events.len(), "loaded issue events");
        Ok(events)
    }
}
