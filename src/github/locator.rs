//! Repository parsing and identity wrappers for milestone intake.

use url::Url;

use crate::error::PatchError;

const PUBLIC_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    fn new(value: &str, input: &str) -> Result<Self, PatchError> {
        if value.is_empty() {
            return Err(invalid_repository(input));
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    fn new(value: &str, input: &str) -> Result<Self, PatchError> {
        let trimmed = value.strip_suffix(".git").unwrap_or(value);
        if trimmed.is_empty() {
            return Err(invalid_repository(input));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Milestone number as shown in the GitHub milestone URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MilestoneNumber(u64);

impl MilestoneNumber {
    /// Parses a milestone number from a command-line operand.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::InvalidMilestoneNumber`] when the value is not a
    /// positive integer.
    pub fn parse(value: &str) -> Result<Self, PatchError> {
        value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|number| *number > 0)
            .map(Self)
            .ok_or_else(|| PatchError::InvalidMilestoneNumber {
                value: value.to_owned(),
            })
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Wraps a pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, PatchError> {
        if value == 0 {
            return Err(PatchError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::MissingToken`] when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, PatchError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PatchError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

fn invalid_repository(input: &str) -> PatchError {
    PatchError::InvalidRepository {
        value: input.to_owned(),
    }
}

/// Derives the GitHub API base URL from a repository URL.
///
/// `github.com` maps to the public API; any other host is treated as GitHub
/// Enterprise and served from `/api/v3` on the same authority.
fn derive_api_base(parsed: &Url) -> Result<Url, PatchError> {
    let host = parsed
        .host_str()
        .ok_or_else(|| PatchError::InvalidUrl("URL must include a host".to_owned()))?;

    if host.eq_ignore_ascii_case("github.com") {
        return Url::parse(PUBLIC_API_BASE).map_err(|error| PatchError::InvalidUrl(error.to_string()));
    }

    let authority = if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    let mut api_url = Url::parse(&format!("{}://{authority}", parsed.scheme()))
        .map_err(|error| PatchError::InvalidUrl(error.to_string()))?;
    api_url
        .set_port(parsed.port())
        .map_err(|()| PatchError::InvalidUrl("invalid port".to_owned()))?;
    api_url.set_path("api/v3");
    Ok(api_url)
}

/// Repository identity with the API base used to reach it.
///
/// # Example
///
/// ```
/// use milepatch::RepositoryLocator;
///
/// let locator = RepositoryLocator::parse("mesonbuild/meson")
///     .expect("slug should parse");
/// assert_eq!(locator.owner().as_str(), "mesonbuild");
/// assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Parses an `owner/name` slug or a repository URL such as
    /// `https://github.com/owner/name`.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::InvalidUrl`] when a URL cannot be parsed and
    /// [`PatchError::InvalidRepository`] when owner or name is missing.
    pub fn parse(input: &str) -> Result<Self, PatchError> {
        let trimmed = input.trim();
        if trimmed.contains("://") {
            Self::parse_url(trimmed)
        } else {
            Self::parse_slug(trimmed)
        }
    }

    fn parse_slug(input: &str) -> Result<Self, PatchError> {
        let (owner, name) = input
            .split_once('/')
            .ok_or_else(|| invalid_repository(input))?;
        if name.contains('/') {
            return Err(invalid_repository(input));
        }
        let api_base =
            Url::parse(PUBLIC_API_BASE).map_err(|error| PatchError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            api_base,
            owner: RepositoryOwner::new(owner, input)?,
            repository: RepositoryName::new(name, input)?,
        })
    }

    fn parse_url(input: &str) -> Result<Self, PatchError> {
        let parsed = Url::parse(input).map_err(|error| PatchError::InvalidUrl(error.to_string()))?;

        let mut segments = parsed
            .path_segments()
            .ok_or_else(|| invalid_repository(input))?;
        let owner_segment = segments.next().ok_or_else(|| invalid_repository(input))?;
        let repository_segment = segments.next().ok_or_else(|| invalid_repository(input))?;

        let owner = RepositoryOwner::new(owner_segment, input)?;
        let repository = RepositoryName::new(repository_segment, input)?;
        let api_base = derive_api_base(&parsed)?;

        Ok(Self {
            api_base,
            owner,
            repository,
        })
    }

    /// API base URL derived from the repository host.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Human-friendly `owner/name` label.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    pub(crate) fn milestone_path(&self, milestone: MilestoneNumber) -> String {
        format!("/repos/{}/milestones/{}", self.slug(), milestone.get())
    }

    pub(crate) fn issues_path(&self) -> String {
        format!("/repos/{}/issues", self.slug())
    }

    pub(crate) fn pull_request_path(&self, number: PullRequestNumber) -> String {
        format!("/repos/{}/pulls/{}", self.slug(), number.get())
    }

    pub(crate) fn issue_events_path(&self, number: u64) -> String {
        format!("/repos/{}/issues/{number}/events", self.slug())
    }
}
