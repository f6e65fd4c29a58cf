//! Error type shared by every milepatch operation.

use thiserror::Error;

/// Errors surfaced while parsing input, talking to GitHub, or moving patches.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatchError {
    /// The command line did not name an operation or its operands.
    #[error("{message}")]
    Usage {
        /// Usage text describing what was expected.
        message: String,
    },

    /// The milestone number is not a positive integer.
    #[error("milestone number must be a positive integer, got {value:?}")]
    InvalidMilestoneNumber {
        /// The rejected input.
        value: String,
    },

    /// A pull request number was zero.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The repository URL could not be parsed.
    #[error("repository URL is invalid: {0}")]
    InvalidUrl(String),

    /// The repository is not of the form `owner/name` or a repository URL.
    #[error("repository must be `owner/name` or a repository URL, got {value:?}")]
    InvalidRepository {
        /// The rejected input.
        value: String,
    },

    /// The authentication token was missing.
    #[error("personal access token is required (use --token, MILEPATCH_TOKEN, or GITHUB_TOKEN)")]
    MissingToken,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response detail describing the failure.
        message: String,
    },

    /// GitHub refused the request because the rate limit was exhausted.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from GitHub.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A pull request on the milestone was closed without being merged.
    #[error("pull request {url} was closed, not merged; remove it from the milestone")]
    UnmergedPullRequest {
        /// Pull request number.
        number: u64,
        /// Link shown to the user so the milestone can be fixed.
        url: String,
    },

    /// The patch directory does not exist.
    #[error("patch directory {path} does not exist")]
    MissingPatchDirectory {
        /// Directory that was looked up.
        path: String,
    },

    /// A file name is not usable as a patch name.
    #[error("invalid patch file name: {name:?}")]
    InvalidPatchName {
        /// The rejected name.
        name: String,
    },

    /// A git command or repository access failed.
    #[error("git error: {message}")]
    Git {
        /// Error detail from git or git2.
        message: String,
    },

    /// The release branch has no tag to compare against.
    #[error("no tags matching {pattern:?} found")]
    NoReleaseTags {
        /// Tag glob that matched nothing.
        pattern: String,
    },

    /// There are no applied patches to verify.
    #[error("no applied patches found in {path}")]
    NoAppliedPatches {
        /// Directory that was searched.
        path: String,
    },
}

impl From<git2::Error> for PatchError {
    fn from(error: git2::Error) -> Self {
        Self::Git {
            message: error.message().to_owned(),
        }
    }
}

/// Converts an I/O error to a [`PatchError::Io`] with context.
pub(crate) fn io_error(context: &str, error: &std::io::Error) -> PatchError {
    PatchError::Io {
        message: format!("{context}: {error}"),
    }
}
