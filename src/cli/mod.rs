//! Operation handlers for the `milepatch` binary.
//!
//! - [`fetch`]: download the patches of a milestone
//! - [`apply`]: apply pending patches with `git am`
//! - [`verify`]: check applied patches against a release branch
//!
//! Output formatting utilities are in [`output`].

use camino::Utf8PathBuf;
use milepatch::persistence::PatchManifest;
use milepatch::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use milepatch::{MilepatchConfig, MilestoneNumber, PatchError};

pub mod apply;
pub mod fetch;
pub mod output;
pub mod verify;

/// Usage text shown for missing or unknown operations.
pub const USAGE: &str = "usage: milepatch [OPTIONS] fetch <milestone>\n       \
                         milepatch [OPTIONS] apply <directory>\n       \
                         milepatch [OPTIONS] verify <repository> <branch>";

/// An operation and its operands, taken from the positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the patches of a milestone.
    Fetch {
        /// Milestone to fetch.
        milestone: MilestoneNumber,
    },
    /// Apply the pending patches in a directory.
    Apply {
        /// Directory holding the pending patches.
        directory: Utf8PathBuf,
    },
    /// Verify applied patches against a release branch.
    Verify {
        /// Repository holding the release branch.
        repository: Utf8PathBuf,
        /// Release branch name; its tags are `<branch>.*`.
        branch: String,
    },
}

impl Command {
    /// Parses the operation word and its operands.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Usage`] for a missing or unknown operation or a
    /// wrong number of operands, and [`PatchError::InvalidMilestoneNumber`]
    /// for a malformed milestone.
    pub fn from_positionals(positionals: &[String]) -> Result<Self, PatchError> {
        match positionals {
            [operation, milestone] if operation == "fetch" => Ok(Self::Fetch {
                milestone: MilestoneNumber::parse(milestone)?,
            }),
            [operation, directory] if operation == "apply" => Ok(Self::Apply {
                directory: Utf8PathBuf::from(directory),
            }),
            [operation, repository, branch] if operation == "verify" => Ok(Self::Verify {
                repository: Utf8PathBuf::from(repository),
                branch: branch.clone(),
            }),
            [operation, ..] => Err(usage(&format!("unexpected arguments for {operation:?}"))),
            [] => Err(usage("missing operation")),
        }
    }
}

/// Whether an operation finished everything it set out to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Everything succeeded.
    Complete,
    /// The operation ran but stopped early or found problems.
    Incomplete,
}

/// Runs a parsed command.
///
/// # Errors
///
/// Propagates the failure of the selected operation.
pub async fn run(command: Command, config: &MilepatchConfig) -> Result<Completion, PatchError> {
    match command {
        Command::Fetch { milestone } => fetch::run(config, milestone).await,
        Command::Apply { directory } => apply::run(config, directory),
        Command::Verify { repository, branch } => verify::run(config, &repository, &branch),
    }
}

fn usage(problem: &str) -> PatchError {
    PatchError::Usage {
        message: format!("{problem}\n{USAGE}"),
    }
}

/// JSON-lines telemetry on stderr in debug mode, nothing otherwise.
pub fn telemetry_sink(config: &MilepatchConfig) -> Box<dyn TelemetrySink> {
    if config.debug {
        Box::new(StderrJsonlTelemetrySink)
    } else {
        Box::new(NoopTelemetrySink)
    }
}

/// Opens the manifest when a database URL is configured.
///
/// # Errors
///
/// Returns [`PatchError::Configuration`] or [`PatchError::Io`] when the
/// database cannot be opened or migrated.
pub fn open_manifest(
    config: &MilepatchConfig,
    telemetry: &dyn TelemetrySink,
) -> Result<Option<PatchManifest>, PatchError> {
    config
        .database_url()
        .map(|url| PatchManifest::open(url, telemetry).map_err(PatchError::from))
        .transpose()
}
