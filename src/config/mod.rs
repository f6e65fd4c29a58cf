//! Configuration loaded from CLI flags, environment, and files.
//!
//! # Precedence
//!
//! Values are merged with the following precedence (lowest to highest):
//!
//! 1. **Defaults** – `patches_dir = "patches"`, everything else unset
//! 2. **Configuration file** – `.milepatch.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `MILEPATCH_TOKEN`, `MILEPATCH_REPOSITORY`,
//!    and friends; `GITHUB_TOKEN` is read when no token is set elsewhere
//! 4. **Command-line flags** – `--token`/`-t`, `--repository`/`-r`, ...
//!
//! # Configuration File
//!
//! ```toml
//! repository = "mesonbuild/meson"
//! token = "ghp_example"
//! patches_dir = "patches"
//! database_url = "milepatch.sqlite"
//! work_tree = "../meson"
//! ```

use std::env;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::error::PatchError;
use crate::github::{PersonalAccessToken, RepositoryLocator};
use crate::patches::PatchDirectory;

/// Default patch directory, relative to the working directory.
pub const DEFAULT_PATCHES_DIR: &str = "patches";

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use milepatch::MilepatchConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = MilepatchConfig::load().expect("failed to load configuration");
/// let locator = config.require_repository().expect("repository required");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "MILEPATCH",
    discovery(
        dotfile_name = ".milepatch.toml",
        config_file_name = "milepatch.toml",
        app_name = "milepatch"
    )
)]
pub struct MilepatchConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `MILEPATCH_TOKEN` or `GITHUB_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository whose milestones are fetched, as `owner/name` or a URL.
    ///
    /// Can be provided via:
    /// - CLI: `--repository <REPO>` or `-r <REPO>`
    /// - Environment: `MILEPATCH_REPOSITORY`
    /// - Config file: `repository = "..."`
    #[ortho_config(cli_short = 'r')]
    pub repository: Option<String>,

    /// Directory that receives fetched patches and holds `done`.
    ///
    /// Can be provided via:
    /// - CLI: `--patches-dir <DIR>` or `-p <DIR>`
    /// - Environment: `MILEPATCH_PATCHES_DIR`
    /// - Config file: `patches_dir = "..."`
    #[ortho_config(cli_short = 'p')]
    pub patches_dir: String,

    /// `SQLite` database recording fetched and applied patches.
    ///
    /// Unset means the patch directory alone decides what was fetched.
    ///
    /// Can be provided via:
    /// - CLI: `--database-url <PATH>`
    /// - Environment: `MILEPATCH_DATABASE_URL`
    /// - Config file: `database_url = "..."`
    #[ortho_config(cli_short = 'D')]
    pub database_url: Option<String>,

    /// Repository `git am` runs in; the current directory when unset.
    ///
    /// Can be provided via:
    /// - CLI: `--work-tree <DIR>` or `-C <DIR>`
    /// - Environment: `MILEPATCH_WORK_TREE`
    /// - Config file: `work_tree = "..."`
    #[ortho_config(cli_short = 'C')]
    pub work_tree: Option<String>,

    /// Enables debug logging and JSON-lines telemetry on stderr.
    ///
    /// Can be provided via:
    /// - CLI: `--debug` / `-d`
    /// - Config file: `debug = true`
    ///
    /// `ortho_config` does not load booleans from the environment, so there
    /// is no `MILEPATCH_DEBUG`; use `RUST_LOG` instead.
    #[ortho_config(cli_short = 'd')]
    pub debug: bool,

    /// Skips checking that closed issues were fixed by milestoned pull
    /// requests, which costs one API request per issue and pull request.
    ///
    /// Can be provided via:
    /// - CLI: `--no-verify`
    /// - Config file: `no_verify = true`
    #[ortho_config()]
    pub no_verify: bool,
}

impl Default for MilepatchConfig {
    fn default() -> Self {
        Self {
            token: None,
            repository: None,
            patches_dir: DEFAULT_PATCHES_DIR.to_owned(),
            database_url: None,
            work_tree: None,
            debug: false,
            no_verify: false,
        }
    }
}

impl MilepatchConfig {
    /// Resolves the token from configuration, falling back to `GITHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::MissingToken`] when no source provides a
    /// non-blank value.
    pub fn resolve_token(&self) -> Result<PersonalAccessToken, PatchError> {
        let value = self
            .token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(PatchError::MissingToken)?;
        PersonalAccessToken::new(value)
    }

    /// Parses the configured repository.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Configuration`] when no repository is set, or the
    /// parse error for a malformed one.
    pub fn require_repository(&self) -> Result<RepositoryLocator, PatchError> {
        let repository = self
            .repository
            .as_deref()
            .ok_or_else(|| PatchError::Configuration {
                message: "repository is required (use --repository or -r)".to_owned(),
            })?;
        RepositoryLocator::parse(repository)
    }

    /// The configured patch directory.
    #[must_use]
    pub fn patch_directory(&self) -> PatchDirectory {
        PatchDirectory::new(self.patches_dir.as_str())
    }

    /// Database URL when one is set and not blank.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Work tree for `git am`, when configured.
    #[must_use]
    pub fn work_tree(&self) -> Option<Utf8PathBuf> {
        self.work_tree.as_deref().map(Utf8PathBuf::from)
    }
}

#[cfg(test)]
mod tests;
