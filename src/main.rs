//! milepatch CLI entrypoint.
//!
//! Supported operations:
//!
//! - `milepatch fetch <milestone>` writes the milestone's merged pull requests
//!   as patches named by merge time
//! - `milepatch apply <directory>` applies pending patches with `git am`
//! - `milepatch verify <repository> <branch>` checks applied patches against
//!   a release branch

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use milepatch::{MilepatchConfig, PatchError, logging};
use ortho_config::OrthoConfig;

mod cli;

use cli::{Command, Completion};

/// Flags whose value is the following argument.
const VALUE_FLAGS: &[&str] = &[
    "--token",
    "-t",
    "--repository",
    "-r",
    "--patches-dir",
    "-p",
    "--database-url",
    "--work-tree",
    "-C",
];

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(Completion::Complete) => ExitCode::SUCCESS,
        Ok(Completion::Incomplete) => ExitCode::FAILURE,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<Completion, PatchError> {
    let (positionals, filtered) = extract_positional_arguments(std::env::args_os().collect());
    let config = load_config(filtered)?;
    logging::init(config.debug);

    let command = Command::from_positionals(&positionals)?;
    tracing::debug!(?command, "running operation");
    cli::run(command, &config).await
}

/// Separates the operation word and its operands from the flags.
///
/// The program name and every flag stay in the returned argument list for
/// ortho-config. The value following a flag in [`VALUE_FLAGS`] is kept with
/// its flag; `--flag=value` needs no skipping. Everything after `--` is
/// positional.
fn extract_positional_arguments(args: Vec<OsString>) -> (Vec<String>, Vec<OsString>) {
    let mut positionals = Vec::new();
    let mut filtered = Vec::with_capacity(args.len());
    let mut remaining = args.into_iter();

    if let Some(program) = remaining.next() {
        filtered.push(program);
    }

    let mut flags_done = false;
    let mut expecting_value = false;
    for arg in remaining {
        if expecting_value {
            expecting_value = false;
            filtered.push(arg);
            continue;
        }

        let text = arg.to_string_lossy().into_owned();
        if flags_done {
            positionals.push(text);
        } else if text == "--" {
            flags_done = true;
        } else if text.starts_with('-') && text.len() > 1 {
            expecting_value = VALUE_FLAGS.contains(&text.as_str());
            filtered.push(arg);
        } else {
            positionals.push(text);
        }
    }

    (positionals, filtered)
}

/// Loads configuration from CLI flags, environment, and files.
///
/// # Errors
///
/// Returns [`PatchError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config(args: Vec<OsString>) -> Result<MilepatchConfig, PatchError> {
    MilepatchConfig::load_from_iter(args).map_err(|error| PatchError::Configuration {
        message: error.to_string(),
    })
}
