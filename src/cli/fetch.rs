//! Fetch operation: download the merged pull requests of a milestone.

use std::io;

use milepatch::{
    MilepatchConfig, MilestoneFetcher, MilestoneNumber, OctocrabMilestoneGateway, PatchError,
};

use super::output::write_fetch_report;
use super::{Completion, open_manifest, telemetry_sink};

/// Downloads every merged pull request on `milestone` into the patch
/// directory.
///
/// # Errors
///
/// Returns configuration errors for a missing token or repository, API
/// errors from GitHub, [`PatchError::UnmergedPullRequest`] when the
/// milestone holds an unmerged pull request, and I/O errors while writing.
pub async fn run(
    config: &MilepatchConfig,
    milestone: MilestoneNumber,
) -> Result<Completion, PatchError> {
    let locator = config.require_repository()?;
    let token = config.resolve_token()?;
    let gateway = OctocrabMilestoneGateway::for_token(&token, &locator)?;

    let store = config.patch_directory();
    let telemetry = telemetry_sink(config);
    let manifest = open_manifest(config, telemetry.as_ref())?;

    let report = MilestoneFetcher::new(&gateway, &store)
        .with_manifest(manifest.as_ref())
        .with_telemetry(telemetry.as_ref())
        .with_fix_verification(!config.no_verify)
        .fetch(&locator, milestone)
        .await?;

    write_fetch_report(&mut io::stdout().lock(), &report)?;
    Ok(Completion::Complete)
}
