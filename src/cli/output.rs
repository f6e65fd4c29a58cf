//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use milepatch::{ApplyReport, FetchReport, PatchError, VerifyReport};

/// Writes the outcome of a fetch to the given writer.
pub fn write_fetch_report<W: Write>(writer: &mut W, report: &FetchReport) -> Result<(), PatchError> {
    writeln!(
        writer,
        "Milestone {}: found {} closed issues and {} merged pull requests",
        report.milestone.title, report.closed_issues, report.merged_pull_requests
    )
    .map_err(|e| io_error(&e))?;

    for fix in &report.unmilestoned_fixes {
        writeln!(
            writer,
            "Warning: could not find a pull request on the milestone that closed {} ({})",
            fix.url, fix.commit
        )
        .map_err(|e| io_error(&e))?;
    }
    for name in &report.skipped {
        writeln!(writer, "{name} already exists, skipping").map_err(|e| io_error(&e))?;
    }
    for name in &report.fetched {
        writeln!(writer, "Wrote {name}").map_err(|e| io_error(&e))?;
    }
    writeln!(
        writer,
        "{} fetched, {} skipped",
        report.fetched.len(),
        report.skipped.len()
    )
    .map_err(|e| io_error(&e))
}

/// Writes the outcome of an apply run to the given writer.
pub fn write_apply_report<W: Write>(writer: &mut W, report: &ApplyReport) -> Result<(), PatchError> {
    for name in &report.applied {
        writeln!(writer, "Applied {name}").map_err(|e| io_error(&e))?;
    }

    match &report.halted {
        Some(halt) => {
            writeln!(writer, "Failed to apply {}; git am was aborted", halt.patch)
                .map_err(|e| io_error(&e))?;
            if !halt.details.is_empty() {
                writeln!(writer, "{}", halt.details).map_err(|e| io_error(&e))?;
            }
            writeln!(
                writer,
                "Fix the patch and run apply again; {} applied before the failure",
                report.applied.len()
            )
            .map_err(|e| io_error(&e))
        }
        None if report.applied.is_empty() => {
            writeln!(writer, "No pending patches").map_err(|e| io_error(&e))
        }
        None => writeln!(writer, "All {} patches applied", report.applied.len())
            .map_err(|e| io_error(&e)),
    }
}

/// Writes the outcome of a verification to the given writer.
pub fn write_verify_report<W: Write>(
    writer: &mut W,
    report: &VerifyReport,
) -> Result<(), PatchError> {
    writeln!(
        writer,
        "Checked {} patch subjects against {} commits since {}",
        report.subjects, report.commits, report.last_tag
    )
    .map_err(|e| io_error(&e))?;

    for missing in &report.missing {
        writeln!(writer, "{} in {}", missing.subject, missing.patch).map_err(|e| io_error(&e))?;
    }
    if report.is_complete() {
        writeln!(writer, "All checked!").map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Converts an I/O error to a [`PatchError::Io`].
pub(crate) fn io_error(error: &io::Error) -> PatchError {
    PatchError::Io {
        message: error.to_string(),
    }
}
