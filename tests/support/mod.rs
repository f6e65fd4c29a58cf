//! Shared test utilities.

use camino::Utf8PathBuf;
use tempfile::TempDir;

pub mod runtime;

/// Creates a temporary directory for patch and database tests.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
pub fn create_temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"))
}

/// Returns the UTF-8 path of a temporary directory.
///
/// # Panics
///
/// Panics if the path is not valid UTF-8.
pub fn utf8_path(temp_dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temporary directory is not UTF-8: {}", path.display()))
}

/// A mailbox patch body carrying `subject`, as GitHub serves it.
pub fn mailbox_patch(subject: &str) -> String {
    format!(
        "From 0000000000000000000000000000000000000000 Mon Sep 17 00:00:00 2001\n\
         From: Test User <test@example.com>\n\
         Subject: [PATCH] {subject}\n\n---\n"
    )
}
