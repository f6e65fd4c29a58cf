//! Manifest of fetched and applied patches backed by `SQLite`.
//!
//! The patch directory alone tells whether a file exists, but not where it
//! came from or when it was applied. When a database URL is configured the
//! fetcher records every patch it writes here and the applier stamps each
//! one it applies, so a patch deleted from disk after being applied is still
//! never downloaded again.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::github::PullRequestNumber;
use crate::patches::PatchFileName;
use crate::telemetry::TelemetrySink;

use super::PersistenceError;
use super::migrator::{establish, migrate_database};

const PATCH_MANIFEST_TABLE: &str = "patch_manifest";

/// One manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Patch file name.
    pub file_name: PatchFileName,
    /// Source pull request number.
    pub pr_number: u64,
    /// When the pull request was merged.
    pub merged_at: DateTime<Utc>,
    /// Unix timestamp when the patch was written.
    pub fetched_at_unix: i64,
    /// Unix timestamp when `git am` applied the patch.
    pub applied_at_unix: Option<i64>,
}

impl ManifestEntry {
    /// Returns true once the patch has been applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.applied_at_unix.is_some()
    }
}

/// Data required to record a fetched patch.
#[derive(Debug, Clone, Copy)]
pub struct FetchedPatch<'a> {
    /// File the patch was written to.
    pub file_name: &'a PatchFileName,
    /// Source pull request.
    pub pr_number: PullRequestNumber,
    /// When the pull request was merged.
    pub merged_at: DateTime<Utc>,
    /// Unix timestamp when the patch was written.
    pub fetched_at_unix: i64,
}

/// SQLite-backed patch manifest.
#[derive(Debug, Clone)]
pub struct PatchManifest {
    database_url: String,
}

impl PatchManifest {
    /// Opens the manifest, applying pending migrations first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the URL is blank or migrations fail.
    pub fn open(
        database_url: impl Into<String>,
        telemetry: &dyn TelemetrySink,
    ) -> Result<Self, PersistenceError> {
        let manifest = Self::new(database_url)?;
        migrate_database(&manifest.database_url, telemetry)?;
        Ok(manifest)
    }

    /// Targets an already-migrated database without touching it.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string,
        })
    }

    /// Returns true when the manifest has a row for this patch.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn contains(&self, file_name: &PatchFileName) -> Result<bool, PersistenceError> {
        self.entry(file_name).map(|entry| entry.is_some())
    }

    /// Looks up the row for a patch.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or a stored timestamp is malformed.
    pub fn entry(
        &self,
        file_name: &PatchFileName,
    ) -> Result<Option<ManifestEntry>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            pr_number: i64,
            #[diesel(sql_type = Text)]
            merged_at: String,
            #[diesel(sql_type = BigInt)]
            fetched_at_unix: i64,
            #[diesel(sql_type = Nullable<BigInt>)]
            applied_at_unix: Option<i64>,
        }

        let mut connection = establish(&self.database_url)?;

        let result: Option<Row> = sql_query(
            "SELECT pr_number, merged_at, fetched_at_unix, applied_at_unix \
             FROM patch_manifest WHERE file_name = ? LIMIT 1;",
        )
        .bind::<Text, _>(file_name.as_str())
        .get_result(&mut connection)
        .optional()
        .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        result
            .map(|row| {
                let merged_at = DateTime::parse_from_rfc3339(&row.merged_at)
                    .map_err(|error| PersistenceError::QueryFailed {
                        message: format!("stored merged_at {:?} is invalid: {error}", row.merged_at),
                    })?
                    .with_timezone(&Utc);
                let pr_number = u64::try_from(row.pr_number).map_err(|error| {
                    PersistenceError::QueryFailed {
                        message: format!("stored pr_number {} is invalid: {error}", row.pr_number),
                    }
                })?;
                Ok(ManifestEntry {
                    file_name: file_name.clone(),
                    pr_number,
                    merged_at,
                    fetched_at_unix: row.fetched_at_unix,
                    applied_at_unix: row.applied_at_unix,
                })
            })
            .transpose()
    }

    /// Records a freshly written patch, replacing any previous row.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the schema is missing or the write
    /// fails.
    pub fn record_fetched(&self, patch: FetchedPatch<'_>) -> Result<(), PersistenceError> {
        let mut connection = establish(&self.database_url)?;

        sql_query(
            "INSERT INTO patch_manifest \
             (file_name, pr_number, merged_at, fetched_at_unix, applied_at_unix) \
             VALUES (?, ?, ?, ?, NULL) \
             ON CONFLICT(file_name) DO UPDATE SET \
               pr_number = excluded.pr_number, \
               merged_at = excluded.merged_at, \
               fetched_at_unix = excluded.fetched_at_unix;",
        )
        .bind::<Text, _>(patch.file_name.as_str())
        .bind::<BigInt, _>(i64::try_from(patch.pr_number.get()).unwrap_or(i64::MAX))
        .bind::<Text, _>(patch.merged_at.to_rfc3339())
        .bind::<BigInt, _>(patch.fetched_at_unix)
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| Self::map_write_error(&mut connection, &error))
    }

    /// Stamps a patch as applied. Returns false when the manifest has no row
    /// for it.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the schema is missing or the write
    /// fails.
    pub fn mark_applied(
        &self,
        file_name: &PatchFileName,
        applied_at_unix: i64,
    ) -> Result<bool, PersistenceError> {
        let mut connection = establish(&self.database_url)?;

        let affected = sql_query("UPDATE patch_manifest SET applied_at_unix = ? WHERE file_name = ?;")
            .bind::<BigInt, _>(applied_at_unix)
            .bind::<Text, _>(file_name.as_str())
            .execute(&mut connection)
            .map_err(|error| Self::map_write_error(&mut connection, &error))?;

        Ok(affected > 0)
    }

    /// Returns the current unix timestamp in seconds.
    #[must_use]
    pub fn now_unix_seconds() -> i64 {
        // A clock before the epoch reads as 0.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map_or(0, |duration| {
                i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
            })
    }

    fn manifest_table_exists(
        connection: &mut SqliteConnection,
    ) -> Result<bool, diesel::result::Error> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            count: i64,
        }

        let row: Row = sql_query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?;",
        )
        .bind::<Text, _>(PATCH_MANIFEST_TABLE)
        .get_result(connection)?;

        Ok(row.count > 0)
    }

    fn map_error_with_schema_check<F>(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
        create_error: F,
    ) -> PersistenceError
    where
        F: Fn(String) -> PersistenceError,
    {
        match Self::manifest_table_exists(connection) {
            Ok(false) => PersistenceError::SchemaNotInitialised,
            Ok(true) => create_error(error.to_string()),
            Err(check_error) => create_error(format!(
                "schema presence check failed: {check_error}; original error: {error}"
            )),
        }
    }

    fn map_query_error(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, error, |message| {
            PersistenceError::QueryFailed { message }
        })
    }

    fn map_write_error(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, error, |message| {
            PersistenceError::WriteFailed { message }
        })
    }
}
