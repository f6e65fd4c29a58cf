//! Error types for the patch manifest database.

use thiserror::Error;

use crate::error::PatchError;

/// Errors returned while opening, migrating, or querying the manifest.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// The database URL/path was present but blank.
    #[error("database URL must not be blank")]
    BlankDatabaseUrl,

    /// Establishing a `SQLite` connection failed.
    #[error("failed to connect to SQLite database: {message}")]
    ConnectionFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// Running pending migrations failed.
    #[error("failed to run database migrations: {message}")]
    MigrationFailed {
        /// Error detail from Diesel migrations.
        message: String,
    },

    /// Reading the schema version from the migration table failed.
    #[error("failed to read schema version after migrations: {message}")]
    SchemaVersionQueryFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },

    /// The migrations completed but no schema version could be found.
    #[error("no schema version recorded after migrations ran")]
    MissingSchemaVersion,

    /// The manifest table does not exist.
    #[error("patch manifest schema is not initialised; run migrations first")]
    SchemaNotInitialised,

    /// A manifest read failed.
    #[error("patch manifest query failed: {message}")]
    QueryFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// A manifest write failed.
    #[error("patch manifest write failed: {message}")]
    WriteFailed {
        /// Error detail from Diesel.
        message: String,
    },
}

impl From<PersistenceError> for PatchError {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::BlankDatabaseUrl | PersistenceError::SchemaNotInitialised => {
                Self::Configuration {
                    message: error.to_string(),
                }
            }
            other => Self::Io {
                message: other.to_string(),
            },
        }
    }
}
