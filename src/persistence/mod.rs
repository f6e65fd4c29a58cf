//! Patch manifest persistence and database migrations.
//!
//! The manifest is an optional `SQLite` database recording every patch the
//! fetcher wrote and when the applier applied it. The schema is managed with
//! Diesel migrations embedded in the binary.

mod error;
mod manifest;
mod migrator;

pub use error::PersistenceError;
pub use manifest::{FetchedPatch, ManifestEntry, PatchManifest};
pub use migrator::{INITIAL_SCHEMA_VERSION, SchemaVersion, migrate_database};
