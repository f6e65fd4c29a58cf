//! Pending and applied patch files on disk.
//!
//! Patches waiting to be applied live directly in the patch directory;
//! applied ones are moved into its `done` subdirectory. All access goes
//! through capability-scoped directory handles.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::{PatchError, io_error};

use super::name::{PATCH_EXTENSION, PatchFileName};

/// Subdirectory that receives applied patches.
pub const DONE_DIR: &str = "done";

/// A directory of pending patches with a `done` subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDirectory {
    root: Utf8PathBuf,
}

impl PatchDirectory {
    /// Targets the given directory. Nothing is created until a patch is
    /// written.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The pending directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The `done` subdirectory.
    #[must_use]
    pub fn done_root(&self) -> Utf8PathBuf {
        self.root.join(DONE_DIR)
    }

    /// Path of a pending patch.
    #[must_use]
    pub fn pending_path(&self, name: &PatchFileName) -> Utf8PathBuf {
        self.root.join(name.as_str())
    }

    /// Path of an applied patch.
    #[must_use]
    pub fn done_path(&self, name: &PatchFileName) -> Utf8PathBuf {
        self.done_root().join(name.as_str())
    }

    /// Fails unless the pending directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::MissingPatchDirectory`] when it does not, or
    /// [`PatchError::Io`] when it cannot be opened.
    pub fn require_existing(&self) -> Result<(), PatchError> {
        self.open_root()?.map(drop).ok_or_else(|| self.missing())
    }

    /// Whether a patch of this name is pending or already applied.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Io`] when the directory cannot be opened.
    pub fn contains(&self, name: &PatchFileName) -> Result<bool, PatchError> {
        let Some(dir) = self.open_root()? else {
            return Ok(false);
        };
        let done_entry = Utf8Path::new(DONE_DIR).join(name.as_str());
        Ok(dir.exists(name.as_str()) || dir.exists(&done_entry))
    }

    /// Writes a pending patch, creating the directory when needed.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Io`] when the directory or file cannot be
    /// written.
    pub fn write_pending(
        &self,
        name: &PatchFileName,
        contents: &str,
    ) -> Result<Utf8PathBuf, PatchError> {
        Dir::create_ambient_dir_all(&self.root, ambient_authority())
            .map_err(|error| io_error(&format!("create {}", self.root), &error))?;
        let dir = self.open_root()?.ok_or_else(|| self.missing())?;
        dir.write(name.as_str(), contents)
            .map_err(|error| io_error(&format!("write {}", self.pending_path(name)), &error))?;
        Ok(self.pending_path(name))
    }

    /// Pending patches in lexical order.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::MissingPatchDirectory`] when the directory does
    /// not exist, or [`PatchError::Io`] when it cannot be listed.
    pub fn pending(&self) -> Result<Vec<PatchFileName>, PatchError> {
        let dir = self.open_root()?.ok_or_else(|| self.missing())?;
        list_patches(&dir, &self.root)
    }

    /// Applied patches in lexical order; empty when `done` does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Io`] when the directory cannot be listed.
    pub fn done(&self) -> Result<Vec<PatchFileName>, PatchError> {
        let done_root = self.done_root();
        match open_dir(&done_root)? {
            Some(dir) => list_patches(&dir, &done_root),
            None => Ok(Vec::new()),
        }
    }

    /// Reads an applied patch.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Io`] when the file cannot be read.
    pub fn read_done(&self, name: &PatchFileName) -> Result<String, PatchError> {
        let dir = self.open_root()?.ok_or_else(|| self.missing())?;
        dir.read_to_string(Utf8Path::new(DONE_DIR).join(name.as_str()))
            .map_err(|error| io_error(&format!("read {}", self.done_path(name)), &error))
    }

    /// Moves a pending patch into `done`, creating it when needed.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Io`] when the move fails.
    pub fn mark_done(&self, name: &PatchFileName) -> Result<(), PatchError> {
        let dir = self.open_root()?.ok_or_else(|| self.missing())?;
        dir.create_dir_all(DONE_DIR)
            .map_err(|error| io_error(&format!("create {}", self.done_root()), &error))?;
        dir.rename(
            name.as_str(),
            &dir,
            Utf8Path::new(DONE_DIR).join(name.as_str()),
        )
        .map_err(|error| io_error(&format!("move {} to {DONE_DIR}", name), &error))
    }

    fn open_root(&self) -> Result<Option<Dir>, PatchError> {
        open_dir(&self.root)
    }

    fn missing(&self) -> PatchError {
        PatchError::MissingPatchDirectory {
            path: self.root.to_string(),
        }
    }
}

fn open_dir(path: &Utf8Path) -> Result<Option<Dir>, PatchError> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(io_error(&format!("open {path}"), &error)),
    }
}

fn list_patches(dir: &Dir, path: &Utf8Path) -> Result<Vec<PatchFileName>, PatchError> {
    let list_error = |error: io::Error| io_error(&format!("list {path}"), &error);

    let mut names = Vec::new();
    for entry in dir.entries().map_err(list_error)? {
        let dir_entry = entry.map_err(list_error)?;
        if !dir_entry.file_type().map_err(list_error)?.is_file() {
            continue;
        }
        let file_name = dir_entry.file_name().map_err(list_error)?;
        if !file_name.ends_with(PATCH_EXTENSION) {
            continue;
        }
        match PatchFileName::parse(&file_name) {
            Ok(name) => names.push(name),
            Err(error) => tracing::debug!("ignoring {file_name}: {error}"),
        }
    }
    names.sort();
    Ok(names)
}
