use crate::path::VssPath;
use gitvss_core::error::VssError;
use std::path::{Path, PathBuf};

/// Command surface of the VSS collaborator.
///
/// Every server mutation is a blocking round-trip with no multi-call
/// transaction; rollback semantics live in [`crate::driver::SyncDriver`],
/// not here. The destination project for `add` is an explicit parameter —
/// the underlying tool's ambient "current project" state is an
/// implementation detail a client must hide.
pub trait VssClient {
    /// Check out `project` (recursively if asked) into `local_dir`,
    /// taking the server-side checkout locks.
    fn checkout(&self, project: &VssPath, local_dir: &Path, recursive: bool)
    -> Result<(), VssError>;

    /// Check `local_dir` back in against `project`, releasing the locks.
    fn checkin(&self, project: &VssPath, local_dir: &Path, recursive: bool)
    -> Result<(), VssError>;

    /// Fetch the latest server content of `project` into `local_dir`
    /// without taking locks.
    fn get(&self, project: &VssPath, local_dir: &Path, recursive: bool) -> Result<(), VssError>;

    /// Add a local file to `into_project`.
    fn add(&self, local_file: &Path, into_project: &VssPath) -> Result<(), VssError>;

    /// Add several local files to the same `into_project`. Implementations
    /// that must bind ambient server state per destination can do so once
    /// for the whole batch instead of once per file.
    fn add_all(&self, local_files: &[PathBuf], into_project: &VssPath) -> Result<(), VssError> {
        for file in local_files {
            self.add(file, into_project)?;
        }
        Ok(())
    }

    /// Create a project directory. Idempotent: an already-existing project
    /// is not an error.
    fn create(&self, project: &VssPath) -> Result<(), VssError>;

    /// Delete a file or project from the server.
    fn delete(&self, path: &VssPath) -> Result<(), VssError>;

    /// Revert an open checkout of `project` without checking anything in.
    fn undo_checkout(&self, project: &VssPath, recursive: bool) -> Result<(), VssError>;
}
