use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;
use tracing::warn;

/// An ephemeral directory exclusively owned by one sync step.
///
/// VSS marks checked-in files read-only, which would make plain removal fail
/// on some platforms, so the read-only bit is cleared recursively before the
/// directory is deleted. Deletion runs on every exit path via `Drop`.
#[derive(Debug)]
pub struct StagingDir {
    inner: Option<TempDir>,
}

impl StagingDir {
    pub fn new() -> io::Result<Self> {
        let inner = TempDir::with_prefix("gitvss-")?;
        Ok(Self { inner: Some(inner) })
    }

    pub fn path(&self) -> &Path {
        self.inner
            .as_ref()
            .expect("staging dir accessed after close")
            .path()
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Some(dir) = self.inner.take() {
            if let Err(e) = clear_readonly(dir.path()) {
                warn!(path = %dir.path().display(), error = %e, "failed to clear read-only attributes before cleanup");
            }
            if let Err(e) = dir.close() {
                warn!(error = %e, "failed to remove staging directory");
            }
        }
    }
}

/// Recursively clear the read-only attribute under `root`.
pub fn clear_readonly(root: &Path) -> io::Result<()> {
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            clear_readonly(&path)?;
        } else if metadata.permissions().readonly() {
            let mut perms = metadata.permissions();
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
            fs::set_permissions(&path, perms)?;
        }
    }
    Ok(())
}

/// Copy a single file, replacing any read-only destination.
pub fn copy_file_over(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    if let Ok(metadata) = fs::metadata(dst)
        && metadata.permissions().readonly()
    {
        let mut perms = metadata.permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(dst, perms)?;
    }
    fs::copy(src, dst)?;
    Ok(())
}

/// Recursively copy `src` into `dst`, overwriting existing files.
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<usize> {
    let mut copied = 0;
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_tree(&from, &to)?;
        } else {
            copy_file_over(&from, &to)?;
            copied += 1;
        }
    }
    Ok(copied)
}
