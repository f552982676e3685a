use crate::adapter::GitAdapter;
use gitvss_core::error::GitError;
use tracing::debug;

/// Well-known tag recording the last commit known to match the VSS server.
pub const MARKER_TAG: &str = "gitvss-latest";

/// Tracks the marker tag. The update is an explicit delete-then-create, not
/// an atomic rename: a crash between the two steps leaves no marker, which
/// pull treats as "unknown, start from HEAD" — a safe degraded state, not
/// data loss.
pub struct MarkerTracker<'a, G: GitAdapter> {
    git: &'a G,
}

impl<'a, G: GitAdapter> MarkerTracker<'a, G> {
    pub fn new(git: &'a G) -> Self {
        Self { git }
    }

    pub fn has_marker(&self) -> Result<bool, GitError> {
        Ok(self.marker_commit()?.is_some())
    }

    /// Commit the marker points at, if a marker exists.
    pub fn marker_commit(&self) -> Result<Option<String>, GitError> {
        self.git.tag_commit(MARKER_TAG)
    }

    /// Move the marker to `commit`.
    pub fn replace_marker(&self, commit: &str) -> Result<(), GitError> {
        if self.git.tag_commit(MARKER_TAG)?.is_some() {
            self.git.delete_tag(MARKER_TAG)?;
        }
        debug!(commit, tag = MARKER_TAG, "moving marker tag");
        self.git.tag(MARKER_TAG, commit)
    }
}
