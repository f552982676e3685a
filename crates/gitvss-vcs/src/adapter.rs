use gitvss_core::error::GitError;
use std::path::Path;

/// Result of merging a branch into the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Nothing to merge; the current branch already contains the other.
    UpToDate,
    /// The current branch was fast-forwarded.
    FastForwarded,
    /// A merge commit was created.
    Merged,
    /// The merge stopped on conflicts; the working tree holds the conflict
    /// markers and the operator must resolve them manually.
    Conflicts,
}

/// Command surface of the Git collaborator. Every call is a blocking local
/// operation against one repository.
pub trait GitAdapter {
    /// Root of the repository's working tree.
    fn workdir(&self) -> &Path;

    /// True when the working tree has no uncommitted or untracked changes.
    fn is_clean(&self) -> Result<bool, GitError>;

    /// Commit id of HEAD.
    fn head_commit(&self) -> Result<String, GitError>;

    /// Short name of the currently checked-out branch.
    fn current_branch(&self) -> Result<String, GitError>;

    /// Materialize the index into `target` without touching the working tree.
    fn checkout_index_into(&self, target: &Path) -> Result<(), GitError>;

    /// Check out a revision (branch name, tag, or commit id) into the
    /// working tree, moving HEAD.
    fn checkout_ref(&self, rev: &str) -> Result<(), GitError>;

    /// Commit id a tag points at, or `None` if the tag does not exist.
    fn tag_commit(&self, name: &str) -> Result<Option<String>, GitError>;

    /// Create or move a lightweight tag to `commit`.
    fn tag(&self, name: &str, commit: &str) -> Result<(), GitError>;

    /// Delete a tag. The tag must exist.
    fn delete_tag(&self, name: &str) -> Result<(), GitError>;

    fn branch_exists(&self, name: &str) -> Result<bool, GitError>;

    fn create_branch(&self, name: &str, commit: &str) -> Result<(), GitError>;

    fn delete_branch(&self, name: &str) -> Result<(), GitError>;

    /// Stage one path (relative to the working tree root).
    fn stage_path(&self, relative: &str) -> Result<(), GitError>;

    /// Stage the removal of one path.
    fn stage_removal(&self, relative: &str) -> Result<(), GitError>;

    /// Commit the index on HEAD. Returns the new commit id, or `None` when
    /// the index matches HEAD ("nothing to commit" is a normal outcome,
    /// not an error).
    fn commit_index(&self, message: &str) -> Result<Option<String>, GitError>;

    /// Merge the named branch into the current one.
    fn merge_branch(&self, name: &str) -> Result<MergeOutcome, GitError>;
}
