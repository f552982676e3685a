use crate::adapter::{GitAdapter, MergeOutcome};
use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, Oid, Repository, StatusOptions};
use gitvss_core::error::GitError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `GitAdapter` backed by libgit2. Holds the repository open for the
/// lifetime of one sync operation.
pub struct Git2Adapter {
    repo: Repository,
    workdir: PathBuf,
}

impl Git2Adapter {
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|_| GitError::NotGitRepo {
            path: path.display().to_string(),
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::Git("repository has no working tree".to_string()))?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    fn head_commit_obj(&self) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .head()
            .map_err(|e| GitError::Git(format!("failed to read HEAD: {e}")))?
            .peel_to_commit()
            .map_err(|e| GitError::Git(format!("failed to resolve HEAD commit: {e}")))
    }

    fn find_commit(&self, id: &str) -> Result<git2::Commit<'_>, GitError> {
        let oid = Oid::from_str(id)
            .map_err(|e| GitError::Git(format!("invalid commit id `{id}`: {e}")))?;
        self.repo
            .find_commit(oid)
            .map_err(|e| GitError::Git(format!("failed to find commit `{id}`: {e}")))
    }

    fn index(&self) -> Result<git2::Index, GitError> {
        self.repo
            .index()
            .map_err(|e| GitError::Git(format!("failed to open index: {e}")))
    }
}

impl GitAdapter for Git2Adapter {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn is_clean(&self) -> Result<bool, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);
        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::Git(format!("failed to read status: {e}")))?;
        Ok(statuses.is_empty())
    }

    fn head_commit(&self) -> Result<String, GitError> {
        Ok(self.head_commit_obj()?.id().to_string())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::Git(format!("failed to read HEAD: {e}")))?;
        match head.shorthand() {
            Some(name) if head.is_branch() => Ok(name.to_string()),
            _ => Err(GitError::DetachedHead),
        }
    }

    fn checkout_index_into(&self, target: &Path) -> Result<(), GitError> {
        std::fs::create_dir_all(target)?;
        let mut opts = CheckoutBuilder::new();
        opts.target_dir(target).force().recreate_missing(true);
        self.repo
            .checkout_index(None, Some(&mut opts))
            .map_err(|e| GitError::Git(format!("failed to materialize index: {e}")))
    }

    fn checkout_ref(&self, rev: &str) -> Result<(), GitError> {
        debug!(rev, "checking out revision");
        let (object, reference) = self
            .repo
            .revparse_ext(rev)
            .map_err(|e| GitError::Git(format!("failed to resolve revision `{rev}`: {e}")))?;

        let mut opts = CheckoutBuilder::new();
        opts.force();
        self.repo
            .checkout_tree(&object, Some(&mut opts))
            .map_err(|e| GitError::Git(format!("failed to check out `{rev}`: {e}")))?;

        match reference.as_ref().and_then(git2::Reference::name) {
            Some(name) => self
                .repo
                .set_head(name)
                .map_err(|e| GitError::Git(format!("failed to move HEAD to `{rev}`: {e}"))),
            None => self
                .repo
                .set_head_detached(object.id())
                .map_err(|e| GitError::Git(format!("failed to detach HEAD at `{rev}`: {e}"))),
        }
    }

    fn tag_commit(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_reference(&format!("refs/tags/{name}")) {
            Ok(reference) => {
                let commit = reference
                    .peel_to_commit()
                    .map_err(|e| GitError::Git(format!("failed to peel tag `{name}`: {e}")))?;
                Ok(Some(commit.id().to_string()))
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Git(format!("failed to look up tag `{name}`: {e}"))),
        }
    }

    fn tag(&self, name: &str, commit: &str) -> Result<(), GitError> {
        let oid = Oid::from_str(commit)
            .map_err(|e| GitError::Git(format!("invalid commit id `{commit}`: {e}")))?;
        let object = self
            .repo
            .find_object(oid, None)
            .map_err(|e| GitError::Git(format!("failed to find commit `{commit}`: {e}")))?;
        self.repo
            .tag_lightweight(name, &object, true)
            .map(|_| ())
            .map_err(|e| GitError::Git(format!("failed to create tag `{name}`: {e}")))
    }

    fn delete_tag(&self, name: &str) -> Result<(), GitError> {
        self.repo
            .tag_delete(name)
            .map_err(|e| GitError::Git(format!("failed to delete tag `{name}`: {e}")))
    }

    fn branch_exists(&self, name: &str) -> Result<bool, GitError> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(GitError::Git(format!("failed to look up branch `{name}`: {e}"))),
        }
    }

    fn create_branch(&self, name: &str, commit: &str) -> Result<(), GitError> {
        let commit = self.find_commit(commit)?;
        self.repo
            .branch(name, &commit, false)
            .map(|_| ())
            .map_err(|e| GitError::Git(format!("failed to create branch `{name}`: {e}")))
    }

    fn delete_branch(&self, name: &str) -> Result<(), GitError> {
        let mut branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| GitError::Git(format!("failed to find branch `{name}`: {e}")))?;
        branch
            .delete()
            .map_err(|e| GitError::Git(format!("failed to delete branch `{name}`: {e}")))
    }

    fn stage_path(&self, relative: &str) -> Result<(), GitError> {
        let mut index = self.index()?;
        index
            .add_path(Path::new(relative))
            .map_err(|e| GitError::Git(format!("failed to stage `{relative}`: {e}")))?;
        index
            .write()
            .map_err(|e| GitError::Git(format!("failed to write index: {e}")))
    }

    fn stage_removal(&self, relative: &str) -> Result<(), GitError> {
        let mut index = self.index()?;
        index
            .remove_path(Path::new(relative))
            .map_err(|e| GitError::Git(format!("failed to stage removal of `{relative}`: {e}")))?;
        index
            .write()
            .map_err(|e| GitError::Git(format!("failed to write index: {e}")))
    }

    fn commit_index(&self, message: &str) -> Result<Option<String>, GitError> {
        let mut index = self.index()?;
        let tree_id = index
            .write_tree()
            .map_err(|e| GitError::Git(format!("failed to write tree: {e}")))?;
        let head = self.head_commit_obj()?;
        if head.tree_id() == tree_id {
            debug!("nothing to commit");
            return Ok(None);
        }

        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::Git(format!("failed to find tree: {e}")))?;
        let sig = self
            .repo
            .signature()
            .map_err(|e| GitError::Git(format!("failed to build signature: {e}")))?;
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&head])
            .map_err(|e| GitError::Git(format!("failed to commit: {e}")))?;
        Ok(Some(oid.to_string()))
    }

    fn merge_branch(&self, name: &str) -> Result<MergeOutcome, GitError> {
        let branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| GitError::Git(format!("failed to find branch `{name}`: {e}")))?;
        let annotated = self
            .repo
            .reference_to_annotated_commit(branch.get())
            .map_err(|e| GitError::Git(format!("failed to resolve branch `{name}`: {e}")))?;

        let (analysis, _) = self
            .repo
            .merge_analysis(&[&annotated])
            .map_err(|e| GitError::Git(format!("merge analysis failed: {e}")))?;

        if analysis.is_up_to_date() {
            return Ok(MergeOutcome::UpToDate);
        }

        if analysis.is_fast_forward() {
            let target = annotated.id();
            let mut head_ref = self
                .repo
                .head()
                .map_err(|e| GitError::Git(format!("failed to read HEAD: {e}")))?;
            head_ref
                .set_target(target, &format!("gitvss: fast-forward to {name}"))
                .map_err(|e| GitError::Git(format!("failed to fast-forward: {e}")))?;
            let mut opts = CheckoutBuilder::new();
            opts.force();
            self.repo
                .checkout_head(Some(&mut opts))
                .map_err(|e| GitError::Git(format!("failed to update working tree: {e}")))?;
            return Ok(MergeOutcome::FastForwarded);
        }

        self.repo
            .merge(&[&annotated], None, None)
            .map_err(|e| GitError::Git(format!("failed to merge `{name}`: {e}")))?;

        let mut index = self.index()?;
        if index.has_conflicts() {
            // Leave the repository in its merging state; the operator
            // resolves and commits manually.
            return Ok(MergeOutcome::Conflicts);
        }

        let tree_id = index
            .write_tree()
            .map_err(|e| GitError::Git(format!("failed to write merge tree: {e}")))?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::Git(format!("failed to find merge tree: {e}")))?;
        let sig = self
            .repo
            .signature()
            .map_err(|e| GitError::Git(format!("failed to build signature: {e}")))?;
        let head = self.head_commit_obj()?;
        let theirs = self
            .repo
            .find_commit(annotated.id())
            .map_err(|e| GitError::Git(format!("failed to find merged commit: {e}")))?;
        self.repo
            .commit(
                Some("HEAD"),
                &sig,
                &sig,
                &format!("Merge branch '{name}'"),
                &tree,
                &[&head, &theirs],
            )
            .map_err(|e| GitError::Git(format!("failed to create merge commit: {e}")))?;
        self.repo
            .cleanup_state()
            .map_err(|e| GitError::Git(format!("failed to clean up merge state: {e}")))?;
        Ok(MergeOutcome::Merged)
    }
}
