use gitvss_core::diff::{deepest_first, diff_sets};
use gitvss_core::error::{Error, SyncError};
use gitvss_core::snapshot::TreeSnapshot;
use gitvss_core::staging::{StagingDir, copy_file_over};
use gitvss_ss::client::VssClient;
use gitvss_ss::driver::SyncDriver;
use gitvss_ss::path::VssPath;
use gitvss_vcs::adapter::{GitAdapter, MergeOutcome};
use gitvss_vcs::marker::MarkerTracker;
use std::fs;
use tracing::{debug, info, warn};

/// Well-known name of the isolated branch pull commits fetched changes on.
/// While it exists, an earlier pull is unfinished and new pulls must abort.
pub const PULL_BRANCH: &str = "gitvss-pull";

/// Terminal states of a pull. `Conflicts` is a recognized outcome requiring
/// operator action, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// The VSS project held nothing the local history did not already have.
    UpToDate,
    /// The current branch was fast-forwarded onto the fetched state.
    FastForwarded { commit: String },
    /// Fetched changes were merged with divergent local history.
    Merged { commit: String },
    /// The merge stopped on conflicts. The isolated branch is preserved —
    /// it is the only record of the pending merge.
    Conflicts { branch: String },
}

/// One-way synchronization VSS → Git.
///
/// Fetched changes are committed on an isolated branch rooted at the marker
/// commit (or HEAD when no marker exists) and merged back through Git's own
/// three-way merge machinery, so divergent local history surfaces as normal
/// merge conflicts instead of being overwritten.
pub fn pull<G: GitAdapter, C: VssClient>(
    git: &G,
    driver: &SyncDriver<C>,
    project: &VssPath,
) -> Result<PullOutcome, Error> {
    if git.branch_exists(PULL_BRANCH)? {
        return Err(SyncError::PendingMerge {
            branch: PULL_BRANCH.to_string(),
        }
        .into());
    }
    if !git.is_clean()? {
        return Err(SyncError::DirtyWorkTree.into());
    }

    let original = git.current_branch()?;
    let marker = MarkerTracker::new(git);
    // No marker means "last synced state unknown": degrade to HEAD as the
    // merge base rather than failing.
    let base = match marker.marker_commit()? {
        Some(commit) => commit,
        None => git.head_commit()?,
    };
    info!(project = %project, base = %base, "pulling from VSS");

    git.create_branch(PULL_BRANCH, &base)?;

    match fetch_onto_branch(git, driver, project) {
        Ok(committed) => {
            if let Some(commit) = &committed {
                debug!(commit = %commit, "fetched changes committed on isolated branch");
            }
        }
        Err(e) => {
            // Nothing was committed on the isolated branch; restore the
            // caller's branch and discard it before surfacing the failure.
            if let Err(restore) = git.checkout_ref(&original) {
                warn!(error = %restore, "failed to restore original branch after pull failure");
            }
            if let Err(delete) = git.delete_branch(PULL_BRANCH) {
                warn!(error = %delete, "failed to delete isolated pull branch");
            }
            return Err(e);
        }
    }

    git.checkout_ref(&original)?;
    let outcome = git.merge_branch(PULL_BRANCH)?;
    if outcome == MergeOutcome::Conflicts {
        info!(branch = PULL_BRANCH, "merge conflicts; resolve manually and delete the branch");
        return Ok(PullOutcome::Conflicts {
            branch: PULL_BRANCH.to_string(),
        });
    }

    git.delete_branch(PULL_BRANCH)?;
    let head = git.head_commit()?;
    marker.replace_marker(&head)?;

    Ok(match outcome {
        MergeOutcome::UpToDate => PullOutcome::UpToDate,
        MergeOutcome::FastForwarded => PullOutcome::FastForwarded { commit: head },
        MergeOutcome::Merged => PullOutcome::Merged { commit: head },
        MergeOutcome::Conflicts => unreachable!("handled above"),
    })
}

/// Check out the isolated branch, mirror the VSS project tree into the
/// working directory, and commit. Returns the new commit id, or `None` when
/// the fetched state matches the branch ("up to date" is a normal outcome).
fn fetch_onto_branch<G: GitAdapter, C: VssClient>(
    git: &G,
    driver: &SyncDriver<C>,
    project: &VssPath,
) -> Result<Option<String>, Error> {
    git.checkout_ref(PULL_BRANCH)?;

    let legacy_staging = StagingDir::new()?;
    driver.fetch_into(project, legacy_staging.path())?;

    let modern_staging = StagingDir::new()?;
    git.checkout_index_into(modern_staging.path())?;

    let modern = TreeSnapshot::scan(modern_staging.path())?;
    let legacy = TreeSnapshot::scan(legacy_staging.path())?;
    // Inverse orientation from push: modern is "old", legacy is "new".
    let dirs = diff_sets(&modern.dirs, &legacy.dirs);
    let files = diff_sets(&modern.files, &legacy.files);
    debug!(
        removed = files.removed.len(),
        common = files.common.len(),
        added = files.added.len(),
        "computed file delta"
    );

    let workdir = git.workdir().to_path_buf();

    // Legacy content wins for every surviving file; divergence from local
    // history is left to the merge step.
    for file in files.common.iter().chain(files.added.iter()) {
        copy_file_over(&legacy_staging.path().join(file), &workdir.join(file))?;
        git.stage_path(file)?;
    }

    for file in &files.removed {
        fs::remove_file(workdir.join(file))?;
        git.stage_removal(file)?;
    }

    // Directories emptied by the removals above; git tracks none of them,
    // so clean the working tree copies directly.
    for dir in deepest_first(&dirs.removed) {
        if let Err(e) = fs::remove_dir(workdir.join(&dir)) {
            warn!(dir = %dir, error = %e, "could not remove emptied directory");
        }
    }

    Ok(git.commit_index(&format!("gitvss: pull from {project}"))?)
}
