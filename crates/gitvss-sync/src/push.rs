use gitvss_core::diff::{SetDiff, diff_sets};
use gitvss_core::error::{Error, SyncError};
use gitvss_core::snapshot::TreeSnapshot;
use gitvss_core::staging::{StagingDir, copy_file_over};
use gitvss_ss::client::VssClient;
use gitvss_ss::driver::{StructureReport, SyncDriver};
use gitvss_ss::path::VssPath;
use gitvss_vcs::adapter::GitAdapter;
use gitvss_vcs::marker::MarkerTracker;
use tracing::{debug, info};

/// Summary of a completed push.
#[derive(Debug, Clone)]
pub struct PushReport {
    /// Commit whose tree now mirrors the VSS project.
    pub pushed_commit: String,
    /// Files present on both sides whose content was pushed via checkin.
    pub copied_files: usize,
    pub structure: StructureReport,
}

/// One-way synchronization Git → VSS.
///
/// Failure policy: anything failing before the checkin leaves the server
/// untouched except for an open checkout (an advisory lock, not corruption);
/// a failed checkin is rolled back with undo-checkout; structural changes
/// after a successful checkin are not rolled back and surface as-is.
pub fn push<G: GitAdapter, C: VssClient>(
    git: &G,
    driver: &SyncDriver<C>,
    project: &VssPath,
    at_ref: Option<&str>,
) -> Result<PushReport, Error> {
    if !git.is_clean()? {
        return Err(SyncError::DirtyWorkTree.into());
    }

    let modern_staging = StagingDir::new()?;
    let pushed_commit = materialize_modern(git, &modern_staging, at_ref)?;
    info!(commit = %pushed_commit, project = %project, "pushing to VSS");

    let legacy_staging = StagingDir::new()?;
    driver.checkout_into(project, legacy_staging.path())?;

    let modern = TreeSnapshot::scan(modern_staging.path())?;
    let legacy = TreeSnapshot::scan(legacy_staging.path())?;
    let dirs = diff_sets(&legacy.dirs, &modern.dirs);
    let files = diff_sets(&legacy.files, &modern.files);
    debug!(
        removed = files.removed.len(),
        common = files.common.len(),
        added = files.added.len(),
        "computed file delta"
    );

    let copied_files = overlay_common(&files, &modern_staging, &legacy_staging)?;

    driver.checkin_or_undo(project, legacy_staging.path())?;
    let structure = driver.apply_structure(project, modern_staging.path(), &dirs, &files)?;

    MarkerTracker::new(git).replace_marker(&pushed_commit)?;
    info!(
        copied = copied_files,
        deleted_files = structure.deleted_files,
        added_files = structure.added_files,
        "push complete"
    );

    Ok(PushReport {
        pushed_commit,
        copied_files,
        structure,
    })
}

/// Materialize the tree to push into `staging` via an indexed checkout.
/// When a historical ref is requested, the original branch is restored even
/// if materialization fails; the materialization error stays the
/// caller-visible one.
fn materialize_modern<G: GitAdapter>(
    git: &G,
    staging: &StagingDir,
    at_ref: Option<&str>,
) -> Result<String, Error> {
    let Some(rev) = at_ref else {
        git.checkout_index_into(staging.path())?;
        return Ok(git.head_commit()?);
    };

    let original = git.current_branch()?;
    debug!(rev, original = %original, "materializing historical revision");
    let materialized = git
        .checkout_ref(rev)
        .and_then(|()| git.checkout_index_into(staging.path()))
        .and_then(|()| git.head_commit());
    let restored = git.checkout_ref(&original);

    let commit = materialized?;
    restored?;
    Ok(commit)
}

/// Copy every file present in both trees from the modern staging into the
/// legacy staging, overwriting content; these ride in on the checkin.
fn overlay_common(
    files: &SetDiff,
    modern: &StagingDir,
    legacy: &StagingDir,
) -> Result<usize, Error> {
    let mut copied = 0;
    for file in &files.common {
        copy_file_over(&modern.path().join(file), &legacy.path().join(file))?;
        copied += 1;
    }
    Ok(copied)
}
