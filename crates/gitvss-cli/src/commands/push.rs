use std::path::Path;

pub fn run(
    repo_dir: &Path,
    at_ref: Option<&str>,
    repository_path: Option<String>,
    project_path: Option<String>,
    ss_path: Option<&str>,
    verbose: bool,
) -> anyhow::Result<()> {
    let session = super::open_session(repo_dir, repository_path, project_path, ss_path, verbose)?;

    let report = gitvss_sync::push(&session.git, &session.driver, &session.project, at_ref)?;

    println!(
        "Pushed {} to {}",
        &report.pushed_commit[..12.min(report.pushed_commit.len())],
        session.project
    );
    println!(
        "  {} files checked in, {} added, {} deleted, {} directories created, {} removed",
        report.copied_files,
        report.structure.added_files,
        report.structure.deleted_files,
        report.structure.created_dirs,
        report.structure.deleted_dirs,
    );
    Ok(())
}
