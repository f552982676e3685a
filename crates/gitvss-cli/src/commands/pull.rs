use gitvss_sync::PullOutcome;
use std::path::Path;

pub fn run(
    repo_dir: &Path,
    repository_path: Option<String>,
    project_path: Option<String>,
    ss_path: Option<&str>,
    verbose: bool,
) -> anyhow::Result<()> {
    let session = super::open_session(repo_dir, repository_path, project_path, ss_path, verbose)?;

    match gitvss_sync::pull(&session.git, &session.driver, &session.project)? {
        PullOutcome::UpToDate => {
            println!("Already up to date with {}", session.project);
        }
        PullOutcome::FastForwarded { commit } => {
            println!("Fast-forwarded to {}", &commit[..12.min(commit.len())]);
        }
        PullOutcome::Merged { commit } => {
            println!("Merged VSS changes as {}", &commit[..12.min(commit.len())]);
        }
        PullOutcome::Conflicts { branch } => {
            eprintln!("Merge conflicts pulling from {}.", session.project);
            eprintln!("Resolve them, commit the merge, then delete the `{branch}` branch.");
            std::process::exit(1);
        }
    }
    Ok(())
}
