pub mod pull;
pub mod push;

use gitvss_core::settings::SyncSettings;
use gitvss_ss::{SsExeClient, SyncDriver, VssPath};
use gitvss_vcs::{Git2Adapter, RepoConfig};
use std::path::Path;

pub struct Session {
    pub git: Git2Adapter,
    pub driver: SyncDriver<SsExeClient>,
    pub project: VssPath,
}

/// Open the repository, resolve settings, and build the VSS client shared
/// by both subcommands.
pub fn open_session(
    repo_dir: &Path,
    repository_path: Option<String>,
    project_path: Option<String>,
    ss_path: Option<&str>,
    verbose: bool,
) -> anyhow::Result<Session> {
    let git = Git2Adapter::open(repo_dir)?;
    let config = RepoConfig::for_repo(git.repo())?;
    let settings = SyncSettings::resolve(&config, repository_path, project_path)?;

    let mut client = SsExeClient::new(&settings.repository_path);
    if let Some(ss) = ss_path {
        client = client.with_ss_path(ss);
    }
    if verbose {
        client = client.verbose();
    }

    Ok(Session {
        git,
        driver: SyncDriver::new(client),
        project: VssPath::new(&settings.project_path),
    })
}
