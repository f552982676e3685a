use git2::ErrorCode;
use gitvss_core::error::ConfigError;
use gitvss_core::settings::ConfigReader;

/// Read-only snapshot of a repository's git config.
pub struct RepoConfig {
    config: git2::Config,
}

impl RepoConfig {
    pub fn for_repo(repo: &git2::Repository) -> Result<Self, ConfigError> {
        let config = repo
            .config()
            .and_then(|mut c| c.snapshot())
            .map_err(|e| ConfigError::ReadFailed(e.to_string()))?;
        Ok(Self { config })
    }
}

impl ConfigReader for RepoConfig {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match self.config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ConfigError::ReadFailed(e.to_string())),
        }
    }
}
