use crate::error::ConfigError;

/// Git config keys consulted when no explicit value is supplied.
pub const REPOSITORY_PATH_KEY: &str = "gitvss.repository-path";
pub const PROJECT_PATH_KEY: &str = "gitvss.project-path";

/// Read-only key/value lookup over the repository's configuration.
/// Implemented by the git adapter; kept as a trait so settings resolution
/// can be exercised without a real repository.
pub trait ConfigReader {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// Resolved sync settings. Built once per operation, read-only afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Filesystem path of the VSS database (the directory holding srcsafe.ini).
    pub repository_path: String,
    /// `$/`-rooted project path inside the VSS database.
    pub project_path: String,
}

impl SyncSettings {
    /// Resolve settings with explicit-over-config precedence.
    /// A key missing from both sources is fatal and reported by name.
    pub fn resolve(
        config: &dyn ConfigReader,
        repository_path: Option<String>,
        project_path: Option<String>,
    ) -> Result<Self, ConfigError> {
        let repository_path = match repository_path {
            Some(v) => v,
            None => config
                .get(REPOSITORY_PATH_KEY)?
                .ok_or_else(|| ConfigError::missing(REPOSITORY_PATH_KEY))?,
        };
        let project_path = match project_path {
            Some(v) => v,
            None => config
                .get(PROJECT_PATH_KEY)?
                .ok_or_else(|| ConfigError::missing(PROJECT_PATH_KEY))?,
        };
        Ok(Self {
            repository_path,
            project_path,
        })
    }
}
