use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("git error: {0}")]
    Git(#[from] GitError),

    #[error("vss error: {0}")]
    Vss(#[from] VssError),

    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required option `{key}` was not found; pass it explicitly or set it in git config")]
    MissingOption { key: String },

    #[error("failed to read git config: {0}")]
    ReadFailed(String),
}

impl ConfigError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingOption { key: key.into() }
    }
}

#[derive(Error, Debug)]
pub enum GitError {
    #[error("not a git repository: {path}")]
    NotGitRepo { path: String },

    #[error("HEAD is detached or unnamed")]
    DetachedHead,

    #[error("git error: {0}")]
    Git(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum VssError {
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// Checkin failed and the compensating undo-checkout also failed.
    /// The original checkin error leads; the undo error is appended.
    #[error("{original} (rollback also failed: {undo})")]
    Rollback {
        original: Box<VssError>,
        undo: Box<VssError>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("working tree has uncommitted changes; commit or stash them before syncing")]
    DirtyWorkTree,

    #[error(
        "pending merge branch `{branch}` exists; resolve and merge it manually, \
         then delete the branch before pulling again"
    )]
    PendingMerge { branch: String },
}

pub type Result<T> = std::result::Result<T, Error>;
