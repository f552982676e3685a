pub mod adapter;
pub mod config;
pub mod git2_adapter;
pub mod marker;

pub use adapter::{GitAdapter, MergeOutcome};
pub use config::RepoConfig;
pub use git2_adapter::Git2Adapter;
pub use marker::MarkerTracker;
