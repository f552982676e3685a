pub mod pull;
pub mod push;

pub use pull::{PULL_BRANCH, PullOutcome, pull};
pub use push::{PushReport, push};
