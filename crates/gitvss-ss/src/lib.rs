pub mod client;
pub mod driver;
pub mod path;
pub mod ss_exe;

pub use client::VssClient;
pub use driver::SyncDriver;
pub use path::VssPath;
pub use ss_exe::SsExeClient;
