pub mod diff;
pub mod error;
pub mod settings;
pub mod snapshot;
pub mod staging;

pub use error::{Error, Result};
