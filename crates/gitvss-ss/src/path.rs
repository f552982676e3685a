use std::fmt;

/// A hierarchical VSS project path, rooted at `$/` and `/`-separated.
///
/// VSS accepts backslash separators on input; they are normalized on
/// construction so paths compare by plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VssPath(String);

impl VssPath {
    pub fn root() -> Self {
        Self("$/".to_string())
    }

    /// Build a path from user or config input. Accepts `$/Project/Sub`,
    /// `$\Project\Sub`, or a bare `Project/Sub`.
    pub fn new(raw: &str) -> Self {
        let normalized = raw.replace('\\', "/");
        let trimmed = normalized
            .trim_start_matches("$/")
            .trim_start_matches('$')
            .trim_matches('/');
        if trimmed.is_empty() {
            Self::root()
        } else {
            Self(format!("$/{trimmed}"))
        }
    }

    /// Append a relative `/`-separated path.
    pub fn join(&self, relative: &str) -> Self {
        let relative = relative.trim_matches('/');
        if relative.is_empty() {
            return self.clone();
        }
        if self.is_root() {
            Self(format!("$/{relative}"))
        } else {
            Self(format!("{}/{relative}", self.0))
        }
    }

    pub fn is_root(&self) -> bool {
        self.0 == "$/"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VssPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
