use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use tracing::warn;

/// Suffix of VSS control-file artifacts (`vssver.scc`, `vssver2.scc`,
/// `mssccprj.scc`, ...). These are server bookkeeping, never project content.
const VSS_CONTROL_SUFFIX: &str = ".scc";

const GIT_DIR: &str = ".git";

/// Relative directory and file paths under a materialized root.
/// Captured once per sync step and never mutated afterward, only diffed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub dirs: BTreeSet<String>,
    pub files: BTreeSet<String>,
}

impl TreeSnapshot {
    /// Walk `root` and capture every reachable entry, excluding VSS control
    /// artifacts and the git directory. Symlinks are not followed; separators
    /// are normalized to `/` so snapshots compare across filesystems.
    pub fn scan(root: &Path) -> io::Result<Self> {
        let mut snapshot = Self::default();

        // Every ignore source is disabled: a sync must see every file, and
        // an `.ignore` or gitignore file inside the tree is itself content.
        let mut walker = WalkBuilder::new(root);
        walker
            .hidden(false)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(false);

        for entry in walker.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "walk error during snapshot scan");
                    continue;
                }
            };
            let path = entry.path();
            if path == root {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            let normalized = normalize(relative);
            if normalized.is_empty() || is_excluded(&normalized) {
                continue;
            }

            if entry.file_type().is_some_and(|t| t.is_dir()) {
                snapshot.dirs.insert(normalized);
            } else if entry.file_type().is_some_and(|t| t.is_file()) {
                snapshot.files.insert(normalized);
            }
        }

        Ok(snapshot)
    }
}

/// Normalize a relative path to `/`-separated form.
pub fn normalize(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}

fn is_excluded(relative: &str) -> bool {
    if relative
        .rsplit('/')
        .next()
        .is_some_and(|name| name.to_ascii_lowercase().ends_with(VSS_CONTROL_SUFFIX))
    {
        return true;
    }
    relative == GIT_DIR || relative.starts_with(".git/")
}
