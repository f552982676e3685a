use crate::client::VssClient;
use crate::path::VssPath;
use gitvss_core::diff::{self, SetDiff};
use gitvss_core::error::VssError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counts of structural changes applied to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureReport {
    pub deleted_files: usize,
    pub deleted_dirs: usize,
    pub created_dirs: usize,
    pub added_files: usize,
}

impl StructureReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Layers the sync transaction semantics over a raw [`VssClient`]:
/// rollback of a failed checkin, and the ordering constraints of
/// structural changes (the server rejects deleting non-empty projects
/// and adding into projects that do not exist yet).
pub struct SyncDriver<C: VssClient> {
    client: C,
}

impl<C: VssClient> SyncDriver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Recursive checkout of `project` into `local_dir`. An open checkout
    /// left behind by a later failure is an advisory lock on the server,
    /// not corruption.
    pub fn checkout_into(&self, project: &VssPath, local_dir: &Path) -> Result<(), VssError> {
        info!(project = %project, local = %local_dir.display(), "checking out VSS project");
        self.client.checkout(project, local_dir, true)
    }

    /// Recursive fetch without taking locks.
    pub fn fetch_into(&self, project: &VssPath, local_dir: &Path) -> Result<(), VssError> {
        info!(project = %project, local = %local_dir.display(), "fetching VSS project");
        self.client.get(project, local_dir, true)
    }

    /// Check `local_dir` in against `project`. If the checkin fails, issue
    /// exactly one undo-checkout for the same project before surfacing the
    /// original error. A failing undo is reported alongside the original,
    /// which stays the caller-visible failure.
    pub fn checkin_or_undo(&self, project: &VssPath, local_dir: &Path) -> Result<(), VssError> {
        info!(project = %project, local = %local_dir.display(), "checking in VSS project");
        let original = match self.client.checkin(project, local_dir, true) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        warn!(project = %project, error = %original, "checkin failed, undoing checkout");
        match self.client.undo_checkout(project, true) {
            Ok(()) => Err(original),
            Err(undo) => Err(VssError::Rollback {
                original: Box::new(original),
                undo: Box::new(undo),
            }),
        }
    }

    /// Apply structural changes after a successful checkin, in the order the
    /// server requires: delete files, delete directories deepest-first,
    /// create directories shallowest-first, add files grouped per
    /// destination directory. Failures here are surfaced as-is; already
    /// applied changes are not undone.
    pub fn apply_structure(
        &self,
        project: &VssPath,
        local_root: &Path,
        dirs: &SetDiff,
        files: &SetDiff,
    ) -> Result<StructureReport, VssError> {
        let mut report = StructureReport::default();

        for file in &files.removed {
            debug!(path = %file, "deleting file from server");
            self.client.delete(&project.join(file))?;
            report.deleted_files += 1;
        }

        for dir in diff::deepest_first(&dirs.removed) {
            debug!(path = %dir, "deleting directory from server");
            self.client.delete(&project.join(&dir))?;
            report.deleted_dirs += 1;
        }

        for dir in diff::shallowest_first(&dirs.added) {
            debug!(path = %dir, "creating directory on server");
            self.client.create(&project.join(&dir))?;
            report.created_dirs += 1;
        }

        for (parent, group) in diff::group_by_parent(&files.added) {
            let into_project = project.join(&parent);
            debug!(count = group.len(), project = %into_project, "adding files to server");
            let local_files: Vec<PathBuf> =
                group.iter().map(|file| local_root.join(file)).collect();
            self.client.add_all(&local_files, &into_project)?;
            report.added_files += local_files.len();
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Checkout(String),
        Checkin(String),
        Get(String),
        Add(PathBuf, String),
        AddBatch(String, usize),
        Create(String),
        Delete(String),
        UndoCheckout(String),
    }

    #[derive(Default)]
    struct RecordingClient {
        ops: RefCell<Vec<Op>>,
        fail_checkin: bool,
        fail_undo: bool,
        fail_delete_of: Option<String>,
    }

    impl RecordingClient {
        fn ops(&self) -> Vec<Op> {
            self.ops.borrow().clone()
        }

        fn command_error(what: &str) -> VssError {
            VssError::Command {
                command: what.to_string(),
                status: "exit status: 100".to_string(),
                stderr: format!("{what} refused"),
            }
        }
    }

    impl VssClient for RecordingClient {
        fn checkout(
            &self,
            project: &VssPath,
            _local_dir: &Path,
            _recursive: bool,
        ) -> Result<(), VssError> {
            self.ops.borrow_mut().push(Op::Checkout(project.to_string()));
            Ok(())
        }

        fn checkin(
            &self,
            project: &VssPath,
            _local_dir: &Path,
            _recursive: bool,
        ) -> Result<(), VssError> {
            self.ops.borrow_mut().push(Op::Checkin(project.to_string()));
            if self.fail_checkin {
                return Err(Self::command_error("checkin"));
            }
            Ok(())
        }

        fn get(
            &self,
            project: &VssPath,
            _local_dir: &Path,
            _recursive: bool,
        ) -> Result<(), VssError> {
            self.ops.borrow_mut().push(Op::Get(project.to_string()));
            Ok(())
        }

        fn add(&self, local_file: &Path, into_project: &VssPath) -> Result<(), VssError> {
            self.ops
                .borrow_mut()
                .push(Op::Add(local_file.to_path_buf(), into_project.to_string()));
            Ok(())
        }

        fn add_all(&self, local_files: &[PathBuf], into_project: &VssPath) -> Result<(), VssError> {
            self.ops
                .borrow_mut()
                .push(Op::AddBatch(into_project.to_string(), local_files.len()));
            for file in local_files {
                self.add(file, into_project)?;
            }
            Ok(())
        }

        fn create(&self, project: &VssPath) -> Result<(), VssError> {
            self.ops.borrow_mut().push(Op::Create(project.to_string()));
            Ok(())
        }

        fn delete(&self, path: &VssPath) -> Result<(), VssError> {
            self.ops.borrow_mut().push(Op::Delete(path.to_string()));
            if self
                .fail_delete_of
                .as_deref()
                .is_some_and(|p| p == path.as_str())
            {
                return Err(Self::command_error("delete"));
            }
            Ok(())
        }

        fn undo_checkout(&self, project: &VssPath, _recursive: bool) -> Result<(), VssError> {
            self.ops
                .borrow_mut()
                .push(Op::UndoCheckout(project.to_string()));
            if self.fail_undo {
                return Err(Self::command_error("undo"));
            }
            Ok(())
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn failed_checkin_triggers_exactly_one_undo_checkout() {
        let driver = SyncDriver::new(RecordingClient {
            fail_checkin: true,
            ..Default::default()
        });
        let project = VssPath::new("$/Project");

        let err = driver
            .checkin_or_undo(&project, Path::new("/tmp/staging"))
            .unwrap_err();
        assert!(matches!(err, VssError::Command { .. }), "original error surfaces");

        let undos: Vec<_> = driver
            .client()
            .ops()
            .into_iter()
            .filter(|op| matches!(op, Op::UndoCheckout(p) if p == "$/Project"))
            .collect();
        assert_eq!(undos.len(), 1, "exactly one undo for the same path");
    }

    #[test]
    fn failed_undo_surfaces_both_errors_with_original_first() {
        let driver = SyncDriver::new(RecordingClient {
            fail_checkin: true,
            fail_undo: true,
            ..Default::default()
        });
        let err = driver
            .checkin_or_undo(&VssPath::new("$/Project"), Path::new("/tmp/staging"))
            .unwrap_err();
        match err {
            VssError::Rollback { original, undo } => {
                assert!(original.to_string().contains("checkin refused"));
                assert!(undo.to_string().contains("undo refused"));
            }
            other => panic!("expected Rollback, got {other}"),
        }
    }

    #[test]
    fn successful_checkin_issues_no_undo() {
        let driver = SyncDriver::new(RecordingClient::default());
        driver
            .checkin_or_undo(&VssPath::new("$/Project"), Path::new("/tmp/staging"))
            .unwrap();
        assert!(
            !driver
                .client()
                .ops()
                .iter()
                .any(|op| matches!(op, Op::UndoCheckout(_)))
        );
    }

    #[test]
    fn structure_ordering_deletes_deep_creates_shallow() {
        let driver = SyncDriver::new(RecordingClient::default());
        let project = VssPath::new("$/P");
        let dirs = SetDiff {
            removed: set(&["x", "x/y", "x/y/z"]),
            common: set(&[]),
            added: set(&["a/b/c", "a", "a/b"]),
        };
        let files = SetDiff::default();

        let report = driver
            .apply_structure(&project, Path::new("/tmp/local"), &dirs, &files)
            .unwrap();
        assert_eq!(report.deleted_dirs, 3);
        assert_eq!(report.created_dirs, 3);

        let ops = driver.client().ops();
        let deletes: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                Op::Delete(p) => Some(p.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(deletes, vec!["$/P/x/y/z", "$/P/x/y", "$/P/x"]);

        let creates: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                Op::Create(p) => Some(p.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(creates, vec!["$/P/a", "$/P/a/b", "$/P/a/b/c"]);
    }

    #[test]
    fn adds_are_grouped_by_destination_directory() {
        // Legacy tree {README, src/main}; modern side deleted README and
        // added src/util.
        let driver = SyncDriver::new(RecordingClient::default());
        let project = VssPath::new("$/P");
        let dirs = SetDiff::default();
        let files = SetDiff {
            removed: set(&["README"]),
            common: set(&["src/main"]),
            added: set(&["src/util"]),
        };

        let report = driver
            .apply_structure(&project, Path::new("/tmp/local"), &dirs, &files)
            .unwrap();
        assert_eq!(report.deleted_files, 1);
        assert_eq!(report.added_files, 1);

        let ops = driver.client().ops();
        assert!(ops.contains(&Op::Delete("$/P/README".to_string())));
        assert!(ops.contains(&Op::Add(
            PathBuf::from("/tmp/local/src/util"),
            "$/P/src".to_string()
        )));
    }

    #[test]
    fn each_destination_directory_gets_one_add_batch() {
        let driver = SyncDriver::new(RecordingClient::default());
        let project = VssPath::new("$/P");
        let files = SetDiff {
            added: set(&["src/a", "src/b", "docs/c", "top"]),
            ..Default::default()
        };

        let report = driver
            .apply_structure(&project, Path::new("/tmp/local"), &SetDiff::default(), &files)
            .unwrap();
        assert_eq!(report.added_files, 4);

        let batches: Vec<_> = driver
            .client()
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::AddBatch(project, count) => Some((project, count)),
                _ => None,
            })
            .collect();
        // Files sharing a destination ride one batch, so the client can
        // bind its current project once per directory.
        assert_eq!(
            batches,
            vec![
                ("$/P".to_string(), 1),
                ("$/P/docs".to_string(), 1),
                ("$/P/src".to_string(), 2),
            ]
        );
    }

    #[test]
    fn structure_failure_stops_without_undoing_earlier_changes() {
        let driver = SyncDriver::new(RecordingClient {
            fail_delete_of: Some("$/P/b".to_string()),
            ..Default::default()
        });
        let project = VssPath::new("$/P");
        let files = SetDiff {
            removed: set(&["a", "b", "c"]),
            ..Default::default()
        };

        let err = driver
            .apply_structure(&project, Path::new("/tmp/local"), &SetDiff::default(), &files)
            .unwrap_err();
        assert!(matches!(err, VssError::Command { .. }));

        let ops = driver.client().ops();
        // "a" was deleted and stays deleted; "c" was never attempted.
        assert!(ops.contains(&Op::Delete("$/P/a".to_string())));
        assert!(!ops.contains(&Op::Delete("$/P/c".to_string())));
        assert!(!ops.iter().any(|op| matches!(op, Op::UndoCheckout(_))));
    }
}
