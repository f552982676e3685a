use gitvss_core::error::VssError;
use gitvss_core::staging::copy_tree;
use gitvss_ss::client::VssClient;
use gitvss_ss::path::VssPath;
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

/// Test double for the VSS server: project state lives in a plain directory
/// tree, every call is recorded, and checkin can be made to fail.
pub struct FakeVss {
    root: PathBuf,
    pub ops: RefCell<Vec<String>>,
    pub fail_checkin: Cell<bool>,
}

impl FakeVss {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ops: RefCell::new(Vec::new()),
            fail_checkin: Cell::new(false),
        }
    }

    pub fn server_dir(&self, project: &VssPath) -> PathBuf {
        self.root.join(project.as_str().trim_start_matches("$/"))
    }

    pub fn take_ops(&self) -> Vec<String> {
        std::mem::take(&mut *self.ops.borrow_mut())
    }

    fn record(&self, op: String) {
        self.ops.borrow_mut().push(op);
    }
}

impl VssClient for FakeVss {
    fn checkout(
        &self,
        project: &VssPath,
        local_dir: &Path,
        _recursive: bool,
    ) -> Result<(), VssError> {
        self.record(format!("checkout {project}"));
        copy_tree(&self.server_dir(project), local_dir)?;
        Ok(())
    }

    fn checkin(
        &self,
        project: &VssPath,
        local_dir: &Path,
        _recursive: bool,
    ) -> Result<(), VssError> {
        self.record(format!("checkin {project}"));
        if self.fail_checkin.get() {
            return Err(VssError::Command {
                command: "ss Checkin".to_string(),
                status: "exit status: 100".to_string(),
                stderr: "simulated checkin failure".to_string(),
            });
        }
        copy_tree(local_dir, &self.server_dir(project))?;
        Ok(())
    }

    fn get(&self, project: &VssPath, local_dir: &Path, _recursive: bool) -> Result<(), VssError> {
        self.record(format!("get {project}"));
        copy_tree(&self.server_dir(project), local_dir)?;
        Ok(())
    }

    fn add(&self, local_file: &Path, into_project: &VssPath) -> Result<(), VssError> {
        let name = local_file.file_name().unwrap().to_string_lossy().to_string();
        self.record(format!("add {}/{name}", into_project));
        let dest = self.server_dir(into_project).join(&name);
        fs::create_dir_all(dest.parent().unwrap())?;
        fs::copy(local_file, dest)?;
        Ok(())
    }

    fn create(&self, project: &VssPath) -> Result<(), VssError> {
        self.record(format!("create {project}"));
        fs::create_dir_all(self.server_dir(project))?;
        Ok(())
    }

    fn delete(&self, path: &VssPath) -> Result<(), VssError> {
        self.record(format!("delete {path}"));
        let local = self.server_dir(path);
        if local.is_dir() {
            fs::remove_dir_all(local)?;
        } else {
            fs::remove_file(local)?;
        }
        Ok(())
    }

    fn undo_checkout(&self, project: &VssPath, _recursive: bool) -> Result<(), VssError> {
        self.record(format!("undo {project}"));
        Ok(())
    }
}

/// Initialize a git repository with an identity and an initial commit of
/// the given files.
pub fn init_repo(dir: &Path, files: &[(&str, &str)]) -> git2::Repository {
    let repo = git2::Repository::init(dir).unwrap();
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "test").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();
    drop(config);
    commit_files(&repo, files, &[], "initial");
    repo
}

/// Write and stage `files`, stage `removals`, and commit on HEAD.
pub fn commit_files(
    repo: &git2::Repository,
    files: &[(&str, &str)],
    removals: &[&str],
    message: &str,
) -> String {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();
    for (path, content) in files {
        let full = workdir.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    for path in removals {
        fs::remove_file(workdir.join(path)).unwrap();
        index.remove_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = git2::Signature::now("test", "test@example.com").unwrap();
    let parents: Vec<git2::Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
        .to_string()
}

/// Seed files directly into the fake server's project directory.
pub fn seed_server(server: &FakeVss, project: &VssPath, files: &[(&str, &str)]) {
    let root = server.server_dir(project);
    fs::create_dir_all(&root).unwrap();
    for (path, content) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
}
