use crate::client::VssClient;
use crate::path::VssPath;
use gitvss_core::error::VssError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// `VssClient` backed by the `ss` command-line tool.
///
/// The repository to operate on is selected through the `SSDIR` environment
/// variable (the directory holding `srcsafe.ini`). All invocations pass
/// `-I-` so the tool never blocks on an interactive prompt.
pub struct SsExeClient {
    ss_path: PathBuf,
    repository_path: PathBuf,
    quiet: bool,
}

impl SsExeClient {
    pub fn new(repository_path: impl Into<PathBuf>) -> Self {
        Self {
            ss_path: PathBuf::from("ss"),
            repository_path: repository_path.into(),
            quiet: true,
        }
    }

    /// Override the location of the `ss` executable.
    pub fn with_ss_path(mut self, ss_path: impl Into<PathBuf>) -> Self {
        self.ss_path = ss_path.into();
        self
    }

    /// Pass the tool's verbose output through instead of suppressing it.
    pub fn verbose(mut self) -> Self {
        self.quiet = false;
        self
    }

    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<String, VssError> {
        let mut command = Command::new(&self.ss_path);
        command.args(args).env("SSDIR", &self.repository_path);
        command.arg("-I-");
        if self.quiet {
            command.arg("-O-");
        }
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let command_line = format!("{} {}", self.ss_path.display(), args.join(" "));
        debug!(command = %command_line, "running ss");

        let output = command.output().map_err(|source| VssError::Launch {
            command: command_line.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(VssError::Command {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// `ss Cp` binds the server-side "current project" consumed by `Add`.
    fn set_current_project(&self, project: &VssPath) -> Result<(), VssError> {
        self.run(&["Cp", project.as_str()], None).map(|_| ())
    }

    /// `Add` against the already-bound current project. Takes a filename
    /// relative to the working directory.
    fn add_bound(&self, local_file: &Path) -> Result<(), VssError> {
        let file_name = local_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                VssError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", local_file.display()),
                ))
            })?;
        self.run(&["Add", &file_name], local_file.parent())
            .map(|_| ())
    }
}

impl VssClient for SsExeClient {
    fn checkout(
        &self,
        project: &VssPath,
        local_dir: &Path,
        recursive: bool,
    ) -> Result<(), VssError> {
        let local = format!("-GL{}", local_dir.display());
        let mut args = vec!["Checkout", project.as_str(), local.as_str()];
        if recursive {
            args.push("-R");
        }
        self.run(&args, None).map(|_| ())
    }

    fn checkin(
        &self,
        project: &VssPath,
        local_dir: &Path,
        recursive: bool,
    ) -> Result<(), VssError> {
        let local = format!("-GL{}", local_dir.display());
        let mut args = vec!["Checkin", project.as_str(), local.as_str()];
        if recursive {
            args.push("-R");
        }
        self.run(&args, None).map(|_| ())
    }

    fn get(&self, project: &VssPath, local_dir: &Path, recursive: bool) -> Result<(), VssError> {
        let local = format!("-GL{}", local_dir.display());
        let mut args = vec!["Get", project.as_str(), local.as_str()];
        if recursive {
            args.push("-R");
        }
        self.run(&args, None).map(|_| ())
    }

    fn add(&self, local_file: &Path, into_project: &VssPath) -> Result<(), VssError> {
        self.set_current_project(into_project)?;
        self.add_bound(local_file)
    }

    fn add_all(&self, local_files: &[PathBuf], into_project: &VssPath) -> Result<(), VssError> {
        if local_files.is_empty() {
            return Ok(());
        }
        // One `Cp` round-trip covers the whole batch.
        self.set_current_project(into_project)?;
        for file in local_files {
            self.add_bound(file)?;
        }
        Ok(())
    }

    fn create(&self, project: &VssPath) -> Result<(), VssError> {
        match self.run(&["Create", project.as_str()], None) {
            Ok(_) => Ok(()),
            // Idempotent create: an existing project is not a failure.
            Err(VssError::Command { ref stderr, .. })
                if stderr.to_ascii_lowercase().contains("already exists") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn delete(&self, path: &VssPath) -> Result<(), VssError> {
        self.run(&["Delete", path.as_str()], None).map(|_| ())
    }

    fn undo_checkout(&self, project: &VssPath, recursive: bool) -> Result<(), VssError> {
        let mut args = vec!["Undocheckout", project.as_str()];
        if recursive {
            args.push("-R");
        }
        self.run(&args, None).map(|_| ())
    }
}
