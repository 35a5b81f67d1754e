//! Git integration utilities.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::Result;
use serde::Serialize;

use crate::domain::errors::GitError;

/// Lightweight wrapper around [`gix::Repository`] discovery for metadata extraction.
#[derive(Default)]
pub struct GitClient {
    repo: Option<gix::Repository>,
}

impl GitClient {
    /// Attempt to locate a git repository starting from `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = gix::discover(path).ok();
        Ok(Self { repo })
    }

    /// Working tree root of the discovered repository.
    pub fn root(&self) -> Option<PathBuf> {
        let repo = self.repo.as_ref()?;
        repo.work_dir()
            .map(Path::to_path_buf)
            .or_else(|| repo.path().parent().map(Path::to_path_buf))
    }

    /// Retrieve repository metadata if discovery succeeded.
    pub fn metadata(&self) -> Option<GitMetadata> {
        let repo = self.repo.as_ref()?;
        let branch = repo
            .head_name()
            .ok()
            .flatten()
            .map(|name| name.shorten().to_string());

        let commit = repo.head_id().ok().map(|id| id.detach().to_string());

        Some(GitMetadata {
            branch,
            commit,
            root: self.root()?,
        })
    }
}

/// Basic information about the repository used in prompt templates.
#[derive(Debug, Clone, Serialize)]
pub struct GitMetadata {
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub root: PathBuf,
}

/// Convenience helper to retrieve metadata directly from a path.
pub fn metadata_for_path(path: &Path) -> Option<GitMetadata> {
    GitClient::discover(path)
        .ok()
        .and_then(|client| client.metadata())
}

/// Working tree root of the repository containing `path`, if any.
pub fn repo_root_for_path(path: &Path) -> Option<PathBuf> {
    GitClient::discover(path).ok().and_then(|client| client.root())
}

/// Captured output of a successful git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Run `git` with `args` in `cwd`, preceded by `-c key=value` for each override.
pub fn run_git(
    cwd: &Path,
    config_overrides: &[(String, String)],
    args: &[&str],
) -> Result<GitOutput, GitError> {
    let mut command = Command::new("git");
    command.current_dir(cwd);
    for (key, value) in config_overrides {
        command.arg("-c").arg(format!("{key}={value}"));
    }
    command.args(args);

    tracing::debug!(cwd = %cwd.display(), ?args, "running git");
    let output = command.output().map_err(GitError::Unavailable)?;
    let captured = GitOutput::from_output(&output);

    if output.status.success() {
        return Ok(captured);
    }

    let stderr = if captured.stderr.is_empty() {
        captured.stdout
    } else {
        captured.stderr
    };
    Err(GitError::CommandFailed {
        command: args.first().copied().unwrap_or_default().to_string(),
        exit_code: output.status.code().unwrap_or(-1),
        stderr,
    })
}
