//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of a collect-and-render run.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("template not found: {}", .0.display())]
    MissingTemplate(PathBuf),
    #[error("explicitly listed file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("explicitly listed path is not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("invalid glob pattern '{pattern}'")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("template variable '{0}' shadows a built-in template value")]
    ReservedVariable(String),
    #[error("invalid template {}", path.display())]
    TemplateSyntax {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },
    #[error("failed to render template {}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },
    #[error("failed to walk {}", dir.display())]
    Walk {
        dir: PathBuf,
        #[source]
        source: ignore::Error,
    },
    #[error("failed to read {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output to {}", path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while invoking the git executable.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to execute git (is git installed?)")]
    Unavailable(#[source] io::Error),
    #[error("git {command} failed (exit code {exit_code}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },
}

/// Failures of submodule registration.
#[derive(Debug, Error)]
pub enum SubmoduleError {
    #[error("invalid submodule request: {0}")]
    InvalidRequest(String),
    #[error("{} is not inside a git repository", .0.display())]
    NotARepository(PathBuf),
    #[error("'{path}' is already registered as a submodule of {existing_url} (requested {requested_url})")]
    Conflict {
        path: String,
        existing_url: String,
        requested_url: String,
    },
    #[error(transparent)]
    Git(#[from] GitError),
}
