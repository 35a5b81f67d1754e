pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub fn init(verbosity: u8) {
    infra::logging::init(verbosity);
}

/// Resolve the project root: `explicit`, then `SCRIPTKIT_ROOT`, then the enclosing git work
/// tree, then the current directory.
pub fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let configured = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os("SCRIPTKIT_ROOT").map(PathBuf::from));
    if let Some(root) = configured {
        return fs::canonicalize(&root)
            .with_context(|| format!("project root {} does not exist", root.display()));
    }

    let cwd = env::current_dir().context("unable to determine working directory")?;
    Ok(infra::git::repo_root_for_path(&cwd).unwrap_or(cwd))
}
