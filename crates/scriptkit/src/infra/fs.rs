//! Filesystem helpers for writing generated artifacts.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::errors::CollectError;

/// Atomically replace `path` with `contents`.
///
/// Returns `false` without touching the file when it already holds identical bytes. The parent
/// directory is only created when `create_parent` is set.
pub fn write_if_changed(
    path: &Path,
    contents: &[u8],
    create_parent: bool,
) -> Result<bool, CollectError> {
    let unwritable = |source: io::Error| CollectError::Unwritable {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    if !parent.is_dir() {
        if !create_parent {
            return Err(unwritable(io::Error::new(
                io::ErrorKind::NotFound,
                format!("output directory {} does not exist", parent.display()),
            )));
        }
        fs::create_dir_all(parent).map_err(unwritable)?;
    }

    if let Ok(existing) = fs::read(path)
        && existing == contents
    {
        return Ok(false);
    }

    let mut staged = NamedTempFile::new_in(parent).map_err(unwritable)?;
    staged.write_all(contents).map_err(unwritable)?;
    staged.flush().map_err(unwritable)?;
    staged
        .persist(path)
        .map_err(|err| unwritable(err.error))?;
    Ok(true)
}
