//! Registering remote repositories as git submodules.

use std::path::{Component, Path, PathBuf};

use crate::domain::errors::{GitError, SubmoduleError};
use crate::domain::model::SubmoduleRequest;
use crate::infra::git::{self, run_git};

const GITMODULES: &str = ".gitmodules";

/// Result of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmoduleOutcome {
    Added,
    AlreadyRegistered,
}

/// A submodule entry read from `.gitmodules`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisteredSubmodule {
    pub name: String,
    pub path: String,
    pub url: String,
}

/// Adds submodules to the repository at `root` by driving the git executable.
#[derive(Debug, Clone)]
pub struct SubmoduleRegistrar {
    root: PathBuf,
    config_overrides: Vec<(String, String)>,
}

impl SubmoduleRegistrar {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_overrides: Vec::new(),
        }
    }

    /// Locate the repository containing `start`.
    pub fn discover(start: &Path) -> Result<Self, SubmoduleError> {
        git::repo_root_for_path(start)
            .map(Self::new)
            .ok_or_else(|| SubmoduleError::NotARepository(start.to_path_buf()))
    }

    /// Pass `-c key=value` to every git invocation.
    pub fn with_config_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_overrides.push((key.into(), value.into()));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register `request.url` at `request.path`.
    ///
    /// Re-registering the same URL at the same path is a no-op; a different URL at an already
    /// registered path is a conflict. Everything else is left to `git submodule add`.
    pub fn add(&self, request: &SubmoduleRequest) -> Result<SubmoduleOutcome, SubmoduleError> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(SubmoduleError::InvalidRequest("url is empty".into()));
        }
        let path = normalize_path(&request.path)?;
        self.ensure_repository()?;

        if let Some(existing) = self.list()?.into_iter().find(|entry| entry.path == path) {
            if existing.url == url {
                tracing::info!(%path, %url, "submodule already registered");
                return Ok(SubmoduleOutcome::AlreadyRegistered);
            }
            return Err(SubmoduleError::Conflict {
                path,
                existing_url: existing.url,
                requested_url: url.to_owned(),
            });
        }

        tracing::info!(%path, %url, "adding submodule");
        run_git(
            &self.root,
            &self.config_overrides,
            &["submodule", "add", "--", url, path.as_str()],
        )?;
        Ok(SubmoduleOutcome::Added)
    }

    /// Submodules recorded in `.gitmodules`, in file order.
    pub fn list(&self) -> Result<Vec<RegisteredSubmodule>, SubmoduleError> {
        if !self.root.join(GITMODULES).is_file() {
            return Ok(Vec::new());
        }

        let output = match run_git(
            &self.root,
            &self.config_overrides,
            &[
                "config",
                "--file",
                GITMODULES,
                "--get-regexp",
                r"^submodule\..*\.(path|url)$",
            ],
        ) {
            Ok(output) => output,
            // `git config --get-regexp` exits with 1 when nothing matches.
            Err(GitError::CommandFailed { exit_code: 1, .. }) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        Ok(parse_gitmodules_listing(&output.stdout))
    }

    fn ensure_repository(&self) -> Result<(), SubmoduleError> {
        if self.root.join(".git").exists() {
            Ok(())
        } else {
            Err(SubmoduleError::NotARepository(self.root.clone()))
        }
    }
}

/// Parse `submodule.<name>.<key> <value>` lines into entries.
fn parse_gitmodules_listing(listing: &str) -> Vec<RegisteredSubmodule> {
    let mut entries: Vec<RegisteredSubmodule> = Vec::new();
    for line in listing.lines() {
        let Some((key, value)) = line.trim().split_once(char::is_whitespace) else {
            continue;
        };
        let Some((name, field)) = key
            .strip_prefix("submodule.")
            .and_then(|rest| rest.rsplit_once('.'))
        else {
            continue;
        };

        let index = match entries.iter().position(|entry| entry.name == name) {
            Some(index) => index,
            None => {
                entries.push(RegisteredSubmodule {
                    name: name.to_owned(),
                    ..RegisteredSubmodule::default()
                });
                entries.len() - 1
            }
        };
        let value = value.trim();
        match field {
            "path" => entries[index].path = value.trim_end_matches('/').to_owned(),
            "url" => entries[index].url = value.to_owned(),
            _ => {}
        }
    }
    entries
}

/// Validate a submodule path and render it with `/` separators.
fn normalize_path(path: &Path) -> Result<String, SubmoduleError> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(SubmoduleError::InvalidRequest(format!(
                    "path '{}' must be relative to the repository root",
                    path.display()
                )));
            }
        }
    }
    if parts.is_empty() {
        return Err(SubmoduleError::InvalidRequest("path is empty".into()));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn parses_listing_with_dotted_names() {
        let listing = "submodule.CodingConvention.path CodingConvention\n\
                       submodule.CodingConvention.url https://github.com/cholushkin/coding-convention.git\n\
                       submodule.libs.core.path libs/core/\n\
                       submodule.libs.core.url ../core.git\n";
        let entries = parse_gitmodules_listing(listing);
        assert_eq!(
            entries,
            vec![
                RegisteredSubmodule {
                    name: "CodingConvention".into(),
                    path: "CodingConvention".into(),
                    url: "https://github.com/cholushkin/coding-convention.git".into(),
                },
                RegisteredSubmodule {
                    name: "libs.core".into(),
                    path: "libs/core".into(),
                    url: "../core.git".into(),
                },
            ]
        );
    }

    #[test]
    fn rejects_paths_outside_the_repository() {
        assert!(normalize_path(Path::new("../elsewhere")).is_err());
        assert!(normalize_path(Path::new("/abs/path")).is_err());
        assert!(normalize_path(Path::new("")).is_err());
        assert_eq!(
            normalize_path(Path::new("./vendor/lib")).expect("valid"),
            "vendor/lib"
        );
    }

    #[test]
    fn requires_a_repository() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let err = SubmoduleRegistrar::new(temp.path())
            .add(&SubmoduleRequest::new("https://example.com/x.git", "x"))
            .unwrap_err();
        assert!(matches!(err, SubmoduleError::NotARepository(_)));
        Ok(())
    }

    #[test]
    fn rejects_empty_url() {
        let err = SubmoduleRegistrar::new(".")
            .add(&SubmoduleRequest::new("  ", "x"))
            .unwrap_err();
        assert!(matches!(err, SubmoduleError::InvalidRequest(_)));
    }
}
