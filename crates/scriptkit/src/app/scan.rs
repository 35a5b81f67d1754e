//! Directory scanning and file collection.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::domain::errors::CollectError;
use crate::domain::model::CollectedFile;

/// Compiled include/exclude patterns.
///
/// Patterns without a `/` are matched against the file name so `*.cs` applies at any depth;
/// patterns with a `/` are matched against the path relative to the scanned directory.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    includes: Option<PatternSet>,
    excludes: Option<PatternSet>,
}

impl PatternFilter {
    /// Compile the patterns. An empty include list matches every file.
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, CollectError> {
        Ok(Self {
            includes: PatternSet::build(includes)?,
            excludes: PatternSet::build(excludes)?,
        })
    }

    pub fn matches(&self, rel: &Path) -> bool {
        let included = self.includes.as_ref().is_none_or(|set| set.is_match(rel));
        let excluded = self.excludes.as_ref().is_some_and(|set| set.is_match(rel));
        included && !excluded
    }
}

#[derive(Debug, Clone)]
struct PatternSet {
    by_name: GlobSet,
    by_path: GlobSet,
}

impl PatternSet {
    fn build(patterns: &[String]) -> Result<Option<Self>, CollectError> {
        let mut by_name = GlobSetBuilder::new();
        let mut by_path = GlobSetBuilder::new();
        let mut count = 0;

        for raw in patterns {
            let pattern = raw.trim();
            if pattern.is_empty() {
                continue;
            }
            let invalid = |source| CollectError::InvalidGlob {
                pattern: pattern.to_owned(),
                source,
            };
            let anchored = pattern.trim_start_matches("./");
            let glob = GlobBuilder::new(anchored)
                .literal_separator(true)
                .build()
                .map_err(invalid)?;
            if anchored.contains('/') {
                by_path.add(glob);
            } else {
                by_name.add(glob);
            }
            count += 1;
        }

        if count == 0 {
            return Ok(None);
        }

        let to_error = |source| CollectError::InvalidGlob {
            pattern: patterns.join(", "),
            source,
        };
        Ok(Some(Self {
            by_name: by_name.build().map_err(to_error)?,
            by_path: by_path.build().map_err(to_error)?,
        }))
    }

    fn is_match(&self, rel: &Path) -> bool {
        rel.file_name()
            .is_some_and(|name| self.by_name.is_match(name))
            || self.by_path.is_match(rel)
    }
}

/// Walk options taken from the `[collect]` config section.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub include_hidden: bool,
    pub respect_gitignore: bool,
    pub max_file_size: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_hidden: false,
            respect_gitignore: true,
            max_file_size: 1024 * 1024,
        }
    }
}

/// Scanner resolving directories and explicit files into an ordered list of collected files.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, options: ScanOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    /// Resolve `path` against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Fail on the first directory that does not exist.
    pub fn check_directories(&self, directories: &[PathBuf]) -> Result<(), CollectError> {
        for dir in directories {
            let resolved = self.resolve(dir);
            if !resolved.is_dir() {
                return Err(CollectError::MissingDirectory(resolved));
            }
        }
        Ok(())
    }

    /// Recursively list files under each directory that pass `filter`.
    ///
    /// Directories are processed in the given order; files inside a directory are sorted by their
    /// project-relative path.
    pub fn scan(
        &self,
        directories: &[PathBuf],
        filter: &PatternFilter,
    ) -> Result<Vec<PathBuf>, CollectError> {
        self.check_directories(directories)?;

        let mut matched = Vec::new();
        for dir in directories {
            let dir = self.resolve(dir);
            let mut found = self.walk(&dir, filter)?;
            found.sort_by_cached_key(|path| self.display_path(path));
            tracing::debug!(dir = %dir.display(), count = found.len(), "scanned directory");
            matched.extend(found);
        }
        Ok(matched)
    }

    fn walk(&self, dir: &Path, filter: &PatternFilter) -> Result<Vec<PathBuf>, CollectError> {
        let respect = self.options.respect_gitignore;
        let mut builder = WalkBuilder::new(dir);
        builder
            .hidden(!self.options.include_hidden)
            .git_ignore(respect)
            .git_exclude(respect)
            .git_global(false)
            .ignore(respect)
            .parents(false)
            .require_git(false);

        if respect {
            let inherited = self.inherited_ignores(dir);
            if !inherited.is_empty() {
                builder.filter_entry(move |entry| {
                    let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
                    !inherited
                        .iter()
                        .map(|rules| rules.matched(entry.path(), is_dir))
                        .find(|matched| !matched.is_none())
                        .is_some_and(|matched| matched.is_ignore())
                });
            }
        }

        let mut found = Vec::new();
        for result in builder.build() {
            let entry = result.map_err(|source| CollectError::Walk {
                dir: dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                continue;
            }
            let path = entry.into_path();
            let rel = path.strip_prefix(dir).unwrap_or(&path);
            if filter.matches(rel) {
                found.push(path);
            }
        }
        Ok(found)
    }

    /// Ignore files between the project root and `dir`, nearest first.
    ///
    /// The walker itself only reads ignore files inside `dir`; rules above the project root never
    /// apply.
    fn inherited_ignores(&self, dir: &Path) -> Vec<Gitignore> {
        let Ok(rel) = dir.strip_prefix(&self.root) else {
            return Vec::new();
        };

        let mut ancestors = vec![self.root.clone()];
        let mut current = self.root.clone();
        for component in rel.components() {
            if let Component::Normal(part) = component {
                current.push(part);
                ancestors.push(current.clone());
            }
        }
        // `dir` reads its own ignore files during the walk.
        ancestors.pop();

        let mut rules = Vec::new();
        for ancestor in ancestors.iter().rev() {
            for name in [".ignore", ".gitignore"] {
                let file = ancestor.join(name);
                if file.is_file() {
                    let (gitignore, err) = Gitignore::new(&file);
                    if let Some(err) = err {
                        tracing::warn!(path = %file.display(), "ignore file partially parsed: {err}");
                    }
                    rules.push(gitignore);
                }
            }
        }

        let exclude = self.root.join(".git/info/exclude");
        if !ancestors.is_empty() && exclude.is_file() {
            let mut builder = GitignoreBuilder::new(&self.root);
            if let Some(err) = builder.add(&exclude) {
                tracing::warn!(path = %exclude.display(), "ignore file partially parsed: {err}");
            }
            match builder.build() {
                Ok(gitignore) => rules.push(gitignore),
                Err(err) => tracing::warn!(path = %exclude.display(), "ignore file skipped: {err}"),
            }
        }
        rules
    }

    /// Read the scanned paths followed by the explicit files, dropping duplicates.
    ///
    /// Scanned files that are too large or not UTF-8 are skipped; explicit files in that state
    /// are an error.
    pub fn read_all(
        &self,
        scanned: &[PathBuf],
        explicit: &[PathBuf],
    ) -> Result<Vec<CollectedFile>, CollectError> {
        let mut seen = HashSet::new();
        let mut collected = Vec::with_capacity(scanned.len() + explicit.len());

        for path in scanned {
            if !seen.insert(identity(path)) {
                continue;
            }
            match self.read_file(path)? {
                Ok(file) => collected.push(file),
                Err(reason) => tracing::warn!(path = %path.display(), "skipping {reason}"),
            }
        }

        for path in explicit {
            let resolved = self.resolve(path);
            if !resolved.exists() {
                return Err(CollectError::MissingFile(resolved));
            }
            if !resolved.is_file() {
                return Err(CollectError::NotAFile(resolved));
            }
            if !seen.insert(identity(&resolved)) {
                continue;
            }
            match self.read_file(&resolved)? {
                Ok(file) => collected.push(file),
                Err(reason) => {
                    return Err(CollectError::Unreadable {
                        path: resolved,
                        source: std::io::Error::new(std::io::ErrorKind::InvalidData, reason),
                    });
                }
            }
        }

        Ok(collected)
    }

    fn read_file(&self, path: &Path) -> Result<Result<CollectedFile, String>, CollectError> {
        let unreadable = |source| CollectError::Unreadable {
            path: path.to_path_buf(),
            source,
        };

        let size = fs::metadata(path).map_err(unreadable)?.len();
        if size > self.options.max_file_size {
            return Ok(Err(format!(
                "file larger than {} bytes",
                self.options.max_file_size
            )));
        }

        let bytes = fs::read(path).map_err(unreadable)?;
        let Ok(contents) = String::from_utf8(bytes) else {
            return Ok(Err("non UTF-8 file".to_owned()));
        };

        let display_path = self.display_path(path);
        tracing::debug!(path = %display_path, bytes = size, "collected file");
        Ok(Ok(CollectedFile {
            path: path.to_path_buf(),
            lines: contents.lines().count(),
            language: guess_language(path),
            display_path,
            contents,
        }))
    }

    /// Project-relative, `/`-separated path used in templates and ordering.
    pub fn display_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) => rel
                .components()
                .filter_map(|component| match component {
                    Component::Normal(part) => Some(part.to_string_lossy()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.display().to_string(),
        }
    }
}

fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn guess_language(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
