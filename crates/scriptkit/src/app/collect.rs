//! Collect-and-render runs: configure, scan, read, render, write.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::app::render::{ProjectInfo, PromptTemplate, check_reserved};
use crate::app::scan::{PatternFilter, ScanOptions, Scanner};
use crate::app::tokens::TokenEstimator;
use crate::domain::errors::CollectError;
use crate::domain::model::CollectionRequest;
use crate::infra::config::CollectSettings;
use crate::infra::fs::write_if_changed;
use crate::infra::git;

/// Runtime options controlling a collection run.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub scan: ScanOptions,
    pub create_output_dir: bool,
    pub include_git_metadata: bool,
    pub dry_run: bool,
}

impl CollectOptions {
    /// Build options from the `[collect]` config section.
    pub fn from_settings(settings: &CollectSettings) -> Self {
        Self {
            scan: ScanOptions {
                include_hidden: settings.include_hidden(),
                respect_gitignore: settings.respect_gitignore(),
                max_file_size: settings.max_file_size(),
            },
            create_output_dir: settings.create_output_dir(),
            include_git_metadata: settings.include_git_metadata(),
            dry_run: false,
        }
    }
}

/// Outcome of a collection run.
#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    pub output_path: PathBuf,
    pub files: Vec<String>,
    pub bytes: usize,
    pub tokens: usize,
    pub changed: bool,
    pub dry_run: bool,
    #[serde(skip)]
    pub rendered: String,
}

/// Runs collection requests against a project root.
pub struct Collector {
    root: PathBuf,
    options: CollectOptions,
    estimator: TokenEstimator,
}

impl Collector {
    pub fn new(root: impl Into<PathBuf>, options: CollectOptions) -> Self {
        Self::with_estimator(root, options, TokenEstimator::new())
    }

    pub fn with_estimator(
        root: impl Into<PathBuf>,
        options: CollectOptions,
        estimator: TokenEstimator,
    ) -> Self {
        Self {
            root: root.into(),
            options,
            estimator,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Execute a request end to end.
    ///
    /// Every input is validated before the output path is touched; a failure anywhere aborts
    /// the run without partial output.
    pub fn run(&self, request: &CollectionRequest) -> Result<CollectReport, CollectError> {
        let scanner = Scanner::new(&self.root, self.options.scan.clone());

        let template = PromptTemplate::load(&scanner.resolve(&request.template_path))?;
        check_reserved(&request.template_vars)?;
        let filter = PatternFilter::new(&request.includes, &request.excludes)?;

        let scanned = scanner.scan(&request.directories, &filter)?;
        let files = scanner.read_all(&scanned, &request.files)?;
        tracing::info!(
            template = %template.path().display(),
            files = files.len(),
            "collected prompt context"
        );

        let rendered = template.render(&request.template_vars, &files, &self.project_info())?;
        let tokens = self.estimator.estimate(&rendered);
        let output_path = scanner.resolve(&request.output_path);

        let changed = if self.options.dry_run {
            false
        } else {
            write_if_changed(
                &output_path,
                rendered.as_bytes(),
                self.options.create_output_dir,
            )?
        };

        if changed {
            tracing::info!(output = %output_path.display(), tokens, "wrote prompt");
        } else if !self.options.dry_run {
            tracing::info!(output = %output_path.display(), "prompt unchanged");
        }

        Ok(CollectReport {
            output_path,
            files: files.into_iter().map(|file| file.display_path).collect(),
            bytes: rendered.len(),
            tokens,
            changed,
            dry_run: self.options.dry_run,
            rendered,
        })
    }

    fn project_info(&self) -> ProjectInfo {
        let mut info = ProjectInfo {
            root: self.root.display().to_string(),
            name: self
                .root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            branch: None,
            commit: None,
        };
        if self.options.include_git_metadata
            && let Some(metadata) = git::metadata_for_path(&self.root)
        {
            info.branch = metadata.branch;
            info.commit = metadata.commit;
        }
        info
    }
}
