//! Configuration management utilities.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::model::{CollectionRequest, SubmoduleRequest};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".scriptkit/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub collect: CollectSettings,
    #[serde(default)]
    pub jobs: BTreeMap<String, CollectionRequest>,
    #[serde(default)]
    pub submodules: BTreeMap<String, SubmoduleRequest>,
}

/// Scanner and writer behaviour shared by every collection job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectSettings {
    #[serde(default)]
    include_hidden: Option<bool>,
    #[serde(default)]
    respect_gitignore: Option<bool>,
    #[serde(default)]
    max_file_size: Option<u64>,
    #[serde(default)]
    create_output_dir: Option<bool>,
    #[serde(default)]
    include_git_metadata: Option<bool>,
}

impl CollectSettings {
    fn default_max_file_size() -> u64 {
        1024 * 1024
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden.unwrap_or(false)
    }

    pub fn respect_gitignore(&self) -> bool {
        self.respect_gitignore.unwrap_or(true)
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
            .unwrap_or_else(Self::default_max_file_size)
    }

    pub fn create_output_dir(&self) -> bool {
        self.create_output_dir.unwrap_or(false)
    }

    pub fn include_git_metadata(&self) -> bool {
        self.include_git_metadata.unwrap_or(false)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    create_output_dir: Option<bool>,
    include_hidden: Option<bool>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            create_output_dir: env::var("SCRIPTKIT_CREATE_OUTPUT_DIR")
                .ok()
                .and_then(|value| parse_bool(&value)),
            include_hidden: env::var("SCRIPTKIT_INCLUDE_HIDDEN")
                .ok()
                .and_then(|value| parse_bool(&value)),
        }
    }

    #[cfg(test)]
    fn for_tests(create_output_dir: bool, include_hidden: bool) -> Self {
        Self {
            create_output_dir: Some(create_output_dir),
            include_hidden: Some(include_hidden),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration for the project at `root` from defaults, user config, workspace
    /// config, and env overrides.
    pub fn load(root: &Path) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH));
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading user config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data).with_context(|| format!("in config file {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        let mut jobs = self.jobs;
        jobs.extend(other.jobs);
        let mut submodules = self.submodules;
        submodules.extend(other.submodules);

        Self {
            collect: merge_collect(self.collect, other.collect),
            jobs,
            submodules,
        }
    }

    /// Look up a named collection job.
    pub fn job(&self, name: &str) -> Option<&CollectionRequest> {
        self.jobs.get(name)
    }

    /// Look up a named submodule.
    pub fn submodule(&self, name: &str) -> Option<&SubmoduleRequest> {
        self.submodules.get(name)
    }
}

fn merge_collect(mut base: CollectSettings, overlay: CollectSettings) -> CollectSettings {
    if let Some(value) = overlay.include_hidden {
        base.include_hidden = Some(value);
    }
    if let Some(value) = overlay.respect_gitignore {
        base.respect_gitignore = Some(value);
    }
    if let Some(value) = overlay.max_file_size {
        base.max_file_size = Some(value);
    }
    if let Some(value) = overlay.create_output_dir {
        base.create_output_dir = Some(value);
    }
    if let Some(value) = overlay.include_git_metadata {
        base.include_git_metadata = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("scriptkit/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(value) = env.create_output_dir {
        config.collect.create_output_dir = Some(value);
    }
    if let Some(value) = env.include_hidden {
        config.collect.include_hidden = Some(value);
    }
    config
}
