//! Prompt template loading and rendering.
//!
//! Templates are minijinja sources. Besides the user supplied variables (available both at top
//! level and under `vars`), every template sees:
//!
//! - `files`: list of `{ path, display_path, language, contents, lines }`
//! - `context`: all files concatenated as `// File: <display_path>` blocks
//! - `file_count`
//! - `project`: `{ root, name, branch, commit }`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::domain::errors::CollectError;
use crate::domain::model::CollectedFile;

const TEMPLATE_NAME: &str = "prompt";

/// Names the renderer fills in itself.
pub const RESERVED_NAMES: &[&str] = &["files", "context", "file_count", "project", "vars"];

/// Project information exposed to templates as `project`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectInfo {
    pub root: String,
    pub name: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
}

/// A template file loaded from disk and checked for syntax errors.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    path: PathBuf,
    source: String,
}

impl PromptTemplate {
    pub fn load(path: &Path) -> Result<Self, CollectError> {
        if !path.is_file() {
            return Err(CollectError::MissingTemplate(path.to_path_buf()));
        }
        let source = fs::read_to_string(path).map_err(|source| CollectError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(path, source)
    }

    pub fn from_source(path: &Path, source: String) -> Result<Self, CollectError> {
        let template = Self {
            path: path.to_path_buf(),
            source,
        };
        template.environment()?;
        Ok(template)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render with `vars` under the provided names. `vars` are expected to have passed
    /// [`check_reserved`]; the provided values win on a clash.
    pub fn render(
        &self,
        vars: &BTreeMap<String, Value>,
        files: &[CollectedFile],
        project: &ProjectInfo,
    ) -> Result<String, CollectError> {
        let context = build_context(vars, files, project);
        let env = self.environment()?;
        let template = env
            .get_template(TEMPLATE_NAME)
            .map_err(|source| self.syntax_error(source))?;
        template
            .render(&context)
            .map_err(|source| CollectError::Render {
                path: self.path.clone(),
                source,
            })
    }

    fn environment(&self) -> Result<Environment<'_>, CollectError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(TEMPLATE_NAME, &self.source)
            .map_err(|source| self.syntax_error(source))?;
        Ok(env)
    }

    fn syntax_error(&self, source: minijinja::Error) -> CollectError {
        CollectError::TemplateSyntax {
            path: self.path.clone(),
            source,
        }
    }
}

/// Reject variables that would shadow the values the renderer provides.
pub fn check_reserved(vars: &BTreeMap<String, Value>) -> Result<(), CollectError> {
    match vars.keys().find(|name| RESERVED_NAMES.contains(&name.as_str())) {
        Some(name) => Err(CollectError::ReservedVariable(name.clone())),
        None => Ok(()),
    }
}

/// Concatenate files into one block per file, separated by blank lines.
pub fn concat_files(files: &[CollectedFile]) -> String {
    let blocks: Vec<String> = files
        .iter()
        .map(|file| {
            let mut block = format!("// File: {}\n{}", file.display_path, file.contents);
            if !block.ends_with('\n') {
                block.push('\n');
            }
            block
        })
        .collect();
    blocks.join("\n")
}

fn build_context(
    vars: &BTreeMap<String, Value>,
    files: &[CollectedFile],
    project: &ProjectInfo,
) -> Value {
    let mut context = Map::new();
    for (name, value) in vars {
        context.insert(name.clone(), value.clone());
    }

    let listed: Vec<Value> = files
        .iter()
        .map(|file| {
            json!({
                "path": file.path.display().to_string(),
                "display_path": file.display_path,
                "language": file.language,
                "contents": file.contents,
                "lines": file.lines,
            })
        })
        .collect();

    context.insert(
        "vars".into(),
        Value::Object(vars.clone().into_iter().collect()),
    );
    context.insert("files".into(), Value::Array(listed));
    context.insert("context".into(), Value::String(concat_files(files)));
    context.insert("file_count".into(), json!(files.len()));
    context.insert("project".into(), json!(project));
    Value::Object(context)
}
