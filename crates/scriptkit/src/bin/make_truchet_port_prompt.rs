//! Builds the "develop together" prompt for porting the Truchet tiles runtime.

use std::path::PathBuf;

use scriptkit::app::collect::{CollectOptions, Collector};
use scriptkit::domain::model::CollectionRequest;
use scriptkit::infra::config::Config;

fn main() -> anyhow::Result<()> {
    scriptkit::init(1);

    let root = scriptkit::project_root(None)?;
    let config = Config::load(&root)?;

    let request = CollectionRequest {
        directories: vec![PathBuf::from("Unity/TruchetTiles/Assets/Core/Runtime")],
        includes: vec!["*.cs".into(), "*.md".into()],
        excludes: Vec::new(),
        files: Vec::new(),
        template_path: PathBuf::from("UserScriptsCoding/TextTemplates/DevelopTogetherTemplate.txt"),
        template_vars: Default::default(),
        output_path: PathBuf::from("UserScriptsCoding/Outputs/PromptPortTruchetTiles.txt"),
    };

    let report = Collector::new(root, CollectOptions::from_settings(&config.collect)).run(&request)?;
    println!(
        "{} files -> {} (~{} tokens)",
        report.files.len(),
        report.output_path.display(),
        report.tokens
    );
    Ok(())
}
