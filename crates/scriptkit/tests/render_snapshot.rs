use std::fs;
use std::path::{Path, PathBuf};

use insta::assert_snapshot;
use scriptkit::app::collect::{CollectOptions, Collector};
use scriptkit::app::tokens::TokenEstimator;
use scriptkit::domain::model::CollectionRequest;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn develop_together_prompt_renders() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("TruchetTiles");
    fs::create_dir_all(root.join("Runtime")).unwrap();
    fs::write(root.join("Runtime/Grid.cs"), "public class Grid {}\n").unwrap();
    fs::write(root.join("Runtime/README.md"), "# Runtime\nNotes\n").unwrap();
    fs::write(root.join("Runtime/build.log"), "noise\n").unwrap();

    let mut request = CollectionRequest {
        directories: vec![PathBuf::from("Runtime")],
        includes: vec!["*.cs".into(), "*.md".into()],
        template_path: fixture("develop_together.txt"),
        output_path: PathBuf::from("prompt.txt"),
        ..CollectionRequest::default()
    };
    request
        .template_vars
        .insert("goal".into(), serde_json::Value::String("port to Rust".into()));

    let collector = Collector::with_estimator(
        &root,
        CollectOptions::default(),
        TokenEstimator::heuristic(),
    );
    let report = collector.run(&request).unwrap();
    let rendered = fs::read_to_string(root.join("prompt.txt")).unwrap();

    assert_eq!(report.rendered, rendered);
    assert_snapshot!("develop_together_prompt", rendered.trim_end());
}
