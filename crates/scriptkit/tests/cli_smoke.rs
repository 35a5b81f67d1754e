use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn scriptkit() -> Command {
    let mut cmd = Command::cargo_bin("scriptkit").expect("binary exists");
    cmd.env_remove("SCRIPTKIT_ROOT").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_displays_usage() {
    scriptkit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("collect"))
        .stdout(predicate::str::contains("submodule"));
}

#[test]
fn collect_writes_rendered_prompt() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("docs/guide.md"), "# Guide\n").unwrap();
    fs::write(root.join("docs/skip.txt"), "skip\n").unwrap();
    fs::write(root.join("prompt.tmpl"), "Audience: {{ audience }}\n{{ context }}").unwrap();

    scriptkit()
        .arg("--root")
        .arg(root)
        .args([
            "collect",
            "-d",
            "docs",
            "-i",
            "*.md",
            "-t",
            "prompt.tmpl",
            "--var",
            "audience=reviewers",
            "-o",
            "prompt.txt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    let written = fs::read_to_string(root.join("prompt.txt")).unwrap();
    assert_eq!(written, "Audience: reviewers\n// File: docs/guide.md\n# Guide\n");
}

#[test]
fn collect_dry_run_lists_files_without_writing() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("a.rs"), "fn a() {}\n").unwrap();
    fs::write(root.join("t.txt"), "{{ file_count }}").unwrap();

    scriptkit()
        .arg("--root")
        .arg(root)
        .args(["collect", "-d", ".", "-i", "*.rs", "-t", "t.txt", "-o", "o.txt"])
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("a.rs"))
        .stdout(predicate::str::contains("dry run"));

    assert!(!root.join("o.txt").exists());
}

#[test]
fn collect_fails_on_missing_template() {
    let temp = tempfile::tempdir().unwrap();

    scriptkit()
        .arg("--root")
        .arg(temp.path())
        .args(["collect", "-t", "nope.txt", "-o", "out.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template not found"));

    assert!(!temp.path().join("out.txt").exists());
}

#[test]
fn jobs_lists_builtin_job() {
    let temp = tempfile::tempdir().unwrap();

    scriptkit()
        .arg("--root")
        .arg(temp.path())
        .arg("jobs")
        .assert()
        .success()
        .stdout(predicate::str::contains("truchet-port"));
}

#[test]
fn completions_are_generated() {
    scriptkit()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scriptkit"));
}

#[test]
fn collect_json_reports_the_run() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("a.rs"), "fn a() {}\n").unwrap();
    fs::write(root.join("t.txt"), "{{ context }}").unwrap();

    let output = scriptkit()
        .arg("--root")
        .arg(root)
        .args(["collect", "-d", ".", "-i", "*.rs", "-t", "t.txt", "-o", "o.txt", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files"], serde_json::json!(["a.rs"]));
    assert_eq!(report["changed"], serde_json::json!(true));
    assert_eq!(report["dry_run"], serde_json::json!(false));
    assert!(report["tokens"].as_u64().is_some_and(|tokens| tokens > 0));
    assert!(report.get("rendered").is_none());
}

#[test]
fn collect_runs_a_workspace_job() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join(".scriptkit")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("docs/guide.md"), "# Guide\n").unwrap();
    fs::write(root.join("docs/notes.txt"), "notes\n").unwrap();
    fs::write(root.join("job.tmpl"), "{{ goal }}: {{ file_count }}").unwrap();
    fs::write(
        root.join(".scriptkit/config.toml"),
        "[jobs.docs-job]\n\
         directories = [\"docs\"]\n\
         includes = [\"*.md\"]\n\
         template = \"job.tmpl\"\n\
         output = \"docs-prompt.txt\"\n\
         vars = { goal = \"review\" }\n",
    )
    .unwrap();

    scriptkit()
        .arg("--root")
        .arg(root)
        .args(["collect", "docs-job"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docs-prompt.txt"));

    let written = fs::read_to_string(root.join("docs-prompt.txt")).unwrap();
    assert_eq!(written, "review: 1");

    scriptkit()
        .arg("--root")
        .arg(root)
        .args(["collect", "no-such-job"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no job named 'no-such-job'"));
}

fn git_init(path: &std::path::Path) -> bool {
    std::process::Command::new("git")
        .current_dir(path)
        .args(["init", "-q"])
        .status()
        .is_ok_and(|status| status.success())
}

#[test]
fn submodule_add_resolves_a_configured_name() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    if !git_init(root) {
        return;
    }
    fs::create_dir_all(root.join(".scriptkit")).unwrap();
    fs::write(
        root.join(".scriptkit/config.toml"),
        "[submodules.convention]\n\
         url = \"https://example.com/convention.git\"\n\
         path = \"vendor/convention\"\n",
    )
    .unwrap();
    fs::write(
        root.join(".gitmodules"),
        "[submodule \"vendor/convention\"]\n\
         \tpath = vendor/convention\n\
         \turl = https://example.com/convention.git\n",
    )
    .unwrap();

    scriptkit()
        .arg("--root")
        .arg(root)
        .args(["submodule", "add", "convention"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already registered at vendor/convention"));

    scriptkit()
        .arg("--root")
        .arg(root)
        .args(["submodule", "add", "unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no submodule named 'unknown'"));
}

#[test]
fn submodule_commands_use_the_enclosing_work_tree() {
    let temp = tempfile::tempdir().unwrap();
    let repo = temp.path();
    if !git_init(repo) {
        return;
    }
    fs::create_dir_all(repo.join("sub")).unwrap();
    fs::write(
        repo.join(".gitmodules"),
        "[submodule \"CodingConvention\"]\n\
         \tpath = CodingConvention\n\
         \turl = https://github.com/cholushkin/coding-convention.git\n",
    )
    .unwrap();

    scriptkit()
        .arg("--root")
        .arg(repo.join("sub"))
        .args([
            "submodule",
            "add",
            "https://github.com/cholushkin/coding-convention.git",
            "CodingConvention",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("already registered"));

    scriptkit()
        .arg("--root")
        .arg(repo.join("sub"))
        .args(["submodule", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CodingConvention"));
}
