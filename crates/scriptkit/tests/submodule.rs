use std::fs;
use std::path::Path;
use std::process::Command;

use scriptkit::app::submodule::{SubmoduleOutcome, SubmoduleRegistrar};
use scriptkit::domain::errors::SubmoduleError;
use scriptkit::domain::model::SubmoduleRequest;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

fn git(cwd: &Path, args: &[&str]) {
    let status = Command::new("git")
        .current_dir(cwd)
        .args(["-c", "user.name=scriptkit", "-c", "user.email=scriptkit@example.com"])
        .args(args)
        .status()
        .expect("spawn git");
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo(path: &Path) {
    fs::create_dir_all(path).unwrap();
    git(path, &["init", "-q"]);
}

const GITMODULES: &str = "[submodule \"CodingConvention\"]\n\
\tpath = CodingConvention\n\
\turl = https://github.com/cholushkin/coding-convention.git\n";

#[test]
fn same_url_at_same_path_is_a_noop() {
    if !git_available() {
        return;
    }
    let temp = tempfile::tempdir().unwrap();
    init_repo(temp.path());
    fs::write(temp.path().join(".gitmodules"), GITMODULES).unwrap();

    let outcome = SubmoduleRegistrar::new(temp.path())
        .add(&SubmoduleRequest::new(
            "https://github.com/cholushkin/coding-convention.git",
            "CodingConvention",
        ))
        .unwrap();

    assert_eq!(outcome, SubmoduleOutcome::AlreadyRegistered);
}

#[test]
fn different_url_at_registered_path_conflicts() {
    if !git_available() {
        return;
    }
    let temp = tempfile::tempdir().unwrap();
    init_repo(temp.path());
    fs::write(temp.path().join(".gitmodules"), GITMODULES).unwrap();

    let err = SubmoduleRegistrar::new(temp.path())
        .add(&SubmoduleRequest::new(
            "https://example.com/fork.git",
            "CodingConvention",
        ))
        .unwrap_err();

    assert!(matches!(err, SubmoduleError::Conflict { .. }));
}

#[test]
fn adds_local_repository_as_submodule() {
    if !git_available() {
        return;
    }
    let temp = tempfile::tempdir().unwrap();
    let remote = temp.path().join("remote");
    init_repo(&remote);
    fs::write(remote.join("README.md"), "conventions\n").unwrap();
    git(&remote, &["add", "README.md"]);
    git(&remote, &["commit", "-q", "-m", "init"]);

    let project = temp.path().join("project");
    init_repo(&project);

    let registrar = SubmoduleRegistrar::new(&project)
        .with_config_override("protocol.file.allow", "always");
    let url = remote.to_string_lossy().into_owned();
    let request = SubmoduleRequest::new(url.clone(), "CodingConvention");

    assert_eq!(registrar.add(&request).unwrap(), SubmoduleOutcome::Added);
    assert!(project.join("CodingConvention/README.md").is_file());

    let listed = registrar.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].path, "CodingConvention");
    assert_eq!(listed[0].url, url);

    assert_eq!(
        registrar.add(&request).unwrap(),
        SubmoduleOutcome::AlreadyRegistered
    );
}

#[test]
fn discover_outside_repository_fails() {
    let temp = tempfile::tempdir().unwrap();
    match SubmoduleRegistrar::discover(temp.path()) {
        Err(SubmoduleError::NotARepository(_)) => {}
        // The temp directory lives inside a repository on this machine.
        Ok(_) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
}
