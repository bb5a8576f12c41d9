#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TURING: &str = r#"@article{turing1936,
    author = {Turing, Alan M.},
    title = {On Computable Numbers, with an Application to the Entscheidungsproblem},
    journal = {Proceedings of the London Mathematical Society},
    year = 1936
}
"#;

const LIBRARY: &str = r#"
@book{knuth1968, author = {Knuth, Donald E.}, title = {The Art of Computer Programming}, year = 1968}
@article{shannon1948, author = {Shannon, Claude}, title = {A Mathematical Theory of Communication}, year = 1948}
"#;

struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    fn pubsdir(&self) -> PathBuf {
        self.temp.path().join("pubs")
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("pubs"));
        cmd.env("PUBS_DIR", self.pubsdir())
            .env("PUBS_CONFIG", self.temp.path().join("pubs.toml"))
            .env_remove("PUBS_LOG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn initialized() -> Self {
        let env = Self::new();
        env.cmd().arg("init").assert().success();
        env
    }
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_init_creates_layout_and_config() {
    let env = Env::new();
    env.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized pubs repository"));

    for sub in ["bib", "meta", "doc", "notes"] {
        assert!(env.pubsdir().join(sub).is_dir());
    }
    assert!(env.temp.path().join("pubs.toml").exists());

    env.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_require_init() {
    let env = Env::new();
    env.cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("pubs init"));
}

#[test]
fn test_add_from_file_and_list() {
    let env = Env::initialized();
    let bib = env.file("turing.bib", TURING);

    env.cmd()
        .args(["add", path_arg(&bib), "-t", "computability"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added paper [turing1936]"));

    assert!(env.pubsdir().join("bib/turing1936.bib").exists());
    assert!(env.pubsdir().join("meta/turing1936.yaml").exists());

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("[turing1936]"))
        .stdout(predicate::str::contains("Turing (1936)"))
        .stdout(predicate::str::contains("#computability"));
}

#[test]
fn test_add_from_stdin_suffixes_duplicates() {
    let env = Env::initialized();
    env.cmd()
        .arg("add")
        .write_stdin(TURING)
        .assert()
        .success();
    env.cmd()
        .args(["add", "-"])
        .write_stdin(TURING)
        .assert()
        .success()
        .stdout(predicate::str::contains("[turing1936a]"));
}

#[test]
fn test_add_explicit_citekey_collision_fails() {
    let env = Env::initialized();
    env.cmd()
        .args(["add", "-k", "tm"])
        .write_stdin(TURING)
        .assert()
        .success();
    env.cmd()
        .args(["add", "-k", "tm"])
        .write_stdin(TURING)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Citekey already in use: tm"));
}

#[test]
fn test_import_and_filter() {
    let env = Env::initialized();
    let library = env.file("library.bib", LIBRARY);

    env.cmd()
        .args(["import", path_arg(&library), "--tag", "classic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 paper(s)"));

    env.cmd()
        .args(["list", "knuth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("knuth1968"))
        .stdout(predicate::str::contains("shannon1948").not());

    env.cmd()
        .args(["import", path_arg(&library)])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped 2"));
}

#[test]
fn test_list_json() {
    let env = Env::initialized();
    env.cmd().arg("add").write_stdin(TURING).assert().success();

    let output = env.cmd().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["citekey"], "turing1936");
    assert_eq!(value[0]["entry_type"], "article");
    assert!(value[0]["added"].is_string());
}

#[test]
fn test_rename_and_remove() {
    let env = Env::initialized();
    env.cmd().arg("add").write_stdin(TURING).assert().success();

    env.cmd()
        .args(["rename", "turing1936", "turing36"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed [turing1936] to [turing36]"));
    assert!(env.pubsdir().join("bib/turing36.bib").exists());
    assert!(!env.pubsdir().join("bib/turing1936.bib").exists());

    env.cmd()
        .args(["remove", "turing36"])
        .assert()
        .success();
    assert!(!env.pubsdir().join("meta/turing36.yaml").exists());

    env.cmd()
        .args(["remove", "turing36"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Citekey not found"));
}

#[test]
fn test_tags() {
    let env = Env::initialized();
    env.cmd().arg("add").write_stdin(TURING).assert().success();

    env.cmd()
        .args(["tag", "turing1936", "--add", "logic", "--add", "cs"])
        .assert()
        .success();
    env.cmd()
        .arg("tag")
        .assert()
        .success()
        .stdout("cs\nlogic\n");

    env.cmd()
        .args(["tag", "turing1936", "--remove", "cs"])
        .assert()
        .success();
    env.cmd().arg("tag").assert().success().stdout("logic\n");
}

#[test]
fn test_documents_and_notes() {
    let env = Env::initialized();
    env.cmd().arg("add").write_stdin(TURING).assert().success();
    let pdf = env.file("turing.pdf", "%PDF-1.4");

    env.cmd()
        .args(["doc", "add", "turing1936", path_arg(&pdf)])
        .assert()
        .success();
    assert!(env.pubsdir().join("doc/turing1936.pdf").exists());
    assert!(pdf.exists());

    env.cmd()
        .args(["doc", "path", "turing1936"])
        .assert()
        .success()
        .stdout(predicate::str::contains("turing1936.pdf"));

    env.cmd()
        .args(["note", "write", "turing1936", "Introduces the machine."])
        .assert()
        .success();
    env.cmd()
        .args(["note", "show", "turing1936"])
        .assert()
        .success()
        .stdout("Introduces the machine.");

    env.cmd()
        .args(["doc", "remove", "turing1936"])
        .assert()
        .success();
    assert!(!env.pubsdir().join("doc/turing1936.pdf").exists());
}

#[test]
fn test_export() {
    let env = Env::initialized();
    let library = env.file("library.bib", LIBRARY);
    env.cmd()
        .args(["import", path_arg(&library)])
        .assert()
        .success();

    env.cmd()
        .args(["export", "shannon1948"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("@article{shannon1948,"))
        .stdout(predicate::str::contains("knuth1968").not());

    let out = env.temp.path().join("all.bib");
    env.cmd()
        .args(["export", "-o", path_arg(&out)])
        .assert()
        .success();
    let exported = fs::read_to_string(&out).unwrap();
    assert!(exported.contains("@book{knuth1968,"));
    assert!(exported.contains("@article{shannon1948,"));
}

#[test]
fn test_export_formats() {
    let env = Env::initialized();
    let library = env.file("library.bib", LIBRARY);
    env.cmd()
        .args(["import", path_arg(&library)])
        .assert()
        .success();

    env.cmd()
        .args(["export", "--bib-format", "yaml", "knuth1968"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("knuth1968:\n  type: book\n"))
        .stdout(predicate::str::contains("shannon1948").not());

    env.cmd()
        .args(["export", "-f", "ris"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid output format: ris"));
}

#[test]
fn test_doctor_fixes_half_written_paper() {
    let env = Env::initialized();
    fs::write(env.pubsdir().join("bib/orphan.bib"), "@misc{orphan}\n").unwrap();

    env.cmd()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[orphan] no metadata"));
    env.cmd()
        .args(["doctor", "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed 1 problem(s)."));
    env.cmd()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("No inconsistencies found."));
}
