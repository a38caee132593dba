//! CLI command integration tests.
//! Each test points TC_DATA_FILE into its own temp directory.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn data_file(dir: &TempDir) -> PathBuf {
    dir.path().join("vars.tcoord-data.json")
}

fn tc_cmd(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("tc").unwrap();
    cmd.env("TC_DATA_FILE", data_file(dir))
        .env_remove("TC_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn eval_prints_result() {
    let dir = TempDir::new().unwrap();
    tc_cmd(&dir)
        .args(["eval", "0q12 + 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 0q13"));
}

#[test]
fn eval_output_options() {
    let dir = TempDir::new().unwrap();
    tc_cmd(&dir)
        .args(["eval", "--radix", "d", "0q12 + 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 0d7"));

    tc_cmd(&dir)
        .args(["eval", "-v", "tc", "cc[0, 1]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = tc[0q1]"));
}

#[test]
fn variables_persist_between_runs() {
    let dir = TempDir::new().unwrap();
    tc_cmd(&dir)
        .args(["eval", "var.x = 0q3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 0q3"));

    let saved = std::fs::read_to_string(data_file(&dir)).unwrap();
    assert!(saved.contains("\"tcoord-cli\""), "{saved}");

    tc_cmd(&dir)
        .args(["eval", "var.x * 2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 0q12"));

    tc_cmd(&dir)
        .arg("vars")
        .assert()
        .success()
        .stdout(predicate::str::contains("var.x = 0q3"))
        .stdout(predicate::str::contains("var.$ans = 0q12"));
}

#[test]
fn no_save_leaves_file_alone() {
    let dir = TempDir::new().unwrap();
    tc_cmd(&dir)
        .args(["eval", "--no-save", "var.y = 1"])
        .assert()
        .success();
    assert!(!data_file(&dir).exists());
}

#[test]
fn eval_error_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    tc_cmd(&dir)
        .args(["eval", "1 +"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));

    tc_cmd(&dir)
        .args(["eval", "var.missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reference error"));
    assert!(!data_file(&dir).exists());
}

#[test]
fn plugin_reference_survives_restart() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("avg.json");
    std::fs::write(&manifest, r#"{"calculator": "vector-average-magnitude"}"#).unwrap();
    let path = manifest.to_string_lossy().replace('\\', "/");

    tc_cmd(&dir)
        .args(["eval", &format!("var.avg = exprcalc['{path}']")])
        .assert()
        .success();

    tc_cmd(&dir)
        .args(["eval", "var.avg(cc[3, 4], tc[1])"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 3"));
}

#[test]
fn repl_reads_stdin() {
    let dir = TempDir::new().unwrap();
    tc_cmd(&dir)
        .arg("repl")
        .write_stdin(":radix b\n0q3 + 1\n1 +\nvar.z = 2\n:vars\n:quit\nvar.never = 1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 0b100"))
        .stdout(predicate::str::contains("var.z = 10"))
        .stdout(predicate::str::contains("var.never").not())
        .stderr(predicate::str::contains("syntax error"));

    tc_cmd(&dir)
        .arg("vars")
        .assert()
        .success()
        .stdout(predicate::str::contains("var.z = 2"));
}

#[test]
fn unreadable_data_file_is_kept() {
    let dir = TempDir::new().unwrap();
    std::fs::write(data_file(&dir), "{oops").unwrap();

    tc_cmd(&dir)
        .args(["eval", "1 + 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 2"))
        .stderr(predicate::str::contains("ignoring data file"));

    assert_eq!(std::fs::read_to_string(data_file(&dir)).unwrap(), "{oops");
}

#[test]
fn reload_reports_unreadable_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(data_file(&dir), "{oops").unwrap();

    tc_cmd(&dir)
        .arg("repl")
        .write_stdin(":reload\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("loaded").not())
        .stderr(predicate::str::contains("error:"));

    assert_eq!(std::fs::read_to_string(data_file(&dir)).unwrap(), "{oops");
}

#[test]
fn infinite_results_persist_and_list() {
    let dir = TempDir::new().unwrap();
    tc_cmd(&dir)
        .args(["eval", "var.x = 1/0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = inf"));

    let saved = std::fs::read_to_string(data_file(&dir)).unwrap();
    assert!(saved.contains("\"Infinity\""), "{saved}");

    tc_cmd(&dir)
        .args(["vars", "-s", "q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("var.x = inf"))
        .stdout(predicate::str::contains("var.$ans = inf"));
}

#[test]
fn settings_file_sets_defaults() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tc.toml");
    std::fs::write(&config, "radix = \"b\"\n").unwrap();

    tc_cmd(&dir)
        .env("TC_CONFIG", &config)
        .args(["eval", "0q3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 0b11"));

    tc_cmd(&dir)
        .env("TC_CONFIG", &config)
        .args(["eval", "-s", "q", "0q3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("result = 0q3"));
}
