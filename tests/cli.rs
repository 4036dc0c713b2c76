use std::{fs, path::PathBuf};

use assert_cmd::Command;
use predicates::{
    prelude::PredicateBooleanExt,
    str::{contains, diff},
};

const FACTORIAL: &str = "
function factorial(n) {
    if (n == 0) return 1;
    else return n * factorial(n - 1);
}
";

/// Writes `source` to a file unique to `name` in the system temporary directory.
fn source_file(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("tinyc-{}-{name}.tc", std::process::id()));
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn parse_prints_the_syntax_tree() {
    let file = source_file("parse", FACTORIAL);

    let mut cmd = Command::cargo_bin("tinyc").unwrap();
    cmd.arg("parse").arg(&file);
    cmd.assert().success().stdout(diff(
        "(block (function factorial (n) (block \
         (if (== n 0) (return 1) (return (* n (call factorial (- n 1))))))))\n",
    ));

    let _ = fs::remove_file(file);
}

#[test]
fn parse_reads_stdin_by_default() {
    let mut cmd = Command::cargo_bin("tinyc").unwrap();
    cmd.arg("parse").write_stdin("x = 'a' + 1;");
    cmd.assert().success().stdout(diff("(block (assign x (+ 97 1)))\n"));

    let mut cmd = Command::cargo_bin("tinyc").unwrap();
    cmd.args(["parse", "--debug", "-"]).write_stdin("x;");
    cmd.assert()
        .success()
        .stdout(contains("Block {").and(contains("Id(")));
}

#[test]
fn check_accepts_valid_programs() {
    let file = source_file("check", FACTORIAL);

    let mut cmd = Command::cargo_bin("tinyc").unwrap();
    cmd.arg("check").arg(&file);
    cmd.assert().success().stdout(diff("ok\n"));

    let _ = fs::remove_file(file);
}

#[test]
fn cli_reports_parse_errors() {
    let mut cmd = Command::cargo_bin("tinyc").unwrap();
    cmd.arg("check").write_stdin("var x = 1;\nif (x) x = 2;");
    cmd.assert().failure().stdout(diff("")).stderr(
        contains("error: expected `else` at 2:14")
            .and(contains("2 | if (x) x = 2;"))
            .and(contains("could not parse <stdin>")),
    );
}

#[test]
fn cli_reports_missing_files() {
    let mut cmd = Command::cargo_bin("tinyc").unwrap();
    cmd.args(["parse", "does/not/exist.tc"]);
    cmd.assert()
        .failure()
        .stderr(contains("could not read does/not/exist.tc"));
}
