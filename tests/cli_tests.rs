use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn docjson_cmd() -> Command {
    Command::cargo_bin("docjson").unwrap()
}

#[test]
fn print_reformats_a_document_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"a":1,"b":[2,3]}}"#).unwrap();

    docjson_cmd()
        .arg("print")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"a":1,"b":[2,3]}"#));
}

#[test]
fn print_pretty_indents_output() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"a":1}}"#).unwrap();

    docjson_cmd()
        .arg("print")
        .arg("--pretty")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\n"));
}

#[test]
fn get_reads_a_nested_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"users": [{{"name": "ivy"}}]}}"#).unwrap();

    docjson_cmd()
        .arg("get")
        .arg(file.path())
        .arg("/users/0/name")
        .assert()
        .success()
        .stdout(predicate::str::contains("ivy"));
}

#[test]
fn get_on_missing_path_fails_with_nonzero_exit() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"a":1}}"#).unwrap();

    docjson_cmd()
        .arg("get")
        .arg(file.path())
        .arg("/missing")
        .assert()
        .failure();
}

#[test]
fn schema_prints_a_json_object() {
    docjson_cmd()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("PrinterOptions"));
}
