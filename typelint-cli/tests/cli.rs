use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use predicates::str::is_empty;
use serde_json::Value;
use std::path::Path;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

fn typelint() -> Command {
  Command::cargo_bin("typelint").unwrap()
}

#[test]
fn check_succeeds_on_clean_file() {
  typelint()
    .arg("check")
    .arg(fixture("ok.js"))
    .assert()
    .success()
    .stdout(is_empty());
}

#[test]
fn check_reports_mismatches() {
  typelint()
    .arg("check")
    .arg(fixture("error.js"))
    .assert()
    .failure()
    .stdout(contains(
      "can't assign type boolean to variable of type number [assignment-types-must-match]",
    ))
    .stdout(contains(
      "returning an implicit undefined from a function declared to return number",
    ));
}

#[test]
fn flags_override_defaults() {
  typelint()
    .arg("check")
    .arg(fixture("error.js"))
    .args(["--allow-implicit-undefineds", "--rule", "function-return-type-must-match"])
    .assert()
    .success()
    .stdout(is_empty());
}

#[test]
fn checks_directories_across_imports() {
  let output = typelint()
    .arg("check")
    .arg(fixture("project"))
    .arg("--json")
    .assert()
    .failure()
    .get_output()
    .stdout
    .clone();
  let json: Value = serde_json::from_slice(&output).expect("valid JSON output");
  assert_eq!(json["files"], 2);
  let messages: Vec<&str> = json["diagnostics"]
    .as_array()
    .expect("diagnostics array")
    .iter()
    .map(|d| d["message"].as_str().unwrap())
    .collect();
  assert_eq!(messages, vec![
    "can't initialize variable of type ExtendedRecord with value of type (object literal)",
    "can't initialize variable of type string with value of type Record",
  ]);
  let first = &json["diagnostics"][0];
  assert_eq!(first["code"], "assignment-types-must-match");
  assert_eq!(first["line"], 7);
  assert!(first["file"].as_str().unwrap().ends_with("main.js"));
}

#[test]
fn config_file_is_found_next_to_sources() {
  typelint()
    .arg("check")
    .arg(fixture("strict"))
    .assert()
    .failure()
    .stdout(contains(
      "returning string from a function declared to return number",
    ))
    .stdout(contains("function pair expects 2 arguments but was called with 1"))
    .stdout(contains("implicit undefined").not());
}

#[test]
fn unsupported_annotations_abort() {
  typelint()
    .arg("check")
    .arg(fixture("bad_annotation.js"))
    .assert()
    .code(2)
    .stderr(contains("unsupported type expression"));
}

#[test]
fn types_lists_typedefs_and_declarations() {
  let output = typelint()
    .arg("types")
    .arg(fixture("project/main.js"))
    .arg("--json")
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();
  let json: Value = serde_json::from_slice(&output).expect("valid JSON output");
  let typedefs = json["typedefs"].as_array().expect("typedefs array");
  let names: Vec<&str> = typedefs
    .iter()
    .map(|t| t["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["ExtendedRecord", "Record"]);
  assert_eq!(typedefs[1]["type"], "{name:string, value:number}");
  let declarations = json["declarations"].as_array().expect("declarations array");
  assert_eq!(declarations[0]["line"], 4);
  assert_eq!(declarations[0]["type"], "ExtendedRecord");
}
