use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const CONFIG: &str = r#"{"relevantKeys": {"item": "name"}, "nonSortKeys": []}"#;
const UNSORTED: &str = r#"<root><item name="b"/><item name="a"/></root>"#;
const SORTED: &str = r#"<root><item name="a"/><item name="b"/></root>"#;

fn xmlsort() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin("xmlsort")?)
}

fn project() -> Result<TempDir, Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("xmlformatter.cfg"), CONFIG)?;
    Ok(dir)
}

#[test]
fn test_stdin_to_stdout() -> TestResult {
    let dir = project()?;
    xmlsort()?
        .arg("--root")
        .arg(dir.path())
        .args(["--indent", "0", "--no-declaration"])
        .write_stdin(UNSORTED)
        .assert()
        .success()
        .stdout(SORTED);
    Ok(())
}

#[test]
fn test_default_output_is_indented_with_declaration() -> TestResult {
    let dir = project()?;
    xmlsort()?
        .arg("--root")
        .arg(dir.path())
        .write_stdin(UNSORTED)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml version=\"1.0\""))
        .stdout(predicate::str::contains("\n  <item name=\"a\"/>\n  <item name=\"b\"/>\n"));
    Ok(())
}

#[test]
fn test_write_in_place() -> TestResult {
    let dir = project()?;
    let file = dir.path().join("doc.xml");
    fs::write(&file, UNSORTED)?;

    xmlsort()?
        .arg("--root")
        .arg(dir.path())
        .args(["--write", "--indent", "0", "--no-declaration"])
        .arg(&file)
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(&file)?, SORTED);
    Ok(())
}

#[test]
fn test_check_reports_unformatted_files() -> TestResult {
    let dir = project()?;
    let unsorted = dir.path().join("unsorted.xml");
    let sorted = dir.path().join("sorted.xml");
    fs::write(&unsorted, UNSORTED)?;
    fs::write(&sorted, SORTED)?;

    xmlsort()?
        .arg("--root")
        .arg(dir.path())
        .args(["--check", "--indent", "0", "--no-declaration"])
        .arg(&sorted)
        .assert()
        .success();

    xmlsort()?
        .arg("--root")
        .arg(dir.path())
        .args(["--check", "--indent", "0", "--no-declaration"])
        .arg(&sorted)
        .arg(&unsorted)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unsorted.xml"))
        .stdout(predicate::function(|out: &str| out.lines().count() == 1));

    assert_eq!(fs::read_to_string(&unsorted)?, UNSORTED);
    Ok(())
}

#[test]
fn test_malformed_file_blocks_all_writes() -> TestResult {
    let dir = project()?;
    let good = dir.path().join("good.xml");
    let bad = dir.path().join("bad.xml");
    fs::write(&good, UNSORTED)?;
    fs::write(&bad, "<root><a></root>")?;

    xmlsort()?
        .arg("--root")
        .arg(dir.path())
        .arg("--write")
        .arg(&good)
        .arg(&bad)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not well-formed"));

    assert_eq!(fs::read_to_string(&good)?, UNSORTED);
    assert_eq!(fs::read_to_string(&bad)?, "<root><a></root>");
    Ok(())
}

#[test]
fn test_missing_project_config_is_created() -> TestResult {
    let dir = TempDir::new()?;
    xmlsort()?
        .arg("--root")
        .arg(dir.path())
        .args(["--indent", "0", "--no-declaration"])
        .write_stdin(UNSORTED)
        .assert()
        .success()
        .stdout(UNSORTED);

    let written = fs::read_to_string(dir.path().join("xmlformatter.cfg"))?;
    assert!(written.contains("relevantKeys"));
    assert!(written.contains("nonSortKeys"));
    Ok(())
}

#[test]
fn test_explicit_config_must_exist() -> TestResult {
    let dir = TempDir::new()?;
    let missing = dir.path().join("missing.cfg");
    xmlsort()?
        .arg("--config")
        .arg(&missing)
        .write_stdin(UNSORTED)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load config"));

    assert!(!missing.exists());
    Ok(())
}

#[test]
fn test_explicit_config_is_used() -> TestResult {
    let dir = TempDir::new()?;
    let config = dir.path().join("custom.json");
    fs::write(&config, r#"{"relevantKeys": {"item": {"by": "name", "order": "desc"}}}"#)?;

    xmlsort()?
        .arg("--config")
        .arg(&config)
        .args(["--indent", "0", "--no-declaration"])
        .write_stdin(SORTED)
        .assert()
        .success()
        .stdout(UNSORTED);
    Ok(())
}

#[test]
fn test_write_requires_files() -> TestResult {
    let dir = project()?;
    xmlsort()?
        .arg("--root")
        .arg(dir.path())
        .arg("--write")
        .write_stdin(UNSORTED)
        .assert()
        .code(1);
    Ok(())
}

#[test]
fn test_docs_prints_url() -> TestResult {
    xmlsort()?
        .arg("docs")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://github.com/pixincreate/xmlsort"));
    Ok(())
}
