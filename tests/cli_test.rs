use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn tscat() -> Command {
    Command::cargo_bin("tscat").unwrap()
}

#[test]
fn test_help_flag() {
    tscat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE:"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version_flag() {
    tscat()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    tscat().assert().code(2);
}

#[test]
fn test_check_requires_files() {
    tscat()
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required arguments were not provided"));
}

#[test]
fn test_check_reports_duplicates_and_fails() {
    tscat()
        .arg("check")
        .arg(fixture("qtiplot_fr.ts"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            ":11: error[duplicate-message]: duplicate of the message on line 6 (@default: '&Yes')",
        ))
        .stdout(predicate::str::contains("info[unlinked-location]"))
        .stdout(predicate::str::contains("1 file checked: 1 error"))
        .stderr(predicate::str::contains("check failed"));
}

#[test]
fn test_check_clean_catalog_passes() {
    tscat()
        .arg("check")
        .arg(fixture("clean_fr.ts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 errors, 0 warnings, 0 info"));
}

#[test]
fn test_check_disable_rule() {
    tscat()
        .args(["check", "--disable", "duplicate-message"])
        .arg(fixture("qtiplot_fr.ts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("duplicate-message").not());
}

#[test]
fn test_check_config_file_disables_rules() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("tscat.toml");
    fs::write(
        &config,
        "[check]\ndisabled = [\"duplicate-message\", \"unlinked-location\"]\n",
    )
    .unwrap();

    tscat()
        .arg("check")
        .arg(fixture("qtiplot_fr.ts"))
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 errors, 0 warnings, 0 info"));
}

#[test]
fn test_check_uses_settings_next_to_the_catalogs() {
    let project = tempdir().unwrap();
    let translations = project.path().join("translations");
    fs::create_dir(&translations).unwrap();
    fs::copy(fixture("qtiplot_fr.ts"), translations.join("qtiplot_fr.ts")).unwrap();
    fs::write(
        project.path().join(".tscat.toml"),
        "[check]\ndisabled = [\"duplicate-message\"]\n",
    )
    .unwrap();
    let elsewhere = tempdir().unwrap();

    tscat()
        .current_dir(elsewhere.path())
        .arg("check")
        .arg(translations.join("qtiplot_fr.ts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 errors"));
}

#[test]
fn test_check_invalid_config_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("tscat.toml");
    fs::write(&config, "[check]\nunknown_key = 1\n").unwrap();

    tscat()
        .arg("check")
        .arg(fixture("clean_fr.ts"))
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_check_json_output() {
    let output = tscat()
        .args(["check", "--json"])
        .arg(fixture("qtiplot_fr.ts"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files_checked"], 1);
    let rules: Vec<&str> = report["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["rule"].as_str())
        .collect();
    assert!(rules.contains(&"duplicate-message"));
    assert!(rules.contains(&"unlinked-location"));
}

#[test]
fn test_check_broken_file_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.ts");
    fs::write(&path, "<?xml version=\"1.0\"?>\n<TS version=\"2.1\">\n<context>\n").unwrap();

    tscat()
        .arg("check")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error[parse]"));
}

#[test]
fn test_check_missing_file() {
    tscat()
        .args(["check", "/nonexistent/qtiplot_fr.ts"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_stats_table() {
    tscat()
        .arg("stats")
        .arg(fixture("qtiplot_fr.ts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[fr]"))
        .stdout(predicate::str::contains("ApplicationWindow"))
        .stdout(predicate::str::contains("90.9%"));
}

#[test]
fn test_stats_json() {
    let output = tscat()
        .args(["stats", "--json"])
        .arg(fixture("qtiplot_fr.ts"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let total = &stats[0]["total"];
    assert_eq!(total["finished"], 10);
    assert_eq!(total["unfinished"], 1);
    assert_eq!(total["obsolete"], 1);
    assert_eq!(stats[0]["contexts"].as_array().unwrap().len(), 3);
}

#[test]
fn test_lookup_with_comment() {
    tscat()
        .arg("lookup")
        .arg(fixture("qtiplot_fr.ts"))
        .args(["--context", "ApplicationWindow", "--source", "&Next"])
        .args(["--comment", "next window"])
        .assert()
        .success()
        .stdout("&Suivante\n");
}

#[test]
fn test_lookup_unknown_comment_falls_back() {
    tscat()
        .arg("lookup")
        .arg(fixture("qtiplot_fr.ts"))
        .args(["--context", "ApplicationWindow", "--source", "&Next"])
        .args(["--comment", "previous window"])
        .assert()
        .success()
        .stdout("Sui&vant\n");
}

#[test]
fn test_lookup_untranslated_returns_source() {
    tscat()
        .arg("lookup")
        .arg(fixture("qtiplot_fr.ts"))
        .args(["--context", "ApplicationWindow", "--source", "Matrix"])
        .assert()
        .success()
        .stdout("Matrix\n");
}

#[test]
fn test_lookup_plural() {
    for (n, expected) in [("1", "%n paramètre\n"), ("3", "%n paramètres\n")] {
        tscat()
            .arg("lookup")
            .arg(fixture("qtiplot_fr.ts"))
            .args(["--context", "FitDialog", "--source", "%n parameter(s)", "-n", n])
            .assert()
            .success()
            .stdout(expected);
    }
}

#[test]
fn test_fmt_is_idempotent() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.ts");
    let second = dir.path().join("second.ts");

    tscat()
        .arg("fmt")
        .arg(fixture("qtiplot_fr.ts"))
        .arg("-o")
        .arg(&first)
        .assert()
        .success();
    tscat()
        .arg("fmt")
        .arg(&first)
        .arg("-o")
        .arg(&second)
        .assert()
        .success();

    let first = fs::read_to_string(first).unwrap();
    assert!(first.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n"));
    assert!(first.contains("Colonne<byte value=\"x9\"/>Nom"));
    assert_eq!(first, fs::read_to_string(second).unwrap());
}

#[test]
fn test_fmt_in_place() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clean_fr.ts");
    fs::copy(fixture("clean_fr.ts"), &path).unwrap();

    tscat().arg("fmt").arg(&path).assert().success();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("<translation type=\"unfinished\"></translation>"));
}

#[test]
fn test_prune_removes_obsolete() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("pruned.ts");

    tscat()
        .arg("prune")
        .arg(fixture("qtiplot_fr.ts"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed 1 message and 0 contexts"));

    let content = fs::read_to_string(out).unwrap();
    assert!(!content.contains("Export to ASCII"));
    assert!(content.contains("<source>Matrix</source>"));
}

#[test]
fn test_prune_drop_unfinished() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("pruned.ts");

    tscat()
        .arg("prune")
        .arg(fixture("qtiplot_fr.ts"))
        .arg("-o")
        .arg(&out)
        .arg("--drop-unfinished")
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed 2 messages"));

    let content = fs::read_to_string(out).unwrap();
    assert!(!content.contains("<source>Matrix</source>"));
}
