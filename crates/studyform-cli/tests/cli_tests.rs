//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STUDY: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../studies/head-rotation.toml"
);

/// A `studyform` command isolated in `dir`: no config file, data and
/// exports kept under the temp dir.
fn studyform(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("studyform").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("STUDYFORM_DATA_DIR", dir.path().join("data"))
        .env("STUDYFORM_OUTPUT_DIR", dir.path().join("exports"))
        .env_remove("RUST_LOG");
    cmd
}

fn start(dir: &TempDir) {
    studyform(dir)
        .args(["start", "--study", STUDY, "--participant", "Participant 12"])
        .assert()
        .success();
}

#[test]
fn validate_sample_study() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .args(["validate", "--study", STUDY])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 groups, 12 forms"))
        .stdout(predicate::str::contains("On Arrival [baseline]"))
        .stdout(predicate::str::contains("Study design valid."));
}

#[test]
fn validate_reports_missing_baseline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("study.toml");
    std::fs::write(
        &path,
        r#"
[study]
name = "No baseline"
default_participant = "P 1"

[[groups]]
id = "Auto"

[[groups.forms]]
instrument = "csq-vr"
"#,
    )
    .unwrap();

    studyform(&dir)
        .arg("validate")
        .arg("--study")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .args(["validate", "--study", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    studyform(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created studyform.toml"))
        .stdout(predicate::str::contains("Created studies/example.toml"));

    assert!(dir.path().join("studyform.toml").exists());

    studyform(&dir)
        .args(["validate", "--study", "studies/example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Study design valid."));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    studyform(&dir).arg("init").assert().success();
    studyform(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn schemas_lists_builtin() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .arg("schemas")
        .assert()
        .success()
        .stdout(predicate::str::contains("CSQ-VR"))
        .stdout(predicate::str::contains("NASA-TLX"))
        .stdout(predicate::str::contains("Usability"))
        .stdout(predicate::str::contains("Demographic"));
}

#[test]
fn schemas_by_alias() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .args(["schemas", "--instrument", "tlx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mentalDemand"))
        .stdout(predicate::str::contains("0..=100"));
}

#[test]
fn schemas_unknown() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .args(["schemas", "--instrument", "sus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("schema not found: sus"));
}

#[test]
fn forms_without_session() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .arg("forms")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active session"));
}

#[test]
fn start_rejects_blank_participant() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .args(["start", "--study", STUDY, "--participant", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("participant name must not be empty"));
}

#[test]
fn start_then_list_forms() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .args(["start", "--study", STUDY, "--participant", "Participant 12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12 forms in 4 groups"));

    studyform(&dir)
        .arg("forms")
        .assert()
        .success()
        .stdout(predicate::str::contains("Participant 12"))
        .stdout(predicate::str::contains("CSQ-VR On Arrival"))
        .stdout(predicate::str::contains("Usability Offset"));
}

#[test]
fn record_requires_something_to_write() {
    let dir = TempDir::new().unwrap();
    start(&dir);
    studyform(&dir)
        .args(["record", "--form", "2", "--field", "nauseaA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to record"));
}

#[test]
fn record_out_of_range_position() {
    let dir = TempDir::new().unwrap();
    start(&dir);
    studyform(&dir)
        .args(["record", "--form", "99", "--field", "nauseaA", "--value", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no form at position 99"));
}

#[test]
fn record_unknown_instance_id() {
    let dir = TempDir::new().unwrap();
    start(&dir);
    studyform(&dir)
        .args([
            "record",
            "--form",
            "00000000-0000-0000-0000-000000000000",
            "--field",
            "nauseaA",
            "--value",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown form instance"));
}

#[test]
fn empty_instrument_export_is_a_notice() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tlx-only.toml");
    std::fs::write(
        &path,
        r#"
[study]
name = "TLX only"

[[groups]]
id = "Auto"

[[groups.forms]]
instrument = "nasa-tlx"
"#,
    )
    .unwrap();

    studyform(&dir)
        .arg("start")
        .arg("--study")
        .arg(&path)
        .args(["--participant", "P 1"])
        .assert()
        .success();

    studyform(&dir)
        .args(["export", "--kind", "usability"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Notice: no Usability forms found"));

    assert!(!dir.path().join("exports/P_1_Usability_summary.csv").exists());
}

#[test]
fn export_all_continues_past_notices() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-baseline.toml");
    std::fs::write(
        &path,
        r#"
[study]
name = "No baseline"

[[groups]]
id = "Auto"

[[groups.forms]]
instrument = "csq-vr"
task = "CSQ-VR After Auto"

[[groups.forms]]
instrument = "nasa-tlx"
"#,
    )
    .unwrap();

    studyform(&dir)
        .arg("start")
        .arg("--study")
        .arg(&path)
        .args(["--participant", "P 1"])
        .assert()
        .success();

    studyform(&dir)
        .args(["export", "--kind", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Notice: no baseline CSQ-VR form found"))
        .stdout(predicate::str::contains("Notice: no Usability forms found"))
        .stdout(predicate::str::contains("P_1_NASA_TLX_summary.csv"))
        .stdout(predicate::str::contains("P_1_aggregated_summary.csv"));
}

#[test]
fn delete_unknown_saved_session() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .args(["delete", "--id", "00000000-0000-0000-0000-000000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved session"));
}

#[test]
fn saved_is_empty_initially() {
    let dir = TempDir::new().unwrap();
    studyform(&dir)
        .arg("saved")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved sessions."));
}
