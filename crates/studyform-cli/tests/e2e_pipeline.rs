//! End-to-end session tests: start a session from the sample study, answer
//! forms through the CLI and check the exported files.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const STUDY: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../studies/head-rotation.toml"
);

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

fn start(dir: &TempDir, participant: &str) {
    studyform(dir)
        .args(["start", "--study", STUDY, "--participant", participant])
        .assert()
        .success();
}

fn record(dir: &TempDir, form: usize, pairs: &[(&str, &str)]) {
    for (field, value) in pairs {
        studyform(dir)
            .args(["record", "--form", &form.to_string(), "--field", field, "--value", value])
            .assert()
            .success();
    }
}

fn active_state(dir: &TempDir) -> Value {
    let text = std::fs::read_to_string(dir.path().join("data/activeState.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn instance_ids(state: &Value) -> Vec<String> {
    state["instances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect()
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("{}: {e}", path.display()))
        .lines()
        .map(String::from)
        .collect()
}

/// The single file in `dir` whose name starts with `prefix`.
fn find_export(dir: &Path, prefix: &str) -> PathBuf {
    let matches: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    assert_eq!(matches.len(), 1, "exports matching {prefix}: {matches:?}");
    matches.into_iter().next().unwrap()
}

// Display positions in head-rotation.toml:
//  1 Demographics            5 Usability Auto          9 Usability Manual
//  2 CSQ-VR On Arrival       6 CSQ-VR After Auto      10 CSQ-VR After Manual
//  3 CSQ-VR Before Auto      7 CSQ-VR Before Manual   11 NASA TLX Offset
//  4 NASA TLX Auto           8 NASA TLX Manual        12 Usability Offset

#[test]
fn e2e_score_exports() {
    let dir = TempDir::new().unwrap();
    start(&dir, "Participant 12");

    record(&dir, 2, &[("nauseaA", "2")]);
    record(
        &dir,
        6,
        &[
            ("nauseaA", "3"),
            ("nauseaB", "4"),
            ("vestibularA", "1"),
            ("vestibularB", "1"),
            ("oculomotorA", "2"),
            ("oculomotorB", "2"),
        ],
    );
    record(
        &dir,
        4,
        &[
            ("mentalDemand", "50"),
            ("physicalDemand", "30"),
            ("temporalDemand", "40"),
            ("performance", "80"),
            ("effort", "60"),
            ("frustration", "20"),
        ],
    );
    record(&dir, 5, &[("headControl", "6"), ("natural", "4")]);

    let out = dir.path().join("out");
    studyform(&dir)
        .args(["export", "--kind", "all", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Notice").not());

    let csq = read_lines(&out.join("Participant_12_CSQVR_summary.csv"));
    assert_eq!(
        csq[0],
        r#""Subject","Technique","Time","Total","Nausea","Vest","Oculo","BaselineTotal","BaselineNausea","BaselineVest","BaselineOculo""#
    );
    assert_eq!(csq.len(), 1 + 4);
    assert_eq!(
        csq[2],
        r#""Participant 12","Auto","Post","13","7","2","4","2","2","0","0""#
    );
    assert!(csq[3].contains(r#""Manual","Pre""#));

    let tlx = read_lines(&out.join("Participant_12_NASA_TLX_summary.csv"));
    assert_eq!(tlx.len(), 1 + 2, "Offset must be excluded");
    assert_eq!(
        tlx[1],
        r#""Participant 12","Auto","50","30","40","20","60","20","36.67""#
    );
    assert_eq!(
        tlx[2],
        r#""Participant 12","Manual","0","0","0","100","0","0","16.67""#
    );

    let usability = read_lines(&out.join("Participant_12_Usability_summary.csv"));
    assert_eq!(usability.len(), 1 + 2);
    assert_eq!(
        usability[1],
        r#""Participant 12","Auto","6","0","0","0","0","0","4""#
    );

    let aggregate = read_lines(&out.join("Participant_12_aggregated_summary.csv"));
    assert!(aggregate[0].starts_with(r#""participantName","overallComment","formTitle""#));
    assert!(aggregate
        .iter()
        .any(|l| l.ends_with(r#""CSQ-VR On Arrival","nauseaA","2","""#)));
    assert!(aggregate
        .iter()
        .any(|l| l.ends_with(r#""CSQ-VR On Arrival","nauseaB","null","""#)));

    let json_path = find_export(&out, "Participant_12_aggregated_responses_");
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    let forms = doc["forms"].as_array().unwrap();
    assert_eq!(forms.len(), 12);
    assert_eq!(forms[1]["responses"]["nauseaA"]["selected"], "2");
    assert_eq!(forms[1]["responses"]["nauseaB"]["selected"], Value::Null);
    assert_eq!(forms[1]["groupId"], "On Arrival");
}

#[test]
fn e2e_subject_number_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("studyform.toml"), "subject_label = \"number\"\n").unwrap();
    start(&dir, "Participant 12");

    studyform(&dir)
        .args(["export", "--kind", "usability"])
        .assert()
        .success();

    let rows = read_lines(&dir.path().join("exports/Participant_12_Usability_summary.csv"));
    assert!(rows[1].starts_with(r#""12","Auto""#));
}

#[test]
fn e2e_reorder_keeps_responses() {
    let dir = TempDir::new().unwrap();
    start(&dir, "P 3");
    record(&dir, 2, &[("nauseaA", "5")]);

    // On Arrival moves behind Auto: its CSQ-VR form is now at position 6.
    studyform(&dir)
        .args(["move-group", "--from", "1", "--to", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Auto, On Arrival, Manual, Offset"));

    let out = dir.path().join("forms");
    studyform(&dir)
        .args(["export-form", "--form", "6", "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success();

    let path = find_export(&out, "P_3_CyberSickness_in_Virtual_Reality");
    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.contains("CSQ-VR_On_Arrival_responses_"), "{name}");
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(doc["task"], "CSQ-VR On Arrival");
    assert_eq!(doc["responses"]["nauseaA"]["selected"], "5");

    studyform(&dir)
        .args(["move-form", "--group", "Auto", "--from", "4", "--to", "1"])
        .assert()
        .success();
    studyform(&dir)
        .arg("forms")
        .assert()
        .success()
        .stdout(predicate::str::contains("CSQ-VR After Auto"));
}

#[test]
fn e2e_save_reset_load_delete() {
    let dir = TempDir::new().unwrap();
    start(&dir, "P 8");
    record(&dir, 2, &[("nauseaA", "4")]);

    studyform(&dir)
        .arg("save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved session"));
    studyform(&dir)
        .arg("save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated saved session"));

    let before = active_state(&dir);
    let saved_id = before["id"].as_str().unwrap().to_string();

    studyform(&dir)
        .args(["reset", "--study", STUDY])
        .assert()
        .success()
        .stdout(predicate::str::contains("John Doe"));

    let after = active_state(&dir);
    assert_ne!(after["id"], before["id"]);
    assert_eq!(after["participantName"], "John Doe");
    assert!(after["responses"].as_object().unwrap().is_empty());
    assert_eq!(instance_ids(&after), instance_ids(&before));

    studyform(&dir)
        .args(["reset", "--study", STUDY, "--fresh-instances"])
        .assert()
        .success();
    let fresh = active_state(&dir);
    let fresh_ids = instance_ids(&fresh);
    assert!(instance_ids(&after).iter().all(|id| !fresh_ids.contains(id)));

    studyform(&dir)
        .arg("saved")
        .assert()
        .success()
        .stdout(predicate::str::contains(&saved_id))
        .stdout(predicate::str::contains("P 8"));

    studyform(&dir)
        .args(["load", "--id", &saved_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded session"));
    let loaded = active_state(&dir);
    assert_eq!(loaded["id"], before["id"]);
    assert_eq!(loaded["participantName"], "P 8");
    assert_eq!(loaded["responses"], before["responses"]);

    studyform(&dir)
        .args(["delete", "--id", &saved_id])
        .assert()
        .success();
    studyform(&dir)
        .arg("saved")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved sessions."));
}

#[test]
fn e2e_fill_from_stdin() {
    let dir = TempDir::new().unwrap();
    start(&dir, "P 5");

    studyform(&dir)
        .args(["fill", "--form", "5"])
        .write_stdin("headControl 6\ncomfort 5\n#comfort felt \"fine\"\n\nnatural\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded 4 edit(s)"));

    // end of input flushes into both the active state and the saved collection
    let state = active_state(&dir);
    let id = state["id"].as_str().unwrap().to_string();
    let responses = state["responses"].as_object().unwrap();
    assert_eq!(responses.len(), 1);
    let (form_id, record) = responses.iter().next().unwrap();
    assert_eq!(record["headControl"]["selected"], "6");

    let text = std::fs::read_to_string(dir.path().join("data/savedStates.json")).unwrap();
    let saved: Value = serde_json::from_str(&text).unwrap();
    let saved = saved.as_array().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["id"], id.as_str());
    assert_eq!(saved[0]["responses"][form_id.as_str()]["headControl"]["selected"], "6");

    let out = dir.path().join("forms");
    studyform(&dir)
        .args(["export-form", "--form", "5", "--format", "csv", "--output"])
        .arg(&out)
        .assert()
        .success();

    let path = find_export(&out, "P_5_Usability_Questionnaire_Usability_Auto_responses_");
    let lines = read_lines(&path);
    assert_eq!(lines[0], r#""questionId","selected","comment""#);
    assert!(lines.contains(&r#""headControl","6","""#.to_string()));
    assert!(lines.contains(&r#""comfort","5","felt ""fine""""#.to_string()));
    assert!(lines.contains(&r#""natural","null","""#.to_string()));
}

#[test]
fn e2e_participant_rename() {
    let dir = TempDir::new().unwrap();
    start(&dir, "P 1");

    studyform(&dir)
        .args(["participant", "--name", "P 2", "--comment", "moved slot"])
        .assert()
        .success();
    let state = active_state(&dir);
    assert_eq!(state["participantName"], "P 2");
    assert_eq!(state["overallComment"], "moved slot");

    studyform(&dir)
        .args(["participant", "--name", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("participant name must not be empty"));
}

#[test]
fn e2e_reset_without_default_participant_keeps_name() {
    let dir = TempDir::new().unwrap();
    let study = dir.path().join("anonymous.toml");
    std::fs::write(
        &study,
        r#"
[study]
name = "Anonymous"

[[groups]]
id = "Auto"

[[groups.forms]]
instrument = "usability"
task = "Usability Auto"
"#,
    )
    .unwrap();

    studyform(&dir)
        .args(["start", "--participant", "P 1", "--study"])
        .arg(&study)
        .assert()
        .success();
    record(&dir, 1, &[("comfort", "4")]);

    studyform(&dir)
        .args(["reset", "--study"])
        .arg(&study)
        .assert()
        .success();
    let state = active_state(&dir);
    assert_eq!(state["participantName"], "P 1");
    assert!(state["responses"].as_object().unwrap().is_empty());

    studyform(&dir)
        .args(["export", "--kind", "usability"])
        .assert()
        .success();
    assert!(dir.path().join("exports/P_1_Usability_summary.csv").exists());
}
