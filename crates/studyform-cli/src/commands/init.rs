//! The `studyform init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("studyform.toml").exists() {
        println!("studyform.toml already exists, skipping.");
    } else {
        std::fs::write("studyform.toml", SAMPLE_CONFIG)?;
        println!("Created studyform.toml");
    }

    std::fs::create_dir_all("studies")?;
    let example_path = Path::new("studies/example.toml");
    if example_path.exists() {
        println!("studies/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_STUDY)?;
        println!("Created studies/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit studies/example.toml to match your conditions");
    println!("  2. Run: studyform validate --study studies/example.toml");
    println!("  3. Run: studyform start --study studies/example.toml --participant \"Participant 1\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studyform configuration

data_dir = "./studyform-data"
output_dir = "./studyform-exports"

# Quiet period before `studyform fill` auto-saves
autosave_delay_ms = 1000

# "preserve-instances" or "fresh-instances"
reset_policy = "preserve-instances"

# Subject column of score exports: "name" or "number"
subject_label = "name"
"#;

const EXAMPLE_STUDY: &str = r#"[study]
name = "Example study"
default_participant = "Participant 1"

[[groups]]
id = "On Arrival"
role = "baseline"

[[groups.forms]]
instrument = "demographic"
task = "Demographics"

[[groups.forms]]
instrument = "csq-vr"
task = "CSQ-VR On Arrival"

[[groups]]
id = "Condition A"

[[groups.forms]]
instrument = "csq-vr"
task = "CSQ-VR Before Condition A"

[[groups.forms]]
instrument = "nasa-tlx"
task = "NASA TLX Condition A"

[[groups.forms]]
instrument = "usability"
task = "Usability Condition A"

[[groups.forms]]
instrument = "csq-vr"
task = "CSQ-VR After Condition A"
"#;
