//! The `studyform validate` command.

use std::path::PathBuf;

use anyhow::Result;

use studyform_core::model::GroupRole;
use studyform_core::parser::{parse_study_design, validate_study_design};

pub fn execute(study_path: PathBuf) -> Result<()> {
    let design = parse_study_design(&study_path)?;

    println!(
        "Study: {} ({} groups, {} forms)",
        design.name,
        design.groups.len(),
        design.form_count()
    );
    for group in &design.groups {
        let role = match group.role {
            GroupRole::Normal => String::new(),
            role => format!(" [{role}]"),
        };
        println!("  {}{}: {} form(s)", group.id, role, group.forms.len());
    }

    let warnings = validate_study_design(&design);
    for w in &warnings {
        let prefix = w
            .group_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Study design valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
