//! Active-session commands: `start`, `forms`, `participant`, `move-*`, `reset`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studyform_core::parser::{parse_study_design, validate_study_design};
use studyform_core::session::{ResetPolicy, SessionState};

use super::Workspace;

pub fn start(
    config: Option<PathBuf>,
    study: PathBuf,
    participant: String,
    comment: String,
) -> Result<()> {
    let ws = Workspace::open(config)?;
    let design = parse_study_design(&study)?;
    for w in validate_study_design(&design) {
        tracing::warn!("{}", w.message);
    }

    let session = SessionState::create(&participant, &comment, &design)?;
    ws.commit(&session)?;

    println!(
        "Started session {} for {} ({} forms in {} groups)",
        session.id,
        session.participant_name,
        session.instances.len(),
        session.layout.group_order.len()
    );
    Ok(())
}

pub fn forms(config: Option<PathBuf>) -> Result<()> {
    let ws = Workspace::open(config)?;
    let session = ws.active()?;

    println!(
        "Session {}: {} ({})",
        session.id, session.participant_name, session.study_name
    );

    let mut table = Table::new();
    table.set_header(vec![
        "#", "Group", "Role", "Instrument", "Task", "Answered", "Instance",
    ]);
    for (i, instance) in session.display_order().into_iter().enumerate() {
        let total = ws
            .registry
            .for_instrument(instance.instrument)
            .map(|s| s.fields.len())
            .unwrap_or(0);
        let answered = session
            .record(instance.id)
            .map(|r| r.answered_count())
            .unwrap_or(0);
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&instance.group),
            Cell::new(session.layout.role_of(&instance.group)),
            Cell::new(instance.instrument),
            Cell::new(&instance.task),
            Cell::new(format!("{answered}/{total}")),
            Cell::new(instance.id),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn participant(config: Option<PathBuf>, name: String, comment: Option<String>) -> Result<()> {
    let ws = Workspace::open(config)?;
    let mut session = ws.active()?;
    let comment = comment.unwrap_or_else(|| session.overall_comment.clone());
    session.set_participant(&name, &comment)?;
    ws.commit(&session)?;
    println!("Participant set to {}", session.participant_name);
    Ok(())
}

pub fn move_group(config: Option<PathBuf>, from: usize, to: usize) -> Result<()> {
    let ws = Workspace::open(config)?;
    let mut session = ws.active()?;

    let moved = from > 0 && to > 0 && session.layout.move_group(from - 1, to - 1);
    if !moved {
        anyhow::bail!("no group at position {from}");
    }
    session.touch();
    ws.commit(&session)?;
    println!("Group order: {}", session.layout.group_order.join(", "));
    Ok(())
}

pub fn move_form(config: Option<PathBuf>, group: String, from: usize, to: usize) -> Result<()> {
    let ws = Workspace::open(config)?;
    let mut session = ws.active()?;

    let moved = from > 0 && to > 0 && session.layout.move_form(&group, from - 1, to - 1);
    if !moved {
        anyhow::bail!("no form at position {from} in group '{group}'");
    }
    session.touch();
    ws.commit(&session)?;
    println!("Moved form {from} of '{group}' to position {to}");
    Ok(())
}

pub fn reset(config: Option<PathBuf>, study: PathBuf, fresh_instances: bool) -> Result<()> {
    let ws = Workspace::open(config)?;
    let mut session = ws.active()?;
    let design = parse_study_design(&study)?;

    let policy = if fresh_instances {
        ResetPolicy::FreshInstances
    } else {
        ws.config.reset_policy
    };
    session.reset(&design.baseline, policy);
    ws.commit(&session)?;

    println!(
        "Reset session; new id {} for {}",
        session.id, session.participant_name
    );
    Ok(())
}
