//! Saved-session commands: `save`, `saved`, `load`, `delete`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studyform_core::persistence::SavedStates;
use studyform_core::session::SessionState;

use super::{parse_session_id, Workspace};

pub fn save(config: Option<PathBuf>) -> Result<()> {
    let ws = Workspace::open(config)?;
    let session = ws.active()?;

    let replaced = SavedStates::update(&ws.store, |saved| saved.upsert(session.snapshot()))?;
    if replaced {
        println!("Updated saved session {}", session.id);
    } else {
        println!("Saved session {}", session.id);
    }
    Ok(())
}

pub fn list(config: Option<PathBuf>) -> Result<()> {
    let ws = Workspace::open(config)?;
    let saved = SavedStates::load(&ws.store)?;

    if saved.is_empty() {
        println!("No saved sessions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Participant", "Study", "Answered forms", "Updated"]);
    for state in saved.list() {
        let answered = state.responses.values().filter(|r| !r.is_empty()).count();
        table.add_row(vec![
            Cell::new(state.id),
            Cell::new(&state.participant_name),
            Cell::new(&state.study_name),
            Cell::new(format!("{answered}/{}", state.instances.len())),
            Cell::new(state.updated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn load(config: Option<PathBuf>, id: String) -> Result<()> {
    let ws = Workspace::open(config)?;
    let id = parse_session_id(&id)?;
    let saved = SavedStates::load(&ws.store)?;

    let Some(snapshot) = saved.get(id) else {
        anyhow::bail!("no saved session with id {id}");
    };
    let session = SessionState::restore(snapshot.clone());
    ws.commit(&session)?;
    println!(
        "Loaded session {} for {}",
        session.id, session.participant_name
    );
    Ok(())
}

pub fn delete(config: Option<PathBuf>, id: String) -> Result<()> {
    let ws = Workspace::open(config)?;
    let id = parse_session_id(&id)?;

    if !SavedStates::update(&ws.store, |saved| saved.delete(id))? {
        anyhow::bail!("no saved session with id {id}");
    }
    println!("Deleted saved session {id}");
    Ok(())
}
