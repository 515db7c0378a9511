//! The `studyform fill` command: answer a form line by line from stdin.
//!
//! Each line is `field value` (or `field` alone to clear it, or
//! `#field text` to set a comment). Edits are auto-saved once input has been
//! quiet for the configured delay, and flushed once more at end of input.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use studyform_core::autosave::AutoSaver;
use studyform_core::model::ResponseValue;
use studyform_core::persistence::StateStore;

use super::{resolve_form, Workspace};

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Edit<'a> {
    Select(&'a str, Option<&'a str>),
    Comment(&'a str, &'a str),
}

fn parse_line(line: &str) -> Option<Edit<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, Some(rest.trim())),
        None => (line, None),
    };
    match head.strip_prefix('#') {
        Some(field) if !field.is_empty() => Some(Edit::Comment(field, rest.unwrap_or(""))),
        Some(_) => None,
        None => Some(Edit::Select(head, rest.filter(|r| !r.is_empty()))),
    }
}

pub async fn execute(config: Option<PathBuf>, form: String) -> Result<()> {
    let ws = Workspace::open(config)?;
    let mut session = ws.active()?;
    let id = resolve_form(&session, &form)?;

    let instrument = session
        .instance(id)
        .map(|i| i.instrument)
        .context("form vanished from session")?;
    let schema = ws.registry.for_instrument(instrument)?.clone();
    session.open_form(id, &schema)?;

    let store: Arc<dyn StateStore> = Arc::new(ws.store.clone());
    let saver = AutoSaver::spawn(store, ws.config.autosave_delay());
    saver.touch(&session);

    println!("Filling {} ({} fields); end input with Ctrl-D", schema.title, schema.fields.len());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut edits = 0usize;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let Some(edit) = parse_line(&line) else {
            continue;
        };
        let (field, value) = match edit {
            Edit::Select(field, value) => {
                (field, ResponseValue::Selected(value.map(str::to_string)))
            }
            Edit::Comment(field, text) => (field, ResponseValue::Comment(text.to_string())),
        };
        if schema.field(field).is_none() {
            eprintln!("Warning: '{field}' is not a field of {}", schema.name);
        }
        session.record_response(id, field, value)?;
        saver.touch(&session);
        edits += 1;
    }

    saver.finish().await?;
    println!("Recorded {edits} edit(s)");
    Ok(())
}
