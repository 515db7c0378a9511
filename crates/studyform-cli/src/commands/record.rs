//! The `studyform record` command.

use std::path::PathBuf;

use anyhow::Result;

use studyform_core::model::ResponseValue;

use super::{resolve_form, Workspace};

pub fn execute(
    config: Option<PathBuf>,
    form: String,
    field: String,
    value: Option<String>,
    clear: bool,
    comment: Option<String>,
) -> Result<()> {
    if value.is_none() && !clear && comment.is_none() {
        anyhow::bail!("nothing to record: pass --value, --clear or --comment");
    }

    let ws = Workspace::open(config)?;
    let mut session = ws.active()?;
    let id = resolve_form(&session, &form)?;

    if let Some(instance) = session.instance(id) {
        let schema = ws.registry.for_instrument(instance.instrument)?;
        if schema.field(&field).is_none() {
            tracing::warn!("field '{field}' is not part of the {} schema", schema.name);
        }
        session.open_form(id, schema)?;
    }

    if value.is_some() || clear {
        session.record_response(id, &field, ResponseValue::Selected(value))?;
    }
    if let Some(comment) = comment {
        session.record_response(id, &field, ResponseValue::Comment(comment))?;
    }
    ws.commit(&session)?;

    let shown = session
        .record(id)
        .and_then(|r| r.selected(&field))
        .unwrap_or("null");
    println!("Recorded {field} = {shown}");
    Ok(())
}
