//! JSON export.

use anyhow::{Context, Result};
use serde::Serialize;

use studyform_core::aggregate::{aggregate_document, aggregate_forms, AggregateResponses};
use studyform_core::model::{FormInstance, InstanceId};
use studyform_core::schema::SchemaRegistry;
use studyform_core::session::SessionState;
use studyform_core::StudyError;

/// The whole session as a pretty-printed document.
pub fn aggregate_json(
    session: &SessionState,
    display_order: &[&FormInstance],
    registry: &SchemaRegistry,
) -> Result<String> {
    let doc = aggregate_document(session, display_order, registry)?;
    serde_json::to_string_pretty(&doc).context("failed to serialize aggregate document")
}

#[derive(Serialize)]
struct FormDocument<'a> {
    task: Option<&'a str>,
    responses: &'a AggregateResponses,
}

/// A single form as `{task, responses}`; a blank task serializes as null.
pub fn form_json(session: &SessionState, id: InstanceId, registry: &SchemaRegistry) -> Result<String> {
    let instance = session.instance(id).ok_or(StudyError::UnknownInstance(id))?;
    let forms = aggregate_forms(session, &[instance], registry)?;
    let form = forms
        .first()
        .context("aggregation produced no form")?;

    let doc = FormDocument {
        task: Some(form.task.as_str()).filter(|t| !t.is_empty()),
        responses: &form.responses,
    };
    serde_json::to_string_pretty(&doc).context("failed to serialize form document")
}
