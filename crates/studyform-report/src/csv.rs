//! CSV export.
//!
//! Every field is quoted and embedded quotes are doubled; records end with
//! `\n` and the output carries no trailing newline.

use anyhow::{Context, Result};
use ::csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use studyform_core::aggregate::{
    aggregate_forms, summarize, AggregateForm, ExportOptions, InstrumentSummary,
};
use studyform_core::model::{FormInstance, InstanceId, ScoredInstrument};
use studyform_core::schema::SchemaRegistry;
use studyform_core::scoring::format_score;
use studyform_core::session::SessionState;
use studyform_core::StudyError;

/// Placeholder written for an absent selection.
pub const NULL_LITERAL: &str = "null";

pub const AGGREGATE_HEADER: [&str; 7] = [
    "participantName",
    "overallComment",
    "formTitle",
    "task",
    "questionId",
    "selected",
    "comment",
];

pub const FORM_HEADER: [&str; 3] = ["questionId", "selected", "comment"];

pub const CSQ_VR_HEADER: [&str; 11] = [
    "Subject",
    "Technique",
    "Time",
    "Total",
    "Nausea",
    "Vest",
    "Oculo",
    "BaselineTotal",
    "BaselineNausea",
    "BaselineVest",
    "BaselineOculo",
];

pub const NASA_TLX_HEADER: [&str; 9] = [
    "Subject",
    "Technique",
    "Mental",
    "Physical",
    "Temporal",
    "Performance",
    "Effort",
    "Frustration",
    "RawTLX",
];

pub const USABILITY_HEADER: [&str; 9] = [
    "Subject",
    "Technique",
    "Control",
    "Comfort",
    "Ease",
    "Precision",
    "PerceivedOffset",
    "Applicability",
    "Naturalness",
];

fn writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(wtr: Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context("failed to flush CSV writer")?;
    let mut text = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn write_response_rows<F>(wtr: &mut Writer<Vec<u8>>, form: &AggregateForm, prefix: F) -> Result<()>
where
    F: Fn() -> Vec<String>,
{
    for (field_id, response) in form.responses.iter() {
        let mut record = prefix();
        record.push(field_id.to_string());
        record.push(
            response
                .selected
                .clone()
                .unwrap_or_else(|| NULL_LITERAL.to_string()),
        );
        record.push(response.comment.clone());
        wtr.write_record(&record)?;
    }
    Ok(())
}

/// One row per (form, field) across the whole session.
pub fn aggregate_csv(
    session: &SessionState,
    display_order: &[&FormInstance],
    registry: &SchemaRegistry,
) -> Result<String> {
    let forms = aggregate_forms(session, display_order, registry)?;

    let mut wtr = writer();
    wtr.write_record(AGGREGATE_HEADER)?;
    for form in &forms {
        write_response_rows(&mut wtr, form, || {
            vec![
                session.participant_name.clone(),
                session.overall_comment.clone(),
                form.title.clone(),
                form.task.clone(),
            ]
        })?;
    }
    tracing::debug!(forms = forms.len(), "rendered aggregate CSV");
    finish(wtr)
}

/// The `questionId,selected,comment` table for a single form.
pub fn form_csv(session: &SessionState, id: InstanceId, registry: &SchemaRegistry) -> Result<String> {
    let instance = session.instance(id).ok_or(StudyError::UnknownInstance(id))?;
    let forms = aggregate_forms(session, &[instance], registry)?;

    let mut wtr = writer();
    wtr.write_record(FORM_HEADER)?;
    for form in &forms {
        write_response_rows(&mut wtr, form, Vec::new)?;
    }
    finish(wtr)
}

/// The score summary table for one instrument.
///
/// `NoBaselineFound` and `EmptyExportSet` are returned as [`StudyError`]s so
/// callers can downcast them into user notices.
pub fn instrument_csv(
    kind: ScoredInstrument,
    session: &SessionState,
    display_order: &[&FormInstance],
    registry: &SchemaRegistry,
    options: ExportOptions,
) -> Result<String> {
    let summary = summarize(kind, session, display_order, registry, options)?;
    let mut wtr = writer();

    match &summary {
        InstrumentSummary::CsqVr(csq) => {
            wtr.write_record(CSQ_VR_HEADER)?;
            let b = csq.baseline;
            for row in &csq.rows {
                let s = row.scores;
                wtr.write_record([
                    row.subject.clone(),
                    row.technique.clone(),
                    row.time.clone(),
                    s.total.to_string(),
                    s.nausea.to_string(),
                    s.vestibular.to_string(),
                    s.oculomotor.to_string(),
                    b.total.to_string(),
                    b.nausea.to_string(),
                    b.vestibular.to_string(),
                    b.oculomotor.to_string(),
                ])?;
            }
        }
        InstrumentSummary::NasaTlx(rows) => {
            wtr.write_record(NASA_TLX_HEADER)?;
            for row in rows {
                let s = row.scores;
                wtr.write_record([
                    row.subject.clone(),
                    row.technique.clone(),
                    format_score(s.mental),
                    format_score(s.physical),
                    format_score(s.temporal),
                    format_score(s.performance),
                    format_score(s.effort),
                    format_score(s.frustration),
                    format!("{:.2}", s.raw_tlx),
                ])?;
            }
        }
        InstrumentSummary::Usability(rows) => {
            wtr.write_record(USABILITY_HEADER)?;
            for row in rows {
                let s = row.scores;
                wtr.write_record([
                    row.subject.clone(),
                    row.technique.clone(),
                    s.control.to_string(),
                    s.comfort.to_string(),
                    s.ease.to_string(),
                    s.precision.to_string(),
                    s.perceived_offset.to_string(),
                    s.applicability.to_string(),
                    s.naturalness.to_string(),
                ])?;
            }
        }
    }

    tracing::debug!(%kind, rows = summary.row_count(), "rendered instrument CSV");
    finish(wtr)
}
