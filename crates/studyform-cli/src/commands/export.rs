//! The `studyform export` and `studyform export-form` commands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;

use studyform_core::model::ScoredInstrument;
use studyform_core::StudyError;
use studyform_report::csv::{aggregate_csv, form_csv, instrument_csv};
use studyform_report::filename::{
    form_filename, responses_filename, summary_filename, AGGREGATED_TAG,
};
use studyform_report::json::{aggregate_json, form_json};
use studyform_report::write_text;

use super::{resolve_form, Workspace};
use crate::{ExportKind, FormFormat};

fn write(dir: &Path, name: String, text: &str) -> Result<()> {
    let path = dir.join(name);
    write_text(&path, text)?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn execute(config: Option<PathBuf>, kind: ExportKind, output: Option<PathBuf>) -> Result<()> {
    let ws = Workspace::open(config)?;
    let session = ws.active()?;
    let dir = output.unwrap_or_else(|| ws.config.output_dir.clone());
    let order = session.display_order();
    let participant = session.participant_name.as_str();

    let instruments: &[ScoredInstrument] = match kind {
        ExportKind::CsqVr => &[ScoredInstrument::CsqVr],
        ExportKind::NasaTlx => &[ScoredInstrument::NasaTlx],
        ExportKind::Usability => &[ScoredInstrument::Usability],
        ExportKind::Csv | ExportKind::Json => &[],
        ExportKind::All => &ScoredInstrument::ALL,
    };

    for &instrument in instruments {
        match instrument_csv(
            instrument,
            &session,
            &order,
            &ws.registry,
            ws.config.export_options(),
        ) {
            Ok(text) => write(&dir, summary_filename(participant, instrument.file_tag()), &text)?,
            // Notices abort only this export.
            Err(e) => match e.downcast_ref::<StudyError>() {
                Some(notice) if notice.is_user_notice() => println!("Notice: {notice}"),
                _ => return Err(e),
            },
        }
    }

    if matches!(kind, ExportKind::Csv | ExportKind::All) {
        let text = aggregate_csv(&session, &order, &ws.registry)?;
        write(&dir, summary_filename(participant, AGGREGATED_TAG), &text)?;
    }
    if matches!(kind, ExportKind::Json | ExportKind::All) {
        let text = aggregate_json(&session, &order, &ws.registry)?;
        write(
            &dir,
            responses_filename(participant, AGGREGATED_TAG, Utc::now()),
            &text,
        )?;
    }

    Ok(())
}

pub fn form(
    config: Option<PathBuf>,
    form: String,
    format: FormFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let ws = Workspace::open(config)?;
    let session = ws.active()?;
    let dir = output.unwrap_or_else(|| ws.config.output_dir.clone());
    let id = resolve_form(&session, &form)?;

    let Some(instance) = session.instance(id) else {
        return Err(StudyError::UnknownInstance(id).into());
    };
    let title = &ws.registry.for_instrument(instance.instrument)?.title;

    let (text, extension) = match format {
        FormFormat::Json => (form_json(&session, id, &ws.registry)?, "json"),
        FormFormat::Csv => (form_csv(&session, id, &ws.registry)?, "csv"),
    };
    let name = form_filename(
        &session.participant_name,
        title,
        &instance.task,
        Utc::now(),
        extension,
    );
    write(&dir, name, &text)
}
