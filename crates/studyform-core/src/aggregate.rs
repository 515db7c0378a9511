//! Aggregation of a session's forms into exportable documents and score rows.
//!
//! Positions are resolved here, at export time, from the stored group order;
//! responses are always looked up by instance identity.

use std::collections::{HashMap, HashSet};

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::StudyError;
use crate::model::{
    FieldKind, FieldResponse, FormInstance, GroupRole, InstanceId, Instrument, ScoredInstrument,
};
use crate::schema::SchemaRegistry;
use crate::scoring::{
    default_tlx_range_max, score_csq_vr, score_nasa_tlx, score_usability, CsqVrScores,
    NasaTlxScores, UsabilityScores,
};
use crate::session::SessionState;

/// Concatenate each group's instances in stored order, following the group order.
///
/// Ids that no longer resolve to an instance are skipped, as are repeats, so
/// the output never holds more entries than `all_instances`.
pub fn flatten_display_order<'a>(
    group_order: &[String],
    membership: &HashMap<String, Vec<InstanceId>>,
    all_instances: &'a [FormInstance],
) -> Vec<&'a FormInstance> {
    let by_id: HashMap<InstanceId, &FormInstance> =
        all_instances.iter().map(|i| (i.id, i)).collect();
    let mut seen = HashSet::new();
    let mut ordered = Vec::with_capacity(all_instances.len());

    for group in group_order {
        let Some(members) = membership.get(group) else {
            tracing::debug!("group '{group}' has no membership entry, skipping");
            continue;
        };
        for id in members {
            match by_id.get(id) {
                Some(instance) if seen.insert(*id) => ordered.push(*instance),
                Some(_) => {}
                None => tracing::debug!(instance = %id, "stale instance id in group '{group}'"),
            }
        }
    }

    ordered
}

/// What the Subject column of score exports shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectLabel {
    /// The participant name as entered.
    #[default]
    Name,
    /// Trailing digits of the participant name.
    Number,
}

/// Options shared by the score exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub subject: SubjectLabel,
}

impl ExportOptions {
    fn subject(&self, session: &SessionState) -> String {
        match self.subject {
            SubjectLabel::Name => session.participant_name.clone(),
            SubjectLabel::Number => session.subject_number().to_string(),
        }
    }
}

/// A form's responses in schema order, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResponses(pub Vec<(String, FieldResponse)>);

impl AggregateResponses {
    pub fn get(&self, field_id: &str) -> Option<&FieldResponse> {
        self.0.iter().find(|(id, _)| id == field_id).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldResponse)> {
        self.0.iter().map(|(id, r)| (id.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AggregateResponses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(id, r)| (id, r)))
    }
}

/// One form of the aggregate export, joined with its responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateForm {
    pub instance_id: InstanceId,
    pub instrument: Instrument,
    pub title: String,
    pub task: String,
    pub group_id: String,
    pub responses: AggregateResponses,
}

/// Every form of a session, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateDocument {
    pub participant_name: String,
    pub overall_comment: String,
    pub forms: Vec<AggregateForm>,
}

/// Join each instance with its stored responses.
///
/// Every schema field is listed (null selection, empty comment when never
/// answered), followed by any recorded field the schema does not define.
pub fn aggregate_forms(
    session: &SessionState,
    display_order: &[&FormInstance],
    registry: &SchemaRegistry,
) -> Result<Vec<AggregateForm>, StudyError> {
    display_order
        .iter()
        .map(|instance| {
            let schema = registry.for_instrument(instance.instrument)?;
            let record = session.record(instance.id);

            let normalize = |r: Option<&FieldResponse>| FieldResponse {
                selected: r
                    .and_then(|r| r.selected.clone())
                    .filter(|s| !s.is_empty()),
                comment: r.map(|r| r.comment.clone()).unwrap_or_default(),
            };

            let mut responses: Vec<(String, FieldResponse)> = schema
                .fields
                .iter()
                .map(|f| (f.id.clone(), normalize(record.and_then(|r| r.get(&f.id)))))
                .collect();

            if let Some(record) = record {
                let mut extra: Vec<&String> = record
                    .fields
                    .keys()
                    .filter(|id| schema.field(id).is_none())
                    .collect();
                extra.sort();
                responses.extend(
                    extra
                        .into_iter()
                        .map(|id| (id.clone(), normalize(record.get(id)))),
                );
            }

            Ok(AggregateForm {
                instance_id: instance.id,
                instrument: instance.instrument,
                title: schema.title.clone(),
                task: instance.task.clone(),
                group_id: instance.group.clone(),
                responses: AggregateResponses(responses),
            })
        })
        .collect()
}

pub fn aggregate_document(
    session: &SessionState,
    display_order: &[&FormInstance],
    registry: &SchemaRegistry,
) -> Result<AggregateDocument, StudyError> {
    let forms = aggregate_forms(session, display_order, registry)?;
    tracing::debug!(forms = forms.len(), "built aggregate document");
    Ok(AggregateDocument {
        participant_name: session.participant_name.clone(),
        overall_comment: session.overall_comment.clone(),
        forms,
    })
}

/// "Pre" for tasks run before the condition, "Post" for after, else the task.
pub fn time_label(task: &str) -> String {
    if task.contains("Before") {
        "Pre".to_string()
    } else if task.contains("After") {
        "Post".to_string()
    } else {
        task.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsqVrRow {
    pub subject: String,
    pub technique: String,
    pub time: String,
    pub scores: CsqVrScores,
}

/// CSQ-VR rows together with the baseline every row is compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsqVrSummary {
    pub baseline: CsqVrScores,
    pub rows: Vec<CsqVrRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NasaTlxRow {
    pub subject: String,
    pub technique: String,
    pub scores: NasaTlxScores,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsabilityRow {
    pub subject: String,
    pub technique: String,
    pub scores: UsabilityScores,
}

/// Scored rows of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InstrumentSummary {
    CsqVr(CsqVrSummary),
    NasaTlx(Vec<NasaTlxRow>),
    Usability(Vec<UsabilityRow>),
}

impl InstrumentSummary {
    pub fn row_count(&self) -> usize {
        match self {
            InstrumentSummary::CsqVr(s) => s.rows.len(),
            InstrumentSummary::NasaTlx(rows) => rows.len(),
            InstrumentSummary::Usability(rows) => rows.len(),
        }
    }
}

fn role(session: &SessionState, instance: &FormInstance) -> GroupRole {
    session.layout.role_of(&instance.group)
}

/// Score every CSQ-VR instance against the session's baseline.
///
/// The first baseline-group instance in display order is the baseline; rows
/// are emitted for the remaining non-excluded instances, grouped by technique
/// in order of first appearance.
pub fn csq_vr_summary(
    session: &SessionState,
    display_order: &[&FormInstance],
    options: ExportOptions,
) -> Result<CsqVrSummary, StudyError> {
    let entries: Vec<&FormInstance> = display_order
        .iter()
        .copied()
        .filter(|i| i.instrument == Instrument::CsqVr)
        .collect();
    if entries.is_empty() {
        return Err(StudyError::EmptyExportSet(ScoredInstrument::CsqVr));
    }

    let baseline_instance = entries
        .iter()
        .find(|i| role(session, i) == GroupRole::Baseline)
        .ok_or(StudyError::NoBaselineFound)?;
    let baseline = score_csq_vr(session.record(baseline_instance.id));

    let subject = options.subject(session);
    let mut techniques: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<CsqVrRow>> = HashMap::new();

    for instance in entries
        .iter()
        .filter(|i| role(session, i) == GroupRole::Normal)
    {
        let technique = instance.group.clone();
        if !grouped.contains_key(&technique) {
            techniques.push(technique.clone());
        }
        grouped.entry(technique.clone()).or_default().push(CsqVrRow {
            subject: subject.clone(),
            technique,
            time: time_label(&instance.task),
            scores: score_csq_vr(session.record(instance.id)),
        });
    }

    let rows: Vec<CsqVrRow> = techniques
        .iter()
        .filter_map(|t| grouped.remove(t))
        .flatten()
        .collect();

    tracing::debug!(rows = rows.len(), baseline_total = baseline.total, "scored CSQ-VR forms");
    Ok(CsqVrSummary { baseline, rows })
}

fn scored_entries<'a>(
    session: &SessionState,
    display_order: &[&'a FormInstance],
    kind: ScoredInstrument,
) -> Result<Vec<&'a FormInstance>, StudyError> {
    let entries: Vec<&FormInstance> = display_order
        .iter()
        .copied()
        .filter(|i| i.instrument == kind.instrument() && role(session, i) != GroupRole::Excluded)
        .collect();
    if entries.is_empty() {
        return Err(StudyError::EmptyExportSet(kind));
    }
    Ok(entries)
}

/// Score every non-excluded NASA-TLX instance.
pub fn nasa_tlx_rows(
    session: &SessionState,
    display_order: &[&FormInstance],
    registry: &SchemaRegistry,
    options: ExportOptions,
) -> Result<Vec<NasaTlxRow>, StudyError> {
    let entries = scored_entries(session, display_order, ScoredInstrument::NasaTlx)?;

    let range_max = registry
        .for_instrument(Instrument::NasaTlx)?
        .field("performance")
        .and_then(|f| match f.kind {
            FieldKind::Scale { max, .. } => Some(max as f64),
            _ => None,
        })
        .unwrap_or_else(default_tlx_range_max);

    let subject = options.subject(session);
    Ok(entries
        .into_iter()
        .map(|instance| NasaTlxRow {
            subject: subject.clone(),
            technique: instance.group.clone(),
            scores: score_nasa_tlx(session.record(instance.id), range_max),
        })
        .collect())
}

/// Extract the usability dimensions of every non-excluded Usability instance.
pub fn usability_rows(
    session: &SessionState,
    display_order: &[&FormInstance],
    options: ExportOptions,
) -> Result<Vec<UsabilityRow>, StudyError> {
    let entries = scored_entries(session, display_order, ScoredInstrument::Usability)?;

    let subject = options.subject(session);
    Ok(entries
        .into_iter()
        .map(|instance| UsabilityRow {
            subject: subject.clone(),
            technique: instance.group.clone(),
            scores: score_usability(session.record(instance.id)),
        })
        .collect())
}

/// Score one instrument across the display order.
pub fn summarize(
    kind: ScoredInstrument,
    session: &SessionState,
    display_order: &[&FormInstance],
    registry: &SchemaRegistry,
    options: ExportOptions,
) -> Result<InstrumentSummary, StudyError> {
    match kind {
        ScoredInstrument::CsqVr => {
            csq_vr_summary(session, display_order, options).map(InstrumentSummary::CsqVr)
        }
        ScoredInstrument::NasaTlx => {
            nasa_tlx_rows(session, display_order, registry, options).map(InstrumentSummary::NasaTlx)
        }
        ScoredInstrument::Usability => {
            usability_rows(session, display_order, options).map(InstrumentSummary::Usability)
        }
    }
}
