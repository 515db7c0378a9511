//! Core data model types for studyform.
//!
//! These are the types the whole system shares: instrument identities, field
//! and form schemas, placed form instances and the responses collected for
//! them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The questionnaire instruments studyform knows how to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Instrument {
    CsqVr,
    NasaTlx,
    Usability,
    Demographic,
}

impl Instrument {
    /// All instruments, in registry order.
    pub const ALL: [Instrument; 4] = [
        Instrument::CsqVr,
        Instrument::NasaTlx,
        Instrument::Usability,
        Instrument::Demographic,
    ];

    /// The canonical schema name for this instrument.
    pub fn schema_name(self) -> &'static str {
        match self {
            Instrument::CsqVr => "CSQ-VR",
            Instrument::NasaTlx => "NASA-TLX",
            Instrument::Usability => "Usability",
            Instrument::Demographic => "Demographic",
        }
    }

    /// The scored variant of this instrument, if it has a summary export.
    pub fn scored(self) -> Option<ScoredInstrument> {
        match self {
            Instrument::CsqVr => Some(ScoredInstrument::CsqVr),
            Instrument::NasaTlx => Some(ScoredInstrument::NasaTlx),
            Instrument::Usability => Some(ScoredInstrument::Usability),
            Instrument::Demographic => None,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema_name())
    }
}

impl FromStr for Instrument {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csq-vr" | "csqvr" | "csq" => Ok(Instrument::CsqVr),
            "nasa-tlx" | "nasatlx" | "nasa tlx" | "nasa_tlx" | "tlx" => Ok(Instrument::NasaTlx),
            "usability" => Ok(Instrument::Usability),
            "demographic" | "demographics" => Ok(Instrument::Demographic),
            other => Err(format!("unknown instrument: {other}")),
        }
    }
}

/// Instruments that produce a per-instance score summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoredInstrument {
    CsqVr,
    NasaTlx,
    Usability,
}

impl ScoredInstrument {
    pub const ALL: [ScoredInstrument; 3] = [
        ScoredInstrument::CsqVr,
        ScoredInstrument::NasaTlx,
        ScoredInstrument::Usability,
    ];

    pub fn instrument(self) -> Instrument {
        match self {
            ScoredInstrument::CsqVr => Instrument::CsqVr,
            ScoredInstrument::NasaTlx => Instrument::NasaTlx,
            ScoredInstrument::Usability => Instrument::Usability,
        }
    }

    /// Tag used in summary export filenames.
    pub fn file_tag(self) -> &'static str {
        match self {
            ScoredInstrument::CsqVr => "CSQVR",
            ScoredInstrument::NasaTlx => "NASA_TLX",
            ScoredInstrument::Usability => "Usability",
        }
    }
}

impl fmt::Display for ScoredInstrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.instrument().fmt(f)
    }
}

impl FromStr for ScoredInstrument {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let instrument: Instrument = s.parse()?;
        instrument
            .scored()
            .ok_or_else(|| format!("{instrument} has no score summary"))
    }
}

/// One selectable answer of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: i64,
    pub label: String,
}

/// How a field is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Pick one of a fixed, ordered set of numeric options.
    Choice { options: Vec<ChoiceOption> },
    /// Free text entry.
    Text {
        #[serde(default)]
        placeholder: Option<String>,
    },
    /// A slider over an inclusive numeric range.
    Scale {
        min: i64,
        max: i64,
        #[serde(default)]
        default: Option<i64>,
        #[serde(default)]
        min_label: Option<String>,
        #[serde(default)]
        max_label: Option<String>,
    },
}

/// A single question within a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Identifier, unique within its schema.
    pub id: String,
    /// Question text shown to the participant.
    pub question: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Whether the field accepts a free-text comment next to the answer.
    #[serde(default)]
    pub has_comment: bool,
    #[serde(default)]
    pub comment_placeholder: Option<String>,
}

impl FieldSpec {
    /// The value a freshly opened form shows for this field, if any.
    pub fn initial_value(&self) -> Option<String> {
        match &self.kind {
            FieldKind::Scale { min, default, .. } => Some(default.unwrap_or(*min).to_string()),
            _ => None,
        }
    }
}

/// A named, ordered question set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Instrument identifier (e.g. "CSQ-VR").
    pub name: String,
    pub instrument: Instrument,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    /// Look up a field by id.
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Field ids in schema order.
    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.id.as_str())
    }

    /// The record a freshly opened form starts from: scale fields carry their
    /// default (or minimum), everything else is unanswered.
    pub fn seeded_record(&self) -> ResponseRecord {
        let mut record = ResponseRecord::default();
        for field in &self.fields {
            if let Some(value) = field.initial_value() {
                record.set_selected(&field.id, Some(value));
            }
        }
        record
    }
}

/// Stable identity of a form instance; survives reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for InstanceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(InstanceId)
    }
}

/// A schema placed in a study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInstance {
    pub id: InstanceId,
    pub instrument: Instrument,
    /// Free-text task label (e.g. "CSQ-VR Before Auto").
    #[serde(default)]
    pub task: String,
    /// Experimental condition this instance belongs to.
    pub group: String,
}

/// What part a group plays in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    /// The pre-session reference point for CSQ-VR comparisons.
    Baseline,
    /// Collected but left out of the scored exports.
    Excluded,
    #[default]
    Normal,
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRole::Baseline => write!(f, "baseline"),
            GroupRole::Excluded => write!(f, "excluded"),
            GroupRole::Normal => write!(f, "normal"),
        }
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline" => Ok(GroupRole::Baseline),
            "excluded" | "exclude" => Ok(GroupRole::Excluded),
            "normal" | "" => Ok(GroupRole::Normal),
            other => Err(format!("unknown group role: {other}")),
        }
    }
}

/// The answer stored for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResponse {
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub comment: String,
}

/// One write to a field: either its selection or its comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseValue {
    /// `None` clears the selection.
    Selected(Option<String>),
    Comment(String),
}

/// Responses collected for one form instance, keyed by field id.
///
/// Unanswered fields are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseRecord {
    pub fields: HashMap<String, FieldResponse>,
}

impl ResponseRecord {
    pub fn get(&self, field_id: &str) -> Option<&FieldResponse> {
        self.fields.get(field_id)
    }

    /// The selected value of a field; empty selections count as unanswered.
    pub fn selected(&self, field_id: &str) -> Option<&str> {
        self.fields
            .get(field_id)
            .and_then(|r| r.selected.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn comment(&self, field_id: &str) -> &str {
        self.fields
            .get(field_id)
            .map(|r| r.comment.as_str())
            .unwrap_or("")
    }

    pub fn set_selected(&mut self, field_id: &str, value: Option<String>) {
        self.fields.entry(field_id.to_string()).or_default().selected = value;
    }

    pub fn set_comment(&mut self, field_id: &str, comment: String) {
        self.fields.entry(field_id.to_string()).or_default().comment = comment;
    }

    /// Apply one write, leaving every other field untouched.
    pub fn apply(&mut self, field_id: &str, value: ResponseValue) {
        match value {
            ResponseValue::Selected(v) => self.set_selected(field_id, v),
            ResponseValue::Comment(c) => self.set_comment(field_id, c),
        }
    }

    /// Number of fields with a non-empty selection.
    pub fn answered_count(&self) -> usize {
        self.fields
            .values()
            .filter(|r| r.selected.as_deref().is_some_and(|s| !s.is_empty()))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
