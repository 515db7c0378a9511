//! Built-in questionnaire schemas and the registry that serves them.
//!
//! Schemas are static: they are built once when a registry is created and
//! never mutated afterwards.

use crate::error::StudyError;
use crate::model::{ChoiceOption, FieldKind, FieldSpec, FormSchema, Instrument};

/// Lookup table of form schemas by name.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<FormSchema>,
}

impl SchemaRegistry {
    /// A registry holding the CSQ-VR, NASA-TLX, Usability and Demographic schemas.
    pub fn builtin() -> Self {
        Self {
            schemas: Instrument::ALL.iter().map(|i| builtin_schema(*i)).collect(),
        }
    }

    /// Look up a schema by its name or by an instrument alias.
    pub fn get(&self, name: &str) -> Result<&FormSchema, StudyError> {
        let needle = name.trim();
        if let Some(schema) = self
            .schemas
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(needle))
        {
            return Ok(schema);
        }
        needle
            .parse::<Instrument>()
            .ok()
            .and_then(|i| self.schemas.iter().find(|s| s.instrument == i))
            .ok_or_else(|| StudyError::SchemaNotFound(needle.to_string()))
    }

    /// The schema an instance of `instrument` is rendered from.
    pub fn for_instrument(&self, instrument: Instrument) -> Result<&FormSchema, StudyError> {
        self.schemas
            .iter()
            .find(|s| s.instrument == instrument)
            .ok_or_else(|| StudyError::SchemaNotFound(instrument.schema_name().to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormSchema> {
        self.schemas.iter()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_schema(instrument: Instrument) -> FormSchema {
    match instrument {
        Instrument::CsqVr => csq_vr(),
        Instrument::NasaTlx => nasa_tlx(),
        Instrument::Usability => usability(),
        Instrument::Demographic => demographic(),
    }
}

fn options(labels: &[&str]) -> Vec<ChoiceOption> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| ChoiceOption {
            value: i as i64 + 1,
            label: (*label).to_string(),
        })
        .collect()
}

fn choice(id: &str, question: &str, labels: &[&str]) -> FieldSpec {
    FieldSpec {
        id: id.to_string(),
        question: question.to_string(),
        kind: FieldKind::Choice {
            options: options(labels),
        },
        has_comment: false,
        comment_placeholder: None,
    }
}

fn with_comment(mut field: FieldSpec, placeholder: &str) -> FieldSpec {
    field.has_comment = true;
    field.comment_placeholder = Some(placeholder.to_string());
    field
}

const SYMPTOM_LABELS: [&str; 7] = [
    "Absent",
    "Very Mild",
    "Mild",
    "Moderate",
    "Intense",
    "Very Intense",
    "Extreme",
];

fn csq_vr() -> FormSchema {
    let symptom = |id: &str, name: &str, question: &str| {
        with_comment(
            choice(id, &format!("{name}: {question}"), &SYMPTOM_LABELS),
            &format!("Please write any additional comments for {name}"),
        )
    };

    FormSchema {
        name: Instrument::CsqVr.schema_name().to_string(),
        instrument: Instrument::CsqVr,
        title: "CyberSickness in Virtual Reality Questionnaire (CSQ-VR)".to_string(),
        description: Some(
            "Please, from 1 to 7, circle the response that better corresponds to the \
             presence and intensity of the symptom."
                .to_string(),
        ),
        fields: vec![
            symptom(
                "nauseaA",
                "Nausea A",
                "Do you experience nausea (e.g., stomach pain, acid reflux, or tension to vomit)?",
            ),
            symptom(
                "nauseaB",
                "Nausea B",
                "Do you experience dizziness (e.g., light-headedness or spinning feeling)?",
            ),
            symptom(
                "vestibularA",
                "Vestibular A",
                "Do you experience disorientation (e.g., spatial confusion or vertigo)?",
            ),
            symptom(
                "vestibularB",
                "Vestibular B",
                "Do you experience postural instability (i.e., imbalance)?",
            ),
            symptom(
                "oculomotorA",
                "Oculomotor A",
                "Do you experience a visually induced fatigue (e.g., feeling of tiredness or sleepiness)?",
            ),
            symptom(
                "oculomotorB",
                "Oculomotor B",
                "Do you experience a visually induced discomfort (e.g., eyestrain, blurred vision, or headache)?",
            ),
        ],
    }
}

/// Range used by every NASA-TLX subscale.
pub const TLX_RANGE_MAX: i64 = 100;

fn nasa_tlx() -> FormSchema {
    let scale = |id: &str, question: &str| FieldSpec {
        id: id.to_string(),
        question: question.to_string(),
        kind: FieldKind::Scale {
            min: 0,
            max: TLX_RANGE_MAX,
            default: Some(0),
            min_label: Some("Very Low".to_string()),
            max_label: Some("Very High".to_string()),
        },
        has_comment: false,
        comment_placeholder: None,
    };

    FormSchema {
        name: Instrument::NasaTlx.schema_name().to_string(),
        instrument: Instrument::NasaTlx,
        title: "NASA Task Load Index (TLX)".to_string(),
        description: Some(
            "Rate the following aspects of the task from 0 (Very Low) to 100 (Very High)."
                .to_string(),
        ),
        fields: vec![
            scale("mentalDemand", "How mentally demanding was the task?"),
            scale("physicalDemand", "How physically demanding was the task?"),
            scale(
                "temporalDemand",
                "How hurried or rushed was the pace of the task?",
            ),
            scale(
                "performance",
                "How successful were you in accomplishing what you were asked to do?",
            ),
            scale(
                "effort",
                "How hard did you have to work to accomplish your level of performance?",
            ),
            scale(
                "frustration",
                "How insecure, discouraged, irritated, stressed, and annoyed were you?",
            ),
        ],
    }
}

const AGREEMENT_LABELS: [&str; 7] = [
    "Strongly disagree",
    "Disagree",
    "Somewhat disagree",
    "Neither agree or disagree",
    "Somewhat agree",
    "Agree",
    "Strongly agree",
];

fn usability() -> FormSchema {
    let likert = |id: &str, question: &str| choice(id, question, &AGREEMENT_LABELS);

    FormSchema {
        name: Instrument::Usability.schema_name().to_string(),
        instrument: Instrument::Usability,
        title: "Usability Questionnaire".to_string(),
        description: None,
        fields: vec![
            likert("headControl", "I felt in control of the head rotation."),
            likert("comfort", "I felt comfortable using the technique."),
            likert("easyTarget", "It was easy to select targets."),
            likert("preciseTarget", "I could select targets precisely."),
            likert(
                "mismatch",
                "I did not experience an uncomfortable mismatch between my physical head \
                 movement and the resulting virtual rotation.",
            ),
            likert(
                "applicability",
                "The technique of rotating my head like this in a VR environment is applicable.",
            ),
            likert("natural", "Rotating the head with the technique is natural."),
        ],
    }
}

fn demographic() -> FormSchema {
    FormSchema {
        name: Instrument::Demographic.schema_name().to_string(),
        instrument: Instrument::Demographic,
        title: "Demographic Questionnaire".to_string(),
        description: None,
        fields: vec![
            FieldSpec {
                id: "age".to_string(),
                question: "What is your age?".to_string(),
                kind: FieldKind::Text {
                    placeholder: Some("Enter your age".to_string()),
                },
                has_comment: false,
                comment_placeholder: None,
            },
            with_comment(
                choice(
                    "gender",
                    "What is your gender?",
                    &[
                        "Male",
                        "Female",
                        "Non-binary/Third gender",
                        "Prefer not to say",
                        "Other",
                    ],
                ),
                "If 'Other', please specify",
            ),
            with_comment(
                choice(
                    "vrExperience",
                    "How much prior experience do you have with Virtual Reality (VR)?",
                    &[
                        "None",
                        "Limited (tried it a few times)",
                        "Moderate (regular user)",
                        "Extensive (expert)",
                    ],
                ),
                "Please specify more details for each VR motion you experienced",
            ),
            with_comment(
                choice(
                    "gamingExperience",
                    "How much experience do you have with 3D/Gaming?",
                    &["None", "Casual", "Moderate", "Extensive"],
                ),
                "Please specify your gaming or 3D experience",
            ),
        ],
    }
}
