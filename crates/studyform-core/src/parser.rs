//! TOML study design parser.
//!
//! Loads study designs (groups of placed instruments) from TOML files and
//! validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::StudyLayout;
use crate::model::{FormInstance, GroupRole, InstanceId, Instrument};

/// Participant fields a reset returns to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBaseline {
    pub name: String,
    pub comment: String,
}

/// One instrument placed in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPlacement {
    pub instrument: Instrument,
    pub task: String,
}

/// An experimental condition and the forms administered under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDesign {
    pub id: String,
    pub role: GroupRole,
    pub forms: Vec<FormPlacement>,
}

/// The form sequence a session is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDesign {
    pub name: String,
    pub baseline: ParticipantBaseline,
    pub groups: Vec<GroupDesign>,
}

impl StudyDesign {
    /// Mint a fresh instance for every placement and lay them out by group.
    pub fn instantiate(&self) -> (Vec<FormInstance>, StudyLayout) {
        let mut instances = Vec::new();
        let mut layout = StudyLayout::default();

        for group in &self.groups {
            layout.add_group(&group.id, group.role);
            for form in &group.forms {
                let instance = FormInstance {
                    id: InstanceId::new(),
                    instrument: form.instrument,
                    task: form.task.clone(),
                    group: group.id.clone(),
                };
                layout.push_member(&group.id, instance.id);
                instances.push(instance);
            }
        }

        (instances, layout)
    }

    pub fn form_count(&self) -> usize {
        self.groups.iter().map(|g| g.forms.len()).sum()
    }
}

#[derive(Debug, Deserialize)]
struct TomlStudyFile {
    study: TomlStudyHeader,
    #[serde(default)]
    groups: Vec<TomlGroup>,
}

#[derive(Debug, Deserialize)]
struct TomlStudyHeader {
    name: String,
    #[serde(default)]
    default_participant: String,
    #[serde(default)]
    default_comment: String,
}

#[derive(Debug, Deserialize)]
struct TomlGroup {
    id: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    forms: Vec<TomlForm>,
}

#[derive(Debug, Deserialize)]
struct TomlForm {
    instrument: String,
    #[serde(default)]
    task: Option<String>,
}

/// Parse a single TOML file into a `StudyDesign`.
pub fn parse_study_design(path: &Path) -> Result<StudyDesign> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read study design: {}", path.display()))?;

    parse_study_design_str(&content, path)
}

/// Parse a TOML string into a `StudyDesign` (useful for testing).
pub fn parse_study_design_str(content: &str, source_path: &Path) -> Result<StudyDesign> {
    let parsed: TomlStudyFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let groups = parsed
        .groups
        .into_iter()
        .map(|g| {
            let role = g
                .role
                .as_deref()
                .map(|r| {
                    r.parse::<GroupRole>()
                        .map_err(|e| anyhow::anyhow!("group '{}': {}", g.id, e))
                })
                .transpose()?
                .unwrap_or_default();

            let forms = g
                .forms
                .into_iter()
                .map(|f| {
                    let instrument: Instrument = f
                        .instrument
                        .parse()
                        .map_err(|e: String| anyhow::anyhow!("group '{}': {}", g.id, e))?;
                    Ok(FormPlacement {
                        instrument,
                        task: f
                            .task
                            .unwrap_or_else(|| format!("{} {}", instrument, g.id)),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(GroupDesign {
                id: g.id,
                role,
                forms,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StudyDesign {
        name: parsed.study.name,
        baseline: ParticipantBaseline {
            name: parsed.study.default_participant,
            comment: parsed.study.default_comment,
        },
        groups,
    })
}

/// A warning from study design validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The group ID (if applicable).
    pub group_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a study design for common issues.
pub fn validate_study_design(design: &StudyDesign) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if design.baseline.name.trim().is_empty() {
        warnings.push(ValidationWarning {
            group_id: None,
            message: "no default_participant; reset keeps the current participant name".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for group in &design.groups {
        if !seen_ids.insert(&group.id) {
            warnings.push(ValidationWarning {
                group_id: Some(group.id.clone()),
                message: format!("duplicate group ID: {}", group.id),
            });
        }
        if group.forms.is_empty() {
            warnings.push(ValidationWarning {
                group_id: Some(group.id.clone()),
                message: "group has no forms".into(),
            });
        }
        for form in &group.forms {
            if form.task.trim().is_empty() {
                warnings.push(ValidationWarning {
                    group_id: Some(group.id.clone()),
                    message: format!("{} form has an empty task label", form.instrument),
                });
            }
        }
    }

    let baselines: Vec<&GroupDesign> = design
        .groups
        .iter()
        .filter(|g| g.role == GroupRole::Baseline)
        .collect();
    if baselines.len() > 1 {
        warnings.push(ValidationWarning {
            group_id: None,
            message: format!(
                "{} baseline groups; only the first baseline CSQ-VR form is used",
                baselines.len()
            ),
        });
    }

    let has_csq = design
        .groups
        .iter()
        .flat_map(|g| &g.forms)
        .any(|f| f.instrument == Instrument::CsqVr);
    let has_baseline_csq = baselines
        .iter()
        .flat_map(|g| &g.forms)
        .any(|f| f.instrument == Instrument::CsqVr);
    if has_csq && !has_baseline_csq {
        warnings.push(ValidationWarning {
            group_id: None,
            message: "CSQ-VR forms present but no baseline group contains one; \
                      the CSQ-VR export will fail"
                .into(),
        });
    }

    warnings
}
