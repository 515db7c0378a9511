//! Live session state: participant identity, placed forms and their responses.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StudyError;
use crate::layout::StudyLayout;
use crate::model::{FormInstance, FormSchema, InstanceId, ResponseRecord, ResponseValue};
use crate::parser::{ParticipantBaseline, StudyDesign};

/// What a reset does to form identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Keep instance ids; the reset session can still be matched against its
    /// saved history form by form.
    #[default]
    PreserveInstances,
    /// Mint new instance ids for every form.
    FreshInstances,
}

/// One participant's in-progress session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: Uuid,
    pub participant_name: String,
    #[serde(default)]
    pub overall_comment: String,
    #[serde(default)]
    pub study_name: String,
    pub instances: Vec<FormInstance>,
    pub layout: StudyLayout,
    /// Responses keyed by instance identity, never by display position.
    #[serde(default)]
    pub responses: HashMap<InstanceId, ResponseRecord>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Start a session for `participant_name` over a fresh instantiation of `design`.
    pub fn create(
        participant_name: &str,
        comment: &str,
        design: &StudyDesign,
    ) -> Result<Self, StudyError> {
        let (instances, layout) = design.instantiate();
        let mut session = Self::new(participant_name, comment, instances, layout)?;
        session.study_name = design.name.clone();
        Ok(session)
    }

    /// Start a session over an already-built instance set.
    pub fn new(
        participant_name: &str,
        comment: &str,
        instances: Vec<FormInstance>,
        layout: StudyLayout,
    ) -> Result<Self, StudyError> {
        if participant_name.trim().is_empty() {
            return Err(StudyError::InvalidParticipant);
        }

        let session = Self {
            id: Uuid::new_v4(),
            participant_name: participant_name.to_string(),
            overall_comment: comment.to_string(),
            study_name: String::new(),
            instances,
            layout,
            responses: HashMap::new(),
            updated_at: Utc::now(),
        };
        tracing::info!(
            session = %session.id,
            forms = session.instances.len(),
            "created session for {}",
            session.participant_name
        );
        Ok(session)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&FormInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn record(&self, id: InstanceId) -> Option<&ResponseRecord> {
        self.responses.get(&id)
    }

    /// Seed an instance's record from its schema the first time the form is
    /// opened. Existing responses are left alone.
    pub fn open_form(&mut self, id: InstanceId, schema: &FormSchema) -> Result<(), StudyError> {
        if self.instance(id).is_none() {
            return Err(StudyError::UnknownInstance(id));
        }
        if !self.responses.contains_key(&id) {
            self.responses.insert(id, schema.seeded_record());
            self.touch();
        }
        Ok(())
    }

    /// Upsert one field's selection or comment for an instance.
    ///
    /// The value is stored as given; domain checks belong to the caller.
    pub fn record_response(
        &mut self,
        id: InstanceId,
        field_id: &str,
        value: ResponseValue,
    ) -> Result<(), StudyError> {
        if self.instance(id).is_none() {
            return Err(StudyError::UnknownInstance(id));
        }
        tracing::debug!(instance = %id, field = field_id, ?value, "recording response");
        self.responses.entry(id).or_default().apply(field_id, value);
        self.touch();
        Ok(())
    }

    pub fn set_participant(&mut self, name: &str, comment: &str) -> Result<(), StudyError> {
        if name.trim().is_empty() {
            return Err(StudyError::InvalidParticipant);
        }
        self.participant_name = name.to_string();
        self.overall_comment = comment.to_string();
        self.touch();
        Ok(())
    }

    /// Deep copy for persistence.
    pub fn snapshot(&self) -> SessionState {
        self.clone()
    }

    /// Rebuild a live session from a snapshot.
    ///
    /// Responses for instances the snapshot no longer contains are dropped.
    pub fn restore(snapshot: SessionState) -> SessionState {
        let mut session = snapshot;
        let known: Vec<InstanceId> = session.instances.iter().map(|i| i.id).collect();
        let before = session.responses.len();
        session.responses.retain(|id, _| known.contains(id));
        let dropped = before - session.responses.len();
        if dropped > 0 {
            tracing::warn!(
                session = %session.id,
                dropped,
                "discarded responses for instances missing from snapshot"
            );
        }
        session
    }

    /// Return to the study's participant defaults and clear every response.
    ///
    /// The reset session gets a new session id so saving it never overwrites
    /// the history it came from. A blank baseline name keeps the current
    /// participant name, so a session is never left unnamed.
    pub fn reset(&mut self, baseline: &ParticipantBaseline, policy: ResetPolicy) {
        self.id = Uuid::new_v4();
        let name = baseline.name.trim();
        if name.is_empty() {
            tracing::warn!("study has no default participant; keeping the current name");
        } else {
            self.participant_name = name.to_string();
        }
        self.overall_comment = baseline.comment.clone();
        self.responses.clear();

        if policy == ResetPolicy::FreshInstances {
            for instance in &mut self.instances {
                let fresh = InstanceId::new();
                self.layout.rename_member(instance.id, fresh);
                instance.id = fresh;
            }
        }

        self.touch();
        tracing::info!(session = %self.id, ?policy, "session reset");
    }

    /// Instances in display order.
    pub fn display_order(&self) -> Vec<&FormInstance> {
        self.layout.display_order(&self.instances)
    }

    /// Resolve a 1-based display position to the instance currently shown there.
    pub fn resolve_position(&self, position: usize) -> Option<InstanceId> {
        position
            .checked_sub(1)
            .and_then(|idx| self.display_order().get(idx).map(|i| i.id))
    }

    /// Trailing digits of the participant name ("P 12" gives "12"), or the
    /// trimmed name when it does not end in a number.
    pub fn subject_number(&self) -> &str {
        let trimmed = self.participant_name.trim();
        let digits_start = trimmed
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i);
        match digits_start {
            Some(start) => &trimmed[start..],
            None => trimmed,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
