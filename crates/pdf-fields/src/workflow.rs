//! Two-party sequential signing workflow
//!
//! States follow a strict linear order:
//! `CREATED -> SIGNER_A_PENDING -> SIGNER_B_PENDING -> COMPLETED`.
//! [`next_status`] is the whole state machine; [`Workflow`] applies it to a
//! frozen field snapshot.

use std::collections::BTreeSet;
use std::fmt;

use crate::field::WorkflowField;
use crate::service::{PageImage, SignRequest, WorkflowId};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum WorkflowStatus {
    Created,
    SignerAPending,
    SignerBPending,
    Completed,
}

impl WorkflowStatus {
    /// Steps shown to the user, in order
    pub const STEPS: [WorkflowStatus; 3] = [
        WorkflowStatus::SignerAPending,
        WorkflowStatus::SignerBPending,
        WorkflowStatus::Completed,
    ];

    pub fn token(self) -> &'static str {
        match self {
            WorkflowStatus::Created => "CREATED",
            WorkflowStatus::SignerAPending => "SIGNER_A_PENDING",
            WorkflowStatus::SignerBPending => "SIGNER_B_PENDING",
            WorkflowStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "CREATED" => Some(WorkflowStatus::Created),
            "SIGNER_A_PENDING" => Some(WorkflowStatus::SignerAPending),
            "SIGNER_B_PENDING" => Some(WorkflowStatus::SignerBPending),
            "COMPLETED" => Some(WorkflowStatus::Completed),
            _ => None,
        }
    }

    /// Signer whose submission this status is waiting for
    pub fn pending_signer(self) -> Option<SignerRole> {
        match self {
            WorkflowStatus::SignerAPending => Some(SignerRole::SignerA),
            WorkflowStatus::SignerBPending => Some(SignerRole::SignerB),
            WorkflowStatus::Created | WorkflowStatus::Completed => None,
        }
    }

    /// Progress of `step` relative to this status
    pub fn step_state(self, step: WorkflowStatus) -> StepState {
        match step.cmp(&self) {
            std::cmp::Ordering::Less => StepState::Done,
            std::cmp::Ordering::Equal => StepState::Active,
            std::cmp::Ordering::Greater => StepState::Pending,
        }
    }

    /// The single action offered to the user at this status
    pub fn available_action(self) -> Option<WorkflowAction> {
        match self {
            WorkflowStatus::Created => None,
            WorkflowStatus::SignerAPending => Some(WorkflowAction::Sign(SignerRole::SignerA)),
            WorkflowStatus::SignerBPending => Some(WorkflowAction::Sign(SignerRole::SignerB)),
            WorkflowStatus::Completed => Some(WorkflowAction::Download),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Done,
    Active,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Sign(SignerRole),
    Download,
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningEvent {
    /// The document has been prepared with its fields
    Prepared,
    /// A signer submitted values for all of their fields
    Submitted(SignerRole),
}

impl fmt::Display for SigningEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningEvent::Prepared => f.write_str("prepared"),
            SigningEvent::Submitted(signer) => write!(f, "{} submitted", signer),
        }
    }
}

/// What to do with a pending step whose signer owns no field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmptyStepPolicy {
    /// The signer still has to submit (an empty batch)
    #[default]
    Require,
    /// The step is advanced automatically
    Skip,
}

/// The state machine. Never regresses and never skips a step.
pub fn next_status(current: WorkflowStatus, event: SigningEvent) -> Result<WorkflowStatus> {
    match (current, event) {
        (WorkflowStatus::Created, SigningEvent::Prepared) => Ok(WorkflowStatus::SignerAPending),
        (WorkflowStatus::SignerAPending, SigningEvent::Submitted(SignerRole::SignerA)) => {
            Ok(WorkflowStatus::SignerBPending)
        }
        (WorkflowStatus::SignerBPending, SigningEvent::Submitted(SignerRole::SignerB)) => {
            Ok(WorkflowStatus::Completed)
        }
        (from, event) => Err(FieldsError::InvalidTransition { from, event }),
    }
}

/// Advance through pending steps whose signer owns no field, when the policy allows it.
pub fn settle(
    mut status: WorkflowStatus,
    assignments: &[SignerRole],
    policy: EmptyStepPolicy,
) -> WorkflowStatus {
    if policy == EmptyStepPolicy::Require {
        return status;
    }
    while let Some(signer) = status.pending_signer() {
        if assignments.contains(&signer) {
            break;
        }
        match next_status(status, SigningEvent::Submitted(signer)) {
            Ok(next) => {
                log::info!("Skipping {} step: no assigned fields", signer);
                status = next;
            }
            Err(_) => break,
        }
    }
    status
}

/// Status a new workflow starts in once its document is prepared
pub fn initial_status(assignments: &[SignerRole], policy: EmptyStepPolicy) -> WorkflowStatus {
    // Created only ever accepts Prepared
    let prepared = next_status(WorkflowStatus::Created, SigningEvent::Prepared)
        .unwrap_or(WorkflowStatus::SignerAPending);
    settle(prepared, assignments, policy)
}

/// A server-tracked signing process over a frozen snapshot of fields
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    id: WorkflowId,
    file_name: String,
    status: WorkflowStatus,
    fields: Vec<WorkflowField>,
    pages: Vec<PageImage>,
}

impl Workflow {
    pub fn new(
        id: WorkflowId,
        file_name: String,
        status: WorkflowStatus,
        fields: Vec<WorkflowField>,
        pages: Vec<PageImage>,
    ) -> Self {
        Self {
            id,
            file_name,
            status,
            fields,
            pages,
        }
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn fields(&self) -> &[WorkflowField] {
        &self.fields
    }

    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }

    pub fn fields_of(&self, signer: SignerRole) -> impl Iterator<Item = &WorkflowField> {
        self.fields.iter().filter(move |f| f.assigned_to == signer)
    }

    /// Whether `other` carries the same frozen fields: ids, names, types,
    /// boxes, pages and assignments. Values may differ.
    pub fn same_snapshot(&self, other: &Workflow) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().zip(&other.fields).all(|(a, b)| {
                a.id == b.id
                    && a.name == b.name
                    && a.field_type == b.field_type
                    && a.rect == b.rect
                    && a.page == b.page
                    && a.page_height == b.page_height
                    && a.assigned_to == b.assigned_to
            })
    }

    fn assignments(&self) -> Vec<SignerRole> {
        self.fields.iter().map(|f| f.assigned_to).collect()
    }

    /// Apply a signer's batch and advance the state machine.
    ///
    /// The batch is all-or-nothing: it must come from the pending signer, name
    /// every field that signer owns, and name no other field. On error nothing
    /// is modified.
    pub fn apply_submission(
        &mut self,
        request: &SignRequest,
        policy: EmptyStepPolicy,
    ) -> Result<WorkflowStatus> {
        let signer = request.signer_role;
        let next = next_status(self.status, SigningEvent::Submitted(signer)).map_err(|_| {
            FieldsError::NotSignersTurn {
                signer,
                status: self.status,
            }
        })?;

        let owned: BTreeSet<&str> = self.fields_of(signer).map(|f| f.name.as_str()).collect();
        if let Some(foreign) = request
            .field_values
            .keys()
            .find(|name| !owned.contains(name.as_str()))
        {
            return Err(if self.fields.iter().any(|f| &f.name == foreign) {
                FieldsError::FieldNotOwned(foreign.clone())
            } else {
                FieldsError::UnknownField(foreign.clone())
            });
        }
        let missing: Vec<String> = owned
            .iter()
            .filter(|name| !request.field_values.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FieldsError::IncompleteSubmission(missing));
        }

        for field in self.fields.iter_mut().filter(|f| f.assigned_to == signer) {
            if let Some(value) = request.field_values.get(&field.name) {
                field.value = Some(value.clone());
            }
        }
        self.status = settle(next, &self.assignments(), policy);
        log::info!("Workflow {} is now {}", self.id, self.status);
        Ok(self.status)
    }
}
