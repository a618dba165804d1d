use std::collections::BTreeMap;

use crate::field::{Field, WorkflowField};
use crate::service::{SignRequest, WorkflowId};
use crate::types::*;
use crate::workflow::Workflow;

/// Editing context of one signer over a workflow.
///
/// Every field is visible, but only the signer's own fields accept values.
/// Values stay local until [`SignerSession::submit`] builds the batch.
#[derive(Debug, Clone)]
pub struct SignerSession {
    workflow_id: WorkflowId,
    signer: SignerRole,
    fields: Vec<WorkflowField>,
    values: BTreeMap<String, String>,
}

impl SignerSession {
    /// Open a session for `signer`. Fails unless the workflow is waiting for them.
    pub fn open(workflow: &Workflow, signer: SignerRole) -> Result<Self> {
        if workflow.status().pending_signer() != Some(signer) {
            return Err(FieldsError::NotSignersTurn {
                signer,
                status: workflow.status(),
            });
        }
        let values = workflow
            .fields_of(signer)
            .map(|f| {
                let value = match (&f.value, f.field_type.is_toggle()) {
                    (Some(value), _) => value.clone(),
                    (None, true) => false.to_string(),
                    (None, false) => String::new(),
                };
                (f.name.clone(), value)
            })
            .collect();
        Ok(Self {
            workflow_id: workflow.id(),
            signer,
            fields: workflow.fields().to_vec(),
            values,
        })
    }

    pub fn workflow_id(&self) -> WorkflowId {
        self.workflow_id
    }

    pub fn signer(&self) -> SignerRole {
        self.signer
    }

    pub fn fields(&self) -> &[WorkflowField] {
        &self.fields
    }

    pub fn fields_on_page(&self, page: usize) -> impl Iterator<Item = &WorkflowField> {
        self.fields.iter().filter(move |f| f.page == page)
    }

    pub fn is_editable(&self, field: &WorkflowField) -> bool {
        field.assigned_to == self.signer
    }

    /// Value to show: the local edit for owned fields, the server value otherwise.
    pub fn display_value<'a>(&'a self, field: &'a WorkflowField) -> Option<&'a str> {
        if self.is_editable(field) {
            self.values.get(&field.name).map(String::as_str)
        } else {
            field.value()
        }
    }

    /// Whether a checkbox or radio field shows as checked
    pub fn is_checked(&self, field: &WorkflowField) -> bool {
        field.field_type.is_toggle() && self.display_value(field) == Some("true")
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FieldsError::UnknownField(name.to_string()))?;
        if !self.is_editable(field) {
            return Err(FieldsError::FieldNotOwned(name.to_string()));
        }
        self.values.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) -> Result<()> {
        self.set_value(name, checked.to_string())
    }

    /// Build the full batch of this signer's values.
    pub fn submit(&self) -> SignRequest {
        SignRequest {
            signer_role: self.signer,
            field_values: self.values.clone(),
        }
    }
}
