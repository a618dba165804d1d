//! Field representations
//!
//! Three kinds of fields share the [`Field`] capability:
//! - [`ExtractedField`]: detected in the source PDF by the service, read-only
//! - [`CustomField`]: placed by the document owner, mutated only through
//!   [`FieldModel`](crate::FieldModel)
//! - [`WorkflowField`]: frozen copy of a custom field inside a workflow

use std::fmt;

use crate::types::{FieldType, Rect, SignerRole};

/// Common read access to any field
pub trait Field {
    fn name(&self) -> &str;
    fn field_type(&self) -> FieldType;
    fn value(&self) -> Option<&str>;
    fn rect(&self) -> Rect;
    /// Zero-based page index
    fn page(&self) -> usize;
    /// Height of the parent page in PDF points
    fn page_height(&self) -> f32;

    fn is_checked(&self) -> bool {
        self.value() == Some("true")
    }
}

/// Identifier of a custom field, unique within one editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A form field already present in the source PDF
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ExtractedField {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub field_type: FieldType,
    pub value: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub rect: Rect,
    pub page: usize,
    pub page_height: f32,
}

impl Field for ExtractedField {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_type(&self) -> FieldType {
        self.field_type
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn page(&self) -> usize {
        self.page
    }

    fn page_height(&self) -> f32 {
        self.page_height
    }
}

/// A field placed by the user in the editor.
///
/// Fields are private: every mutation goes through `FieldModel` so ids stay
/// unique and creation order stays append-only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CustomField {
    id: FieldId,
    name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    field_type: FieldType,
    value: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    rect: Rect,
    page: usize,
    page_height: f32,
    assigned_to: SignerRole,
}

impl CustomField {
    pub(crate) fn new(
        id: FieldId,
        name: String,
        field_type: FieldType,
        rect: Rect,
        page: usize,
        page_height: f32,
    ) -> Self {
        Self {
            id,
            name,
            field_type,
            value: None,
            rect,
            page,
            page_height,
            assigned_to: SignerRole::default(),
        }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn assigned_to(&self) -> SignerRole {
        self.assigned_to
    }

    pub(crate) fn translate(&mut self, dx: f32, dy: f32) {
        self.rect.x += dx;
        self.rect.y += dy;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    pub(crate) fn set_assigned_to(&mut self, signer: SignerRole) {
        self.assigned_to = signer;
    }
}

impl Field for CustomField {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_type(&self) -> FieldType {
        self.field_type
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn page(&self) -> usize {
        self.page
    }

    fn page_height(&self) -> f32 {
        self.page_height
    }
}

/// A custom field frozen into a workflow. Only `value` changes, and only
/// through a signer's submission.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WorkflowField {
    /// Server-assigned identifier
    pub id: u64,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub field_type: FieldType,
    pub assigned_to: SignerRole,
    pub value: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub rect: Rect,
    pub page: usize,
    pub page_height: f32,
}

impl Field for WorkflowField {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_type(&self) -> FieldType {
        self.field_type
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn page(&self) -> usize {
        self.page
    }

    fn page_height(&self) -> f32 {
        self.page_height
    }
}
