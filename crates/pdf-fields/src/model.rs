//! Authoritative list of custom fields
//!
//! All mutations are keyed by [`FieldId`]. Mutating an id that no longer exists
//! is silently ignored, so a late event for a deleted field never fails.

use std::collections::HashSet;

use crate::field::{CustomField, Field, FieldId};
use crate::service::FieldRequest;
use crate::transform::{self, ViewportPoint};
use crate::types::*;

/// Per-type display name counters. Counters only grow: a name is never issued twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameCounters {
    text: u32,
    checkbox: u32,
    radio: u32,
}

impl NameCounters {
    /// Issue the next display name for `field_type`, e.g. "Texte 3"
    pub fn next_name(&mut self, field_type: FieldType) -> String {
        let counter = match field_type {
            FieldType::Text => &mut self.text,
            FieldType::Checkbox => &mut self.checkbox,
            FieldType::Radio => &mut self.radio,
        };
        *counter += 1;
        format!("{} {}", field_type.label(), counter)
    }

    /// Number of names issued so far for `field_type`
    pub fn issued(&self, field_type: FieldType) -> u32 {
        match field_type {
            FieldType::Text => self.text,
            FieldType::Checkbox => self.checkbox,
            FieldType::Radio => self.radio,
        }
    }
}

/// Sequential field id source. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    pub fn next_id(&mut self) -> FieldId {
        let id = FieldId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ModelParts"))]
pub struct FieldModel {
    fields: Vec<CustomField>,
    counters: NameCounters,
    ids: IdGenerator,
}

/// Unchecked shape of a stored model
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ModelParts {
    fields: Vec<CustomField>,
    counters: NameCounters,
    ids: IdGenerator,
}

#[cfg(feature = "serde")]
impl TryFrom<ModelParts> for FieldModel {
    type Error = FieldsError;

    fn try_from(parts: ModelParts) -> Result<Self> {
        let model = Self {
            fields: parts.fields,
            counters: parts.counters,
            ids: parts.ids,
        };
        model.check()?;
        Ok(model)
    }
}

impl FieldModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field from a drop at `at`, the field's top-left corner in
    /// viewport space, and append it.
    ///
    /// # Arguments
    /// * `field_type` - Kind of field, which also decides its default size
    /// * `at` - Drop point in viewport pixels
    /// * `page` - Zero-based page index
    /// * `page_height` - Height of that page in points
    /// * `scale` - Display scale of that page
    pub fn add(
        &mut self,
        field_type: FieldType,
        at: ViewportPoint,
        page: usize,
        page_height: f32,
        scale: f32,
    ) -> &CustomField {
        let (width, height) = field_type.default_size();
        let (x, y) = transform::viewport_to_pdf_origin(at, height, page_height, scale);
        let id = self.ids.next_id();
        let name = self.counters.next_name(field_type);
        log::debug!("Adding {} '{}' on page {} at ({:.1}, {:.1})", field_type, name, page, x, y);
        self.fields.push(CustomField::new(
            id,
            name,
            field_type,
            Rect::new(x, y, width, height),
            page,
            page_height,
        ));
        &self.fields[self.fields.len() - 1]
    }

    /// Translate a field by a PDF-space delta. No bounds clamping: a field may
    /// be moved off the page. Returns `false` when nothing changed.
    pub fn move_by(&mut self, id: FieldId, dx: f32, dy: f32) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        match self.get_mut(id) {
            Some(field) => {
                field.translate(dx, dy);
                true
            }
            None => false,
        }
    }

    /// Replace the name with the trimmed input. Empty or unchanged input is a no-op.
    pub fn rename(&mut self, id: FieldId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match self.get_mut(id) {
            Some(field) if field.name() != name => {
                field.set_name(name.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn set_value(&mut self, id: FieldId, value: Option<String>) -> bool {
        match self.get_mut(id) {
            Some(field) => {
                field.set_value(value);
                true
            }
            None => false,
        }
    }

    pub fn reassign(&mut self, id: FieldId, signer: SignerRole) -> bool {
        match self.get_mut(id) {
            Some(field) => {
                field.set_assigned_to(signer);
                true
            }
            None => false,
        }
    }

    /// Delete a field. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: FieldId) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.id() != id);
        before != self.fields.len()
    }

    /// Drop every field. Counters and ids keep running so names and ids stay
    /// unique for the whole editing session.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn get(&self, id: FieldId) -> Option<&CustomField> {
        self.fields.iter().find(|f| f.id() == id)
    }

    fn get_mut(&mut self, id: FieldId) -> Option<&mut CustomField> {
        self.fields.iter_mut().find(|f| f.id() == id)
    }

    /// Fields in creation order
    pub fn fields(&self) -> &[CustomField] {
        &self.fields
    }

    pub fn on_page(&self, page: usize) -> impl Iterator<Item = &CustomField> {
        self.fields.iter().filter(move |f| f.page() == page)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn counters(&self) -> &NameCounters {
        &self.counters
    }

    /// Verify that ids are unique and below the next id, and that every
    /// counter has issued at least as many names as there are fields of its
    /// type. A model restored from disk must pass this before it can issue new
    /// ids and names.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            let id = field.id();
            if !seen.insert(id) {
                return Err(FieldsError::InconsistentModel(format!(
                    "field id {} is used twice",
                    id
                )));
            }
            if id.0 >= self.ids.next {
                return Err(FieldsError::InconsistentModel(format!(
                    "field id {} is not below the next id {}",
                    id, self.ids.next
                )));
            }
        }
        for field_type in [FieldType::Text, FieldType::Checkbox, FieldType::Radio] {
            let count = self.fields.iter().filter(|f| f.field_type() == field_type).count();
            let issued = self.counters.issued(field_type);
            if count > issued as usize {
                return Err(FieldsError::InconsistentModel(format!(
                    "{} {} fields but only {} names issued",
                    count, field_type, issued
                )));
            }
        }
        Ok(())
    }

    /// Fields as sent to the flatten operation (no id, no assignment)
    pub fn flatten_requests(&self) -> Vec<FieldRequest> {
        self.fields
            .iter()
            .map(|f| FieldRequest::from_field(f, None))
            .collect()
    }

    /// Fields as sent to workflow creation.
    ///
    /// Signing keys submitted values by field name, so names must be unique.
    pub fn workflow_requests(&self) -> Result<Vec<FieldRequest>> {
        if self.fields.is_empty() {
            return Err(FieldsError::NoFields);
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name()) {
                return Err(FieldsError::DuplicateFieldName(field.name().to_string()));
            }
        }
        Ok(self
            .fields
            .iter()
            .map(|f| FieldRequest::from_field(f, Some(f.assigned_to())))
            .collect())
    }
}
