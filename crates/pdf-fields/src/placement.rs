//! Pointer gestures turned into field model mutations
//!
//! Two gestures exist:
//! - palette drop: a field-type token dropped on a page creates a field
//! - move: pointer-down on a field's handle, pointer-moves, pointer-up
//!
//! Missing preconditions (unknown token, page not measured yet, unknown page
//! height) make a gesture a no-op. Dragging over a page that is still loading
//! is expected, not an error.

use crate::field::{ExtractedField, Field, FieldId};
use crate::geometry::PageGeometry;
use crate::model::FieldModel;
use crate::transform::{self, ViewportPoint};
use crate::types::FieldType;

/// Handle a palette drop on `page` at viewport point `at`.
///
/// Returns the id of the created field, or `None` when a precondition is missing.
pub fn drop_field(
    model: &mut FieldModel,
    geometry: &PageGeometry,
    extracted: &[ExtractedField],
    token: Option<&str>,
    page: usize,
    at: ViewportPoint,
) -> Option<FieldId> {
    let Some(field_type) = token.and_then(FieldType::from_token) else {
        log::debug!("Ignoring drop without a field type token: {:?}", token);
        return None;
    };
    let Some(scale) = geometry.scale(page) else {
        log::debug!("Ignoring drop on page {}: not measured yet", page);
        return None;
    };
    let Some(page_height) = geometry.page_height(page, extracted) else {
        log::debug!("Ignoring drop on page {}: unknown page height", page);
        return None;
    };
    let field = model.add(field_type, at, page, page_height, scale);
    if let Some(page_width) = geometry.page_width(page) {
        if !field.rect().fits_page(page_width, page_height) {
            log::warn!("{} extends past the edge of page {}", field.name(), page);
        }
    }
    Some(field.id())
}

/// Explicit state of the move gesture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        id: FieldId,
        /// Last pointer position a delta was taken from
        anchor: ViewportPoint,
    },
}

#[derive(Debug, Clone, Default)]
pub struct PlacementController {
    gesture: Gesture,
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Capture the pointer on a field's drag handle. Returns `false` if the
    /// field does not exist.
    pub fn pointer_down(&mut self, model: &FieldModel, id: FieldId, at: ViewportPoint) -> bool {
        if model.get(id).is_none() {
            return false;
        }
        self.gesture = Gesture::Dragging { id, anchor: at };
        true
    }

    /// Move the captured field by the delta since the last pointer position.
    ///
    /// The anchor advances on every call so motion accumulates independently of
    /// the event rate. Returns `true` when the model changed.
    pub fn pointer_move(
        &mut self,
        model: &mut FieldModel,
        geometry: &PageGeometry,
        at: ViewportPoint,
    ) -> bool {
        let Gesture::Dragging { id, anchor } = self.gesture else {
            return false;
        };
        let Some(page) = model.get(id).map(|f| f.page()) else {
            // Deleted while dragging
            self.gesture = Gesture::Idle;
            return false;
        };
        self.gesture = Gesture::Dragging { id, anchor: at };

        let (dx, dy) = (at.x - anchor.x, at.y - anchor.y);
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let Some(scale) = geometry.scale(page) else {
            return false;
        };
        let (pdf_dx, pdf_dy) = transform::to_pdf_delta(dx, dy, scale);
        model.move_by(id, pdf_dx, pdf_dy)
    }

    /// Release the pointer and return the field that was being dragged.
    pub fn pointer_up(&mut self) -> Option<FieldId> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { id, .. } => Some(id),
            Gesture::Idle => None,
        }
    }

    /// Abort a drag of `id`, e.g. because the field was deleted.
    pub fn cancel_if(&mut self, id: FieldId) {
        if matches!(self.gesture, Gesture::Dragging { id: current, .. } if current == id) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }
}
