//! Contract with the PDF service
//!
//! Parsing, rasterization, flattening and signing all happen behind
//! [`PdfService`]. Implementations are blocking; callers on an event loop run
//! them on a blocking task.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::field::{ExtractedField, Field};
use crate::types::*;
use crate::workflow::Workflow;

/// Leading bytes of every PDF file
pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Server-assigned workflow identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WorkflowId(pub u64);

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rendered page raster and its intrinsic pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// Encoded image bytes (PNG from the reference service)
    pub data: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// Result of the extract operation
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub file_name: String,
    pub total_fields: usize,
    pub fields: Vec<ExtractedField>,
    pub pages: Vec<PageImage>,
}

/// One field as sent to the flatten and create-workflow operations
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FieldRequest {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub field_type: FieldType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub page: usize,
    pub page_height: f32,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub assigned_to: Option<SignerRole>,
}

impl FieldRequest {
    pub fn from_field(field: &impl Field, assigned_to: Option<SignerRole>) -> Self {
        let rect = field.rect();
        Self {
            name: field.name().to_string(),
            field_type: field.field_type(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            page: field.page(),
            page_height: field.page_height(),
            assigned_to,
        }
    }
}

/// A signer's complete batch of values, keyed by field name
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SignRequest {
    pub signer_role: SignerRole,
    pub field_values: BTreeMap<String, String>,
}

/// Operations offered by the PDF service
pub trait PdfService {
    fn extract(&self, file_name: &str, pdf: &[u8]) -> std::result::Result<ExtractionResult, ServiceError>;

    /// Flatten `fields` into the document and return the new PDF
    fn add_fields(
        &self,
        file_name: &str,
        pdf: &[u8],
        fields: &[FieldRequest],
    ) -> std::result::Result<Vec<u8>, ServiceError>;

    fn create_workflow(
        &self,
        file_name: &str,
        pdf: &[u8],
        fields: &[FieldRequest],
    ) -> std::result::Result<Workflow, ServiceError>;

    fn get_workflow(&self, id: WorkflowId) -> std::result::Result<Workflow, ServiceError>;

    fn download_workflow(&self, id: WorkflowId) -> std::result::Result<Vec<u8>, ServiceError>;

    fn sign(&self, id: WorkflowId, request: &SignRequest) -> std::result::Result<(), ServiceError>;
}

/// Reject anything that is not a PDF before a request is issued.
///
/// A file is accepted when it has a `.pdf` extension or starts with the PDF signature.
pub fn ensure_pdf(file_name: &str, bytes: &[u8]) -> std::result::Result<(), ServiceError> {
    let has_extension = Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if bytes.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{} is empty", file_name)));
    }
    if has_extension || bytes.starts_with(PDF_SIGNATURE) {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(
            "Please select a PDF file.".to_string(),
        ))
    }
}
