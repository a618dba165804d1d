//! JSON shapes exchanged with the PDF service
//!
//! Responses carry page rasters as base64 strings; they are decoded here and
//! measured so the core only ever sees [`PageImage`] values.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageReader;
use pdf_fields::{
    ExtractedField, ExtractionResult, FieldType, PageImage, Rect, SignerRole, Workflow,
    WorkflowField, WorkflowId, WorkflowStatus, transform,
};
use serde::Deserialize;

use crate::types::*;

/// Response of `POST /api/pdf/extract`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireExtraction {
    pub file_name: String,
    pub total_fields: usize,
    #[serde(default)]
    pub fields: Vec<WireField>,
    #[serde(default)]
    pub pages_base64: Vec<String>,
}

/// A detected field. Older services only send name, type, value and origin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub value: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub page_height: Option<f32>,
}

/// Response of the workflow endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWorkflow {
    pub id: u64,
    pub file_name: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub fields: Vec<WireWorkflowField>,
    #[serde(default)]
    pub pages_base64: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWorkflowField {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub assigned_to: SignerRole,
    #[serde(default)]
    pub value: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub page: usize,
    pub page_height: f32,
}

/// Decode base64 page rasters and read their pixel size.
pub fn decode_pages(pages: &[String]) -> Result<Vec<PageImage>> {
    pages
        .iter()
        .enumerate()
        .map(|(page, encoded)| {
            let data = STANDARD.decode(encoded.trim())?;
            let (width_px, height_px) = ImageReader::new(Cursor::new(&data))
                .with_guessed_format()
                .map_err(|e| ClientError::Image {
                    page,
                    message: e.to_string(),
                })?
                .into_dimensions()
                .map_err(|e| ClientError::Image {
                    page,
                    message: e.to_string(),
                })?;
            Ok(PageImage {
                data,
                width_px,
                height_px,
            })
        })
        .collect()
}

impl WireExtraction {
    /// Convert to the core result.
    ///
    /// Missing sizes fall back to the type's default size; a missing page
    /// height is derived from the page image rendered at `render_dpi`.
    pub fn into_extraction(self, render_dpi: f32) -> Result<ExtractionResult> {
        let pages = decode_pages(&self.pages_base64)?;
        let fields = self
            .fields
            .into_iter()
            .map(|f| {
                let (default_w, default_h) = f.field_type.default_size();
                let page_height = f.page_height.unwrap_or_else(|| {
                    pages
                        .get(f.page)
                        .map(|p| transform::page_height_from_image(p.height_px as f32, render_dpi))
                        .unwrap_or_default()
                });
                ExtractedField {
                    name: f.name,
                    field_type: f.field_type,
                    value: f.value,
                    rect: Rect::new(
                        f.x,
                        f.y,
                        f.width.unwrap_or(default_w),
                        f.height.unwrap_or(default_h),
                    ),
                    page: f.page,
                    page_height,
                }
            })
            .collect();
        Ok(ExtractionResult {
            file_name: self.file_name,
            total_fields: self.total_fields,
            fields,
            pages,
        })
    }
}

impl WireWorkflow {
    pub fn into_workflow(self) -> Result<Workflow> {
        let pages = decode_pages(&self.pages_base64)?;
        let fields = self
            .fields
            .into_iter()
            .map(|f| WorkflowField {
                id: f.id,
                name: f.name,
                field_type: f.field_type,
                assigned_to: f.assigned_to,
                value: f.value,
                rect: Rect::new(f.x, f.y, f.width, f.height),
                page: f.page,
                page_height: f.page_height,
            })
            .collect();
        Ok(Workflow::new(
            WorkflowId(self.id),
            self.file_name,
            self.status,
            fields,
            pages,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[test]
    fn test_decode_pages_reads_dimensions() {
        let pages = decode_pages(&[PIXEL_PNG.to_string()]).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!((pages[0].width_px, pages[0].height_px), (1, 1));
    }

    #[test]
    fn test_decode_pages_rejects_garbage() {
        assert!(matches!(
            decode_pages(&["***".to_string()]),
            Err(ClientError::Base64(_))
        ));
        let not_an_image = STANDARD.encode(b"hello");
        assert!(matches!(
            decode_pages(&[not_an_image]),
            Err(ClientError::Image { page: 0, .. })
        ));
    }
}
