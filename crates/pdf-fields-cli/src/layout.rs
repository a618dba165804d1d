//! Editable field layout persisted between CLI invocations

use std::path::Path;

use anyhow::{Context, Result};
use pdf_fields::{
    ExtractedField, ExtractionResult, FieldModel, PageGeometry, PageImage, WorkflowId,
};
use serde::{Deserialize, Serialize};

/// Pixel size of a rendered page image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub file_name: String,
    pub render_dpi: f32,
    pub pages: Vec<PageSize>,
    pub extracted: Vec<ExtractedField>,
    pub fields: FieldModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
}

impl Layout {
    pub fn from_extraction(result: &ExtractionResult, render_dpi: f32) -> Self {
        Self {
            file_name: result.file_name.clone(),
            render_dpi,
            pages: result
                .pages
                .iter()
                .map(|p| PageSize {
                    width_px: p.width_px,
                    height_px: p.height_px,
                })
                .collect(),
            extracted: result.fields.clone(),
            fields: FieldModel::new(),
            workflow_id: None,
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read layout {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse layout {}", path.display()))
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write layout {}", path.display()))?;
        Ok(())
    }

    /// Page geometry as if every page were displayed at its natural size,
    /// except `page`, which is laid out `display_width` pixels wide when given.
    pub fn geometry(&self, page: usize, display_width: Option<f32>) -> PageGeometry {
        let mut geometry = PageGeometry::new(self.render_dpi);
        let images: Vec<PageImage> = self
            .pages
            .iter()
            .map(|p| PageImage {
                data: Vec::new(),
                width_px: p.width_px,
                height_px: p.height_px,
            })
            .collect();
        geometry.set_pages(&images);
        for (index, size) in self.pages.iter().enumerate() {
            let width = match display_width {
                Some(width) if index == page => width,
                _ => size.width_px as f32,
            };
            geometry.image_loaded(index, width);
        }
        geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_fields::{Field, FieldType, PlacementController, ViewportPoint, drop_field};

    fn letter_layout() -> Layout {
        Layout {
            file_name: "lettre.pdf".to_string(),
            render_dpi: 150.0,
            pages: vec![PageSize {
                width_px: 1275,
                height_px: 1650,
            }],
            extracted: Vec::new(),
            fields: FieldModel::new(),
            workflow_id: None,
        }
    }

    #[test]
    fn test_natural_size_geometry() {
        let layout = letter_layout();
        let geometry = layout.geometry(0, None);
        let scale = geometry.scale(0).unwrap();
        assert!((scale - 150.0 / 72.0).abs() < 1e-5);
        assert!((geometry.page_height(0, &[]).unwrap() - 792.0).abs() < 1e-3);
    }

    #[test]
    fn test_display_width_only_affects_its_page() {
        let mut layout = letter_layout();
        layout.pages.push(layout.pages[0]);
        let geometry = layout.geometry(1, Some(612.0));
        assert!((geometry.scale(1).unwrap() - 1.0).abs() < 1e-5);
        assert!((geometry.scale(0).unwrap() - 150.0 / 72.0).abs() < 1e-5);
    }

    #[test]
    fn test_place_then_move_through_layout() {
        let mut layout = letter_layout();
        let geometry = layout.geometry(0, None);
        let id = drop_field(
            &mut layout.fields,
            &geometry,
            &layout.extracted,
            Some(FieldType::Text.token()),
            0,
            ViewportPoint::new(0.0, 0.0),
        )
        .unwrap();
        let placed = layout.fields.get(id).unwrap().rect();
        assert!(placed.x.abs() < 1e-3);
        assert!((placed.y - (792.0 - 20.0)).abs() < 1e-3);

        let mut controller = PlacementController::new();
        assert!(controller.pointer_down(&layout.fields, id, ViewportPoint::new(0.0, 0.0)));
        let step = 150.0 / 72.0 * 10.0;
        assert!(controller.pointer_move(
            &mut layout.fields,
            &geometry,
            ViewportPoint::new(step, step)
        ));
        assert_eq!(controller.pointer_up(), Some(id));

        let moved = layout.fields.get(id).unwrap().rect();
        assert!((moved.x - 10.0).abs() < 1e-3);
        assert!((moved.y - (placed.y - 10.0)).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_layout_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");

        let mut layout = letter_layout();
        let geometry = layout.geometry(0, None);
        drop_field(
            &mut layout.fields,
            &geometry,
            &[],
            Some("CHECKBOX"),
            0,
            ViewportPoint::new(100.0, 200.0),
        )
        .unwrap();
        layout.workflow_id = Some(WorkflowId(3));
        layout.save(&path).await.unwrap();

        let loaded = Layout::load(&path).await.unwrap();
        assert_eq!(loaded, layout);
        assert_eq!(loaded.fields.counters().issued(FieldType::Checkbox), 1);
    }

    #[tokio::test]
    async fn test_layout_with_rewound_ids_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");

        let mut layout = letter_layout();
        let geometry = layout.geometry(0, None);
        drop_field(
            &mut layout.fields,
            &geometry,
            &[],
            Some("TEXT"),
            0,
            ViewportPoint::new(0.0, 0.0),
        )
        .unwrap();
        let mut json = serde_json::to_value(&layout).unwrap();
        json["fields"]["ids"]["next"] = 1.into();
        tokio::fs::write(&path, json.to_string()).await.unwrap();

        let err = Layout::load(&path).await.unwrap_err();
        assert!(format!("{:#}", err).contains("not below the next id"));
    }
}
