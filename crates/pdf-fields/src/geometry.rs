use std::collections::HashMap;

use crate::field::{ExtractedField, Field};
use crate::service::PageImage;
use crate::transform;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PageMetrics {
    intrinsic_width: f32,
    intrinsic_height: f32,
    /// Unknown until the page image has been measured at least once
    scale: Option<f32>,
}

/// Per-page image sizes and cached display scales.
///
/// A page's scale stays cached until the next image-load (or resize) event for
/// that page replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    render_dpi: f32,
    pages: HashMap<usize, PageMetrics>,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::new(transform::DEFAULT_RENDER_DPI)
    }
}

impl PageGeometry {
    pub fn new(render_dpi: f32) -> Self {
        Self {
            render_dpi,
            pages: HashMap::new(),
        }
    }

    /// Register the page images of a freshly loaded document, dropping all
    /// previously cached scales.
    pub fn set_pages(&mut self, images: &[PageImage]) {
        self.pages = images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                (
                    index,
                    PageMetrics {
                        intrinsic_width: image.width_px as f32,
                        intrinsic_height: image.height_px as f32,
                        scale: None,
                    },
                )
            })
            .collect();
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Record an image-load or resize measurement and return the new scale.
    pub fn image_loaded(&mut self, page: usize, rendered_width: f32) -> Option<f32> {
        let render_dpi = self.render_dpi;
        let metrics = self.pages.get_mut(&page)?;
        metrics.scale =
            transform::display_scale(rendered_width, metrics.intrinsic_width, render_dpi);
        if metrics.scale.is_none() {
            log::debug!("Page {} measured with unusable width {}", page, rendered_width);
        }
        metrics.scale
    }

    pub fn scale(&self, page: usize) -> Option<f32> {
        self.pages.get(&page).and_then(|m| m.scale)
    }

    pub fn invalidate(&mut self, page: usize) {
        if let Some(metrics) = self.pages.get_mut(&page) {
            metrics.scale = None;
        }
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    /// Height of `page` in points: taken from any extracted field on that page,
    /// otherwise derived from the intrinsic height of the page image.
    pub fn page_height(&self, page: usize, extracted: &[ExtractedField]) -> Option<f32> {
        if let Some(field) = extracted.iter().find(|f| f.page() == page) {
            return Some(field.page_height());
        }
        self.pages
            .get(&page)
            .filter(|m| m.intrinsic_height > 0.0)
            .map(|m| transform::page_height_from_image(m.intrinsic_height, self.render_dpi))
    }

    /// Width of `page` in points derived from its image
    pub fn page_width(&self, page: usize) -> Option<f32> {
        self.pages
            .get(&page)
            .filter(|m| m.intrinsic_width > 0.0)
            .map(|m| m.intrinsic_width / transform::base_scale(self.render_dpi))
    }
}
