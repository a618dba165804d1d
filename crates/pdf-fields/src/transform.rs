//! Coordinate transform between PDF space and viewport space
//!
//! - PDF space: points, origin at the bottom-left of the page, `y` grows upward
//! - Viewport space: pixels of the page image as displayed, origin at the
//!   top-left, `y` grows downward
//!
//! A single `scale` (viewport pixels per PDF point) links the two. It is derived
//! per page from the rendered and intrinsic widths of the page image and the
//! resolution the service rasterized it at. Every function here is pure.

use crate::types::Rect;

/// Native unit resolution of PDF space
pub const PDF_BASE_DPI: f32 = 72.0;

/// Resolution the reference service rasterizes pages at
pub const DEFAULT_RENDER_DPI: f32 = 150.0;

/// A pointer position in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewportPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A field's box positioned over the displayed page image
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Image pixels per PDF point at the given raster resolution
pub fn base_scale(render_dpi: f32) -> f32 {
    render_dpi / PDF_BASE_DPI
}

/// Calculate the display scale of a page.
///
/// # Arguments
/// * `rendered_width` - Width of the image as laid out on screen
/// * `intrinsic_width` - Natural pixel width of the image
/// * `render_dpi` - Resolution the service rendered the page at
///
/// Returns `None` while any input is not strictly positive (image not measured yet).
pub fn display_scale(rendered_width: f32, intrinsic_width: f32, render_dpi: f32) -> Option<f32> {
    if rendered_width > 0.0 && intrinsic_width > 0.0 && render_dpi > 0.0 {
        Some((rendered_width / intrinsic_width) * base_scale(render_dpi))
    } else {
        None
    }
}

/// Page height in points recovered from the intrinsic pixel height of its image
pub fn page_height_from_image(intrinsic_height: f32, render_dpi: f32) -> f32 {
    intrinsic_height / base_scale(render_dpi)
}

/// Forward transform of a field box, flipping the vertical axis.
pub fn to_viewport(rect: &Rect, page_height: f32, scale: f32) -> ViewportRect {
    ViewportRect {
        left: rect.x * scale,
        top: (page_height - rect.y - rect.height) * scale,
        width: rect.width * scale,
        height: rect.height * scale,
    }
}

/// PDF-space delta to viewport-space delta
pub fn to_viewport_delta(dx_pdf: f32, dy_pdf: f32, scale: f32) -> (f32, f32) {
    (dx_pdf * scale, -(dy_pdf * scale))
}

/// Viewport pointer delta to PDF-space delta. The vertical sign flips because
/// viewport `y` grows downward.
pub fn to_pdf_delta(dx_viewport: f32, dy_viewport: f32, scale: f32) -> (f32, f32) {
    (dx_viewport / scale, -(dy_viewport / scale))
}

/// Bottom-left PDF corner of a box of `height` points whose top-left corner is
/// at `point` in the viewport.
pub fn viewport_to_pdf_origin(
    point: ViewportPoint,
    height: f32,
    page_height: f32,
    scale: f32,
) -> (f32, f32) {
    let x = point.x / scale;
    let y = page_height - point.y / scale - height;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_scale_at_reference_resolution() {
        let scale = base_scale(DEFAULT_RENDER_DPI);
        assert!((scale - 2.083_333).abs() < 1e-4);
    }

    #[test]
    fn test_display_scale_unmeasured_image() {
        assert_eq!(display_scale(0.0, 1275.0, 150.0), None);
        assert_eq!(display_scale(800.0, 0.0, 150.0), None);
    }

    #[test]
    fn test_half_width_layout_halves_scale() {
        let full = display_scale(1275.0, 1275.0, 150.0).unwrap();
        let half = display_scale(637.5, 1275.0, 150.0).unwrap();
        assert!((full / 2.0 - half).abs() < 1e-5);
    }
}
