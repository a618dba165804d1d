use pdf_fields::transform::*;
use pdf_fields::*;

const EPSILON: f32 = 1e-3;

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_flip_places_bottom_left_field_at_page_bottom() {
    let page_height = 792.0;
    let scale = 1.5;
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

    let view = to_viewport(&rect, page_height, scale);
    assert_close(view.left, 0.0);
    assert_close(view.top, (page_height - 10.0) * scale);
    assert_close(view.width, 15.0);
    assert_close(view.height, 15.0);
}

#[test]
fn test_field_at_page_top_renders_at_viewport_top() {
    let rect = Rect::new(72.0, 772.0, 200.0, 20.0);
    let view = to_viewport(&rect, 792.0, 2.0);
    assert_close(view.left, 144.0);
    assert_close(view.top, 0.0);
    assert_close(view.width, 400.0);
    assert_close(view.height, 40.0);
}

#[test]
fn test_delta_round_trip() {
    for scale in [0.25_f32, 1.0, 2.08, 3.7] {
        for (dx, dy) in [(0.0_f32, 0.0_f32), (12.5, -3.0), (-40.0, 17.25)] {
            let (vx, vy) = to_viewport_delta(dx, dy, scale);
            let (px, py) = to_pdf_delta(vx, vy, scale);
            assert_close(px, dx);
            assert_close(py, dy);
        }
    }
}

#[test]
fn test_pointer_moving_down_moves_field_down_in_pdf_space() {
    let (dx, dy) = to_pdf_delta(10.0, 20.0, 2.0);
    assert_close(dx, 5.0);
    assert_close(dy, -10.0);
}

#[test]
fn test_drop_point_is_top_left_corner() {
    let (x, y) = viewport_to_pdf_origin(ViewportPoint::new(100.0, 200.0), 15.0, 792.0, 2.08);
    assert_close(x, 100.0 / 2.08);
    assert_close(y, 792.0 - 200.0 / 2.08 - 15.0);

    // Forward transform brings the box back to the drop point
    let view = to_viewport(&Rect::new(x, y, 15.0, 15.0), 792.0, 2.08);
    assert_close(view.left, 100.0);
    assert_close(view.top, 200.0);
}

#[test]
fn test_display_scale_combines_layout_and_raster_resolution() {
    // Letter page rendered at 150 dpi is 1275 px wide; shown at 637.5 px
    let scale = display_scale(637.5, 1275.0, DEFAULT_RENDER_DPI).unwrap();
    assert_close(scale, 0.5 * 150.0 / 72.0);
}

#[test]
fn test_page_height_from_image() {
    assert_close(page_height_from_image(1650.0, DEFAULT_RENDER_DPI), 792.0);
}
