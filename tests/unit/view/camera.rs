use super::*;
use crate::geometry::memory::{MemoryDocument, MemoryElement};

const EPS: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn viewport() -> ViewportSize {
    ViewportSize::new(800.0, 600.0).unwrap()
}

fn camera_at(cx: f64, cy: f64, width: f64, height: f64) -> Camera {
    let state = CameraState {
        cx,
        cy,
        width,
        height,
        ..CameraState::default()
    };
    Camera::new(Layer::single("layer1"), viewport(), state)
}

#[test]
fn zoom_on_screen_center_keeps_center() {
    let mut c = camera_at(200.0, 150.0, 400.0, 300.0);
    c.zoom(2.0, 400.0, 300.0);
    assert!(approx(c.state.cx, 200.0));
    assert!(approx(c.state.cy, 150.0));
    assert!(approx(c.state.width, 200.0));
    assert!(approx(c.state.height, 150.0));
}

#[test]
fn zoom_off_center_keeps_pointer_fixed() {
    let mut c = camera_at(400.0, 300.0, 800.0, 600.0);
    let before = c.view_transform().inverse() * Point::new(600.0, 150.0);
    c.zoom(1.5, 600.0, 150.0);
    let after = c.view_transform().inverse() * Point::new(600.0, 150.0);
    assert!(approx(before.x, after.x) && approx(before.y, after.y));
}

#[test]
fn gestures_preserve_viewport_aspect_ratio() {
    let mut c = camera_at(50.0, 50.0, 100.0, 100.0);
    c.zoom(1.05, 10.0, 500.0)
        .rotate(5.0)
        .translate(-30.0, 12.0)
        .zoom(1.0 / 1.05, 700.0, 20.0)
        .rotate(-95.0);
    let ratio = c.state.width / c.state.height;
    assert!((ratio - 800.0 / 600.0).abs() < EPS, "{ratio}");
}

#[test]
fn scale_fits_frame_inside_viewport() {
    let c = camera_at(0.0, 0.0, 100.0, 300.0);
    assert_eq!(c.scale(), (800.0f64 / 100.0).min(600.0 / 300.0));
    assert_eq!(c.scale(), 2.0);
}

#[test]
fn translate_follows_camera_rotation() {
    let mut c = camera_at(400.0, 300.0, 800.0, 600.0);
    c.translate(10.0, 20.0);
    assert!(approx(c.state.cx, 390.0));
    assert!(approx(c.state.cy, 280.0));

    c.state.set_angle(90.0);
    c.translate(10.0, 20.0);
    assert!(approx(c.state.cx, 410.0));
    assert!(approx(c.state.cy, 270.0));
}

#[test]
fn rotate_wraps_angle() {
    let mut c = camera_at(400.0, 300.0, 800.0, 600.0);
    c.rotate(30.0);
    assert!(approx(c.state.angle, 30.0));
    c.rotate(170.0);
    assert!(approx(c.state.angle, -160.0));
}

#[test]
fn transform_attribute_format() {
    let mut c = camera_at(400.0, 300.0, 800.0, 600.0);
    assert_eq!(
        c.transform_attribute(),
        "scale(1)translate(0,0)rotate(0,400,300)"
    );
    c.state.set_angle(30.0);
    c.state.set_size(400.0, 300.0);
    c.update();
    let expected = "scale(2)translate(-200,-150)rotate(-30,400,300)";
    assert_eq!(c.transform_attribute(), expected);
    assert!(c.transform_groups().iter().all(|g| g.transform == expected));
}

#[test]
fn view_transform_maps_center_to_viewport_center() {
    let mut c = camera_at(120.0, -40.0, 300.0, 100.0);
    c.state.set_angle(-60.0);
    let p = c.view_transform() * c.state.center();
    assert!(approx(p.x, 400.0) && approx(p.y, 300.0));
}

#[test]
fn every_layer_node_gets_a_transform_group() {
    let layer = Layer::new("l", vec!["a".to_string(), "b".to_string()]);
    let c = Camera::new(layer, viewport(), CameraState::default());
    let ids: Vec<_> = c.transform_groups().iter().map(|g| g.node_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(c.transform_groups()[0].transform, c.transform_groups()[1].transform);
}

#[test]
fn unclipped_camera_covers_viewport() {
    let c = camera_at(400.0, 300.0, 800.0, 600.0);
    assert_eq!(c.clip_rect(), ClipRect::full(viewport()));
}

#[test]
fn clip_renders_requested_pixels() {
    let mut c = camera_at(400.0, 300.0, 800.0, 600.0);
    c.clip(299.0, 199.0, 100.0, 100.0);
    assert!(c.state.clipped);
    let expected = ClipRect {
        x: 100.0,
        y: 100.0,
        width: 200.0,
        height: 100.0,
    };
    assert_eq!(c.clip_rect(), expected);
    assert_eq!(c.rendered_clip_rect(), expected);
}

#[test]
fn clip_survives_zoom_in_screen_size() {
    let mut c = camera_at(400.0, 300.0, 800.0, 600.0);
    c.clip(100.0, 100.0, 299.0, 199.0);
    c.zoom(2.0, 400.0, 300.0);
    let r = c.clip_rect();
    assert_eq!((r.width, r.height), (200.0, 100.0));
}

#[test]
fn non_finite_state_keeps_previous_output() {
    let mut c = camera_at(400.0, 300.0, 800.0, 600.0);
    let transform = c.transform_attribute();
    let clip = c.rendered_clip_rect();
    c.state.cx = f64::NAN;
    c.update();
    assert_eq!(c.transform_groups()[0].transform, transform);
    assert_eq!(c.rendered_clip_rect(), clip);
}

fn doc() -> MemoryDocument {
    let mut doc = MemoryDocument::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    doc.add_layer("layer1")
        .insert(
            MemoryElement::rect("small", Rect::new(10.0, 10.0, 20.0, 20.0)).in_layer("layer1"),
        )
        .insert(MemoryElement::rect("page", Rect::new(0.0, 0.0, 800.0, 600.0)).in_layer("layer1"))
        .insert(
            MemoryElement::rect("page-copy", Rect::new(0.0, 0.0, 800.0, 600.0))
                .in_layer("layer1"),
        )
        .insert(
            MemoryElement::new("unnamed", Rect::new(0.0, 0.0, 800.0, 600.0))
                .in_layer("layer1")
                .anonymous(),
        )
        .insert(
            MemoryElement::rect("offscreen", Rect::new(5000.0, 0.0, 5100.0, 100.0))
                .in_layer("layer1"),
        );
    doc
}

#[test]
fn reference_candidate_prefers_best_match_in_document_order() {
    let c = camera_at(400.0, 300.0, 800.0, 600.0);
    let candidate = c.candidate_reference_element(&doc()).unwrap();
    assert_eq!(candidate.element, "page");
    assert_eq!(candidate.score, Some(0.0));
}

#[test]
fn reference_candidate_scores_by_overlap() {
    let c = camera_at(15.0, 15.0, 10.0, 10.0);
    let mut d = doc();
    d.insert(MemoryElement::rect("tiny", Rect::new(14.0, 14.0, 16.0, 16.0)).in_layer("layer1"));
    let candidate = c.candidate_reference_element(&d).unwrap();
    assert_eq!(candidate.element, "small");
}

#[test]
fn reference_candidate_falls_back_to_root() {
    let c = camera_at(400.0, 300.0, 800.0, 600.0);
    let mut d = doc();
    d.set_intersections_supported(false);
    let candidate = c.candidate_reference_element(&d).unwrap();
    assert_eq!(candidate.element, d.root());
    assert_eq!(candidate.score, None);
}

#[test]
fn reference_candidate_absent_without_ids() {
    let c = camera_at(400.0, 300.0, 800.0, 600.0);
    let mut d = MemoryDocument::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    d.add_layer("layer1").insert(
        MemoryElement::new("x", Rect::new(0.0, 0.0, 100.0, 100.0))
            .in_layer("layer1")
            .anonymous(),
    );
    assert_eq!(c.candidate_reference_element(&d), None);
}
