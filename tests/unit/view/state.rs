use super::*;
use crate::geometry::memory::{MemoryDocument, MemoryElement};
use kurbo::Affine;

const EPS: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn doc() -> MemoryDocument {
    let mut doc = MemoryDocument::new(Rect::new(0.0, 0.0, 1000.0, 800.0));
    doc.add_layer("layer1")
        .insert(MemoryElement::rect("frame", Rect::new(10.0, 20.0, 110.0, 70.0)).in_layer("layer1"))
        .insert(
            MemoryElement::rect("tilted", Rect::new(0.0, 0.0, 40.0, 20.0))
                .in_layer("layer1")
                .with_ctm(
                    Affine::translate((300.0, 200.0))
                        * Affine::rotate(30f64.to_radians())
                        * Affine::scale(2.0),
                ),
        );
    doc
}

fn state(cx: f64, cy: f64, width: f64, height: f64, angle: f64) -> CameraState {
    CameraState {
        cx,
        cy,
        width,
        height,
        angle,
        ..CameraState::default()
    }
}

#[test]
fn set_angle_normalizes_into_half_open_range() {
    let mut s = CameraState::default();
    for a in [-720.0, -540.0, -181.0, -180.0, -0.5, 0.0, 179.0, 180.0, 181.0, 540.0, 1000.0] {
        s.set_angle(a);
        assert!(s.angle > -180.0 && s.angle <= 180.0, "{a} -> {}", s.angle);
        assert!(approx((s.angle - a).rem_euclid(360.0) % 360.0, 0.0), "{a} -> {}", s.angle);
    }
    s.set_angle(-180.0);
    assert_eq!(s.angle, 180.0);
}

#[test]
fn set_at_rect_element_frames_its_geometry() {
    let d = doc();
    let mut s = CameraState::default();
    s.set_at_element_id(&d, "frame", ElementOffset::default())
        .unwrap();
    assert!(approx(s.cx, 60.0));
    assert!(approx(s.cy, 45.0));
    assert!(approx(s.width, 100.0));
    assert!(approx(s.height, 50.0));
    assert!(approx(s.angle, 0.0));
}

#[test]
fn set_at_transformed_element_uses_its_ctm() {
    let d = doc();
    let mut s = CameraState::default();
    s.set_at_element_id(&d, "tilted", ElementOffset::default())
        .unwrap();
    assert!(approx(s.width, 80.0));
    assert!(approx(s.height, 40.0));
    assert!(approx(s.angle, 30.0));
    let center = Affine::translate((300.0, 200.0))
        * Affine::rotate(30f64.to_radians())
        * Affine::scale(2.0)
        * Point::new(20.0, 10.0);
    assert!(approx(s.cx, center.x));
    assert!(approx(s.cy, center.y));
}

#[test]
fn unknown_element_is_a_geometry_error() {
    let d = doc();
    let err = CameraState::default()
        .set_at_element_id(&d, "missing", ElementOffset::default())
        .unwrap_err();
    assert!(err.to_string().starts_with("geometry error:"), "{err}");
}

#[test]
fn offset_from_element_recovers_applied_offset() {
    let d = doc();
    let offset = ElementOffset {
        delta_x: 12.5,
        delta_y: -7.0,
        width_factor: 1.5,
        height_factor: 0.75,
        delta_angle: 20.0,
    };
    for id in ["frame", "tilted"] {
        let node = d.find(id).unwrap();
        let mut s = CameraState::default();
        s.set_at_element(&d, &node, offset).unwrap();
        let measured = s.offset_from_element(&d, &node).unwrap();
        assert!(approx(measured.delta_x, offset.delta_x), "{id}");
        assert!(approx(measured.delta_y, offset.delta_y), "{id}");
        assert!(approx(measured.width_factor, offset.width_factor), "{id}");
        assert!(approx(measured.height_factor, offset.height_factor), "{id}");
        assert!(approx(measured.delta_angle, offset.delta_angle), "{id}");
    }
}

#[test]
fn offset_angle_wraps_across_half_turn() {
    let mut d = doc();
    d.insert(
        MemoryElement::rect("flipped", Rect::new(0.0, 0.0, 40.0, 20.0))
            .in_layer("layer1")
            .with_ctm(Affine::rotate(170f64.to_radians())),
    );
    let node = d.find("flipped").unwrap();
    let offset = ElementOffset {
        delta_angle: 20.0,
        ..ElementOffset::default()
    };
    let mut s = CameraState::default();
    s.set_at_element(&d, &node, offset).unwrap();
    assert!((s.angle + 170.0).abs() < 1e-6, "angle {}", s.angle);

    let measured = s.offset_from_element(&d, &node).unwrap();
    assert!((measured.delta_angle - 20.0).abs() < 1e-6, "{}", measured.delta_angle);
}

#[test]
fn root_transform_is_factored_out_of_layer_space() {
    let mut d = doc();
    d.set_root_ctm(Affine::translate((50.0, -20.0)) * Affine::scale(2.0));
    d.insert(
        MemoryElement::rect("scaled", Rect::new(10.0, 20.0, 110.0, 70.0))
            .in_layer("layer1")
            .with_ctm(Affine::translate((50.0, -20.0)) * Affine::scale(2.0)),
    );
    let node = d.find("scaled").unwrap();
    let mut s = CameraState::default();
    s.set_at_element(&d, &node, ElementOffset::default()).unwrap();
    assert!((s.cx - 60.0).abs() < 1e-9 && (s.cy - 45.0).abs() < 1e-9);
    assert!((s.width - 100.0).abs() < 1e-9 && (s.height - 50.0).abs() < 1e-9);
    assert!(s.angle.abs() < 1e-9);
}

#[test]
fn apply_offset_undoes_offset() {
    let d = doc();
    let node = d.find("frame").unwrap();
    let offset = ElementOffset {
        delta_x: 5.0,
        delta_y: 5.0,
        width_factor: 2.0,
        height_factor: 2.0,
        delta_angle: 10.0,
    };
    let mut s = CameraState::default();
    s.set_at_element(&d, &node, offset).unwrap();
    s.apply_offset(offset);
    let mut raw = CameraState::default();
    raw.set_at_element(&d, &node, ElementOffset::default())
        .unwrap();
    assert!(approx(s.cx, raw.cx));
    assert!(approx(s.cy, raw.cy));
    assert!(approx(s.width, raw.width));
    assert!(approx(s.height, raw.height));
    assert!(approx(s.angle, raw.angle));
}

#[test]
fn interpolation_hits_endpoints() {
    let a = state(10.0, 20.0, 300.0, 200.0, 15.0);
    let b = state(-40.0, 90.0, 120.0, 80.0, -30.0);
    let params = Interpolation::default();
    let mut s = CameraState::default();

    s.interpolate(&a, &b, 0.0, &params);
    assert!(approx(s.cx, a.cx) && approx(s.cy, a.cy));
    assert!(approx(s.width, a.width) && approx(s.height, a.height));
    assert!(approx(s.angle, a.angle));

    s.interpolate(&a, &b, 1.0, &params);
    assert!(approx(s.cx, b.cx) && approx(s.cy, b.cy));
    assert!(approx(s.width, b.width) && approx(s.height, b.height));
    assert!(approx(s.angle, b.angle));
}

#[test]
fn interpolation_applies_timing_function() {
    let a = state(0.0, 0.0, 100.0, 100.0, 0.0);
    let b = state(100.0, 0.0, 100.0, 100.0, 0.0);
    let params = Interpolation {
        timing: TimingFunction::EaseIn,
        ..Interpolation::default()
    };
    let mut s = CameraState::default();
    s.interpolate(&a, &b, 0.5, &params);
    assert!(approx(s.cx, 100.0 * TimingFunction::EaseIn.apply(0.5)));
    assert!(s.cx < 50.0);
}

#[test]
fn angle_takes_the_short_way_around() {
    let a = state(0.0, 0.0, 1.0, 1.0, 170.0);
    let b = state(0.0, 0.0, 1.0, 1.0, -170.0);
    let mut s = CameraState::default();
    s.interpolate(&a, &b, 0.5, &Interpolation::default());
    assert!(approx(s.angle.abs(), 180.0), "{}", s.angle);

    s.interpolate(&b, &a, 0.25, &Interpolation::default());
    assert!(approx(s.angle, -175.0), "{}", s.angle);
}

#[test]
fn negative_relative_zoom_dips_below_both_sizes() {
    let a = state(0.0, 0.0, 100.0, 100.0, 0.0);
    let b = state(0.0, 0.0, 400.0, 400.0, 0.0);
    let params = Interpolation {
        relative_zoom: -0.5,
        ..Interpolation::default()
    };
    let mut s = CameraState::default();

    s.interpolate(&a, &b, 0.0, &params);
    assert!(approx(s.width, 100.0));
    s.interpolate(&a, &b, 1.0, &params);
    assert!(approx(s.width, 400.0));

    // Vertex of the parabola: um = 50, ratio = 50 / 350.
    let r = (50.0f64 / 350.0).sqrt();
    let tm = r / (1.0 + r);
    s.interpolate(&a, &b, tm, &params);
    assert!(approx(s.width, 50.0), "{}", s.width);
    assert!(s.width < 100.0 && s.height < 100.0);
}

#[test]
fn positive_relative_zoom_overshoots_both_sizes() {
    let a = state(0.0, 0.0, 100.0, 100.0, 0.0);
    let b = state(0.0, 0.0, 200.0, 200.0, 0.0);
    let params = Interpolation {
        relative_zoom: 0.5,
        ..Interpolation::default()
    };
    let mut s = CameraState::default();
    s.interpolate(&a, &b, 0.5, &params);
    assert!(s.width > 200.0, "{}", s.width);
}

#[test]
fn degenerate_zoom_parabola_falls_back_to_linear() {
    assert!(quadratic(0.0, 0.0, 0.5, 0.5).is_none());
    assert!(quadratic(100.0, 200.0, f64::INFINITY, 0.5).is_none());

    let a = state(0.0, 0.0, 100.0, 100.0, 0.0);
    let b = state(0.0, 0.0, 200.0, 200.0, 0.0);
    let params = Interpolation {
        relative_zoom: f64::INFINITY,
        ..Interpolation::default()
    };
    let mut s = CameraState::default();
    s.interpolate(&a, &b, 0.5, &params);
    assert!(approx(s.width, 150.0), "{}", s.width);
}

#[test]
fn motion_path_drives_the_center() {
    let path = MotionPath::from_svg("M0,0 L100,0").unwrap();
    let a = state(0.0, 10.0, 50.0, 50.0, 0.0);
    let b = state(100.0, 20.0, 50.0, 50.0, 0.0);
    let params = Interpolation {
        path: Some(&path),
        ..Interpolation::default()
    };
    let mut s = CameraState::default();
    s.interpolate(&a, &b, 0.5, &params);
    assert!(approx(s.cx, 50.0));
    assert!(approx(s.cy, 15.0));

    let back = Interpolation {
        reverse_path: true,
        ..params
    };
    s.interpolate(&b, &a, 0.25, &back);
    assert!(approx(s.cx, 75.0));
    assert!(approx(s.cy, 17.5));
}

#[test]
fn clip_interpolation_uses_full_frame_for_unclipped_ends() {
    let a = CameraState::default();
    let b = CameraState {
        clipped: true,
        clip_x_offset: 10.0,
        clip_y_offset: -10.0,
        clip_width_factor: 0.5,
        clip_height_factor: 0.25,
        ..CameraState::default()
    };
    let mut s = CameraState::default();
    s.interpolate(&a, &b, 0.5, &Interpolation::default());
    assert!(s.clipped);
    assert!(approx(s.clip_x_offset, 5.0));
    assert!(approx(s.clip_y_offset, -5.0));
    assert!(approx(s.clip_width_factor, 0.75));
    assert!(approx(s.clip_height_factor, 0.625));
}

#[test]
fn interpolate_ignores_previous_value() {
    let a = state(0.0, 0.0, 10.0, 10.0, 0.0);
    let b = state(10.0, 10.0, 20.0, 20.0, 90.0);
    let mut fresh = CameraState::default();
    fresh.interpolate(&a, &b, 0.3, &Interpolation::default());
    let mut reused = state(999.0, -999.0, 5.0, 5.0, -45.0);
    reused.interpolate(&a, &b, 0.3, &Interpolation::default());
    assert_eq!(fresh, reused);
}

#[test]
fn storable_round_trip_is_exact() {
    let s = CameraState {
        cx: 1.25,
        cy: -3.5,
        width: 640.0,
        height: 480.0,
        angle: -45.0,
        clipped: true,
        clip_x_offset: 0.1,
        clip_y_offset: 0.2,
        clip_width_factor: 0.3,
        clip_height_factor: 0.4,
    };
    let json = serde_json::to_string(&s.to_storable()).unwrap();
    assert!(json.contains("\"clipWidthFactor\":0.3"));
    let stored: StoredCameraState = serde_json::from_str(&json).unwrap();
    assert_eq!(CameraState::from(&stored), s);
}

#[test]
fn partial_record_patches_existing_state() {
    let mut s = state(1.0, 2.0, 3.0, 4.0, 5.0);
    let stored: StoredCameraState = serde_json::from_str(r#"{"cx": 10, "angle": 270}"#).unwrap();
    s.load_storable(&stored);
    assert_eq!(s.cx, 10.0);
    assert_eq!(s.cy, 2.0);
    assert_eq!(s.angle, -90.0);
}

#[test]
fn reset_clipping_restores_full_frame() {
    let mut s = CameraState {
        clipped: true,
        clip_x_offset: 3.0,
        clip_width_factor: 0.2,
        ..CameraState::default()
    };
    s.reset_clipping();
    assert_eq!(s.clip_x_offset, 0.0);
    assert_eq!(s.clip_width_factor, 1.0);
    assert!(s.clipped);
}

#[test]
fn centered_on_frames_box_and_sanitizes_empty_extent() {
    let s = CameraState::centered_on(Rect::new(0.0, 0.0, 200.0, 0.0));
    assert_eq!(s.center(), Point::new(100.0, 0.0));
    assert_eq!(s.width, 200.0);
    assert_eq!(s.height, 1.0);
}
