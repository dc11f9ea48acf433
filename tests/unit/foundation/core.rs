use super::*;

#[test]
fn viewport_size_rejects_degenerate_dimensions() {
    assert!(ViewportSize::new(0.0, 10.0).is_err());
    assert!(ViewportSize::new(10.0, -1.0).is_err());
    assert!(ViewportSize::new(f64::NAN, 10.0).is_err());
    let s = ViewportSize::new(800.0, 600.0).unwrap();
    assert_eq!(s.aspect_ratio(), 800.0 / 600.0);
    assert_eq!(s.center(), Point::new(400.0, 300.0));
}

#[test]
fn clip_rect_contains_edges() {
    let r = ClipRect {
        x: 10.0,
        y: 20.0,
        width: 30.0,
        height: 40.0,
    };
    assert!(r.contains(10.0, 20.0));
    assert!(r.contains(40.0, 60.0));
    assert!(!r.contains(9.9, 20.0));
    assert_eq!(r.to_rect(), Rect::new(10.0, 20.0, 40.0, 60.0));
}
