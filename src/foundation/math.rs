/// Linear blend of `initial` and `final_` with weight `t` on the final value.
#[inline]
pub(crate) fn lerp(initial: f64, final_: f64, t: f64) -> f64 {
    final_ * t + initial * (1.0 - t)
}

/// Normalize an angle in degrees into `(-180, 180]`.
///
/// Uses a Euclidean remainder so negative inputs land in range too.
pub(crate) fn normalize_angle_deg(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 180.0;
    }
    let a = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if a <= -180.0 { a + 360.0 } else { a }
}

/// Serialize a number the way SVG attribute values expect it (`-0` prints as `0`).
pub(crate) fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        format!("{v}")
    }
}

/// Width/height values must stay finite and strictly positive.
#[inline]
pub(crate) fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 1.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
