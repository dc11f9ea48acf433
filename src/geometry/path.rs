use kurbo::{ParamCurve, ParamCurveArclen, PathSeg};

use crate::foundation::core::{BezPath, Point};

const ARCLEN_ACCURACY: f64 = 1e-6;

/// A path that a camera center can travel along, sampled by arc length.
#[derive(Clone, Debug)]
pub struct MotionPath {
    segments: Vec<PathSeg>,
    lengths: Vec<f64>,
    total: f64,
    start: Point,
}

impl MotionPath {
    pub fn new(path: &BezPath) -> Self {
        let segments: Vec<PathSeg> = path.segments().collect();
        let lengths: Vec<f64> = segments
            .iter()
            .map(|s| s.arclen(ARCLEN_ACCURACY))
            .collect();
        let total = lengths.iter().sum();
        let start = segments
            .first()
            .map(|s| s.start())
            .unwrap_or(Point::ZERO);
        Self {
            segments,
            lengths,
            total,
            start,
        }
    }

    pub fn from_svg(d: &str) -> Option<Self> {
        BezPath::from_svg(d).ok().map(|p| Self::new(&p))
    }

    pub fn total_length(&self) -> f64 {
        self.total
    }

    /// Point at distance `len` from the start, clamped to the path extent.
    pub fn point_at_length(&self, len: f64) -> Point {
        let mut remaining = len.clamp(0.0, self.total);
        for (seg, &seg_len) in self.segments.iter().zip(&self.lengths) {
            if remaining <= seg_len {
                if seg_len <= 0.0 {
                    return seg.start();
                }
                let t = seg.inv_arclen(remaining, ARCLEN_ACCURACY);
                return seg.eval(t);
            }
            remaining -= seg_len;
        }
        self.segments.last().map(|s| s.end()).unwrap_or(self.start)
    }

    pub fn start_point(&self) -> Point {
        self.point_at_length(0.0)
    }

    pub fn end_point(&self) -> Point {
        self.point_at_length(self.total)
    }
}

impl From<BezPath> for MotionPath {
    fn from(path: BezPath) -> Self {
        Self::new(&path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
