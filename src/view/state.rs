use crate::{
    animation::timing::TimingFunction,
    foundation::core::{Point, Rect},
    foundation::error::{SoziError, SoziResult},
    foundation::math::{lerp, normalize_angle_deg, sanitize_extent},
    geometry::{path::MotionPath, provider::GeometryProvider},
};

/// Geometric description of one camera view.
///
/// `(cx, cy)` and `(width, height)` are in the user space of the layer the
/// camera belongs to. `angle` is in degrees and always in `(-180, 180]`.
/// Clip fields are relative to the camera frame: offsets are scaled by the
/// camera size and factors are fractions of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub clipped: bool,
    pub clip_x_offset: f64,
    pub clip_y_offset: f64,
    pub clip_width_factor: f64,
    pub clip_height_factor: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            width: 1.0,
            height: 1.0,
            angle: 0.0,
            clipped: false,
            clip_x_offset: 0.0,
            clip_y_offset: 0.0,
            clip_width_factor: 1.0,
            clip_height_factor: 1.0,
        }
    }
}

/// Corrections relative to the state derived from a reference element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementOffset {
    pub delta_x: f64,
    pub delta_y: f64,
    pub width_factor: f64,
    pub height_factor: f64,
    pub delta_angle: f64,
}

impl Default for ElementOffset {
    fn default() -> Self {
        Self {
            delta_x: 0.0,
            delta_y: 0.0,
            width_factor: 1.0,
            height_factor: 1.0,
            delta_angle: 0.0,
        }
    }
}

/// Parameters of one interpolation step that stay fixed for a whole transition.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interpolation<'a> {
    pub timing: TimingFunction,
    /// Signed overshoot of the zoom level; `0` interpolates sizes linearly.
    pub relative_zoom: f64,
    pub path: Option<&'a MotionPath>,
    pub reverse_path: bool,
}

impl CameraState {
    /// Unclipped, unrotated state framing `bbox`.
    pub fn centered_on(bbox: Rect) -> Self {
        Self {
            cx: bbox.x0 + bbox.width() / 2.0,
            cy: bbox.y0 + bbox.height() / 2.0,
            width: sanitize_extent(bbox.width()),
            height: sanitize_extent(bbox.height()),
            ..Self::default()
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    pub fn set_angle(&mut self, angle: f64) -> &mut Self {
        self.angle = normalize_angle_deg(angle);
        self
    }

    pub fn set_size(&mut self, width: f64, height: f64) -> &mut Self {
        self.width = sanitize_extent(width);
        self.height = sanitize_extent(height);
        self
    }

    pub fn reset_clipping(&mut self) -> &mut Self {
        self.clip_x_offset = 0.0;
        self.clip_y_offset = 0.0;
        self.clip_width_factor = 1.0;
        self.clip_height_factor = 1.0;
        self
    }

    /// Frame `node` (its bounding box in layer space), then apply `offset`.
    pub fn set_at_element<P: GeometryProvider>(
        &mut self,
        provider: &P,
        node: &P::Node,
        offset: ElementOffset,
    ) -> SoziResult<&mut Self> {
        let bbox = provider
            .rect_geometry(node)
            .or_else(|| provider.bounding_box(node))
            .ok_or_else(|| SoziError::geometry(format!("no bounding box for {node:?}")))?;
        let layer_space = provider
            .layer_space(node)
            .ok_or_else(|| SoziError::geometry(format!("{node:?} is not inside a layer")))?;
        let ctm = provider
            .ctm(node)
            .ok_or_else(|| SoziError::geometry(format!("no transform for {node:?}")))?;
        if layer_space.determinant().abs() < f64::EPSILON {
            return Err(SoziError::geometry("layer transform is not invertible"));
        }

        let matrix = layer_space.inverse() * ctm;
        let [a, b, ..] = matrix.as_coeffs();
        let center = matrix * bbox.center();
        let scale = a.hypot(b);

        self.cx = center.x + offset.delta_x;
        self.cy = center.y + offset.delta_y;
        self.set_size(
            bbox.width() * scale * offset.width_factor,
            bbox.height() * scale * offset.height_factor,
        );
        self.set_angle(b.atan2(a).to_degrees() + offset.delta_angle);
        Ok(self)
    }

    /// Look up `id` in `provider` and frame it.
    pub fn set_at_element_id<P: GeometryProvider>(
        &mut self,
        provider: &P,
        id: &str,
        offset: ElementOffset,
    ) -> SoziResult<&mut Self> {
        let node = provider
            .find(id)
            .ok_or_else(|| SoziError::geometry(format!("no element with id '{id}'")))?;
        self.set_at_element(provider, &node, offset)
    }

    /// Corrections that reproduce the current state from `node`'s raw framing.
    pub fn offset_from_element<P: GeometryProvider>(
        &self,
        provider: &P,
        node: &P::Node,
    ) -> SoziResult<ElementOffset> {
        let mut raw = *self;
        raw.set_at_element(provider, node, ElementOffset::default())?;
        Ok(ElementOffset {
            delta_x: self.cx - raw.cx,
            delta_y: self.cy - raw.cy,
            width_factor: self.width / raw.width,
            height_factor: self.height / raw.height,
            delta_angle: normalize_angle_deg(self.angle - raw.angle),
        })
    }

    /// Remove an offset previously measured with [`CameraState::offset_from_element`].
    pub fn apply_offset(&mut self, offset: ElementOffset) -> &mut Self {
        self.cx -= offset.delta_x;
        self.cy -= offset.delta_y;
        self.set_size(
            self.width / offset.width_factor,
            self.height / offset.height_factor,
        );
        self.set_angle(self.angle - offset.delta_angle);
        self
    }

    /// Overwrite `self` with the state at `progress` between `initial` and `final_`.
    ///
    /// Pure in its inputs: the previous value of `self` is never read, so a
    /// transition can be stopped or restarted at any tick.
    pub fn interpolate(
        &mut self,
        initial: &CameraState,
        final_: &CameraState,
        progress: f64,
        params: &Interpolation<'_>,
    ) -> &mut Self {
        let tf_progress = params.timing.apply(progress);
        let tf_remaining = 1.0 - tf_progress;
        let linear = |u0: f64, u1: f64| lerp(u0, u1, tf_progress);

        if params.relative_zoom != 0.0 {
            let zoom = |u0: f64, u1: f64| {
                quadratic(u0, u1, params.relative_zoom, progress)
                    .unwrap_or_else(|| linear(u0, u1))
            };
            self.set_size(
                zoom(initial.width, final_.width),
                zoom(initial.height, final_.height),
            );
        } else {
            self.set_size(
                linear(initial.width, final_.width),
                linear(initial.height, final_.height),
            );
        }

        match params.path {
            Some(path) => {
                let len = path.total_length();
                let (start, end) = if params.reverse_path {
                    (path.end_point(), path.start_point())
                } else {
                    (path.start_point(), path.end_point())
                };
                let along = if params.reverse_path {
                    tf_remaining
                } else {
                    tf_progress
                };
                let current = path.point_at_length(len * along);
                self.cx = current.x + linear(initial.cx - start.x, final_.cx - end.x);
                self.cy = current.y + linear(initial.cy - start.y, final_.cy - end.y);
            }
            None => {
                self.cx = linear(initial.cx, final_.cx);
                self.cy = linear(initial.cy, final_.cy);
            }
        }

        // Take the shorter way around.
        let sweep = final_.angle - initial.angle;
        let angle = if sweep > 180.0 {
            linear(initial.angle, final_.angle - 360.0)
        } else if sweep < -180.0 {
            linear(initial.angle - 360.0, final_.angle)
        } else {
            linear(initial.angle, final_.angle)
        };
        self.set_angle(angle);

        let unclipped = CameraState::default();
        let from = if initial.clipped { initial } else { &unclipped };
        let to = if final_.clipped { final_ } else { &unclipped };
        self.clipped = true;
        self.clip_x_offset = linear(from.clip_x_offset, to.clip_x_offset);
        self.clip_y_offset = linear(from.clip_y_offset, to.clip_y_offset);
        self.clip_width_factor = linear(from.clip_width_factor, to.clip_width_factor);
        self.clip_height_factor = linear(from.clip_height_factor, to.clip_height_factor);
        self
    }

    pub fn to_storable(&self) -> StoredCameraState {
        StoredCameraState {
            cx: Some(self.cx),
            cy: Some(self.cy),
            width: Some(self.width),
            height: Some(self.height),
            angle: Some(self.angle),
            clipped: Some(self.clipped),
            clip_x_offset: Some(self.clip_x_offset),
            clip_y_offset: Some(self.clip_y_offset),
            clip_width_factor: Some(self.clip_width_factor),
            clip_height_factor: Some(self.clip_height_factor),
        }
    }

    /// Copy the fields present in `stored`; absent fields keep their value.
    pub fn load_storable(&mut self, stored: &StoredCameraState) -> &mut Self {
        if let Some(v) = stored.cx {
            self.cx = v;
        }
        if let Some(v) = stored.cy {
            self.cy = v;
        }
        if let Some(v) = stored.width {
            self.width = sanitize_extent(v);
        }
        if let Some(v) = stored.height {
            self.height = sanitize_extent(v);
        }
        if let Some(v) = stored.angle {
            self.set_angle(v);
        }
        if let Some(v) = stored.clipped {
            self.clipped = v;
        }
        if let Some(v) = stored.clip_x_offset {
            self.clip_x_offset = v;
        }
        if let Some(v) = stored.clip_y_offset {
            self.clip_y_offset = v;
        }
        if let Some(v) = stored.clip_width_factor {
            self.clip_width_factor = v;
        }
        if let Some(v) = stored.clip_height_factor {
            self.clip_height_factor = v;
        }
        self
    }
}

/// Parabola through `(0, u0)` and `(1, u1)` whose extremum is pushed past both
/// endpoints by `relative_zoom`, evaluated at `t`.
///
/// Returns `None` when the parabola does not exist for these endpoints.
fn quadratic(u0: f64, u1: f64, relative_zoom: f64, t: f64) -> Option<f64> {
    let um = if relative_zoom > 0.0 {
        u0.max(u1) * (1.0 + relative_zoom)
    } else {
        u0.min(u1) * (1.0 + relative_zoom)
    };
    let du0 = u0 - um;
    let du1 = u1 - um;
    let ratio = du0 / du1;
    if !(ratio.is_finite() && ratio > 0.0) {
        tracing::warn!(u0, u1, relative_zoom, "degenerate zoom parabola, using linear");
        return None;
    }
    let r = ratio.sqrt();
    let tm = r / (1.0 + r);
    let k = du0 / (tm * tm);
    let dt = t - tm;
    let v = k * dt * dt + um;
    v.is_finite().then_some(v)
}

/// Persisted form of a [`CameraState`].
///
/// Every field is optional so partial records can patch an existing state.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCameraState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_x_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_y_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_width_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_height_factor: Option<f64>,
}

impl From<&CameraState> for StoredCameraState {
    fn from(state: &CameraState) -> Self {
        state.to_storable()
    }
}

impl From<&StoredCameraState> for CameraState {
    fn from(stored: &StoredCameraState) -> Self {
        let mut state = CameraState::default();
        state.load_storable(stored);
        state
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/state.rs"]
mod tests;
