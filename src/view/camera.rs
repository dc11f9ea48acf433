use crate::{
    foundation::core::{Affine, ClipRect, Point, Rect, ViewportSize},
    foundation::math::fmt_num,
    geometry::provider::GeometryProvider,
    view::state::CameraState,
};

/// A presentation layer: SVG nodes that move together under one camera.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub key: String,
    /// Ids of the top-level SVG nodes in this layer, in document order.
    pub node_ids: Vec<String>,
}

impl Layer {
    pub fn new(key: impl Into<String>, node_ids: Vec<String>) -> Self {
        Self {
            key: key.into(),
            node_ids,
        }
    }

    /// A layer made of the single top-level node `id`, keyed by that id.
    pub fn single(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            key: id.clone(),
            node_ids: vec![id],
        }
    }
}

/// Transform group wrapping one SVG node of the layer.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformGroup {
    pub node_id: String,
    /// Value of the group's `transform` attribute.
    pub transform: String,
}

/// Element suggested as the reference of the current view.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceCandidate<N> {
    pub element: N,
    /// Lower is better; `None` when the host cannot run spatial queries.
    pub score: Option<f64>,
}

/// Per-layer view controller applying a [`CameraState`] to on-screen transforms.
///
/// The camera exclusively owns the clip rectangle and the transform groups it
/// renders into; they are created with the camera and dropped with it.
#[derive(Clone, Debug)]
pub struct Camera {
    pub state: CameraState,
    /// Whether viewport-wide drag/zoom/rotate gestures apply to this camera.
    pub selected: bool,
    layer: Layer,
    viewport: ViewportSize,
    clip_rect: ClipRect,
    transform_groups: Vec<TransformGroup>,
}

impl Camera {
    pub fn new(layer: Layer, viewport: ViewportSize, state: CameraState) -> Self {
        let transform_groups = layer
            .node_ids
            .iter()
            .map(|id| TransformGroup {
                node_id: id.clone(),
                transform: String::new(),
            })
            .collect();
        let mut camera = Self {
            state,
            selected: true,
            layer,
            viewport,
            clip_rect: ClipRect::full(viewport),
            transform_groups,
        };
        camera.update();
        camera
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    /// Rebind to new viewport dimensions. Call [`Camera::update`] to redraw.
    pub fn set_viewport_size(&mut self, size: ViewportSize) {
        self.viewport = size;
    }

    /// Clip rectangle as last written by [`Camera::update`].
    pub fn rendered_clip_rect(&self) -> ClipRect {
        self.clip_rect
    }

    pub fn transform_groups(&self) -> &[TransformGroup] {
        &self.transform_groups
    }

    /// Pixels per user unit; the camera frame always fits inside the viewport.
    pub fn scale(&self) -> f64 {
        (self.viewport.width / self.state.width).min(self.viewport.height / self.state.height)
    }

    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        self.restore_aspect_ratio();
        let a = self.state.angle + angle;
        self.state.set_angle(a);
        self.update()
    }

    /// Zoom by `factor`, keeping viewport pixel `(x, y)` fixed on screen.
    pub fn zoom(&mut self, factor: f64, x: f64, y: f64) -> &mut Self {
        let (w, h) = (self.state.width / factor, self.state.height / factor);
        self.state.set_size(w, h);
        self.restore_aspect_ratio();
        self.translate(
            (1.0 - factor) * (x - self.viewport.width / 2.0),
            (1.0 - factor) * (y - self.viewport.height / 2.0),
        )
    }

    /// Move the view by a drag of `(delta_x, delta_y)` viewport pixels.
    pub fn translate(&mut self, delta_x: f64, delta_y: f64) -> &mut Self {
        let scale = self.scale();
        let (si, co) = self.state.angle.to_radians().sin_cos();
        self.state.cx -= (delta_x * co - delta_y * si) / scale;
        self.state.cy -= (delta_x * si + delta_y * co) / scale;
        self.restore_aspect_ratio();
        self.update()
    }

    /// Clip to the pixel rectangle spanned by corners `(x0, y0)` and `(x1, y1)`.
    pub fn clip(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> &mut Self {
        let scale = self.scale();
        let clip_width = (x1 - x0).abs() + 1.0;
        let clip_height = (y1 - y0).abs() + 1.0;
        let s = &mut self.state;
        s.clipped = true;
        s.clip_x_offset =
            (x0.min(x1) - (self.viewport.width - clip_width) / 2.0) * s.width / clip_width;
        s.clip_y_offset =
            (y0.min(y1) - (self.viewport.height - clip_height) / 2.0) * s.height / clip_height;
        s.clip_width_factor = clip_width / s.width / scale;
        s.clip_height_factor = clip_height / s.height / scale;
        self.update()
    }

    /// Grow the too-small camera dimension so the frame matches the viewport ratio.
    ///
    /// The clip rectangle keeps its absolute size.
    pub fn restore_aspect_ratio(&mut self) {
        let ratio = self.viewport.aspect_ratio() / (self.state.width / self.state.height);
        let s = &mut self.state;
        if ratio > 1.0 {
            s.width *= ratio;
            if s.clipped {
                s.clip_width_factor /= ratio;
            }
        } else {
            s.height /= ratio;
            if s.clipped {
                s.clip_height_factor *= ratio;
            }
        }
    }

    /// Pixel rectangle the layer is clipped to for the current state.
    pub fn clip_rect(&self) -> ClipRect {
        if !self.state.clipped {
            return ClipRect::full(self.viewport);
        }
        let s = &self.state;
        let scale = self.scale();
        let width = (s.width * s.clip_width_factor * scale).round();
        let height = (s.height * s.clip_height_factor * scale).round();
        ClipRect {
            x: ((self.viewport.width - width) / 2.0 + s.clip_x_offset * s.clip_width_factor * scale)
                .round(),
            y: ((self.viewport.height - height) / 2.0
                + s.clip_y_offset * s.clip_height_factor * scale)
                .round(),
            width,
            height,
        }
    }

    fn translation(&self, scale: f64) -> (f64, f64) {
        (
            self.viewport.width / scale / 2.0 - self.state.cx,
            self.viewport.height / scale / 2.0 - self.state.cy,
        )
    }

    /// Mapping from layer user space to viewport pixels.
    pub fn view_transform(&self) -> Affine {
        let scale = self.scale();
        let (tx, ty) = self.translation(scale);
        Affine::scale(scale)
            * Affine::translate((tx, ty))
            * Affine::rotate_about(
                (-self.state.angle).to_radians(),
                Point::new(self.state.cx, self.state.cy),
            )
    }

    /// The `transform` attribute written to every transform group.
    pub fn transform_attribute(&self) -> String {
        let scale = self.scale();
        let (tx, ty) = self.translation(scale);
        format!(
            "scale({})translate({},{})rotate({},{},{})",
            fmt_num(scale),
            fmt_num(tx),
            fmt_num(ty),
            fmt_num(-self.state.angle),
            fmt_num(self.state.cx),
            fmt_num(self.state.cy),
        )
    }

    /// Write the clip rectangle and transform attributes for the current state.
    ///
    /// A state with non-finite values is not rendered; the previous output stays.
    pub fn update(&mut self) -> &mut Self {
        let s = &self.state;
        let finite = [
            s.cx,
            s.cy,
            s.width,
            s.height,
            s.angle,
            s.clip_x_offset,
            s.clip_y_offset,
            s.clip_width_factor,
            s.clip_height_factor,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            tracing::warn!(
                layer = %self.layer.key,
                state = ?self.state,
                "skipping update of non-finite camera state"
            );
            return self;
        }

        self.clip_rect = self.clip_rect();
        let transform = self.transform_attribute();
        for group in &mut self.transform_groups {
            group.transform.clone_from(&transform);
        }
        self
    }

    /// Suggest the element that the current view most closely frames.
    ///
    /// Scores every element with an `id` that intersects the viewport by
    /// `viewport area + element area - 2 * intersection area`; the first
    /// minimum in document order wins.
    pub fn candidate_reference_element<P: GeometryProvider>(
        &self,
        provider: &P,
    ) -> Option<ReferenceCandidate<P::Node>> {
        let layer_node = provider.find(self.layer.node_ids.first()?)?;
        let area = self.viewport.to_rect();
        let Some(hits) = provider.intersection_list(&layer_node, area, self.view_transform()) else {
            return Some(ReferenceCandidate {
                element: provider.root(),
                score: None,
            });
        };

        let viewport_area = self.viewport.area();
        let mut best: Option<(P::Node, f64)> = None;
        for (node, rect) in hits {
            if provider.element_id(&node).is_none() {
                continue;
            }
            let score = viewport_area + rect.area() - 2.0 * overlap_area(rect, area);
            if best.as_ref().is_none_or(|(_, s)| score < *s) {
                best = Some((node, score));
            }
        }
        best.map(|(element, score)| ReferenceCandidate {
            element,
            score: Some(score),
        })
    }
}

fn overlap_area(a: Rect, b: Rect) -> f64 {
    let i = a.intersect(b);
    (i.width().max(0.0)) * (i.height().max(0.0))
}

#[cfg(test)]
#[path = "../../tests/unit/view/camera.rs"]
mod tests;
