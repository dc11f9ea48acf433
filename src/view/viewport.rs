use std::collections::BTreeMap;

use crate::{
    foundation::core::ViewportSize,
    foundation::error::{SoziError, SoziResult},
    geometry::provider::{GeometryProvider, document_bounds},
    view::camera::{Camera, Layer},
    view::state::CameraState,
};

/// Pixels around a clip rectangle edge that grab the edge instead of the inside.
const CLIP_BORDER: f64 = 3.0;

/// Aggregate camera states keyed by layer key.
pub type ViewportState = BTreeMap<String, CameraState>;

/// User gesture that changed camera states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Translate,
    Zoom,
    Rotate,
    Clip,
}

/// Notifications delivered to viewport listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewportEvent {
    /// Fired once per gesture, after every affected camera was updated.
    StateChanged { gesture: Gesture },
    Resized { size: ViewportSize },
}

/// What a pointer press at a given pixel would do to the clip rectangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipHandle {
    /// Draw a new clip rectangle.
    Select,
    Move,
    N,
    S,
    W,
    E,
    NW,
    NE,
    SW,
    SE,
}

type Listener = Box<dyn FnMut(&ViewportEvent)>;

/// All layer cameras of one on-screen presentation area.
pub struct Viewport {
    size: ViewportSize,
    cameras: Vec<Camera>,
    clip_handle: ClipHandle,
    clip_targets: Vec<usize>,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("size", &self.size)
            .field("cameras", &self.cameras)
            .field("clip_handle", &self.clip_handle)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Viewport {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            cameras: Vec::new(),
            clip_handle: ClipHandle::Select,
            clip_targets: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Register a layer; its camera starts centered on the document bounding box.
    pub fn add_layer<P: GeometryProvider>(
        &mut self,
        layer: Layer,
        provider: &P,
    ) -> SoziResult<&mut Camera> {
        if self.cameras.iter().any(|c| c.layer().key == layer.key) {
            return Err(SoziError::validation(format!(
                "duplicate layer key '{}'",
                layer.key
            )));
        }
        let bounds = document_bounds(provider)
            .ok_or_else(|| SoziError::geometry("document has no bounding box"))?;
        Ok(self.add_camera(layer, CameraState::centered_on(bounds)))
    }

    /// Register a layer with an explicit initial state.
    pub fn add_camera(&mut self, layer: Layer, state: CameraState) -> &mut Camera {
        let mut camera = Camera::new(layer, self.size, state);
        camera.restore_aspect_ratio();
        camera.update();
        self.cameras.push(camera);
        let last = self.cameras.len() - 1;
        &mut self.cameras[last]
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn camera(&self, key: &str) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.layer().key == key)
    }

    pub fn camera_mut(&mut self, key: &str) -> Option<&mut Camera> {
        self.cameras.iter_mut().find(|c| c.layer().key == key)
    }

    /// Select exactly the cameras whose layer key is in `keys`.
    pub fn select_only(&mut self, keys: &[&str]) {
        for camera in &mut self.cameras {
            camera.selected = keys.contains(&camera.layer().key.as_str());
        }
    }

    pub fn select_all(&mut self) {
        for camera in &mut self.cameras {
            camera.selected = true;
        }
    }

    /// Subscribe to state-change and resize notifications.
    pub fn on_event(&mut self, listener: impl FnMut(&ViewportEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: ViewportEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn for_selected(&mut self, gesture: Gesture, mut op: impl FnMut(&mut Camera)) {
        let mut touched = false;
        for camera in self.cameras.iter_mut().filter(|c| c.selected) {
            op(camera);
            touched = true;
        }
        if touched {
            self.emit(ViewportEvent::StateChanged { gesture });
        }
    }

    pub fn translate(&mut self, delta_x: f64, delta_y: f64) -> &mut Self {
        self.for_selected(Gesture::Translate, |c| {
            c.translate(delta_x, delta_y);
        });
        self
    }

    /// Alias of [`Viewport::translate`] for pointer drags.
    pub fn drag(&mut self, delta_x: f64, delta_y: f64) -> &mut Self {
        self.translate(delta_x, delta_y)
    }

    /// Zoom by `factor` around viewport pixel `(x, y)`.
    pub fn zoom(&mut self, factor: f64, x: f64, y: f64) -> &mut Self {
        self.for_selected(Gesture::Zoom, |c| {
            c.zoom(factor, x, y);
        });
        self
    }

    /// Rotate by `angle` degrees around the viewport center.
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        self.for_selected(Gesture::Rotate, |c| {
            c.rotate(angle);
        });
        self
    }

    /// Apply new pixel dimensions; camera framing is kept, only the screen mapping changes.
    #[tracing::instrument(skip(self))]
    pub fn resize(&mut self, width: f64, height: f64) -> SoziResult<&mut Self> {
        let size = ViewportSize::new(width, height)?;
        self.size = size;
        for camera in &mut self.cameras {
            camera.set_viewport_size(size);
            camera.update();
        }
        self.emit(ViewportEvent::Resized { size });
        Ok(self)
    }

    pub fn update(&mut self) -> &mut Self {
        for camera in &mut self.cameras {
            camera.update();
        }
        self
    }

    /// Snapshot of every camera state, keyed by layer.
    pub fn state(&self) -> ViewportState {
        self.cameras
            .iter()
            .map(|c| (c.layer().key.clone(), c.state))
            .collect()
    }

    /// Copy states into the cameras of matching layers and redraw them.
    ///
    /// Layers missing from `state` keep their current view.
    pub fn apply_state(&mut self, state: &ViewportState) -> &mut Self {
        for camera in &mut self.cameras {
            if let Some(s) = state.get(&camera.layer().key) {
                camera.state = *s;
                camera.update();
            }
        }
        self
    }

    /// Copy states positionally, in layer registration order.
    pub fn set_at_states(&mut self, states: &[CameraState]) -> &mut Self {
        for (camera, s) in self.cameras.iter_mut().zip(states) {
            camera.state = *s;
            camera.update();
        }
        self
    }

    /// Classify viewport pixel `(x, y)` against the selected cameras' clip rectangles
    /// and remember which cameras the next clip gesture targets.
    pub fn clip_handle_at(&mut self, x: f64, y: f64) -> ClipHandle {
        const ORDER: [ClipHandle; 9] = [
            ClipHandle::NW,
            ClipHandle::SW,
            ClipHandle::NE,
            ClipHandle::SE,
            ClipHandle::W,
            ClipHandle::E,
            ClipHandle::N,
            ClipHandle::S,
            ClipHandle::Move,
        ];

        let mut by_handle: Vec<(ClipHandle, usize)> = Vec::new();
        let mut selected = Vec::new();
        for (idx, camera) in self.cameras.iter().enumerate() {
            if !camera.selected {
                continue;
            }
            selected.push(idx);
            let r = camera.clip_rect();
            if x < r.x - CLIP_BORDER
                || x > r.x + r.width + CLIP_BORDER
                || y < r.y - CLIP_BORDER
                || y > r.y + r.height + CLIP_BORDER
            {
                continue;
            }
            let w = x <= r.x + CLIP_BORDER;
            let e = x >= r.x + r.width - CLIP_BORDER - 1.0;
            let n = y <= r.y + CLIP_BORDER;
            let s = y >= r.y + r.height - CLIP_BORDER - 1.0;
            let handle = match (n, s, w, e) {
                (true, _, true, _) => ClipHandle::NW,
                (true, _, _, true) => ClipHandle::NE,
                (true, _, _, _) => ClipHandle::N,
                (_, true, true, _) => ClipHandle::SW,
                (_, true, _, true) => ClipHandle::SE,
                (_, true, _, _) => ClipHandle::S,
                (_, _, true, _) => ClipHandle::W,
                (_, _, _, true) => ClipHandle::E,
                _ => ClipHandle::Move,
            };
            by_handle.push((handle, idx));
        }

        for handle in ORDER {
            let targets: Vec<usize> = by_handle
                .iter()
                .filter(|(h, _)| *h == handle)
                .map(|(_, i)| *i)
                .collect();
            if !targets.is_empty() {
                self.clip_handle = handle;
                self.clip_targets = targets;
                return handle;
            }
        }
        self.clip_handle = ClipHandle::Select;
        self.clip_targets = selected;
        ClipHandle::Select
    }

    /// Clip the targeted cameras to the rectangle spanned by two pixel corners.
    pub fn clip(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> &mut Self {
        let targets = self.clip_targets_or_selected();
        for &idx in &targets {
            self.cameras[idx].clip(x0, y0, x1, y1);
        }
        if !targets.is_empty() {
            self.emit(ViewportEvent::StateChanged {
                gesture: Gesture::Clip,
            });
        }
        self
    }

    /// Move the west/north/east/south edges of the targeted clip rectangles by pixel deltas.
    pub fn clip_rel(&mut self, w: f64, n: f64, e: f64, s: f64) -> &mut Self {
        let targets = self.clip_targets_or_selected();
        let mut touched = false;
        for &idx in &targets {
            let camera = &mut self.cameras[idx];
            let r = camera.clip_rect();
            if w <= r.width + e - 1.0 && n <= r.height + s - 1.0 {
                camera.clip(
                    r.x + w,
                    r.y + n,
                    r.x + r.width + e - 1.0,
                    r.y + r.height + s - 1.0,
                );
                touched = true;
            }
        }
        if touched {
            self.emit(ViewportEvent::StateChanged {
                gesture: Gesture::Clip,
            });
        }
        self
    }

    /// Apply a clip drag according to the handle chosen by [`Viewport::clip_handle_at`].
    ///
    /// `start` is where the drag began, `delta` the pointer motion since the last call.
    pub fn clip_drag(
        &mut self,
        start: (f64, f64),
        current: (f64, f64),
        delta: (f64, f64),
    ) -> &mut Self {
        let (dx, dy) = delta;
        match self.clip_handle {
            ClipHandle::Select => self.clip(start.0, start.1, current.0, current.1),
            ClipHandle::Move => self.clip_rel(dx, dy, dx, dy),
            ClipHandle::W => self.clip_rel(dx, 0.0, 0.0, 0.0),
            ClipHandle::E => self.clip_rel(0.0, 0.0, dx, 0.0),
            ClipHandle::N => self.clip_rel(0.0, dy, 0.0, 0.0),
            ClipHandle::S => self.clip_rel(0.0, 0.0, 0.0, dy),
            ClipHandle::NW => self.clip_rel(dx, dy, 0.0, 0.0),
            ClipHandle::NE => self.clip_rel(0.0, dy, dx, 0.0),
            ClipHandle::SW => self.clip_rel(dx, 0.0, 0.0, dy),
            ClipHandle::SE => self.clip_rel(0.0, 0.0, dx, dy),
        }
    }

    fn clip_targets_or_selected(&self) -> Vec<usize> {
        let targets: Vec<usize> = self
            .clip_targets
            .iter()
            .copied()
            .filter(|&i| i < self.cameras.len())
            .collect();
        if targets.is_empty() {
            self.cameras
                .iter()
                .enumerate()
                .filter(|(_, c)| c.selected)
                .map(|(i, _)| i)
                .collect()
        } else {
            targets
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/viewport.rs"]
mod tests;
