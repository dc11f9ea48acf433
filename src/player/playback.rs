use crate::{
    animation::animator::{Animator, AnimatorEvent},
    animation::timing::TimingFunction,
    foundation::core::ViewportSize,
    foundation::error::{SoziError, SoziResult},
    geometry::path::MotionPath,
    geometry::provider::{GeometryProvider, document_bounds},
    player::presentation::{Frame, Presentation, PlayerSettings},
    player::transition::Transition,
    view::state::CameraState,
    view::viewport::Viewport,
};

/// Notifications returned by [`Player`] operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The current frame index was committed.
    FrameChanged(usize),
}

/// Per-layer transition settings of one frame, with geometry already looked up.
#[derive(Clone, Debug)]
struct LayerTransition {
    timing: TimingFunction,
    relative_zoom: f64,
    path: Option<MotionPath>,
}

#[derive(Clone, Debug)]
struct ResolvedFrame {
    duration_ms: f64,
    states: Vec<CameraState>,
    layers: Vec<LayerTransition>,
}

/// Drives a [`Viewport`] through the frames of a [`Presentation`].
///
/// Time is injected: every animated operation takes the host clock in
/// milliseconds and [`Player::tick`] must be called once per display frame.
#[derive(Debug)]
pub struct Player {
    viewport: Viewport,
    presentation: Presentation,
    settings: PlayerSettings,
    frames: Vec<ResolvedFrame>,
    animator: Animator,
    transitions: Vec<Transition>,
    current_frame_index: usize,
    target_frame_index: usize,
}

impl Player {
    /// Build a viewport for `presentation` and show its first frame.
    ///
    /// Frame states, reference elements and motion paths are resolved against
    /// `provider` once, up front.
    #[tracing::instrument(skip(presentation, provider, settings))]
    pub fn new<P: GeometryProvider>(
        presentation: Presentation,
        provider: &P,
        size: ViewportSize,
        settings: PlayerSettings,
    ) -> SoziResult<Self> {
        presentation.validate()?;
        settings.validate()?;

        let bounds = document_bounds(provider)
            .ok_or_else(|| SoziError::geometry("document has no bounding box"))?;
        let base = CameraState::centered_on(bounds);

        let mut viewport = Viewport::new(size);
        for layer in &presentation.layers {
            viewport.add_camera(layer.clone(), base);
        }

        let frames = presentation
            .frames
            .iter()
            .map(|frame| resolve_frame(&presentation, frame, provider, base))
            .collect::<SoziResult<Vec<_>>>()?;

        let mut player = Self {
            viewport,
            presentation,
            settings,
            frames,
            animator: Animator::new(),
            transitions: Vec::new(),
            current_frame_index: 0,
            target_frame_index: 0,
        };
        player.show_current_frame();
        Ok(player)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    pub fn target_frame_index(&self) -> usize {
        self.target_frame_index
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    /// Duration of the running (or last started) transition.
    pub fn transition_duration_ms(&self) -> f64 {
        self.animator.duration_ms()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Camera states of frame `index` for every layer, in layer order.
    pub fn frame_states(&self, index: usize) -> Option<&[CameraState]> {
        self.frames.get(index).map(|f| f.states.as_slice())
    }

    fn reference_index(&self) -> usize {
        if self.animator.is_running() {
            self.target_frame_index
        } else {
            self.current_frame_index
        }
    }

    /// Index after the current (or pending) frame, wrapping around.
    pub fn next_frame_index(&self) -> usize {
        (self.reference_index() + 1) % self.frames.len()
    }

    /// Index before the current (or pending) frame, wrapping around.
    pub fn previous_frame_index(&self) -> usize {
        (self.reference_index() + self.frames.len() - 1) % self.frames.len()
    }

    fn check_index(&self, index: usize) -> SoziResult<()> {
        if index < self.frames.len() {
            Ok(())
        } else {
            Err(SoziError::animation(format!(
                "frame index {index} out of range (0..{})",
                self.frames.len()
            )))
        }
    }

    fn show_current_frame(&mut self) {
        let states = &self.frames[self.current_frame_index].states;
        self.viewport.set_at_states(states);
    }

    /// Show frame `index` immediately, cancelling any running transition.
    pub fn jump_to_frame(&mut self, index: usize) -> SoziResult<PlayerEvent> {
        self.check_index(index)?;
        self.animator.stop();
        self.transitions.clear();
        self.target_frame_index = index;
        self.current_frame_index = index;
        self.show_current_frame();
        tracing::debug!(index, "jumped to frame");
        Ok(PlayerEvent::FrameChanged(index))
    }

    pub fn jump_to_first(&mut self) -> SoziResult<PlayerEvent> {
        self.jump_to_frame(0)
    }

    pub fn jump_to_last(&mut self) -> SoziResult<PlayerEvent> {
        self.jump_to_frame(self.frames.len() - 1)
    }

    pub fn jump_to_next(&mut self) -> SoziResult<PlayerEvent> {
        self.jump_to_frame(self.next_frame_index())
    }

    pub fn jump_to_previous(&mut self) -> SoziResult<PlayerEvent> {
        self.jump_to_frame(self.previous_frame_index())
    }

    /// Animate from the current view to frame `index`.
    ///
    /// Moving to the next frame uses that frame's transition properties;
    /// moving to the previous frame plays the current frame's transition
    /// backwards; any other move uses the player defaults without a path.
    /// Returns the frame change committed by interrupting a running transition.
    #[tracing::instrument(skip(self))]
    pub fn move_to_frame(&mut self, index: usize, now_ms: f64) -> SoziResult<Option<PlayerEvent>> {
        self.check_index(index)?;
        let from = self.reference_index();
        let next = self.next_frame_index();
        let previous = self.previous_frame_index();

        let source = if index == next {
            Some((index, false))
        } else if index == previous {
            Some((from, true))
        } else {
            None
        };

        let interrupted = self.interrupt();
        self.target_frame_index = index;

        let duration_ms = match source {
            Some((frame, _)) => self.frames[frame].duration_ms,
            None => self.settings.default_transition_duration_ms,
        };
        for (layer, camera) in self.viewport.cameras().iter().enumerate() {
            let (timing, relative_zoom, path, reverse) = match source {
                Some((frame, backwards)) => {
                    let lt = &self.frames[frame].layers[layer];
                    let timing = if backwards {
                        lt.timing.reverse()
                    } else {
                        lt.timing
                    };
                    (timing, lt.relative_zoom, lt.path.clone(), backwards)
                }
                None => (
                    self.settings.default_timing_function,
                    self.settings.default_relative_zoom,
                    None,
                    false,
                ),
            };
            self.transitions.push(Transition {
                layer: camera.layer().key.clone(),
                initial: camera.state,
                target: self.frames[index].states[layer],
                timing,
                relative_zoom,
                path,
                reverse,
            });
        }

        tracing::debug!(
            from,
            to = index,
            duration_ms,
            backwards = source.is_some_and(|(_, b)| b),
            "starting transition"
        );
        let event = self.animator.start(duration_ms, now_ms);
        self.handle(event);
        Ok(interrupted)
    }

    /// Animate to frame `index` with the default transition settings.
    pub fn preview_frame(&mut self, index: usize, now_ms: f64) -> SoziResult<Option<PlayerEvent>> {
        self.check_index(index)?;
        let interrupted = self.interrupt();
        self.target_frame_index = index;
        for (layer, camera) in self.viewport.cameras().iter().enumerate() {
            self.transitions.push(Transition {
                layer: camera.layer().key.clone(),
                initial: camera.state,
                target: self.frames[index].states[layer],
                timing: self.settings.default_timing_function,
                relative_zoom: self.settings.default_relative_zoom,
                path: None,
                reverse: false,
            });
        }
        let event = self
            .animator
            .start(self.settings.default_transition_duration_ms, now_ms);
        self.handle(event);
        Ok(interrupted)
    }

    pub fn move_to_first(&mut self, now_ms: f64) -> SoziResult<Option<PlayerEvent>> {
        self.move_to_frame(0, now_ms)
    }

    pub fn move_to_last(&mut self, now_ms: f64) -> SoziResult<Option<PlayerEvent>> {
        self.move_to_frame(self.frames.len() - 1, now_ms)
    }

    pub fn move_to_next(&mut self, now_ms: f64) -> SoziResult<Option<PlayerEvent>> {
        self.move_to_frame(self.next_frame_index(), now_ms)
    }

    pub fn move_to_previous(&mut self, now_ms: f64) -> SoziResult<Option<PlayerEvent>> {
        self.move_to_frame(self.previous_frame_index(), now_ms)
    }

    /// Animate back to the current frame, e.g. after the user zoomed or dragged.
    pub fn move_to_current(&mut self, now_ms: f64) -> SoziResult<Option<PlayerEvent>> {
        self.move_to_frame(self.current_frame_index, now_ms)
    }

    /// Advance running transitions to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Option<PlayerEvent> {
        let mut changed = None;
        for event in self.animator.step(now_ms) {
            if let Some(e) = self.handle(event) {
                changed = Some(e);
            }
        }
        changed
    }

    /// Stop a running transition where it is and commit its target frame.
    pub fn stop(&mut self) -> Option<PlayerEvent> {
        self.interrupt()
    }

    fn interrupt(&mut self) -> Option<PlayerEvent> {
        let event = self.animator.stop()?;
        self.handle(event)
    }

    /// Zoom the selected cameras by `steps` wheel notches around pixel `(x, y)`.
    pub fn zoom(&mut self, steps: i32, x: f64, y: f64) -> Option<PlayerEvent> {
        let changed = self.interrupt();
        self.viewport.zoom(self.settings.scale_factor.powi(steps), x, y);
        changed
    }

    /// Rotate the selected cameras by `steps` rotation steps.
    pub fn rotate(&mut self, steps: i32) -> Option<PlayerEvent> {
        let changed = self.interrupt();
        self.viewport.rotate(self.settings.rotate_step * f64::from(steps));
        changed
    }

    fn handle(&mut self, event: AnimatorEvent) -> Option<PlayerEvent> {
        match event {
            AnimatorEvent::Step(progress) => {
                for t in &self.transitions {
                    let state = t.state_at(progress);
                    if let Some(camera) = self.viewport.camera_mut(&t.layer) {
                        camera.state = state;
                        camera.update();
                    }
                }
                None
            }
            AnimatorEvent::Done | AnimatorEvent::Stop => {
                self.transitions.clear();
                self.current_frame_index = self.target_frame_index;
                tracing::debug!(index = self.current_frame_index, ?event, "frame changed");
                Some(PlayerEvent::FrameChanged(self.current_frame_index))
            }
        }
    }
}

fn resolve_frame<P: GeometryProvider>(
    presentation: &Presentation,
    frame: &Frame,
    provider: &P,
    base: CameraState,
) -> SoziResult<ResolvedFrame> {
    let mut states = Vec::with_capacity(presentation.layers.len());
    let mut layers = Vec::with_capacity(presentation.layers.len());
    for layer in &presentation.layers {
        let props = frame.properties_for(&layer.key);

        let mut state = base;
        if let Some(stored) = frame.stored_state_for(&layer.key) {
            state.load_storable(stored);
        }
        if let Some(id) = props.reference_element_id() {
            match provider.find(id) {
                Some(node) => {
                    state.set_at_element(provider, &node, frame.offset_for(&layer.key))?;
                }
                None => tracing::warn!(
                    frame = %frame.frame_id,
                    layer = %layer.key,
                    id,
                    "reference element not found, using stored state"
                ),
            }
        }
        states.push(state);

        let path = props.transition_path_id().and_then(|id| {
            let path = provider
                .find(id)
                .and_then(|node| provider.motion_path(&node))
                .map(|p| MotionPath::new(&p));
            if path.is_none() {
                tracing::warn!(
                    frame = %frame.frame_id,
                    layer = %layer.key,
                    id,
                    "transition path not found"
                );
            }
            path
        });
        layers.push(LayerTransition {
            timing: props.transition_timing_function,
            relative_zoom: props.transition_relative_zoom,
            path,
        });
    }
    Ok(ResolvedFrame {
        duration_ms: frame.transition_duration_ms,
        states,
        layers,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/player/playback.rs"]
mod tests;
