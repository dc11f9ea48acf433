use crate::{
    animation::timing::TimingFunction,
    geometry::path::MotionPath,
    view::state::{CameraState, Interpolation},
};

/// An in-flight move of one layer camera from a snapshot to a frame state.
#[derive(Clone, Debug)]
pub struct Transition {
    /// Key of the layer whose camera is driven.
    pub layer: String,
    /// Camera state captured when the transition started.
    pub initial: CameraState,
    pub target: CameraState,
    pub timing: TimingFunction,
    pub relative_zoom: f64,
    pub path: Option<MotionPath>,
    /// Traverse `path` from its end to its start.
    pub reverse: bool,
}

impl Transition {
    pub fn interpolation(&self) -> Interpolation<'_> {
        Interpolation {
            timing: self.timing,
            relative_zoom: self.relative_zoom,
            path: self.path.as_ref(),
            reverse_path: self.reverse,
        }
    }

    /// Camera state at linear progress `progress` in `[0, 1]`.
    pub fn state_at(&self, progress: f64) -> CameraState {
        let mut state = self.initial;
        state.interpolate(&self.initial, &self.target, progress, &self.interpolation());
        state
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/transition.rs"]
mod tests;
