//! Camera interpolation and viewport transforms for zooming SVG presentations.
//!
//! A presentation is a set of *layers* (top-level SVG groups) viewed through
//! one camera each. A [`CameraState`] describes what a camera frames: center,
//! size, rotation and an optional clip rectangle, all in layer user space.
//! [`Camera`] renders a state into a clip rectangle and a `transform`
//! attribute for the current [`ViewportSize`]; [`Viewport`] owns the cameras
//! and fans user gestures out to the selected ones.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: frame records ([`Presentation`]) become camera states, using a
//!    [`GeometryProvider`] for reference elements and motion paths.
//! 2. **Interpolate**: [`CameraState::interpolate`] blends two states with a
//!    [`TimingFunction`], an optional zoom overshoot and an optional path.
//! 3. **Render**: [`Camera::update`] writes pixel clip rectangles and transform
//!    strings; [`Camera::view_transform`] gives the same mapping as an [`Affine`].
//!
//! [`Player`] ties the steps together with an [`Animator`] driven by the host clock.
//!
//! The engine never touches a DOM: geometry comes from a [`GeometryProvider`]
//! such as [`MemoryDocument`] or the `usvg`-backed [`SvgDocument`].
#![forbid(unsafe_code)]

mod animation;
mod foundation;
mod geometry;
mod player;
mod view;

pub use animation::animator::{Animator, AnimatorEvent};
pub use animation::timing::TimingFunction;
pub use foundation::core::{Affine, BezPath, ClipRect, Point, Rect, Vec2, ViewportSize};
pub use foundation::error::{SoziError, SoziResult};
pub use geometry::memory::{MemoryDocument, MemoryElement};
pub use geometry::path::MotionPath;
pub use geometry::provider::{GeometryProvider, document_bounds};
pub use geometry::svg::{SvgDocument, SvgNode};
pub use player::playback::{Player, PlayerEvent};
pub use player::presentation::{
    AUTO_LAYER_KEY, Frame, LayerProperties, PlayerSettings, Presentation,
};
pub use player::transition::Transition;
pub use view::camera::{Camera, Layer, ReferenceCandidate, TransformGroup};
pub use view::state::{CameraState, ElementOffset, Interpolation, StoredCameraState};
pub use view::viewport::{ClipHandle, Gesture, Viewport, ViewportEvent, ViewportState};
