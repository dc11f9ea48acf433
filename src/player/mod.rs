pub mod playback;
pub mod presentation;
pub mod transition;
