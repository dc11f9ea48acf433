pub mod camera;
pub mod state;
pub mod viewport;
