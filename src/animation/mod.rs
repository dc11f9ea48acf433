pub mod animator;
pub mod timing;
