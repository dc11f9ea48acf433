pub mod memory;
pub mod path;
pub mod provider;
pub mod svg;
