// Handler modules
pub mod render;
pub mod utils;

// Re-export all handler functions
pub use render::{RenderRequest, build_engine, handle_render};
pub use utils::{handle_passthrough, handle_version};
