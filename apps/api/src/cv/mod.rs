// CV builder: section persistence, completeness, rendering and exports.

pub mod completeness;
pub mod export;
pub mod handlers;
pub mod prompts;
pub mod render;
pub mod sections;
pub mod store;
