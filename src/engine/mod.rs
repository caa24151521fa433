//! Engine - pattern compilation, highlighting, scheduling, hotspots

pub mod annotations;
pub mod config;
pub mod core;
pub mod highlighter;
pub mod hotspot;
pub mod pattern;
pub mod scheduler;
pub mod types;

pub use annotations::*;
pub use config::*;
pub use self::core::*;
pub use highlighter::*;
pub use hotspot::*;
pub use pattern::*;
pub use scheduler::*;
pub use types::*;

#[cfg(test)]
mod tests;
