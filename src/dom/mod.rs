//! Content tree, leaf walking, logical lines

pub mod lines;
pub mod tree;
pub mod walker;

pub use lines::*;
pub use tree::*;
pub use walker::*;
