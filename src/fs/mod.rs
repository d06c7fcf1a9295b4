//! Wrapper to perform file system operations
//!

mod content;
pub use content::*;
mod line_ending;
pub use line_ending::*;
mod path;
pub use path::*;
