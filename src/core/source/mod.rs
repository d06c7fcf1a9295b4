//! Scripts and the graph they form
//!
//! [`SourceManager`] owns every [`SourceScript`] of a run, in the order their
//! lines end up in the output (reversed).

mod manager;
pub use manager::*;
mod outcome;
pub use outcome::*;
mod script;
pub use script::*;
