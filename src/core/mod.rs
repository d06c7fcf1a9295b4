mod definitions;
pub use definitions::*;
mod source;
pub use source::*;
mod plugin;
pub use plugin::*;
mod pp;
pub use pp::*;
mod execute;
pub use execute::*;
mod util;
pub use util::*;
pub mod verbs;
