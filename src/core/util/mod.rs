mod progress;
pub use progress::*;
