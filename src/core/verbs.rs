//! Status verbs printed by the runner

pub const LOADING: &str = "Loading";
pub const COMPILING: &str = "Compiling";
pub const ORDER: &str = "Order";
pub const WRITING: &str = "Writing";
pub const DONE: &str = "Done";
pub const FAILED: &str = "Failed";
pub const USING: &str = "Using";
