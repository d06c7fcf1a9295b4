//! # extpp
//! A staged, plugin-driven preprocessor for text files.
//!
//! Scripts go through three stages: `onload` when a script is first loaded, `onmain`
//! where includes are discovered, and `onfinishup` after every script is done. The bundled
//! plugins resolve `#if`/`#elseif`/`#else`/`#endif` blocks, follow `#include` and
//! `#includeinl` directives, and fail on `#error`. The compiled output is every script
//! flattened into one sequence of lines, included files first.
//!
//! # extpp as a library
//! Use [`extpp`] or [`Extpp::run`] to compile files into an output file, or
//! [`PreProcessor::run`] to compile content handles into lines.

mod core;
pub use crate::core::{
    extpp, Cleanup, CommandInfo, ConditionalConfig, ConditionalPlugin, Config, CreationPhase,
    Definitions, DiagnosticPlugin, ExecuteError, Extpp, Hook, ImportOutcome, IncludeConfig,
    IncludePlugin, Operators, Plugin, PluginKind, PreProcessor, ProcessStage, ResolutionScheme,
    ScriptContext, Settings, SourceManager, SourceScript, Stage, Verbosity, MAX_PASSES,
};
pub use crate::core::resolve_by_path;
pub mod error;
mod fs;
pub use crate::fs::{AbsPath, Content, MemoryContent, PathContent};
