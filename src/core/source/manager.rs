use super::{resolve_by_path, ImportOutcome, ResolutionScheme, SourceScript};
use crate::error::PathError;
use crate::fs::Content;
use derivative::Derivative;
use error_stack::Result;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Where a script is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStage {
    /// Waiting to be processed
    Queued,
    OnLoad,
    OnMain,
    /// Processed, waiting for the finish up stage that runs after every script is done
    OnFinishUp,
    Finished,
}

impl Display for ProcessStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessStage::Queued => write!(f, "queued"),
            ProcessStage::OnLoad => write!(f, "onload"),
            ProcessStage::OnMain => write!(f, "onmain"),
            ProcessStage::OnFinishUp => write!(f, "onfinishup"),
            ProcessStage::Finished => write!(f, "finished"),
        }
    }
}

/// If new scripts may be added to the manager
///
/// The graph of scripts only grows while a script is in its main stage.
/// The preprocessor opens creation right before that stage and closes it right after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationPhase {
    Discovering,
    Closed,
}

/// Ordered collection of every script in the run
///
/// The order matters: the compiled output is built by walking the scripts from
/// the last one to the first one.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct SourceManager {
    scripts: Vec<SourceScript>,
    /// Stage of each script, at the same index
    stages: Vec<ProcessStage>,
    #[derivative(Debug = "ignore")]
    scheme: Box<ResolutionScheme>,
    phase: CreationPhase,
}

impl Default for SourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceManager {
    /// Create an empty manager with the default resolution scheme
    pub fn new() -> Self {
        Self {
            scripts: vec![],
            stages: vec![],
            scheme: Box::new(resolve_by_path),
            phase: CreationPhase::Closed,
        }
    }

    /// Replace the resolution scheme used for include arguments
    pub fn with_scheme<F>(mut self, scheme: F) -> Self
    where
        F: Fn(&[String], &Path) -> Result<ImportOutcome, PathError> + 'static,
    {
        self.scheme = Box::new(scheme);
        self
    }

    pub(crate) fn set_scheme(&mut self, scheme: Box<ResolutionScheme>) {
        self.scheme = scheme;
    }

    /// Resolve include arguments with the active scheme
    pub fn resolve(&self, args: &[String], current_dir: &Path) -> Result<ImportOutcome, PathError> {
        (self.scheme)(args, current_dir)
    }

    #[inline]
    pub fn phase(&self) -> CreationPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: CreationPhase) {
        log::debug!("script creation phase: {:?}", phase);
        self.phase = phase;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn script(&self, index: usize) -> Option<&SourceScript> {
        self.scripts.get(index)
    }

    pub fn script_mut(&mut self, index: usize) -> Option<&mut SourceScript> {
        self.scripts.get_mut(index)
    }

    pub fn scripts(&self) -> impl Iterator<Item = &SourceScript> {
        self.scripts.iter()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.scripts.iter().position(|s| s.key() == key)
    }

    /// If a script with the key is registered
    pub fn is_included(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    pub fn stage(&self, index: usize) -> Option<ProcessStage> {
        self.stages.get(index).copied()
    }

    pub fn set_stage(&mut self, index: usize, stage: ProcessStage) {
        if let Some(s) = self.stages.get_mut(index) {
            log::debug!("{} -> {stage}", self.scripts[index].key());
            *s = stage;
        }
    }

    /// Set the stage of every script
    pub(crate) fn set_all_stages(&mut self, stage: ProcessStage) {
        for s in self.stages.iter_mut() {
            *s = stage;
        }
    }

    /// Index of the first queued script, in insertion order
    pub fn next_queued(&self) -> Option<usize> {
        self.stages.iter().position(|s| *s == ProcessStage::Queued)
    }

    /// Create a script from a content handle
    ///
    /// Returns `None` when creation is closed. Scripts may only be created while
    /// a script is in its main stage.
    pub fn try_create_script(
        &self,
        content: Box<dyn Content>,
        is_inline: bool,
    ) -> Option<SourceScript> {
        if self.phase == CreationPhase::Closed {
            log::warn!(
                "cannot create script `{}` outside of the main stage",
                content.key()
            );
            return None;
        }
        Some(SourceScript::new(content, is_inline))
    }

    /// Queue a script for processing
    ///
    /// Inline scripts go to the front, other scripts go to the end.
    /// Returns `false` and does nothing if a script with the same key exists
    /// (use [`fix_order`](Self::fix_order) for that) or if creation is closed.
    pub fn add_to_todo(&mut self, script: SourceScript) -> bool {
        if self.phase == CreationPhase::Closed {
            log::warn!(
                "cannot queue script `{}` outside of the main stage",
                script.key()
            );
            return false;
        }
        if self.is_included(script.key()) {
            log::debug!("script {} is already queued", script.key());
            return false;
        }
        log::info!(
            "queued {} script {}",
            if script.is_inline() { "inline" } else { "new" },
            script.key()
        );
        if script.is_inline() {
            self.scripts.insert(0, script);
            self.stages.insert(0, ProcessStage::Queued);
        } else {
            self.scripts.push(script);
            self.stages.push(ProcessStage::Queued);
        }
        true
    }

    /// Move an existing script to the end
    ///
    /// Output is built from the end, so the script moved here ends up before
    /// every script that was added before it, including the one that referenced it last.
    /// Inline scripts keep their position.
    pub fn fix_order(&mut self, key: &str) {
        let index = match self.index_of(key) {
            Some(i) => i,
            None => return,
        };
        if self.scripts[index].is_inline() {
            return;
        }
        log::debug!("moving {key} to the end");
        let script = self.scripts.remove(index);
        let stage = self.stages.remove(index);
        self.scripts.push(script);
        self.stages.push(stage);
    }

    /// Keys of every script, in order
    pub fn keys(&self) -> Vec<&str> {
        self.scripts.iter().map(SourceScript::key).collect()
    }
}
