//! The preprocessor
//!
//! Drives every queued script through its stages, then flattens the scripts into one
//! sequence of lines.

use crate::core::{
    ConditionalPlugin, CreationPhase, Definitions, DiagnosticPlugin, Hook, ImportOutcome,
    IncludePlugin, Plugin, PluginKind, ProcessStage, ResolutionScheme, ScriptContext, Settings,
    SourceManager, Stage,
};
use crate::error::{PathError, PpError, PpErrorKind};
use crate::fs::Content;
use derivative::Derivative;
use error_stack::{Report, Result, ResultExt};
use std::path::Path;
use std::rc::Rc;

mod cleanup;
pub use cleanup::*;

/// Orchestrator running plugins over a graph of scripts
///
/// # Example
/// ```
/// use extpp::{Content, Definitions, MemoryContent, PreProcessor, Settings};
///
/// let main = MemoryContent::new(["#define X", "#if X", "hello", "#else", "bye", "#endif"], ".", ".txt");
/// let files: Vec<Box<dyn Content>> = vec![Box::new(main)];
/// let mut pp = PreProcessor::with_default_plugins();
/// let mut definitions = Definitions::new();
/// let lines = pp.run(files, &Settings::new(), &mut definitions).unwrap();
/// assert_eq!(vec!["hello".to_string()], lines);
/// ```
#[derive(Derivative)]
#[derivative(Debug)]
pub struct PreProcessor {
    #[derivative(Debug = "ignore")]
    plugins: Vec<Box<dyn Plugin>>,
    #[derivative(Debug = "ignore")]
    scheme: Option<Rc<ResolutionScheme>>,
    /// Keys of the scripts of the last successful run, in output order
    compiled_keys: Vec<String>,
}

impl PreProcessor {
    /// Create a preprocessor with the plugins, in the order they run within a stage
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self {
            plugins,
            scheme: None,
            compiled_keys: vec![],
        }
    }

    /// Create a preprocessor with conditional, include and diagnostic plugins
    pub fn with_default_plugins() -> Self {
        Self::new(vec![
            Box::new(ConditionalPlugin::new()),
            Box::new(IncludePlugin::new()),
            Box::new(DiagnosticPlugin::new()),
        ])
    }

    /// Use a custom resolution scheme for include arguments
    pub fn with_scheme<F>(mut self, scheme: F) -> Self
    where
        F: Fn(&[String], &Path) -> Result<ImportOutcome, PathError> + 'static,
    {
        self.scheme = Some(Rc::new(scheme));
        self
    }

    /// Keys of the scripts of the last successful run, in output order
    pub fn compiled_keys(&self) -> &[String] {
        &self.compiled_keys
    }

    /// Compile `files` into one sequence of lines
    ///
    /// The files are processed in order, along with every file they include. On failure,
    /// no output is produced. `definitions` may have been changed by the time the failure is
    /// returned.
    pub fn run(
        &mut self,
        files: Vec<Box<dyn Content>>,
        settings: &Settings,
        definitions: &mut Definitions,
    ) -> Result<Vec<String>, PpError> {
        self.compiled_keys.clear();
        let mut sources = self.seed(files);
        self.configure(settings)?;

        while let Some(index) = sources.next_queued() {
            let key = script_key(&sources, index);
            log::info!("processing {key}");

            let loaded = sources.script(index).map_or(false, |s| s.is_loaded());
            if !loaded {
                sources.set_stage(index, ProcessStage::OnLoad);
                if let Some(script) = sources.script_mut(index) {
                    script.get_source()?;
                }
                self.run_stage(Stage::OnLoad, &mut sources, definitions, &key)?;
            }

            let index = find_script(&sources, &key)?;
            sources.set_stage(index, ProcessStage::OnMain);
            sources.set_phase(CreationPhase::Discovering);
            let result = self.run_stage(Stage::OnMain, &mut sources, definitions, &key);
            sources.set_phase(CreationPhase::Closed);
            result?;

            let index = find_script(&sources, &key)?;
            sources.set_stage(index, ProcessStage::OnFinishUp);
        }

        let keys = sources.keys().into_iter().map(String::from).collect::<Vec<_>>();
        log::info!("finishing up {} script(s)", keys.len());
        for key in &keys {
            self.run_stage(Stage::OnFinishUp, &mut sources, definitions, key)?;
        }
        sources.set_all_stages(ProcessStage::Finished);

        let mut output = vec![];
        for i in (0..sources.len()).rev() {
            if let Some(script) = sources.script(i) {
                output.extend(script.lines().iter().cloned());
            }
        }
        let cleanups = self
            .plugins
            .iter()
            .flat_map(|p| p.cleanup())
            .collect::<Vec<_>>();
        let output = strip_cleanups(output, &cleanups);

        self.compiled_keys = keys.into_iter().rev().collect();
        log::info!("compiled {} line(s)", output.len());
        Ok(output)
    }

    /// Register the input files, each in its own creation window
    fn seed(&self, files: Vec<Box<dyn Content>>) -> SourceManager {
        let mut sources = SourceManager::new();
        if let Some(scheme) = &self.scheme {
            let scheme = Rc::clone(scheme);
            sources.set_scheme(Box::new(move |args: &[String], dir: &Path| scheme(args, dir)));
        }
        for content in files {
            sources.set_phase(CreationPhase::Discovering);
            if let Some(script) = sources.try_create_script(content, false) {
                let key = script.key().to_string();
                if !sources.add_to_todo(script) {
                    log::warn!("input {key} is given more than once");
                }
            }
            sources.set_phase(CreationPhase::Closed);
        }
        sources
    }

    fn configure(&mut self, settings: &Settings) -> Result<(), PpError> {
        for plugin in self.plugins.iter_mut() {
            let name = plugin.name();
            let view = settings.with_prefixes(plugin.prefixes());
            log::debug!("configuring plugin {name}");
            plugin
                .configure(&view)
                .attach_printable_lazy(|| format!("could not configure plugin `{name}`"))?;
        }
        Ok(())
    }

    /// Run line-before, full-script, then line-after plugins of a stage on one script
    ///
    /// Full-script plugins are not run in the finish up stage.
    fn run_stage(
        &mut self,
        stage: Stage,
        sources: &mut SourceManager,
        definitions: &mut Definitions,
        key: &str,
    ) -> Result<(), PpError> {
        log::debug!("{key}: entering stage {stage}");
        self.run_line_plugins(Hook::new(stage, PluginKind::LineBefore), sources, key)?;
        if stage != Stage::OnFinishUp {
            for plugin in self.plugins.iter_mut() {
                if !plugin.wants(stage, PluginKind::FullScript) {
                    continue;
                }
                let name = plugin.name();
                let mut ctx = ScriptContext::new(sources, definitions, key);
                plugin
                    .on_script(stage, &mut ctx)
                    .attach_printable_lazy(|| format!("plugin `{name}` failed in stage {stage}"))?;
            }
        }
        self.run_line_plugins(Hook::new(stage, PluginKind::LineAfter), sources, key)
    }

    fn run_line_plugins(
        &mut self,
        hook: Hook,
        sources: &mut SourceManager,
        key: &str,
    ) -> Result<(), PpError> {
        let index = find_script(sources, key)?;
        let script = match sources.script_mut(index) {
            Some(s) => s,
            None => return Ok(()),
        };
        for plugin in self.plugins.iter_mut() {
            if !plugin.wants(hook.stage, hook.kind) {
                continue;
            }
            for line in script.source_mut()?.iter_mut() {
                *line = plugin.on_line(hook, std::mem::take(line));
            }
        }
        Ok(())
    }
}

fn script_key(sources: &SourceManager, index: usize) -> String {
    sources
        .script(index)
        .map(|s| s.key().to_string())
        .unwrap_or_default()
}

fn find_script(sources: &SourceManager, key: &str) -> Result<usize, PpError> {
    sources.index_of(key).ok_or_else(|| {
        Report::new(PpError::new(PpErrorKind::Other, key, 0))
            .attach_printable("script is no longer registered")
    })
}
