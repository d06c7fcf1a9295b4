//! Plugin interface
//!
//! A plugin declares which stages it runs in and in what form, through [`Hook`]s:
//! - [`PluginKind::LineBefore`]: a function over one line, before full-script plugins
//! - [`PluginKind::FullScript`]: works on the whole script, and may fail the run
//! - [`PluginKind::LineAfter`]: a function over one line, after full-script plugins
//!
//! The preprocessor dispatches by matching `(stage, kind)` against the hooks.

use crate::core::{Definitions, SourceManager, SourceScript};
use crate::error::{PpError, PpErrorKind};
use error_stack::{Report, Result};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

mod conditional;
pub use conditional::*;
mod diagnostic;
pub use diagnostic::*;
mod include;
pub use include::*;
mod settings;
pub use settings::*;

/// Point in the lifecycle of a script at which plugins run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Right after the script is loaded, once per script
    OnLoad,
    /// The only stage in which new scripts can be discovered
    OnMain,
    /// After every script is processed. Full-script plugins do not run in this stage
    OnFinishUp,
}

impl FromStr for Stage {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "onload" => Ok(Stage::OnLoad),
            "onmain" => Ok(Stage::OnMain),
            "onfinishup" => Ok(Stage::OnFinishUp),
            _ => Err(()),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::OnLoad => write!(f, "onload"),
            Stage::OnMain => write!(f, "onmain"),
            Stage::OnFinishUp => write!(f, "onfinishup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    LineBefore,
    FullScript,
    LineAfter,
}

/// A `(stage, kind)` pair a plugin wants to be called for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hook {
    pub stage: Stage,
    pub kind: PluginKind,
}

impl Hook {
    pub const fn new(stage: Stage, kind: PluginKind) -> Self {
        Self { stage, kind }
    }
}

/// Text removed from the compiled output after every script is concatenated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    /// Every occurrence of the token is removed from every line
    Token(String),
    /// Lines whose first token is the directive keyword are removed entirely
    ///
    /// Tokens are split with the separator of the plugin, the same way the plugin
    /// recognizes its directives.
    Directive { keyword: String, separator: String },
}

impl Cleanup {
    pub fn directive(keyword: impl Into<String>, separator: impl Into<String>) -> Self {
        Cleanup::Directive {
            keyword: keyword.into(),
            separator: separator.into(),
        }
    }
}

/// A setting a plugin understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub long: &'static str,
    pub short: &'static str,
    pub help: &'static str,
    pub default: &'static str,
}

impl CommandInfo {
    pub const fn new(
        long: &'static str,
        short: &'static str,
        help: &'static str,
        default: &'static str,
    ) -> Self {
        Self {
            long,
            short,
            help,
            default,
        }
    }
}

/// What a full-script plugin gets to work with
#[derive(Debug)]
pub struct ScriptContext<'a> {
    pub sources: &'a mut SourceManager,
    pub definitions: &'a mut Definitions,
    key: String,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(
        sources: &'a mut SourceManager,
        definitions: &'a mut Definitions,
        key: &str,
    ) -> Self {
        Self {
            sources,
            definitions,
            key: key.to_string(),
        }
    }

    /// Key of the script being processed
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The script being processed
    ///
    /// The index of the script may change while the plugin runs, as inline scripts
    /// are inserted in front of it. The script is always looked up by key.
    pub fn script(&self) -> Result<&SourceScript, PpError> {
        match self.sources.index_of(&self.key) {
            Some(i) => self.sources.script(i).ok_or_else(|| self.missing_script()),
            None => Err(self.missing_script()),
        }
    }

    pub fn script_mut(&mut self) -> Result<&mut SourceScript, PpError> {
        let index = self
            .sources
            .index_of(&self.key)
            .ok_or_else(|| self.missing_script())?;
        let key = self.key.clone();
        self.sources.script_mut(index).ok_or_else(move || {
            Report::new(PpError::new(PpErrorKind::Other, key, 0))
                .attach_printable("script is no longer registered")
        })
    }

    pub fn make_error(&self, kind: PpErrorKind, line: usize) -> PpError {
        PpError::new(kind, self.key.clone(), line)
    }

    fn missing_script(&self) -> Report<PpError> {
        Report::new(self.make_error(PpErrorKind::Other, 0))
            .attach_printable("script is no longer registered")
    }
}

/// A preprocessor plugin
///
/// Plugins are configured once per run, then called for every script at the hooks they declare.
pub trait Plugin {
    /// Name used in messages
    fn name(&self) -> &'static str;

    /// Prefixes selecting the settings of this plugin, e.g. `inc` for `inc:separator`
    fn prefixes(&self) -> &'static [&'static str];

    /// Settings the plugin understands
    fn commands(&self) -> &'static [CommandInfo] {
        &[]
    }

    /// Apply the settings view of this plugin, with prefixes already removed
    fn configure(&mut self, _settings: &Settings) -> Result<(), PpError> {
        Ok(())
    }

    fn hooks(&self) -> Vec<Hook>;

    /// Tokens to strip from the compiled output
    fn cleanup(&self) -> Vec<Cleanup> {
        vec![]
    }

    /// Transform one line. Called for [`PluginKind::LineBefore`] and [`PluginKind::LineAfter`] hooks
    fn on_line(&mut self, _hook: Hook, line: String) -> String {
        line
    }

    /// Process the whole script. Called for [`PluginKind::FullScript`] hooks
    fn on_script(&mut self, _stage: Stage, _ctx: &mut ScriptContext<'_>) -> Result<(), PpError> {
        Ok(())
    }

    fn wants(&self, stage: Stage, kind: PluginKind) -> bool {
        self.hooks().contains(&Hook::new(stage, kind))
    }
}

/// Split a directive line into its arguments if the first token is `keyword`
pub(crate) fn match_statement<'a>(
    line: &'a str,
    keyword: &str,
    separator: &str,
) -> Option<Vec<&'a str>> {
    let tokens = split_tokens(line, separator);
    match tokens.split_first() {
        Some((first, rest)) if *first == keyword => Some(rest.to_vec()),
        _ => None,
    }
}

/// Split a line into non-empty tokens. An empty separator splits on any whitespace.
pub(crate) fn split_tokens<'a>(line: &'a str, separator: &str) -> Vec<&'a str> {
    let line = line.trim();
    if separator.is_empty() {
        line.split_whitespace().collect()
    } else {
        line.split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Parse a stage setting, failing with a config error
pub(crate) fn parse_stage(value: &str, plugin: &str) -> Result<Stage, PpError> {
    value.parse::<Stage>().map_err(|_| {
        Report::new(PpError::new(PpErrorKind::Config, "", 0))
            .attach_printable(format!("invalid stage `{value}` for plugin `{plugin}`"))
    })
}
