use super::{match_statement, Cleanup, CommandInfo, Hook, Plugin, PluginKind, ScriptContext, Settings, Stage};
use crate::error::{PpError, PpErrorKind};
use error_stack::{Report, Result};

const ERROR: CommandInfo = CommandInfo::new("error", "e", "keyword failing the run", "#error");
const WARNING: CommandInfo =
    CommandInfo::new("warning", "w", "keyword printing a warning", "#warning");
const SEPARATOR: CommandInfo = CommandInfo::new("separator", "s", "token separator", " ");

const COMMANDS: &[CommandInfo] = &[ERROR, WARNING, SEPARATOR];

/// `#error` and `#warning` directives
///
/// Runs in the main stage, so only directives left after conditional blocks are resolved
/// fire. `#error` fails the run, `#warning` is logged and the run continues.
#[derive(Debug)]
pub struct DiagnosticPlugin {
    error_keyword: String,
    warning_keyword: String,
    separator: String,
}

impl Default for DiagnosticPlugin {
    fn default() -> Self {
        Self {
            error_keyword: ERROR.default.to_string(),
            warning_keyword: WARNING.default.to_string(),
            separator: SEPARATOR.default.to_string(),
        }
    }
}

impl DiagnosticPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for DiagnosticPlugin {
    fn name(&self) -> &'static str {
        "diagnostic"
    }

    fn prefixes(&self) -> &'static [&'static str] {
        &["diag", "diagnostic"]
    }

    fn commands(&self) -> &'static [CommandInfo] {
        COMMANDS
    }

    fn configure(&mut self, settings: &Settings) -> Result<(), PpError> {
        self.error_keyword = settings.value(&ERROR);
        self.warning_keyword = settings.value(&WARNING);
        self.separator = settings.value(&SEPARATOR);
        Ok(())
    }

    fn hooks(&self) -> Vec<Hook> {
        vec![Hook::new(Stage::OnMain, PluginKind::FullScript)]
    }

    fn cleanup(&self) -> Vec<Cleanup> {
        vec![
            Cleanup::directive(&self.error_keyword, &self.separator),
            Cleanup::directive(&self.warning_keyword, &self.separator),
        ]
    }

    fn on_script(&mut self, _stage: Stage, ctx: &mut ScriptContext<'_>) -> Result<(), PpError> {
        let key = ctx.key().to_string();
        let script = ctx.script_mut()?;
        let sep = self.separator.as_str();
        for (i, line) in script.get_source()?.iter().enumerate() {
            if let Some(args) = match_statement(line, &self.error_keyword, sep) {
                return Err(Report::new(PpError::new(PpErrorKind::Diagnostic, key, i + 1))
                    .attach_printable(args.join(" ")));
            }
            if let Some(args) = match_statement(line, &self.warning_keyword, sep) {
                log::warn!("{key}:{}: {}", i + 1, args.join(" "));
            }
        }
        Ok(())
    }
}
