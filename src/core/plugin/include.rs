use super::{match_statement, Cleanup, CommandInfo, Hook, Plugin, PluginKind, ScriptContext, Settings, Stage};
use crate::error::{PpError, PpErrorKind};
use crate::fs::{Content, PathContent};
use error_stack::{Report, Result};
use std::path::Path;

const INCLUDE: CommandInfo =
    CommandInfo::new("include", "i", "keyword including a file", "#include");
const INCLUDE_INLINE: CommandInfo = CommandInfo::new(
    "includeinl",
    "ii",
    "keyword including a file in front of the queue",
    "#includeinl",
);
const SEPARATOR: CommandInfo = CommandInfo::new("separator", "s", "token separator", " ");

const COMMANDS: &[CommandInfo] = &[INCLUDE, INCLUDE_INLINE, SEPARATOR];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeConfig {
    pub include_keyword: String,
    pub include_inline_keyword: String,
    pub separator: String,
}

impl Default for IncludeConfig {
    fn default() -> Self {
        Self {
            include_keyword: INCLUDE.default.to_string(),
            include_inline_keyword: INCLUDE_INLINE.default.to_string(),
            separator: SEPARATOR.default.to_string(),
        }
    }
}

/// Full-script plugin discovering included files
///
/// Every include directive is resolved with the resolution scheme of the
/// [`SourceManager`](crate::SourceManager). New files are queued, files already known
/// are moved to the end so they are emitted before the script that included them.
#[derive(Debug, Default)]
pub struct IncludePlugin {
    config: IncludeConfig,
}

/// An include directive found in a script
#[derive(Debug)]
struct IncludeMatch {
    line: usize,
    args: Vec<String>,
    is_inline: bool,
}

impl IncludePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IncludeConfig) -> Self {
        Self { config }
    }

    /// Find include directives, inline ones first
    fn find_includes(&self, lines: &[String]) -> Vec<IncludeMatch> {
        let sep = self.config.separator.as_str();
        let mut found = vec![];
        for (i, line) in lines.iter().enumerate() {
            if let Some(args) = match_statement(line, &self.config.include_inline_keyword, sep) {
                found.push(IncludeMatch {
                    line: i + 1,
                    args: args.into_iter().map(String::from).collect(),
                    is_inline: true,
                });
            }
        }
        for (i, line) in lines.iter().enumerate() {
            if found.iter().any(|m| m.is_inline && m.line == i + 1) {
                continue;
            }
            if let Some(args) = match_statement(line, &self.config.include_keyword, sep) {
                found.push(IncludeMatch {
                    line: i + 1,
                    args: args.into_iter().map(String::from).collect(),
                    is_inline: false,
                });
            }
        }
        found
    }

    fn include(
        &self,
        ctx: &mut ScriptContext<'_>,
        dir: &Path,
        m: IncludeMatch,
    ) -> Result<(), PpError> {
        let outcome = match ctx.sources.resolve(&m.args, dir) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!(
                    "{}:{}: could not resolve include arguments `{}`",
                    ctx.key(),
                    m.line,
                    m.args.join(" ")
                );
                return Err(e
                    .change_context(ctx.make_error(PpErrorKind::Include, m.line))
                    .attach_printable(format!(
                        "could not resolve include arguments `{}`",
                        m.args.join(" ")
                    )));
            }
        };

        let path = dir.join(outcome.filename());
        let content = PathContent::new(&path, outcome.key())
            .with_defined_name(outcome.defined_name());
        if !content.has_valid_path() {
            log::error!(
                "{}:{}: included file `{}` does not exist",
                ctx.key(),
                m.line,
                path.display()
            );
            return Err(Report::new(ctx.make_error(PpErrorKind::Include, m.line))
                .attach_printable(format!("included file `{}` does not exist", path.display())));
        }

        if ctx.sources.is_included(outcome.key()) {
            ctx.sources.fix_order(outcome.key());
            return Ok(());
        }
        if let Some(mut script) = ctx.sources.try_create_script(Box::new(content), m.is_inline) {
            for (field, value) in outcome.extras() {
                script.set_payload(field, value.to_string());
            }
            ctx.sources.add_to_todo(script);
        }
        Ok(())
    }
}

impl Plugin for IncludePlugin {
    fn name(&self) -> &'static str {
        "include"
    }

    fn prefixes(&self) -> &'static [&'static str] {
        &["inc", "include"]
    }

    fn commands(&self) -> &'static [CommandInfo] {
        COMMANDS
    }

    fn configure(&mut self, settings: &Settings) -> Result<(), PpError> {
        self.config = IncludeConfig {
            include_keyword: settings.value(&INCLUDE),
            include_inline_keyword: settings.value(&INCLUDE_INLINE),
            separator: settings.value(&SEPARATOR),
        };
        Ok(())
    }

    fn hooks(&self) -> Vec<Hook> {
        vec![Hook::new(Stage::OnMain, PluginKind::FullScript)]
    }

    fn cleanup(&self) -> Vec<Cleanup> {
        vec![
            Cleanup::directive(&self.config.include_keyword, &self.config.separator),
            Cleanup::directive(&self.config.include_inline_keyword, &self.config.separator),
        ]
    }

    fn on_script(&mut self, _stage: Stage, ctx: &mut ScriptContext<'_>) -> Result<(), PpError> {
        let script = ctx.script_mut()?;
        let dir = script.directory();
        let includes = self.find_includes(script.get_source()?);
        log::debug!("{}: {} include(s)", ctx.key(), includes.len());
        for m in includes {
            self.include(ctx, &dir, m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod ut {
    use super::*;
    use crate::core::{CreationPhase, Definitions, ImportOutcome, SourceManager};
    use crate::fs::MemoryContent;
    use std::path::PathBuf;

    fn fixture_dir() -> PathBuf {
        let dir = PathBuf::from("target/test_out/include_plugin");
        std::fs::create_dir_all(dir.join("sub")).unwrap();
        std::fs::write(dir.join("a.txt"), "a\n").unwrap();
        std::fs::write(dir.join("b.txt"), "b\n").unwrap();
        std::fs::write(dir.join("sub/c.txt"), "c\n").unwrap();
        dir
    }

    fn manager_with(lines: &[&str], dir: &Path) -> SourceManager {
        let mut sm = SourceManager::new();
        sm.set_phase(CreationPhase::Discovering);
        let s = sm
            .try_create_script(Box::new(MemoryContent::new(lines.iter().copied(), dir, ".txt")), false)
            .unwrap();
        sm.add_to_todo(s);
        sm
    }

    fn run(sm: &mut SourceManager) -> Result<(), PpError> {
        let key = sm.script(0).unwrap().key().to_string();
        let mut defs = Definitions::new();
        let mut ctx = ScriptContext::new(sm, &mut defs, &key);
        IncludePlugin::new().on_script(Stage::OnMain, &mut ctx)
    }

    #[test]
    fn test_find_includes_inline_first() {
        let lines = ["#include a.txt", "text", "#includeinl b.txt", "#include c.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let found = IncludePlugin::new().find_includes(&lines);
        let summary = found
            .iter()
            .map(|m| (m.line, m.args[0].as_str(), m.is_inline))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![(3, "b.txt", true), (1, "a.txt", false), (4, "c.txt", false)],
            summary
        );
    }

    #[test]
    fn test_include_queues_files() {
        let dir = fixture_dir();
        let mut sm = manager_with(&["#include a.txt", "#includeinl sub/c.txt", "#include b.txt"], &dir);
        run(&mut sm).unwrap();
        assert_eq!(4, sm.len());
        let keys = sm.keys();
        assert!(keys[0].ends_with("c.txt"));
        assert!(keys[1].ends_with("memoryFile.txt"));
        assert!(keys[2].ends_with("a.txt"));
        assert!(keys[3].ends_with("b.txt"));
        assert!(sm.script(0).unwrap().is_inline());
    }

    #[test]
    fn test_include_twice_fixes_order() {
        let dir = fixture_dir();
        let mut sm = manager_with(&["#include a.txt", "#include b.txt", "#include ./a.txt"], &dir);
        run(&mut sm).unwrap();
        let keys = sm.keys();
        assert_eq!(3, keys.len());
        assert!(keys[1].ends_with("b.txt"));
        assert!(keys[2].ends_with("a.txt"));
    }

    #[test]
    fn test_include_missing() {
        let dir = fixture_dir();
        let mut sm = manager_with(&["#include missing.txt"], &dir);
        let e = run(&mut sm).unwrap_err();
        assert_eq!(PpErrorKind::Include, e.current_context().kind);
        assert_eq!(1, e.current_context().line);
        assert_eq!(1, sm.len());
    }

    #[test]
    fn test_include_no_argument() {
        let dir = fixture_dir();
        let mut sm = manager_with(&["text", "#include"], &dir);
        let e = run(&mut sm).unwrap_err();
        assert_eq!(PpErrorKind::Include, e.current_context().kind);
        assert_eq!(2, e.current_context().line);
    }

    #[test]
    fn test_scheme_exists_but_file_missing() {
        let dir = fixture_dir();
        let mut sm = manager_with(&["#include ghost"], &dir)
            .with_scheme(|args, _| Ok(ImportOutcome::new(format!("{}.txt", args[0]), "ghost")));
        let e = run(&mut sm).unwrap_err();
        assert_eq!(PpErrorKind::Include, e.current_context().kind);
    }

    #[test]
    fn test_scheme_failure_is_include_error() {
        let dir = fixture_dir();
        let mut sm = manager_with(&["text", "#include <nowhere>"], &dir)
            .with_scheme(|args, _| Err(Report::new(crate::error::PathError::from(&args[0]))));
        let e = run(&mut sm).unwrap_err();
        assert_eq!(PpErrorKind::Include, e.current_context().kind);
        assert_eq!(2, e.current_context().line);
        assert!(format!("{e:?}").contains("could not resolve include arguments `<nowhere>`"));
        assert_eq!(1, sm.len());
    }

    #[test]
    fn test_scheme_extras_in_payload() {
        let dir = fixture_dir();
        let mut sm = manager_with(&["#include a.txt int float"], &dir).with_scheme(|args, _| {
            Ok(ImportOutcome::new(args[0].clone(), format!("{}<{}>", args[0], args[1..].join(",")))
                .with("genParams", args[1..].join(" ")))
        });
        run(&mut sm).unwrap();
        let s = sm.script(1).unwrap();
        assert_eq!("a.txt<int,float>", s.key());
        assert_eq!(Some(&"int float".to_string()), s.payload::<String>("genParams"));
    }

    #[test]
    fn test_closed_creation_is_noop() {
        let dir = fixture_dir();
        let mut sm = manager_with(&["#include a.txt"], &dir);
        sm.set_phase(CreationPhase::Closed);
        run(&mut sm).unwrap();
        assert_eq!(1, sm.len());
    }
}
