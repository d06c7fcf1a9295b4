//! Conditional blocks
//!
//! Resolves `#if`/`#elseif`/`#else`/`#endif` chains against the shared [`Definitions`],
//! and applies `#define`/`#undefine` as they are met.
//!
//! A script is resolved in passes. Each pass handles the top level chains only: nested
//! blocks inside a taken branch are copied as they are, and handled by the next pass.
//! Passes repeat until one finds no conditional directive.

use super::{parse_stage, Cleanup, CommandInfo, Hook, Plugin, PluginKind, ScriptContext, Settings, Stage};
use crate::core::Definitions;
use crate::error::{PpError, PpErrorKind};
use error_stack::{Report, Result, ResultExt};

mod block;
pub use block::*;
mod expr;
pub use expr::*;

/// Upper bound on resolution passes for one script
pub const MAX_PASSES: usize = 1024;

const IF: CommandInfo = CommandInfo::new("if", "i", "keyword opening a conditional block", "#if");
const ELSEIF: CommandInfo =
    CommandInfo::new("elseif", "ei", "keyword for an alternative condition", "#elseif");
const ELSE: CommandInfo = CommandInfo::new("else", "e", "keyword for the fallback branch", "#else");
const ENDIF: CommandInfo =
    CommandInfo::new("endif", "en", "keyword closing a conditional block", "#endif");
const DEFINE: CommandInfo = CommandInfo::new("define", "d", "keyword defining names", "#define");
const UNDEFINE: CommandInfo =
    CommandInfo::new("undefine", "u", "keyword undefining names", "#undefine");
const AND: CommandInfo = CommandInfo::new("and", "a", "logical and operator", "&&");
const OR: CommandInfo = CommandInfo::new("or", "o", "logical or operator", "||");
const NOT: CommandInfo = CommandInfo::new("not", "n", "logical not operator", "!");
const SEPARATOR: CommandInfo = CommandInfo::new("separator", "s", "token separator", " ");
const STAGE: CommandInfo =
    CommandInfo::new("stage", "ss", "stage to run in (onload or onmain)", "onload");
const NO_DEFINE: CommandInfo =
    CommandInfo::new("no-define", "nd", "ignore define directives", "false");
const NO_UNDEFINE: CommandInfo =
    CommandInfo::new("no-undefine", "nu", "ignore undefine directives", "false");

const COMMANDS: &[CommandInfo] = &[
    IF, ELSEIF, ELSE, ENDIF, DEFINE, UNDEFINE, AND, OR, NOT, SEPARATOR, STAGE, NO_DEFINE,
    NO_UNDEFINE,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalConfig {
    pub if_keyword: String,
    pub elseif_keyword: String,
    pub else_keyword: String,
    pub endif_keyword: String,
    pub define_keyword: String,
    pub undefine_keyword: String,
    pub operators: Operators,
    pub separator: String,
    pub stage: Stage,
    pub enable_define: bool,
    pub enable_undefine: bool,
}

impl Default for ConditionalConfig {
    fn default() -> Self {
        Self {
            if_keyword: IF.default.to_string(),
            elseif_keyword: ELSEIF.default.to_string(),
            else_keyword: ELSE.default.to_string(),
            endif_keyword: ENDIF.default.to_string(),
            define_keyword: DEFINE.default.to_string(),
            undefine_keyword: UNDEFINE.default.to_string(),
            operators: Operators::default(),
            separator: SEPARATOR.default.to_string(),
            stage: Stage::OnLoad,
            enable_define: true,
            enable_undefine: true,
        }
    }
}

impl ConditionalConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, PpError> {
        let stage = parse_stage(&settings.value(&STAGE), "conditional")?;
        if stage == Stage::OnFinishUp {
            return Err(Report::new(PpError::new(PpErrorKind::Config, "", 0))
                .attach_printable("conditional blocks cannot be resolved in the finish up stage"));
        }
        Ok(Self {
            if_keyword: settings.value(&IF),
            elseif_keyword: settings.value(&ELSEIF),
            else_keyword: settings.value(&ELSE),
            endif_keyword: settings.value(&ENDIF),
            define_keyword: settings.value(&DEFINE),
            undefine_keyword: settings.value(&UNDEFINE),
            operators: Operators {
                and: settings.value(&AND),
                or: settings.value(&OR),
                not: settings.value(&NOT),
            },
            separator: settings.value(&SEPARATOR),
            stage,
            enable_define: !settings.flag(&NO_DEFINE)?,
            enable_undefine: !settings.flag(&NO_UNDEFINE)?,
        })
    }
}

/// Full-script plugin resolving conditional blocks
#[derive(Debug, Default)]
pub struct ConditionalPlugin {
    config: ConditionalConfig,
}

impl ConditionalPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConditionalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConditionalConfig {
        &self.config
    }

    /// Resolve every conditional block in `lines`
    pub fn resolve(
        &self,
        lines: Vec<String>,
        definitions: &mut Definitions,
        key: &str,
    ) -> Result<Vec<String>, PpError> {
        Resolver::new(&self.config, definitions, key).run(lines)
    }
}

impl Plugin for ConditionalPlugin {
    fn name(&self) -> &'static str {
        "conditional"
    }

    fn prefixes(&self) -> &'static [&'static str] {
        &["cond", "conditional"]
    }

    fn commands(&self) -> &'static [CommandInfo] {
        COMMANDS
    }

    fn configure(&mut self, settings: &Settings) -> Result<(), PpError> {
        self.config = ConditionalConfig::from_settings(settings)?;
        Ok(())
    }

    fn hooks(&self) -> Vec<Hook> {
        vec![Hook::new(self.config.stage, PluginKind::FullScript)]
    }

    fn cleanup(&self) -> Vec<Cleanup> {
        let mut cleanup = vec![
            Cleanup::Token(self.config.if_keyword.clone()),
            Cleanup::Token(self.config.elseif_keyword.clone()),
            Cleanup::Token(self.config.else_keyword.clone()),
            Cleanup::Token(self.config.endif_keyword.clone()),
        ];
        if self.config.enable_define {
            cleanup.push(Cleanup::directive(&self.config.define_keyword, &self.config.separator));
        }
        if self.config.enable_undefine {
            cleanup.push(Cleanup::directive(&self.config.undefine_keyword, &self.config.separator));
        }
        cleanup
    }

    fn on_script(&mut self, _stage: Stage, ctx: &mut ScriptContext<'_>) -> Result<(), PpError> {
        let key = ctx.key().to_string();
        let lines = std::mem::take(ctx.script_mut()?.source_mut()?);
        let resolved = self.resolve(lines, ctx.definitions, &key)?;
        log::debug!("{key}: {} line(s) after conditionals", resolved.len());
        ctx.script_mut()?.set_source(resolved);
        Ok(())
    }
}

/// State of resolving one script
struct Resolver<'a> {
    cfg: &'a ConditionalConfig,
    definitions: &'a mut Definitions,
    key: &'a str,
    open_if: usize,
    /// No branch of the current chain has been taken yet
    else_is_valid: bool,
    /// The current chain already had its `#else`
    saw_else: bool,
}

impl<'a> Resolver<'a> {
    fn new(cfg: &'a ConditionalConfig, definitions: &'a mut Definitions, key: &'a str) -> Self {
        Self {
            cfg,
            definitions,
            key,
            open_if: 0,
            else_is_valid: false,
            saw_else: false,
        }
    }

    fn run(mut self, mut source: Vec<String>) -> Result<Vec<String>, PpError> {
        for pass in 1..=MAX_PASSES {
            let (output, solved) = self
                .pass(&source)
                .attach_printable_lazy(|| format!("in resolution pass {pass}"))?;
            if solved == 0 {
                if self.open_if != 0 {
                    return Err(Report::new(self.error(0)).attach_printable(format!(
                        "{} conditional block(s) not closed with `{}`",
                        self.open_if, self.cfg.endif_keyword
                    )));
                }
                return Ok(output);
            }
            log::debug!("{}: pass {pass} resolved {solved} directive(s)", self.key);
            source = output;
        }
        Err(Report::new(self.error(0))
            .attach_printable(format!("conditional blocks not resolved after {MAX_PASSES} passes")))
    }

    /// Run one pass, returning the output and the number of conditional directives handled
    fn pass(&mut self, source: &[String]) -> Result<(Vec<String>, usize), PpError> {
        let mut output = Vec::with_capacity(source.len());
        let mut solved = 0;
        let mut i = 0;
        while i < source.len() {
            let line = &source[i];
            match Statement::detect(line, self.cfg) {
                Statement::If(args) => {
                    solved += 1;
                    self.open_if += 1;
                    let result = evaluate(&args, &self.cfg.operators, &*self.definitions);
                    let end = find_block_end(source, i, self.cfg);
                    if result {
                        output.extend_from_slice(&source[i + 1..end]);
                    }
                    self.else_is_valid = !result;
                    self.saw_else = false;
                    i = end;
                    continue;
                }
                Statement::ElseIf(args) => {
                    self.check_open(i, &self.cfg.elseif_keyword)?;
                    if self.saw_else {
                        return Err(Report::new(self.error(i + 1)).attach_printable(format!(
                            "`{}` after `{}`",
                            self.cfg.elseif_keyword, self.cfg.else_keyword
                        )));
                    }
                    solved += 1;
                    let end = find_block_end(source, i, self.cfg);
                    if self.else_is_valid {
                        let result = evaluate(&args, &self.cfg.operators, &*self.definitions);
                        if result {
                            output.extend_from_slice(&source[i + 1..end]);
                        }
                        self.else_is_valid &= !result;
                    }
                    i = end;
                    continue;
                }
                Statement::Else => {
                    self.check_open(i, &self.cfg.else_keyword)?;
                    solved += 1;
                    let end = find_block_end(source, i, self.cfg);
                    if self.else_is_valid {
                        output.extend_from_slice(&source[i + 1..end]);
                    }
                    self.else_is_valid = false;
                    self.saw_else = true;
                    i = end;
                    continue;
                }
                Statement::EndIf => {
                    if self.open_if == 0 {
                        return Err(Report::new(self.error(i + 1)).attach_printable(format!(
                            "`{}` without matching `{}`",
                            self.cfg.endif_keyword, self.cfg.if_keyword
                        )));
                    }
                    solved += 1;
                    self.open_if -= 1;
                    self.saw_else = false;
                }
                Statement::Define(args) => {
                    self.definitions.define(&args);
                    output.push(line.clone());
                }
                Statement::Undefine(args) => {
                    self.definitions.undefine(&args);
                    output.push(line.clone());
                }
                Statement::Text => output.push(line.clone()),
            }
            i += 1;
        }
        Ok((output, solved))
    }

    fn check_open(&self, i: usize, keyword: &str) -> Result<(), PpError> {
        if self.open_if == 0 {
            return Err(Report::new(self.error(i + 1)).attach_printable(format!(
                "`{keyword}` without an open `{}`",
                self.cfg.if_keyword
            )));
        }
        Ok(())
    }

    fn error(&self, line: usize) -> PpError {
        PpError::new(PpErrorKind::Conditional, self.key, line)
    }
}

#[cfg(test)]
mod ut {
    use super::*;

    fn resolve(text: &str, defs: &mut Definitions) -> Result<Vec<String>, PpError> {
        let lines = text.lines().map(String::from).collect();
        ConditionalPlugin::new().resolve(lines, defs, "test")
    }

    fn resolve_ok(text: &str, names: &[&str]) -> Vec<String> {
        let mut defs = names.iter().collect();
        resolve(text, &mut defs).unwrap()
    }

    fn resolve_err(text: &str) -> PpError {
        let mut defs = Definitions::new();
        let report = resolve(text, &mut defs).unwrap_err();
        let ctx = report.current_context();
        PpError::new(ctx.kind, ctx.file.clone(), ctx.line)
    }

    #[test]
    fn test_no_directives() {
        assert_eq!(vec!["a", "b"], resolve_ok("a\nb", &[]));
    }

    #[test]
    fn test_if_else_undefined() {
        assert_eq!(vec!["bye"], resolve_ok("#if A\nhello\n#else\nbye\n#endif", &[]));
    }

    #[test]
    fn test_if_else_defined() {
        assert_eq!(vec!["hello"], resolve_ok("#if A\nhello\n#else\nbye\n#endif", &["A"]));
    }

    #[test]
    fn test_elseif_chain() {
        let text = "#if A\na\n#elseif B\nb\n#elseif C\nc\n#else\nd\n#endif";
        assert_eq!(vec!["a"], resolve_ok(text, &["A", "B"]));
        assert_eq!(vec!["b"], resolve_ok(text, &["B", "C"]));
        assert_eq!(vec!["c"], resolve_ok(text, &["C"]));
        assert_eq!(vec!["d"], resolve_ok(text, &[]));
    }

    #[test]
    fn test_left_to_right_condition() {
        // (A || B) && C with only B defined
        assert_eq!(vec!["no"], resolve_ok("#if A || B && C\nyes\n#else\nno\n#endif", &["B"]));
    }

    #[test]
    fn test_nested_matches_own_endif() {
        let text = "#if A\n#if B\ninner\n#endif\nouter\n#endif\nafter";
        assert_eq!(vec!["inner", "outer", "after"], resolve_ok(text, &["A", "B"]));
        assert_eq!(vec!["outer", "after"], resolve_ok(text, &["A"]));
        assert_eq!(vec!["after"], resolve_ok(text, &["B"]));
    }

    #[test]
    fn test_nested_adjacent_blocks() {
        let text = "#if A\n#if B\nb\n#endif\n#if C\nc\n#endif\n#else\nnot a\n#endif";
        assert_eq!(vec!["b", "c"], resolve_ok(text, &["A", "B", "C"]));
        assert_eq!(vec!["not a"], resolve_ok(text, &["B", "C"]));
    }

    #[test]
    fn test_define_same_pass() {
        let text = "#define X\n#if X\nhello\n#else\nbye\n#endif";
        let mut defs = Definitions::new();
        let out = resolve(text, &mut defs).unwrap();
        assert_eq!(vec!["#define X", "hello"], out);
        assert!(defs.check("X"));
    }

    #[test]
    fn test_define_in_branch() {
        // the define only applies when the next pass reaches it,
        // after `#if B` was already evaluated
        let text = "#if A\n#define B\n#endif\n#if B\nb\n#endif";
        let mut defs = ["A"].iter().collect();
        assert_eq!(vec!["#define B"], resolve(text, &mut defs).unwrap());
        assert!(defs.check("B"));
        let mut defs = Definitions::new();
        assert_eq!(Vec::<String>::new(), resolve(text, &mut defs).unwrap());
        assert!(!defs.check("B"));
    }

    #[test]
    fn test_undefine() {
        let text = "#undefine A\n#if A\na\n#endif";
        let mut defs = ["A"].iter().collect::<Definitions>();
        assert_eq!(vec!["#undefine A"], resolve(text, &mut defs).unwrap());
        assert!(!defs.check("A"));
    }

    #[test]
    fn test_unmatched_endif() {
        let e = resolve_err("a\n#endif");
        assert_eq!(PpErrorKind::Conditional, e.kind);
        assert_eq!(2, e.line);
        assert_eq!("test", e.file);
    }

    #[test]
    fn test_else_without_if() {
        assert_eq!(PpErrorKind::Conditional, resolve_err("#else\na").kind);
        assert_eq!(PpErrorKind::Conditional, resolve_err("#elseif A\na").kind);
        assert_eq!(
            PpErrorKind::Conditional,
            resolve_err("#if A\n#endif\n#else\nb\n#endif").kind
        );
    }

    #[test]
    fn test_elseif_after_else() {
        let e = resolve_err("#if A\na\n#else\nb\n#elseif B\nc\n#endif");
        assert_eq!(PpErrorKind::Conditional, e.kind);
        assert_eq!(5, e.line);
    }

    #[test]
    fn test_unterminated() {
        let e = resolve_err("#if A\na");
        assert_eq!(PpErrorKind::Conditional, e.kind);
        assert_eq!(0, e.line);
        assert_eq!(PpErrorKind::Conditional, resolve_err("#if A\n#if B\n#endif").kind);
    }

    #[test]
    fn test_custom_keywords() {
        let settings = Settings::parse(["if=%when", "endif=%end", "else=%otherwise"])
            .unwrap();
        let mut plugin = ConditionalPlugin::new();
        plugin.configure(&settings).unwrap();
        let lines = vec!["%when A", "a", "%otherwise", "b", "%end"]
            .into_iter()
            .map(String::from)
            .collect();
        let mut defs = Definitions::new();
        assert_eq!(vec!["b"], plugin.resolve(lines, &mut defs, "k").unwrap());
    }

    #[test]
    fn test_configure_stage() {
        let mut plugin = ConditionalPlugin::new();
        assert_eq!(vec![Hook::new(Stage::OnLoad, PluginKind::FullScript)], plugin.hooks());
        plugin.configure(&Settings::parse(["stage=onmain"]).unwrap()).unwrap();
        assert_eq!(vec![Hook::new(Stage::OnMain, PluginKind::FullScript)], plugin.hooks());
        assert!(plugin.configure(&Settings::parse(["stage=onfinishup"]).unwrap()).is_err());
        assert!(plugin.configure(&Settings::parse(["stage=never"]).unwrap()).is_err());
    }

    #[test]
    fn test_cleanup_without_define() {
        let mut plugin = ConditionalPlugin::new();
        assert_eq!(6, plugin.cleanup().len());
        plugin.configure(&Settings::parse(["no-define"]).unwrap()).unwrap();
        assert!(!plugin.cleanup().contains(&Cleanup::directive("#define", " ")));
        assert!(plugin.cleanup().contains(&Cleanup::directive("#undefine", " ")));
    }
}
