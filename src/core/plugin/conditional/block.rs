use super::ConditionalConfig;
use crate::core::plugin::match_statement;

/// Conditional directive on a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    If(Vec<&'a str>),
    ElseIf(Vec<&'a str>),
    Else,
    EndIf,
    Define(Vec<&'a str>),
    Undefine(Vec<&'a str>),
    /// Not a conditional directive
    Text,
}

impl<'a> Statement<'a> {
    /// Detect the directive on a line
    ///
    /// `#define` and `#undefine` are only detected when enabled.
    pub fn detect(line: &'a str, cfg: &ConditionalConfig) -> Self {
        let sep = cfg.separator.as_str();
        if let Some(args) = match_statement(line, &cfg.if_keyword, sep) {
            return Statement::If(args);
        }
        if let Some(args) = match_statement(line, &cfg.elseif_keyword, sep) {
            return Statement::ElseIf(args);
        }
        if match_statement(line, &cfg.else_keyword, sep).is_some() {
            return Statement::Else;
        }
        if match_statement(line, &cfg.endif_keyword, sep).is_some() {
            return Statement::EndIf;
        }
        if cfg.enable_define {
            if let Some(args) = match_statement(line, &cfg.define_keyword, sep) {
                return Statement::Define(args);
            }
        }
        if cfg.enable_undefine {
            if let Some(args) = match_statement(line, &cfg.undefine_keyword, sep) {
                return Statement::Undefine(args);
            }
        }
        Statement::Text
    }
}

/// Find the line that ends the branch starting right after `start`
///
/// Nested `#if` blocks are skipped over as a whole: an `#elseif`, `#else` or `#endif`
/// only ends the branch when every `#if` opened after `start` is closed.
/// Returns `lines.len()` when the branch is never closed.
pub fn find_block_end<S>(lines: &[S], start: usize, cfg: &ConditionalConfig) -> usize
where
    S: AsRef<str>,
{
    let mut tolerance = 0usize;
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        match Statement::detect(line.as_ref(), cfg) {
            Statement::If(_) => tolerance += 1,
            Statement::EndIf => {
                if tolerance == 0 {
                    return i;
                }
                tolerance -= 1;
            }
            Statement::ElseIf(_) | Statement::Else if tolerance == 0 => return i,
            _ => {}
        }
    }
    lines.len()
}
