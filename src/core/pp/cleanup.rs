use crate::core::plugin::match_statement;
use crate::core::Cleanup;

/// Remove leftover directives and tokens from the compiled lines
///
/// Directive lines are dropped first. Tokens are then removed from what is left,
/// longest first, so a token that contains another one is removed whole.
pub fn strip_cleanups(lines: Vec<String>, cleanups: &[Cleanup]) -> Vec<String> {
    let mut directives = vec![];
    let mut tokens = vec![];
    for cleanup in cleanups {
        match cleanup {
            Cleanup::Directive { keyword, separator } if !keyword.is_empty() => {
                directives.push((keyword.as_str(), separator.as_str()))
            }
            Cleanup::Token(t) if !t.is_empty() => tokens.push(t.as_str()),
            _ => {}
        }
    }
    tokens.sort_by_key(|t| std::cmp::Reverse(t.len()));
    tokens.dedup();

    lines
        .into_iter()
        .filter(|line| {
            !directives
                .iter()
                .any(|(keyword, separator)| is_directive_line(line, keyword, separator))
        })
        .map(|line| {
            tokens
                .iter()
                .fold(line, |line, token| if line.contains(token) { line.replace(token, "") } else { line })
        })
        .collect()
}

/// If the first token of the line is `keyword`, split the way the owning plugin splits it
///
/// A line the plugin would not recognize as its directive is not one here either.
pub fn is_directive_line(line: &str, keyword: &str, separator: &str) -> bool {
    match_statement(line, keyword, separator).is_some()
}

#[cfg(test)]
mod ut {
    use super::*;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_directive_line() {
        assert!(is_directive_line("#include a.txt", "#include", " "));
        assert!(is_directive_line("  #include", "#include", " "));
        assert!(!is_directive_line("#includeinl a.txt", "#include", " "));
        assert!(!is_directive_line("text #include", "#include", " "));
        assert!(is_directive_line("#define,X", "#define", ","));
    }

    #[test]
    fn test_directive_line_follows_separator() {
        assert!(!is_directive_line("#include\ta.txt", "#include", " "));
        assert!(!is_directive_line("#error: stop", "#error", " "));
        assert!(!is_directive_line("#define,X", "#define", " "));
        assert!(is_directive_line("#include\ta.txt", "#include", ""));
        assert!(is_directive_line("#define X", "#define", ""));
    }

    #[test]
    fn test_strip() {
        let cleanups = vec![
            Cleanup::directive("#include", " "),
            Cleanup::directive("#includeinl", " "),
            Cleanup::directive("", " "),
            Cleanup::Token("#else".to_string()),
            Cleanup::Token("#elseif".to_string()),
            Cleanup::Token("".to_string()),
        ];
        let lines = strings(&[
            "#include a.txt",
            "a #elseif b",
            "  #includeinl b.txt",
            "c #else",
            "#includes stay",
            "#include\tstays too",
        ]);
        assert_eq!(
            strings(&["a  b", "c ", "#includes stay", "#include\tstays too"]),
            strip_cleanups(lines, &cleanups)
        );
    }
}
