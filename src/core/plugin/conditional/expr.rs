//! Evaluation of `#if` conditions
//!
//! Conditions are evaluated strictly left to right with no operator precedence:
//! the operator seen last decides how the next term is combined with the running
//! result. `A || B && C` means `(A || B) && C`. Parentheses group terms.

use crate::core::Definitions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Open,
    Close,
    And,
    Or,
    Not,
    Name(&'a str),
}

/// Operators of the condition language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operators {
    pub and: String,
    pub or: String,
    pub not: String,
}

impl Default for Operators {
    fn default() -> Self {
        Self {
            and: "&&".to_string(),
            or: "||".to_string(),
            not: "!".to_string(),
        }
    }
}

/// Pad operators and parentheses with spaces, so they split into their own tokens
pub fn pad_operators(expr: &str, ops: &Operators) -> String {
    let mut padded = expr.replace('(', " ( ").replace(')', " ) ");
    for op in [&ops.and, &ops.or, &ops.not] {
        if !op.is_empty() {
            padded = padded.replace(op.as_str(), &format!(" {op} "));
        }
    }
    padded
}

/// Split a condition into tokens
pub fn tokenize<'a>(padded: &'a str, ops: &Operators) -> Vec<Token<'a>> {
    padded
        .split_whitespace()
        .map(|t| match t {
            "(" => Token::Open,
            ")" => Token::Close,
            t if t == ops.and => Token::And,
            t if t == ops.or => Token::Or,
            t if t == ops.not => Token::Not,
            t => Token::Name(t),
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Combine {
    And,
    Or,
}

/// Evaluate the arguments of an `#if` or `#elseif`
pub fn evaluate(args: &[&str], ops: &Operators, definitions: &Definitions) -> bool {
    let padded = pad_operators(&args.join(" "), ops);
    let tokens = tokenize(&padded, ops);
    log::debug!("evaluating condition {tokens:?}");
    evaluate_tokens(&tokens, definitions)
}

pub fn evaluate_tokens(tokens: &[Token<'_>], definitions: &Definitions) -> bool {
    let mut pos = 0;
    let result = evaluate_group(tokens, &mut pos, definitions);
    if pos < tokens.len() {
        log::error!(
            "unmatched `)` in condition, {} token(s) ignored",
            tokens.len() - pos
        );
    }
    result
}

/// Evaluate until the end of the tokens or an unconsumed `)`
fn evaluate_group(tokens: &[Token<'_>], pos: &mut usize, definitions: &Definitions) -> bool {
    let mut result: Option<bool> = None;
    let mut mode = Combine::And;
    while let Some(token) = tokens.get(*pos) {
        let term = match token {
            Token::Close => break,
            Token::And => {
                mode = Combine::And;
                *pos += 1;
                continue;
            }
            Token::Or => {
                mode = Combine::Or;
                *pos += 1;
                continue;
            }
            Token::Open => evaluate_parenthesized(tokens, pos, definitions),
            Token::Not => {
                *pos += 1;
                match tokens.get(*pos) {
                    Some(Token::Name(name)) => {
                        *pos += 1;
                        !definitions.check(name)
                    }
                    Some(Token::Open) => !evaluate_parenthesized(tokens, pos, definitions),
                    _ => {
                        log::error!("`!` must be followed by a name or a group, treating as false");
                        false
                    }
                }
            }
            Token::Name(name) => {
                *pos += 1;
                definitions.check(name)
            }
        };
        result = Some(match (result, mode) {
            (None, _) => term,
            (Some(r), Combine::And) => r && term,
            (Some(r), Combine::Or) => r || term,
        });
    }
    result.unwrap_or_else(|| {
        log::warn!("empty condition, treating as false");
        false
    })
}

/// Evaluate a group starting at the `(` under `pos`, consuming its `)`
fn evaluate_parenthesized(tokens: &[Token<'_>], pos: &mut usize, definitions: &Definitions) -> bool {
    *pos += 1;
    let value = evaluate_group(tokens, pos, definitions);
    if let Some(Token::Close) = tokens.get(*pos) {
        *pos += 1;
    } else {
        log::error!("missing `)` in condition");
    }
    value
}

#[cfg(test)]
mod ut {
    use super::*;

    fn defs(names: &[&str]) -> Definitions {
        names.iter().collect()
    }

    fn eval(expr: &str, d: &Definitions) -> bool {
        let args = expr.split(' ').filter(|s| !s.is_empty()).collect::<Vec<_>>();
        evaluate(&args, &Operators::default(), d)
    }

    #[test]
    fn test_single_name() {
        let d = defs(&["A"]);
        assert!(eval("A", &d));
        assert!(!eval("B", &d));
        assert!(!eval("!A", &d));
        assert!(eval("!B", &d));
    }

    #[test]
    fn test_left_to_right() {
        // A = false, B = true, C = false
        let d = defs(&["B"]);
        assert!(!eval("A || B && C", &d));
        assert!(eval("A && C || B", &d));
    }

    #[test]
    fn test_parentheses() {
        let d = defs(&["B"]);
        assert!(eval("A || (B && !C)", &d));
        assert!(!eval("(A || B) && C", &d));
        assert!(eval("((B))", &d));
        assert!(eval("(A||B)", &d));
    }

    #[test]
    fn test_not_group() {
        let d = defs(&["A"]);
        assert!(eval("!(B)", &d));
        assert!(!eval("!(A)", &d));
        assert!(eval("!(A && B)", &d));
        assert!(!eval("!(A || B)", &d));
        assert!(eval("A && !(B || C)", &d));
        assert!(eval("!((B))", &d));
        // missing `)` closes at the end, then negates
        assert!(eval("!(B", &d));
    }

    #[test]
    fn test_unpadded_operators() {
        let d = defs(&["A", "B"]);
        assert!(eval("A&&B", &d));
        assert!(!eval("A&&!B", &d));
        assert!(eval("!C&&(A||C)", &d));
    }

    #[test]
    fn test_bare_not_is_false() {
        let d = defs(&["A"]);
        assert!(!eval("!", &d));
        assert!(!eval("A && !", &d));
        assert!(eval("! || A", &d));
    }

    #[test]
    fn test_empty_is_false() {
        let d = defs(&["A"]);
        assert!(!eval("", &d));
        assert!(!eval("()", &d));
    }

    #[test]
    fn test_unbalanced() {
        let d = defs(&["A"]);
        // missing `)` closes at the end
        assert!(eval("(A", &d));
        // stray `)` stops evaluation
        assert!(eval("A ) && B", &d));
    }

    #[test]
    fn test_custom_operators() {
        let ops = Operators {
            and: "and".to_string(),
            or: "or".to_string(),
            not: "not".to_string(),
        };
        let d = defs(&["A"]);
        let padded = pad_operators("not B and A", &ops);
        let tokens = tokenize(&padded, &ops);
        assert_eq!(
            vec![
                Token::Not,
                Token::Name("B"),
                Token::And,
                Token::Name("A")
            ],
            tokens
        );
        assert!(evaluate_tokens(&tokens, &d));
    }
}
