use serde::Serialize;
use thiserror::Error;

use super::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("syntax error at token {position}: unexpected \"{found}\"{}", expected_suffix(.expected))]
pub struct SyntaxError {
    /// Index into the input tokens, the appended `$` included.
    pub position: usize,
    pub found: Symbol,
    pub expected: Vec<Symbol>,
}

fn expected_suffix(expected: &[Symbol]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(
            ", expected one of: {}",
            expected
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(" ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseOutcome {
    Accept,
    Reject(SyntaxError),
}

impl ParseOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ParseOutcome::Accept)
    }
}

/// One row of a parse trace: the configuration before `action` is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseStep {
    pub stack: String,
    pub input: String,
    pub action: String,
}

/// Turns input tokens into symbols and appends `$` unless already present.
pub fn prepare_input<T: AsRef<str>>(tokens: &[T]) -> Vec<Symbol> {
    let mut input: Vec<Symbol> = tokens
        .iter()
        .map(|t| Symbol::from_token(t.as_ref()))
        .collect();
    if input.last() != Some(&Symbol::EndMarker) {
        input.push(Symbol::EndMarker);
    }
    input
}

/// Splits a string to test into tokens: on whitespace if it has any,
/// otherwise one token per character (`i+i*i`).
pub fn split_input(input: &str) -> Vec<String> {
    let input = input.trim();
    if input.contains(char::is_whitespace) {
        input.split_whitespace().map(|s| s.to_string()).collect()
    } else {
        input.chars().map(|c| c.to_string()).collect()
    }
}

pub(crate) fn join_symbols<'a>(symbols: impl IntoIterator<Item = &'a Symbol>) -> String {
    symbols
        .into_iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::END_MARK;

    #[test]
    fn end_marker_appended_once() {
        assert_eq!(
            prepare_input(&["a", "b"]),
            vec![Symbol::terminal("a"), Symbol::terminal("b"), Symbol::EndMarker]
        );
        assert_eq!(prepare_input(&["a", END_MARK]).len(), 2);
        assert_eq!(prepare_input::<&str>(&[]), vec![Symbol::EndMarker]);
    }

    #[test]
    fn split() {
        assert_eq!(split_input("i+i"), vec!["i", "+", "i"]);
        assert_eq!(split_input(" id + id "), vec!["id", "+", "id"]);
        assert!(split_input("").is_empty());
    }

    #[test]
    fn syntax_error_message() {
        let e = SyntaxError {
            position: 2,
            found: Symbol::EndMarker,
            expected: vec![Symbol::terminal("a"), Symbol::terminal("b")],
        };
        assert_eq!(
            e.to_string(),
            "syntax error at token 2: unexpected \"$\", expected one of: a b"
        );
    }
}
