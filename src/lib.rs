extern crate wasm_bindgen;

use serde_json::json;
use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{
    classify, split_input, ClassificationResult, Classifier, GrammarClass, Grammar, Method,
    ParseOutcome,
};

use grammar::pretty_print::ParseTraceOutput;

fn error_json(e: impl std::fmt::Display) -> String {
    json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn classify_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => serde_json::to_string(&classify(&g)).unwrap_or_else(|e| error_json(e)),
        Err(e) => error_json(e),
    }
}

/// Parses `input` (see [`split_input`]) with the parser named by `method`.
#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, method: &str, input: &str) -> String {
    let g = match crate::Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_json(e),
    };
    let method = match Method::from_name(method) {
        Some(m) => m,
        None => return error_json(format!("unknown parsing method \"{}\"", method)),
    };

    let c = Classifier::new(g);
    let tokens = split_input(input);
    let (outcome, steps) = match method {
        Method::LL1 => match c.ll1_parser() {
            Some(p) => p.parse_with_trace(&tokens),
            None => return error_json(grammar::ClassifyError::NotApplicable(method)),
        },
        Method::SLR1 => match c.slr1_parser() {
            Some(p) => p.parse_with_trace(&tokens),
            None => return error_json(grammar::ClassifyError::NotApplicable(method)),
        },
    };
    serde_json::to_string(&ParseTraceOutput::new(&steps, &outcome)).unwrap_or_else(|e| error_json(e))
}

#[cfg(test)]
mod scenario_tests {
    use crate::grammar::{ClassifyError, GrammarError, Symbol};
    use crate::{Classifier, Grammar, GrammarClass, Method};

    #[test]
    fn left_recursive_expressions() {
        let c = Classifier::new(Grammar::parse("3\nS -> S+T T\nT -> T*F F\nF -> (S) i").unwrap());
        let r = c.classify();

        assert!(!r.ll1);
        assert!(r.slr1);
        assert_eq!(r.class, GrammarClass::SLR1Only);
        assert!(c
            .parse_slr1(&["i", "+", "i", "*", "i"])
            .unwrap()
            .is_accepted());
        assert_eq!(
            c.parse_ll1(&["i"]),
            Err(ClassifyError::NotApplicable(Method::LL1))
        );
    }

    #[test]
    fn nullable_start() {
        let c = Classifier::new(Grammar::parse("2\nS -> aA e\nA -> bS e").unwrap());

        assert_eq!(c.class(), GrammarClass::Both);
        assert!(c.parse_ll1::<&str>(&[]).unwrap().is_accepted());
        assert!(c.parse_slr1::<&str>(&[]).unwrap().is_accepted());
        assert!(c.parse_ll1(&["$"]).unwrap().is_accepted());
        assert!(c.parse_slr1(&["$"]).unwrap().is_accepted());
        assert!(!c.parse_ll1(&["a", "a"]).unwrap().is_accepted());
        assert!(!c.parse_slr1(&["b"]).unwrap().is_accepted());
    }

    #[test]
    fn parsers_agree() {
        let c = Classifier::new(Grammar::parse("S -> aA e\nA -> bS e").unwrap());
        for input in [
            "", "a", "ab", "aba", "abab", "b", "aa", "abb", "ba", "a $", "a $ a", "$ a", "$ $",
        ] {
            let tokens = crate::split_input(input);
            assert_eq!(
                c.parse_ll1(&tokens).unwrap().is_accepted(),
                c.parse_slr1(&tokens).unwrap().is_accepted(),
                "{}",
                input
            );
        }
    }

    #[test]
    fn nothing_after_end_marker() {
        let c = Classifier::new(Grammar::parse("3\nS -> S+T T\nT -> T*F F\nF -> (S) i").unwrap());
        assert!(!c.parse_slr1(&["i", "$", "+", "i"]).unwrap().is_accepted());

        let c = Classifier::new(Grammar::parse("S -> aA e\nA -> bS e").unwrap());
        assert_eq!(
            c.parse_ll1(&["a", "$", "a"]),
            c.parse_slr1(&["a", "$", "a"])
        );
    }

    #[test]
    fn dangling_else() {
        let c = Classifier::new(Grammar::parse("S -> iSeS iS a").unwrap());
        let r = c.classify();

        assert!(!r.slr1);
        assert!(!r.slr1_conflicts.is_empty());
        assert_eq!(
            c.parse_slr1(&["a"]),
            Err(ClassifyError::NotApplicable(Method::SLR1))
        );
    }

    #[test]
    fn undeclared_symbol() {
        let r = Grammar::builder()
            .non_terminal("S")
            .terminal("a")
            .production("S", vec![Symbol::terminal("a"), Symbol::non_terminal("Q")])
            .build();
        assert!(matches!(r, Err(GrammarError::UndefinedSymbol { symbol, .. }) if symbol == "Q"));
    }

    #[test]
    fn classify_json() {
        let json = crate::classify_to_json("3\nS -> S+T T\nT -> T*F F\nF -> (S) i");
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(v["ll1"], false);
        assert_eq!(v["slr1"], true);
        assert_eq!(v["class"], "SLR1Only");
        assert!(!v["ll1_conflicts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn parse_json() {
        let json = crate::parse_to_json("S -> aA e\nA -> bS e", "ll1", "ab");
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["outcome"], "Accept");
        assert!(!v["steps"].as_array().unwrap().is_empty());

        let json = crate::parse_to_json("3\nS -> S+T T\nT -> T*F F\nF -> (S) i", "ll1", "i");
        assert!(json.contains("\"error\""));

        let json = crate::parse_to_json("S -> a", "lalr", "a");
        assert!(json.contains("unknown parsing method"));
    }

    #[test]
    fn grammar_error_json() {
        let json = crate::classify_to_json("S -> a -> b");
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["error"], "Line 1: too many \"->\"");
    }
}
