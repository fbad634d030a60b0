use log::debug;

use super::{error::GrammarError, Grammar, GrammarBuilder, Symbol, EPSILON, EPSILON_TOKEN};

impl Grammar {
    /// Reads the textual format
    ///
    /// ```text
    /// 3
    /// S -> S+T T
    /// T -> T*F F
    /// F -> (S) i
    /// ```
    ///
    /// The count line is optional. Alternatives are separated by whitespace and
    /// split into one symbol per character, except that declared non-terminal
    /// names are matched greedily. `e` alone is the empty production.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut lines = grammar
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .peekable();

        let expected: Option<usize> = match lines.peek() {
            Some((i, line)) if line.chars().all(|c| c.is_ascii_digit()) => {
                let n = line
                    .parse()
                    .map_err(|_| GrammarError::format(*i, "invalid non-terminal count"))?;
                lines.next();
                Some(n)
            }
            _ => None,
        };

        let mut raw_productions: Vec<(usize, &str, Vec<&str>)> = Vec::new();
        let mut last_line = 0;
        for (i, line) in lines {
            if expected.map_or(false, |n| raw_productions.len() == n) {
                break;
            }
            last_line = i;

            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(GrammarError::format(i, "too many \"->\""));
            } else if parts.len() < 2 {
                return Err(GrammarError::format(i, "missing \"->\""));
            }

            let left = parts[0].trim();
            if left.is_empty() {
                return Err(GrammarError::format(i, "empty left side"));
            } else if left.split_whitespace().count() != 1 {
                return Err(GrammarError::format(i, "left side contains whitespace"));
            }

            let rights: Vec<&str> = parts[1].split_whitespace().collect();
            if rights.is_empty() {
                return Err(GrammarError::format(i, "no right side"));
            }

            raw_productions.push((i, left, rights));
        }

        if let Some(n) = expected {
            if raw_productions.len() < n {
                return Err(GrammarError::format(
                    last_line + 1,
                    format!(
                        "expected {} production lines, found {}",
                        n,
                        raw_productions.len()
                    ),
                ));
            }
        }

        let mut builder = GrammarBuilder::new();
        for (_, left, _) in &raw_productions {
            builder.non_terminal(*left);
        }

        let mut names: Vec<&str> = raw_productions.iter().map(|(_, left, _)| *left).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        names.dedup();

        for (i, left, rights) in &raw_productions {
            for right in rights {
                let symbols = split_alternative(right, &names);
                for s in &symbols {
                    if let Symbol::Terminal(name) = s {
                        builder.terminal(name.as_str());
                    }
                }
                debug!("line {}: {} -> {:?}", i, left, symbols);
                builder.production(*left, symbols);
            }
        }

        builder.build()
    }
}

fn split_alternative(right: &str, non_terminals: &[&str]) -> Vec<Symbol> {
    if right == EPSILON_TOKEN || right == EPSILON {
        return Vec::new();
    }

    let mut symbols = Vec::new();
    let mut rest = right;
    while let Some(c) = rest.chars().next() {
        if let Some(nt) = non_terminals.iter().find(|nt| rest.starts_with(*nt)) {
            symbols.push(Symbol::non_terminal(*nt));
            rest = &rest[nt.len()..];
        } else {
            symbols.push(Symbol::terminal(c));
            rest = &rest[c.len_utf8()..];
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use crate::grammar::{GrammarError, Symbol};
    use crate::Grammar;

    #[test]
    fn simple_parse() {
        let g = Grammar::parse("3\nS -> S+T T\nT -> T*F F\nF -> (S) i").unwrap();

        assert_eq!(g.start_symbol(), "S");
        assert_eq!(
            g.non_terminal_iter().collect::<Vec<_>>(),
            vec!["S", "T", "F"]
        );
        assert_eq!(
            g.terminal_iter().collect::<Vec<_>>(),
            vec!["+", "*", "(", ")", "i"]
        );
        assert_eq!(
            g.production(0).right,
            vec![
                Symbol::non_terminal("S"),
                Symbol::terminal("+"),
                Symbol::non_terminal("T")
            ]
        );
        assert_eq!(g.productions_of("F").len(), 2);
    }

    #[test]
    fn parse_without_count() {
        let g = Grammar::parse("  S -> aA e \n A -> bS e\n").unwrap();

        assert_eq!(g.productions().len(), 4);
        assert!(g.production(1).is_epsilon());
        assert!(g.production(3).is_epsilon());
    }

    #[test]
    fn count_limits_lines() {
        let g = Grammar::parse("1\nS -> a\nthis line is ignored").unwrap();
        assert_eq!(g.productions().len(), 1);
    }

    #[test]
    fn multi_char_non_terminal() {
        let g = Grammar::parse("E -> TE'\nE' -> +TE' e\nT -> i").unwrap();

        assert_eq!(
            g.production(0).right,
            vec![Symbol::non_terminal("T"), Symbol::non_terminal("E'")]
        );
        assert_eq!(
            g.production(1).right,
            vec![
                Symbol::terminal("+"),
                Symbol::non_terminal("T"),
                Symbol::non_terminal("E'")
            ]
        );
    }

    #[test]
    fn repeated_left_side_appends() {
        let g = Grammar::parse("S -> a\nS -> b").unwrap();
        assert_eq!(g.productions_of("S"), &[0, 1]);
    }

    #[test]
    fn too_few_lines() {
        assert_eq!(
            Grammar::parse("3\nS -> a\nA -> b"),
            Err(GrammarError::Format {
                line: 4,
                message: "expected 3 production lines, found 2".to_string()
            })
        );
    }

    #[test]
    #[should_panic]
    fn two_rightarrows_parse() {
        let _g = Grammar::parse("S -> a -> b").unwrap();
    }

    #[test]
    #[should_panic]
    fn no_left_parse() {
        let _g = Grammar::parse("-> a").unwrap();
    }

    #[test]
    #[should_panic]
    fn no_arrow_parse() {
        let _g = Grammar::parse("S a").unwrap();
    }

    #[test]
    #[should_panic]
    fn left_contain_space() {
        let _g = Grammar::parse("S a S -> x").unwrap();
    }

    #[test]
    fn empty_parse() {
        assert_eq!(Grammar::parse("  \n  "), Err(GrammarError::NoNonTerminals));
    }
}
