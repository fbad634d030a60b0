use log::trace;

use super::{
    ll1_parsing_table::LL1Table,
    outcome::{join_symbols, prepare_input, ParseOutcome, ParseStep, SyntaxError},
    Grammar, Symbol,
};

/// Table-driven predictive parser.
#[derive(Debug, Clone, Copy)]
pub struct LL1Parser<'a> {
    grammar: &'a Grammar,
    table: &'a LL1Table,
}

impl<'a> LL1Parser<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a LL1Table) -> Self {
        Self { grammar, table }
    }

    pub fn parse<T: AsRef<str>>(&self, tokens: &[T]) -> ParseOutcome {
        self.run(tokens, None)
    }

    pub fn parse_with_trace<T: AsRef<str>>(&self, tokens: &[T]) -> (ParseOutcome, Vec<ParseStep>) {
        let mut steps = Vec::new();
        let outcome = self.run(tokens, Some(&mut steps));
        (outcome, steps)
    }

    fn run<T: AsRef<str>>(&self, tokens: &[T], mut steps: Option<&mut Vec<ParseStep>>) -> ParseOutcome {
        let input = prepare_input(tokens);
        let mut stack: Vec<Symbol> = vec![
            Symbol::EndMarker,
            Symbol::non_terminal(self.grammar.start_symbol()),
        ];
        let mut cursor = 0;

        let mut record = |stack: &[Symbol], cursor: usize, action: String| {
            trace!("LL(1) [{}] [{}] {}", join_symbols(stack), join_symbols(&input[cursor..]), action);
            if let Some(steps) = steps.as_mut() {
                steps.push(ParseStep {
                    stack: join_symbols(stack),
                    input: join_symbols(&input[cursor..]),
                    action,
                });
            }
        };

        while let Some(top) = stack.last().cloned() {
            let current = input.get(cursor).cloned().unwrap_or(Symbol::EndMarker);
            match &top {
                Symbol::Terminal(_) | Symbol::EndMarker => {
                    if top != current {
                        record(&stack, cursor, "error".to_string());
                        return ParseOutcome::Reject(SyntaxError {
                            position: cursor,
                            found: current,
                            expected: vec![top.clone()],
                        });
                    }
                    record(&stack, cursor, format!("match {}", top));
                    stack.pop();
                    cursor += 1;
                }
                Symbol::NonTerminal(name) => match self.table.get(name, &current) {
                    Some(idx) => {
                        let production = self.grammar.production(idx);
                        record(&stack, cursor, format!("output {}", production));
                        stack.pop();
                        stack.extend(production.body().iter().rev().cloned());
                    }
                    None => {
                        record(&stack, cursor, "error".to_string());
                        return ParseOutcome::Reject(SyntaxError {
                            position: cursor,
                            found: current,
                            expected: self.table.row(name).map(|(s, _)| s.clone()).collect(),
                        });
                    }
                },
                Symbol::Epsilon => {
                    stack.pop();
                }
            }
        }

        match input.get(cursor) {
            None => {
                record(&stack, cursor, "accept".to_string());
                ParseOutcome::Accept
            }
            Some(found) => ParseOutcome::Reject(SyntaxError {
                position: cursor,
                found: found.clone(),
                expected: Vec::new(),
            }),
        }
    }
}
