use log::trace;

use super::{
    outcome::{join_symbols, prepare_input, ParseOutcome, ParseStep, SyntaxError},
    slr1_parsing_table::{Action, SLR1Tables},
    Grammar, Symbol,
};

/// Shift/reduce parser driven by the SLR(1) tables.
#[derive(Debug, Clone, Copy)]
pub struct SLR1Parser<'a> {
    grammar: &'a Grammar,
    tables: &'a SLR1Tables,
}

impl<'a> SLR1Parser<'a> {
    /// `grammar` must be the grammar the tables were built from; production
    /// indices in reduce actions refer to it.
    pub fn new(grammar: &'a Grammar, tables: &'a SLR1Tables) -> Self {
        Self { grammar, tables }
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
        let mut stack: Vec<usize> = vec![0];
        let mut cursor = 0;

        let mut record = |stack: &[usize], cursor: usize, action: String| {
            let stack = stack
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            trace!("SLR(1) [{}] [{}] {}", stack, join_symbols(&input[cursor..]), action);
            if let Some(steps) = steps.as_mut() {
                steps.push(ParseStep {
                    stack,
                    input: join_symbols(&input[cursor..]),
                    action,
                });
            }
        };

        loop {
            let state = match stack.last() {
                Some(&s) => s,
                None => break,
            };
            let current = match input.get(cursor) {
                Some(s) => s.clone(),
                None => break,
            };

            match self.tables.action(state, &current) {
                Some(Action::Shift(v)) => {
                    record(&stack, cursor, format!("shift {}", v));
                    stack.push(v);
                    cursor += 1;
                }
                Some(Action::Reduce(idx)) => {
                    let production = self.grammar.production(idx);
                    record(&stack, cursor, format!("reduce {}", production));
                    let len = production.body().len();
                    stack.truncate(stack.len().saturating_sub(len));

                    let top = stack.last().copied().unwrap_or(0);
                    match self.tables.goto(top, &production.left) {
                        Some(v) => stack.push(v),
                        None => {
                            return ParseOutcome::Reject(SyntaxError {
                                position: cursor,
                                found: current,
                                expected: Vec::new(),
                            })
                        }
                    }
                }
                Some(Action::Accept) => {
                    if let Some(extra) = input.get(cursor + 1) {
                        record(&stack, cursor, "error".to_string());
                        return ParseOutcome::Reject(SyntaxError {
                            position: cursor + 1,
                            found: extra.clone(),
                            expected: Vec::new(),
                        });
                    }
                    record(&stack, cursor, "accept".to_string());
                    return ParseOutcome::Accept;
                }
                None => {
                    record(&stack, cursor, "error".to_string());
                    return ParseOutcome::Reject(SyntaxError {
                        position: cursor,
                        found: current,
                        expected: self.tables.action_row(state).map(|(s, _)| s.clone()).collect(),
                    });
                }
            }
        }

        ParseOutcome::Reject(SyntaxError {
            position: cursor,
            found: Symbol::EndMarker,
            expected: Vec::new(),
        })
    }
}
