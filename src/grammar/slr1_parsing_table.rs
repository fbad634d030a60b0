use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use super::{first_follow::FollowSets, lr_dfa::Automaton, Grammar, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Shift(usize),
    /// Index of the production to reduce by.
    Reduce(usize),
    Accept,
}

impl Action {
    pub fn to_plaintext(&self, grammar: &Grammar) -> String {
        match self {
            Action::Shift(s) => format!("s{}", s),
            Action::Reduce(p) => format!("r({})", grammar.production(*p)),
            Action::Accept => "acc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift-reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce-reduce"),
        }
    }
}

/// An ACTION cell claimed twice. `existing` stays in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SLR1Conflict {
    pub state: usize,
    pub lookahead: Symbol,
    pub kind: ConflictKind,
    pub existing: Action,
    pub rejected: Action,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SLR1Tables {
    action: Vec<IndexMap<Symbol, Action>>,
    goto: Vec<IndexMap<String, usize>>,
    conflicts: Vec<SLR1Conflict>,
}

impl SLR1Tables {
    pub fn build(automaton: &Automaton, follow: &FollowSets) -> Self {
        let grammar = automaton.grammar();
        let n = automaton.states().len();
        let mut tables = Self {
            action: vec![IndexMap::new(); n],
            goto: vec![IndexMap::new(); n],
            conflicts: Vec::new(),
        };

        for (u, state) in automaton.states().iter().enumerate() {
            for item in &state.items {
                match item.next_symbol(grammar) {
                    Some(a @ Symbol::Terminal(_)) => {
                        if let Some(v) = automaton.transition(u, a) {
                            tables.assign(u, a, Action::Shift(v));
                        }
                    }
                    Some(_) => {}
                    None if item.production == grammar.accept_production() => {
                        tables.assign(u, &Symbol::EndMarker, Action::Accept);
                    }
                    None => {
                        let left = &grammar.production(item.production).left;
                        for b in follow.of(left) {
                            tables.assign(u, b, Action::Reduce(item.production));
                        }
                    }
                }
            }

            for (symbol, &v) in &state.edges {
                if let Symbol::NonTerminal(b) = symbol {
                    tables.goto[u].insert(b.clone(), v);
                }
            }
        }

        debug!(
            "SLR(1) table built for {} states with {} conflict(s)",
            n,
            tables.conflicts.len()
        );
        tables
    }

    fn assign(&mut self, state: usize, lookahead: &Symbol, action: Action) {
        let existing = match self.action[state].get(lookahead) {
            None => {
                self.action[state].insert(lookahead.clone(), action);
                return;
            }
            Some(&existing) if existing == action => return,
            Some(&existing) => existing,
        };

        let kind = match (existing, action) {
            (Action::Shift(_), _) | (_, Action::Shift(_)) => ConflictKind::ShiftReduce,
            _ => ConflictKind::ReduceReduce,
        };
        debug!(
            "SLR(1) {} conflict in state {} on {}: {:?} vs {:?}",
            kind, state, lookahead, existing, action
        );
        self.conflicts.push(SLR1Conflict {
            state,
            lookahead: lookahead.clone(),
            kind,
            existing,
            rejected: action,
        });
    }

    pub fn action(&self, state: usize, lookahead: &Symbol) -> Option<Action> {
        self.action.get(state)?.get(lookahead).copied()
    }

    pub fn goto(&self, state: usize, non_terminal: &str) -> Option<usize> {
        self.goto.get(state)?.get(non_terminal).copied()
    }

    /// Filled ACTION cells of one state.
    pub fn action_row(&self, state: usize) -> impl Iterator<Item = (&Symbol, Action)> {
        self.action
            .get(state)
            .into_iter()
            .flat_map(|row| row.iter().map(|(s, a)| (s, *a)))
    }

    pub fn state_count(&self) -> usize {
        self.action.len()
    }

    pub fn conflicts(&self) -> &[SLR1Conflict] {
        &self.conflicts
    }

    pub fn is_slr1(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl Automaton {
    pub fn to_slr1_parsing_table(&self, follow: &FollowSets) -> SLR1Tables {
        SLR1Tables::build(self, follow)
    }
}
