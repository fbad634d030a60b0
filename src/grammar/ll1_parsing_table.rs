use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use super::{
    first_follow::{FirstSets, FollowSets},
    Grammar, Production, Symbol,
};

/// Two productions claiming the same cell. The one already in the cell stays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LL1Conflict {
    pub non_terminal: String,
    pub lookahead: Symbol,
    pub existing: Production,
    pub rejected: Production,
}

/// Prediction table: (non-terminal, lookahead) -> production index.
#[derive(Debug, Clone, PartialEq)]
pub struct LL1Table {
    rows: IndexMap<String, IndexMap<Symbol, usize>>,
    conflicts: Vec<LL1Conflict>,
}

impl LL1Table {
    pub fn build(grammar: &Grammar, first: &FirstSets, follow: &FollowSets) -> Self {
        let mut table = Self {
            rows: grammar
                .non_terminal_iter()
                .map(|nt| (nt.clone(), IndexMap::new()))
                .collect(),
            conflicts: Vec::new(),
        };

        for (idx, production) in grammar.productions().iter().enumerate() {
            let production_first = first.of_sequence(&production.right);

            for a in production_first.iter().filter(|s| s.is_lookahead()) {
                table.assign(grammar, idx, a);
            }

            if production_first.contains(&Symbol::Epsilon) {
                for b in follow.of(&production.left) {
                    table.assign(grammar, idx, b);
                }
            }
        }

        debug!(
            "LL(1) table built with {} conflict(s)",
            table.conflicts.len()
        );
        table
    }

    fn assign(&mut self, grammar: &Grammar, production: usize, lookahead: &Symbol) {
        let left = &grammar.production(production).left;
        let row = match self.rows.get_mut(left) {
            Some(row) => row,
            None => return,
        };

        match row.get(lookahead) {
            None => {
                row.insert(lookahead.clone(), production);
            }
            Some(&existing) if existing == production => {}
            Some(&existing) => {
                let rejected = grammar.production(production);
                if self.conflicts.iter().any(|c| {
                    &c.non_terminal == left && &c.lookahead == lookahead && &c.rejected == rejected
                }) {
                    return;
                }
                debug!(
                    "LL(1) conflict at [{}, {}]: {} vs {}",
                    left,
                    lookahead,
                    grammar.production(existing),
                    grammar.production(production)
                );
                self.conflicts.push(LL1Conflict {
                    non_terminal: left.clone(),
                    lookahead: lookahead.clone(),
                    existing: grammar.production(existing).clone(),
                    rejected: rejected.clone(),
                });
            }
        }
    }

    pub fn get(&self, non_terminal: &str, lookahead: &Symbol) -> Option<usize> {
        self.rows.get(non_terminal)?.get(lookahead).copied()
    }

    /// Filled cells of one row, in the order they were filled.
    pub fn row(&self, non_terminal: &str) -> impl Iterator<Item = (&Symbol, usize)> {
        self.rows
            .get(non_terminal)
            .into_iter()
            .flat_map(|row| row.iter().map(|(s, p)| (s, *p)))
    }

    pub fn conflicts(&self) -> &[LL1Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl Grammar {
    pub fn generate_ll1_parsing_table(&self, first: &FirstSets, follow: &FollowSets) -> LL1Table {
        LL1Table::build(self, first, follow)
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::Symbol;
    use crate::Grammar;

    use super::LL1Table;

    fn table(grammar: &str) -> (Grammar, LL1Table) {
        let g = Grammar::parse(grammar).unwrap();
        let (first, follow) = g.compute_first_follow();
        let t = g.generate_ll1_parsing_table(&first, &follow);
        (g, t)
    }

    #[test]
    fn ll1_expression_grammar() {
        let (g, t) = table("E -> TE'\nE' -> +TE' e\nT -> FT'\nT' -> *FT' e\nF -> (E) i");

        assert!(t.is_ll1());
        let eps = |nt: &str| g.productions_of(nt)[1];
        assert_eq!(t.get("E", &Symbol::terminal("i")), Some(0));
        assert_eq!(t.get("E'", &Symbol::terminal("+")), Some(1));
        assert_eq!(t.get("E'", &Symbol::terminal(")")), Some(eps("E'")));
        assert_eq!(t.get("E'", &Symbol::EndMarker), Some(eps("E'")));
        assert_eq!(t.get("T'", &Symbol::terminal("+")), Some(eps("T'")));
        assert_eq!(t.get("F", &Symbol::terminal("+")), None);
        assert_eq!(t.row("F").count(), 2);
    }

    #[test]
    fn left_recursion_conflicts() {
        let (_, t) = table("3\nS -> S+T T\nT -> T*F F\nF -> (S) i");

        assert!(!t.is_ll1());
        assert!(t
            .conflicts()
            .iter()
            .any(|c| c.non_terminal == "S" && c.lookahead == Symbol::terminal("i")));
        assert!(t.conflicts().iter().any(|c| c.non_terminal == "T"));
        assert!(t.conflicts().iter().all(|c| c.non_terminal != "F"));
    }

    #[test]
    fn first_follow_conflict() {
        let (g, t) = table("S -> Aa\nA -> a e");

        assert_eq!(t.conflicts().len(), 1);
        let c = &t.conflicts()[0];
        assert_eq!(c.non_terminal, "A");
        assert_eq!(c.lookahead, Symbol::terminal("a"));
        assert_eq!(&c.existing, g.production(1));
        assert!(c.rejected.is_epsilon());
        assert_eq!(t.get("A", &Symbol::terminal("a")), Some(1));
    }

    #[test]
    fn conflict_reached_through_first_and_follow() {
        // A -> B claims [A, b] through FIRST(B) and again through FOLLOW(A)
        let (g, t) = table("S -> Ab\nA -> b B\nB -> b e");

        let on_a: Vec<_> = t
            .conflicts()
            .iter()
            .filter(|c| c.non_terminal == "A")
            .collect();
        assert_eq!(on_a.len(), 1);
        assert_eq!(on_a[0].lookahead, Symbol::terminal("b"));
        assert_eq!(&on_a[0].rejected, g.production(2));
        assert_eq!(t.conflicts().len(), 2);
        assert!(t.to_output(&g).to_plaintext().contains("A -> b | B"));
        assert!(!t.to_output(&g).to_plaintext().contains("A -> b | B | B"));
    }

    #[test]
    fn epsilon_on_end_marker() {
        let (_, t) = table("S -> aA e\nA -> bS e");

        assert!(t.is_ll1());
        assert_eq!(t.get("S", &Symbol::EndMarker), Some(1));
        assert_eq!(t.get("A", &Symbol::EndMarker), Some(3));
    }
}
