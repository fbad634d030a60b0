use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;

use super::{Grammar, Symbol};

pub type SymbolSet = BTreeSet<Symbol>;

static EMPTY: SymbolSet = BTreeSet::new();

/// FIRST set of every non-terminal. May contain `Epsilon`.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstSets {
    sets: IndexMap<String, SymbolSet>,
    passes: usize,
}

impl FirstSets {
    pub fn of(&self, non_terminal: &str) -> &SymbolSet {
        self.sets.get(non_terminal).unwrap_or(&EMPTY)
    }

    pub fn is_nullable(&self, non_terminal: &str) -> bool {
        self.of(non_terminal).contains(&Symbol::Epsilon)
    }

    /// FIRST of a string of symbols; `{ε}` for the empty string.
    pub fn of_sequence(&self, symbols: &[Symbol]) -> SymbolSet {
        let mut first = SymbolSet::new();
        for symbol in symbols {
            match symbol {
                Symbol::Epsilon => continue,
                Symbol::Terminal(_) | Symbol::EndMarker => {
                    first.insert(symbol.clone());
                    return first;
                }
                Symbol::NonTerminal(name) => {
                    let nt_first = self.of(name);
                    first.extend(nt_first.iter().filter(|s| **s != Symbol::Epsilon).cloned());
                    if !nt_first.contains(&Symbol::Epsilon) {
                        return first;
                    }
                }
            }
        }
        first.insert(Symbol::Epsilon);
        first
    }

    /// Number of full passes the fixed point took, including the last one
    /// that changed nothing.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolSet)> {
        self.sets.iter()
    }
}

/// FOLLOW set of every non-terminal. May contain `EndMarker`, never `Epsilon`.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowSets {
    sets: IndexMap<String, SymbolSet>,
    passes: usize,
}

impl FollowSets {
    pub fn of(&self, non_terminal: &str) -> &SymbolSet {
        self.sets.get(non_terminal).unwrap_or(&EMPTY)
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolSet)> {
        self.sets.iter()
    }
}

impl Grammar {
    pub fn compute_first_follow(&self) -> (FirstSets, FollowSets) {
        let first = self.calculate_first();
        let follow = self.calculate_follow(&first);
        (first, follow)
    }

    fn calculate_first(&self) -> FirstSets {
        let mut first = FirstSets {
            sets: self
                .non_terminal_iter()
                .map(|nt| (nt.clone(), SymbolSet::new()))
                .collect(),
            passes: 0,
        };

        let mut changed = true;
        while changed {
            changed = false;
            first.passes += 1;
            for production in self.productions() {
                let production_first = first.of_sequence(&production.right);
                if let Some(left_first) = first.sets.get_mut(&production.left) {
                    for s in production_first {
                        changed |= left_first.insert(s);
                    }
                }
            }
        }

        debug!("FIRST reached its fixed point after {} passes", first.passes);
        first
    }

    fn calculate_follow(&self, first: &FirstSets) -> FollowSets {
        let mut follow = FollowSets {
            sets: self
                .non_terminal_iter()
                .map(|nt| (nt.clone(), SymbolSet::new()))
                .collect(),
            passes: 0,
        };
        if let Some(start) = follow.sets.get_mut(self.start_symbol()) {
            start.insert(Symbol::EndMarker);
        }

        let mut changed = true;
        while changed {
            changed = false;
            follow.passes += 1;
            for production in self.productions() {
                let body = production.body();
                for (i, symbol) in body.iter().enumerate() {
                    let b = match symbol {
                        Symbol::NonTerminal(b) => b,
                        _ => continue,
                    };

                    let rest_first = first.of_sequence(&body[i + 1..]);
                    let mut additions: Vec<Symbol> = rest_first
                        .iter()
                        .filter(|s| **s != Symbol::Epsilon)
                        .cloned()
                        .collect();
                    if rest_first.contains(&Symbol::Epsilon) {
                        additions.extend(follow.of(&production.left).iter().cloned());
                    }

                    if let Some(b_follow) = follow.sets.get_mut(b) {
                        for s in additions {
                            changed |= b_follow.insert(s);
                        }
                    }
                }
            }
        }

        debug!("FOLLOW reached its fixed point after {} passes", follow.passes);
        follow
    }
}

#[cfg(test)]
mod tests {
    use super::SymbolSet;
    use crate::grammar::Symbol;
    use crate::Grammar;

    fn set(symbols: &[&str]) -> SymbolSet {
        symbols
            .iter()
            .map(|s| match *s {
                "ε" => Symbol::Epsilon,
                "$" => Symbol::EndMarker,
                t => Symbol::terminal(t),
            })
            .collect()
    }

    #[test]
    fn expression_grammar() {
        let g = Grammar::parse("3\nS -> S+T T\nT -> T*F F\nF -> (S) i").unwrap();
        let (first, follow) = g.compute_first_follow();

        for nt in ["S", "T", "F"] {
            assert_eq!(first.of(nt), &set(&["(", "i"]));
        }
        assert_eq!(follow.of("S"), &set(&["$", "+", ")"]));
        assert_eq!(follow.of("T"), &set(&["$", "+", ")", "*"]));
        assert_eq!(follow.of("F"), &set(&["$", "+", ")", "*"]));
    }

    #[test]
    fn epsilon_grammar() {
        let g = Grammar::parse("S -> aA e\nA -> bS e").unwrap();
        let (first, follow) = g.compute_first_follow();

        assert_eq!(first.of("S"), &set(&["a", "ε"]));
        assert_eq!(first.of("A"), &set(&["b", "ε"]));
        assert!(first.is_nullable("S"));
        assert_eq!(follow.of("S"), &set(&["$"]));
        assert_eq!(follow.of("A"), &set(&["$"]));
    }

    #[test]
    fn nullable_prefix() {
        let g = Grammar::parse("S -> ABc\nA -> a e\nB -> b e").unwrap();
        let (first, follow) = g.compute_first_follow();

        assert_eq!(first.of("S"), &set(&["a", "b", "c"]));
        assert!(!first.is_nullable("S"));
        assert_eq!(follow.of("A"), &set(&["b", "c"]));
        assert_eq!(follow.of("B"), &set(&["c"]));
        assert_eq!(
            first.of_sequence(&[Symbol::non_terminal("A"), Symbol::non_terminal("B")]),
            set(&["a", "b", "ε"])
        );
        assert_eq!(first.of_sequence(&[]), set(&["ε"]));
    }

    #[test]
    fn nullable_suffix() {
        let g = Grammar::parse("S -> AB\nA -> aA d\nB -> bBc e").unwrap();
        let (first, follow) = g.compute_first_follow();

        assert_eq!(first.of("S"), &set(&["a", "d"]));
        assert_eq!(first.of("B"), &set(&["b", "ε"]));
        assert_eq!(follow.of("A"), &set(&["b", "$"]));
        assert_eq!(follow.of("B"), &set(&["c", "$"]));
    }

    #[test]
    fn idempotent() {
        let g = Grammar::parse("3\nS -> S+T T\nT -> T*F F\nF -> (S) i").unwrap();
        assert_eq!(g.compute_first_follow(), g.compute_first_follow());
    }

    #[test]
    fn bounded_passes() {
        let g = Grammar::parse("3\nS -> S+T T\nT -> T*F F\nF -> (S) i").unwrap();
        let (first, follow) = g.compute_first_follow();
        let bound = g.non_terminal_iter().count() + 1;

        assert!(first.passes() <= bound);
        assert!(follow.passes() <= bound);
    }

    #[test]
    fn follow_never_contains_epsilon() {
        let g = Grammar::parse("S -> ABc\nA -> a e\nB -> b e").unwrap();
        let (_, follow) = g.compute_first_follow();
        assert!(follow.iter().all(|(_, s)| !s.contains(&Symbol::Epsilon)));
    }
}
