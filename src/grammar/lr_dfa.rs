use std::collections::{BTreeSet, HashMap, VecDeque};

use indexmap::{IndexMap, IndexSet};
use log::debug;

use super::{AugmentedGrammar, Grammar, Symbol};

/// A production with a dot: `dot` symbols of its body have been recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub production: usize,
    pub dot: usize,
}

impl Item {
    pub fn new(production: usize) -> Self {
        Self { production, dot: 0 }
    }

    /// The symbol right after the dot, `None` once the item is complete.
    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar.production(self.production).body().get(self.dot)
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.production(self.production).body().len()
    }

    pub fn advance(&self) -> Self {
        Self {
            production: self.production,
            dot: self.dot + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSet {
    pub kernel: BTreeSet<Item>,
    /// The closure of `kernel`, kernel included.
    pub items: BTreeSet<Item>,
    pub edges: IndexMap<Symbol, usize>,
}

impl ItemSet {
    /// Items added by the closure, i.e. not in the kernel.
    pub fn extend(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| !self.kernel.contains(i))
    }
}

pub fn closure(grammar: &Grammar, kernel: &BTreeSet<Item>) -> BTreeSet<Item> {
    let mut items = kernel.clone();
    let mut q: VecDeque<Item> = kernel.iter().copied().collect();

    while let Some(item) = q.pop_front() {
        if let Some(Symbol::NonTerminal(b)) = item.next_symbol(grammar) {
            for &production in grammar.productions_of(b) {
                let new_item = Item::new(production);
                if items.insert(new_item) {
                    q.push_back(new_item);
                }
            }
        }
    }

    items
}

fn goto_kernel(grammar: &Grammar, items: &BTreeSet<Item>, symbol: &Symbol) -> BTreeSet<Item> {
    items
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(|item| item.advance())
        .collect()
}

pub fn goto(grammar: &Grammar, items: &BTreeSet<Item>, symbol: &Symbol) -> BTreeSet<Item> {
    closure(grammar, &goto_kernel(grammar, items, symbol))
}

/// Canonical collection of LR(0) item sets over the augmented grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct Automaton {
    grammar: AugmentedGrammar,
    states: Vec<ItemSet>,
}

impl Automaton {
    pub fn build(grammar: &Grammar) -> Self {
        let grammar = AugmentedGrammar::new(grammar);

        let start_kernel = BTreeSet::from([Item::new(grammar.accept_production())]);
        let start_items = closure(&grammar, &start_kernel);
        let mut index: HashMap<BTreeSet<Item>, usize> = HashMap::from([(start_items.clone(), 0)]);
        let mut states = vec![ItemSet {
            kernel: start_kernel,
            items: start_items,
            edges: IndexMap::new(),
        }];
        let mut q: VecDeque<usize> = VecDeque::from([0]);

        while let Some(u) = q.pop_front() {
            let symbols: IndexSet<Symbol> = states[u]
                .items
                .iter()
                .filter_map(|item| item.next_symbol(&grammar))
                .cloned()
                .collect();

            for symbol in symbols {
                let kernel = goto_kernel(&grammar, &states[u].items, &symbol);
                if kernel.is_empty() {
                    continue;
                }
                let items = closure(&grammar, &kernel);

                let v = match index.get(&items) {
                    Some(&v) => v,
                    None => {
                        let v = states.len();
                        index.insert(items.clone(), v);
                        states.push(ItemSet {
                            kernel,
                            items,
                            edges: IndexMap::new(),
                        });
                        q.push_back(v);
                        v
                    }
                };
                states[u].edges.insert(symbol, v);
            }
        }

        debug!("LR(0) automaton built with {} states", states.len());
        Self { grammar, states }
    }

    pub fn grammar(&self) -> &AugmentedGrammar {
        &self.grammar
    }

    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    pub fn transition(&self, state: usize, symbol: &Symbol) -> Option<usize> {
        self.states.get(state)?.edges.get(symbol).copied()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (usize, &Symbol, usize)> {
        self.states
            .iter()
            .enumerate()
            .flat_map(|(u, s)| s.edges.iter().map(move |(x, v)| (u, x, *v)))
    }
}

impl Grammar {
    pub fn to_lr0_fsm(&self) -> Automaton {
        Automaton::build(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use crate::grammar::{AugmentedGrammar, Symbol};
    use crate::Grammar;

    use super::{closure, goto, Automaton, Item};

    const EXPR: &str = "3\nS -> S+T T\nT -> T*F F\nF -> (S) i";

    #[test]
    fn closure_of_start() {
        let g = AugmentedGrammar::new(&Grammar::parse(EXPR).unwrap());
        let items = closure(&g, &BTreeSet::from([Item::new(g.accept_production())]));

        // S' -> .S plus every production at dot 0
        assert_eq!(items.len(), 7);
        assert!(items.iter().all(|i| i.dot == 0));
    }

    #[test]
    fn goto_moves_the_dot() {
        let g = AugmentedGrammar::new(&Grammar::parse(EXPR).unwrap());
        let start = closure(&g, &BTreeSet::from([Item::new(g.accept_production())]));

        let on_s = goto(&g, &start, &Symbol::non_terminal("S"));
        assert_eq!(
            on_s,
            BTreeSet::from([
                Item { production: g.accept_production(), dot: 1 },
                Item { production: 0, dot: 1 },
            ])
        );

        let on_paren = goto(&g, &start, &Symbol::terminal("("));
        assert!(on_paren.contains(&Item { production: 4, dot: 1 }));
        assert_eq!(on_paren.len(), 7);

        assert!(goto(&g, &start, &Symbol::terminal("+")).is_empty());
    }

    #[test]
    fn expression_automaton() {
        let a = Grammar::parse(EXPR).unwrap().to_lr0_fsm();

        assert_eq!(a.states().len(), 12);
        let s1 = a.transition(0, &Symbol::non_terminal("S")).unwrap();
        let s2 = a.transition(0, &Symbol::terminal("(")).unwrap();
        assert_eq!(a.transition(s2, &Symbol::terminal("(")), Some(s2));
        assert!(a.transition(s1, &Symbol::terminal("+")).is_some());
        assert_eq!(a.transition(s1, &Symbol::terminal("*")), None);
    }

    #[test]
    fn epsilon_items_are_complete() {
        let a = Grammar::parse("S -> aA e\nA -> bS e").unwrap().to_lr0_fsm();
        let g = a.grammar();

        let eps = g.productions_of("S")[1];
        assert!(a.states()[0].items.contains(&Item::new(eps)));
        assert!(Item::new(eps).is_complete(g));
        assert!(a.transitions().all(|(_, x, _)| *x != Symbol::Epsilon));
    }

    #[test]
    fn rebuild_is_isomorphic() {
        let g = Grammar::parse(EXPR).unwrap();
        let a = g.to_lr0_fsm();
        let b = g.to_lr0_fsm();

        let by_items: HashMap<&BTreeSet<Item>, usize> = b
            .states()
            .iter()
            .enumerate()
            .map(|(i, s)| (&s.items, i))
            .collect();
        assert_eq!(a.states().len(), b.states().len());
        for (u, x, v) in a.transitions() {
            let bu = by_items[&a.states()[u].items];
            let bv = by_items[&a.states()[v].items];
            assert_eq!(b.transition(bu, x), Some(bv));
        }
    }
}
