use std::{fmt, ops::Deref};

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;

use super::{error::GrammarError, END_MARK, EPSILON};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
    Epsilon,
    EndMarker,
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol::Terminal(name.into())
    }

    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol::NonTerminal(name.into())
    }

    /// Maps an input token to the symbol it stands for: `$` is the end
    /// marker, everything else is a terminal.
    pub fn from_token(token: &str) -> Self {
        if token == END_MARK {
            Symbol::EndMarker
        } else {
            Symbol::Terminal(token.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name.as_str(),
            Symbol::Epsilon => EPSILON,
            Symbol::EndMarker => END_MARK,
        }
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    /// Terminals and the end marker: the symbols that can be a lookahead.
    pub fn is_lookahead(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::EndMarker)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Production {
    pub left: String,
    pub right: Vec<Symbol>,
}

impl Production {
    pub fn new(left: impl Into<String>, right: Vec<Symbol>) -> Self {
        let right = if right.is_empty() {
            vec![Symbol::Epsilon]
        } else {
            right
        };
        Self {
            left: left.into(),
            right,
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.right == [Symbol::Epsilon]
    }

    /// The right side without the epsilon marker.
    pub fn body(&self) -> &[Symbol] {
        if self.is_epsilon() {
            &[]
        } else {
            &self.right
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.left)?;
        for s in &self.right {
            write!(f, " {}", s)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    non_terminals: IndexSet<String>,
    terminals: IndexSet<String>,
    start_symbol: String,
    productions: Vec<Production>,
    productions_by_left: IndexMap<String, Vec<usize>>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &String> {
        self.non_terminals.iter()
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = &String> {
        self.terminals.iter()
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.non_terminals.contains(name)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    /// Indices of the productions of `non_terminal`, in declaration order.
    pub fn productions_of(&self, non_terminal: &str) -> &[usize] {
        self.productions_by_left
            .get(non_terminal)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_symbol_prime_name(&self, mut name: String) -> String {
        while self.non_terminals.contains(&name) || self.terminals.contains(&name) {
            name.push('\'');
        }
        name
    }
}

#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    non_terminals: IndexSet<String>,
    terminals: IndexSet<String>,
    productions: Vec<Production>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a non-terminal. The first one declared is the start symbol.
    pub fn non_terminal(&mut self, name: impl Into<String>) -> &mut Self {
        self.non_terminals.insert(name.into());
        self
    }

    pub fn terminal(&mut self, name: impl Into<String>) -> &mut Self {
        self.terminals.insert(name.into());
        self
    }

    /// An empty `right` is the epsilon production.
    pub fn production(&mut self, left: impl Into<String>, right: Vec<Symbol>) -> &mut Self {
        self.productions.push(Production::new(left, right));
        self
    }

    pub fn build(&self) -> Result<Grammar, GrammarError> {
        let start_symbol = self
            .non_terminals
            .first()
            .cloned()
            .ok_or(GrammarError::NoNonTerminals)?;

        let mut productions_by_left: IndexMap<String, Vec<usize>> = self
            .non_terminals
            .iter()
            .map(|nt| (nt.clone(), Vec::new()))
            .collect();

        for (idx, production) in self.productions.iter().enumerate() {
            match productions_by_left.get_mut(&production.left) {
                Some(v) => v.push(idx),
                None => return Err(GrammarError::UndeclaredLeft(production.left.clone())),
            }

            for symbol in &production.right {
                let declared = match symbol {
                    Symbol::Terminal(name) => self.terminals.contains(name),
                    Symbol::NonTerminal(name) => self.non_terminals.contains(name),
                    Symbol::Epsilon => {
                        if production.right.len() > 1 {
                            return Err(GrammarError::MisplacedEpsilon(production.to_string()));
                        }
                        true
                    }
                    Symbol::EndMarker => {
                        return Err(GrammarError::EndMarkerInProduction(production.to_string()))
                    }
                };
                if !declared {
                    return Err(GrammarError::UndefinedSymbol {
                        symbol: symbol.name().to_string(),
                        production: production.to_string(),
                    });
                }
            }
        }

        if productions_by_left[&start_symbol].is_empty() {
            return Err(GrammarError::NoProductionsForStart(start_symbol));
        }

        debug!(
            "grammar built: {} non-terminals, {} terminals, {} productions",
            self.non_terminals.len(),
            self.terminals.len(),
            self.productions.len()
        );

        Ok(Grammar {
            non_terminals: self.non_terminals.clone(),
            terminals: self.terminals.clone(),
            start_symbol,
            productions: self.productions.clone(),
            productions_by_left,
        })
    }
}

/// A grammar extended with `S' -> S`. The extra production is appended last,
/// so production indices of the original grammar stay valid.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedGrammar {
    grammar: Grammar,
    original_start: String,
    accept_production: usize,
}

impl AugmentedGrammar {
    pub fn new(grammar: &Grammar) -> Self {
        let original_start = grammar.start_symbol.clone();
        let dummy_start = grammar.get_symbol_prime_name(original_start.clone());

        let mut g = grammar.clone();
        let accept_production = g.productions.len();
        g.productions.push(Production::new(
            dummy_start.clone(),
            vec![Symbol::NonTerminal(original_start.clone())],
        ));
        g.non_terminals.insert(dummy_start.clone());
        g.productions_by_left
            .insert(dummy_start.clone(), vec![accept_production]);
        g.start_symbol = dummy_start;

        Self {
            grammar: g,
            original_start,
            accept_production,
        }
    }

    pub fn original_start(&self) -> &str {
        &self.original_start
    }

    /// Index of `S' -> S`.
    pub fn accept_production(&self) -> usize {
        self.accept_production
    }
}

impl Deref for AugmentedGrammar {
    type Target = Grammar;

    fn deref(&self) -> &Grammar {
        &self.grammar
    }
}
