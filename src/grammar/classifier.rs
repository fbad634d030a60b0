use std::fmt;

use log::info;
use serde::Serialize;

use super::{
    error::{ClassifyError, Method},
    first_follow::{FirstSets, FollowSets},
    ll1_parser::LL1Parser,
    ll1_parsing_table::{LL1Conflict, LL1Table},
    lr_dfa::Automaton,
    outcome::ParseOutcome,
    slr1_parser::SLR1Parser,
    slr1_parsing_table::{SLR1Conflict, SLR1Tables},
    Grammar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrammarClass {
    LL1Only,
    SLR1Only,
    Both,
    Neither,
}

impl GrammarClass {
    fn from_flags(ll1: bool, slr1: bool) -> Self {
        match (ll1, slr1) {
            (true, true) => GrammarClass::Both,
            (true, false) => GrammarClass::LL1Only,
            (false, true) => GrammarClass::SLR1Only,
            (false, false) => GrammarClass::Neither,
        }
    }

    pub fn applies(&self, method: Method) -> bool {
        match method {
            Method::LL1 => matches!(self, GrammarClass::LL1Only | GrammarClass::Both),
            Method::SLR1 => matches!(self, GrammarClass::SLR1Only | GrammarClass::Both),
        }
    }
}

impl fmt::Display for GrammarClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarClass::LL1Only => write!(f, "LL(1)"),
            GrammarClass::SLR1Only => write!(f, "SLR(1)"),
            GrammarClass::Both => write!(f, "LL(1) and SLR(1)"),
            GrammarClass::Neither => write!(f, "neither LL(1) nor SLR(1)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub class: GrammarClass,
    pub ll1: bool,
    pub slr1: bool,
    pub ll1_conflicts: Vec<LL1Conflict>,
    pub slr1_conflicts: Vec<SLR1Conflict>,
}

/// Every artefact derived from one grammar, computed once.
#[derive(Debug, Clone)]
pub struct Classifier {
    grammar: Grammar,
    first: FirstSets,
    follow: FollowSets,
    ll1_table: LL1Table,
    automaton: Automaton,
    slr1_tables: SLR1Tables,
}

impl Classifier {
    pub fn new(grammar: Grammar) -> Self {
        let (first, follow) = grammar.compute_first_follow();
        let ll1_table = grammar.generate_ll1_parsing_table(&first, &follow);
        let automaton = grammar.to_lr0_fsm();
        let slr1_tables = automaton.to_slr1_parsing_table(&follow);

        let c = Self {
            grammar,
            first,
            follow,
            ll1_table,
            automaton,
            slr1_tables,
        };
        info!("grammar is {}", c.class());
        c
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first(&self) -> &FirstSets {
        &self.first
    }

    pub fn follow(&self) -> &FollowSets {
        &self.follow
    }

    pub fn ll1_table(&self) -> &LL1Table {
        &self.ll1_table
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn slr1_tables(&self) -> &SLR1Tables {
        &self.slr1_tables
    }

    pub fn class(&self) -> GrammarClass {
        GrammarClass::from_flags(self.ll1_table.is_ll1(), self.slr1_tables.is_slr1())
    }

    pub fn classify(&self) -> ClassificationResult {
        ClassificationResult {
            class: self.class(),
            ll1: self.ll1_table.is_ll1(),
            slr1: self.slr1_tables.is_slr1(),
            ll1_conflicts: self.ll1_table.conflicts().to_vec(),
            slr1_conflicts: self.slr1_tables.conflicts().to_vec(),
        }
    }

    pub fn ll1_parser(&self) -> Option<LL1Parser<'_>> {
        self.ll1_table
            .is_ll1()
            .then(|| LL1Parser::new(&self.grammar, &self.ll1_table))
    }

    pub fn slr1_parser(&self) -> Option<SLR1Parser<'_>> {
        self.slr1_tables
            .is_slr1()
            .then(|| SLR1Parser::new(&self.grammar, &self.slr1_tables))
    }

    pub fn parse_ll1<T: AsRef<str>>(&self, tokens: &[T]) -> Result<ParseOutcome, ClassifyError> {
        self.ll1_parser()
            .map(|p| p.parse(tokens))
            .ok_or(ClassifyError::NotApplicable(Method::LL1))
    }

    pub fn parse_slr1<T: AsRef<str>>(&self, tokens: &[T]) -> Result<ParseOutcome, ClassifyError> {
        self.slr1_parser()
            .map(|p| p.parse(tokens))
            .ok_or(ClassifyError::NotApplicable(Method::SLR1))
    }

    pub fn parse<T: AsRef<str>>(
        &self,
        method: Method,
        tokens: &[T],
    ) -> Result<ParseOutcome, ClassifyError> {
        match method {
            Method::LL1 => self.parse_ll1(tokens),
            Method::SLR1 => self.parse_slr1(tokens),
        }
    }
}

pub fn classify(grammar: &Grammar) -> ClassificationResult {
    Classifier::new(grammar.clone()).classify()
}
