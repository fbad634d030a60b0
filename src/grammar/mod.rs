pub mod classifier;
pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod ll1_parser;
pub mod ll1_parsing_table;
pub mod lr_dfa;
pub mod outcome;
pub mod parse;
pub mod pretty_print;
pub mod slr1_parser;
pub mod slr1_parsing_table;

pub use classifier::{classify, ClassificationResult, Classifier, GrammarClass};
pub use error::{ClassifyError, GrammarError, Method};
pub use grammar::{AugmentedGrammar, Grammar, GrammarBuilder, Production, Symbol};
pub use outcome::{split_input, ParseOutcome, ParseStep, SyntaxError};

pub const EPSILON: &str = "ε";
pub const EPSILON_TOKEN: &str = "e";
pub const END_MARK: &str = "$";
