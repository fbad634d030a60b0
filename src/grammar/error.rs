use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Line {line}: {message}")]
    Format { line: usize, message: String },
    #[error("grammar has no non-terminals")]
    NoNonTerminals,
    #[error("undefined symbol \"{symbol}\" in production {production}")]
    UndefinedSymbol { symbol: String, production: String },
    #[error("\"{0}\" is used as a left side but is not a declared non-terminal")]
    UndeclaredLeft(String),
    #[error("start symbol \"{0}\" has no productions")]
    NoProductionsForStart(String),
    #[error("epsilon must be the only symbol of a right side: {0}")]
    MisplacedEpsilon(String),
    #[error("end marker cannot appear in production {0}")]
    EndMarkerInProduction(String),
}

impl GrammarError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        GrammarError::Format {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Method {
    LL1,
    SLR1,
}

impl Method {
    /// Accepts `ll1`/`slr1` in any case, or the `T`/`B` shorthands of the
    /// interactive session.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ll1" | "ll(1)" | "t" => Some(Method::LL1),
            "slr1" | "slr(1)" | "b" => Some(Method::SLR1),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::LL1 => write!(f, "LL(1)"),
            Method::SLR1 => write!(f, "SLR(1)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("grammar is not {0}, cannot parse with it")]
    NotApplicable(Method),
}
