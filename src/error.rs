//! Error types for grammar validation and table construction.

use crate::symbol::StateIndex;
use thiserror::Error;

/// Errors found while validating and tagging an input grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("start symbol `{0}` is not a declared nonterminal")]
    NoStartSymbol(String),

    #[error("production {production} references undeclared symbol `{symbol}`")]
    UndefinedSymbol { production: usize, symbol: String },

    #[error("production {second} duplicates production {first}")]
    DuplicateProduction { first: usize, second: usize },
}

/// Errors from the LALR(1) build, which can additionally fail when the
/// lookahead computation detects that the grammar is not LR(k) for any k.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("grammar is not LR(k): cyclic lookahead dependency on goto({state}, `{nonterminal}`)")]
    NotLRk {
        state: StateIndex,
        nonterminal: String,
    },
}

/// Type alias for Results in this crate.
pub type Result<T, E = GrammarError> = std::result::Result<T, E>;
