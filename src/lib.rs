//! LR parser-table construction for context-free grammars.
//!
//! Given a [`Grammar`], this crate computes parser states and fills ACTION
//! and GOTO tables for the LR(0), SLR(1), canonical LR(1) and LALR(1)
//! variants, reporting shift/reduce and reduce/reduce conflicts per cell.
//! The LALR(1) lookaheads come from DeRemer and Pennello's relational
//! algorithm rather than from a merged LR(1) collection.
//!
//! Every entry point is a pure function from grammar to [`ParserTable`]:
//! no files, no environment, no shared state. Conflicts are not fatal —
//! they are preserved in the table's [`Diagnostics`] and in the affected
//! [`ActionSet`] cells, and the caller decides whether to proceed.
//!
//! # References
//! Appel, "Modern Compiler Implementation in ML" (grammar examples);
//! DeRemer and Pennello, "Efficient Computation of LALR(1) Look-Ahead Sets",
//! TOPLAS 4(4), 1982.

pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod lalr1;
pub mod lr0;
pub mod lr1;
pub mod slr1;
pub mod symbol;
pub mod table;

// Re-export commonly used types and the build entry points.
pub use error::{BuildError, GrammarError, Result};
pub use first_follow::PredictiveSets;
pub use grammar::{Grammar, Production, TaggedGrammar};
pub use lalr1::build_lalr1;
pub use lr0::build_lr0;
pub use lr1::build_lr1;
pub use slr1::build_slr1;
pub use symbol::{NonTermIndex, ProdIndex, StateIndex, Sym, TermIndex};
pub use table::{Action, ActionSet, Conflict, Diagnostics, ParserState, ParserTable, StateItem};
