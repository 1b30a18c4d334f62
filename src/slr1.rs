//! SLR(1) table construction.
//!
//! Same automaton as LR(0); a completed item `[A → α·]` reduces only on the
//! terminals in FOLLOW(A) instead of on every terminal. No state-set change,
//! so conflicts can only disappear relative to LR(0), never appear.

use crate::error::{GrammarError, Result};
use crate::first_follow::PredictiveSets;
use crate::grammar::{Grammar, TaggedGrammar};
use crate::lr0::{build_automaton, tables_from_automaton, ReduceLookaheads};
use crate::table::ParserTable;

/// Builds the SLR(1) table.
pub fn build_slr1(grammar: &Grammar) -> Result<ParserTable, GrammarError> {
    let tagged = TaggedGrammar::build(grammar)?;
    let sets = PredictiveSets::compute(&tagged);
    let automaton = build_automaton(&tagged);
    Ok(tables_from_automaton(
        tagged,
        &automaton,
        ReduceLookaheads::Follow(&sets.follow),
    ))
}
