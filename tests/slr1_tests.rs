//! Unit tests for SLR(1) table construction.
//!
//! The concrete scenario is Appel's grammar 3.23 (`E → T+E | T`, `T → x`):
//! LR(0) leaves a shift/reduce conflict in the state holding `[E → T·+E]`
//! and `[E → T·]`; restricting the reduction to FOLLOW(E) = {$} resolves it.

use lr_tables::symbol::{ProdIndex, StateIndex, TermIndex};
use lr_tables::table::{Action, ActionSet, Conflict};
use lr_tables::{build_lr0, build_slr1, Grammar, Production};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

// Terminal tags: + = 0, x = 1, $ = 2. E → T is production 2.
fn grammar_3_23() -> Grammar {
    Grammar::new(
        ["+", "x"],
        ["E", "T"],
        "E",
        vec![
            Production::new("E", ["T", "+", "E"]),
            Production::new("E", ["T"]),
            Production::new("T", ["x"]),
        ],
    )
}

#[test]
fn test_grammar_3_23_lr0_has_a_shift_reduce_conflict() {
    let table = build_lr0(&grammar_3_23()).unwrap();

    assert_eq!(table.states.len(), 6);
    assert_eq!(
        table.action(StateIndex(2), TermIndex(0)),
        Some(&ActionSet::Conflict {
            shift: Some(StateIndex(4)),
            reductions: BTreeSet::from([ProdIndex(2)]),
        })
    );
    assert_eq!(
        table.diagnostics.conflicts,
        vec![Conflict::ShiftReduce {
            state: StateIndex(2),
            terminal: TermIndex(0),
            shift: StateIndex(4),
            reductions: BTreeSet::from([ProdIndex(2)]),
        }]
    );
}

#[test]
fn test_grammar_3_23_slr_resolves_the_conflict() {
    let table = build_slr1(&grammar_3_23()).unwrap();

    assert_eq!(table.conflict_count(), 0);
    // State 2 shifts on + and reduces production 2 only on $.
    assert_eq!(
        table.action(StateIndex(2), TermIndex(0)),
        Some(&ActionSet::Action(Action::Shift(StateIndex(4))))
    );
    assert_eq!(
        table.action(StateIndex(2), TermIndex(2)),
        Some(&ActionSet::Action(Action::Reduce(ProdIndex(2))))
    );
    assert_eq!(table.action(StateIndex(2), TermIndex(1)), None);
}

/// Every decision present in an ACTION cell, as a set.
fn members(cell: &ActionSet) -> BTreeSet<Action> {
    match cell {
        ActionSet::Action(action) => BTreeSet::from([*action]),
        ActionSet::Conflict { shift, reductions } => shift
            .iter()
            .map(|&s| Action::Shift(s))
            .chain(reductions.iter().map(|&p| Action::Reduce(p)))
            .collect(),
    }
}

#[test]
fn test_slr_only_removes_reductions_from_lr0() {
    let lr0 = build_lr0(&grammar_3_23()).unwrap();
    let slr = build_slr1(&grammar_3_23()).unwrap();

    // Same automaton: equal state count, equal GOTO, and every SLR cell is a
    // subset of the corresponding LR(0) cell.
    assert_eq!(lr0.states.len(), slr.states.len());
    assert_eq!(lr0.gotos, slr.gotos);
    for (key, cell) in &slr.actions {
        let lr0_cell = lr0.actions.get(key).expect("SLR invented an ACTION cell");
        assert!(members(cell).is_subset(&members(lr0_cell)));
    }
}

#[test]
fn test_slr_reduce_reduce_conflict_is_reported_not_fatal() {
    // S → A | B, A → x, B → x: both reductions fire on $, and SLR cannot
    // tell them apart.
    let grammar = Grammar::new(
        ["x"],
        ["S", "A", "B"],
        "S",
        vec![
            Production::new("S", ["A"]),
            Production::new("S", ["B"]),
            Production::new("A", ["x"]),
            Production::new("B", ["x"]),
        ],
    );
    let table = build_slr1(&grammar).unwrap();

    assert_eq!(
        table.diagnostics.conflicts,
        vec![Conflict::ReduceReduce {
            state: StateIndex(4),
            terminal: TermIndex(1),
            reductions: BTreeSet::from([ProdIndex(3), ProdIndex(4)]),
        }]
    );
}
