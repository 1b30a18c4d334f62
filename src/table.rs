//! Parser-table value objects and conflict classification.
//!
//! Every build variant produces the same [`ParserTable`] shape: the state
//! list, an ACTION map keyed by `(state, terminal)`, a GOTO map keyed by
//! `(state, nonterminal)`, and [`Diagnostics`] describing any ACTION cells
//! that came out ambiguous. Conflicts are not fatal; each ambiguous cell is
//! preserved as an [`ActionSet::Conflict`] and it is up to the caller to
//! decide whether the table is usable.

use crate::grammar::TaggedGrammar;
use crate::symbol::{NonTermIndex, ProdIndex, StateIndex, TermIndex};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// A single parser decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
    /// Consume the terminal and enter the state.
    Shift(StateIndex),
    /// Reduce by the production.
    Reduce(ProdIndex),
    /// Input is a sentence of the grammar.
    Accept,
}

/// The contents of one ACTION cell.
///
/// A cell holding two or more distinct decisions is a conflict: at most one
/// shift (the automaton is deterministic on terminals) and any number of
/// reductions. The accept cell never conflicts; decisions merged onto it are
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSet {
    /// A deterministic cell.
    Action(Action),
    /// An ambiguous cell.
    Conflict {
        shift: Option<StateIndex>,
        reductions: BTreeSet<ProdIndex>,
    },
}

impl ActionSet {
    /// Checks if this cell is ambiguous.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ActionSet::Conflict { .. })
    }

    fn merge(&mut self, action: Action) {
        // The accept cell is not up for debate: whichever side of the merge
        // carries Accept wins the cell outright.
        if action == Action::Accept {
            *self = ActionSet::Action(Action::Accept);
            return;
        }
        match self {
            ActionSet::Action(existing) => {
                if *existing == action || *existing == Action::Accept {
                    return;
                }
                let mut shift = None;
                let mut reductions = BTreeSet::new();
                for a in [*existing, action] {
                    match a {
                        Action::Shift(target) => shift = Some(target),
                        Action::Reduce(prod) => {
                            reductions.insert(prod);
                        }
                        Action::Accept => {}
                    }
                }
                *self = ActionSet::Conflict { shift, reductions };
            }
            ActionSet::Conflict { shift, reductions } => match action {
                Action::Shift(target) => *shift = Some(target),
                Action::Reduce(prod) => {
                    reductions.insert(prod);
                }
                Action::Accept => {}
            },
        }
    }
}

/// One LR item as recorded in a built table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateItem {
    /// The production of this item.
    pub prod: ProdIndex,
    /// Dot position, `0..=rhs.len()`.
    pub dot: usize,
    /// Lookahead set; empty for LR(0) and SLR(1) tables. LALR(1) tables
    /// carry the computed LA sets on their reduction items only.
    pub lookaheads: BTreeSet<TermIndex>,
}

/// A parser state: the items (kernel and closure) it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserState {
    pub items: Vec<StateItem>,
}

/// An ambiguous ACTION cell, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// A shift competes with one or more reductions.
    ShiftReduce {
        state: StateIndex,
        terminal: TermIndex,
        shift: StateIndex,
        reductions: BTreeSet<ProdIndex>,
    },
    /// Two or more reductions compete.
    ReduceReduce {
        state: StateIndex,
        terminal: TermIndex,
        reductions: BTreeSet<ProdIndex>,
    },
}

/// Build metadata accompanying a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// All conflicts, in ascending `(state, terminal)` order.
    pub conflicts: Vec<Conflict>,
    /// Human-readable remarks about the build.
    pub notes: Vec<String>,
}

/// An immutable ACTION/GOTO table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserTable {
    /// The grammar the table was built from, for rendering names.
    pub grammar: TaggedGrammar,
    /// All parser states, dense by [`StateIndex`].
    pub states: Vec<ParserState>,
    /// ACTION: decisions on terminals (including `$`).
    pub actions: BTreeMap<(StateIndex, TermIndex), ActionSet>,
    /// GOTO: transitions on nonterminals after reductions.
    pub gotos: BTreeMap<(StateIndex, NonTermIndex), StateIndex>,
    /// Conflict report and notes.
    pub diagnostics: Diagnostics,
}

impl ParserTable {
    /// The ACTION cell at `(state, terminal)`, if any.
    pub fn action(&self, state: StateIndex, terminal: TermIndex) -> Option<&ActionSet> {
        self.actions.get(&(state, terminal))
    }

    /// The GOTO target at `(state, nonterminal)`, if any.
    pub fn goto(&self, state: StateIndex, nonterminal: NonTermIndex) -> Option<StateIndex> {
        self.gotos.get(&(state, nonterminal)).copied()
    }

    /// Number of ambiguous ACTION cells.
    pub fn conflict_count(&self) -> usize {
        self.diagnostics.conflicts.len()
    }
}

/// Accumulates per-cell actions and classifies conflicts on `finish`.
pub(crate) struct TableBuilder {
    grammar: TaggedGrammar,
    states: Vec<ParserState>,
    actions: BTreeMap<(StateIndex, TermIndex), ActionSet>,
    gotos: BTreeMap<(StateIndex, NonTermIndex), StateIndex>,
}

impl TableBuilder {
    pub fn new(grammar: TaggedGrammar, states: Vec<ParserState>) -> Self {
        Self {
            grammar,
            states,
            actions: BTreeMap::new(),
            gotos: BTreeMap::new(),
        }
    }

    /// Records an action, merging into a conflict when the cell is taken.
    pub fn action(&mut self, state: StateIndex, terminal: TermIndex, action: Action) {
        self.actions
            .entry((state, terminal))
            .and_modify(|cell| cell.merge(action))
            .or_insert(ActionSet::Action(action));
    }

    pub fn goto(&mut self, state: StateIndex, nonterminal: NonTermIndex, target: StateIndex) {
        self.gotos.insert((state, nonterminal), target);
    }

    /// Classifies ambiguous cells and freezes the table.
    pub fn finish(self) -> ParserTable {
        let mut conflicts = Vec::new();
        for (&(state, terminal), cell) in &self.actions {
            let ActionSet::Conflict { shift, reductions } = cell else {
                continue;
            };
            conflicts.push(match shift {
                Some(shift) => Conflict::ShiftReduce {
                    state,
                    terminal,
                    shift: *shift,
                    reductions: reductions.clone(),
                },
                None => Conflict::ReduceReduce {
                    state,
                    terminal,
                    reductions: reductions.clone(),
                },
            });
        }

        debug!(
            "table finalized: {} states, {} action cells, {} conflicts",
            self.states.len(),
            self.actions.len(),
            conflicts.len()
        );

        ParserTable {
            grammar: self.grammar,
            states: self.states,
            actions: self.actions,
            gotos: self.gotos,
            diagnostics: Diagnostics {
                conflicts,
                notes: Vec::new(),
            },
        }
    }
}
