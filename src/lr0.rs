//! LR(0) item sets, the canonical collection and the table skeleton.
//!
//! The LR(0) automaton is the backbone of three of the four build variants:
//! LR(0) places blanket reductions, SLR(1) restricts them to FOLLOW sets and
//! LALR(1) restricts them to the LA sets computed by [`crate::lalr1`]. All
//! three therefore share [`build_automaton`] and [`tables_from_automaton`];
//! only the reduction lookaheads differ.

use crate::error::{GrammarError, Result};
use crate::grammar::{Grammar, TaggedGrammar};
use crate::symbol::{NonTermIndex, NonTermVec, ProdIndex, StateIndex, Sym, TermIndex};
use crate::table::{Action, ParserState, ParserTable, StateItem, TableBuilder};
use indexmap::IndexMap;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// An LR(0) item: a production with a dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Item {
    pub prod: ProdIndex,
    pub dot: usize,
}

impl Item {
    /// Returns the symbol after the dot, if any.
    pub fn next_sym(&self, grammar: &TaggedGrammar) -> Option<Sym> {
        grammar.production(self.prod).rhs.get(self.dot).copied()
    }

    /// Checks if the dot is at the end (reduce item).
    pub fn is_reduce(&self, grammar: &TaggedGrammar) -> bool {
        self.dot >= grammar.production(self.prod).rhs.len()
    }
}

/// A state of the LR(0) automaton: kernel plus closure items.
pub(crate) type ItemSet = BTreeSet<Item>;

/// Computes the closure of a set of items.
///
/// For each item `[A → α·Bβ]` present, adds `[B → ·γ]` for every production
/// `B → γ`, until saturation.
pub(crate) fn closure(grammar: &TaggedGrammar, items: ItemSet) -> ItemSet {
    let mut result = items;
    let mut changed = true;

    while changed {
        changed = false;
        for item in result.clone() {
            if let Some(Sym::Nonterm(b)) = item.next_sym(grammar) {
                for &prod in grammar.prods_for(b) {
                    if result.insert(Item { prod, dot: 0 }) {
                        changed = true;
                    }
                }
            }
        }
    }

    result
}

/// Computes goto(I, X): the closure of the items of `I` with the dot moved
/// over `X`.
pub(crate) fn goto_set(grammar: &TaggedGrammar, items: &ItemSet, sym: Sym) -> ItemSet {
    let moved: ItemSet = items
        .iter()
        .filter(|item| item.next_sym(grammar) == Some(sym))
        .map(|item| Item {
            prod: item.prod,
            dot: item.dot + 1,
        })
        .collect();

    closure(grammar, moved)
}

/// The canonical LR(0) collection with its transitions.
///
/// Transition maps preserve discovery order; iterating them replays the BFS.
/// The `$` transition out of the state holding `[Start' → S·$]` is not
/// materialized as a successor state — that cell becomes the accept action,
/// and [`Lr0Automaton::accept_state`] remembers where.
#[derive(Debug)]
pub(crate) struct Lr0Automaton {
    pub states: Vec<ItemSet>,
    pub shifts: IndexMap<(StateIndex, TermIndex), StateIndex>,
    pub gotos: IndexMap<(StateIndex, NonTermIndex), StateIndex>,
    pub accept_state: Option<StateIndex>,
}

/// Builds the canonical collection by BFS from `closure({[Start' → ·S $]})`.
///
/// States are deduplicated by item-set equality and numbered in discovery
/// order; goto symbols of each state are enumerated nonterminals first, each
/// alphabet in tag order. The numbering is deterministic and observable.
pub(crate) fn build_automaton(grammar: &TaggedGrammar) -> Lr0Automaton {
    let eof = grammar.eof();
    let initial = closure(
        grammar,
        BTreeSet::from([Item {
            prod: ProdIndex(0),
            dot: 0,
        }]),
    );

    let mut states = vec![initial.clone()];
    let mut index_of: HashMap<ItemSet, StateIndex> = HashMap::from([(initial, StateIndex(0))]);
    let mut shifts = IndexMap::new();
    let mut gotos = IndexMap::new();
    let mut accept_state = None;

    let mut worklist: VecDeque<StateIndex> = VecDeque::from([StateIndex(0)]);
    while let Some(id) = worklist.pop_front() {
        let state = states[id.0].clone();

        let syms: BTreeSet<Sym> = state
            .iter()
            .filter_map(|item| item.next_sym(grammar))
            .collect();

        for sym in syms {
            if sym == Sym::Term(eof) {
                // Only [Start' → S·$] puts the dot before $: this state gets
                // the accept cell instead of a shift.
                accept_state = Some(id);
                continue;
            }

            let target_items = goto_set(grammar, &state, sym);
            let target = match index_of.get(&target_items) {
                Some(&existing) => existing,
                None => {
                    let new_id = StateIndex(states.len());
                    states.push(target_items.clone());
                    index_of.insert(target_items, new_id);
                    worklist.push_back(new_id);
                    new_id
                }
            };

            match sym {
                Sym::Term(t) => {
                    shifts.insert((id, t), target);
                }
                Sym::Nonterm(n) => {
                    gotos.insert((id, n), target);
                }
            }
        }
    }

    debug!(
        "LR(0) collection: {} states, {} shifts, {} gotos",
        states.len(),
        shifts.len(),
        gotos.len()
    );

    Lr0Automaton {
        states,
        shifts,
        gotos,
        accept_state,
    }
}

/// How the reduction cells of an LR(0)-shaped table are filled.
pub(crate) enum ReduceLookaheads<'a> {
    /// LR(0): reduce on every terminal, `$` included.
    Every,
    /// SLR(1): reduce only on FOLLOW of the production's LHS.
    Follow(&'a NonTermVec<BTreeSet<TermIndex>>),
    /// LALR(1): reduce only on the computed LA set of `(state, production)`.
    Computed(&'a BTreeMap<(StateIndex, ProdIndex), BTreeSet<TermIndex>>),
}

/// Fills ACTION and GOTO from the automaton and merges cell conflicts.
pub(crate) fn tables_from_automaton(
    grammar: TaggedGrammar,
    automaton: &Lr0Automaton,
    lookaheads: ReduceLookaheads<'_>,
) -> ParserTable {
    let states: Vec<ParserState> = automaton
        .states
        .iter()
        .enumerate()
        .map(|(id, items)| ParserState {
            items: items
                .iter()
                .map(|item| StateItem {
                    prod: item.prod,
                    dot: item.dot,
                    lookaheads: match &lookaheads {
                        ReduceLookaheads::Computed(la) if item.is_reduce(&grammar) => la
                            .get(&(StateIndex(id), item.prod))
                            .cloned()
                            .unwrap_or_default(),
                        _ => BTreeSet::new(),
                    },
                })
                .collect(),
        })
        .collect();

    let mut actions: Vec<(StateIndex, TermIndex, Action)> = Vec::new();

    for (&(state, terminal), &target) in &automaton.shifts {
        actions.push((state, terminal, Action::Shift(target)));
    }

    for (id, items) in automaton.states.iter().enumerate() {
        let state = StateIndex(id);
        for item in items {
            if !item.is_reduce(&grammar) {
                continue;
            }
            let production = grammar.production(item.prod);
            if production.lhs == grammar.augmented_start() {
                continue;
            }

            let terminals: Vec<TermIndex> = match &lookaheads {
                ReduceLookaheads::Every => grammar.terms().collect(),
                ReduceLookaheads::Follow(follow) => {
                    follow[production.lhs].iter().copied().collect()
                }
                ReduceLookaheads::Computed(la) => la
                    .get(&(state, item.prod))
                    .map(|set| set.iter().copied().collect())
                    .unwrap_or_default(),
            };
            for terminal in terminals {
                actions.push((state, terminal, Action::Reduce(item.prod)));
            }
        }
    }

    if let Some(accept) = automaton.accept_state {
        actions.push((accept, grammar.eof(), Action::Accept));
    }

    let mut builder = TableBuilder::new(grammar, states);
    for (state, terminal, action) in actions {
        builder.action(state, terminal, action);
    }
    for (&(state, nonterminal), &target) in &automaton.gotos {
        builder.goto(state, nonterminal, target);
    }

    builder.finish()
}

/// Builds the LR(0) table: shifts from the automaton and, lacking any
/// lookahead discrimination, a reduction on every terminal for every
/// completed item.
pub fn build_lr0(grammar: &Grammar) -> Result<ParserTable, GrammarError> {
    let tagged = TaggedGrammar::build(grammar)?;
    let automaton = build_automaton(&tagged);
    Ok(tables_from_automaton(tagged, &automaton, ReduceLookaheads::Every))
}
