//! Canonical LR(1) table construction.
//!
//! Items carry terminal lookahead sets. A state maps each core item
//! `(production, dot)` to its lookahead set, so two items with the same core
//! merge by unioning lookaheads within a state, while states whose cores
//! agree but whose lookaheads differ stay distinct in the collection.

use crate::error::{GrammarError, Result};
use crate::first_follow::PredictiveSets;
use crate::grammar::{Grammar, TaggedGrammar};
use crate::symbol::{NonTermIndex, ProdIndex, StateIndex, Sym, TermIndex};
use crate::table::{Action, ParserState, ParserTable, StateItem, TableBuilder};
use indexmap::IndexMap;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// An LR(1) state: core item → lookahead set.
type Lr1State = BTreeMap<(ProdIndex, usize), BTreeSet<TermIndex>>;

fn next_sym(grammar: &TaggedGrammar, core: (ProdIndex, usize)) -> Option<Sym> {
    grammar.production(core.0).rhs.get(core.1).copied()
}

/// Saturates a state under the LR(1) closure rule.
///
/// For `[A → α·Bβ, L]` and every production `B → γ`, adds `[B → ·γ, M]`
/// where `M = FIRST(β)`, extended by `L` when `β` is nullable. Lookaheads of
/// items sharing a core are unioned.
fn closure(grammar: &TaggedGrammar, sets: &PredictiveSets, state: &mut Lr1State) {
    let mut changed = true;
    while changed {
        changed = false;

        for ((prod, dot), lookaheads) in state.clone() {
            let Some(Sym::Nonterm(b)) = next_sym(grammar, (prod, dot)) else {
                continue;
            };

            let beta = &grammar.production(prod).rhs[dot + 1..];
            let (mut first_beta, beta_nullable) = sets.first_of(beta);
            if beta_nullable {
                first_beta.extend(lookaheads.iter().copied());
            }

            for &bp in grammar.prods_for(b) {
                let entry = state.entry((bp, 0)).or_default();
                for &t in &first_beta {
                    if entry.insert(t) {
                        changed = true;
                    }
                }
            }
        }
    }
}

/// goto(I, X) with lookaheads preserved.
fn goto_state(
    grammar: &TaggedGrammar,
    sets: &PredictiveSets,
    state: &Lr1State,
    sym: Sym,
) -> Lr1State {
    let mut moved: Lr1State = BTreeMap::new();
    for (&(prod, dot), lookaheads) in state {
        if next_sym(grammar, (prod, dot)) == Some(sym) {
            moved.insert((prod, dot + 1), lookaheads.clone());
        }
    }
    closure(grammar, sets, &mut moved);
    moved
}

/// Builds the canonical LR(1) table.
///
/// The collection is enumerated exactly like the LR(0) one (BFS, goto
/// symbols nonterminals first in tag order), but states are deduplicated by
/// full item equality including lookaheads, so grammars like Appel's 3.26
/// grow states that LALR(1) would merge. Reductions land only on the
/// lookaheads of the completed item.
pub fn build_lr1(grammar: &Grammar) -> Result<ParserTable, GrammarError> {
    let tagged = TaggedGrammar::build(grammar)?;
    let sets = PredictiveSets::compute(&tagged);
    let eof = tagged.eof();

    let mut initial: Lr1State = BTreeMap::from([((ProdIndex(0), 0), BTreeSet::new())]);
    closure(&tagged, &sets, &mut initial);

    let mut states = vec![initial.clone()];
    let mut index_of: HashMap<Lr1State, StateIndex> = HashMap::from([(initial, StateIndex(0))]);
    let mut shifts: IndexMap<(StateIndex, TermIndex), StateIndex> = IndexMap::new();
    let mut gotos: IndexMap<(StateIndex, NonTermIndex), StateIndex> = IndexMap::new();
    let mut accept_state = None;

    let mut worklist: VecDeque<StateIndex> = VecDeque::from([StateIndex(0)]);
    while let Some(id) = worklist.pop_front() {
        let state = states[id.0].clone();

        let syms: BTreeSet<Sym> = state
            .keys()
            .filter_map(|&core| next_sym(&tagged, core))
            .collect();

        for sym in syms {
            if sym == Sym::Term(eof) {
                accept_state = Some(id);
                continue;
            }

            let target_state = goto_state(&tagged, &sets, &state, sym);
            let target = match index_of.get(&target_state) {
                Some(&existing) => existing,
                None => {
                    let new_id = StateIndex(states.len());
                    states.push(target_state.clone());
                    index_of.insert(target_state, new_id);
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

    debug!("LR(1) collection: {} states", states.len());

    let parser_states: Vec<ParserState> = states
        .iter()
        .map(|state| ParserState {
            items: state
                .iter()
                .map(|(&(prod, dot), lookaheads)| StateItem {
                    prod,
                    dot,
                    lookaheads: lookaheads.clone(),
                })
                .collect(),
        })
        .collect();

    let mut actions: Vec<(StateIndex, TermIndex, Action)> = Vec::new();
    for (&(state, terminal), &target) in &shifts {
        actions.push((state, terminal, Action::Shift(target)));
    }
    for (id, state) in states.iter().enumerate() {
        for (&(prod, dot), lookaheads) in state {
            if dot < tagged.production(prod).rhs.len() {
                continue;
            }
            if tagged.production(prod).lhs == tagged.augmented_start() {
                continue;
            }
            for &terminal in lookaheads {
                actions.push((StateIndex(id), terminal, Action::Reduce(prod)));
            }
        }
    }
    if let Some(accept) = accept_state {
        actions.push((accept, eof, Action::Accept));
    }

    let mut builder = TableBuilder::new(tagged, parser_states);
    for (state, terminal, action) in actions {
        builder.action(state, terminal, action);
    }
    for (&(state, nonterminal), &target) in &gotos {
        builder.goto(state, nonterminal, target);
    }

    Ok(builder.finish())
}
