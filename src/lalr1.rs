//! LALR(1) lookahead computation and table construction.
//!
//! Implements DeRemer and Pennello's relational algorithm: instead of
//! building the LR(1) collection and merging it back down, the LA set of
//! every reduction is derived from the LR(0) automaton alone.
//!
//! For each nonterminal transition `(p, A)` of the automaton:
//!
//! - `DirectRead(p, A)` — terminals shifted out of `goto(p, A)` (with `$`
//!   read out of the accept state);
//! - `(p, A) reads (r, C)` — `r = goto(p, A)` continues with a transition on
//!   a nullable `C`;
//! - `Read` — least solution of `Read(x) = DirectRead(x) ∪ ⋃ Read(y)` over
//!   `x reads y`;
//! - `(p, A) includes (p', B)` — some production `B → β A γ` has a nullable
//!   `γ` and `β` carries `p'` to `p`, so whatever follows `B` follows `A`;
//! - `Follow` — least solution of `Follow(x) = Read(x) ∪ ⋃ Follow(y)` over
//!   `x includes y`;
//! - `(q, A → ω) lookback (p, A)` — the walk of `ω` from `p` ends in `q`,
//!   where the reduction fires;
//! - `LA(q, A → ω)` — union of `Follow` over the lookback targets.
//!
//! Both least solutions come out of the same digraph procedure, a
//! Tarjan-style DFS that unions set values across strongly connected
//! components. A component of `includes` whose members read anything at all
//! makes the grammar non-LR(k); that is the only fatal outcome past grammar
//! validation.

use crate::error::{BuildError, Result};
use crate::first_follow::{all_nullable_in_slice, PredictiveSets};
use crate::grammar::{Grammar, TaggedGrammar};
use crate::lr0::{build_automaton, tables_from_automaton, Lr0Automaton, ReduceLookaheads};
use crate::symbol::{NonTermIndex, ProdIndex, StateIndex, Sym, TermIndex};
use crate::table::ParserTable;
use indexmap::IndexSet;
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A nonterminal transition `(state, nonterminal)` of the LR(0) automaton:
/// the node domain of the `reads` and `includes` relations.
pub(crate) type NtTransition = (StateIndex, NonTermIndex);

type TermSet = BTreeSet<TermIndex>;

/// The relational quantities of one LALR(1) computation.
///
/// `direct_read`, `read` and `follow` are indexed by the position of the
/// transition in `transitions` (discovery order of the automaton's gotos).
#[derive(Debug)]
pub(crate) struct LookaheadSets {
    pub transitions: IndexSet<NtTransition>,
    pub direct_read: Vec<TermSet>,
    pub read: Vec<TermSet>,
    pub follow: Vec<TermSet>,
    pub la: BTreeMap<(StateIndex, ProdIndex), TermSet>,
}

/// Computes LA sets for every reduction of the LR(0) automaton.
pub(crate) fn compute_lookaheads(
    grammar: &TaggedGrammar,
    sets: &PredictiveSets,
    automaton: &Lr0Automaton,
) -> Result<LookaheadSets, BuildError> {
    let transitions: IndexSet<NtTransition> = automaton.gotos.keys().copied().collect();

    let mut out_shifts: HashMap<StateIndex, TermSet> = HashMap::new();
    for &(state, terminal) in automaton.shifts.keys() {
        out_shifts.entry(state).or_default().insert(terminal);
    }

    // DirectRead(p, A): terminals labelling out-shifts of goto(p, A). The
    // accept state reads $ even though its $-cell is Accept, not Shift.
    let direct_read: Vec<TermSet> = transitions
        .iter()
        .map(|&(p, a)| {
            let r = automaton.gotos[&(p, a)];
            let mut dr = out_shifts.get(&r).cloned().unwrap_or_default();
            if automaton.accept_state == Some(r) {
                dr.insert(grammar.eof());
            }
            dr
        })
        .collect();

    // x reads y  iff  y starts where x lands and moves over a nullable
    // nonterminal.
    let reads: Vec<Vec<usize>> = transitions
        .iter()
        .map(|&(p, a)| {
            let r = automaton.gotos[&(p, a)];
            transitions
                .iter()
                .enumerate()
                .filter(|&(_, &(p2, c))| p2 == r && sets.nullable[c])
                .map(|(y, _)| y)
                .collect()
        })
        .collect();

    let (read, reads_cycle) = digraph(&reads, &direct_read);
    if let Some(x) = reads_cycle {
        trace!("cyclic reads component at {:?}", transitions[x]);
    }

    let (includes, lookback) = includes_and_lookback(grammar, sets, automaton, &transitions);

    let (follow, follow_cycle) = digraph(&includes, &read);
    if let Some(x) = follow_cycle {
        let (state, nonterminal) = transitions[x];
        return Err(BuildError::NotLRk {
            state,
            nonterminal: grammar.nonterm_name(nonterminal).to_string(),
        });
    }

    let mut la: BTreeMap<(StateIndex, ProdIndex), TermSet> = BTreeMap::new();
    for ((q, prod), xs) in lookback {
        let entry = la.entry((q, prod)).or_default();
        for x in xs {
            entry.extend(follow[x].iter().copied());
        }
    }

    debug!(
        "LALR(1) lookaheads: {} nonterminal transitions, {} reductions",
        transitions.len(),
        la.len()
    );

    Ok(LookaheadSets {
        transitions,
        direct_read,
        read,
        follow,
        la,
    })
}

/// Builds `includes` (as adjacency over transition indices) and `lookback`.
///
/// For each transition `(p, A)` and each production `A → ω`, the walk of `ω`
/// advances a simulated state through the automaton's shifts and gotos. A
/// nonterminal at position `i` with an all-nullable suffix contributes an
/// `includes` edge from the inner transition to `(p, A)`; a walk that
/// completes in state `q` records `(q, A → ω) lookback (p, A)`. A walk that
/// falls off the automaton records nothing for its remaining suffix.
fn includes_and_lookback(
    grammar: &TaggedGrammar,
    sets: &PredictiveSets,
    automaton: &Lr0Automaton,
    transitions: &IndexSet<NtTransition>,
) -> (Vec<Vec<usize>>, BTreeMap<(StateIndex, ProdIndex), Vec<usize>>) {
    let mut includes: Vec<Vec<usize>> = vec![Vec::new(); transitions.len()];
    let mut lookback: BTreeMap<(StateIndex, ProdIndex), Vec<usize>> = BTreeMap::new();

    for (x, &(p, a)) in transitions.iter().enumerate() {
        for &prod_index in grammar.prods_for(a) {
            let production = grammar.production(prod_index);

            let mut walk = Some(p);
            for (i, &sym) in production.rhs.iter().enumerate() {
                let Some(state) = walk else {
                    break;
                };

                if let Sym::Nonterm(b) = sym {
                    if all_nullable_in_slice(production, i + 1, production.rhs.len(), &sets.nullable)
                    {
                        if let Some(inner) = transitions.get_index_of(&(state, b)) {
                            includes[inner].push(x);
                        }
                    }
                }

                walk = step(automaton, state, sym);
            }

            if let Some(q) = walk {
                lookback.entry((q, prod_index)).or_default().push(x);
            }
        }
    }

    (includes, lookback)
}

fn step(automaton: &Lr0Automaton, state: StateIndex, sym: Sym) -> Option<StateIndex> {
    match sym {
        Sym::Term(t) => automaton.shifts.get(&(state, t)).copied(),
        Sym::Nonterm(n) => automaton.gotos.get(&(state, n)).copied(),
    }
}

/// Node status during the digraph traversal.
#[derive(Clone, Copy)]
enum Mark {
    Untraversed,
    Traversing(usize),
    Traversed,
}

/// Solves `F(x) = base(x) ∪ ⋃{F(y) : x R y}` for a relation given as
/// adjacency lists.
///
/// A single Tarjan-style DFS: each node joins the working stack with its
/// depth as the tentative component root; edges propagate both the minimum
/// reachable depth and the set union. When a node closes its own component,
/// the whole component is popped and shares the accumulated union.
///
/// The second return value is the first non-trivial strongly connected
/// component (two or more nodes, or a self-loop) whose members contribute a
/// non-empty base value, reported by its root — the caller decides whether
/// such a cycle is fatal.
fn digraph(edges: &[Vec<usize>], base: &[TermSet]) -> (Vec<TermSet>, Option<usize>) {
    let mut solver = Digraph {
        edges,
        base,
        marks: (0..edges.len()).map(|_| Mark::Untraversed).collect(),
        stack: Vec::new(),
        sets: vec![TermSet::new(); edges.len()],
        cycle: None,
    };

    for x in 0..edges.len() {
        if matches!(solver.marks[x], Mark::Untraversed) {
            solver.traverse(x);
        }
    }

    (solver.sets, solver.cycle)
}

struct Digraph<'a> {
    edges: &'a [Vec<usize>],
    base: &'a [TermSet],
    marks: Vec<Mark>,
    stack: Vec<usize>,
    sets: Vec<TermSet>,
    cycle: Option<usize>,
}

impl Digraph<'_> {
    fn traverse(&mut self, x: usize) {
        self.stack.push(x);
        let depth = self.stack.len();
        self.marks[x] = Mark::Traversing(depth);
        self.sets[x] = self.base[x].clone();

        let mut low = depth;
        let mut self_loop = false;
        for i in 0..self.edges[x].len() {
            let y = self.edges[x][i];
            if y == x {
                self_loop = true;
                continue;
            }
            if matches!(self.marks[y], Mark::Untraversed) {
                self.traverse(y);
            }
            if let Mark::Traversing(n) = self.marks[y] {
                low = low.min(n);
            }
            let from_y = self.sets[y].clone();
            self.sets[x].extend(from_y);
        }

        self.marks[x] = Mark::Traversing(low);
        if low < depth {
            return;
        }

        // x roots a strongly connected component: pop it, sharing the union.
        let nontrivial = self_loop || self.stack.last() != Some(&x);
        let value = self.sets[x].clone();
        let mut has_base = false;
        loop {
            let y = self.stack.pop().expect("traversal stack underflow");
            self.marks[y] = Mark::Traversed;
            has_base |= !self.base[y].is_empty();
            self.sets[y] = value.clone();
            if y == x {
                break;
            }
        }

        if nontrivial && has_base && self.cycle.is_none() {
            self.cycle = Some(x);
        }
    }
}

/// Builds the LALR(1) table.
///
/// The state set is exactly the LR(0) one; only the reduction cells differ,
/// each restricted to its computed LA set. Fails with
/// [`BuildError::NotLRk`] when the lookahead dependencies are cyclic.
pub fn build_lalr1(grammar: &Grammar) -> Result<ParserTable, BuildError> {
    let tagged = TaggedGrammar::build(grammar)?;
    let sets = PredictiveSets::compute(&tagged);
    let automaton = build_automaton(&tagged);
    let lookaheads = compute_lookaheads(&tagged, &sets, &automaton)?;
    Ok(tables_from_automaton(
        tagged,
        &automaton,
        ReduceLookaheads::Computed(&lookaheads.la),
    ))
}
