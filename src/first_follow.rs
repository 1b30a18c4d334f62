//! NULLABLE, FIRST and FOLLOW computation over tagged grammars.
//!
//! All three are monotone fixed points iterated until no change, following
//! Aho et al., "Compilers: Principles, Techniques, and Tools" (2nd Edition),
//! section 4.4. With integer tags there is no ε terminal: sequence-FIRST
//! results carry an explicit "all nullable" flag instead.

use crate::grammar::{TaggedGrammar, TaggedProduction};
use crate::symbol::{NonTermVec, Sym, TermIndex};
use std::collections::BTreeSet;

/// The predictive sets of a tagged grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictiveSets {
    /// `nullable[A]` iff some production `A → α` has an all-nullable `α`.
    pub nullable: NonTermVec<bool>,
    /// `first[A]`: terminals that can start a sentence derived from `A`.
    pub first: NonTermVec<BTreeSet<TermIndex>>,
    /// `follow[A]`: terminals that can follow `A` in a sentential form.
    pub follow: NonTermVec<BTreeSet<TermIndex>>,
}

impl PredictiveSets {
    /// Computes NULLABLE, FIRST and FOLLOW for the augmented grammar.
    pub fn compute(grammar: &TaggedGrammar) -> Self {
        let nullable = compute_nullable(grammar);
        let first = compute_first(grammar, &nullable);

        let mut sets = Self {
            nullable,
            first,
            follow: (0..grammar.nonterm_count()).map(|_| BTreeSet::new()).collect(),
        };
        sets.compute_follow(grammar);
        sets
    }

    /// FIRST of a symbol sequence.
    ///
    /// Returns the terminals that can start a derivation of `syms`, together
    /// with whether the whole sequence is nullable (the empty sequence
    /// trivially is).
    pub fn first_of(&self, syms: &[Sym]) -> (BTreeSet<TermIndex>, bool) {
        let mut result = BTreeSet::new();
        for &sym in syms {
            match sym {
                Sym::Term(t) => {
                    result.insert(t);
                    return (result, false);
                }
                Sym::Nonterm(n) => {
                    result.extend(self.first[n].iter().copied());
                    if !self.nullable[n] {
                        return (result, false);
                    }
                }
            }
        }
        (result, true)
    }

    fn compute_follow(&mut self, grammar: &TaggedGrammar) {
        // $ follows the augmented start; everything else propagates from the
        // production bodies (the augmented `Start' → S $` also plants $ into
        // FOLLOW(S) through the FIRST rule).
        self.follow[grammar.augmented_start()].insert(grammar.eof());

        let mut changed = true;
        while changed {
            changed = false;

            for production in grammar.productions() {
                for (i, &sym) in production.rhs.iter().enumerate() {
                    let Sym::Nonterm(b) = sym else {
                        continue;
                    };

                    let (first_beta, beta_nullable) = self.first_of(&production.rhs[i + 1..]);
                    let before = self.follow[b].len();
                    self.follow[b].extend(first_beta);
                    if beta_nullable {
                        let follow_lhs = self.follow[production.lhs].clone();
                        self.follow[b].extend(follow_lhs);
                    }
                    if self.follow[b].len() != before {
                        changed = true;
                    }
                }
            }
        }
    }
}

/// True iff every symbol of `prod.rhs[lo..hi]` is a nullable nonterminal
/// (terminals force false; an empty slice is trivially nullable).
pub fn all_nullable_in_slice(
    prod: &TaggedProduction,
    lo: usize,
    hi: usize,
    nullable: &NonTermVec<bool>,
) -> bool {
    prod.rhs[lo..hi].iter().all(|&sym| match sym {
        Sym::Term(_) => false,
        Sym::Nonterm(n) => nullable[n],
    })
}

fn compute_nullable(grammar: &TaggedGrammar) -> NonTermVec<bool> {
    let mut nullable: NonTermVec<bool> = (0..grammar.nonterm_count()).map(|_| false).collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            if nullable[production.lhs] {
                continue;
            }
            if all_nullable_in_slice(production, 0, production.rhs.len(), &nullable) {
                nullable[production.lhs] = true;
                changed = true;
            }
        }
    }

    nullable
}

fn compute_first(grammar: &TaggedGrammar, nullable: &NonTermVec<bool>) -> NonTermVec<BTreeSet<TermIndex>> {
    let mut first: NonTermVec<BTreeSet<TermIndex>> =
        (0..grammar.nonterm_count()).map(|_| BTreeSet::new()).collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            let mut addition = BTreeSet::new();
            for &sym in &production.rhs {
                match sym {
                    Sym::Term(t) => {
                        addition.insert(t);
                        break;
                    }
                    Sym::Nonterm(n) => {
                        addition.extend(first[n].iter().copied());
                        if !nullable[n] {
                            break;
                        }
                    }
                }
            }

            let before = first[production.lhs].len();
            first[production.lhs].extend(addition);
            if first[production.lhs].len() != before {
                changed = true;
            }
        }
    }

    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, Production};
    use crate::symbol::NonTermIndex;

    // S → A B, A → a | ε, B → b
    fn sample_sets() -> (TaggedGrammar, PredictiveSets) {
        let grammar = Grammar::new(
            ["a", "b"],
            ["S", "A", "B"],
            "S",
            vec![
                Production::new("S", ["A", "B"]),
                Production::new("A", ["a"]),
                Production::new("A", Vec::<String>::new()),
                Production::new("B", ["b"]),
            ],
        );
        let tagged = TaggedGrammar::build(&grammar).unwrap();
        let sets = PredictiveSets::compute(&tagged);
        (tagged, sets)
    }

    #[test]
    fn test_nullable() {
        let (_, sets) = sample_sets();
        assert!(!sets.nullable[NonTermIndex(0)]); // S
        assert!(sets.nullable[NonTermIndex(1)]); // A
        assert!(!sets.nullable[NonTermIndex(2)]); // B
    }

    #[test]
    fn test_first_skips_nullable_prefix() {
        let (tagged, sets) = sample_sets();
        // FIRST(S) = {a, b} because A may vanish.
        assert_eq!(
            sets.first[NonTermIndex(0)],
            BTreeSet::from([TermIndex(0), TermIndex(1)])
        );
        let (first_ab, nullable) =
            sets.first_of(&[Sym::Nonterm(NonTermIndex(1)), Sym::Nonterm(NonTermIndex(2))]);
        assert_eq!(first_ab, BTreeSet::from([TermIndex(0), TermIndex(1)]));
        assert!(!nullable);
        let _ = tagged;
    }

    #[test]
    fn test_follow() {
        let (tagged, sets) = sample_sets();
        // FOLLOW(A) = FIRST(B) = {b}, FOLLOW(B) = FOLLOW(S) = {$}.
        assert_eq!(sets.follow[NonTermIndex(1)], BTreeSet::from([TermIndex(1)]));
        assert_eq!(sets.follow[NonTermIndex(2)], BTreeSet::from([tagged.eof()]));
        assert_eq!(sets.follow[NonTermIndex(0)], BTreeSet::from([tagged.eof()]));
    }
}
