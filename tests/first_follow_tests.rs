//! Unit tests for NULLABLE, FIRST and FOLLOW computation.

use lr_tables::first_follow::PredictiveSets;
use lr_tables::grammar::{Grammar, Production, TaggedGrammar};
use lr_tables::symbol::{NonTermIndex, TermIndex};
use std::collections::BTreeSet;

fn compute(grammar: &Grammar) -> (TaggedGrammar, PredictiveSets) {
    let tagged = TaggedGrammar::build(grammar).unwrap();
    let sets = PredictiveSets::compute(&tagged);
    (tagged, sets)
}

fn terms(tags: &[usize]) -> BTreeSet<TermIndex> {
    tags.iter().map(|&t| TermIndex(t)).collect()
}

#[test]
fn test_nullable_propagates_through_chains() {
    // S → A B, A → ε, B → A: everything but the terminals is nullable.
    let (_, sets) = compute(&Grammar::new(
        ["a"],
        ["S", "A", "B"],
        "S",
        vec![
            Production::new("S", ["A", "B"]),
            Production::new("A", Vec::<String>::new()),
            Production::new("A", ["a"]),
            Production::new("B", ["A"]),
        ],
    ));

    assert!(sets.nullable[NonTermIndex(0)]);
    assert!(sets.nullable[NonTermIndex(1)]);
    assert!(sets.nullable[NonTermIndex(2)]);
}

#[test]
fn test_first_sees_through_nullable_prefixes() {
    // S → A b, A → a | ε: FIRST(S) = {a, b}.
    let (_, sets) = compute(&Grammar::new(
        ["a", "b"],
        ["S", "A"],
        "S",
        vec![
            Production::new("S", ["A", "b"]),
            Production::new("A", ["a"]),
            Production::new("A", Vec::<String>::new()),
        ],
    ));

    assert_eq!(sets.first[NonTermIndex(0)], terms(&[0, 1]));
    assert_eq!(sets.first[NonTermIndex(1)], terms(&[0]));
}

#[test]
fn test_follow_of_start_contains_eof() {
    let (tagged, sets) = compute(&Grammar::new(
        ["a"],
        ["S"],
        "S",
        vec![Production::new("S", ["a"])],
    ));

    assert!(sets.follow[NonTermIndex(0)].contains(&tagged.eof()));
    assert!(sets.follow[tagged.augmented_start()].contains(&tagged.eof()));
}

#[test]
fn test_follow_propagates_first_of_suffix() {
    // S → A B, A → a, B → b: FOLLOW(A) = FIRST(B) = {b}.
    let (tagged, sets) = compute(&Grammar::new(
        ["a", "b"],
        ["S", "A", "B"],
        "S",
        vec![
            Production::new("S", ["A", "B"]),
            Production::new("A", ["a"]),
            Production::new("B", ["b"]),
        ],
    ));

    assert_eq!(sets.follow[NonTermIndex(1)], terms(&[1]));
    assert_eq!(sets.follow[NonTermIndex(2)], BTreeSet::from([tagged.eof()]));
}

#[test]
fn test_follow_reaches_past_nullable_suffix() {
    // S → A C x, A → a, C → c | ε: FOLLOW(A) = {c, x} because C may vanish.
    let (_, sets) = compute(&Grammar::new(
        ["a", "c", "x"],
        ["S", "A", "C"],
        "S",
        vec![
            Production::new("S", ["A", "C", "x"]),
            Production::new("A", ["a"]),
            Production::new("C", ["c"]),
            Production::new("C", Vec::<String>::new()),
        ],
    ));

    assert_eq!(sets.follow[NonTermIndex(1)], terms(&[1, 2]));
    assert_eq!(sets.follow[NonTermIndex(2)], terms(&[2]));
}

#[test]
fn test_first_of_sequence_reports_nullability() {
    let (_, sets) = compute(&Grammar::new(
        ["a", "b"],
        ["S", "A"],
        "S",
        vec![
            Production::new("S", ["A", "b"]),
            Production::new("A", ["a"]),
            Production::new("A", Vec::<String>::new()),
        ],
    ));

    use lr_tables::symbol::Sym;
    let (first, nullable) = sets.first_of(&[Sym::Nonterm(NonTermIndex(1))]);
    assert_eq!(first, terms(&[0]));
    assert!(nullable);

    let (first, nullable) =
        sets.first_of(&[Sym::Nonterm(NonTermIndex(1)), Sym::Term(TermIndex(1))]);
    assert_eq!(first, terms(&[0, 1]));
    assert!(!nullable);

    let (first, nullable) = sets.first_of(&[]);
    assert!(first.is_empty());
    assert!(nullable);
}
