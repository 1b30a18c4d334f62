//! Grammar model: the name-based input form and its tagged counterpart.
//!
//! Front-ends hand over a [`Grammar`] that names its symbols. Before any
//! table is built the grammar is validated, augmented with a synthetic start
//! symbol and the end-of-input marker, and every symbol is assigned a dense
//! integer tag (see [`crate::symbol`]). The result is a [`TaggedGrammar`],
//! the only grammar representation the construction algorithms see.

use crate::error::{GrammarError, Result};
use crate::symbol::{NonTermIndex, NonTermVec, ProdIndex, ProdVec, Sym, TermIndex, TermVec};
use std::collections::HashMap;
use std::fmt;

/// A production rule of the input grammar: LHS → RHS, all symbols by name.
///
/// An empty right-hand side denotes an ε-production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    /// Left-hand side (must name a declared nonterminal).
    pub lhs: String,
    /// Right-hand side (each name must be a declared symbol).
    pub rhs: Vec<String>,
}

impl Production {
    /// Creates a new production.
    pub fn new<L, R, S>(lhs: L, rhs: R) -> Self
    where
        L: Into<String>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} → ε", self.lhs)
        } else {
            write!(f, "{} → {}", self.lhs, self.rhs.join(" "))
        }
    }
}

/// A context-free grammar as supplied by a front-end.
///
/// The two alphabets are declared explicitly; right-hand sides are resolved
/// against them. Declaration order is significant: it is the order in which
/// symbols receive their tags, and therefore feeds into the (deterministic)
/// numbering of parser states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    /// All terminal names, in tag order.
    pub terminals: Vec<String>,
    /// All nonterminal names, in tag order.
    pub nonterminals: Vec<String>,
    /// The start symbol (must be a declared nonterminal).
    pub start: String,
    /// All productions; indices are 1-based in this order once tagged.
    pub productions: Vec<Production>,
}

impl Grammar {
    /// Creates a grammar from its parts.
    pub fn new<T, N, S>(terminals: T, nonterminals: N, start: S, productions: Vec<Production>) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
        S: Into<String>,
    {
        Self {
            terminals: terminals.into_iter().map(Into::into).collect(),
            nonterminals: nonterminals.into_iter().map(Into::into).collect(),
            start: start.into(),
            productions,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for prod in &self.productions {
            writeln!(f, "{}", prod)?;
        }
        Ok(())
    }
}

/// A production after tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedProduction {
    /// Left-hand side nonterminal tag.
    pub lhs: NonTermIndex,
    /// Right-hand side symbols; empty for an ε-production.
    pub rhs: Vec<Sym>,
    /// Position of this production; `0` is the augmented production.
    pub index: ProdIndex,
}

/// An augmented, fully tagged grammar.
///
/// Two synthetic symbols are added to the declared alphabets: the
/// end-of-input terminal `$` (highest terminal tag) and the fresh start
/// nonterminal (highest nonterminal tag). The augmented production
/// `Start' → S $` sits at production index 0 so that user productions keep
/// their 1-based declaration indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedGrammar {
    term_names: TermVec<String>,
    nonterm_names: NonTermVec<String>,
    start: NonTermIndex,
    productions: ProdVec<TaggedProduction>,
    prods_by_lhs: NonTermVec<Vec<ProdIndex>>,
}

impl TaggedGrammar {
    /// Validates, augments and tags an input grammar.
    ///
    /// Tags are assigned in declaration order. Rejects a start symbol that is
    /// not a declared nonterminal, any production naming an undeclared
    /// symbol, and productions that duplicate an earlier one.
    pub fn build(grammar: &Grammar) -> Result<Self> {
        let mut term_of: HashMap<&str, TermIndex> = HashMap::new();
        for (tag, name) in grammar.terminals.iter().enumerate() {
            term_of.insert(name.as_str(), TermIndex(tag));
        }
        let mut nonterm_of: HashMap<&str, NonTermIndex> = HashMap::new();
        for (tag, name) in grammar.nonterminals.iter().enumerate() {
            nonterm_of.insert(name.as_str(), NonTermIndex(tag));
        }

        let Some(&start) = nonterm_of.get(grammar.start.as_str()) else {
            return Err(GrammarError::NoStartSymbol(grammar.start.clone()));
        };

        let eof = TermIndex(grammar.terminals.len());
        let augmented_start = NonTermIndex(grammar.nonterminals.len());

        let mut productions = ProdVec::new();
        productions.push(TaggedProduction {
            lhs: augmented_start,
            rhs: vec![Sym::Nonterm(start), Sym::Term(eof)],
            index: ProdIndex(0),
        });

        let mut seen: HashMap<(NonTermIndex, Vec<Sym>), ProdIndex> = HashMap::new();
        for (offset, production) in grammar.productions.iter().enumerate() {
            let index = ProdIndex(offset + 1);
            let Some(&lhs) = nonterm_of.get(production.lhs.as_str()) else {
                return Err(GrammarError::UndefinedSymbol {
                    production: index.0,
                    symbol: production.lhs.clone(),
                });
            };

            let mut rhs = Vec::with_capacity(production.rhs.len());
            for name in &production.rhs {
                let sym = if let Some(&n) = nonterm_of.get(name.as_str()) {
                    Sym::Nonterm(n)
                } else if let Some(&t) = term_of.get(name.as_str()) {
                    Sym::Term(t)
                } else {
                    return Err(GrammarError::UndefinedSymbol {
                        production: index.0,
                        symbol: name.clone(),
                    });
                };
                rhs.push(sym);
            }

            if let Some(&first) = seen.get(&(lhs, rhs.clone())) {
                return Err(GrammarError::DuplicateProduction {
                    first: first.0,
                    second: index.0,
                });
            }
            seen.insert((lhs, rhs.clone()), index);

            productions.push(TaggedProduction { lhs, rhs, index });
        }

        let mut prods_by_lhs: NonTermVec<Vec<ProdIndex>> =
            (0..=grammar.nonterminals.len()).map(|_| Vec::new()).collect();
        for production in &productions {
            prods_by_lhs[production.lhs].push(production.index);
        }

        let term_names: TermVec<String> = grammar
            .terminals
            .iter()
            .cloned()
            .chain(std::iter::once("$".to_string()))
            .collect();
        let nonterm_names: NonTermVec<String> = grammar
            .nonterminals
            .iter()
            .cloned()
            .chain(std::iter::once(format!("{}'", grammar.start)))
            .collect();

        Ok(Self {
            term_names,
            nonterm_names,
            start,
            productions,
            prods_by_lhs,
        })
    }

    /// The user start symbol.
    pub fn start(&self) -> NonTermIndex {
        self.start
    }

    /// The synthetic start symbol of the augmented grammar.
    pub fn augmented_start(&self) -> NonTermIndex {
        NonTermIndex(self.nonterm_names.len() - 1)
    }

    /// The end-of-input terminal `$`.
    pub fn eof(&self) -> TermIndex {
        TermIndex(self.term_names.len() - 1)
    }

    /// Number of terminals, including `$`.
    pub fn term_count(&self) -> usize {
        self.term_names.len()
    }

    /// Number of nonterminals, including the synthetic start.
    pub fn nonterm_count(&self) -> usize {
        self.nonterm_names.len()
    }

    /// Iterates every terminal tag, `$` last.
    pub fn terms(&self) -> impl Iterator<Item = TermIndex> {
        self.term_names.indices()
    }

    /// Name of a terminal.
    pub fn term_name(&self, term: TermIndex) -> &str {
        &self.term_names[term]
    }

    /// Name of a nonterminal.
    pub fn nonterm_name(&self, nonterm: NonTermIndex) -> &str {
        &self.nonterm_names[nonterm]
    }

    /// Name of any tagged symbol.
    pub fn sym_name(&self, sym: Sym) -> &str {
        match sym {
            Sym::Term(t) => self.term_name(t),
            Sym::Nonterm(n) => self.nonterm_name(n),
        }
    }

    /// All productions; index 0 is the augmented production.
    pub fn productions(&self) -> &ProdVec<TaggedProduction> {
        &self.productions
    }

    /// The production at the given index.
    pub fn production(&self, index: ProdIndex) -> &TaggedProduction {
        &self.productions[index]
    }

    /// Indices of all productions whose LHS is the given nonterminal.
    pub fn prods_for(&self, nonterm: NonTermIndex) -> &[ProdIndex] {
        &self.prods_by_lhs[nonterm]
    }

    /// Renders a production with its symbol names, e.g. `S → ( L )`.
    pub fn render_production(&self, index: ProdIndex) -> String {
        let production = &self.productions[index];
        let lhs = self.nonterm_name(production.lhs);
        if production.rhs.is_empty() {
            return format!("{} → ε", lhs);
        }
        let rhs: Vec<&str> = production.rhs.iter().map(|&s| self.sym_name(s)).collect();
        format!("{} → {}", lhs, rhs.join(" "))
    }
}
