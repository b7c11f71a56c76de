//! FIRST, FOLLOW and SELECT sets.
//!
//! All three are computed by fixed-point iteration: a pass folds every
//! production into the sets and reports whether anything grew. Sets only ever
//! grow, so the iteration terminates. A cap of `size²` passes turns a
//! non-terminating computation into [`GrammarError::SetIterationLimit`].

use super::{Grammar, NonTermId, ProdId, Symbol, TermId};
use crate::errors::GrammarError;
use log::debug;
use std::collections::BTreeSet;

/// A set of terminals plus the epsilon marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalSet {
    terms: BTreeSet<TermId>,
    epsilon: bool,
}

impl TerminalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the terminal was not already present.
    pub fn insert(&mut self, term: TermId) -> bool {
        self.terms.insert(term)
    }

    pub fn contains(&self, term: TermId) -> bool {
        self.terms.contains(&term)
    }

    pub fn has_epsilon(&self) -> bool {
        self.epsilon
    }

    /// Terminals in ascending id order (epsilon excluded).
    pub fn iter(&self) -> impl Iterator<Item = TermId> + '_ {
        self.terms.iter().copied()
    }

    /// Number of terminals, not counting epsilon.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && !self.epsilon
    }

    /// Adds every terminal of `other`, ignoring its epsilon marker.
    fn absorb_terms(&mut self, other: &TerminalSet) -> bool {
        let before = self.terms.len();
        self.terms.extend(other.terms.iter().copied());
        self.terms.len() != before
    }

    /// Adds every terminal of `other` and its epsilon marker.
    fn absorb(&mut self, other: &TerminalSet) -> bool {
        let grew = self.absorb_terms(other);
        if other.epsilon && !self.epsilon {
            self.epsilon = true;
            return true;
        }
        grew
    }
}

/// FIRST/FOLLOW per nonterminal and SELECT per production, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSets {
    first: Vec<TerminalSet>,
    follow: Vec<TerminalSet>,
    select: Vec<TerminalSet>,
}

impl GrammarSets {
    pub fn compute(grammar: &Grammar) -> Result<Self, GrammarError> {
        let cap = grammar.size() * grammar.size();

        let mut first = vec![TerminalSet::new(); grammar.nonterminal_count()];
        let passes = iterate(cap, "FIRST", || first_pass(grammar, &mut first))?;
        debug!("FIRST sets converged after {} passes", passes);

        let mut follow = vec![TerminalSet::new(); grammar.nonterminal_count()];
        follow[grammar.start().0].insert(grammar.eof());
        let passes = iterate(cap, "FOLLOW", || {
            follow_pass(grammar, &first, &mut follow)
        })?;
        debug!("FOLLOW sets converged after {} passes", passes);

        let select = select_sets(grammar, &first, &follow);

        Ok(GrammarSets {
            first,
            follow,
            select,
        })
    }

    pub fn first(&self, nonterminal: NonTermId) -> &TerminalSet {
        &self.first[nonterminal.0]
    }

    pub fn follow(&self, nonterminal: NonTermId) -> &TerminalSet {
        &self.follow[nonterminal.0]
    }

    pub fn select(&self, production: ProdId) -> &TerminalSet {
        &self.select[production.0]
    }

    pub fn nullable(&self, nonterminal: NonTermId) -> bool {
        self.first[nonterminal.0].has_epsilon()
    }

    /// FIRST of an arbitrary symbol sequence; epsilon is set when the whole
    /// sequence is nullable (including the empty sequence).
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> TerminalSet {
        first_of_sequence(&self.first, symbols)
    }

    /// Re-runs one pass of each computation over the stored sets and reports
    /// whether nothing changed.
    pub fn is_fixed_point(&self, grammar: &Grammar) -> bool {
        let mut first = self.first.clone();
        if first_pass(grammar, &mut first) {
            return false;
        }
        let mut follow = self.follow.clone();
        if follow_pass(grammar, &first, &mut follow) {
            return false;
        }
        select_sets(grammar, &first, &follow) == self.select
    }
}

fn iterate(
    cap: usize,
    set: &'static str,
    mut pass: impl FnMut() -> bool,
) -> Result<usize, GrammarError> {
    let mut passes = 0;
    loop {
        passes += 1;
        if passes > cap {
            return Err(GrammarError::SetIterationLimit { set, passes: cap });
        }
        if !pass() {
            return Ok(passes);
        }
    }
}

fn first_of_sequence(first: &[TerminalSet], symbols: &[Symbol]) -> TerminalSet {
    let mut result = TerminalSet::new();
    for symbol in symbols {
        match *symbol {
            Symbol::Terminal(t) => {
                result.insert(t);
                return result;
            }
            Symbol::NonTerminal(n) => {
                result.absorb_terms(&first[n.0]);
                if !first[n.0].has_epsilon() {
                    return result;
                }
            }
        }
    }
    result.epsilon = true;
    result
}

fn first_pass(grammar: &Grammar, first: &mut [TerminalSet]) -> bool {
    let mut changed = false;
    for production in grammar.productions() {
        let body_first = first_of_sequence(first, &production.body);
        changed |= first[production.head.0].absorb(&body_first);
    }
    changed
}

fn follow_pass(
    grammar: &Grammar,
    first: &[TerminalSet],
    follow: &mut [TerminalSet],
) -> bool {
    let mut changed = false;
    for production in grammar.productions() {
        for (i, symbol) in production.body.iter().enumerate() {
            let Symbol::NonTerminal(b) = *symbol else {
                continue;
            };
            let rest = first_of_sequence(first, &production.body[i + 1..]);
            changed |= follow[b.0].absorb_terms(&rest);
            if rest.has_epsilon() {
                let head_follow = follow[production.head.0].clone();
                changed |= follow[b.0].absorb_terms(&head_follow);
            }
        }
    }
    changed
}

fn select_sets(
    grammar: &Grammar,
    first: &[TerminalSet],
    follow: &[TerminalSet],
) -> Vec<TerminalSet> {
    grammar
        .productions()
        .iter()
        .map(|production| {
            let body_first = first_of_sequence(first, &production.body);
            let mut select = TerminalSet::new();
            select.absorb_terms(&body_first);
            if body_first.has_epsilon() {
                select.absorb_terms(&follow[production.head.0]);
            }
            select
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    /// Classic expression grammar with left recursion removed.
    fn expr_grammar() -> Grammar {
        let mut builder = GrammarBuilder::new("E");
        builder
            .terminals(&["+", "*", "(", ")", "id"])
            .production("E", &["T", "E'"])
            .production("E'", &["+", "T", "E'"])
            .production("E'", &[])
            .production("T", &["F", "T'"])
            .production("T'", &["*", "F", "T'"])
            .production("T'", &[])
            .production("F", &["(", "E", ")"])
            .production("F", &["id"]);
        builder.build().unwrap()
    }

    fn names(grammar: &Grammar, set: &TerminalSet) -> Vec<String> {
        let mut names: Vec<String> = set
            .iter()
            .map(|t| grammar.terminal_name(t).to_string())
            .collect();
        if set.has_epsilon() {
            names.push("ε".to_string());
        }
        names.sort();
        names
    }

    #[test]
    fn test_first_sets() {
        let g = expr_grammar();
        let sets = GrammarSets::compute(&g).unwrap();
        let nt = |n: &str| g.nonterminal(n).unwrap();

        assert_eq!(names(&g, sets.first(nt("E"))), vec!["(", "id"]);
        assert_eq!(names(&g, sets.first(nt("E'"))), vec!["+", "ε"]);
        assert_eq!(names(&g, sets.first(nt("T'"))), vec!["*", "ε"]);
        assert!(sets.nullable(nt("E'")));
        assert!(!sets.nullable(nt("F")));
    }

    #[test]
    fn test_follow_sets() {
        let g = expr_grammar();
        let sets = GrammarSets::compute(&g).unwrap();
        let nt = |n: &str| g.nonterminal(n).unwrap();

        assert_eq!(names(&g, sets.follow(nt("E"))), vec![")", "EOF"]);
        assert_eq!(names(&g, sets.follow(nt("T"))), vec![")", "+", "EOF"]);
        assert_eq!(names(&g, sets.follow(nt("F"))), vec![")", "*", "+", "EOF"]);
    }

    #[test]
    fn test_select_replaces_epsilon_with_follow() {
        let g = expr_grammar();
        let sets = GrammarSets::compute(&g).unwrap();

        // E' -> ε
        assert_eq!(names(&g, sets.select(ProdId(2))), vec![")", "EOF"]);
        // F -> id
        assert_eq!(names(&g, sets.select(ProdId(7))), vec!["id"]);
        assert!(!sets.select(ProdId(2)).has_epsilon());
    }

    #[test]
    fn test_first_of_sequence() {
        let g = expr_grammar();
        let sets = GrammarSets::compute(&g).unwrap();
        let e_prime = Symbol::NonTerminal(g.nonterminal("E'").unwrap());
        let t_prime = Symbol::NonTerminal(g.nonterminal("T'").unwrap());

        let seq = sets.first_of_sequence(&[e_prime, t_prime]);
        assert_eq!(names(&g, &seq), vec!["*", "+", "ε"]);
        assert!(sets.first_of_sequence(&[]).has_epsilon());
    }

    #[test]
    fn test_sets_are_a_fixed_point() {
        let g = expr_grammar();
        let sets = GrammarSets::compute(&g).unwrap();
        assert!(sets.is_fixed_point(&g));

        let again = GrammarSets::compute(&g).unwrap();
        assert_eq!(sets, again);
    }
}
