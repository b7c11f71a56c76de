//! Grammar model: symbols, productions and the start symbol.
//!
//! A [`Grammar`] is an arena. Terminals, nonterminals and productions live in
//! vectors owned by the grammar and every other component refers to them by
//! index ([`TermId`], [`NonTermId`], [`ProdId`]). Names are resolved through
//! the grammar only when something has to be shown to a user.
//!
//! Grammars are assembled with [`GrammarBuilder`], which validates the whole
//! production set at once and refuses to hand out a malformed grammar.
//!
//! # Submodules
//!
//! - [`sets`]: FIRST / FOLLOW / SELECT computation
//! - [`table`]: predictive table construction and conflict detection
//! - [`c_subset`]: the built-in C-subset grammar

pub mod c_subset;
pub mod sets;
pub mod table;

use crate::config::EOF_NAME;
use crate::errors::GrammarError;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Index of a terminal in its grammar. `TermId(0)` is always the end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub usize);

/// Index of a nonterminal in its grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTermId(pub usize);

/// Production number, stable across runs (insertion order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProdId(pub usize);

/// A grammar symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(TermId),
    NonTerminal(NonTermId),
}

/// One rewrite rule `head -> body`. An empty body is an epsilon production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub id: ProdId,
    pub head: NonTermId,
    pub body: Vec<Symbol>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }
}

/// A validated, immutable context-free grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminals: Vec<String>,
    nonterminals: Vec<String>,
    productions: Vec<Production>,
    by_head: Vec<Vec<ProdId>>,
    start: NonTermId,
    terminal_index: FxHashMap<String, TermId>,
    nonterminal_index: FxHashMap<String, NonTermId>,
}

impl Grammar {
    /// The augmented start symbol.
    pub fn start(&self) -> NonTermId {
        self.start
    }

    /// The synthetic end-of-input terminal.
    pub fn eof(&self) -> TermId {
        TermId(0)
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn terminal_ids(&self) -> impl Iterator<Item = TermId> + '_ {
        (0..self.terminals.len()).map(TermId)
    }

    pub fn nonterminal_ids(&self) -> impl Iterator<Item = NonTermId> + '_ {
        (0..self.nonterminals.len()).map(NonTermId)
    }

    /// All productions in number order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProdId) -> &Production {
        &self.productions[id.0]
    }

    /// Productions whose head is `nonterminal`, in number order.
    pub fn productions_for(
        &self,
        nonterminal: NonTermId,
    ) -> impl Iterator<Item = &Production> + '_ {
        self.by_head[nonterminal.0]
            .iter()
            .map(move |id| &self.productions[id.0])
    }

    /// Looks up a terminal by its token kind.
    pub fn terminal(&self, name: &str) -> Option<TermId> {
        self.terminal_index.get(name).copied()
    }

    pub fn nonterminal(&self, name: &str) -> Option<NonTermId> {
        self.nonterminal_index.get(name).copied()
    }

    pub fn terminal_name(&self, id: TermId) -> &str {
        &self.terminals[id.0]
    }

    pub fn nonterminal_name(&self, id: NonTermId) -> &str {
        &self.nonterminals[id.0]
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(t) => self.terminal_name(t),
            Symbol::NonTerminal(n) => self.nonterminal_name(n),
        }
    }

    /// Number of productions plus total body length; drives the fixed-point
    /// iteration cap.
    pub fn size(&self) -> usize {
        let bodies: usize = self.productions.iter().map(|p| p.body.len()).sum();
        (self.productions.len() + bodies).max(1)
    }

    /// Renders a production as `Head -> a b c` (or `Head -> ε`).
    pub fn display_production(&self, id: ProdId) -> ProductionDisplay<'_> {
        ProductionDisplay {
            grammar: self,
            production: self.production(id),
        }
    }
}

/// [`fmt::Display`] adapter returned by [`Grammar::display_production`].
pub struct ProductionDisplay<'a> {
    grammar: &'a Grammar,
    production: &'a Production,
}

impl fmt::Display for ProductionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ->",
            self.grammar.nonterminal_name(self.production.head)
        )?;
        if self.production.body.is_empty() {
            return write!(f, " ε");
        }
        for symbol in &self.production.body {
            write!(f, " {}", self.grammar.symbol_name(*symbol))?;
        }
        Ok(())
    }
}

/// Collects terminals and productions by name, then validates them into a
/// [`Grammar`].
///
/// Every name that appears in a body must be either a declared terminal or
/// the head of some production; anything else is reported as an undefined
/// nonterminal.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    start: String,
    terminals: Vec<String>,
    productions: Vec<(String, Vec<String>)>,
}

impl GrammarBuilder {
    pub fn new(start: &str) -> Self {
        GrammarBuilder {
            start: start.to_string(),
            terminals: Vec::new(),
            productions: Vec::new(),
        }
    }

    /// Declares a terminal. Redeclaring a name is a no-op.
    pub fn terminal(&mut self, name: &str) -> &mut Self {
        if !self.terminals.iter().any(|t| t == name) {
            self.terminals.push(name.to_string());
        }
        self
    }

    pub fn terminals(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.terminal(name);
        }
        self
    }

    /// Adds `head -> body`. An empty `body` is an epsilon production.
    pub fn production(&mut self, head: &str, body: &[&str]) -> &mut Self {
        self.productions.push((
            head.to_string(),
            body.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn build(&self) -> Result<Grammar, GrammarError> {
        if self.productions.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        let mut terminals = vec![EOF_NAME.to_string()];
        let mut terminal_index = FxHashMap::default();
        terminal_index.insert(EOF_NAME.to_string(), TermId(0));
        for name in &self.terminals {
            if !terminal_index.contains_key(name) {
                terminal_index.insert(name.clone(), TermId(terminals.len()));
                terminals.push(name.clone());
            }
        }

        // Nonterminals are numbered by first appearance as a head.
        let mut nonterminals = Vec::new();
        let mut nonterminal_index = FxHashMap::default();
        for (head, _) in &self.productions {
            if terminal_index.contains_key(head) {
                return Err(GrammarError::SymbolClash { name: head.clone() });
            }
            if !nonterminal_index.contains_key(head) {
                nonterminal_index
                    .insert(head.clone(), NonTermId(nonterminals.len()));
                nonterminals.push(head.clone());
            }
        }

        let start = *nonterminal_index.get(&self.start).ok_or_else(|| {
            GrammarError::UndefinedStart {
                name: self.start.clone(),
            }
        })?;

        let mut productions = Vec::with_capacity(self.productions.len());
        let mut by_head = vec![Vec::new(); nonterminals.len()];
        let mut seen: FxHashSet<(NonTermId, Vec<Symbol>)> = FxHashSet::default();

        for (index, (head_name, body_names)) in self.productions.iter().enumerate() {
            let head = nonterminal_index[head_name];
            let mut body = Vec::with_capacity(body_names.len());
            for name in body_names {
                let symbol = if let Some(t) = terminal_index.get(name) {
                    Symbol::Terminal(*t)
                } else if let Some(n) = nonterminal_index.get(name) {
                    Symbol::NonTerminal(*n)
                } else {
                    return Err(GrammarError::UndefinedNonTerminal {
                        name: name.clone(),
                        production: index,
                        head: head_name.clone(),
                    });
                };
                body.push(symbol);
            }

            if !seen.insert((head, body.clone())) {
                return Err(GrammarError::DuplicateProduction {
                    production: index,
                    head: head_name.clone(),
                    body: body_names.join(" "),
                });
            }

            let id = ProdId(index);
            by_head[head.0].push(id);
            productions.push(Production { id, head, body });
        }

        Ok(Grammar {
            terminals,
            nonterminals,
            productions,
            by_head,
            start,
            terminal_index,
            nonterminal_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> GrammarBuilder {
        let mut builder = GrammarBuilder::new("S");
        builder
            .terminals(&["a", "b"])
            .production("S", &["A", "b"])
            .production("A", &["a", "A"])
            .production("A", &[]);
        builder
    }

    #[test]
    fn test_build_numbers_productions_in_order() {
        let grammar = toy().build().unwrap();
        assert_eq!(grammar.productions().len(), 3);
        assert_eq!(grammar.start(), NonTermId(0));
        assert_eq!(grammar.terminal_name(grammar.eof()), "EOF");

        let a = grammar.nonterminal("A").unwrap();
        let ids: Vec<ProdId> = grammar.productions_for(a).map(|p| p.id).collect();
        assert_eq!(ids, vec![ProdId(1), ProdId(2)]);
        assert!(grammar.production(ProdId(2)).is_epsilon());
    }

    #[test]
    fn test_display_production() {
        let grammar = toy().build().unwrap();
        assert_eq!(grammar.display_production(ProdId(0)).to_string(), "S -> A b");
        assert_eq!(grammar.display_production(ProdId(2)).to_string(), "A -> ε");
    }

    #[test]
    fn test_undefined_nonterminal_is_rejected() {
        let mut builder = toy();
        builder.production("S", &["B"]);
        match builder.build() {
            Err(GrammarError::UndefinedNonTerminal { name, .. }) => assert_eq!(name, "B"),
            other => panic!("Expected UndefinedNonTerminal, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_production_is_rejected() {
        let mut builder = toy();
        builder.production("A", &["a", "A"]);
        assert!(matches!(
            builder.build(),
            Err(GrammarError::DuplicateProduction { production: 3, .. })
        ));
    }

    #[test]
    fn test_missing_start_and_clash() {
        let mut builder = GrammarBuilder::new("Missing");
        builder.terminal("a").production("S", &["a"]);
        assert!(matches!(
            builder.build(),
            Err(GrammarError::UndefinedStart { .. })
        ));

        let mut builder = GrammarBuilder::new("S");
        builder.terminal("S").production("S", &[]);
        assert!(matches!(builder.build(), Err(GrammarError::SymbolClash { .. })));

        assert!(matches!(
            GrammarBuilder::new("S").build(),
            Err(GrammarError::EmptyGrammar)
        ));
    }
}
