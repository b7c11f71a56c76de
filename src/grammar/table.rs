//! Predictive parsing table.
//!
//! Cells are written set-once in production order. A second production
//! claiming an occupied cell is recorded as a [`Conflict`] and discarded, so
//! the earliest production always wins and construction always completes.

use super::sets::GrammarSets;
use super::{Grammar, NonTermId, ProdId, TermId};
use log::{debug, info};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

/// Two productions competing for the same `(nonterminal, terminal)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub nonterminal: NonTermId,
    pub terminal: TermId,
    /// The production that keeps the cell.
    pub existing: ProdId,
    /// The production that was refused.
    pub rejected: ProdId,
}

/// Partial mapping `(NonTerminal, Terminal) -> Production`.
#[derive(Debug, Clone)]
pub struct PredictiveTable {
    cells: FxHashMap<(NonTermId, TermId), ProdId>,
    conflicts: Vec<Conflict>,
}

impl PredictiveTable {
    pub fn build(grammar: &Grammar, sets: &GrammarSets) -> Self {
        let mut cells = FxHashMap::default();
        let mut conflicts = Vec::new();

        for production in grammar.productions() {
            for terminal in sets.select(production.id).iter() {
                match cells.entry((production.head, terminal)) {
                    Entry::Vacant(slot) => {
                        slot.insert(production.id);
                    }
                    Entry::Occupied(slot) => {
                        let existing = *slot.get();
                        if existing != production.id {
                            info!(
                                "LL(1) conflict at [{}, {}]: keeping ({}) {}, rejecting ({}) {}",
                                grammar.nonterminal_name(production.head),
                                grammar.terminal_name(terminal),
                                existing.0,
                                grammar.display_production(existing),
                                production.id.0,
                                grammar.display_production(production.id),
                            );
                            conflicts.push(Conflict {
                                nonterminal: production.head,
                                terminal,
                                existing,
                                rejected: production.id,
                            });
                        }
                    }
                }
            }
        }

        debug!(
            "predictive table: {} filled cells, {} conflicts",
            cells.len(),
            conflicts.len()
        );

        PredictiveTable { cells, conflicts }
    }

    pub fn get(&self, nonterminal: NonTermId, terminal: TermId) -> Option<ProdId> {
        self.cells.get(&(nonterminal, terminal)).copied()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.len()
    }

    /// Filled cells of one row, ordered by terminal id.
    pub fn row(&self, nonterminal: NonTermId) -> Vec<(TermId, ProdId)> {
        let mut row: Vec<(TermId, ProdId)> = self
            .cells
            .iter()
            .filter(|((nt, _), _)| *nt == nonterminal)
            .map(|((_, t), p)| (*t, *p))
            .collect();
        row.sort();
        row
    }

    /// Terminals that have an entry in the row of `nonterminal`.
    pub fn expected(&self, nonterminal: NonTermId) -> Vec<TermId> {
        self.row(nonterminal).into_iter().map(|(t, _)| t).collect()
    }

    /// All filled cells in `(nonterminal, terminal)` order.
    pub fn entries(&self) -> Vec<(NonTermId, TermId, ProdId)> {
        let mut entries: Vec<(NonTermId, TermId, ProdId)> = self
            .cells
            .iter()
            .map(|((nt, t), p)| (*nt, *t, *p))
            .collect();
        entries.sort();
        entries
    }
}
