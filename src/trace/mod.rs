// Parse trace recording for step-by-step replay

use crate::grammar::{NonTermId, ProdId, TermId};
use crate::parser::token::SourceLocation;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// What the engine did in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TraceAction {
    /// Replaced a nonterminal with a production body.
    Expand { production: usize, rule: String },
    /// Replaced a nonterminal with an epsilon production.
    Epsilon { production: usize, rule: String },
    Match { terminal: String },
    Error { message: String },
    /// Discarded a token during recovery.
    Skip { token: String },
    /// Popped a nonterminal during recovery.
    Pop { symbol: String },
    Accept,
    Stop,
}

impl fmt::Display for TraceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceAction::Expand { production, rule } | TraceAction::Epsilon { production, rule } => {
                write!(f, "expand ({}) {}", production, rule)
            }
            TraceAction::Match { terminal } => write!(f, "match {}", terminal),
            TraceAction::Error { message } => write!(f, "error: {}", message),
            TraceAction::Skip { token } => write!(f, "skip {}", token),
            TraceAction::Pop { symbol } => write!(f, "pop {}", symbol),
            TraceAction::Accept => write!(f, "accept"),
            TraceAction::Stop => write!(f, "stop"),
        }
    }
}

/// State of the engine just before one step, plus the step's action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub index: usize,
    /// Stack contents, bottom first.
    pub stack: Vec<String>,
    /// Index of the lookahead in the token stream.
    pub cursor: usize,
    pub lookahead: String,
    pub location: SourceLocation,
    pub action: TraceAction,
}

/// Bounded step history. Steps past the limit are dropped and the trace is
/// marked truncated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraceRecorder {
    steps: Vec<TraceStep>,
    max_steps: usize,
    truncated: bool,
}

impl TraceRecorder {
    pub fn new(max_steps: usize) -> Self {
        TraceRecorder {
            steps: Vec::new(),
            max_steps,
            truncated: false,
        }
    }

    /// Whether another step would still be kept.
    pub fn has_room(&self) -> bool {
        self.steps.len() < self.max_steps
    }

    /// Add a step to history
    pub fn push(&mut self, step: TraceStep) {
        if self.has_room() {
            self.steps.push(step);
        } else {
            self.truncated = true;
        }
    }

    pub(crate) fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Get a step by index
    pub fn get(&self, index: usize) -> Option<&TraceStep> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn limit(&self) -> usize {
        self.max_steps
    }
}

/// Table cells and productions consulted by one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageLog {
    cells: BTreeSet<(NonTermId, TermId)>,
    productions: BTreeSet<ProdId>,
}

impl UsageLog {
    pub fn record(&mut self, nonterminal: NonTermId, terminal: TermId, production: ProdId) {
        self.cells.insert((nonterminal, terminal));
        self.productions.insert(production);
    }

    pub fn used_cell(&self, nonterminal: NonTermId, terminal: TermId) -> bool {
        self.cells.contains(&(nonterminal, terminal))
    }

    pub fn used_production(&self, production: ProdId) -> bool {
        self.productions.contains(&production)
    }

    pub fn cells(&self) -> impl Iterator<Item = (NonTermId, TermId)> + '_ {
        self.cells.iter().copied()
    }

    pub fn productions(&self) -> impl Iterator<Item = ProdId> + '_ {
        self.productions.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(index: usize) -> TraceStep {
        TraceStep {
            index,
            stack: vec!["EOF".to_string(), "S".to_string()],
            cursor: 0,
            lookahead: "a".to_string(),
            location: SourceLocation::new(1, 1),
            action: TraceAction::Accept,
        }
    }

    #[test]
    fn test_recorder_truncates_at_limit() {
        let mut trace = TraceRecorder::new(2);
        trace.push(step(0));
        trace.push(step(1));
        assert!(!trace.is_truncated());
        trace.push(step(2));

        assert_eq!(trace.len(), 2);
        assert!(trace.is_truncated());
        assert_eq!(trace.get(1).map(|s| s.index), Some(1));
        assert!(trace.get(2).is_none());
    }

    #[test]
    fn test_usage_log() {
        let mut usage = UsageLog::default();
        usage.record(NonTermId(1), TermId(2), ProdId(3));
        usage.record(NonTermId(1), TermId(2), ProdId(3));

        assert!(usage.used_cell(NonTermId(1), TermId(2)));
        assert!(!usage.used_cell(NonTermId(2), TermId(1)));
        assert!(usage.used_production(ProdId(3)));
        assert_eq!(usage.cells().count(), 1);
    }

    #[test]
    fn test_action_display() {
        let expand = TraceAction::Expand {
            production: 3,
            rule: "S -> a S".to_string(),
        };
        assert_eq!(expand.to_string(), "expand (3) S -> a S");
        assert_eq!(
            TraceAction::Skip { token: "';'".to_string() }.to_string(),
            "skip ';'"
        );
        assert_eq!(TraceAction::Accept.to_string(), "accept");
    }
}
