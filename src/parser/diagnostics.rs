//! Syntax diagnostics recorded by the parsing engine.

use super::token::SourceLocation;
use serde::Serialize;
use std::fmt;

/// What went wrong at the point of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A terminal on top of the stack did not match the lookahead.
    UnexpectedToken { expected: String },
    /// The table has no entry for the nonterminal on top of the stack.
    NoProduction { nonterminal: String },
    /// The parse stack grew past the configured limit.
    StackLimit { depth: usize },
}

/// How the engine resynchronized after an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecoveryAction {
    /// The nonterminal was popped without a subtree once the lookahead was in
    /// its FOLLOW set.
    PoppedNonTerminal { symbol: String, discarded: usize },
    /// Tokens were skipped until the expected terminal showed up.
    MatchedAfterSkip { discarded: usize },
    /// End of input was reached without a synchronization point.
    Stopped { discarded: usize },
}

impl RecoveryAction {
    pub fn discarded(&self) -> usize {
        match self {
            RecoveryAction::PoppedNonTerminal { discarded, .. }
            | RecoveryAction::MatchedAfterSkip { discarded }
            | RecoveryAction::Stopped { discarded } => *discarded,
        }
    }

    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, RecoveryAction::Stopped { .. })
    }
}

/// One syntax error together with the recovery it triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub location: SourceLocation,
    /// Text of the offending token (empty at end of input).
    pub found: String,
    /// Kind of the offending token.
    pub found_kind: String,
    /// Terminal names that would have been accepted.
    pub expected: Vec<String>,
    pub kind: DiagnosticKind,
    pub action: RecoveryAction,
}

impl Diagnostic {
    pub fn expects(&self, terminal: &str) -> bool {
        self.expected.iter().any(|e| e == terminal)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.location)?;

        let found = if self.found.is_empty() {
            "end of input".to_string()
        } else {
            format!("'{}'", self.found)
        };

        match &self.kind {
            DiagnosticKind::UnexpectedToken { expected } => {
                write!(f, "expected '{}' but found {}", expected, found)?;
            }
            DiagnosticKind::NoProduction { nonterminal } => {
                write!(f, "unexpected {} while parsing {}", found, nonterminal)?;
                if !self.expected.is_empty() {
                    write!(f, "; expected one of: {}", self.expected.join(" "))?;
                }
            }
            DiagnosticKind::StackLimit { depth } => {
                return write!(f, "parse stack exceeded {} entries near {}", depth, found);
            }
        }

        match &self.action {
            RecoveryAction::PoppedNonTerminal { symbol, discarded } => write!(
                f,
                " (skipped {} token(s), abandoned {})",
                discarded, symbol
            ),
            RecoveryAction::MatchedAfterSkip { discarded } => {
                write!(f, " (skipped {} token(s))", discarded)
            }
            RecoveryAction::Stopped { .. } => write!(f, " (cannot recover, parse stopped)"),
        }
    }
}
