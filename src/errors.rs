//! Error types.
//!
//! Only conditions that prevent the pipeline from running at all are errors.
//! Malformed input programs produce [`Diagnostic`](crate::parser::diagnostics::Diagnostic)
//! records instead, and grammar conflicts are recorded on the
//! [`PredictiveTable`](crate::grammar::table::PredictiveTable).

use crate::parser::lexer::LexError;

/// A malformed grammar. Raised once, when the grammar is built or analyzed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    EmptyGrammar,

    #[error("start symbol `{name}` has no production")]
    UndefinedStart { name: String },

    /// A body references a name that is neither a terminal nor a head.
    #[error("production {production} ({head} -> ...) references undefined nonterminal `{name}`")]
    UndefinedNonTerminal {
        name: String,
        production: usize,
        head: String,
    },

    #[error("production {production} duplicates `{head} -> {body}`")]
    DuplicateProduction {
        production: usize,
        head: String,
        body: String,
    },

    #[error("`{name}` is declared as a terminal and used as a production head")]
    SymbolClash { name: String },

    /// FIRST or FOLLOW failed to converge within the iteration cap.
    #[error("{set} computation did not converge after {passes} passes")]
    SetIterationLimit { set: &'static str, passes: usize },
}

/// Top-level error for the library's source-to-tree entry points and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
