//! # Introduction
//!
//! ll1c is a table-driven LL(1) syntax analyzer. It computes FIRST, FOLLOW
//! and SELECT sets for a context-free grammar, builds the predictive parsing
//! table, and drives a stack machine over a token stream. Syntax errors are
//! recovered in panic mode so one run reports every error it can find. A
//! built-in grammar covers a subset of C, and recorded parse traces can be
//! stepped through forward and backward in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Analysis pipeline
//!
//! ```text
//! Grammar → FIRST/FOLLOW/SELECT → Predictive table
//!                                        ↓
//! Source → Lexer → Tokens → Engine → Parse tree → AST
//!                              ↓
//!                    Diagnostics, Trace → Reports, TUI
//! ```
//!
//! 1. [`grammar`]: the grammar model, the set computations and the table
//!    (conflicts are recorded and the earliest production wins).
//! 2. [`parser`]: the C lexer, the engine with panic-mode recovery, the
//!    parse tree and the reduction to an AST.
//! 3. [`analyzer`]: sets and table computed once behind one immutable value
//!    that can run any number of parses.
//! 4. [`trace`]: per-step engine snapshots and the record of table cells a
//!    parse consulted.
//! 5. [`report`]: sets listings and table exports.
//! 6. [`ui`]: ratatui-based trace viewer; not part of the stable library API.
//!
//! ## Supported C subset
//!
//! Types: `int`, `char`, `float`, `double`, `void`, `struct`, `union`,
//! pointers, fixed-size arrays.
//! Control flow: `if/else`, `while`, `for`, `break`, `continue`, `return`.
//! Top level: `#include <...>`, declarations, function definitions.

pub mod analyzer;
pub mod config;
pub mod errors;
pub mod grammar;
pub mod logging;
pub mod parser;
pub mod report;
pub mod trace;
pub mod ui;

pub use analyzer::{Analyzer, CAnalyzer, CParse, ParseOutcome};
pub use config::ParserConfig;
pub use errors::{Error, GrammarError};
pub use grammar::{Grammar, GrammarBuilder};
pub use parser::diagnostics::Diagnostic;
pub use parser::engine::ParseStatus;
