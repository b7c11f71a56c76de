//! Table-driven parsing
//!
//! This module turns a token stream into a parse tree and, for the C subset,
//! an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (C source text → tokens)
//! - [`token`]: Tokens and the [`token::TokenSource`] the engine reads from
//! - [`engine`]: The LL(1) stack machine with panic-mode recovery
//! - [`tree`]: Parse tree nodes and the event-driven builder
//! - [`diagnostics`]: Syntax errors and how recovery resolved them
//! - [`reduce`]: Parse tree → AST for the C subset
//! - [`ast`]: AST node definitions
//!
//! # Parser Implementation
//!
//! Predictive parsing driven by a table computed from the grammar's SELECT
//! sets. The engine itself knows nothing about C; any grammar accepted by
//! [`crate::grammar::GrammarBuilder`] can drive it.

pub mod ast;
pub mod diagnostics;
pub mod engine;
pub mod lexer;
pub mod reduce;
pub mod token;
pub mod tree;
