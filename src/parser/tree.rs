//! Parse tree and the event-driven builder that assembles it.
//!
//! The engine reports a depth-first, left-to-right stream of events. The
//! builder keeps a stack of open expansions, each with a fixed number of child
//! slots (the body length). Every event fills the next slot of the innermost
//! open expansion; a full expansion closes into its parent.

use super::engine::ParseListener;
use super::token::Token;
use crate::grammar::{Grammar, NonTermId, ProdId, Symbol, TermId};
use serde_json::{json, Value};
use std::fmt::Write as _;

/// A node of the full derivation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNode {
    /// A nonterminal expanded with a non-empty production.
    Expansion {
        nonterminal: NonTermId,
        production: ProdId,
        children: Vec<ParseNode>,
    },
    /// A matched terminal.
    Leaf { terminal: TermId, token: Token },
    /// A nonterminal expanded with an epsilon production.
    Epsilon {
        nonterminal: NonTermId,
        production: ProdId,
    },
    /// A stack entry that error recovery discarded without deriving it.
    Missing { symbol: Symbol },
}

impl ParseNode {
    pub fn children(&self) -> &[ParseNode] {
        match self {
            ParseNode::Expansion { children, .. } => children,
            _ => &[],
        }
    }

    /// The production that produced this node, for expansions and epsilons.
    pub fn production(&self) -> Option<ProdId> {
        match self {
            ParseNode::Expansion { production, .. } | ParseNode::Epsilon { production, .. } => {
                Some(*production)
            }
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseNode::Leaf { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ParseNode::Missing { .. })
    }

    /// Matched tokens in left-to-right order.
    pub fn leaves(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                ParseNode::Leaf { token, .. } => out.push(token),
                ParseNode::Expansion { children, .. } => pending.extend(children.iter().rev()),
                ParseNode::Epsilon { .. } | ParseNode::Missing { .. } => {}
            }
        }
        out
    }

    /// The leftmost matched token, if any.
    pub fn first_token(&self) -> Option<&Token> {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                ParseNode::Leaf { token, .. } => return Some(token),
                ParseNode::Expansion { children, .. } => pending.extend(children.iter().rev()),
                ParseNode::Epsilon { .. } | ParseNode::Missing { .. } => {}
            }
        }
        None
    }

    /// Whether any part of the tree was left underived by recovery.
    pub fn has_missing(&self) -> bool {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                ParseNode::Missing { .. } => return true,
                ParseNode::Expansion { children, .. } => pending.extend(children.iter()),
                _ => {}
            }
        }
        false
    }

    /// Indented text rendering, one node per line.
    pub fn render(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        let mut pending = vec![(self, 0usize)];
        while let Some((node, depth)) = pending.pop() {
            let pad = "  ".repeat(depth);
            match node {
                ParseNode::Expansion {
                    nonterminal,
                    production,
                    children,
                } => {
                    let _ = writeln!(
                        out,
                        "{}{}  [{}]",
                        pad,
                        grammar.nonterminal_name(*nonterminal),
                        production.0
                    );
                    pending.extend(children.iter().rev().map(|c| (c, depth + 1)));
                }
                ParseNode::Leaf { token, .. } => {
                    let _ = writeln!(out, "{}{} '{}'", pad, token.kind, token.text);
                }
                ParseNode::Epsilon { nonterminal, production } => {
                    let _ = writeln!(
                        out,
                        "{}{} -> ε  [{}]",
                        pad,
                        grammar.nonterminal_name(*nonterminal),
                        production.0
                    );
                }
                ParseNode::Missing { symbol } => {
                    let _ = writeln!(out, "{}<missing {}>", pad, grammar.symbol_name(*symbol));
                }
            }
        }
        out
    }

    /// JSON rendering with symbol names resolved.
    pub fn to_json(&self, grammar: &Grammar) -> Value {
        // Each entry is a node and the JSON of the children converted so far.
        let mut pending: Vec<(&ParseNode, Vec<Value>)> = vec![(self, Vec::new())];
        let mut root = Value::Null;
        while let Some((node, converted)) = pending.last_mut() {
            let node: &ParseNode = *node;
            if let Some(child) = node.children().get(converted.len()) {
                pending.push((child, Vec::new()));
                continue;
            }
            let children = std::mem::take(converted);
            pending.pop();
            let value = node.json_node(grammar, children);
            match pending.last_mut() {
                Some((_, siblings)) => siblings.push(value),
                None => root = value,
            }
        }
        root
    }

    fn json_node(&self, grammar: &Grammar, children: Vec<Value>) -> Value {
        match self {
            ParseNode::Expansion {
                nonterminal,
                production,
                ..
            } => json!({
                "node": "expansion",
                "symbol": grammar.nonterminal_name(*nonterminal),
                "production": production.0,
                "children": children,
            }),
            ParseNode::Leaf { token, .. } => json!({
                "node": "leaf",
                "symbol": token.kind,
                "text": token.text,
                "location": token.location,
            }),
            ParseNode::Epsilon { nonterminal, production } => json!({
                "node": "epsilon",
                "symbol": grammar.nonterminal_name(*nonterminal),
                "production": production.0,
            }),
            ParseNode::Missing { symbol } => json!({
                "node": "missing",
                "symbol": grammar.symbol_name(*symbol),
            }),
        }
    }
}

// Long statement lists and deep nesting make trees thousands of levels deep;
// children are drained onto a heap stack instead of dropped recursively.
impl Drop for ParseNode {
    fn drop(&mut self) {
        let ParseNode::Expansion { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let ParseNode::Expansion { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

struct OpenNode {
    nonterminal: NonTermId,
    production: ProdId,
    arity: usize,
    children: Vec<ParseNode>,
}

impl OpenNode {
    fn close(self) -> ParseNode {
        ParseNode::Expansion {
            nonterminal: self.nonterminal,
            production: self.production,
            children: self.children,
        }
    }
}

/// Assembles a [`ParseNode`] tree from engine events.
#[derive(Default)]
pub struct TreeBuilder {
    open: Vec<OpenNode>,
    root: Option<ParseNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&mut self, node: ParseNode) {
        let mut node = node;
        loop {
            let Some(top) = self.open.last_mut() else {
                self.root = Some(node);
                return;
            };
            top.children.push(node);
            if top.children.len() < top.arity {
                return;
            }
            match self.open.pop() {
                Some(full) => node = full.close(),
                None => return,
            }
        }
    }

    /// Closes whatever is still open and returns the root.
    ///
    /// A parse that never expanded the start symbol yields `Missing(start)`.
    pub fn finish(mut self, start: NonTermId) -> ParseNode {
        while let Some(partial) = self.open.pop() {
            let node = partial.close();
            match self.open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => self.root = Some(node),
            }
        }
        self.root.unwrap_or(ParseNode::Missing {
            symbol: Symbol::NonTerminal(start),
        })
    }
}

impl ParseListener for TreeBuilder {
    fn expand(&mut self, nonterminal: NonTermId, production: ProdId, arity: usize) {
        self.open.push(OpenNode {
            nonterminal,
            production,
            arity,
            children: Vec::with_capacity(arity),
        });
    }

    fn epsilon(&mut self, nonterminal: NonTermId, production: ProdId) {
        self.attach(ParseNode::Epsilon {
            nonterminal,
            production,
        });
    }

    fn matched(&mut self, terminal: TermId, token: &Token) {
        self.attach(ParseNode::Leaf {
            terminal,
            token: token.clone(),
        });
    }

    fn missing(&mut self, symbol: Symbol) {
        self.attach(ParseNode::Missing { symbol });
    }
}
