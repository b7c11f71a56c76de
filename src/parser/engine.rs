//! Table-driven parsing engine with panic-mode recovery.
//!
//! The engine is an explicit state machine over a symbol stack that starts as
//! `[EOF, start]`:
//!
//! | state        | top of stack | behavior                                          |
//! |--------------|--------------|---------------------------------------------------|
//! | `Matching`   | terminal     | match and advance, or record an error             |
//! | `Predicting` | nonterminal  | expand via the table, or record an error          |
//! | `Recovering` | any          | discard tokens until a synchronization point      |
//! | `Accepted`   | `EOF`        | lookahead is end of input                         |
//! | `Stopped`    | any          | end of input reached while recovering             |
//!
//! Recovery for a nonterminal top skips tokens until the lookahead is in its
//! FOLLOW set and then pops it without a subtree. For a terminal top it skips
//! until the lookahead equals that terminal. Every error becomes a
//! [`Diagnostic`]; the engine itself never fails.
//!
//! Progress is reported to a [`ParseListener`] as a depth-first event stream.

use super::diagnostics::{Diagnostic, DiagnosticKind, RecoveryAction};
use super::token::{SourceLocation, Token, TokenSource};
use crate::config::ParserConfig;
use crate::grammar::sets::GrammarSets;
use crate::grammar::table::PredictiveTable;
use crate::grammar::{Grammar, NonTermId, ProdId, Symbol, TermId};
use crate::trace::{TraceAction, TraceRecorder, TraceStep, UsageLog};
use log::{debug, trace};
use serde::Serialize;

/// Receives parse events in emission order.
pub trait ParseListener {
    /// A nonterminal was expanded with a non-empty body of `arity` symbols.
    fn expand(&mut self, nonterminal: NonTermId, production: ProdId, arity: usize);
    /// A nonterminal was expanded with an epsilon production.
    fn epsilon(&mut self, nonterminal: NonTermId, production: ProdId);
    fn matched(&mut self, terminal: TermId, token: &Token);
    /// A stack entry was discarded by recovery without being derived.
    fn missing(&mut self, symbol: Symbol);
}

/// Listener that ignores every event.
pub struct NullListener;

impl ParseListener for NullListener {
    fn expand(&mut self, _: NonTermId, _: ProdId, _: usize) {}
    fn epsilon(&mut self, _: NonTermId, _: ProdId) {}
    fn matched(&mut self, _: TermId, _: &Token) {}
    fn missing(&mut self, _: Symbol) {}
}

/// How a parse ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    /// Reached the accepting state without any error.
    Accepted,
    /// Reached the accepting state after recovering from errors.
    Recovered,
    /// Hit end of input without a synchronization point.
    Stopped,
}

impl std::fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ParseStatus::Accepted => "accepted",
            ParseStatus::Recovered => "recovered",
            ParseStatus::Stopped => "stopped",
        })
    }
}

/// Named states of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Matching,
    Predicting,
    Recovering,
    Accepted,
    Stopped,
}

/// Everything the engine produced apart from listener events.
#[derive(Debug, Clone)]
pub struct EngineRun {
    pub status: ParseStatus,
    pub diagnostics: Vec<Diagnostic>,
    pub trace: TraceRecorder,
    pub usage: UsageLog,
    /// Number of state-machine steps taken.
    pub steps: usize,
}

/// Drives parses over one grammar, its sets and its table.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    grammar: &'a Grammar,
    sets: &'a GrammarSets,
    table: &'a PredictiveTable,
    config: &'a ParserConfig,
}

impl<'a> Engine<'a> {
    pub fn new(
        grammar: &'a Grammar,
        sets: &'a GrammarSets,
        table: &'a PredictiveTable,
        config: &'a ParserConfig,
    ) -> Self {
        Engine {
            grammar,
            sets,
            table,
            config,
        }
    }

    /// Parses `tokens` to completion, reporting events to `listener`.
    pub fn run<S, L>(&self, tokens: &mut S, listener: &mut L) -> EngineRun
    where
        S: TokenSource + ?Sized,
        L: ParseListener + ?Sized,
    {
        let mut machine = Machine {
            engine: *self,
            tokens,
            listener,
            stack: vec![
                Symbol::Terminal(self.grammar.eof()),
                Symbol::NonTerminal(self.grammar.start()),
            ],
            diagnostics: Vec::new(),
            pending: None,
            trace: if self.config.trace {
                TraceRecorder::new(self.config.trace_limit)
            } else {
                TraceRecorder::default()
            },
            usage: UsageLog::default(),
            steps: 0,
        };

        let mut state = machine.classify_top();
        loop {
            state = match state {
                EngineState::Matching => machine.match_terminal(),
                EngineState::Predicting => machine.predict(),
                EngineState::Recovering => machine.recover(),
                EngineState::Accepted | EngineState::Stopped => break,
            };
            machine.steps += 1;
        }

        if state == EngineState::Stopped {
            machine.close_stack();
        }

        let status = match state {
            EngineState::Accepted if machine.diagnostics.is_empty() => ParseStatus::Accepted,
            EngineState::Accepted => ParseStatus::Recovered,
            _ => ParseStatus::Stopped,
        };

        debug!(
            "parse finished: {:?} after {} steps with {} diagnostic(s)",
            status,
            machine.steps,
            machine.diagnostics.len()
        );

        EngineRun {
            status,
            diagnostics: machine.diagnostics,
            trace: machine.trace,
            usage: machine.usage,
            steps: machine.steps,
        }
    }
}

/// An error waiting for recovery to decide its action.
struct PendingError {
    location: SourceLocation,
    found: String,
    found_kind: String,
    expected: Vec<String>,
    kind: DiagnosticKind,
}

struct Machine<'e, 'p, S: ?Sized, L: ?Sized> {
    engine: Engine<'e>,
    tokens: &'p mut S,
    listener: &'p mut L,
    /// Bottom to top. Tree back-links live in the listener's open nodes.
    stack: Vec<Symbol>,
    diagnostics: Vec<Diagnostic>,
    pending: Option<PendingError>,
    trace: TraceRecorder,
    usage: UsageLog,
    steps: usize,
}

impl<S, L> Machine<'_, '_, S, L>
where
    S: TokenSource + ?Sized,
    L: ParseListener + ?Sized,
{
    fn classify_top(&self) -> EngineState {
        match self.stack.last() {
            Some(Symbol::Terminal(_)) => EngineState::Matching,
            Some(Symbol::NonTerminal(_)) => EngineState::Predicting,
            None => EngineState::Stopped,
        }
    }

    /// The lookahead as a grammar terminal. Unknown token kinds map to `None`
    /// and never match anything.
    fn lookahead(&self) -> Option<TermId> {
        self.engine.grammar.terminal(&self.tokens.peek().kind)
    }

    fn match_terminal(&mut self) -> EngineState {
        let Some(&Symbol::Terminal(expected)) = self.stack.last()
        else {
            return self.classify_top();
        };
        let grammar = self.engine.grammar;

        if self.lookahead() != Some(expected) {
            self.raise(
                vec![grammar.terminal_name(expected).to_string()],
                DiagnosticKind::UnexpectedToken {
                    expected: grammar.terminal_name(expected).to_string(),
                },
            );
            return EngineState::Recovering;
        }

        if expected == grammar.eof() && self.stack.len() == 1 {
            self.record(TraceAction::Accept);
            return EngineState::Accepted;
        }

        self.record(TraceAction::Match {
            terminal: grammar.terminal_name(expected).to_string(),
        });
        self.stack.pop();
        let token = self.tokens.advance();
        self.listener.matched(expected, &token);
        self.classify_top()
    }

    fn predict(&mut self) -> EngineState {
        let Some(&Symbol::NonTerminal(top)) = self.stack.last()
        else {
            return self.classify_top();
        };
        let grammar = self.engine.grammar;
        let lookahead = self.lookahead();

        let Some((terminal, prod_id)) =
            lookahead.and_then(|t| self.engine.table.get(top, t).map(|p| (t, p)))
        else {
            let expected = self
                .engine
                .table
                .expected(top)
                .into_iter()
                .map(|t| grammar.terminal_name(t).to_string())
                .collect();
            self.raise(
                expected,
                DiagnosticKind::NoProduction {
                    nonterminal: grammar.nonterminal_name(top).to_string(),
                },
            );
            return EngineState::Recovering;
        };

        let production = grammar.production(prod_id);
        let depth = self.stack.len() - 1 + production.body.len();
        if depth > self.engine.config.max_stack_depth {
            return self.stack_limit(depth);
        }

        self.usage.record(top, terminal, prod_id);
        let rule = grammar.display_production(prod_id).to_string();
        if production.is_epsilon() {
            self.record(TraceAction::Epsilon {
                production: prod_id.0,
                rule,
            });
            self.stack.pop();
            self.listener.epsilon(top, prod_id);
        } else {
            self.record(TraceAction::Expand {
                production: prod_id.0,
                rule,
            });
            self.stack.pop();
            self.listener.expand(top, prod_id, production.body.len());
            for symbol in production.body.iter().rev() {
                self.stack.push(*symbol);
            }
        }

        self.classify_top()
    }

    /// Skips tokens until the top of the stack can resume.
    fn recover(&mut self) -> EngineState {
        let grammar = self.engine.grammar;
        let mut discarded = 0;

        loop {
            let Some(top) = self.stack.last().copied() else {
                self.resolve(RecoveryAction::Stopped { discarded });
                return EngineState::Stopped;
            };
            let lookahead = self.lookahead();

            match top {
                Symbol::NonTerminal(n) => {
                    if lookahead.is_some_and(|t| self.engine.sets.follow(n).contains(t)) {
                        let name = grammar.nonterminal_name(n).to_string();
                        self.record(TraceAction::Pop {
                            symbol: name.clone(),
                        });
                        self.stack.pop();
                        self.listener.missing(top);
                        self.resolve(RecoveryAction::PoppedNonTerminal {
                            symbol: name,
                            discarded,
                        });
                        return self.classify_top();
                    }
                }
                Symbol::Terminal(t) => {
                    if lookahead == Some(t) {
                        self.resolve(RecoveryAction::MatchedAfterSkip { discarded });
                        return EngineState::Matching;
                    }
                }
            }

            if self.tokens.peek().is_eof() {
                self.record(TraceAction::Stop);
                self.resolve(RecoveryAction::Stopped { discarded });
                return EngineState::Stopped;
            }

            let token = self.tokens.peek().to_string();
            self.record(TraceAction::Skip { token });
            self.tokens.advance();
            discarded += 1;
        }
    }

    fn raise(&mut self, expected: Vec<String>, kind: DiagnosticKind) {
        let token = self.tokens.peek();
        let message = format!("unexpected {}", token);
        let pending = PendingError {
            location: token.location,
            found: token.text.clone(),
            found_kind: token.kind.clone(),
            expected,
            kind,
        };
        self.record(TraceAction::Error { message });
        self.pending = Some(pending);
    }

    /// Turns the pending error into a diagnostic with the chosen action.
    fn resolve(&mut self, action: RecoveryAction) {
        if let Some(pending) = self.pending.take() {
            let diagnostic = Diagnostic {
                location: pending.location,
                found: pending.found,
                found_kind: pending.found_kind,
                expected: pending.expected,
                kind: pending.kind,
                action,
            };
            debug!("syntax error: {}", diagnostic);
            self.diagnostics.push(diagnostic);
        }
    }

    fn stack_limit(&mut self, depth: usize) -> EngineState {
        let token = self.tokens.peek();
        let diagnostic = Diagnostic {
            location: token.location,
            found: token.text.clone(),
            found_kind: token.kind.clone(),
            expected: Vec::new(),
            kind: DiagnosticKind::StackLimit { depth },
            action: RecoveryAction::Stopped { discarded: 0 },
        };
        debug!("syntax error: {}", diagnostic);
        self.diagnostics.push(diagnostic);
        self.record(TraceAction::Stop);
        EngineState::Stopped
    }

    /// Closes every entry above `EOF` as missing so the partial tree is
    /// well-formed.
    fn close_stack(&mut self) {
        while self.stack.len() > 1 {
            if let Some(symbol) = self.stack.pop() {
                self.listener.missing(symbol);
            }
        }
    }

    fn record(&mut self, action: TraceAction) {
        trace!("step {}: {:?}", self.steps, action);
        if !self.engine.config.trace {
            return;
        }
        if !self.trace.has_room() {
            self.trace.mark_truncated();
            return;
        }

        let grammar = self.engine.grammar;
        let lookahead = self.tokens.peek();
        let step = TraceStep {
            index: self.trace.len(),
            stack: self
                .stack
                .iter()
                .map(|symbol| grammar.symbol_name(*symbol).to_string())
                .collect(),
            cursor: self.tokens.position(),
            lookahead: lookahead.to_string(),
            location: lookahead.location,
            action,
        };
        self.trace.push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::parser::token::TokenStream;

    struct Fixture {
        grammar: Grammar,
        sets: GrammarSets,
        table: PredictiveTable,
        config: ParserConfig,
    }

    impl Fixture {
        fn new(builder: &GrammarBuilder) -> Self {
            let grammar = builder.build().unwrap();
            let sets = GrammarSets::compute(&grammar).unwrap();
            let table = PredictiveTable::build(&grammar, &sets);
            Fixture {
                grammar,
                sets,
                table,
                config: ParserConfig::default().with_trace(true),
            }
        }

        fn run(&self, kinds: &[&str]) -> EngineRun {
            let engine = Engine::new(&self.grammar, &self.sets, &self.table, &self.config);
            engine.run(&mut TokenStream::from_kinds(kinds), &mut NullListener)
        }
    }

    /// L -> ( L ) L | ε ; balanced parentheses
    fn parens() -> Fixture {
        let mut builder = GrammarBuilder::new("L");
        builder
            .terminals(&["(", ")", ";"])
            .production("L", &["(", "L", ")", "L"])
            .production("L", &[]);
        Fixture::new(&builder)
    }

    /// S -> id = E ; ; E -> id | num
    fn assignment() -> Fixture {
        let mut builder = GrammarBuilder::new("S");
        builder
            .terminals(&["id", "num", "=", ";"])
            .production("S", &["id", "=", "E", ";"])
            .production("E", &["id"])
            .production("E", &["num"]);
        Fixture::new(&builder)
    }

    #[test]
    fn test_accepts_balanced_input() {
        let run = parens().run(&["(", "(", ")", ")", "(", ")"]);
        assert_eq!(run.status, ParseStatus::Accepted);
        assert!(run.diagnostics.is_empty());
        assert!(matches!(
            run.trace.steps().last().map(|s| &s.action),
            Some(TraceAction::Accept)
        ));
    }

    #[test]
    fn test_expansion_pushes_body_reversed() {
        let run = parens().run(&["(", ")"]);
        let steps = run.trace.steps();
        assert!(matches!(steps[0].action, TraceAction::Expand { production: 0, .. }));
        assert_eq!(steps[0].stack, vec!["EOF", "L"]);
        assert_eq!(steps[1].stack, vec!["EOF", "L", ")", "L", "("]);
    }

    #[test]
    fn test_trailing_token_is_skipped() {
        let run = parens().run(&["(", ")", ")"]);
        assert_eq!(run.status, ParseStatus::Recovered);
        assert_eq!(run.diagnostics.len(), 1);
        assert_eq!(
            run.diagnostics[0].action,
            RecoveryAction::MatchedAfterSkip { discarded: 1 }
        );
    }

    #[test]
    fn test_missing_terminal_at_end_stops() {
        let run = assignment().run(&["id", "=", "num"]);
        assert_eq!(run.status, ParseStatus::Stopped);
        assert_eq!(run.diagnostics.len(), 1);

        let diag = &run.diagnostics[0];
        assert_eq!(diag.expected, vec![";".to_string()]);
        assert!(diag.found.is_empty());
        assert!(diag.action.is_unrecoverable());
    }

    #[test]
    fn test_nonterminal_popped_on_follow() {
        // `E` has no entry on `;`, which is in FOLLOW(E).
        let run = assignment().run(&["id", "=", ";"]);
        assert_eq!(run.status, ParseStatus::Recovered);
        assert_eq!(run.diagnostics.len(), 1);
        assert!(matches!(
            &run.diagnostics[0].kind,
            DiagnosticKind::NoProduction { nonterminal } if nonterminal == "E"
        ));
        assert!(matches!(
            &run.diagnostics[0].action,
            RecoveryAction::PoppedNonTerminal { symbol, discarded: 0 } if symbol == "E"
        ));
    }

    #[test]
    fn test_unknown_token_kind_is_discarded() {
        let run = assignment().run(&["id", "=", "@", "num", ";"]);
        assert_eq!(run.status, ParseStatus::Recovered);
        assert_eq!(run.diagnostics.len(), 1);
        assert_eq!(run.diagnostics[0].found_kind, "@");
    }

    #[test]
    fn test_stack_limit_stops_runaway_expansion() {
        // Left recursion makes the table conflict; the earliest production
        // (the recursive one) wins and expands forever.
        let mut builder = GrammarBuilder::new("A");
        builder
            .terminals(&["a"])
            .production("A", &["A", "a"])
            .production("A", &["a"]);
        let mut fixture = Fixture::new(&builder);
        fixture.config = ParserConfig::default().with_max_stack_depth(50);

        let run = fixture.run(&["a", "a"]);
        assert_eq!(run.status, ParseStatus::Stopped);
        assert!(matches!(
            run.diagnostics[0].kind,
            DiagnosticKind::StackLimit { .. }
        ));
    }

    #[test]
    fn test_trace_is_capped() {
        let mut fixture = parens();
        fixture.config = ParserConfig::default().with_trace(true).with_trace_limit(3);
        let run = fixture.run(&["(", ")", "(", ")"]);

        assert_eq!(run.status, ParseStatus::Accepted);
        assert_eq!(run.trace.len(), 3);
        assert!(run.trace.is_truncated());
        assert_eq!(run.trace.steps()[0].stack, vec!["EOF", "L"]);
    }
}
