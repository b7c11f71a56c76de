//! The analysis pipeline bundled behind one type.
//!
//! [`Analyzer`] computes sets and the predictive table once and can then run
//! any number of parses. It is immutable after construction, so a shared
//! `&Analyzer` can serve parses on several threads at once.
//!
//! [`CAnalyzer`] adds the C-subset front end: lexing, type-name
//! classification and AST reduction.

use crate::config::ParserConfig;
use crate::errors::GrammarError;
use crate::grammar::c_subset::c_grammar;
use crate::grammar::sets::GrammarSets;
use crate::grammar::table::PredictiveTable;
use crate::grammar::Grammar;
use crate::parser::ast::TranslationUnit;
use crate::parser::diagnostics::Diagnostic;
use crate::parser::engine::{Engine, ParseStatus};
use crate::parser::lexer::{classify_type_names, LexError, Lexer};
use crate::parser::reduce::reduce_with_limit;
use crate::parser::token::{Token, TokenSource, TokenStream};
use crate::parser::tree::{ParseNode, TreeBuilder};
use crate::trace::{TraceRecorder, UsageLog};
use log::{debug, info};

/// Result of one parse.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub status: ParseStatus,
    /// `true` only when the input was accepted without any diagnostic.
    pub accepted: bool,
    pub tree: ParseNode,
    pub diagnostics: Vec<Diagnostic>,
    pub trace: TraceRecorder,
    pub usage: UsageLog,
}

/// Grammar, sets and table for one grammar.
#[derive(Debug, Clone)]
pub struct Analyzer {
    grammar: Grammar,
    sets: GrammarSets,
    table: PredictiveTable,
    config: ParserConfig,
}

impl Analyzer {
    pub fn new(grammar: Grammar, config: ParserConfig) -> Result<Self, GrammarError> {
        let sets = GrammarSets::compute(&grammar)?;
        let table = PredictiveTable::build(&grammar, &sets);
        if !table.is_ll1() {
            info!(
                "grammar is not LL(1): {} conflict(s), earliest production wins",
                table.conflicts().len()
            );
        }
        debug!(
            "analyzer ready: {} terminals, {} nonterminals, {} productions",
            grammar.terminal_count(),
            grammar.nonterminal_count(),
            grammar.productions().len()
        );
        Ok(Analyzer {
            grammar,
            sets,
            table,
            config,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sets(&self) -> &GrammarSets {
        &self.sets
    }

    pub fn table(&self) -> &PredictiveTable {
        &self.table
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn engine(&self) -> Engine<'_> {
        Engine::new(&self.grammar, &self.sets, &self.table, &self.config)
    }

    /// Parses a token source from its current position and builds the tree.
    pub fn parse<S: TokenSource + ?Sized>(&self, tokens: &mut S) -> ParseOutcome {
        let mut builder = TreeBuilder::new();
        let run = self.engine().run(tokens, &mut builder);
        let tree = builder.finish(self.grammar.start());

        ParseOutcome {
            accepted: run.status == ParseStatus::Accepted,
            status: run.status,
            tree,
            diagnostics: run.diagnostics,
            trace: run.trace,
            usage: run.usage,
        }
    }

    pub fn parse_tokens(&self, tokens: Vec<Token>) -> ParseOutcome {
        self.parse(&mut TokenStream::new(tokens))
    }
}

/// A C-subset parse: the token stream, the engine outcome and the AST.
#[derive(Debug, Clone)]
pub struct CParse {
    pub tokens: Vec<Token>,
    pub outcome: ParseOutcome,
    pub ast: TranslationUnit,
}

/// The analyzer for the built-in C-subset grammar.
#[derive(Debug, Clone)]
pub struct CAnalyzer {
    analyzer: Analyzer,
}

impl CAnalyzer {
    pub fn new(config: ParserConfig) -> Result<Self, GrammarError> {
        Ok(CAnalyzer {
            analyzer: Analyzer::new(c_grammar()?, config)?,
        })
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Lexes, parses and reduces `source`. Only lexical errors fail; syntax
    /// errors are reported in the outcome's diagnostics.
    pub fn parse_source(&self, source: &str) -> Result<CParse, LexError> {
        let mut tokens = Lexer::new(source).tokenize()?;
        classify_type_names(&mut tokens);
        debug!("lexed {} tokens", tokens.len());

        let mut stream = TokenStream::new(tokens);
        let outcome = self.analyzer.parse(&mut stream);
        let ast = reduce_with_limit(&outcome.tree, self.analyzer.config.max_nesting_depth);

        Ok(CParse {
            tokens: stream.tokens().to_vec(),
            outcome,
            ast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_analyzer_is_shareable() {
        assert_send_sync::<Analyzer>();
        assert_send_sync::<CAnalyzer>();
    }

    #[test]
    fn test_c_analyzer_accepts_declaration() {
        let analyzer = CAnalyzer::new(ParserConfig::default()).unwrap();
        let parse = analyzer.parse_source("int x;").unwrap();
        assert!(parse.outcome.accepted);
        assert_eq!(parse.tokens.len(), 3);
        assert_eq!(parse.outcome.tree.leaves().len(), 3);
    }

    #[test]
    fn test_lex_error_is_returned() {
        let analyzer = CAnalyzer::new(ParserConfig::default()).unwrap();
        assert!(analyzer.parse_source("int $;").is_err());
    }
}
