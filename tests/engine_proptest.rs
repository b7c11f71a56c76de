//! Property-based tests for the parsing engine
//!
//! Arbitrary token sequences over the C-subset vocabulary (plus a kind the
//! grammar does not know) must never panic the engine, and every run must
//! leave a consistent outcome behind.

use ll1c::analyzer::Analyzer;
use ll1c::config::ParserConfig;
use ll1c::grammar::c_subset::{c_grammar, TERMINALS};
use ll1c::parser::engine::ParseStatus;
use ll1c::parser::reduce::reduce;
use ll1c::parser::token::TokenStream;
use proptest::prelude::*;
use std::sync::OnceLock;

fn analyzer() -> &'static Analyzer {
    static ANALYZER: OnceLock<Analyzer> = OnceLock::new();
    ANALYZER.get_or_init(|| {
        let config = ParserConfig::default().with_trace(true).with_trace_limit(500);
        Analyzer::new(c_grammar().unwrap(), config).unwrap()
    })
}

fn token_kind() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        9 => proptest::sample::select(TERMINALS),
        1 => Just("@"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn engine_never_panics(kinds in proptest::collection::vec(token_kind(), 0..60)) {
        let outcome = analyzer().parse(&mut TokenStream::from_kinds(&kinds));

        // Accepted exactly when nothing went wrong
        prop_assert_eq!(outcome.accepted, outcome.diagnostics.is_empty());
        prop_assert_eq!(outcome.accepted, outcome.status == ParseStatus::Accepted);
        if outcome.status == ParseStatus::Stopped {
            prop_assert!(outcome.diagnostics.last().is_some_and(|d| d.action.is_unrecoverable()));
        }

        // Leaves are the matched tokens, in input order
        let positions: Vec<usize> = outcome
            .tree
            .leaves()
            .iter()
            .map(|t| t.location.column - 1)
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        for (position, leaf) in positions.iter().zip(outcome.tree.leaves()) {
            prop_assert_eq!(kinds[*position], leaf.kind.as_str());
        }

        // Only recovery leaves holes in the tree
        if outcome.accepted {
            prop_assert!(!outcome.tree.has_missing());
        }

        prop_assert!(outcome.trace.len() <= 500);
        let _ = reduce(&outcome.tree);
    }

    #[test]
    fn parse_is_deterministic(kinds in proptest::collection::vec(token_kind(), 0..40)) {
        let first = analyzer().parse(&mut TokenStream::from_kinds(&kinds));
        let second = analyzer().parse(&mut TokenStream::from_kinds(&kinds));

        prop_assert_eq!(&first.tree, &second.tree);
        prop_assert_eq!(&first.diagnostics, &second.diagnostics);
        prop_assert_eq!(reduce(&first.tree), reduce(&second.tree));
    }
}
