// Panic-mode recovery on malformed C input

use ll1c::analyzer::{CAnalyzer, CParse};
use ll1c::config::ParserConfig;
use ll1c::parser::ast::*;
use ll1c::parser::diagnostics::{DiagnosticKind, RecoveryAction};
use ll1c::parser::engine::ParseStatus;

fn parse(source: &str) -> CParse {
    let _ = ll1c::logging::builder(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
    CAnalyzer::new(ParserConfig::default())
        .unwrap()
        .parse_source(source)
        .unwrap()
}

#[test]
fn test_errors_in_separate_functions_are_all_reported() {
    let source = r#"
int f() {
    int a = ;
    return a;
}

int g() {
    return 1 +;
}

int h() {
    return 0;
}
"#;
    let parse = parse(source);
    let outcome = &parse.outcome;

    assert!(!outcome.accepted);
    assert_eq!(outcome.status, ParseStatus::Recovered);
    assert!(outcome.diagnostics.len() >= 2);

    let lines: Vec<usize> = outcome.diagnostics.iter().map(|d| d.location.line).collect();
    assert!(lines.contains(&3));
    assert!(lines.contains(&8));

    // Diagnostics come out in source order
    let mut sorted = outcome.diagnostics.clone();
    sorted.sort_by_key(|d| d.location);
    assert_eq!(sorted, outcome.diagnostics);

    // The function after the errors still reduces cleanly
    let names: Vec<&str> = parse
        .ast
        .items
        .iter()
        .filter_map(|item| match item {
            ExternalDecl::FunctionDef { function } => Some(function.name.as_str()),
            _ => None,
        })
        .collect();
    assert!(names.contains(&"h"));
}

#[test]
fn test_stray_token_in_condition_is_skipped() {
    // `b` cannot continue the condition and is skipped
    let parse = parse("int main() { if (a b) return 1; return 0; }");
    let outcome = &parse.outcome;

    assert_eq!(outcome.status, ParseStatus::Recovered);
    let first = &outcome.diagnostics[0];
    assert_eq!(first.found, "b");
    assert!(first.expects(")"));
}

#[test]
fn test_unexpected_token_skips_to_expected_terminal() {
    // `]` expected after the array size; `4` is skipped
    let parse = parse("int a[3 4]; int b;");
    let outcome = &parse.outcome;

    assert_eq!(outcome.status, ParseStatus::Recovered);
    assert_eq!(outcome.diagnostics.len(), 1);
    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(
        diagnostic.kind,
        DiagnosticKind::UnexpectedToken {
            expected: "]".to_string()
        }
    );
    assert_eq!(diagnostic.action, RecoveryAction::MatchedAfterSkip { discarded: 1 });
    assert_eq!(parse.ast.items.len(), 2);
}

#[test]
fn test_stray_closing_brace() {
    let parse = parse("int x; } int y;");
    assert!(!parse.outcome.accepted);
    let first = &parse.outcome.diagnostics[0];
    assert_eq!(first.found, "}");
    assert!(matches!(first.kind, DiagnosticKind::NoProduction { .. }));
}

#[test]
fn test_truncated_input_stops_with_partial_tree() {
    let parse = parse("int main() { while (1) {");
    let outcome = &parse.outcome;

    assert!(!outcome.accepted);
    assert!(!outcome.diagnostics.is_empty());
    assert!(outcome.tree.has_missing());

    let leaves: Vec<&str> = outcome.tree.leaves().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(leaves.first(), Some(&"int"));

    // The reduced AST still names the function
    let ExternalDecl::FunctionDef { function } = &parse.ast.items[0] else {
        panic!("expected a function definition, got {:?}", parse.ast.items);
    };
    assert_eq!(function.name, "main");
}

#[test]
fn test_missing_closing_paren_at_end_stops() {
    let parse = parse("int x = (1 + 2");
    let outcome = &parse.outcome;

    assert_eq!(outcome.status, ParseStatus::Stopped);
    let last = outcome.diagnostics.last().unwrap();
    assert!(last.action.is_unrecoverable());
    assert!(matches!(last.action, RecoveryAction::Stopped { .. }));
}

#[test]
fn test_stack_limit_is_a_diagnostic() {
    let config = ParserConfig::default().with_max_stack_depth(20);
    let analyzer = CAnalyzer::new(config).unwrap();
    let source = format!("int x = {}1{};", "(".repeat(40), ")".repeat(40));
    let parse = analyzer.parse_source(&source).unwrap();

    assert_eq!(parse.outcome.status, ParseStatus::Stopped);
    assert!(parse
        .outcome
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::StackLimit { .. })));
}

#[test]
fn test_diagnostics_serialize() {
    let parse = parse("int x");
    let json = serde_json::to_value(&parse.outcome.diagnostics).unwrap();
    assert_eq!(json[0]["location"]["line"], 1);
    assert_eq!(json[0]["kind"]["kind"], "no_production");
    assert_eq!(json[0]["action"]["action"], "popped_non_terminal");
}
