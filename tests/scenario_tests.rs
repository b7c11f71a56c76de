// End-to-end parsing scenarios for the C subset and small toy grammars

use ll1c::analyzer::{Analyzer, CAnalyzer};
use ll1c::config::ParserConfig;
use ll1c::grammar::c_subset::CRule;
use ll1c::grammar::sets::GrammarSets;
use ll1c::grammar::table::PredictiveTable;
use ll1c::grammar::{Grammar, GrammarBuilder, ProdId};
use ll1c::parser::ast::*;
use ll1c::parser::engine::ParseStatus;
use ll1c::parser::token::TokenStream;
use ll1c::parser::tree::ParseNode;

fn c_analyzer() -> CAnalyzer {
    CAnalyzer::new(ParserConfig::default()).expect("C grammar should build")
}

fn rule_of(node: &ParseNode) -> Option<CRule> {
    node.production().and_then(CRule::from_production)
}

#[test]
fn test_declaration_tree_and_ast() {
    let parse = c_analyzer().parse_source("int x;").unwrap();
    assert!(parse.outcome.accepted);
    assert!(parse.outcome.diagnostics.is_empty());

    // Program -> ExtList -> ExtDef ExtList
    let root = &parse.outcome.tree;
    assert_eq!(rule_of(root), Some(CRule::Program));
    let ext_list = &root.children()[0];
    assert_eq!(rule_of(ext_list), Some(CRule::ExtListCons));
    let ext_def = &ext_list.children()[0];
    assert_eq!(rule_of(ext_def), Some(CRule::ExtDefTyped));
    assert_eq!(rule_of(&ext_list.children()[1]), Some(CRule::ExtListEnd));

    let leaves: Vec<&str> = root.leaves().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(leaves, vec!["int", "x", ";"]);

    assert_eq!(parse.ast.items.len(), 1);
    let ExternalDecl::Declaration { decl } = &parse.ast.items[0] else {
        panic!("expected a declaration, got {:?}", parse.ast.items[0]);
    };
    assert_eq!(decl.type_spec, TypeSpec::Basic { basic: BasicType::Int });
    assert_eq!(decl.declarators.len(), 1);
    assert_eq!(decl.declarators[0].name, "x");
}

#[test]
fn test_missing_semicolon_is_recovered() {
    let parse = c_analyzer().parse_source("int x").unwrap();
    let outcome = &parse.outcome;

    assert!(!outcome.accepted);
    assert_eq!(outcome.status, ParseStatus::Recovered);
    assert_eq!(outcome.diagnostics.len(), 1);

    let diagnostic = &outcome.diagnostics[0];
    assert!(diagnostic.expects(";"));
    // Reported at the token following `x`: end of input
    assert_eq!(diagnostic.found_kind, "EOF");
    assert_eq!(diagnostic.location.line, 1);
    assert_eq!(diagnostic.location.column, 6);
    assert!(!diagnostic.action.is_unrecoverable());

    assert!(outcome.tree.has_missing());
}

#[test]
fn test_function_with_return_expression() {
    let parse = c_analyzer()
        .parse_source("void f() { return 1 + 2; }")
        .unwrap();
    assert!(parse.outcome.accepted);

    let ExternalDecl::FunctionDef { function } = &parse.ast.items[0] else {
        panic!("expected a function definition");
    };
    assert_eq!(function.name, "f");
    assert_eq!(function.return_type, TypeSpec::Basic { basic: BasicType::Void });
    assert!(function.params.is_empty());
    assert_eq!(function.body.items.len(), 1);

    let Stmt::Return { value: Some(value), .. } = &function.body.items[0] else {
        panic!("expected a return statement");
    };
    let Expr::Binary { op, left, right, .. } = value else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(left.as_ref(), Expr::Literal { kind: LiteralKind::Int, text, .. } if text == "1"));
    assert!(matches!(right.as_ref(), Expr::Literal { kind: LiteralKind::Int, text, .. } if text == "2"));
}

/// S -> a S | ε
fn nullable_grammar() -> Grammar {
    let mut builder = GrammarBuilder::new("S");
    builder
        .terminals(&["a"])
        .production("S", &["a", "S"])
        .production("S", &[]);
    builder.build().unwrap()
}

#[test]
fn test_empty_input_on_nullable_start() {
    let analyzer = Analyzer::new(nullable_grammar(), ParserConfig::default()).unwrap();
    let outcome = analyzer.parse(&mut TokenStream::new(Vec::new()));

    assert!(outcome.accepted);
    assert!(outcome.diagnostics.is_empty());
    assert!(matches!(
        outcome.tree,
        ParseNode::Epsilon { production: ProdId(1), .. }
    ));
}

#[test]
fn test_ambiguous_grammar_reports_one_conflict() {
    // Both S productions start with `a`
    let mut builder = GrammarBuilder::new("S");
    builder
        .terminals(&["a", "b"])
        .production("S", &["a"])
        .production("S", &["a", "b"]);
    let grammar = builder.build().unwrap();
    let sets = GrammarSets::compute(&grammar).unwrap();
    let table = PredictiveTable::build(&grammar, &sets);

    assert_eq!(table.conflicts().len(), 1);
    let conflict = table.conflicts()[0];
    assert_eq!(conflict.existing, ProdId(0));
    assert_eq!(conflict.rejected, ProdId(1));
    assert_eq!(grammar.terminal_name(conflict.terminal), "a");

    // Parsing still works with the earliest production
    let analyzer = Analyzer::new(grammar, ParserConfig::default()).unwrap();
    let outcome = analyzer.parse(&mut TokenStream::from_kinds(&["a"]));
    assert!(outcome.accepted);
}

#[test]
fn test_set_computation_is_idempotent() {
    let analyzer = c_analyzer();
    let core = analyzer.analyzer();
    let again = GrammarSets::compute(core.grammar()).unwrap();

    assert_eq!(&again, core.sets());
    assert!(core.sets().is_fixed_point(core.grammar()));

    let table = PredictiveTable::build(core.grammar(), &again);
    assert_eq!(table.entries(), core.table().entries());
}

#[test]
fn test_leaves_reproduce_tokens() {
    let source = r#"
        #include <stdio.h>
        struct point { int x; int y; };
        int add(int a, int b) {
            return a + b;
        }
        int main() {
            int values[3] = {1, 2, 3};
            struct point p;
            for (int i = 0; i < 3; i++) {
                p.x = p.x + values[i];
            }
            printf("%d\n", add(p.x, -1));
            return 0;
        }
    "#;
    let parse = c_analyzer().parse_source(source).unwrap();
    assert!(
        parse.outcome.accepted,
        "diagnostics: {:?}",
        parse.outcome.diagnostics
    );

    let leaves: Vec<_> = parse.outcome.tree.leaves().into_iter().cloned().collect();
    assert_eq!(leaves, parse.tokens);
}

#[test]
fn test_ast_is_deterministic() {
    let source = "int g; int main() { if (g == 1) g = 2; else { while (g) g = g - 1; } return g; }";
    let analyzer = c_analyzer();
    let first = analyzer.parse_source(source).unwrap();
    let second = analyzer.parse_source(source).unwrap();

    assert!(first.outcome.accepted);
    assert_eq!(first.outcome.tree, second.outcome.tree);
    assert_eq!(first.ast, second.ast);
    assert_eq!(
        serde_json::to_string(&first.ast).unwrap(),
        serde_json::to_string(&second.ast).unwrap()
    );
}

#[test]
fn test_parses_share_one_analyzer_across_threads() {
    let analyzer = c_analyzer();
    let sources = ["int a;", "int b", "void f() { }", "char *s = \"hi\";"];

    let results: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let analyzer = &analyzer;
                scope.spawn(move || analyzer.parse_source(source).unwrap().outcome.accepted)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, vec![true, false, true, true]);
}

#[test]
fn test_demo_program_is_accepted() {
    let parse = c_analyzer()
        .parse_source(include_str!("../demos/sample.c"))
        .unwrap();
    assert!(
        parse.outcome.accepted,
        "diagnostics: {:?}",
        parse.outcome.diagnostics
    );

    let kinds: Vec<&str> = parse
        .ast
        .items
        .iter()
        .map(|item| match item {
            ExternalDecl::Include { .. } => "include",
            ExternalDecl::TypeDefinition { .. } => "type",
            ExternalDecl::Declaration { .. } => "decl",
            ExternalDecl::FunctionDef { .. } => "function",
            ExternalDecl::Error { .. } => "error",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["include", "type", "type", "decl", "function", "function"]
    );
}

fn nested_return(depth: usize) -> String {
    format!(
        "int f() {{ return {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    )
}

fn return_value(unit: &TranslationUnit) -> Option<Expr> {
    let ExternalDecl::FunctionDef { function } = &unit.items[0] else {
        return None;
    };
    match &function.body.items[0] {
        Stmt::Return { value, .. } => value.clone(),
        _ => None,
    }
}

#[test]
fn test_deeply_parenthesized_expression_on_small_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024)
        .spawn(|| {
            let analyzer = c_analyzer();
            let shallow = analyzer.parse_source(&nested_return(20)).unwrap();
            let deep = analyzer.parse_source(&nested_return(600)).unwrap();
            (
                shallow.outcome.status,
                return_value(&shallow.ast),
                deep.outcome.status,
                return_value(&deep.ast),
            )
        })
        .unwrap();
    let (shallow_status, shallow_value, deep_status, deep_value) = handle.join().unwrap();

    assert_eq!(shallow_status, ParseStatus::Accepted);
    assert!(matches!(shallow_value, Some(Expr::Literal { text, .. }) if text == "1"));

    // The engine accepts the input; only the AST gives up on the nesting
    assert_eq!(deep_status, ParseStatus::Accepted);
    assert!(matches!(deep_value, Some(Expr::Error { .. })));
}
