//! The built-in C-subset grammar.
//!
//! Every production is a variant of [`CRule`] and its production number is
//! the variant's position in [`CRule::ALL`]. The AST reducer dispatches on
//! `CRule`, so the grammar and the reducer cannot drift apart silently.
//!
//! The language covered: `#include <name.h>`, `int char float double void`,
//! `struct`/`union` specifiers with optional bodies, tag names reused as
//! types, pointer and array declarators, initializer lists, function
//! definitions, compound/`if`/`else`/`while`/`for`/`return`/`break`/
//! `continue`/expression/declaration statements and a precedence ladder of
//! assignment, `||`, `&&`, equality, relational, additive, multiplicative,
//! unary and postfix operators.
//!
//! The grammar has exactly three LL(1) conflicts, all resolved in favor of the
//! earlier production: the dangling `else`, and `}` in the two nullable list
//! wrappers `DeclListOpt` and `StmtListOpt`.

use super::{Grammar, GrammarBuilder, ProdId};
use crate::errors::GrammarError;

/// Start symbol of the C-subset grammar.
pub const START: &str = "Program";

/// Terminal vocabulary. Token kinds outside this list are never matched.
pub const TERMINALS: &[&str] = &[
    "#", "include", "<", ">", ".", "ID", "TYPE_NAME", "INT_CONST", "FLOAT_CONST",
    "CHAR_CONST", "STRING_CONST", "int", "char", "float", "double", "void",
    "union", "struct", "if", "else", "while", "for", "return", "break",
    "continue", "printf", "(", ")", "[", "]", "{", "}", ";", ",", "=", "||",
    "&&", "==", "!=", "<=", ">=", "+", "-", "*", "/", "%", "!", "++", "--",
];

macro_rules! c_rules {
    ($($rule:ident: $head:literal => [$($sym:literal),*];)*) => {
        /// One variant per production of the C-subset grammar.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CRule {
            $($rule),*
        }

        impl CRule {
            /// All rules in production-number order.
            pub const ALL: &'static [CRule] = &[$(CRule::$rule),*];

            pub fn head(self) -> &'static str {
                match self {
                    $(CRule::$rule => $head),*
                }
            }

            pub fn body(self) -> &'static [&'static str] {
                match self {
                    $(CRule::$rule => &[$($sym),*]),*
                }
            }
        }
    };
}

c_rules! {
    Program: "Program" => ["ExtList"];

    ExtListCons: "ExtList" => ["ExtDef", "ExtList"];
    ExtListEnd: "ExtList" => [];
    ExtDefPreprocess: "ExtDef" => ["Preprocess"];
    ExtDefTyped: "ExtDef" => ["TypeSpec", "ExtAfterTypeSpec"];
    ExtAfterTypeSpecDeclarator: "ExtAfterTypeSpec" => ["PtrOpt", "ID", "ExtAfterId"];
    ExtAfterTypeSpecSemi: "ExtAfterTypeSpec" => [";"];
    ExtAfterIdFunction: "ExtAfterId" => ["(", "ParamListOpt", ")", "CompoundStmt"];
    ExtAfterIdVariable: "ExtAfterId" => ["VarDeclRest", ";"];
    VarDeclRest: "VarDeclRest" => ["ArraySuffixOpt", "InitOpt", "VarDeclMore"];
    VarDeclMoreCons: "VarDeclMore" => [",", "InitDecl", "VarDeclMore"];
    VarDeclMoreEnd: "VarDeclMore" => [];

    Preprocess: "Preprocess" => ["#", "include", "<", "Header", ">"];
    Header: "Header" => ["ID", "HeaderRest"];
    HeaderRestExt: "HeaderRest" => [".", "ID"];
    HeaderRestEnd: "HeaderRest" => [];

    TypeSpecBasic: "TypeSpec" => ["BasicType"];
    TypeSpecUnion: "TypeSpec" => ["UnionSpec"];
    TypeSpecStruct: "TypeSpec" => ["StructSpec"];
    TypeSpecName: "TypeSpec" => ["TYPE_NAME"];
    BasicInt: "BasicType" => ["int"];
    BasicChar: "BasicType" => ["char"];
    BasicFloat: "BasicType" => ["float"];
    BasicDouble: "BasicType" => ["double"];
    BasicVoid: "BasicType" => ["void"];
    UnionSpec: "UnionSpec" => ["union", "ID", "UnionBodyOpt"];
    UnionBodySome: "UnionBodyOpt" => ["{", "DeclListOpt", "}"];
    UnionBodyNone: "UnionBodyOpt" => [];
    StructSpec: "StructSpec" => ["struct", "ID", "StructBodyOpt"];
    StructBodySome: "StructBodyOpt" => ["{", "DeclListOpt", "}"];
    StructBodyNone: "StructBodyOpt" => [];
    DeclListOptSome: "DeclListOpt" => ["DeclList"];
    DeclListOptNone: "DeclListOpt" => [];
    DeclListCons: "DeclList" => ["Decl", "DeclList"];
    DeclListEnd: "DeclList" => [];

    Decl: "Decl" => ["TypeSpec", "InitDeclList", ";"];
    InitDeclList: "InitDeclList" => ["InitDecl", "InitDeclListTail"];
    InitDeclListTailCons: "InitDeclListTail" => [",", "InitDecl", "InitDeclListTail"];
    InitDeclListTailEnd: "InitDeclListTail" => [];
    PtrOptStar: "PtrOpt" => ["*", "PtrOpt"];
    PtrOptEnd: "PtrOpt" => [];
    InitDecl: "InitDecl" => ["PtrOpt", "ID", "ArraySuffixOpt", "InitOpt"];
    ArraySuffixCons: "ArraySuffixOpt" => ["[", "INT_CONST", "]", "ArraySuffixOpt"];
    ArraySuffixEnd: "ArraySuffixOpt" => [];
    InitOptSome: "InitOpt" => ["=", "Initializer"];
    InitOptNone: "InitOpt" => [];
    InitializerExpr: "Initializer" => ["Expr"];
    InitializerList: "Initializer" => ["{", "InitListOpt", "}"];
    InitListOptSome: "InitListOpt" => ["InitList"];
    InitListOptNone: "InitListOpt" => [];
    InitList: "InitList" => ["Initializer", "InitListTail"];
    InitListTailCons: "InitListTail" => [",", "Initializer", "InitListTail"];
    InitListTailEnd: "InitListTail" => [];

    ParamListOptSome: "ParamListOpt" => ["ParamList"];
    ParamListOptNone: "ParamListOpt" => [];
    ParamList: "ParamList" => ["Param", "ParamListTail"];
    ParamListTailCons: "ParamListTail" => [",", "Param", "ParamListTail"];
    ParamListTailEnd: "ParamListTail" => [];
    Param: "Param" => ["TypeSpec", "PtrOpt", "ID", "ArraySuffixOpt"];

    StmtExpr: "Stmt" => ["ExprStmt"];
    StmtCompound: "Stmt" => ["CompoundStmt"];
    StmtIf: "Stmt" => ["IfStmt"];
    StmtWhile: "Stmt" => ["WhileStmt"];
    StmtFor: "Stmt" => ["ForStmt"];
    StmtReturn: "Stmt" => ["ReturnStmt"];
    StmtBreak: "Stmt" => ["BreakStmt"];
    StmtContinue: "Stmt" => ["ContinueStmt"];
    StmtDecl: "Stmt" => ["Decl"];
    CompoundStmt: "CompoundStmt" => ["{", "StmtListOpt", "}"];
    StmtListOptSome: "StmtListOpt" => ["StmtList"];
    StmtListOptNone: "StmtListOpt" => [];
    StmtListCons: "StmtList" => ["Stmt", "StmtList"];
    StmtListEnd: "StmtList" => [];
    ExprStmtExpr: "ExprStmt" => ["Expr", ";"];
    ExprStmtEmpty: "ExprStmt" => [";"];
    IfStmt: "IfStmt" => ["if", "(", "Expr", ")", "Stmt", "ElseOpt"];
    ElseOptSome: "ElseOpt" => ["else", "Stmt"];
    ElseOptNone: "ElseOpt" => [];
    WhileStmt: "WhileStmt" => ["while", "(", "Expr", ")", "Stmt"];
    ForStmt: "ForStmt" => ["for", "(", "ForInitOpt", ";", "ExprOpt", ";", "ExprOpt", ")", "Stmt"];
    ForInitDecl: "ForInitOpt" => ["DeclForInit"];
    ForInitExpr: "ForInitOpt" => ["Expr"];
    ForInitNone: "ForInitOpt" => [];
    DeclForInit: "DeclForInit" => ["TypeSpec", "InitDeclList"];
    ExprOptSome: "ExprOpt" => ["Expr"];
    ExprOptNone: "ExprOpt" => [];
    ReturnStmt: "ReturnStmt" => ["return", "ExprOpt", ";"];
    BreakStmt: "BreakStmt" => ["break", ";"];
    ContinueStmt: "ContinueStmt" => ["continue", ";"];

    Expr: "Expr" => ["AssignExpr"];
    AssignExpr: "AssignExpr" => ["OrExpr", "AssignTail"];
    AssignTailSome: "AssignTail" => ["=", "AssignExpr"];
    AssignTailNone: "AssignTail" => [];
    OrExpr: "OrExpr" => ["AndExpr", "OrTail"];
    OrTailCons: "OrTail" => ["||", "AndExpr", "OrTail"];
    OrTailEnd: "OrTail" => [];
    AndExpr: "AndExpr" => ["EqExpr", "AndTail"];
    AndTailCons: "AndTail" => ["&&", "EqExpr", "AndTail"];
    AndTailEnd: "AndTail" => [];
    EqExpr: "EqExpr" => ["RelExpr", "EqTail"];
    EqTailEq: "EqTail" => ["==", "RelExpr", "EqTail"];
    EqTailNe: "EqTail" => ["!=", "RelExpr", "EqTail"];
    EqTailEnd: "EqTail" => [];
    RelExpr: "RelExpr" => ["AddExpr", "RelTail"];
    RelTailLt: "RelTail" => ["<", "AddExpr", "RelTail"];
    RelTailGt: "RelTail" => [">", "AddExpr", "RelTail"];
    RelTailLe: "RelTail" => ["<=", "AddExpr", "RelTail"];
    RelTailGe: "RelTail" => [">=", "AddExpr", "RelTail"];
    RelTailEnd: "RelTail" => [];
    AddExpr: "AddExpr" => ["MulExpr", "AddTail"];
    AddTailAdd: "AddTail" => ["+", "MulExpr", "AddTail"];
    AddTailSub: "AddTail" => ["-", "MulExpr", "AddTail"];
    AddTailEnd: "AddTail" => [];
    MulExpr: "MulExpr" => ["UnaryExpr", "MulTail"];
    MulTailMul: "MulTail" => ["*", "UnaryExpr", "MulTail"];
    MulTailDiv: "MulTail" => ["/", "UnaryExpr", "MulTail"];
    MulTailMod: "MulTail" => ["%", "UnaryExpr", "MulTail"];
    MulTailEnd: "MulTail" => [];
    UnaryPlus: "UnaryExpr" => ["+", "UnaryExpr"];
    UnaryMinus: "UnaryExpr" => ["-", "UnaryExpr"];
    UnaryNot: "UnaryExpr" => ["!", "UnaryExpr"];
    UnaryPostfix: "UnaryExpr" => ["PostfixExpr"];
    PostfixExpr: "PostfixExpr" => ["Primary", "PostfixTail"];
    PostfixCall: "PostfixTail" => ["(", "ArgListOpt", ")", "PostfixTail"];
    PostfixIndex: "PostfixTail" => ["[", "Expr", "]", "PostfixTail"];
    PostfixMember: "PostfixTail" => [".", "ID", "PostfixTail"];
    PostfixInc: "PostfixTail" => ["++", "PostfixTail"];
    PostfixDec: "PostfixTail" => ["--", "PostfixTail"];
    PostfixEnd: "PostfixTail" => [];
    PrimaryId: "Primary" => ["ID"];
    PrimaryPrintf: "Primary" => ["printf"];
    PrimaryConstant: "Primary" => ["Constant"];
    PrimaryParen: "Primary" => ["(", "Expr", ")"];
    ConstantInt: "Constant" => ["INT_CONST"];
    ConstantFloat: "Constant" => ["FLOAT_CONST"];
    ConstantChar: "Constant" => ["CHAR_CONST"];
    ConstantString: "Constant" => ["STRING_CONST"];
    ArgListOptSome: "ArgListOpt" => ["ArgList"];
    ArgListOptNone: "ArgListOpt" => [];
    ArgList: "ArgList" => ["Expr", "ArgListTail"];
    ArgListTailCons: "ArgListTail" => [",", "Expr", "ArgListTail"];
    ArgListTailEnd: "ArgListTail" => [];
}

impl CRule {
    /// The rule that produced `production`, if it belongs to the C grammar.
    pub fn from_production(production: ProdId) -> Option<CRule> {
        CRule::ALL.get(production.0).copied()
    }

    pub fn production(self) -> ProdId {
        ProdId(self as usize)
    }
}

/// Builds the C-subset grammar.
pub fn c_grammar() -> Result<Grammar, GrammarError> {
    let mut builder = GrammarBuilder::new(START);
    builder.terminals(TERMINALS);
    for rule in CRule::ALL {
        builder.production(rule.head(), rule.body());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::sets::GrammarSets;
    use crate::grammar::table::PredictiveTable;

    #[test]
    fn test_rule_numbering_matches_productions() {
        let grammar = c_grammar().unwrap();
        assert_eq!(grammar.productions().len(), CRule::ALL.len());
        for rule in CRule::ALL {
            let production = grammar.production(rule.production());
            assert_eq!(grammar.nonterminal_name(production.head), rule.head());
            assert_eq!(production.body.len(), rule.body().len());
            assert_eq!(CRule::from_production(rule.production()), Some(*rule));
        }
        assert_eq!(grammar.nonterminal_name(grammar.start()), START);
    }

    #[test]
    fn test_only_expected_conflicts() {
        let grammar = c_grammar().unwrap();
        let sets = GrammarSets::compute(&grammar).unwrap();
        let table = PredictiveTable::build(&grammar, &sets);

        let mut cells: Vec<(String, String)> = table
            .conflicts()
            .iter()
            .map(|c| {
                (
                    grammar.nonterminal_name(c.nonterminal).to_string(),
                    grammar.terminal_name(c.terminal).to_string(),
                )
            })
            .collect();
        cells.sort();

        assert_eq!(
            cells,
            vec![
                ("DeclListOpt".to_string(), "}".to_string()),
                ("ElseOpt".to_string(), "else".to_string()),
                ("StmtListOpt".to_string(), "}".to_string()),
            ]
        );

        let else_opt = grammar.nonterminal("ElseOpt").unwrap();
        let else_kw = grammar.terminal("else").unwrap();
        assert_eq!(
            table.get(else_opt, else_kw),
            Some(CRule::ElseOptSome.production())
        );
    }

    #[test]
    fn test_sets_converge() {
        let grammar = c_grammar().unwrap();
        let sets = GrammarSets::compute(&grammar).unwrap();
        assert!(sets.is_fixed_point(&grammar));
    }
}
