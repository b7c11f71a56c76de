//! Parse tree to AST reduction for the C-subset grammar.
//!
//! One walk over the tree, dispatching on the [`CRule`] that produced each
//! node. Chain productions disappear, right-recursive list and tail
//! productions are flattened into vectors, binary operator tails fold into
//! left-associative [`Expr::Binary`] nodes and assignment nests to the right.
//!
//! Recovery can leave [`ParseNode::Missing`] holes anywhere. They reduce to
//! `Error` placeholders (or to nothing, inside lists), so a partial tree
//! still yields a well-formed AST.
//!
//! Expressions, statements, initializers and type specifiers nest
//! recursively. Past the nesting limit a subtree reduces to its `Error`
//! placeholder instead of growing the call stack further.

use super::ast::*;
use super::token::Token;
use super::tree::ParseNode;
use crate::config::{DEFAULT_MAX_NESTING_DEPTH, MISSING_NAME};
use crate::grammar::c_subset::CRule;
use log::warn;

/// Reduces a C-subset parse tree to its AST with the default nesting limit.
pub fn reduce(tree: &ParseNode) -> TranslationUnit {
    reduce_with_limit(tree, DEFAULT_MAX_NESTING_DEPTH)
}

/// Reduces a C-subset parse tree, cutting nesting off at `max_depth` levels.
pub fn reduce_with_limit(tree: &ParseNode, max_depth: usize) -> TranslationUnit {
    let mut reducer = Reducer {
        depth: 0,
        max_depth,
        cut_off: 0,
    };
    let mut items = Vec::new();
    if let Some((CRule::Program, [ext_list])) = view(tree) {
        reducer.ext_list_items(ext_list, &mut items);
    }
    if reducer.cut_off > 0 {
        warn!(
            "{} subtrees nested deeper than {} levels were reduced to error nodes",
            reducer.cut_off, max_depth
        );
    }
    TranslationUnit { items }
}

/// The rule that produced `node` with its children. Epsilon nodes have no
/// children; leaves and missing nodes have no rule.
fn view(node: &ParseNode) -> Option<(CRule, &[ParseNode])> {
    let rule = CRule::from_production(node.production()?)?;
    Some((rule, node.children()))
}

fn token(node: &ParseNode) -> Option<&Token> {
    node.token()
}

fn text(node: &ParseNode) -> String {
    token(node)
        .map(|t| t.text.clone())
        .unwrap_or_else(|| MISSING_NAME.to_string())
}

/// Location of the first matched token under `node`.
fn location(node: &ParseNode) -> SourceLocation {
    node.first_token()
        .map(|t| t.location)
        .unwrap_or_default()
}

fn include(node: &ParseNode) -> ExternalDecl {
    let header = match view(node) {
        Some((CRule::Preprocess, [_, _, _, header, _])) => header_name(header),
        _ => MISSING_NAME.to_string(),
    };
    ExternalDecl::Include {
        header,
        location: location(node),
    }
}

fn header_name(node: &ParseNode) -> String {
    match view(node) {
        Some((CRule::Header, [id, rest])) => {
            let mut name = text(id);
            if let Some((CRule::HeaderRestExt, [_, ext])) = view(rest) {
                name.push('.');
                name.push_str(&text(ext));
            }
            name
        }
        _ => MISSING_NAME.to_string(),
    }
}

fn pointer_depth(node: &ParseNode) -> usize {
    let mut depth = 0;
    let mut current = node;
    while let Some((CRule::PtrOptStar, [_, rest])) = view(current) {
        depth += 1;
        current = rest;
    }
    depth
}

fn array_dims(node: &ParseNode) -> Vec<Option<u64>> {
    let mut dims = Vec::new();
    let mut current = node;
    while let Some((CRule::ArraySuffixCons, [_, size, _, rest])) = view(current) {
        dims.push(token(size).and_then(|t| parse_int_literal(&t.text)));
        current = rest;
    }
    dims
}

/// Value of a C integer literal (decimal, `0` octal, `0x` hex).
pub fn parse_int_literal(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        u64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

fn literal(kind: LiteralKind, node: &ParseNode) -> Expr {
    Expr::Literal {
        kind,
        text: text(node),
        location: location(node),
    }
}

/// The operator of one binary tail step.
fn binary_step(rule: CRule) -> Option<BinOp> {
    Some(match rule {
        CRule::OrTailCons => BinOp::Or,
        CRule::AndTailCons => BinOp::And,
        CRule::EqTailEq => BinOp::Eq,
        CRule::EqTailNe => BinOp::Ne,
        CRule::RelTailLt => BinOp::Lt,
        CRule::RelTailGt => BinOp::Gt,
        CRule::RelTailLe => BinOp::Le,
        CRule::RelTailGe => BinOp::Ge,
        CRule::AddTailAdd => BinOp::Add,
        CRule::AddTailSub => BinOp::Sub,
        CRule::MulTailMul => BinOp::Mul,
        CRule::MulTailDiv => BinOp::Div,
        CRule::MulTailMod => BinOp::Mod,
        _ => return None,
    })
}

struct Reducer {
    depth: usize,
    max_depth: usize,
    /// Subtrees replaced by an error node because of the limit.
    cut_off: usize,
}

impl Reducer {
    /// Runs `reduce` one nesting level deeper, or returns `None` at the limit.
    fn nested<T>(&mut self, reduce: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.depth >= self.max_depth {
            self.cut_off += 1;
            return None;
        }
        self.depth += 1;
        let value = reduce(self);
        self.depth -= 1;
        Some(value)
    }

    // -----------------------------------------------------------------------
    // Top level

    fn ext_list_items(&mut self, node: &ParseNode, items: &mut Vec<ExternalDecl>) {
        let mut current = node;
        while let Some((CRule::ExtListCons, [ext_def, rest])) = view(current) {
            items.push(self.ext_def_item(ext_def));
            current = rest;
        }
    }

    fn ext_def_item(&mut self, node: &ParseNode) -> ExternalDecl {
        match view(node) {
            Some((CRule::ExtDefPreprocess, [preprocess])) => include(preprocess),
            Some((CRule::ExtDefTyped, [type_node, after])) => {
                let type_spec = self.type_spec(type_node);
                self.ext_after_type_spec(type_spec, after, location(node))
            }
            _ => ExternalDecl::Error {
                location: location(node),
            },
        }
    }

    fn ext_after_type_spec(
        &mut self,
        type_spec: TypeSpec,
        node: &ParseNode,
        location: SourceLocation,
    ) -> ExternalDecl {
        match view(node) {
            Some((CRule::ExtAfterTypeSpecSemi, _)) => ExternalDecl::TypeDefinition {
                type_spec,
                location,
            },
            Some((CRule::ExtAfterTypeSpecDeclarator, [ptr, id, after_id])) => {
                let pointer_depth = pointer_depth(ptr);
                let name = text(id);
                let name_location = self::location(id);

                match view(after_id) {
                    Some((CRule::ExtAfterIdFunction, [_, params, _, body])) => {
                        ExternalDecl::FunctionDef {
                            function: FunctionDef {
                                return_type: type_spec,
                                pointer_depth,
                                name,
                                params: self.param_list(params),
                                body: self.compound(body),
                                location,
                            },
                        }
                    }
                    Some((CRule::ExtAfterIdVariable, [rest, _])) => {
                        let mut declarators = Vec::new();
                        let (array_dims, init, more) = match view(rest) {
                            Some((CRule::VarDeclRest, [dims, init, more])) => {
                                (array_dims(dims), self.init_opt(init), Some(more))
                            }
                            _ => (Vec::new(), None, None),
                        };
                        declarators.push(Declarator {
                            name,
                            pointer_depth,
                            array_dims,
                            init,
                            location: name_location,
                        });

                        let mut tail = more;
                        while let Some((CRule::VarDeclMoreCons, [_, decl, next])) =
                            tail.and_then(view)
                        {
                            declarators.push(self.init_decl(decl));
                            tail = Some(next);
                        }

                        ExternalDecl::Declaration {
                            decl: Declaration {
                                type_spec,
                                declarators,
                                location,
                            },
                        }
                    }
                    // Recovery abandoned everything after the name.
                    _ => ExternalDecl::Declaration {
                        decl: Declaration {
                            type_spec,
                            declarators: vec![Declarator {
                                name,
                                pointer_depth,
                                array_dims: Vec::new(),
                                init: None,
                                location: name_location,
                            }],
                            location,
                        },
                    },
                }
            }
            _ => ExternalDecl::TypeDefinition {
                type_spec,
                location,
            },
        }
    }

    // -----------------------------------------------------------------------
    // Types and declarations

    fn type_spec(&mut self, node: &ParseNode) -> TypeSpec {
        self.nested(|r| r.type_spec_at(node))
            .unwrap_or(TypeSpec::Error)
    }

    fn type_spec_at(&mut self, node: &ParseNode) -> TypeSpec {
        match view(node) {
            Some((CRule::TypeSpecBasic, [basic])) => match view(basic) {
                Some((rule, _)) => match rule {
                    CRule::BasicInt => TypeSpec::Basic {
                        basic: BasicType::Int,
                    },
                    CRule::BasicChar => TypeSpec::Basic {
                        basic: BasicType::Char,
                    },
                    CRule::BasicFloat => TypeSpec::Basic {
                        basic: BasicType::Float,
                    },
                    CRule::BasicDouble => TypeSpec::Basic {
                        basic: BasicType::Double,
                    },
                    CRule::BasicVoid => TypeSpec::Basic {
                        basic: BasicType::Void,
                    },
                    _ => TypeSpec::Error,
                },
                None => TypeSpec::Error,
            },
            Some((CRule::TypeSpecStruct, [spec])) => match view(spec) {
                Some((CRule::StructSpec, [_, tag, body])) => TypeSpec::Struct {
                    tag: text(tag),
                    fields: self.record_body(body),
                },
                _ => TypeSpec::Error,
            },
            Some((CRule::TypeSpecUnion, [spec])) => match view(spec) {
                Some((CRule::UnionSpec, [_, tag, body])) => TypeSpec::Union {
                    tag: text(tag),
                    fields: self.record_body(body),
                },
                _ => TypeSpec::Error,
            },
            Some((CRule::TypeSpecName, [name])) => TypeSpec::Named { name: text(name) },
            _ => TypeSpec::Error,
        }
    }

    /// Member list of a struct or union; `None` when the body is absent.
    fn record_body(&mut self, node: &ParseNode) -> Option<Vec<Declaration>> {
        match view(node) {
            Some((CRule::StructBodySome | CRule::UnionBodySome, [_, list, _])) => {
                let mut decls = Vec::new();
                if let Some((CRule::DeclListOptSome, [decl_list])) = view(list) {
                    let mut current = decl_list;
                    while let Some((CRule::DeclListCons, [decl, rest])) = view(current) {
                        decls.push(self.declaration(decl));
                        current = rest;
                    }
                }
                Some(decls)
            }
            _ => None,
        }
    }

    /// `Decl -> TypeSpec InitDeclList ;` or `DeclForInit -> TypeSpec InitDeclList`
    fn declaration(&mut self, node: &ParseNode) -> Declaration {
        let (type_spec, declarators) = match view(node) {
            Some((CRule::Decl, [ty, list, _])) | Some((CRule::DeclForInit, [ty, list])) => {
                (self.type_spec(ty), self.init_decl_list(list))
            }
            _ => (TypeSpec::Error, Vec::new()),
        };
        Declaration {
            type_spec,
            declarators,
            location: location(node),
        }
    }

    fn init_decl_list(&mut self, node: &ParseNode) -> Vec<Declarator> {
        let mut declarators = Vec::new();
        if let Some((CRule::InitDeclList, [first, tail])) = view(node) {
            declarators.push(self.init_decl(first));
            let mut current = tail;
            while let Some((CRule::InitDeclListTailCons, [_, decl, rest])) = view(current) {
                declarators.push(self.init_decl(decl));
                current = rest;
            }
        }
        declarators
    }

    fn init_decl(&mut self, node: &ParseNode) -> Declarator {
        match view(node) {
            Some((CRule::InitDecl, [ptr, id, dims, init])) => Declarator {
                name: text(id),
                pointer_depth: pointer_depth(ptr),
                array_dims: array_dims(dims),
                init: self.init_opt(init),
                location: location(id),
            },
            _ => Declarator {
                name: MISSING_NAME.to_string(),
                pointer_depth: 0,
                array_dims: Vec::new(),
                init: None,
                location: location(node),
            },
        }
    }

    fn init_opt(&mut self, node: &ParseNode) -> Option<Initializer> {
        match view(node) {
            Some((CRule::InitOptSome, [_, init])) => Some(self.initializer(init)),
            _ => None,
        }
    }

    fn initializer(&mut self, node: &ParseNode) -> Initializer {
        self.nested(|r| r.initializer_at(node))
            .unwrap_or_else(|| {
                Initializer::Expr(Expr::Error {
                    location: location(node),
                })
            })
    }

    fn initializer_at(&mut self, node: &ParseNode) -> Initializer {
        match view(node) {
            Some((CRule::InitializerList, [_, list_opt, _])) => {
                let mut items = Vec::new();
                if let Some((CRule::InitListOptSome, [list])) = view(list_opt) {
                    if let Some((CRule::InitList, [first, tail])) = view(list) {
                        items.push(self.initializer(first));
                        let mut current = tail;
                        while let Some((CRule::InitListTailCons, [_, item, rest])) =
                            view(current)
                        {
                            items.push(self.initializer(item));
                            current = rest;
                        }
                    }
                }
                Initializer::List(items)
            }
            Some((CRule::InitializerExpr, [e])) => Initializer::Expr(self.expr(e)),
            _ => Initializer::Expr(Expr::Error {
                location: location(node),
            }),
        }
    }

    fn param_list(&mut self, node: &ParseNode) -> Vec<Param> {
        let mut params = Vec::new();
        if let Some((CRule::ParamListOptSome, [list])) = view(node) {
            if let Some((CRule::ParamList, [first, tail])) = view(list) {
                params.push(self.param(first));
                let mut current = tail;
                while let Some((CRule::ParamListTailCons, [_, p, rest])) = view(current) {
                    params.push(self.param(p));
                    current = rest;
                }
            }
        }
        params
    }

    fn param(&mut self, node: &ParseNode) -> Param {
        match view(node) {
            Some((CRule::Param, [ty, ptr, id, dims])) => Param {
                type_spec: self.type_spec(ty),
                pointer_depth: pointer_depth(ptr),
                name: text(id),
                array_dims: array_dims(dims),
                location: location(node),
            },
            _ => Param {
                type_spec: TypeSpec::Error,
                pointer_depth: 0,
                name: MISSING_NAME.to_string(),
                array_dims: Vec::new(),
                location: location(node),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Statements

    fn compound(&mut self, node: &ParseNode) -> Block {
        let mut items = Vec::new();
        if let Some((CRule::CompoundStmt, [_, list_opt, _])) = view(node) {
            if let Some((CRule::StmtListOptSome, [list])) = view(list_opt) {
                let mut current = list;
                while let Some((CRule::StmtListCons, [s, rest])) = view(current) {
                    items.push(self.stmt(s));
                    current = rest;
                }
            }
        }
        Block {
            items,
            location: location(node),
        }
    }

    fn stmt(&mut self, node: &ParseNode) -> Stmt {
        self.nested(|r| r.stmt_at(node))
            .unwrap_or_else(|| Stmt::Error {
                location: location(node),
            })
    }

    fn stmt_at(&mut self, node: &ParseNode) -> Stmt {
        let loc = location(node);
        let Some((rule, [inner])) = view(node) else {
            return Stmt::Error { location: loc };
        };

        match rule {
            CRule::StmtExpr => match view(inner) {
                Some((CRule::ExprStmtExpr, [e, _])) => Stmt::Expr {
                    expr: self.expr(e),
                    location: loc,
                },
                Some((CRule::ExprStmtEmpty, _)) => Stmt::Empty { location: loc },
                _ => Stmt::Error { location: loc },
            },
            CRule::StmtCompound => Stmt::Block {
                block: self.compound(inner),
            },
            CRule::StmtIf => match view(inner) {
                Some((CRule::IfStmt, [_, _, cond, _, then, else_opt])) => Stmt::If {
                    condition: self.expr(cond),
                    then_branch: Box::new(self.stmt(then)),
                    else_branch: match view(else_opt) {
                        Some((CRule::ElseOptSome, [_, s])) => Some(Box::new(self.stmt(s))),
                        _ => None,
                    },
                    location: loc,
                },
                _ => Stmt::Error { location: loc },
            },
            CRule::StmtWhile => match view(inner) {
                Some((CRule::WhileStmt, [_, _, cond, _, body])) => Stmt::While {
                    condition: self.expr(cond),
                    body: Box::new(self.stmt(body)),
                    location: loc,
                },
                _ => Stmt::Error { location: loc },
            },
            CRule::StmtFor => match view(inner) {
                Some((CRule::ForStmt, [_, _, init, _, cond, _, step, _, body])) => Stmt::For {
                    init: self.for_init(init),
                    condition: self.expr_opt(cond),
                    increment: self.expr_opt(step),
                    body: Box::new(self.stmt(body)),
                    location: loc,
                },
                _ => Stmt::Error { location: loc },
            },
            CRule::StmtReturn => match view(inner) {
                Some((CRule::ReturnStmt, [_, value, _])) => Stmt::Return {
                    value: self.expr_opt(value),
                    location: loc,
                },
                _ => Stmt::Error { location: loc },
            },
            CRule::StmtBreak => Stmt::Break { location: loc },
            CRule::StmtContinue => Stmt::Continue { location: loc },
            CRule::StmtDecl => Stmt::Decl {
                decl: self.declaration(inner),
            },
            _ => Stmt::Error { location: loc },
        }
    }

    fn for_init(&mut self, node: &ParseNode) -> Option<ForInit> {
        match view(node) {
            Some((CRule::ForInitDecl, [decl])) => Some(ForInit::Decl(self.declaration(decl))),
            Some((CRule::ForInitExpr, [e])) => Some(ForInit::Expr(self.expr(e))),
            _ => None,
        }
    }

    fn expr_opt(&mut self, node: &ParseNode) -> Option<Expr> {
        match view(node) {
            Some((CRule::ExprOptSome, [e])) => Some(self.expr(e)),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Expressions

    fn expr(&mut self, node: &ParseNode) -> Expr {
        self.nested(|r| r.expr_at(node))
            .unwrap_or_else(|| Expr::Error {
                location: location(node),
            })
    }

    fn expr_at(&mut self, node: &ParseNode) -> Expr {
        let loc = location(node);
        let Some((rule, children)) = view(node) else {
            return Expr::Error { location: loc };
        };

        match (rule, children) {
            (CRule::Expr, [inner])
            | (CRule::UnaryPostfix, [inner])
            | (CRule::PrimaryConstant, [inner]) => self.expr(inner),
            (CRule::AssignExpr, [lhs, tail]) => {
                let target = self.expr(lhs);
                match view(tail) {
                    Some((CRule::AssignTailSome, [_, value])) => Expr::Assign {
                        location: target.location(),
                        target: Box::new(target),
                        value: Box::new(self.expr(value)),
                    },
                    _ => target,
                }
            }
            (
                CRule::OrExpr
                | CRule::AndExpr
                | CRule::EqExpr
                | CRule::RelExpr
                | CRule::AddExpr
                | CRule::MulExpr,
                [first, tail],
            ) => {
                let first = self.expr(first);
                self.fold_binary(first, tail)
            }
            (CRule::UnaryPlus, [_, operand]) => self.unary(UnOp::Plus, operand, loc),
            (CRule::UnaryMinus, [_, operand]) => self.unary(UnOp::Neg, operand, loc),
            (CRule::UnaryNot, [_, operand]) => self.unary(UnOp::Not, operand, loc),
            (CRule::PostfixExpr, [primary, tail]) => {
                let primary = self.expr(primary);
                self.fold_postfix(primary, tail)
            }
            (CRule::PrimaryId, [id]) | (CRule::PrimaryPrintf, [id]) => Expr::Ident {
                name: text(id),
                location: loc,
            },
            (CRule::PrimaryParen, [_, inner, _]) => self.expr(inner),
            (CRule::ConstantInt, [lit]) => literal(LiteralKind::Int, lit),
            (CRule::ConstantFloat, [lit]) => literal(LiteralKind::Float, lit),
            (CRule::ConstantChar, [lit]) => literal(LiteralKind::Char, lit),
            (CRule::ConstantString, [lit]) => literal(LiteralKind::String, lit),
            _ => Expr::Error { location: loc },
        }
    }

    fn unary(&mut self, op: UnOp, operand: &ParseNode, location: SourceLocation) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(self.expr(operand)),
            location,
        }
    }

    fn fold_binary(&mut self, first: Expr, tail: &ParseNode) -> Expr {
        let mut left = first;
        let mut current = tail;
        while let Some((rule, [_, right, rest])) = view(current) {
            let Some(op) = binary_step(rule) else {
                break;
            };
            left = Expr::Binary {
                op,
                location: left.location(),
                left: Box::new(left),
                right: Box::new(self.expr(right)),
            };
            current = rest;
        }
        left
    }

    fn fold_postfix(&mut self, primary: Expr, tail: &ParseNode) -> Expr {
        let mut base = primary;
        let mut current = tail;
        loop {
            let location = base.location();
            current = match view(current) {
                Some((CRule::PostfixCall, [_, args, _, rest])) => {
                    base = Expr::Call {
                        callee: Box::new(base),
                        args: self.arg_list(args),
                        location,
                    };
                    rest
                }
                Some((CRule::PostfixIndex, [_, index, _, rest])) => {
                    base = Expr::Index {
                        base: Box::new(base),
                        index: Box::new(self.expr(index)),
                        location,
                    };
                    rest
                }
                Some((CRule::PostfixMember, [_, field, rest])) => {
                    base = Expr::Member {
                        base: Box::new(base),
                        field: text(field),
                        location,
                    };
                    rest
                }
                Some((CRule::PostfixInc, [_, rest])) => {
                    base = Expr::Unary {
                        op: UnOp::PostInc,
                        operand: Box::new(base),
                        location,
                    };
                    rest
                }
                Some((CRule::PostfixDec, [_, rest])) => {
                    base = Expr::Unary {
                        op: UnOp::PostDec,
                        operand: Box::new(base),
                        location,
                    };
                    rest
                }
                _ => return base,
            };
        }
    }

    fn arg_list(&mut self, node: &ParseNode) -> Vec<Expr> {
        let mut args = Vec::new();
        if let Some((CRule::ArgListOptSome, [list])) = view(node) {
            if let Some((CRule::ArgList, [first, tail])) = view(list) {
                args.push(self.expr(first));
                let mut current = tail;
                while let Some((CRule::ArgListTailCons, [_, e, rest])) = view(current) {
                    args.push(self.expr(e));
                    current = rest;
                }
            }
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_literal() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("017"), Some(15));
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("99999999999999999999999"), None);
    }

    #[test]
    fn test_binary_step_matches_operator_token() {
        let mut mapped = 0;
        for rule in CRule::ALL {
            if let Some(op) = binary_step(*rule) {
                let body = rule.body();
                assert_eq!(body.len(), 3);
                assert_eq!(body[0], op.symbol());
                assert_eq!(body[2], rule.head());
                mapped += 1;
            }
        }
        assert_eq!(mapped, 13);
    }

    fn ast(source: &str) -> TranslationUnit {
        use crate::analyzer::CAnalyzer;
        use crate::config::ParserConfig;

        let analyzer = CAnalyzer::new(ParserConfig::default()).unwrap();
        analyzer.parse_source(source).unwrap().ast
    }

    fn first_function(unit: &TranslationUnit) -> &FunctionDef {
        unit.items
            .iter()
            .find_map(|item| match item {
                ExternalDecl::FunctionDef { function } => Some(function),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_include_and_declarations() {
        let unit = ast("#include <stdio.h>\nint a, *b[3] = {1, 2};\nstruct P { int x; };");
        assert_eq!(unit.items.len(), 3);
        assert!(matches!(&unit.items[0], ExternalDecl::Include { header, .. } if header == "stdio.h"));

        let ExternalDecl::Declaration { decl } = &unit.items[1] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.declarators.len(), 2);
        assert_eq!(decl.declarators[1].name, "b");
        assert_eq!(decl.declarators[1].pointer_depth, 1);
        assert_eq!(decl.declarators[1].array_dims, vec![Some(3)]);
        assert!(matches!(&decl.declarators[1].init, Some(Initializer::List(items)) if items.len() == 2));

        let ExternalDecl::TypeDefinition { type_spec, .. } = &unit.items[2] else {
            panic!("expected type definition");
        };
        assert!(matches!(type_spec, TypeSpec::Struct { tag, fields: Some(f) } if tag == "P" && f.len() == 1));
    }

    #[test]
    fn test_binary_operators_fold_left() {
        let unit = ast("int f() { return 1 - 2 - 3; }");
        let Stmt::Return { value: Some(value), .. } = &first_function(&unit).body.items[0] else {
            panic!("expected return");
        };
        let Expr::Binary { op: BinOp::Sub, left, right, .. } = value else {
            panic!("expected subtraction");
        };
        assert!(matches!(left.as_ref(), Expr::Binary { op: BinOp::Sub, .. }));
        assert!(matches!(right.as_ref(), Expr::Literal { text, .. } if text == "3"));
    }

    #[test]
    fn test_assignment_nests_right_and_postfix_chains() {
        let unit = ast("void f(int a, int b) { a = b = g(1, 2)[0].x++; }");
        let function = first_function(&unit);
        assert_eq!(function.params.len(), 2);

        let Stmt::Expr { expr, .. } = &function.body.items[0] else {
            panic!("expected expression statement");
        };
        let Expr::Assign { target, value, .. } = expr else {
            panic!("expected assignment");
        };
        assert!(matches!(target.as_ref(), Expr::Ident { name, .. } if name == "a"));
        let Expr::Assign { value: inner, .. } = value.as_ref() else {
            panic!("expected nested assignment");
        };
        let Expr::Unary { op: UnOp::PostInc, operand, .. } = inner.as_ref() else {
            panic!("expected post-increment");
        };
        let Expr::Member { base, field, .. } = operand.as_ref() else {
            panic!("expected member access");
        };
        assert_eq!(field, "x");
        let Expr::Index { base: call, .. } = base.as_ref() else {
            panic!("expected index");
        };
        assert!(matches!(call.as_ref(), Expr::Call { args, .. } if args.len() == 2));
    }

    #[test]
    fn test_statements() {
        let unit = ast(
            "int main() { int i; for (i = 0; i < 3; i++) { if (i) break; else continue; } while (1) ; }",
        );
        let items = &first_function(&unit).body.items;
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], Stmt::Decl { .. }));
        let Stmt::For { init, condition, increment, body, .. } = &items[1] else {
            panic!("expected for");
        };
        assert!(matches!(init, Some(ForInit::Expr(Expr::Assign { .. }))));
        assert!(condition.is_some() && increment.is_some());
        let Stmt::Block { block } = body.as_ref() else {
            panic!("expected block");
        };
        assert!(matches!(
            &block.items[0],
            Stmt::If { else_branch: Some(_), .. }
        ));
        assert!(matches!(&items[2], Stmt::While { .. }));
    }

    #[test]
    fn test_nesting_past_limit_reduces_to_error() {
        use crate::analyzer::CAnalyzer;
        use crate::config::ParserConfig;

        let analyzer = CAnalyzer::new(ParserConfig::default()).unwrap();
        let parse = analyzer.parse_source("int f() { return ((1)); }").unwrap();

        let unit = reduce_with_limit(&parse.outcome.tree, 64);
        let Stmt::Return { value, .. } = &first_function(&unit).body.items[0] else {
            panic!("expected return");
        };
        assert!(matches!(value, Some(Expr::Literal { text, .. }) if text == "1"));

        // stmt, then Expr, AssignExpr, OrExpr, AndExpr: EqExpr is cut off
        let unit = reduce_with_limit(&parse.outcome.tree, 5);
        let function = first_function(&unit);
        assert_eq!(function.return_type, TypeSpec::Basic { basic: BasicType::Int });
        let Stmt::Return { value, .. } = &function.body.items[0] else {
            panic!("expected return");
        };
        assert!(matches!(value, Some(Expr::Error { .. })));
    }

    #[test]
    fn test_recovered_declaration_keeps_name() {
        let unit = ast("int x");
        assert_eq!(unit.items.len(), 1);
        let ExternalDecl::Declaration { decl } = &unit.items[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.declarators[0].name, "x");
        assert_eq!(decl.type_spec, TypeSpec::Basic { basic: BasicType::Int });
    }
}
