// AST (Abstract Syntax Tree) definitions for the C subset

pub use super::token::SourceLocation;
use serde::Serialize;

/// Built-in type keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicType {
    Int,
    Char,
    Float,
    Double,
    Void,
}

/// Type specifier of a declaration, parameter or function
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeSpec {
    Basic { basic: BasicType },
    /// `struct tag` with an optional member list
    Struct {
        tag: String,
        fields: Option<Vec<Declaration>>,
    },
    Union {
        tag: String,
        fields: Option<Vec<Declaration>>,
    },
    /// A tag used bare as a type name
    Named { name: String },
    Error,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnOp {
    Plus,    // +x
    Neg,     // -x
    Not,     // !x
    PostInc, // x++
    PostDec, // x--
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    Int,
    Float,
    Char,
    String,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    Ident {
        name: String,
        location: SourceLocation,
    },
    /// A constant; `text` is the lexeme as written
    Literal {
        kind: LiteralKind,
        text: String,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    /// `target = value`, right-associative
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Member {
        base: Box<Expr>,
        field: String,
        location: SourceLocation,
    },
    /// Placeholder where recovery left the expression underived
    Error { location: SourceLocation },
}

impl Expr {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Ident { location, .. }
            | Expr::Literal { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Assign { location, .. }
            | Expr::Call { location, .. }
            | Expr::Index { location, .. }
            | Expr::Member { location, .. }
            | Expr::Error { location } => *location,
        }
    }
}

/// Initializer of a declarator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "init", content = "value", rename_all = "snake_case")]
pub enum Initializer {
    Expr(Expr),
    List(Vec<Initializer>),
}

/// One declared name: `**name[3][4] = init`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    pub name: String,
    pub pointer_depth: usize,
    /// Array dimensions in source order; `None` if the size did not parse
    pub array_dims: Vec<Option<u64>>,
    pub init: Option<Initializer>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub type_spec: TypeSpec,
    pub declarators: Vec<Declarator>,
    pub location: SourceLocation,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub type_spec: TypeSpec,
    pub pointer_depth: usize,
    pub name: String,
    pub array_dims: Vec<Option<u64>>,
    pub location: SourceLocation,
}

/// `{ ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub items: Vec<Stmt>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "for_init", content = "value", rename_all = "snake_case")]
pub enum ForInit {
    Decl(Declaration),
    Expr(Expr),
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    Expr {
        expr: Expr,
        location: SourceLocation,
    },
    /// A lone `;`
    Empty { location: SourceLocation },
    Block { block: Block },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    For {
        init: Option<ForInit>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
    Break { location: SourceLocation },
    Continue { location: SourceLocation },
    Decl { decl: Declaration },
    /// Placeholder where recovery left the statement underived
    Error { location: SourceLocation },
}

impl Stmt {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::Expr { location, .. }
            | Stmt::Empty { location }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Error { location } => *location,
            Stmt::Block { block } => block.location,
            Stmt::Decl { decl } => decl.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDef {
    pub return_type: TypeSpec,
    /// Pointer depth of the return type
    pub pointer_depth: usize,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub location: SourceLocation,
}

/// Top-level items
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ExternalDecl {
    /// `#include <header>`
    Include {
        header: String,
        location: SourceLocation,
    },
    FunctionDef { function: FunctionDef },
    Declaration { decl: Declaration },
    /// `struct S { ... };` with no declarator
    TypeDefinition {
        type_spec: TypeSpec,
        location: SourceLocation,
    },
    Error { location: SourceLocation },
}

impl ExternalDecl {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            ExternalDecl::Include { location, .. }
            | ExternalDecl::TypeDefinition { location, .. }
            | ExternalDecl::Error { location } => *location,
            ExternalDecl::FunctionDef { function } => function.location,
            ExternalDecl::Declaration { decl } => decl.location,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslationUnit {
    pub items: Vec<ExternalDecl>,
}

impl TranslationUnit {
    pub fn new() -> Self {
        TranslationUnit::default()
    }
}
