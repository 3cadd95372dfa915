use crate::lexer::Token;

use super::Expr;

/// Source position of a node's defining token, kept for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn of(token: &Token) -> Self {
        Self {
            line: token.line,
            column: token.column,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Declaration(Declaration),
    Assignment(Assignment),
    Print(PrintStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Pattern(PatternStmt),
}

/// `var identifier = expression;`
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// `identifier = expression;`
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// `print expression;`
#[derive(Clone, Debug, PartialEq)]
pub struct PrintStmt {
    pub value: Expr,
    pub span: Span,
}

/// `if (condition) { ... } [else { ... }]`
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Vec<Stmt>,
    pub else_block: Option<Vec<Stmt>>,
    pub span: Span,
}

/// `while (condition) { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub block: Vec<Stmt>,
    pub span: Span,
}

/// `for (init; condition; update) { ... }` — init and update are bare
/// assignments, never declarations.
#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub init: Assignment,
    pub condition: Expr,
    pub update: Assignment,
    pub block: Vec<Stmt>,
    pub span: Span,
}

/// `fibonacci(target, args...);` and friends.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternStmt {
    pub kind: PatternKind,
    pub target: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// The three built-in sequence-producing intrinsics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Fibonacci,
    Factorial,
    Sequence,
}

impl PatternKind {
    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Fibonacci => "fibonacci",
            PatternKind::Factorial => "factorial",
            PatternKind::Sequence => "sequence",
        }
    }
}
