// AST (Abstract Syntax Tree) definitions for Harbour source units

use crate::parser::token::TokenKind;
use serde::Serialize;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Literal flavours recognised by the lexer (plus the `nil` keyword)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Nil,
}

/// Expression nodes.
///
/// Operators are stored as the [`TokenKind`] that produced them; the
/// renderer prints them back through [`TokenKind::spelling`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Name(String),
    Literal {
        kind: LiteralKind,
        raw: String, // exact source text, quotes and dots included
    },
    Assign {
        target: Box<Expression>,
        op: TokenKind, // `:=` or a compound assignment
        value: Box<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: TokenKind,
        right: Box<Expression>,
    },
    Prefix {
        op: TokenKind,
        operand: Box<Expression>,
    },
    Postfix {
        operand: Box<Expression>,
        op: TokenKind,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    Index {
        base: Box<Expression>,
        indices: Vec<Expression>,
    },
    FieldAccess {
        base: Box<Expression>,
        member: String,
    },
    /// `iif(condition, then, else)`
    Conditional {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
    ArrayLiteral(Vec<Expression>),
    /// `{ key => value, ... }` in source order
    HashLiteral(Vec<(Expression, Expression)>),
    /// `{ |params| body, ... }`
    Codeblock {
        params: Vec<String>,
        body: Vec<Expression>,
    },
}

impl Expression {
    /// Whether this expression may appear on the left of an assignment
    /// or as the operand of `++`/`--`.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Expression::Name(_) | Expression::Index { .. } | Expression::FieldAccess { .. }
        )
    }

    /// Assignments and increments/decrements, the expressions that stand
    /// alone as an assignment statement.
    pub fn is_assignment_like(&self) -> bool {
        match self {
            Expression::Assign { .. } => true,
            Expression::Prefix { op, .. } | Expression::Postfix { op, .. } => {
                matches!(op, TokenKind::PlusPlus | TokenKind::MinusMinus)
            }
            _ => false,
        }
    }
}

/// One `elseif` arm of an `if` statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIf {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

/// Statement nodes, including the comment and directive passthroughs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Vec<Statement>,
        retval: Expression,
        is_static: bool,
    },
    ProcedureDef {
        name: String,
        params: Vec<String>,
        body: Vec<Statement>,
        is_static: bool,
    },
    LocalDecl {
        name: String,
        init: Option<Expression>,
    },
    StaticDecl {
        name: String,
        init: Option<Expression>,
    },
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_ifs: Vec<ElseIf>,
        else_body: Vec<Statement>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    Return {
        value: Option<Expression>,
    },
    Call(Expression),
    Assignment(Expression),
    Comment(String),
    PreprocessorDirective(String),
}

/// Top-level structure of one compilation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceRoot {
    pub nodes: Vec<Statement>, // statements, comments and directives in source order
}

impl SourceRoot {
    pub fn new() -> Self {
        SourceRoot::default()
    }
}
