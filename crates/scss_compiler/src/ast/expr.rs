//! Expression nodes, as produced by the parser and consumed by the
//! evaluator. After evaluation no expression survives; everything reduces to
//! a [`Value`](super::Value).

use crate::diagnostic::SourceSpan;

use super::value::{ListSeparator, QuoteMark, Value};

/// Binary operators that can appear in declaration values and predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

/// One piece of an interpolated template: literal text or `#{expr}`.
#[derive(Debug, Clone, Copy)]
pub enum InterpPart<'a> {
    Literal(&'a str),
    Expr(&'a Expr<'a>),
}

/// Call arguments: positional then named, plus optional spread.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallArgs<'a> {
    pub positional: &'a [Expr<'a>],
    pub named: &'a [(&'a str, Expr<'a>)],
}

/// An expression with its source position.
#[derive(Debug, Clone, Copy)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub span: SourceSpan,
}

impl<'a> Expr<'a> {
    pub fn new(kind: ExprKind<'a>, span: SourceSpan) -> Self {
        Self { kind, span }
    }

    pub fn literal(value: Value<'a>, span: SourceSpan) -> Self {
        Self::new(ExprKind::Literal(value), span)
    }
}

/// The closed set of expression shapes.
#[derive(Debug, Clone, Copy)]
pub enum ExprKind<'a> {
    /// An already-constant value.
    Literal(Value<'a>),
    /// `$name`
    Variable(&'a str),
    /// A template with `#{...}` holes. With `quote` this is a quoted string
    /// schema; without it the result is an unquoted string.
    Interpolation {
        parts: &'a [InterpPart<'a>],
        quote: QuoteMark,
    },
    /// A literal list expression.
    List {
        items: &'a [Expr<'a>],
        separator: ListSeparator,
    },
    /// A literal map expression.
    Map {
        entries: &'a [(Expr<'a>, Expr<'a>)],
    },
    UnaryOp {
        op: UnaryOp,
        operand: &'a Expr<'a>,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    },
    /// `name(args...)`: a user-defined function if one is in scope, otherwise
    /// rendered literally as plain CSS.
    FunctionCall {
        name: &'a str,
        args: CallArgs<'a>,
    },
}
