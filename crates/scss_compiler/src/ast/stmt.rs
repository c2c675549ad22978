//! Statement nodes: the input tree the parser hands to the evaluator.

use crate::diagnostic::SourceSpan;
use crate::selector::SelectorList;

use super::expr::{CallArgs, Expr, InterpPart};

/// An ordered sequence of statements.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub stmts: &'a [Stmt<'a>],
}

impl<'a> Block<'a> {
    pub fn new(stmts: &'a [Stmt<'a>]) -> Self {
        Self { stmts }
    }

    pub const EMPTY: Block<'static> = Block { stmts: &[] };
}

/// A selector as delivered by the parser: either fully parsed, or a schema
/// whose interpolations must be evaluated and re-parsed.
#[derive(Debug, Clone, Copy)]
pub enum SelectorRef<'a> {
    List(SelectorList<'a>),
    Schema(&'a [InterpPart<'a>]),
}

/// One formal parameter of a mixin or function.
#[derive(Debug, Clone, Copy)]
pub struct Param<'a> {
    pub name: &'a str,
    pub default: Option<Expr<'a>>,
    /// `$args...` rest parameter; must be last.
    pub variadic: bool,
}

/// A mixin or function definition.
#[derive(Debug, Clone, Copy)]
pub struct Callable<'a> {
    pub name: &'a str,
    pub params: &'a [Param<'a>],
    pub body: Block<'a>,
    pub span: SourceSpan,
}

/// A statement with its source position.
#[derive(Debug, Clone, Copy)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub span: SourceSpan,
}

impl<'a> Stmt<'a> {
    pub fn new(kind: StmtKind<'a>, span: SourceSpan) -> Self {
        Self { kind, span }
    }
}

/// The closed set of statement shapes.
#[derive(Debug, Clone, Copy)]
pub enum StmtKind<'a> {
    /// `selector { ... }`
    Ruleset {
        selector: SelectorRef<'a>,
        body: Block<'a>,
    },
    /// `prop: value;`, optionally with a nested property block
    /// (`margin: 0 { left: 1px; }`).
    Declaration {
        name: &'a [InterpPart<'a>],
        value: Option<Expr<'a>>,
        body: Option<Block<'a>>,
    },
    /// `@media query { ... }` — bubbles past enclosing rulesets.
    Media { query: Expr<'a>, body: Block<'a> },
    /// `@supports condition { ... }` — bubbles past enclosing rulesets.
    Supports { condition: Expr<'a>, body: Block<'a> },
    /// `@keyframes name { ... }` (or a vendor-prefixed keyword). Bubbles;
    /// frame selectors inside are opaque to the selector pipeline.
    Keyframes {
        keyword: &'a str,
        name: Expr<'a>,
        body: Block<'a>,
    },
    /// `@at-root { ... }`: emits its block at the top level.
    AtRoot { body: Block<'a> },
    /// Any other at-rule, with optional value and block.
    AtRule {
        keyword: &'a str,
        value: Option<Expr<'a>>,
        body: Option<Block<'a>>,
    },
    /// `$name: value;`
    Assign {
        name: &'a str,
        value: Expr<'a>,
        global: bool,
        default: bool,
    },
    /// `@import "path"`. `css` marks imports that stay as plain CSS
    /// `@import` statements (urls, `.css`, media-qualified).
    Import { path: &'a str, css: bool },
    /// `@extend selector` recorded against the enclosing rule.
    Extend {
        selector: SelectorRef<'a>,
        optional: bool,
    },
    MixinDef(Callable<'a>),
    FunctionDef(Callable<'a>),
    /// `@include name(args) { optional content }`
    Include {
        name: &'a str,
        args: CallArgs<'a>,
        body: Option<Block<'a>>,
    },
    /// `@if` with its `@else if` chain and final `@else`.
    If {
        clauses: &'a [(Expr<'a>, Block<'a>)],
        else_body: Option<Block<'a>>,
    },
    /// `@for $var from a to/through b { ... }`
    For {
        var: &'a str,
        from: Expr<'a>,
        to: Expr<'a>,
        inclusive: bool,
        body: Block<'a>,
    },
    /// `@each $a, $b in list { ... }`
    Each {
        vars: &'a [&'a str],
        list: Expr<'a>,
        body: Block<'a>,
    },
    /// `@while condition { ... }`
    While { condition: Expr<'a>, body: Block<'a> },
    /// `@return` inside a function body.
    Return(Expr<'a>),
    /// `@content` inside a mixin body.
    Content,
    Warn(Expr<'a>),
    Error(Expr<'a>),
    Debug(Expr<'a>),
    /// `/* ... */`; loud comments (`/*! ... */`) survive compression.
    Comment { text: &'a str, loud: bool },
}
