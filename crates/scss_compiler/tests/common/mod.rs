//! Shared builders for integration tests: the external parser's job, done
//! by hand.

#![allow(dead_code, reason = "each test binary uses a subset of the builders")]

use scss_compiler::arena::{Arena, alloc, alloc_slice, alloc_str};
use scss_compiler::ast::expr::{CallArgs, Expr, ExprKind, InterpPart};
use scss_compiler::ast::stmt::{Block, Callable, Param, SelectorRef, Stmt, StmtKind};
use scss_compiler::ast::value::{Number, Str, Value};
use scss_compiler::diagnostic::SourceSpan;
use scss_compiler::selector::parse::parse_selector;
use scss_compiler::{CompileOptions, CompileOutput, OutputStyle, compile};

pub fn span(line: u32) -> SourceSpan {
    SourceSpan::new(0, line, 0)
}

pub fn block<'a>(arena: &'a Arena, stmts: &[Stmt<'a>]) -> Block<'a> {
    Block::new(alloc_slice(arena, stmts))
}

pub fn rule<'a>(arena: &'a Arena, selector: &str, body: &[Stmt<'a>]) -> Stmt<'a> {
    let list = parse_selector(arena, selector).expect("test selector parses");
    Stmt::new(
        StmtKind::Ruleset {
            selector: SelectorRef::List(list),
            body: block(arena, body),
        },
        span(1),
    )
}

pub fn rule_schema<'a>(arena: &'a Arena, parts: &[InterpPart<'a>], body: &[Stmt<'a>]) -> Stmt<'a> {
    Stmt::new(
        StmtKind::Ruleset {
            selector: SelectorRef::Schema(alloc_slice(arena, parts)),
            body: block(arena, body),
        },
        span(1),
    )
}

pub fn unquoted<'a>(arena: &'a Arena, text: &str) -> Value<'a> {
    Value::String(Str::unquoted(alloc_str(arena, text)))
}

pub fn decl<'a>(arena: &'a Arena, name: &str, value: &str) -> Stmt<'a> {
    decl_expr(
        arena,
        name,
        Expr::literal(unquoted(arena, value), span(1)),
    )
}

pub fn decl_expr<'a>(arena: &'a Arena, name: &str, value: Expr<'a>) -> Stmt<'a> {
    Stmt::new(
        StmtKind::Declaration {
            name: alloc_slice(arena, &[InterpPart::Literal(alloc_str(arena, name))]),
            value: Some(value),
            body: None,
        },
        span(1),
    )
}

pub fn number<'a>(arena: &'a Arena, value: f64, unit: Option<&str>) -> Expr<'a> {
    let number = match unit {
        Some(unit) => Number::with_unit(arena, value, unit),
        None => Number::unitless(value),
    };
    Expr::literal(Value::Number(number), span(1))
}

pub fn variable<'a>(arena: &'a Arena, name: &str) -> Expr<'a> {
    Expr::new(ExprKind::Variable(alloc_str(arena, name)), span(1))
}

pub fn extend_stmt<'a>(arena: &'a Arena, selector: &str, optional: bool) -> Stmt<'a> {
    let list = parse_selector(arena, selector).expect("test selector parses");
    Stmt::new(
        StmtKind::Extend {
            selector: SelectorRef::List(list),
            optional,
        },
        span(1),
    )
}

pub fn assign<'a>(arena: &'a Arena, name: &str, value: Expr<'a>) -> Stmt<'a> {
    Stmt::new(
        StmtKind::Assign {
            name: alloc_str(arena, name),
            value,
            global: false,
            default: false,
        },
        span(1),
    )
}

pub fn mixin_def<'a>(
    arena: &'a Arena,
    name: &str,
    params: &[Param<'a>],
    body: &[Stmt<'a>],
) -> Stmt<'a> {
    Stmt::new(
        StmtKind::MixinDef(Callable {
            name: alloc_str(arena, name),
            params: alloc_slice(arena, params),
            body: block(arena, body),
            span: span(1),
        }),
        span(1),
    )
}

pub fn function_def<'a>(
    arena: &'a Arena,
    name: &str,
    params: &[Param<'a>],
    body: &[Stmt<'a>],
) -> Stmt<'a> {
    Stmt::new(
        StmtKind::FunctionDef(Callable {
            name: alloc_str(arena, name),
            params: alloc_slice(arena, params),
            body: block(arena, body),
            span: span(1),
        }),
        span(1),
    )
}

pub fn param<'a>(arena: &'a Arena, name: &str, default: Option<Expr<'a>>) -> Param<'a> {
    Param {
        name: alloc_str(arena, name),
        default,
        variadic: false,
    }
}

pub fn include<'a>(arena: &'a Arena, name: &str, positional: &[Expr<'a>]) -> Stmt<'a> {
    Stmt::new(
        StmtKind::Include {
            name: alloc_str(arena, name),
            args: CallArgs {
                positional: alloc_slice(arena, positional),
                named: &[],
            },
            body: None,
        },
        span(1),
    )
}

pub fn interp_expr<'a>(arena: &'a Arena, expr: Expr<'a>) -> InterpPart<'a> {
    InterpPart::Expr(alloc(arena, expr))
}

/// Compile with expanded output, panicking on error.
pub fn compile_expanded<'a>(arena: &'a Arena, stmts: &[Stmt<'a>]) -> String {
    compile_with(arena, stmts, OutputStyle::Expanded).css
}

pub fn compile_with<'a>(
    arena: &'a Arena,
    stmts: &[Stmt<'a>],
    style: OutputStyle,
) -> CompileOutput {
    let options = CompileOptions::default().with_output_style(style);
    let sources = [scss_compiler::SourceFile::new("input.scss")];
    compile(arena, stmts, &options, &sources, None).expect("compilation succeeds")
}
