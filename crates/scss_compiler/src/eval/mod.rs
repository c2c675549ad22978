//! The evaluator.
//!
//! Walks the statement tree depth-first, left to right, and produces the
//! flat CSS output tree: every variable, include, call, interpolation and
//! control-flow node resolved; nested rulesets flattened through
//! `parentize`; `@media`/`@supports`/`@keyframes` bubbled past their
//! enclosing rulesets; extend requests accumulated for the extender.
//!
//! Evaluation is single-threaded and deterministic. Every recursion point
//! shares one depth guard so runaway nesting becomes a reportable error
//! instead of a stack overflow.

mod call;
pub mod ops;

use log::debug;

use crate::arena::{Arena, alloc_slice, alloc_str};
use crate::ast::css::CssStmt;
use crate::ast::expr::{BinaryOp, CallArgs, Expr, ExprKind, InterpPart};
use crate::ast::stmt::{Block, SelectorRef, Stmt, StmtKind};
use crate::ast::value::{List, Map, QuoteMark, Str, Value};
use crate::diagnostic::{
    CompileError, Diagnostic, ErrorKind, FrameKind, Severity, SourceSpan, TraceFrame,
};
use crate::env::Environment;
use crate::loader::Importer;
use crate::options::CompileOptions;
use crate::printer::format;
use crate::selector::parentize::parentize;
use crate::selector::parse::parse_selector;
use crate::selector::{Complex, ComplexPart, Compound, Namespace, SelectorList, SimpleSelector};

/// Maximum depth for every tree walk and for `@while` iteration.
pub const RECURSION_LIMIT: usize = 1024;

/// One recorded `@extend`: the extender selector should also match wherever
/// the extendee compound matches.
#[derive(Debug, Clone)]
pub struct ExtendRequest<'a> {
    pub extender: Complex<'a>,
    pub extendee: Compound<'a>,
    /// The media query context the request was recorded in, if any.
    pub media_key: Option<String>,
    pub optional: bool,
    pub span: SourceSpan,
}

/// Everything the evaluator produces.
#[derive(Debug)]
pub struct EvalOutput<'a> {
    pub stmts: Vec<CssStmt<'a>>,
    pub extends: Vec<ExtendRequest<'a>>,
    pub warnings: Vec<Diagnostic>,
}

/// Evaluate a parsed stylesheet into the CSS output tree.
pub fn evaluate<'a>(
    arena: &'a Arena,
    root: &[Stmt<'a>],
    options: &CompileOptions,
    importer: Option<&mut dyn Importer<'a>>,
) -> Result<EvalOutput<'a>, CompileError> {
    let mut evaluator = Evaluator {
        arena,
        precision: options.precision,
        env: Environment::new(),
        warnings: Vec::new(),
        extends: Vec::new(),
        trace: Vec::new(),
        depth: 0,
        current_selector: None,
        media_context: Vec::new(),
        in_keyframes: false,
        content_stack: Vec::new(),
        property_prefix: Vec::new(),
        importer,
    };

    let mut decls = Vec::new();
    let mut after = Vec::new();
    evaluator.visit_stmts(root, &mut decls, &mut after)?;
    decls.extend(after);

    Ok(EvalOutput {
        stmts: decls,
        extends: evaluator.extends,
        warnings: evaluator.warnings,
    })
}

pub(crate) struct Evaluator<'a, 'e> {
    pub(crate) arena: &'a Arena,
    pub(crate) precision: usize,
    pub(crate) env: Environment<'a>,
    pub(crate) warnings: Vec<Diagnostic>,
    extends: Vec<ExtendRequest<'a>>,
    pub(crate) trace: Vec<TraceFrame>,
    depth: usize,
    current_selector: Option<SelectorList<'a>>,
    media_context: Vec<String>,
    in_keyframes: bool,
    pub(crate) content_stack: Vec<Option<Block<'a>>>,
    property_prefix: Vec<String>,
    importer: Option<&'e mut dyn Importer<'a>>,
}

impl<'a> Evaluator<'a, '_> {
    pub(crate) fn error(
        &self,
        kind: ErrorKind,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> CompileError {
        CompileError::new(kind, message, span).with_trace(self.trace.clone())
    }

    pub(crate) fn enter(&mut self, span: SourceSpan) -> Result<(), CompileError> {
        self.depth += 1;
        if self.depth > RECURSION_LIMIT {
            return Err(self.error(
                ErrorKind::RecursionLimit,
                format!("nesting exceeds {RECURSION_LIMIT} levels"),
                span,
            ));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    pub(crate) fn visit_stmts(
        &mut self,
        stmts: &[Stmt<'a>],
        decls: &mut Vec<CssStmt<'a>>,
        after: &mut Vec<CssStmt<'a>>,
    ) -> Result<(), CompileError> {
        for stmt in stmts {
            self.visit_stmt(stmt, decls, after)?;
        }
        Ok(())
    }

    fn visit_stmt(
        &mut self,
        stmt: &Stmt<'a>,
        decls: &mut Vec<CssStmt<'a>>,
        after: &mut Vec<CssStmt<'a>>,
    ) -> Result<(), CompileError> {
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Ruleset { selector, body } => {
                let out = if self.current_selector.is_some() {
                    after
                } else {
                    decls
                };
                self.visit_ruleset(selector, *body, span, out)
            }
            StmtKind::Declaration { name, value, body } => {
                self.visit_declaration(name, value.as_ref(), body.as_ref(), span, decls)
            }
            StmtKind::Media { query, body } => {
                let text = self.eval_to_css_text(query)?;
                let combined = match self.media_context.last() {
                    Some(outer) => format!("{outer} and {text}"),
                    None => text,
                };
                self.media_context.push(combined.clone());
                let result = self.visit_hoisted_block(*body, span);
                self.media_context.pop();
                let inner = result?;
                let node = CssStmt::Media {
                    query: alloc_str(self.arena, &combined),
                    body: alloc_slice(self.arena, &inner),
                    span,
                };
                self.push_hoistable(node, decls, after);
                Ok(())
            }
            StmtKind::Supports { condition, body } => {
                let text = self.eval_to_css_text(condition)?;
                let inner = self.visit_hoisted_block(*body, span)?;
                let node = CssStmt::Supports {
                    condition: alloc_str(self.arena, &text),
                    body: alloc_slice(self.arena, &inner),
                    span,
                };
                self.push_hoistable(node, decls, after);
                Ok(())
            }
            StmtKind::Keyframes {
                keyword,
                name,
                body,
            } => {
                let name_text = self.eval_to_css_text(name)?;
                let old_selector = self.current_selector.take();
                let old_keyframes = std::mem::replace(&mut self.in_keyframes, true);
                let mut inner_decls = Vec::new();
                let mut inner_after = Vec::new();
                let result = self.visit_stmts(body.stmts, &mut inner_decls, &mut inner_after);
                self.current_selector = old_selector;
                self.in_keyframes = old_keyframes;
                result?;
                inner_decls.extend(inner_after);
                let node = CssStmt::AtRule {
                    keyword: *keyword,
                    value: Some(alloc_str(self.arena, &name_text)),
                    body: Some(alloc_slice(self.arena, &inner_decls)),
                    span,
                };
                self.push_hoistable(node, decls, after);
                Ok(())
            }
            StmtKind::AtRoot { body } => {
                let old_selector = self.current_selector.take();
                let mut inner_decls = Vec::new();
                let mut inner_after = Vec::new();
                let result = self.visit_stmts(body.stmts, &mut inner_decls, &mut inner_after);
                self.current_selector = old_selector;
                result?;
                inner_decls.extend(inner_after);
                if self.current_selector.is_some() {
                    after.extend(inner_decls);
                } else {
                    decls.extend(inner_decls);
                }
                Ok(())
            }
            StmtKind::AtRule {
                keyword,
                value,
                body,
            } => {
                let value_text = match value {
                    Some(expr) => {
                        let text = self.eval_to_css_text(expr)?;
                        Some(alloc_str(self.arena, &text) as &str)
                    }
                    None => None,
                };
                let body_slice = match body {
                    Some(block) => {
                        let inner = self.visit_hoisted_block(*block, span)?;
                        Some(alloc_slice(self.arena, &inner))
                    }
                    None => None,
                };
                let node = CssStmt::AtRule {
                    keyword: *keyword,
                    value: value_text,
                    body: body_slice,
                    span,
                };
                self.push_hoistable(node, decls, after);
                Ok(())
            }
            StmtKind::Assign {
                name,
                value,
                global,
                default,
            } => {
                let value = self.eval_expr(value)?;
                self.env.set_var(name, value, *global, *default);
                Ok(())
            }
            StmtKind::Import { path, css } => {
                if *css {
                    decls.push(CssStmt::Import { text: *path, span });
                    return Ok(());
                }
                let imported = self
                    .importer
                    .as_deref_mut()
                    .map(|importer| importer.import(path, span));
                let Some(imported) = imported else {
                    return Err(self.error(
                        ErrorKind::ImportNotFound,
                        format!("no importer available for \"{path}\""),
                        span,
                    ));
                };
                let block = match imported {
                    Ok(Some(block)) => block,
                    Ok(None) => {
                        return Err(self.error(
                            ErrorKind::ImportNotFound,
                            format!("file to import not found or unreadable: \"{path}\""),
                            span,
                        ));
                    }
                    Err(err) => return Err(self.error(err.kind, err.message, span)),
                };
                self.trace.push(TraceFrame {
                    kind: FrameKind::Import,
                    name: (*path).to_string(),
                    span,
                });
                self.enter(span)?;
                let result = self.visit_stmts(block.stmts, decls, after);
                self.leave();
                self.trace.pop();
                if let Some(importer) = self.importer.as_deref_mut() {
                    importer.leave(path);
                }
                result
            }
            StmtKind::Extend { selector, optional } => {
                self.visit_extend(selector, *optional, span)
            }
            StmtKind::MixinDef(mixin) => {
                self.env.set_mixin(mixin.name, *mixin);
                Ok(())
            }
            StmtKind::FunctionDef(function) => {
                self.env.set_function(function.name, *function);
                Ok(())
            }
            StmtKind::Include { name, args, body } => {
                self.visit_include(name, args, *body, span, decls, after)
            }
            StmtKind::If { clauses, else_body } => {
                for (condition, block) in *clauses {
                    if self.eval_expr(condition)?.is_truthy() {
                        self.env.push_scope();
                        let result = self.visit_stmts(block.stmts, decls, after);
                        self.env.pop_scope();
                        return result;
                    }
                }
                if let Some(block) = else_body {
                    self.env.push_scope();
                    let result = self.visit_stmts(block.stmts, decls, after);
                    self.env.pop_scope();
                    return result;
                }
                Ok(())
            }
            StmtKind::For {
                var,
                from,
                to,
                inclusive,
                body,
            } => {
                let from_value = self.eval_number(from)?;
                let to_value = self.eval_number(to)?;
                let start = from_value.value.round() as i64;
                let end = to_value.value.round() as i64;
                let mut current = start;
                loop {
                    let done = if *inclusive {
                        if start <= end { current > end } else { current < end }
                    } else {
                        current == end
                    };
                    if done {
                        break;
                    }
                    self.env.push_scope();
                    let value = Value::Number(crate::ast::value::Number {
                        value: current as f64,
                        numer: from_value.numer,
                        denom: from_value.denom,
                    });
                    self.env.set_var(var, value, false, false);
                    let result = self.visit_stmts(body.stmts, decls, after);
                    self.env.pop_scope();
                    result?;
                    current += if start <= end { 1 } else { -1 };
                }
                Ok(())
            }
            StmtKind::Each { vars, list, body } => {
                let value = self.eval_expr(list)?;
                for item in value.iter_list(self.arena) {
                    self.env.push_scope();
                    if vars.len() == 1 {
                        self.env.set_var(vars[0], item, false, false);
                    } else {
                        // Destructure sublists, padding with null.
                        let parts: Vec<Value<'a>> = match item {
                            Value::List(list) => list.items.to_vec(),
                            other => vec![other],
                        };
                        for (i, var) in vars.iter().enumerate() {
                            let bound = parts.get(i).copied().unwrap_or(Value::Null);
                            self.env.set_var(var, bound, false, false);
                        }
                    }
                    let result = self.visit_stmts(body.stmts, decls, after);
                    self.env.pop_scope();
                    result?;
                }
                Ok(())
            }
            StmtKind::While { condition, body } => {
                let mut iterations = 0usize;
                while self.eval_expr(condition)?.is_truthy() {
                    iterations += 1;
                    if iterations > RECURSION_LIMIT {
                        return Err(self.error(
                            ErrorKind::RecursionLimit,
                            format!("@while exceeded {RECURSION_LIMIT} iterations"),
                            span,
                        ));
                    }
                    self.env.push_scope();
                    let result = self.visit_stmts(body.stmts, decls, after);
                    self.env.pop_scope();
                    result?;
                }
                Ok(())
            }
            StmtKind::Return(_) => Err(self.error(
                ErrorKind::TypeMismatch,
                "@return may only be used within a function",
                span,
            )),
            StmtKind::Content => {
                let content = self.content_stack.pop();
                let result = match content.flatten() {
                    Some(block) => {
                        self.env.push_scope();
                        let r = self.visit_stmts(block.stmts, decls, after);
                        self.env.pop_scope();
                        r
                    }
                    None => Ok(()),
                };
                if let Some(entry) = content {
                    self.content_stack.push(entry);
                }
                result
            }
            StmtKind::Warn(expr) => {
                let value = self.eval_expr(expr)?;
                let text = self.value_text(&value, span)?;
                debug!("@warn: {text}");
                self.warnings.push(Diagnostic {
                    severity: Severity::Warning,
                    text,
                    span,
                    trace: self.trace.clone(),
                });
                Ok(())
            }
            StmtKind::Error(expr) => {
                let value = self.eval_expr(expr)?;
                let text = self.value_text(&value, span)?;
                Err(self.error(ErrorKind::UserAbort, text, span))
            }
            StmtKind::Debug(expr) => {
                let value = self.eval_expr(expr)?;
                let text = self.value_text(&value, span)?;
                debug!("@debug: {text}");
                self.warnings.push(Diagnostic {
                    severity: Severity::Debug,
                    text,
                    span,
                    trace: self.trace.clone(),
                });
                Ok(())
            }
            StmtKind::Comment { text, loud } => {
                decls.push(CssStmt::Comment {
                    text: *text,
                    loud: *loud,
                    span,
                });
                Ok(())
            }
        }
    }

    /// Nested blocks float to the enclosing rule's after-sink; at the top
    /// level they stay in place.
    fn push_hoistable(
        &self,
        node: CssStmt<'a>,
        decls: &mut Vec<CssStmt<'a>>,
        after: &mut Vec<CssStmt<'a>>,
    ) {
        if self.current_selector.is_some() {
            after.push(node);
        } else {
            decls.push(node);
        }
    }

    /// Evaluate a bubbling block (`@media`, `@supports`): when inside a
    /// rule, the rule's selector is re-established inside the block.
    fn visit_hoisted_block(
        &mut self,
        body: Block<'a>,
        span: SourceSpan,
    ) -> Result<Vec<CssStmt<'a>>, CompileError> {
        let mut inner_decls = Vec::new();
        let mut inner_after = Vec::new();
        self.visit_stmts(body.stmts, &mut inner_decls, &mut inner_after)?;
        if let Some(selector) = self.current_selector {
            if inner_decls.is_empty() {
                return Ok(inner_after);
            }
            let mut inner = vec![CssStmt::Rule {
                selector,
                body: alloc_slice(self.arena, &inner_decls),
                span,
            }];
            inner.extend(inner_after);
            Ok(inner)
        } else {
            inner_decls.extend(inner_after);
            Ok(inner_decls)
        }
    }

    fn visit_ruleset(
        &mut self,
        selector: &SelectorRef<'a>,
        body: Block<'a>,
        span: SourceSpan,
        out: &mut Vec<CssStmt<'a>>,
    ) -> Result<(), CompileError> {
        self.enter(span)?;
        let resolved = if self.in_keyframes {
            self.keyframe_selector(selector, span)?
        } else {
            let parsed = self.resolve_selector(selector, span)?;
            parentize(self.arena, &parsed, self.current_selector.as_ref(), true).map_err(
                |err| self.error(ErrorKind::InvalidNesting, err.message, span),
            )?
        };

        let old_selector = self.current_selector.replace(resolved);
        self.env.push_scope();
        let mut decls = Vec::new();
        let mut after = Vec::new();
        let result = self.visit_stmts(body.stmts, &mut decls, &mut after);
        self.env.pop_scope();
        self.current_selector = old_selector;
        self.leave();
        result?;

        out.push(CssStmt::Rule {
            selector: resolved,
            body: alloc_slice(self.arena, &decls),
            span,
        });
        out.extend(after);
        Ok(())
    }

    fn visit_declaration(
        &mut self,
        name: &[InterpPart<'a>],
        value: Option<&Expr<'a>>,
        body: Option<&Block<'a>>,
        span: SourceSpan,
        decls: &mut Vec<CssStmt<'a>>,
    ) -> Result<(), CompileError> {
        let own_name = self.eval_interp_parts(name)?;
        let full_name = match self.property_prefix.last() {
            Some(prefix) => format!("{prefix}-{own_name}"),
            None => own_name,
        };
        if let Some(expr) = value {
            let value = self.eval_expr(expr)?;
            if !value.is_invisible() {
                decls.push(CssStmt::Decl {
                    property: alloc_str(self.arena, &full_name),
                    value,
                    span,
                });
            }
        }
        if let Some(block) = body {
            self.property_prefix.push(full_name);
            let mut after = Vec::new();
            let result = self.visit_stmts(block.stmts, decls, &mut after);
            self.property_prefix.pop();
            result?;
            decls.extend(after);
        }
        Ok(())
    }

    fn visit_extend(
        &mut self,
        selector: &SelectorRef<'a>,
        optional: bool,
        span: SourceSpan,
    ) -> Result<(), CompileError> {
        let Some(current) = self.current_selector else {
            return Err(self.error(
                ErrorKind::InvalidNesting,
                "@extend may only be used within rules",
                span,
            ));
        };
        let target = self.resolve_selector(selector, span)?;
        for extendee in target.members {
            let compound = match extendee.parts {
                [ComplexPart::Compound(compound)] => *compound,
                _ => {
                    return Err(self.error(
                        ErrorKind::InvalidNesting,
                        format!("complex selectors may not be extended: \"{extendee}\""),
                        span,
                    ));
                }
            };
            for extender in current.members {
                self.extends.push(ExtendRequest {
                    extender: *extender,
                    extendee: compound,
                    media_key: self.media_context.last().cloned(),
                    optional,
                    span,
                });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Selectors
    // -----------------------------------------------------------------

    fn resolve_selector(
        &mut self,
        selector: &SelectorRef<'a>,
        span: SourceSpan,
    ) -> Result<SelectorList<'a>, CompileError> {
        match selector {
            SelectorRef::List(list) => Ok(*list),
            SelectorRef::Schema(parts) => {
                let text = self.eval_interp_parts(parts)?;
                parse_selector(self.arena, &text)
                    .map_err(|err| self.error(ErrorKind::Parse, err.to_string(), span))
            }
        }
    }

    /// Keyframe frame selectors (`from`, `50%`) are opaque text as far as the
    /// selector pipeline is concerned; each comma-separated frame becomes a
    /// bare name so the printer can emit it unchanged.
    fn keyframe_selector(
        &mut self,
        selector: &SelectorRef<'a>,
        _span: SourceSpan,
    ) -> Result<SelectorList<'a>, CompileError> {
        let text = match selector {
            SelectorRef::List(list) => list.to_string(),
            SelectorRef::Schema(parts) => self.eval_interp_parts(parts)?,
        };
        let mut members = Vec::new();
        for frame in text.split(',') {
            let name = alloc_str(self.arena, frame.trim());
            let simples = alloc_slice(
                self.arena,
                &[SimpleSelector::Type {
                    ns: Namespace::None,
                    name,
                }],
            );
            let parts = alloc_slice(
                self.arena,
                &[ComplexPart::Compound(Compound::new(simples))],
            );
            members.push(Complex::new(parts));
        }
        Ok(SelectorList::new(alloc_slice(self.arena, &members)))
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    pub(crate) fn eval_expr(&mut self, expr: &Expr<'a>) -> Result<Value<'a>, CompileError> {
        self.enter(expr.span)?;
        let result = self.eval_expr_inner(expr);
        self.leave();
        result
    }

    fn eval_expr_inner(&mut self, expr: &Expr<'a>) -> Result<Value<'a>, CompileError> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Literal(value) => Ok(*value),
            ExprKind::Variable(name) => self.env.get_var(name).ok_or_else(|| {
                self.error(
                    ErrorKind::UndefinedReference,
                    format!("undefined variable: ${name}"),
                    span,
                )
            }),
            ExprKind::Interpolation { parts, quote } => {
                let text = self.eval_interp_parts(parts)?;
                Ok(Value::String(Str {
                    text: alloc_str(self.arena, &text),
                    quote: *quote,
                }))
            }
            ExprKind::List { items, separator } => {
                let mut values = Vec::with_capacity(items.len());
                for item in *items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::List(List {
                    items: alloc_slice(self.arena, &values),
                    separator: *separator,
                    is_arglist: false,
                }))
            }
            ExprKind::Map { entries } => {
                let mut values = Vec::with_capacity(entries.len());
                for (key, value) in *entries {
                    values.push((self.eval_expr(key)?, self.eval_expr(value)?));
                }
                Ok(Value::Map(Map {
                    entries: alloc_slice(self.arena, &values),
                }))
            }
            ExprKind::UnaryOp { op, operand } => {
                let value = self.eval_expr(operand)?;
                ops::unary_op(self.arena, *op, value, self.precision)
                    .map_err(|msg| self.error(ErrorKind::TypeMismatch, msg, span))
            }
            ExprKind::BinaryOp { op, lhs, rhs } => match op {
                BinaryOp::And => {
                    let left = self.eval_expr(lhs)?;
                    if left.is_truthy() {
                        self.eval_expr(rhs)
                    } else {
                        Ok(left)
                    }
                }
                BinaryOp::Or => {
                    let left = self.eval_expr(lhs)?;
                    if left.is_truthy() { Ok(left) } else { self.eval_expr(rhs) }
                }
                _ => {
                    let left = self.eval_expr(lhs)?;
                    let right = self.eval_expr(rhs)?;
                    ops::binary_op(self.arena, *op, left, right, self.precision)
                        .map_err(|msg| self.error(ErrorKind::TypeMismatch, msg, span))
                }
            },
            ExprKind::FunctionCall { name, args } => self.eval_call(name, args, span),
        }
    }

    fn eval_call(
        &mut self,
        name: &str,
        args: &CallArgs<'a>,
        span: SourceSpan,
    ) -> Result<Value<'a>, CompileError> {
        // `if()` is a special form: only the taken branch evaluates.
        if name == "if" && args.positional.len() == 3 && args.named.is_empty() {
            let condition = self.eval_expr(&args.positional[0])?;
            let branch = if condition.is_truthy() { 1 } else { 2 };
            return self.eval_expr(&args.positional[branch]);
        }

        if let Some(function) = self.env.get_function(name) {
            return self.call_function(&function, args, span);
        }

        // Unknown functions render literally as plain CSS.
        let mut rendered = String::new();
        rendered.push_str(name);
        rendered.push('(');
        let mut first = true;
        for arg in args.positional {
            if !first {
                rendered.push_str(", ");
            }
            first = false;
            let value = self.eval_expr(arg)?;
            let mut text = String::new();
            format::write_value(&mut text, &value, crate::options::OutputStyle::Nested, self.precision)
                .map_err(|msg| self.error(ErrorKind::InvalidCss, msg, span))?;
            rendered.push_str(&text);
        }
        for (arg_name, arg) in args.named {
            if !first {
                rendered.push_str(", ");
            }
            first = false;
            let value = self.eval_expr(arg)?;
            let mut text = String::new();
            format::write_value(&mut text, &value, crate::options::OutputStyle::Nested, self.precision)
                .map_err(|msg| self.error(ErrorKind::InvalidCss, msg, span))?;
            rendered.push_str(&format!("${arg_name}: {text}"));
        }
        rendered.push(')');
        Ok(Value::String(Str {
            text: alloc_str(self.arena, &rendered),
            quote: QuoteMark::None,
        }))
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    pub(crate) fn eval_interp_parts(
        &mut self,
        parts: &[InterpPart<'a>],
    ) -> Result<String, CompileError> {
        let mut text = String::new();
        for part in parts {
            match part {
                InterpPart::Literal(literal) => text.push_str(literal),
                InterpPart::Expr(expr) => {
                    let value = self.eval_expr(expr)?;
                    let rendered = format::interpolate_value(&value, self.precision)
                        .map_err(|msg| self.error(ErrorKind::InvalidCss, msg, expr.span))?;
                    text.push_str(&rendered);
                }
            }
        }
        Ok(text)
    }

    fn eval_to_css_text(&mut self, expr: &Expr<'a>) -> Result<String, CompileError> {
        let value = self.eval_expr(expr)?;
        self.value_text(&value, expr.span)
    }

    pub(crate) fn value_text(
        &self,
        value: &Value<'a>,
        span: SourceSpan,
    ) -> Result<String, CompileError> {
        format::interpolate_value(value, self.precision)
            .map_err(|msg| self.error(ErrorKind::InvalidCss, msg, span))
    }

    fn eval_number(
        &mut self,
        expr: &Expr<'a>,
    ) -> Result<crate::ast::value::Number<'a>, CompileError> {
        match self.eval_expr(expr)? {
            Value::Number(number) => Ok(number),
            other => Err(self.error(
                ErrorKind::TypeMismatch,
                format!("expected a number, got {}", other.type_name()),
                expr.span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::value::Number;

    fn span() -> SourceSpan {
        SourceSpan::default()
    }

    fn lit<'a>(value: Value<'a>) -> Expr<'a> {
        Expr::literal(value, span())
    }

    #[test]
    fn for_loop_bounds() {
        let arena = Arena::default();
        let options = CompileOptions::default();

        let body_decl = Stmt::new(
            StmtKind::Declaration {
                name: alloc_slice(&arena, &[InterpPart::Literal("w")]),
                value: Some(Expr::new(ExprKind::Variable("i"), span())),
                body: None,
            },
            span(),
        );
        let body = Block::new(alloc_slice(&arena, &[body_decl]));

        let for_stmt = Stmt::new(
            StmtKind::For {
                var: "i",
                from: lit(Value::Number(Number::unitless(1.0))),
                to: lit(Value::Number(Number::unitless(3.0))),
                inclusive: true,
                body,
            },
            span(),
        );

        let output = evaluate(&arena, &[for_stmt], &options, None).unwrap();
        assert_eq!(output.stmts.len(), 3);

        let exclusive = Stmt::new(
            StmtKind::For {
                var: "i",
                from: lit(Value::Number(Number::unitless(1.0))),
                to: lit(Value::Number(Number::unitless(3.0))),
                inclusive: false,
                body,
            },
            span(),
        );
        let output = evaluate(&arena, &[exclusive], &options, None).unwrap();
        assert_eq!(output.stmts.len(), 2);

        let descending = Stmt::new(
            StmtKind::For {
                var: "i",
                from: lit(Value::Number(Number::unitless(3.0))),
                to: lit(Value::Number(Number::unitless(1.0))),
                inclusive: true,
                body,
            },
            span(),
        );
        let output = evaluate(&arena, &[descending], &options, None).unwrap();
        assert_eq!(output.stmts.len(), 3);
    }

    #[test]
    fn undefined_variable_is_fatal() {
        let arena = Arena::default();
        let options = CompileOptions::default();
        let stmt = Stmt::new(
            StmtKind::Declaration {
                name: alloc_slice(&arena, &[InterpPart::Literal("w")]),
                value: Some(Expr::new(ExprKind::Variable("missing"), span())),
                body: None,
            },
            span(),
        );
        let err = evaluate(&arena, &[stmt], &options, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedReference);
    }

    #[test]
    fn while_iteration_limit() {
        let arena = Arena::default();
        let options = CompileOptions::default();
        let stmt = Stmt::new(
            StmtKind::While {
                condition: lit(Value::Bool(true)),
                body: Block::EMPTY,
            },
            span(),
        );
        let err = evaluate(&arena, &[stmt], &options, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RecursionLimit);
    }
}
