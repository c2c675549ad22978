//! Mixin includes and function calls: argument binding and body execution.

use crate::arena::alloc_slice;
use crate::ast::css::CssStmt;
use crate::ast::expr::CallArgs;
use crate::ast::stmt::{Block, Callable, StmtKind};
use crate::ast::value::{List, ListSeparator, Value};
use crate::diagnostic::{CompileError, ErrorKind, FrameKind, SourceSpan, TraceFrame};

use super::Evaluator;

impl<'a> Evaluator<'a, '_> {
    /// `@include name(args) { content }`.
    pub(crate) fn visit_include(
        &mut self,
        name: &str,
        args: &CallArgs<'a>,
        content: Option<Block<'a>>,
        span: SourceSpan,
        decls: &mut Vec<CssStmt<'a>>,
        after: &mut Vec<CssStmt<'a>>,
    ) -> Result<(), CompileError> {
        let Some(mixin) = self.env.get_mixin(name) else {
            return Err(self.error(
                ErrorKind::UndefinedReference,
                format!("undefined mixin: {name}"),
                span,
            ));
        };

        self.enter(span)?;
        self.trace.push(TraceFrame {
            kind: FrameKind::Mixin,
            name: name.to_string(),
            span,
        });
        let bound = self.bind_args(&mixin, args, span);
        let result = match bound {
            Ok(()) => {
                self.content_stack.push(content);
                let result = self.visit_stmts(mixin.body.stmts, decls, after);
                self.content_stack.pop();
                self.env.pop_scope();
                result
            }
            Err(err) => Err(err),
        };
        self.trace.pop();
        self.leave();
        result
    }

    /// Call a user-defined function and return its `@return` value.
    pub(crate) fn call_function(
        &mut self,
        function: &Callable<'a>,
        args: &CallArgs<'a>,
        span: SourceSpan,
    ) -> Result<Value<'a>, CompileError> {
        self.enter(span)?;
        self.trace.push(TraceFrame {
            kind: FrameKind::Function,
            name: function.name.to_string(),
            span,
        });
        let bound = self.bind_args(function, args, span);
        let result = match bound {
            Ok(()) => {
                let returned = self.exec_function_body(function.body.stmts);
                self.env.pop_scope();
                match returned {
                    Ok(Some(value)) => Ok(value),
                    Ok(None) => Err(self.error(
                        ErrorKind::TypeMismatch,
                        format!("function {} finished without @return", function.name),
                        span,
                    )),
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        };
        self.trace.pop();
        self.leave();
        result
    }

    /// Evaluate call arguments in the caller's scope, then open the callee
    /// scope and bind parameters: positional, then named, then defaults,
    /// with a trailing variadic parameter collecting the rest.
    ///
    /// On success the callee scope is left open for the caller to pop.
    fn bind_args(
        &mut self,
        callable: &Callable<'a>,
        args: &CallArgs<'a>,
        span: SourceSpan,
    ) -> Result<(), CompileError> {
        let mut positional: Vec<Value<'a>> = Vec::with_capacity(args.positional.len());
        for arg in args.positional {
            positional.push(self.eval_expr(arg)?);
        }
        let mut named: Vec<(String, Value<'a>)> = Vec::with_capacity(args.named.len());
        for (name, arg) in args.named {
            named.push((crate::env::normalize_name(name), self.eval_expr(arg)?));
        }

        let params = callable.params;
        let variadic = params.last().is_some_and(|p| p.variadic);
        let fixed = if variadic { params.len() - 1 } else { params.len() };

        if !variadic && positional.len() > fixed {
            return Err(self.error(
                ErrorKind::TypeMismatch,
                format!(
                    "{} takes {} argument{} but {} {} passed",
                    callable.name,
                    fixed,
                    if fixed == 1 { "" } else { "s" },
                    positional.len(),
                    if positional.len() == 1 { "was" } else { "were" },
                ),
                span,
            ));
        }

        self.env.push_scope();
        for (i, param) in params.iter().take(fixed).enumerate() {
            let param_name = crate::env::normalize_name(param.name);
            let value = if i < positional.len() {
                Some(positional[i])
            } else {
                named
                    .iter()
                    .find(|(n, _)| *n == param_name)
                    .map(|(_, v)| *v)
            };
            let value = match (value, param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => match self.eval_expr(&default) {
                    Ok(value) => value,
                    Err(err) => {
                        self.env.pop_scope();
                        return Err(err);
                    }
                },
                (None, None) => {
                    self.env.pop_scope();
                    return Err(self.error(
                        ErrorKind::TypeMismatch,
                        format!("missing argument ${} for {}", param.name, callable.name),
                        span,
                    ));
                }
            };
            self.env.set_var(param.name, value, false, false);
        }

        if variadic {
            let rest: Vec<Value<'a>> = positional.iter().skip(fixed).copied().collect();
            let param = &params[params.len() - 1];
            self.env.set_var(
                param.name,
                Value::List(List {
                    items: alloc_slice(self.arena, &rest),
                    separator: ListSeparator::Comma,
                    is_arglist: true,
                }),
                false,
                false,
            );
        }
        Ok(())
    }

    /// Execute a function body: assignments and control flow only, until a
    /// `@return` produces the result.
    fn exec_function_body(
        &mut self,
        stmts: &[crate::ast::stmt::Stmt<'a>],
    ) -> Result<Option<Value<'a>>, CompileError> {
        for stmt in stmts {
            let span = stmt.span;
            match &stmt.kind {
                StmtKind::Return(expr) => return self.eval_expr(expr).map(Some),
                StmtKind::Assign {
                    name,
                    value,
                    global,
                    default,
                } => {
                    let value = self.eval_expr(value)?;
                    self.env.set_var(name, value, *global, *default);
                }
                StmtKind::If { clauses, else_body } => {
                    let mut taken = false;
                    for (condition, block) in *clauses {
                        if self.eval_expr(condition)?.is_truthy() {
                            self.env.push_scope();
                            let result = self.exec_function_body(block.stmts);
                            self.env.pop_scope();
                            if let Some(value) = result? {
                                return Ok(Some(value));
                            }
                            taken = true;
                            break;
                        }
                    }
                    if !taken {
                        if let Some(block) = else_body {
                            self.env.push_scope();
                            let result = self.exec_function_body(block.stmts);
                            self.env.pop_scope();
                            if let Some(value) = result? {
                                return Ok(Some(value));
                            }
                        }
                    }
                }
                StmtKind::For {
                    var,
                    from,
                    to,
                    inclusive,
                    body,
                } => {
                    let from_value = match self.eval_expr(from)? {
                        Value::Number(n) => n,
                        other => {
                            return Err(self.error(
                                ErrorKind::TypeMismatch,
                                format!("expected a number, got {}", other.type_name()),
                                from.span,
                            ));
                        }
                    };
                    let to_value = match self.eval_expr(to)? {
                        Value::Number(n) => n,
                        other => {
                            return Err(self.error(
                                ErrorKind::TypeMismatch,
                                format!("expected a number, got {}", other.type_name()),
                                to.span,
                            ));
                        }
                    };
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
                        let result = self.exec_function_body(body.stmts);
                        self.env.pop_scope();
                        if let Some(value) = result? {
                            return Ok(Some(value));
                        }
                        current += if start <= end { 1 } else { -1 };
                    }
                }
                StmtKind::Each { vars, list, body } => {
                    let value = self.eval_expr(list)?;
                    for item in value.iter_list(self.arena) {
                        self.env.push_scope();
                        if vars.len() == 1 {
                            self.env.set_var(vars[0], item, false, false);
                        } else {
                            let parts: Vec<Value<'a>> = match item {
                                Value::List(list) => list.items.to_vec(),
                                other => vec![other],
                            };
                            for (i, var) in vars.iter().enumerate() {
                                let bound = parts.get(i).copied().unwrap_or(Value::Null);
                                self.env.set_var(var, bound, false, false);
                            }
                        }
                        let result = self.exec_function_body(body.stmts);
                        self.env.pop_scope();
                        if let Some(value) = result? {
                            return Ok(Some(value));
                        }
                    }
                }
                StmtKind::While { condition, body } => {
                    let mut iterations = 0usize;
                    while self.eval_expr(condition)?.is_truthy() {
                        iterations += 1;
                        if iterations > super::RECURSION_LIMIT {
                            return Err(self.error(
                                ErrorKind::RecursionLimit,
                                format!("@while exceeded {} iterations", super::RECURSION_LIMIT),
                                span,
                            ));
                        }
                        self.env.push_scope();
                        let result = self.exec_function_body(body.stmts);
                        self.env.pop_scope();
                        if let Some(value) = result? {
                            return Ok(Some(value));
                        }
                    }
                }
                StmtKind::FunctionDef(function) => {
                    self.env.set_function(function.name, *function);
                }
                StmtKind::MixinDef(mixin) => {
                    self.env.set_mixin(mixin.name, *mixin);
                }
                StmtKind::Warn(expr) => {
                    let value = self.eval_expr(expr)?;
                    let text = self.value_text(&value, span)?;
                    self.warnings.push(crate::diagnostic::Diagnostic {
                        severity: crate::diagnostic::Severity::Warning,
                        text,
                        span,
                        trace: self.trace.clone(),
                    });
                }
                StmtKind::Debug(expr) => {
                    let value = self.eval_expr(expr)?;
                    let text = self.value_text(&value, span)?;
                    self.warnings.push(crate::diagnostic::Diagnostic {
                        severity: crate::diagnostic::Severity::Debug,
                        text,
                        span,
                        trace: self.trace.clone(),
                    });
                }
                StmtKind::Error(expr) => {
                    let value = self.eval_expr(expr)?;
                    let text = self.value_text(&value, span)?;
                    return Err(self.error(ErrorKind::UserAbort, text, span));
                }
                StmtKind::Comment { .. } => {}
                _ => {
                    return Err(self.error(
                        ErrorKind::TypeMismatch,
                        "this statement is not allowed in a function body",
                        span,
                    ));
                }
            }
        }
        Ok(None)
    }
}
