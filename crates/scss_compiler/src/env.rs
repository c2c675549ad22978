//! Name resolution: a stack of scope frames.
//!
//! Each frame holds three independent namespaces (variables, mixins,
//! functions) because the three are looked up in distinct syntactic
//! positions. Lookup walks the stack inside-out; hyphens and underscores are
//! interchangeable in names and normalized on both insert and lookup.

use cow_utils::CowUtils;
use rustc_hash::FxHashMap;

use crate::ast::{Callable, Value};

/// Normalize a Sass identifier: underscores and hyphens are the same name.
pub fn normalize_name(name: &str) -> String {
    name.cow_replace('_', "-").into_owned()
}

#[derive(Default)]
struct Frame<'a> {
    vars: FxHashMap<String, Value<'a>>,
    mixins: FxHashMap<String, Callable<'a>>,
    functions: FxHashMap<String, Callable<'a>>,
}

/// The scope stack for one compilation.
pub struct Environment<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Current nesting depth, mostly useful in tests.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.frames.len() > 1, "cannot pop the root scope");
        self.frames.pop();
    }

    pub fn get_var(&self, name: &str) -> Option<Value<'a>> {
        let name = normalize_name(name);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.vars.get(&name).copied())
    }

    /// Bind a variable.
    ///
    /// `global` targets the root frame. `default` is skipped when the name
    /// already resolves to a non-null value. A plain assignment overwrites
    /// the nearest existing binding, or defines one in the current scope.
    pub fn set_var(&mut self, name: &str, value: Value<'a>, global: bool, default: bool) {
        let name = normalize_name(name);
        if default {
            if let Some(existing) = self.get_var(&name) {
                if !existing.is_null() {
                    return;
                }
            }
        }
        if global {
            if let Some(root) = self.frames.first_mut() {
                root.vars.insert(name, value);
            }
            return;
        }
        for frame in self.frames.iter_mut().rev() {
            if frame.vars.contains_key(&name) {
                frame.vars.insert(name, value);
                return;
            }
        }
        if let Some(top) = self.frames.last_mut() {
            top.vars.insert(name, value);
        }
    }

    pub fn get_mixin(&self, name: &str) -> Option<Callable<'a>> {
        let name = normalize_name(name);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.mixins.get(&name).copied())
    }

    pub fn set_mixin(&mut self, name: &str, mixin: Callable<'a>) {
        let name = normalize_name(name);
        if let Some(top) = self.frames.last_mut() {
            top.mixins.insert(name, mixin);
        }
    }

    pub fn get_function(&self, name: &str) -> Option<Callable<'a>> {
        let name = normalize_name(name);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.functions.get(&name).copied())
    }

    pub fn set_function(&mut self, name: &str, function: Callable<'a>) {
        let name = normalize_name(name);
        if let Some(top) = self.frames.last_mut() {
            top.functions.insert(name, function);
        }
    }
}

impl Default for Environment<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::value::{Number, Str};

    fn num(v: f64) -> Value<'static> {
        Value::Number(Number::unitless(v))
    }

    #[test]
    fn lookup_walks_inside_out() {
        let mut env = Environment::new();
        env.set_var("x", num(1.0), false, false);
        env.push_scope();
        assert_eq!(env.get_var("x"), Some(num(1.0)));
        env.set_var("y", num(2.0), false, false);
        env.pop_scope();
        assert_eq!(env.get_var("y"), None);
    }

    #[test]
    fn plain_assignment_overwrites_outer_binding() {
        let mut env = Environment::new();
        env.set_var("x", num(1.0), false, false);
        env.push_scope();
        env.set_var("x", num(2.0), false, false);
        env.pop_scope();
        assert_eq!(env.get_var("x"), Some(num(2.0)));
    }

    #[test]
    fn global_targets_the_root_frame() {
        let mut env = Environment::new();
        env.push_scope();
        env.set_var("g", num(9.0), true, false);
        env.pop_scope();
        assert_eq!(env.get_var("g"), Some(num(9.0)));
    }

    #[test]
    fn default_skips_non_null_bindings() {
        let mut env = Environment::new();
        env.set_var("x", num(1.0), false, false);
        env.set_var("x", num(5.0), false, true);
        assert_eq!(env.get_var("x"), Some(num(1.0)));

        env.set_var("n", Value::Null, false, false);
        env.set_var("n", num(7.0), false, true);
        assert_eq!(env.get_var("n"), Some(num(7.0)));
    }

    #[test]
    fn hyphens_and_underscores_are_interchangeable() {
        let mut env = Environment::new();
        env.set_var("main_width", Value::String(Str::unquoted("10px")), false, false);
        assert!(env.get_var("main-width").is_some());
        assert!(env.get_var("main_width").is_some());
    }
}
