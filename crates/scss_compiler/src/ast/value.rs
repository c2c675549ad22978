//! Runtime values.
//!
//! The tagged union every expression reduces to. Values are `Copy` handles
//! into the compilation arena, so passing them through environments and
//! argument lists never clones payload data.

use crate::arena::{Arena, alloc_slice, alloc_str};

/// Quote mark on a string value. Unquoted strings do not round-trip back to
/// quoted ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMark {
    None,
    Single,
    Double,
}

/// Separator of a list value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSeparator {
    Space,
    Comma,
}

/// A numeric value: scalar plus numerator and denominator unit lists.
#[derive(Debug, Clone, Copy)]
pub struct Number<'a> {
    pub value: f64,
    pub numer: &'a [&'a str],
    pub denom: &'a [&'a str],
}

impl<'a> Number<'a> {
    pub fn unitless(value: f64) -> Self {
        Self {
            value,
            numer: &[],
            denom: &[],
        }
    }

    pub fn with_unit(arena: &'a Arena, value: f64, unit: &str) -> Self {
        Self {
            value,
            numer: alloc_slice(arena, &[alloc_str(arena, unit) as &str]),
            denom: &[],
        }
    }

    pub fn is_unitless(&self) -> bool {
        self.numer.is_empty() && self.denom.is_empty()
    }

    /// Unit suffix in display form, e.g. `px` or `px/s`.
    pub fn unit(&self) -> String {
        let mut out = String::new();
        for (i, u) in self.numer.iter().enumerate() {
            if i > 0 {
                out.push('*');
            }
            out.push_str(u);
        }
        for u in self.denom {
            out.push('/');
            out.push_str(u);
        }
        out
    }

    /// True when the units of `self` and `other` are compatible for
    /// addition/comparison: identical, or one side unitless.
    pub fn units_compatible(&self, other: &Number<'_>) -> bool {
        self.is_unitless() || other.is_unitless() || self.unit() == other.unit()
    }
}

/// An rgba color with an optional preferred display form (the token the
/// color was written as, e.g. `rebeccapurple` or `#F00`).
#[derive(Debug, Clone, Copy)]
pub struct Color<'a> {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
    pub disp: Option<&'a str>,
}

impl<'a> Color<'a> {
    pub fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
            disp: None,
        }
    }

    pub fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
            disp: None,
        }
    }

    pub fn with_disp(mut self, disp: &'a str) -> Self {
        self.disp = Some(disp);
        self
    }
}

/// A string value with its quote mark.
#[derive(Debug, Clone, Copy)]
pub struct Str<'a> {
    pub text: &'a str,
    pub quote: QuoteMark,
}

impl<'a> Str<'a> {
    pub fn quoted(text: &'a str) -> Self {
        Self {
            text,
            quote: QuoteMark::Double,
        }
    }

    pub fn unquoted(text: &'a str) -> Self {
        Self {
            text,
            quote: QuoteMark::None,
        }
    }
}

/// A list value.
#[derive(Debug, Clone, Copy)]
pub struct List<'a> {
    pub items: &'a [Value<'a>],
    pub separator: ListSeparator,
    pub is_arglist: bool,
}

/// A map value; entries preserve insertion order.
#[derive(Debug, Clone, Copy)]
pub struct Map<'a> {
    pub entries: &'a [(Value<'a>, Value<'a>)],
}

impl<'a> Map<'a> {
    pub fn get(&self, key: &Value<'a>) -> Option<Value<'a>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }
}

/// A runtime value.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Number(Number<'a>),
    Color(Color<'a>),
    String(Str<'a>),
    List(List<'a>),
    Map(Map<'a>),
    /// First-class function reference by name.
    Function(&'a str),
}

impl<'a> Value<'a> {
    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Color(_) => "color",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    /// True when the value renders to nothing: null, an empty unquoted
    /// string, or a list whose items are all invisible.
    pub fn is_invisible(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.quote == QuoteMark::None && s.text.is_empty(),
            Value::List(list) => list.items.iter().all(Value::is_invisible),
            _ => false,
        }
    }

    /// Iterate as a Sass list: lists yield their items, maps yield
    /// `(key value)` pairs, every other value yields itself once.
    pub fn iter_list(&self, arena: &'a Arena) -> Vec<Value<'a>> {
        match self {
            Value::List(list) => list.items.to_vec(),
            Value::Map(map) => map
                .entries
                .iter()
                .map(|(k, v)| {
                    Value::List(List {
                        items: alloc_slice(arena, &[*k, *v]),
                        separator: ListSeparator::Space,
                        is_arglist: false,
                    })
                })
                .collect(),
            other => vec![*other],
        }
    }
}

// Sass equality: numbers compare value+unit, strings compare content
// regardless of quoting, lists compare items and separator, maps compare as
// unordered key/value sets.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                a.value == b.value && a.unit() == b.unit()
            }
            (Value::Color(a), Value::Color(b)) => {
                a.red == b.red && a.green == b.green && a.blue == b.blue && a.alpha == b.alpha
            }
            (Value::String(a), Value::String(b)) => a.text == b.text,
            (Value::List(a), Value::List(b)) => {
                a.separator == b.separator && a.items == b.items
            }
            (Value::Map(a), Value::Map(b)) => {
                a.entries.len() == b.entries.len()
                    && a.entries.iter().all(|(k, v)| {
                        b.entries.iter().any(|(bk, bv)| bk == k && bv == v)
                    })
            }
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}
