//! Selector data model.
//!
//! Selectors are the compiler's central currency: nested-rule flattening,
//! `@extend` expansion and parent-reference resolution are all selector
//! rewrites. The model follows the CSS grammar:
//!
//! - a [`SimpleSelector`] applies one constraint to one element,
//! - a [`Compound`] is a non-empty run of simples on a single element,
//! - a [`Complex`] chains compounds with combinators,
//! - a [`SelectorList`] is a comma list of complex selectors.
//!
//! All nodes are `Copy` handles into the compilation arena. The algebra
//! submodules allocate fresh nodes and never mutate their inputs:
//!
//! - [`ordering`] — the canonical total order
//! - [`parse`] — minimal selector-text parser (schema resolution)
//! - [`unify`] — `unify_simple` / `unify_compound` / `minus`
//! - [`weave`] — `unify_complex` and the weave/subweave merge
//! - [`superselector`] — `is_superselector_of`
//! - [`parentize`] — `&` substitution

use std::fmt::{self, Write};

pub mod ordering;
pub mod parentize;
pub mod parse;
pub mod superselector;
pub mod unify;
pub mod weave;

/// Attribute matcher operators, e.g. the `^=` in `[href^="https:"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttrMatcher {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr~=value]`
    Includes,
    /// `[attr|=value]`
    DashMatch,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
}

impl AttrMatcher {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Substring => "*=",
        }
    }
}

/// Namespace qualifier on type and attribute selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace<'a> {
    /// No namespace qualifier written.
    #[default]
    None,
    /// The universal namespace, `*|name`.
    Any,
    /// A named namespace, `svg|name`.
    Named(&'a str),
}

impl Namespace<'_> {
    /// True when this namespace can absorb `other` during unification: an
    /// unqualified or universal namespace yields to a specific one.
    pub fn is_universal(self) -> bool {
        matches!(self, Self::None | Self::Any)
    }
}

/// A single constraint on a single element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleSelector<'a> {
    /// Tag or universal selector: `div`, `*`, `svg|rect`. The universal
    /// selector is a type selector named `*`.
    Type { ns: Namespace<'a>, name: &'a str },
    /// `#name`
    Id(&'a str),
    /// `.name`
    Class(&'a str),
    /// `[name matcher value flag]`
    Attribute {
        name: &'a str,
        matcher: AttrMatcher,
        value: Option<&'a str>,
        flag: Option<char>,
    },
    /// `:name`, `::name`, `:name(arg)` where the argument is opaque text.
    Pseudo {
        name: &'a str,
        element: bool,
        arg: Option<&'a str>,
    },
    /// A pseudo whose argument is itself a selector list, e.g. `:not(a, .b)`.
    Wrapped {
        name: &'a str,
        arg: SelectorList<'a>,
    },
    /// `%name`; matched by `@extend`, never emitted.
    Placeholder(&'a str),
    /// `&`; replaced by the enclosing rule's selector during evaluation.
    Parent,
}

impl<'a> SimpleSelector<'a> {
    /// The universal selector `*`.
    pub const UNIVERSAL: SimpleSelector<'static> = SimpleSelector::Type {
        ns: Namespace::None,
        name: "*",
    };

    pub fn is_universal(&self) -> bool {
        matches!(self, Self::Type { name: "*", .. })
    }

    pub fn is_pseudo_element(&self) -> bool {
        match self {
            Self::Pseudo { name, element, .. } => *element || is_legacy_pseudo_element(name),
            _ => false,
        }
    }

    /// Pseudo-element name with leading colons stripped, for the legacy
    /// `:before`/`::before` equivalence.
    pub fn pseudo_element_name(&self) -> Option<&'a str> {
        match self {
            Self::Pseudo { name, .. } if self.is_pseudo_element() => Some(*name),
            _ => None,
        }
    }

    pub fn has_parent_ref(&self) -> bool {
        match self {
            Self::Parent => true,
            Self::Wrapped { arg, .. } => arg.has_parent_ref(),
            _ => false,
        }
    }

    /// CSS specificity contribution.
    pub fn specificity(&self) -> u32 {
        match self {
            Self::Type { name, .. } => {
                if *name == "*" {
                    specificity::UNIVERSAL
                } else {
                    specificity::TYPE
                }
            }
            Self::Id(_) => specificity::ID,
            Self::Class(_) | Self::Attribute { .. } => specificity::BASE,
            Self::Pseudo { element, .. } => {
                if *element {
                    specificity::TYPE
                } else {
                    specificity::BASE
                }
            }
            Self::Wrapped { arg, .. } => arg.specificity(),
            Self::Placeholder(_) | Self::Parent => 0,
        }
    }
}

/// The four pseudo-elements that Sass accepts in single-colon form.
pub(crate) fn is_legacy_pseudo_element(name: &str) -> bool {
    matches!(name, "before" | "after" | "first-line" | "first-letter")
}

/// Specificity weights, one decimal "column" per selector class.
pub mod specificity {
    pub const UNIVERSAL: u32 = 0;
    pub const TYPE: u32 = 1;
    pub const BASE: u32 = 1_000;
    pub const ID: u32 = 1_000_000;
}

/// An ordered, non-empty run of simple selectors applying to one element.
///
/// Invariants: at most one type selector, and if present it is first; at most
/// one pseudo-element, and if present it is last.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Compound<'a> {
    pub simples: &'a [SimpleSelector<'a>],
}

impl<'a> Compound<'a> {
    pub fn new(simples: &'a [SimpleSelector<'a>]) -> Self {
        debug_assert!(!simples.is_empty(), "compound selectors are non-empty");
        Self { simples }
    }

    pub fn len(&self) -> usize {
        self.simples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simples.is_empty()
    }

    /// The type selector this compound is anchored on, if any. By the
    /// ordering invariant it can only sit in the first slot.
    pub fn base(&self) -> Option<&SimpleSelector<'a>> {
        self.simples
            .first()
            .filter(|s| matches!(s, SimpleSelector::Type { .. }))
    }

    pub fn is_universal(&self) -> bool {
        self.simples.len() == 1 && self.simples[0].is_universal()
    }

    pub fn has_parent_ref(&self) -> bool {
        self.simples.iter().any(SimpleSelector::has_parent_ref)
    }

    pub fn has_placeholder(&self) -> bool {
        self.simples
            .iter()
            .any(|s| matches!(s, SimpleSelector::Placeholder(_)))
    }

    pub fn specificity(&self) -> u32 {
        self.simples.iter().map(SimpleSelector::specificity).sum()
    }
}

// Compound equality is order-insensitive: `a.x:hover` and `a:hover.x` match
// the same elements. Comparison sorts copies; the stored order is preserved
// for output.
impl PartialEq for Compound<'_> {
    fn eq(&self, other: &Self) -> bool {
        ordering::compound_cmp(self, other) == std::cmp::Ordering::Equal
    }
}

/// One link in a complex selector: either a compound or an explicit
/// combinator. The descendant combinator is implicit between two adjacent
/// compounds, which keeps the weave bookkeeping flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexPart<'a> {
    Compound(Compound<'a>),
    Combinator(Combinator),
}

impl<'a> ComplexPart<'a> {
    pub fn as_compound(&self) -> Option<Compound<'a>> {
        match self {
            Self::Compound(c) => Some(*c),
            Self::Combinator(_) => None,
        }
    }

    pub fn is_combinator(&self) -> bool {
        matches!(self, Self::Combinator(_))
    }
}

/// Relation between two adjacent compounds in a complex selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Combinator {
    /// Whitespace; never stored as a [`ComplexPart`].
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    FollowingSibling,
}

impl Combinator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => ">",
            Self::NextSibling => "+",
            Self::FollowingSibling => "~",
        }
    }
}

/// A chain of compounds joined by combinators, e.g. `ul > li.active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complex<'a> {
    pub parts: &'a [ComplexPart<'a>],
}

impl<'a> Complex<'a> {
    pub fn new(parts: &'a [ComplexPart<'a>]) -> Self {
        Self { parts }
    }

    /// Number of compounds in the chain.
    pub fn compound_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ComplexPart::Compound(_)))
            .count()
    }

    pub fn compounds(&self) -> impl Iterator<Item = Compound<'a>> + '_ {
        self.parts.iter().filter_map(ComplexPart::as_compound)
    }

    /// The rightmost compound. Every selector that reaches the extender has
    /// one; a trailing combinator yields `None`.
    pub fn last_compound(&self) -> Option<Compound<'a>> {
        match self.parts.last() {
            Some(ComplexPart::Compound(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn has_parent_ref(&self) -> bool {
        self.parts.iter().any(|p| match p {
            ComplexPart::Compound(c) => c.has_parent_ref(),
            ComplexPart::Combinator(_) => false,
        })
    }

    /// True when this selector must not appear in output: it contains a
    /// placeholder somewhere along the chain.
    pub fn is_invisible(&self) -> bool {
        self.compounds().any(|c| c.has_placeholder())
    }

    pub fn specificity(&self) -> u32 {
        self.compounds().map(|c| c.specificity()).sum()
    }
}

/// A non-empty comma list of complex selectors.
#[derive(Debug, Clone, Copy, Eq)]
pub struct SelectorList<'a> {
    pub members: &'a [Complex<'a>],
}

impl<'a> SelectorList<'a> {
    pub fn new(members: &'a [Complex<'a>]) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_parent_ref(&self) -> bool {
        self.members.iter().any(Complex::has_parent_ref)
    }

    /// True when no member would be visible in output.
    pub fn is_invisible(&self) -> bool {
        self.members.iter().all(Complex::is_invisible)
    }

    pub fn specificity(&self) -> u32 {
        self.members
            .iter()
            .map(Complex::specificity)
            .max()
            .unwrap_or(0)
    }
}

// List equality is order-insensitive: compare as sets of canonicalized
// complex selectors.
impl PartialEq for SelectorList<'_> {
    fn eq(&self, other: &Self) -> bool {
        ordering::list_cmp(self, other) == std::cmp::Ordering::Equal
    }
}

// ---------------------------------------------------------------------------
// Canonical string forms
// ---------------------------------------------------------------------------

impl fmt::Display for SimpleSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { ns, name } => {
                match ns {
                    Namespace::None => {}
                    Namespace::Any => f.write_str("*|")?,
                    Namespace::Named(n) => write!(f, "{n}|")?,
                }
                f.write_str(name)
            }
            Self::Id(name) => write!(f, "#{name}"),
            Self::Class(name) => write!(f, ".{name}"),
            Self::Attribute {
                name,
                matcher,
                value,
                flag,
            } => {
                write!(f, "[{name}")?;
                if let Some(value) = value {
                    write!(f, "{}{value}", matcher.as_str())?;
                }
                if let Some(flag) = flag {
                    write!(f, " {flag}")?;
                }
                f.write_char(']')
            }
            Self::Pseudo { name, element, arg } => {
                f.write_char(':')?;
                if *element {
                    f.write_char(':')?;
                }
                f.write_str(name)?;
                if let Some(arg) = arg {
                    write!(f, "({arg})")?;
                }
                Ok(())
            }
            Self::Wrapped { name, arg } => write!(f, ":{name}({arg})"),
            Self::Placeholder(name) => write!(f, "%{name}"),
            Self::Parent => f.write_char('&'),
        }
    }
}

impl fmt::Display for Compound<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for simple in self.simples {
            write!(f, "{simple}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Complex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut after_compound = false;
        for part in self.parts {
            match part {
                ComplexPart::Compound(c) => {
                    if after_compound {
                        f.write_char(' ')?;
                    }
                    write!(f, "{c}")?;
                    after_compound = true;
                }
                ComplexPart::Combinator(op) => {
                    if after_compound {
                        f.write_char(' ')?;
                    }
                    f.write_str(op.as_str())?;
                    after_compound = true;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectorList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{complex}")?;
        }
        Ok(())
    }
}
