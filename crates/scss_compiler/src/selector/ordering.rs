//! Canonical total order over selectors.
//!
//! Simple selectors order class-by-class (type < id < class < attribute <
//! pseudo-class < wrapped < pseudo-element < placeholder < parent), then by
//! name, namespace and sub-arguments. Compounds compare their simples in
//! sorted order with length as the tiebreak; lists compare as sorted sets.
//!
//! These are free functions rather than `Ord` impls: the legacy
//! `:before`/`::before` equivalence makes the canonical order slightly
//! coarser than structural equality, and conflating the two behind `Ord`
//! would be a trap.

use std::cmp::Ordering;

use smallvec::SmallVec;

use super::{Combinator, Complex, ComplexPart, Compound, Namespace, SelectorList, SimpleSelector};

fn simple_rank(simple: &SimpleSelector<'_>) -> u8 {
    match simple {
        SimpleSelector::Type { .. } => 0,
        SimpleSelector::Id(_) => 1,
        SimpleSelector::Class(_) => 2,
        SimpleSelector::Attribute { .. } => 3,
        SimpleSelector::Pseudo { .. } if !simple.is_pseudo_element() => 4,
        SimpleSelector::Wrapped { .. } => 5,
        SimpleSelector::Pseudo { .. } => 6,
        SimpleSelector::Placeholder(_) => 7,
        SimpleSelector::Parent => 8,
    }
}

fn ns_cmp(a: Namespace<'_>, b: Namespace<'_>) -> Ordering {
    fn rank(ns: Namespace<'_>) -> u8 {
        match ns {
            Namespace::None => 0,
            Namespace::Any => 1,
            Namespace::Named(_) => 2,
        }
    }
    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (Namespace::Named(x), Namespace::Named(y)) => x.cmp(y),
        _ => Ordering::Equal,
    })
}

/// Canonical order on simple selectors.
pub fn simple_cmp(a: &SimpleSelector<'_>, b: &SimpleSelector<'_>) -> Ordering {
    simple_rank(a).cmp(&simple_rank(b)).then_with(|| match (a, b) {
        (SimpleSelector::Type { ns: na, name: xa }, SimpleSelector::Type { ns: nb, name: xb }) => {
            xa.cmp(xb).then_with(|| ns_cmp(*na, *nb))
        }
        (SimpleSelector::Id(x), SimpleSelector::Id(y))
        | (SimpleSelector::Class(x), SimpleSelector::Class(y))
        | (SimpleSelector::Placeholder(x), SimpleSelector::Placeholder(y)) => x.cmp(y),
        (
            SimpleSelector::Attribute {
                name: xa,
                matcher: ma,
                value: va,
                flag: fa,
            },
            SimpleSelector::Attribute {
                name: xb,
                matcher: mb,
                value: vb,
                flag: fb,
            },
        ) => xa
            .cmp(xb)
            .then_with(|| ma.cmp(mb))
            .then_with(|| va.cmp(vb))
            .then_with(|| fa.cmp(fb)),
        (
            SimpleSelector::Pseudo {
                name: xa, arg: aa, ..
            },
            SimpleSelector::Pseudo {
                name: xb, arg: ab, ..
            },
        ) => xa.cmp(xb).then_with(|| aa.cmp(ab)),
        (
            SimpleSelector::Wrapped { name: xa, arg: aa },
            SimpleSelector::Wrapped { name: xb, arg: ab },
        ) => xa.cmp(xb).then_with(|| list_cmp(aa, ab)),
        (SimpleSelector::Parent, SimpleSelector::Parent) => Ordering::Equal,
        // Ranks already differ for mixed classes.
        _ => Ordering::Equal,
    })
}

/// Canonical order on compound selectors: simples in sorted order, length as
/// the tiebreak.
pub fn compound_cmp(a: &Compound<'_>, b: &Compound<'_>) -> Ordering {
    let mut xs: SmallVec<[&SimpleSelector<'_>; 4]> = a.simples.iter().collect();
    let mut ys: SmallVec<[&SimpleSelector<'_>; 4]> = b.simples.iter().collect();
    xs.sort_unstable_by(|l, r| simple_cmp(l, r));
    ys.sort_unstable_by(|l, r| simple_cmp(l, r));
    for (x, y) in xs.iter().zip(ys.iter()) {
        let ord = simple_cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    xs.len().cmp(&ys.len())
}

fn part_cmp(a: &ComplexPart<'_>, b: &ComplexPart<'_>) -> Ordering {
    match (a, b) {
        (ComplexPart::Combinator(x), ComplexPart::Combinator(y)) => x.cmp(y),
        (ComplexPart::Compound(x), ComplexPart::Compound(y)) => compound_cmp(x, y),
        // A bare combinator slot sorts before a compound, mirroring the
        // null-head-first rule of the linked representation.
        (ComplexPart::Combinator(_), ComplexPart::Compound(_)) => Ordering::Less,
        (ComplexPart::Compound(_), ComplexPart::Combinator(_)) => Ordering::Greater,
    }
}

/// Canonical order on complex selectors: part by part, then length.
pub fn complex_cmp(a: &Complex<'_>, b: &Complex<'_>) -> Ordering {
    for (x, y) in a.parts.iter().zip(b.parts.iter()) {
        let ord = part_cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.parts.len().cmp(&b.parts.len())
}

/// Canonical order on selector lists: lexicographic over the sorted members,
/// then length. `Equal` is set equality.
pub fn list_cmp(a: &SelectorList<'_>, b: &SelectorList<'_>) -> Ordering {
    let mut xs: SmallVec<[&Complex<'_>; 4]> = a.members.iter().collect();
    let mut ys: SmallVec<[&Complex<'_>; 4]> = b.members.iter().collect();
    xs.sort_unstable_by(|l, r| complex_cmp(l, r));
    ys.sort_unstable_by(|l, r| complex_cmp(l, r));
    for (x, y) in xs.iter().zip(ys.iter()) {
        let ord = complex_cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    xs.len().cmp(&ys.len())
}

/// Combinator table used when two trailing combinators merge during a weave:
/// descendant absorbs anything, equal non-descendants keep themselves, and
/// mixed non-descendants fail.
pub fn merge_combinators(a: Combinator, b: Combinator) -> Option<Combinator> {
    match (a, b) {
        (Combinator::Descendant, other) | (other, Combinator::Descendant) => Some(other),
        (x, y) if x == y => Some(x),
        _ => None,
    }
}
