//! Compound-level selector unification and subtraction.
//!
//! `unify_compound(a, b)` builds the compound matching exactly the elements
//! matched by both inputs, or `None` when no element can match both (two
//! different tag names, ids, or pseudo-elements). `minus` is the inverse used
//! by `@extend`: the simples of `a` not present in `b`.

use crate::arena::{Arena, alloc_slice};

use super::{Compound, Namespace, SimpleSelector};

/// Unify two simple selectors into a compound, or `None` when they conflict.
pub fn unify_simple<'a>(
    arena: &'a Arena,
    a: &SimpleSelector<'a>,
    b: &SimpleSelector<'a>,
) -> Option<Compound<'a>> {
    let start = Compound::new(alloc_slice(arena, &[*a]));
    unify_simple_into(arena, b, &start)
}

/// Fold `b`'s simple selectors into `a`, one at a time. `None` as soon as a
/// step conflicts.
pub fn unify_compound<'a>(
    arena: &'a Arena,
    a: &Compound<'a>,
    b: &Compound<'a>,
) -> Option<Compound<'a>> {
    let mut unified = *a;
    for simple in b.simples {
        unified = unify_simple_into(arena, simple, &unified)?;
    }
    Some(unified)
}

/// Add one simple selector into an existing compound.
pub fn unify_simple_into<'a>(
    arena: &'a Arena,
    simple: &SimpleSelector<'a>,
    compound: &Compound<'a>,
) -> Option<Compound<'a>> {
    // Already present: nothing to add.
    let canonical = simple.to_string();
    if compound.simples.iter().any(|s| s.to_string() == canonical) {
        return Some(*compound);
    }

    match simple {
        SimpleSelector::Type { .. } => return unify_type_into(arena, simple, compound),
        SimpleSelector::Id(name) => {
            let conflict = compound
                .simples
                .iter()
                .any(|s| matches!(s, SimpleSelector::Id(other) if other != name));
            if conflict {
                return None;
            }
        }
        SimpleSelector::Pseudo { name, .. } if simple.is_pseudo_element() => {
            let conflict = compound
                .simples
                .iter()
                .any(|s| s.is_pseudo_element() && s.pseudo_element_name() != Some(*name));
            if conflict {
                return None;
            }
        }
        _ => {}
    }

    // Insertion point: pseudo selectors group at the end, and anything else
    // goes in front of them so a pseudo-element stays last.
    let is_pseudo = matches!(
        simple,
        SimpleSelector::Pseudo { .. } | SimpleSelector::Wrapped { .. }
    );
    let first_pseudo = compound.simples.iter().position(|s| {
        matches!(
            s,
            SimpleSelector::Pseudo { .. } | SimpleSelector::Wrapped { .. }
        )
    });
    let ends_with_element = compound
        .simples
        .last()
        .is_some_and(SimpleSelector::is_pseudo_element);

    let insert_at = match first_pseudo {
        Some(i) if !is_pseudo || ends_with_element => i,
        _ => compound.simples.len(),
    };

    let mut simples = compound.simples.to_vec();
    simples.insert(insert_at, *simple);
    Some(Compound::new(alloc_slice(arena, &simples)))
}

/// Unify an incoming type selector with the head of a compound.
fn unify_type_into<'a>(
    arena: &'a Arena,
    incoming: &SimpleSelector<'a>,
    compound: &Compound<'a>,
) -> Option<Compound<'a>> {
    let SimpleSelector::Type { ns, name } = incoming else {
        return None;
    };
    let head = compound.simples[0];

    if *name == "*" {
        match head {
            SimpleSelector::Type { .. } => {
                let unified = unify_type_type(incoming, &head)?;
                let mut simples = compound.simples.to_vec();
                simples[0] = unified;
                Some(Compound::new(alloc_slice(arena, &simples)))
            }
            SimpleSelector::Class(_) | SimpleSelector::Id(_) => {
                // `ns|*` keeps its namespace in front of bare qualifiers.
                if let Namespace::Named(_) = ns {
                    let mut simples = Vec::with_capacity(compound.len() + 1);
                    simples.push(*incoming);
                    simples.extend_from_slice(compound.simples);
                    Some(Compound::new(alloc_slice(arena, &simples)))
                } else {
                    Some(*compound)
                }
            }
            _ => Some(*compound),
        }
    } else {
        match head {
            SimpleSelector::Type {
                ns: head_ns,
                name: head_name,
            } => {
                if head_name != "*" && head_ns != Namespace::Any && head_name != *name {
                    return None;
                }
                let unified = unify_type_type(incoming, &head)?;
                let mut simples = compound.simples.to_vec();
                simples[0] = unified;
                Some(Compound::new(alloc_slice(arena, &simples)))
            }
            _ => {
                let mut simples = Vec::with_capacity(compound.len() + 1);
                simples.push(*incoming);
                simples.extend_from_slice(compound.simples);
                Some(Compound::new(alloc_slice(arena, &simples)))
            }
        }
    }
}

/// Merge two type selectors: a qualified namespace wins over a universal one
/// and a concrete name wins over `*`.
fn unify_type_type<'a>(
    a: &SimpleSelector<'a>,
    b: &SimpleSelector<'a>,
) -> Option<SimpleSelector<'a>> {
    let (SimpleSelector::Type { ns: a_ns, name: a_name }, SimpleSelector::Type { ns: b_ns, name: b_name }) =
        (a, b)
    else {
        return None;
    };

    if a_ns.is_universal() && !b_ns.is_universal() {
        let name = if *a_name == "*" { *b_name } else { *a_name };
        return Some(SimpleSelector::Type { ns: *b_ns, name });
    }
    if *a_name == "*" && *b_name != "*" {
        return Some(SimpleSelector::Type {
            ns: *a_ns,
            name: *b_name,
        });
    }
    Some(*a)
}

/// The simples of `a` not present in `b`, by canonical string equality, order
/// preserved. `None` when nothing remains.
pub fn minus<'a>(arena: &'a Arena, a: &Compound<'a>, b: &Compound<'a>) -> Option<Compound<'a>> {
    let b_strings: Vec<String> = b.simples.iter().map(ToString::to_string).collect();
    let remaining: Vec<SimpleSelector<'a>> = a
        .simples
        .iter()
        .filter(|s| !b_strings.contains(&s.to_string()))
        .copied()
        .collect();
    if remaining.is_empty() {
        None
    } else {
        Some(Compound::new(alloc_slice(arena, &remaining)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parse::parse_selector;

    fn compound<'a>(arena: &'a Arena, text: &str) -> Compound<'a> {
        parse_selector(arena, text).unwrap().members[0]
            .last_compound()
            .unwrap()
    }

    fn unified(arena: &Arena, a: &str, b: &str) -> Option<String> {
        let a = compound(arena, a);
        let b = compound(arena, b);
        unify_compound(arena, &a, &b).map(|c| c.to_string())
    }

    #[test]
    fn simple_pair_unification() {
        let arena = Arena::default();
        let x = SimpleSelector::Class("x");
        let y = SimpleSelector::Class("y");
        assert_eq!(unify_simple(&arena, &x, &y).unwrap().to_string(), ".x.y");

        let div = SimpleSelector::Type {
            ns: Namespace::None,
            name: "div",
        };
        assert_eq!(unify_simple(&arena, &x, &div).unwrap().to_string(), "div.x");
    }

    #[test]
    fn class_absorption() {
        let arena = Arena::default();
        assert_eq!(unified(&arena, ".foo.bar", ".foo").as_deref(), Some(".foo.bar"));
        assert_eq!(unified(&arena, ".foo", ".bar").as_deref(), Some(".foo.bar"));
    }

    #[test]
    fn conflicting_types_fail() {
        let arena = Arena::default();
        assert_eq!(unified(&arena, "div", "span"), None);
        assert_eq!(unified(&arena, "div", "div").as_deref(), Some("div"));
    }

    #[test]
    fn universal_yields_to_type() {
        let arena = Arena::default();
        assert_eq!(unified(&arena, "*", "div").as_deref(), Some("div"));
        assert_eq!(unified(&arena, "div.x", "*").as_deref(), Some("div.x"));
    }

    #[test]
    fn type_prepends_onto_qualifiers() {
        let arena = Arena::default();
        assert_eq!(unified(&arena, ".x", "a").as_deref(), Some("a.x"));
        assert_eq!(unified(&arena, "a", ".x").as_deref(), Some("a.x"));
    }

    #[test]
    fn conflicting_ids_fail() {
        let arena = Arena::default();
        assert_eq!(unified(&arena, ".foo#bar.hux", ".hux.foo#baz"), None);
        assert_eq!(
            unified(&arena, ".foo#bar.hux", ".hux.foo#bar").as_deref(),
            Some(".foo#bar.hux")
        );
    }

    #[test]
    fn conflicting_pseudo_elements_fail() {
        let arena = Arena::default();
        assert_eq!(unified(&arena, "foo:bar::after", "foo:bar::first-letter"), None);
        assert_eq!(
            unified(&arena, "div:first-child", "div:last-child").as_deref(),
            Some("div:first-child:last-child")
        );
    }

    #[test]
    fn pseudo_element_stays_last() {
        let arena = Arena::default();
        assert_eq!(
            unified(&arena, "a::after", ".x").as_deref(),
            Some("a.x::after")
        );
    }

    #[test]
    fn namespace_rules() {
        let arena = Arena::default();
        assert_eq!(unified(&arena, "*|*", "svg|rect").as_deref(), Some("svg|rect"));
        assert_eq!(unified(&arena, "svg|*", ".x").as_deref(), Some("svg|*.x"));
    }

    #[test]
    fn subtraction_preserves_order() {
        let arena = Arena::default();
        let a = compound(&arena, ".a.b.c");
        let b = compound(&arena, ".c.b");
        assert_eq!(minus(&arena, &a, &b).unwrap().to_string(), ".a");

        let b = compound(&arena, ".fludge.b");
        assert_eq!(minus(&arena, &a, &b).unwrap().to_string(), ".a.c");

        let b = compound(&arena, ".a.b.c");
        assert!(minus(&arena, &a, &b).is_none());
    }
}
