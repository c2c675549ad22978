//! Superselector checks.
//!
//! `a` is a superselector of `b` when every element matched by `b` is also
//! matched by `a`. The compound check works over canonical string sets with
//! special handling for pseudo-elements and selector-valued pseudos
//! (`:not`, `:matches` and friends); the complex check walks both chains in
//! lockstep comparing combinators.

use smallvec::SmallVec;

use super::{Combinator, Complex, ComplexPart, Compound, SelectorList, SimpleSelector};

/// True when list `a` covers list `b`: every member of `b` is matched by some
/// member of `a`.
pub fn list_is_superselector(a: &SelectorList<'_>, b: &SelectorList<'_>) -> bool {
    b.members.iter().all(|sub| {
        a.members
            .iter()
            .any(|sup| complex_is_superselector(sup.parts, sub.parts))
    })
}

/// True when the chain `a` matches everything the chain `b` matches.
pub fn complex_is_superselector(a: &[ComplexPart<'_>], b: &[ComplexPart<'_>]) -> bool {
    // Chains with leading or trailing combinators are neither super- nor
    // sub-selectors of anything.
    if matches!(a.last(), Some(p) if p.is_combinator()) {
        return false;
    }
    if matches!(b.last(), Some(p) if p.is_combinator()) {
        return false;
    }

    let mut i1 = 0;
    let mut i2 = 0;
    loop {
        let remaining1 = a.len() - i1;
        let remaining2 = b.len() - i2;
        if remaining1 == 0 || remaining2 == 0 {
            return false;
        }
        // A longer chain is always more specific than a shorter one.
        if remaining1 > remaining2 {
            return false;
        }
        let ComplexPart::Compound(compound1) = a[i1] else {
            return false;
        };
        if remaining1 == 1 {
            let Some(ComplexPart::Compound(last2)) = b.last() else {
                return false;
            };
            return compound_is_superselector(&compound1, last2, None);
        }

        // Find the first position in `b` whose compound is covered by
        // `compound1`; the final compound is reserved for the base case.
        let mut after = i2 + 1;
        let mut found = false;
        while after < b.len() {
            if let ComplexPart::Compound(compound2) = b[after - 1] {
                if compound_is_superselector(&compound1, &compound2, None) {
                    found = true;
                    break;
                }
            }
            after += 1;
        }
        if !found {
            return false;
        }

        match (a[i1 + 1], b[after]) {
            (ComplexPart::Combinator(op1), ComplexPart::Combinator(op2)) => {
                // `~` covers `+`, otherwise combinators must agree.
                if op1 == Combinator::FollowingSibling {
                    if op2 == Combinator::Child {
                        return false;
                    }
                } else if op2 != op1 {
                    return false;
                }
                // `.a > .c` does not cover `.a > .b > .c`: the tail after a
                // combinator must be the final compound on both sides.
                if remaining1 == 3 && remaining2 > 3 {
                    return false;
                }
                i1 += 2;
                i2 = after + 1;
            }
            (ComplexPart::Combinator(_), ComplexPart::Compound(_)) => return false,
            (ComplexPart::Compound(_), ComplexPart::Combinator(op2)) => {
                // A descendant step covers a child step only.
                if op2 != Combinator::Child {
                    return false;
                }
                i1 += 1;
                i2 = after + 1;
            }
            (ComplexPart::Compound(_), ComplexPart::Compound(_)) => {
                i1 += 1;
                i2 = after;
            }
        }
    }
}

/// True when compound `a` matches everything compound `b` matches.
pub fn compound_is_superselector(
    a: &Compound<'_>,
    b: &Compound<'_>,
    wrapping: Option<&str>,
) -> bool {
    // Pseudo-elements must agree as sets, with `:x` equal to `::x` for the
    // legacy names.
    let a_elements: SmallVec<[&str; 2]> = pseudo_element_names(a);
    let b_elements: SmallVec<[&str; 2]> = pseudo_element_names(b);
    if !same_name_set(&a_elements, &b_elements) {
        return false;
    }

    // The base type anchors the compound: it must be universal or match.
    match (a.base(), b.base()) {
        (Some(a_base), b_base) => {
            if !a_base.is_universal() {
                match b_base {
                    Some(bb) if a_base.to_string() == bb.to_string() => {}
                    _ => return false,
                }
            }
        }
        (None, _) => {}
    }

    let mut a_set: Vec<String> = Vec::new();
    for simple in a.simples {
        if let SimpleSelector::Wrapped { name, arg } = simple {
            if *name == "not" && list_covers_compound(arg, b, Some("not")) {
                return false;
            }
            if is_matches_like(name) {
                match wrapping {
                    Some(w) if w != *name => return false,
                    Some(_) => {}
                    None => {
                        if list_covers_compound(arg, b, Some(*name)) {
                            return true;
                        }
                    }
                }
            }
            // A wrapped selector is satisfied when `b` carries one with the
            // same name whose argument it covers.
            let covered = b.simples.iter().any(|other| {
                matches!(other, SimpleSelector::Wrapped { name: other_name, arg: other_arg }
                    if other_name == name && *name != "current" && list_is_superselector(arg, other_arg))
            });
            if covered {
                continue;
            }
        }
        if simple.is_pseudo_element() || matches!(simple, SimpleSelector::Type { .. }) {
            // Bases and pseudo-elements were handled above.
            if matches!(simple, SimpleSelector::Type { .. }) && a.base().is_some() {
                continue;
            }
            if simple.is_pseudo_element() {
                continue;
            }
        }
        a_set.push(simple.to_string());
    }

    let mut b_set: Vec<String> = Vec::new();
    for simple in b.simples {
        match simple {
            SimpleSelector::Wrapped { name, arg } if *name == "not" => {
                if compound_covers_list(a, arg) {
                    return false;
                }
                b_set.push(simple.to_string());
            }
            SimpleSelector::Wrapped { name, arg } if is_matches_like(name) => {
                if let Some(w) = wrapping {
                    if w != *name {
                        return false;
                    }
                }
                return compound_covers_list(a, arg);
            }
            _ => {
                if simple.is_pseudo_element() {
                    continue;
                }
                if matches!(simple, SimpleSelector::Type { .. }) && b.base().is_some() {
                    continue;
                }
                b_set.push(simple.to_string());
            }
        }
    }

    a_set.iter().all(|s| b_set.contains(s))
}

fn is_matches_like(name: &str) -> bool {
    matches!(
        name,
        "is" | "where" | "matches" | "any" | "-moz-any" | "-webkit-any"
    )
}

fn pseudo_element_names<'x>(compound: &Compound<'x>) -> SmallVec<[&'x str; 2]> {
    compound
        .simples
        .iter()
        .filter_map(SimpleSelector::pseudo_element_name)
        .collect()
}

fn same_name_set(a: &[&str], b: &[&str]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x))
}

/// Any member of `list` (a single-compound complex) covers `compound`.
fn list_covers_compound(
    list: &SelectorList<'_>,
    compound: &Compound<'_>,
    wrapping: Option<&str>,
) -> bool {
    list.members.iter().any(|complex| {
        complex
            .last_compound()
            .is_some_and(|last| compound_is_superselector(&last, compound, wrapping))
    })
}

/// `compound` covers some member of `list`.
fn compound_covers_list(compound: &Compound<'_>, list: &SelectorList<'_>) -> bool {
    list.members.iter().any(|complex| {
        complex
            .last_compound()
            .is_some_and(|last| compound_is_superselector(compound, &last, None))
    })
}

/// Superselector check used while weaving: both sequences are anchored on a
/// shared synthetic base so prefixes compare as "parents".
pub(crate) fn parent_superselector(a: &[ComplexPart<'_>], b: &[ComplexPart<'_>]) -> bool {
    static TEMP_BASE: [SimpleSelector<'static>; 1] = [SimpleSelector::Placeholder("<temp>")];
    let base = ComplexPart::Compound(Compound { simples: &TEMP_BASE });
    let mut with_base_a: Vec<ComplexPart<'_>> = a.to_vec();
    with_base_a.push(base);
    let mut with_base_b: Vec<ComplexPart<'_>> = b.to_vec();
    with_base_b.push(base);
    complex_is_superselector(&with_base_a, &with_base_b)
}
