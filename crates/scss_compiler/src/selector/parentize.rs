//! Parent-reference resolution.
//!
//! Replaces every `&` in a child selector with each member of the enclosing
//! rule's selector list, producing the Cartesian product. Nested rules with
//! no explicit `&` are treated as if they began with one (the implicit
//! parent), which is how nested-rule flattening happens.

use crate::arena::{Arena, alloc_slice, alloc_str};

use super::weave::Seq;
use super::{Complex, ComplexPart, Compound, Namespace, SelectorList, SimpleSelector};

/// Error raised for nesting a parent reference where it cannot go.
#[derive(Debug, Clone)]
pub struct ParentizeError {
    pub message: String,
}

impl std::fmt::Display for ParentizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

fn invalid(message: impl Into<String>) -> ParentizeError {
    ParentizeError {
        message: message.into(),
    }
}

/// Resolve every `&` in `child` against `parents`.
///
/// With `implicit_parent`, members without an explicit `&` are prefixed by
/// each parent as an ancestor. Without a parent, a child containing `&` is an
/// error and anything else is returned unchanged.
pub fn parentize<'a>(
    arena: &'a Arena,
    child: &SelectorList<'a>,
    parents: Option<&SelectorList<'a>>,
    implicit_parent: bool,
) -> Result<SelectorList<'a>, ParentizeError> {
    let Some(parents) = parents else {
        if child.has_parent_ref() {
            return Err(invalid(
                "top-level selectors may not contain the parent selector \"&\"",
            ));
        }
        return Ok(*child);
    };

    let mut members: Vec<Complex<'a>> = Vec::new();
    for complex in child.members {
        if complex.has_parent_ref() {
            members.extend(parentize_complex(arena, complex, parents)?);
        } else if implicit_parent {
            for parent in parents.members {
                let mut parts = parent.parts.to_vec();
                parts.extend_from_slice(complex.parts);
                members.push(Complex::new(alloc_slice(arena, &parts)));
            }
        } else {
            members.push(*complex);
        }
    }
    Ok(SelectorList::new(alloc_slice(arena, &members)))
}

fn parentize_complex<'a>(
    arena: &'a Arena,
    complex: &Complex<'a>,
    parents: &SelectorList<'a>,
) -> Result<Vec<Complex<'a>>, ParentizeError> {
    let mut alts: Vec<Seq<'a>> = vec![Vec::new()];
    for part in complex.parts {
        match part {
            ComplexPart::Combinator(_) => {
                for alt in &mut alts {
                    alt.push(*part);
                }
            }
            ComplexPart::Compound(compound) => {
                let has_direct = compound
                    .simples
                    .iter()
                    .any(|s| matches!(s, SimpleSelector::Parent));
                if has_direct {
                    let replacements = replace_parent_compound(arena, compound, parents)?;
                    let previous = std::mem::take(&mut alts);
                    for alt in &previous {
                        for replacement in &replacements {
                            let mut merged = alt.clone();
                            merged.extend(replacement.iter().copied());
                            alts.push(merged);
                        }
                    }
                } else {
                    let rewritten = rewrite_wrapped(arena, compound, parents)?;
                    for alt in &mut alts {
                        alt.push(ComplexPart::Compound(rewritten));
                    }
                }
            }
        }
    }
    Ok(alts
        .into_iter()
        .map(|seq| Complex::new(alloc_slice(arena, &seq)))
        .collect())
}

/// Expand one `&`-bearing compound against each parent, yielding one part
/// sequence per parent.
fn replace_parent_compound<'a>(
    arena: &'a Arena,
    compound: &Compound<'a>,
    parents: &SelectorList<'a>,
) -> Result<Vec<Seq<'a>>, ParentizeError> {
    let simples = compound.simples;
    let idx = simples
        .iter()
        .position(|s| matches!(s, SimpleSelector::Parent))
        .unwrap_or(0);
    let before: Vec<SimpleSelector<'a>> = rewrite_simples(arena, &simples[..idx], parents)?;
    let mut rest: Vec<SimpleSelector<'a>> = rewrite_simples(arena, &simples[idx + 1..], parents)?;
    if rest.iter().any(|s| matches!(s, SimpleSelector::Parent)) {
        return Err(invalid(
            "the parent selector \"&\" may appear only once per compound selector",
        ));
    }

    // `&-suffix` parses as a parent reference followed by a bare type token;
    // the suffix concatenates onto the parent's last simple selector.
    let suffix = match rest.first().copied() {
        Some(SimpleSelector::Type {
            ns: Namespace::None,
            name,
        }) => {
            rest.remove(0);
            Some(name)
        }
        _ => None,
    };

    let bare = before.is_empty() && rest.is_empty() && suffix.is_none();
    let mut out: Vec<Seq<'a>> = Vec::with_capacity(parents.len());
    for parent in parents.members {
        if bare {
            out.push(parent.parts.to_vec());
            continue;
        }

        let Some(last) = parent.last_compound() else {
            return Err(invalid(format!(
                "can't append to the parent selector \"{parent}\": it ends in a combinator",
            )));
        };

        let mut merged: Vec<SimpleSelector<'a>> = last.simples.to_vec();
        if let Some(suffix) = suffix {
            let appended = match merged.pop() {
                Some(SimpleSelector::Type { ns, name }) => SimpleSelector::Type {
                    ns,
                    name: alloc_str(arena, &format!("{name}{suffix}")),
                },
                Some(SimpleSelector::Class(name)) => {
                    SimpleSelector::Class(alloc_str(arena, &format!("{name}{suffix}")))
                }
                Some(SimpleSelector::Id(name)) => {
                    SimpleSelector::Id(alloc_str(arena, &format!("{name}{suffix}")))
                }
                Some(SimpleSelector::Placeholder(name)) => {
                    SimpleSelector::Placeholder(alloc_str(arena, &format!("{name}{suffix}")))
                }
                _ => {
                    return Err(invalid(format!(
                        "can't append \"{suffix}\" to the parent selector \"{parent}\"",
                    )));
                }
            };
            merged.push(appended);
        }
        merged.extend(before.iter().copied());
        merged.extend(rest.iter().copied());

        let mut parts: Seq<'a> = parent.parts[..parent.parts.len() - 1].to_vec();
        parts.push(ComplexPart::Compound(Compound::new(alloc_slice(
            arena, &merged,
        ))));
        out.push(parts);
    }
    Ok(out)
}

/// Resolve `&` inside wrapped-selector arguments (e.g. `:not(&)`).
fn rewrite_wrapped<'a>(
    arena: &'a Arena,
    compound: &Compound<'a>,
    parents: &SelectorList<'a>,
) -> Result<Compound<'a>, ParentizeError> {
    if !compound.has_parent_ref() {
        return Ok(*compound);
    }
    let simples = rewrite_simples(arena, compound.simples, parents)?;
    Ok(Compound::new(alloc_slice(arena, &simples)))
}

fn rewrite_simples<'a>(
    arena: &'a Arena,
    simples: &[SimpleSelector<'a>],
    parents: &SelectorList<'a>,
) -> Result<Vec<SimpleSelector<'a>>, ParentizeError> {
    simples
        .iter()
        .map(|simple| match simple {
            SimpleSelector::Wrapped { name, arg } if arg.has_parent_ref() => {
                let resolved = parentize(arena, arg, Some(parents), false)?;
                Ok(SimpleSelector::Wrapped {
                    name: *name,
                    arg: resolved,
                })
            }
            other => Ok(*other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parse::parse_selector;

    fn resolve(child: &str, parent: Option<&str>) -> Result<String, ParentizeError> {
        let arena = Arena::default();
        let child = parse_selector(&arena, child).unwrap();
        let parent = parent.map(|p| parse_selector(&arena, p).unwrap());
        parentize(&arena, &child, parent.as_ref(), true).map(|list| list.to_string())
    }

    #[test]
    fn implicit_parent_prefixes() {
        assert_eq!(resolve(".c", Some(".a, .b")).unwrap(), ".a .c, .b .c");
        assert_eq!(resolve("> b", Some("a")).unwrap(), "a > b");
    }

    #[test]
    fn explicit_parent_suffix_compound() {
        assert_eq!(resolve("&.bar", Some(".foo")).unwrap(), ".foo.bar");
        assert_eq!(resolve("&.x", Some("a > b")).unwrap(), "a > b.x");
        assert_eq!(resolve("&:hover", Some(".a .b")).unwrap(), ".a .b:hover");
    }

    #[test]
    fn name_suffix_concatenation() {
        assert_eq!(resolve("&-bar", Some(".foo")).unwrap(), ".foo-bar");
        assert_eq!(resolve("&-bar", Some("div")).unwrap(), "div-bar");
        assert_eq!(resolve("&-bar", Some("%ph")).unwrap(), "%ph-bar");
    }

    #[test]
    fn bare_parent_keeps_tail() {
        assert_eq!(resolve("& .c", Some(".a .b")).unwrap(), ".a .b .c");
        assert_eq!(resolve("& + &", Some(".x")).unwrap(), ".x + .x");
    }

    #[test]
    fn cartesian_product_order() {
        assert_eq!(
            resolve("&.x, &.y", Some(".a, .b")).unwrap(),
            ".a.x, .b.x, .a.y, .b.y"
        );
    }

    #[test]
    fn wrapped_arguments_resolve() {
        assert_eq!(resolve(":not(&)", Some(".a")).unwrap(), ":not(.a)");
    }

    #[test]
    fn errors() {
        assert!(resolve("&.x", None).is_err());
        assert!(resolve("&.x", Some("a >")).is_err());
        assert_eq!(resolve(".plain", None).unwrap(), ".plain");
    }

    #[test]
    fn no_parent_ref_yields_one_result_per_parent() {
        let arena = Arena::default();
        let child = parse_selector(&arena, ".c").unwrap();
        let parents = parse_selector(&arena, ".a, .b > i, #z").unwrap();
        let resolved = parentize(&arena, &child, Some(&parents), true).unwrap();
        assert_eq!(resolved.len(), parents.len());
        for (i, parent) in parents.members.iter().enumerate() {
            assert_eq!(resolved.members[i].to_string(), format!("{parent} .c"));
        }
    }
}
