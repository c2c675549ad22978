//! Complex-selector unification: the weave.
//!
//! `unify_complex(a, b)` produces every selector that matches exactly the
//! elements matched by both `a` and `b`. The final compounds unify directly;
//! the prefixes merge through `weave`/`subweave`, which generates every
//! descendant-respecting interleaving of two chains:
//!
//! 1. leading combinator runs merge when one is a subsequence of the other,
//! 2. trailing combinator/compound runs merge pairwise per the combinator
//!    table (`~` absorbs `+`, `>` defers, equal combinators unify their
//!    compounds),
//! 3. the remaining prefixes are aligned on their longest common subsequence
//!    of selector groups, with the non-common chunks contributing both
//!    concatenation orders.
//!
//! The extender reuses `weave` to splice an extender's prefix into the
//! selector being extended.

use crate::arena::{Arena, alloc_slice};

use super::ordering::complex_cmp;
use super::superselector::{compound_is_superselector, parent_superselector};
use super::unify::unify_compound;
use super::{Combinator, Complex, ComplexPart, SelectorList};

/// A flat run of selector parts, built up before being committed to the
/// arena.
pub(crate) type Seq<'a> = Vec<ComplexPart<'a>>;

/// A group: one compound plus any combinator-glued neighbors.
type Group<'a> = Vec<ComplexPart<'a>>;

/// One alternative sequence at a merge point.
type Alt<'a> = Vec<ComplexPart<'a>>;

/// The alternatives available at one merge point.
type Choice<'a> = Vec<Alt<'a>>;

/// Unify two complex selectors into the list of their valid interleavings,
/// or `None` when their final compounds cannot coexist.
pub fn unify_complex<'a>(
    arena: &'a Arena,
    a: &Complex<'a>,
    b: &Complex<'a>,
) -> Option<SelectorList<'a>> {
    let base_a = a.last_compound()?;
    let base_b = b.last_compound()?;
    let unified = unify_compound(arena, &base_a, &base_b)?;

    let prefix_a: Seq<'a> = a.parts[..a.parts.len() - 1].to_vec();
    let mut prefix_b: Seq<'a> = b.parts[..b.parts.len() - 1].to_vec();
    prefix_b.push(ComplexPart::Compound(unified));

    let woven = weave(arena, &[prefix_a, prefix_b]);
    if woven.is_empty() {
        return None;
    }
    let members: Vec<Complex<'a>> = woven
        .iter()
        .map(|seq| Complex::new(alloc_slice(arena, seq)))
        .collect();
    Some(SelectorList::new(alloc_slice(arena, &members)))
}

/// Merge a list of chains front to back: each chain's prefix is subwoven
/// into the accumulated prefixes and its final compound is carried along
/// unchanged. Results are deduplicated and ordered by length, then by
/// canonical order.
pub fn weave<'a>(arena: &'a Arena, complexes: &[Seq<'a>]) -> Vec<Seq<'a>> {
    let mut prefixes: Vec<Seq<'a>> = vec![complexes.first().cloned().unwrap_or_default()];

    for complex in complexes.iter().skip(1) {
        let Some((target, parents)) = complex.split_last() else {
            continue;
        };
        if parents.is_empty() {
            for prefix in &mut prefixes {
                prefix.push(*target);
            }
            continue;
        }

        let mut new_prefixes = Vec::new();
        for prefix in &prefixes {
            if let Some(subs) = subweave(arena, prefix, parents) {
                for mut sub in subs {
                    sub.push(*target);
                    new_prefixes.push(sub);
                }
            }
        }
        prefixes = new_prefixes;
    }

    let mut result: Vec<Seq<'a>> = Vec::new();
    for seq in prefixes {
        if !result.contains(&seq) {
            result.push(seq);
        }
    }
    result.sort_by(|x, y| {
        x.len().cmp(&y.len()).then_with(|| {
            complex_cmp(&Complex { parts: x }, &Complex { parts: y })
        })
    });
    result
}

/// Every descendant-respecting merge of two part sequences, or `None` when
/// their trailing combinators are incompatible.
fn subweave<'a>(
    arena: &'a Arena,
    seq1: &[ComplexPart<'a>],
    seq2: &[ComplexPart<'a>],
) -> Option<Vec<Seq<'a>>> {
    if seq1.is_empty() {
        return Some(vec![seq2.to_vec()]);
    }
    if seq2.is_empty() {
        return Some(vec![seq1.to_vec()]);
    }

    let mut s1 = seq1.to_vec();
    let mut s2 = seq2.to_vec();
    let init = merge_initial_ops(&mut s1, &mut s2)?;
    let fin = merge_final_ops(arena, &mut s1, &mut s2)?;

    let mut groups1 = group_selectors(&s1);
    let mut groups2 = group_selectors(&s2);
    let mut lcs = lcs_groups(&groups2, &groups1);

    let mut choices: Vec<Choice<'a>> = vec![vec![init]];
    while !lcs.is_empty() {
        let shared = lcs.remove(0);
        choices.push(chunks(&mut groups1, &mut groups2, |s| {
            s.first().is_none_or(|g| parent_superselector(g, &shared))
        }));
        choices.push(vec![shared]);
        if !groups1.is_empty() {
            groups1.remove(0);
        }
        if !groups2.is_empty() {
            groups2.remove(0);
        }
    }
    choices.push(chunks(&mut groups1, &mut groups2, |s| s.is_empty()));
    choices.extend(fin);
    choices.retain(|choice| !choice.is_empty());

    Some(paths(&choices))
}

/// Merge leading combinator runs. Mergeable only when one run is a
/// subsequence of the other; the longer run wins.
fn merge_initial_ops<'a>(s1: &mut Seq<'a>, s2: &mut Seq<'a>) -> Option<Alt<'a>> {
    let mut ops1: Vec<ComplexPart<'a>> = Vec::new();
    while matches!(s1.first(), Some(p) if p.is_combinator()) {
        ops1.push(s1.remove(0));
    }
    let mut ops2: Vec<ComplexPart<'a>> = Vec::new();
    while matches!(s2.first(), Some(p) if p.is_combinator()) {
        ops2.push(s2.remove(0));
    }

    let lcs = lcs_parts(&ops1, &ops2);
    if lcs == ops1 {
        Some(ops2)
    } else if lcs == ops2 {
        Some(ops1)
    } else {
        None
    }
}

/// Merge trailing combinator/compound runs pairwise, producing ordered
/// choices for the tail of every woven result.
fn merge_final_ops<'a>(
    arena: &'a Arena,
    s1: &mut Seq<'a>,
    s2: &mut Seq<'a>,
) -> Option<Vec<Choice<'a>>> {
    use Combinator::{Child, FollowingSibling, NextSibling};

    let mut res: Vec<Choice<'a>> = Vec::new();
    loop {
        // Trailing combinators, innermost first.
        let mut ops1: Vec<Combinator> = Vec::new();
        while let Some(ComplexPart::Combinator(op)) = s1.last() {
            ops1.push(*op);
            s1.pop();
        }
        let mut ops2: Vec<Combinator> = Vec::new();
        while let Some(ComplexPart::Combinator(op)) = s2.last() {
            ops2.push(*op);
            s2.pop();
        }

        if ops1.is_empty() && ops2.is_empty() {
            return Some(res);
        }

        if ops1.len() > 1 || ops2.len() > 1 {
            // Multiple trailing operators only merge when one run is a
            // subsequence of the other.
            let lcs = lcs_combinators(&ops1, &ops2);
            if lcs != ops1 && lcs != ops2 {
                return None;
            }
            let winner = if ops1.len() > ops2.len() { &ops1 } else { &ops2 };
            let alt: Alt<'a> = winner
                .iter()
                .rev()
                .map(|op| ComplexPart::Combinator(*op))
                .collect();
            res.insert(0, vec![alt]);
            return Some(res);
        }

        match (ops1.first().copied(), ops2.first().copied()) {
            (Some(op1), Some(op2)) => {
                let Some(ComplexPart::Compound(sel1)) = s1.pop() else {
                    return None;
                };
                let Some(ComplexPart::Compound(sel2)) = s2.pop() else {
                    return None;
                };
                match (op1, op2) {
                    (FollowingSibling, FollowingSibling) => {
                        if compound_is_superselector(&sel1, &sel2, None) {
                            res.insert(
                                0,
                                vec![vec![
                                    ComplexPart::Compound(sel2),
                                    ComplexPart::Combinator(FollowingSibling),
                                ]],
                            );
                        } else if compound_is_superselector(&sel2, &sel1, None) {
                            res.insert(
                                0,
                                vec![vec![
                                    ComplexPart::Compound(sel1),
                                    ComplexPart::Combinator(FollowingSibling),
                                ]],
                            );
                        } else {
                            let mut alts = vec![
                                vec![
                                    ComplexPart::Compound(sel1),
                                    ComplexPart::Combinator(FollowingSibling),
                                    ComplexPart::Compound(sel2),
                                    ComplexPart::Combinator(FollowingSibling),
                                ],
                                vec![
                                    ComplexPart::Compound(sel2),
                                    ComplexPart::Combinator(FollowingSibling),
                                    ComplexPart::Compound(sel1),
                                    ComplexPart::Combinator(FollowingSibling),
                                ],
                            ];
                            if let Some(merged) = unify_compound(arena, &sel1, &sel2) {
                                alts.push(vec![
                                    ComplexPart::Compound(merged),
                                    ComplexPart::Combinator(FollowingSibling),
                                ]);
                            }
                            res.insert(0, alts);
                        }
                    }
                    (FollowingSibling, NextSibling) | (NextSibling, FollowingSibling) => {
                        let (tilde_sel, plus_sel) = if op1 == FollowingSibling {
                            (sel1, sel2)
                        } else {
                            (sel2, sel1)
                        };
                        if compound_is_superselector(&tilde_sel, &plus_sel, None) {
                            res.insert(
                                0,
                                vec![vec![
                                    ComplexPart::Compound(plus_sel),
                                    ComplexPart::Combinator(NextSibling),
                                ]],
                            );
                        } else {
                            let mut alts = vec![vec![
                                ComplexPart::Compound(tilde_sel),
                                ComplexPart::Combinator(FollowingSibling),
                                ComplexPart::Compound(plus_sel),
                                ComplexPart::Combinator(NextSibling),
                            ]];
                            if let Some(merged) = unify_compound(arena, &tilde_sel, &plus_sel) {
                                alts.push(vec![
                                    ComplexPart::Compound(merged),
                                    ComplexPart::Combinator(NextSibling),
                                ]);
                            }
                            res.insert(0, alts);
                        }
                    }
                    (Child, FollowingSibling | NextSibling) => {
                        res.insert(
                            0,
                            vec![vec![
                                ComplexPart::Compound(sel2),
                                ComplexPart::Combinator(op2),
                            ]],
                        );
                        s1.push(ComplexPart::Compound(sel1));
                        s1.push(ComplexPart::Combinator(op1));
                    }
                    (FollowingSibling | NextSibling, Child) => {
                        res.insert(
                            0,
                            vec![vec![
                                ComplexPart::Compound(sel1),
                                ComplexPart::Combinator(op1),
                            ]],
                        );
                        s2.push(ComplexPart::Compound(sel2));
                        s2.push(ComplexPart::Combinator(op2));
                    }
                    _ if op1 == op2 => {
                        let merged = unify_compound(arena, &sel1, &sel2)?;
                        res.insert(
                            0,
                            vec![vec![
                                ComplexPart::Compound(merged),
                                ComplexPart::Combinator(op1),
                            ]],
                        );
                    }
                    _ => return None,
                }
            }
            (Some(op1), None) => {
                if op1 == Child {
                    let last1 = s1.last().and_then(ComplexPart::as_compound);
                    let last2 = s2.last().and_then(ComplexPart::as_compound);
                    if let (Some(l1), Some(l2)) = (last1, last2) {
                        if compound_is_superselector(&l2, &l1, None) {
                            s2.pop();
                        }
                    }
                }
                let sel1 = s1.pop()?;
                res.insert(0, vec![vec![sel1, ComplexPart::Combinator(op1)]]);
            }
            (None, Some(op2)) => {
                if op2 == Child {
                    let last1 = s1.last().and_then(ComplexPart::as_compound);
                    let last2 = s2.last().and_then(ComplexPart::as_compound);
                    if let (Some(l1), Some(l2)) = (last1, last2) {
                        if compound_is_superselector(&l1, &l2, None) {
                            s1.pop();
                        }
                    }
                }
                let sel2 = s2.pop()?;
                res.insert(0, vec![vec![sel2, ComplexPart::Combinator(op2)]]);
            }
            (None, None) => return Some(res),
        }
    }
}

/// Group a flat sequence so that combinator-glued runs travel as one unit.
fn group_selectors<'a>(seq: &[ComplexPart<'a>]) -> Vec<Group<'a>> {
    let mut groups = Vec::new();
    let mut i = 0;
    while i < seq.len() {
        let mut head: Group<'a> = vec![seq[i]];
        i += 1;
        while i < seq.len()
            && (head.last().is_some_and(ComplexPart::is_combinator) || seq[i].is_combinator())
        {
            head.push(seq[i]);
            i += 1;
        }
        groups.push(head);
    }
    groups
}

/// Pull elements off both sequences until `done`, returning the two
/// concatenation orders of the removed chunks.
fn chunks<'a>(
    seq1: &mut Vec<Group<'a>>,
    seq2: &mut Vec<Group<'a>>,
    done: impl Fn(&[Group<'a>]) -> bool,
) -> Choice<'a> {
    let mut chunk1: Vec<Group<'a>> = Vec::new();
    while !done(seq1) {
        chunk1.push(seq1.remove(0));
    }
    let mut chunk2: Vec<Group<'a>> = Vec::new();
    while !done(seq2) {
        chunk2.push(seq2.remove(0));
    }

    match (chunk1.is_empty(), chunk2.is_empty()) {
        (true, true) => vec![Vec::new()],
        (true, false) => vec![flatten_groups(&chunk2)],
        (false, true) => vec![flatten_groups(&chunk1)],
        (false, false) => {
            let mut order1 = flatten_groups(&chunk1);
            order1.extend(flatten_groups(&chunk2));
            let mut order2 = flatten_groups(&chunk2);
            order2.extend(flatten_groups(&chunk1));
            if order1 == order2 {
                vec![order1]
            } else {
                vec![order1, order2]
            }
        }
    }
}

fn flatten_groups<'a>(groups: &[Group<'a>]) -> Alt<'a> {
    groups.iter().flatten().copied().collect()
}

/// Cartesian product of the choices, concatenated into flat sequences.
fn paths<'a>(choices: &[Choice<'a>]) -> Vec<Seq<'a>> {
    let mut acc: Vec<Seq<'a>> = vec![Vec::new()];
    for choice in choices {
        let mut next = Vec::with_capacity(acc.len() * choice.len());
        for prefix in &acc {
            for alt in choice {
                let mut merged = prefix.clone();
                merged.extend(alt.iter().copied());
                next.push(merged);
            }
        }
        acc = next;
    }
    acc
}

/// Longest common subsequence of selector groups. Two groups align when they
/// are equal or one "parent-superselects" the other, in which case the more
/// specific group is kept.
fn lcs_groups<'a>(x: &[Group<'a>], y: &[Group<'a>]) -> Vec<Group<'a>> {
    fn select<'a>(s1: &Group<'a>, s2: &Group<'a>) -> Option<Group<'a>> {
        if s1 == s2 {
            return Some(s1.clone());
        }
        if !matches!(s1.first(), Some(ComplexPart::Compound(_)))
            || !matches!(s2.first(), Some(ComplexPart::Compound(_)))
        {
            return None;
        }
        if parent_superselector(s1, s2) {
            return Some(s2.clone());
        }
        if parent_superselector(s2, s1) {
            return Some(s1.clone());
        }
        None
    }

    let n = x.len();
    let m = y.len();
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            table[i][j] = if select(&x[i - 1], &y[j - 1]).is_some() {
                table[i - 1][j - 1] + 1
            } else {
                table[i][j - 1].max(table[i - 1][j])
            };
        }
    }

    let mut result: Vec<Group<'a>> = Vec::new();
    let mut i = n;
    let mut j = m;
    while i > 0 && j > 0 {
        if let Some(chosen) = select(&x[i - 1], &y[j - 1]) {
            result.push(chosen);
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] > table[i - 1][j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }
    result.reverse();
    result
}

/// Plain LCS over parts, used for leading combinator runs.
fn lcs_parts<'a>(x: &[ComplexPart<'a>], y: &[ComplexPart<'a>]) -> Vec<ComplexPart<'a>> {
    lcs_generic(x, y)
}

/// Plain LCS over combinators, used for trailing runs.
fn lcs_combinators(x: &[Combinator], y: &[Combinator]) -> Vec<Combinator> {
    lcs_generic(x, y)
}

fn lcs_generic<T: PartialEq + Copy>(x: &[T], y: &[T]) -> Vec<T> {
    let n = x.len();
    let m = y.len();
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            table[i][j] = if x[i - 1] == y[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i][j - 1].max(table[i - 1][j])
            };
        }
    }
    let mut result = Vec::new();
    let mut i = n;
    let mut j = m;
    while i > 0 && j > 0 {
        if x[i - 1] == y[j - 1] {
            result.push(x[i - 1]);
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] > table[i - 1][j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parse::parse_selector;

    fn unify_strings(a: &str, b: &str) -> Option<Vec<String>> {
        let arena = Arena::default();
        let a = parse_selector(&arena, a).unwrap().members[0];
        let b = parse_selector(&arena, b).unwrap().members[0];
        unify_complex(&arena, &a, &b)
            .map(|list| list.members.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn unifies_final_compounds() {
        assert_eq!(unify_strings(".x", ".y").unwrap(), vec![".x.y"]);
        assert_eq!(unify_strings("a", "b"), None);
        assert_eq!(unify_strings("a.x", "a.y").unwrap(), vec!["a.x.y"]);
    }

    #[test]
    fn weaves_distinct_ancestors_both_ways() {
        assert_eq!(
            unify_strings("a .x", "b .y").unwrap(),
            vec!["a b .x.y", "b a .x.y"]
        );
    }

    #[test]
    fn shared_ancestors_collapse() {
        assert_eq!(unify_strings(".foo .x", ".foo .y").unwrap(), vec![".foo .x.y"]);
    }

    #[test]
    fn superselector_ancestors_keep_the_specific_one() {
        // `.foo.bar` is a subselector of `.foo`, so the merged ancestor is
        // just `.foo.bar`.
        assert_eq!(
            unify_strings(".foo .x", ".foo.bar .x").unwrap(),
            vec![".foo.bar .x"]
        );
    }

    #[test]
    fn trailing_combinators_merge() {
        assert_eq!(unify_strings("a + .x", ".y").unwrap(), vec!["a + .x.y"]);
        assert_eq!(
            unify_strings(".a ~ .x", ".b + .x").unwrap(),
            vec![".a.b + .x", ".a ~ .b + .x"]
        );
        assert_eq!(
            unify_strings(".a > .x", ".b .x").unwrap(),
            vec![".b .a > .x"]
        );
    }

    #[test]
    fn child_combinators_must_agree() {
        assert_eq!(unify_strings("a > .x", "b > .x"), None);
        assert_eq!(
            unify_strings(".a > .x", ".b > .x").unwrap(),
            vec![".a.b > .x"]
        );
    }

    #[test]
    fn weave_keeps_targets_in_place() {
        let arena = Arena::default();
        let lhs = parse_selector(&arena, "a c").unwrap().members[0]
            .parts
            .to_vec();
        let rhs = parse_selector(&arena, "b c").unwrap().members[0]
            .parts
            .to_vec();
        let woven = weave(&arena, &[lhs, rhs]);
        let rendered: Vec<String> = woven
            .iter()
            .map(|seq| Complex { parts: seq }.to_string())
            .collect();
        assert_eq!(rendered, vec!["a c b c", "b a c c"]);
    }
}
