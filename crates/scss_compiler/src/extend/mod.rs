//! The `@extend` engine.
//!
//! Takes the evaluator's output tree plus the recorded extend requests and
//! rewrites every rule's selector list: wherever an extendee compound is
//! contained in a compound of the rule, a new complex selector is produced
//! with the extender's last compound unified in and its prefix woven in on
//! the left. Newly produced selectors are re-scanned so chains of extends
//! propagate; a per-rule seen set of canonical forms breaks cycles.
//!
//! After extension, selectors that consist solely of placeholders are
//! dropped, along with rules whose entire list became invisible.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::{Arena, alloc_slice};
use crate::ast::css::CssStmt;
use crate::diagnostic::{CompileError, ErrorKind};
use crate::eval::ExtendRequest;
use crate::selector::unify::{minus, unify_compound};
use crate::selector::weave::weave;
use crate::selector::{Complex, ComplexPart, Compound, SelectorList};

/// Apply the recorded extend requests across the tree.
pub fn extend<'a>(
    arena: &'a Arena,
    stmts: &[CssStmt<'a>],
    requests: &[ExtendRequest<'a>],
) -> Result<Vec<CssStmt<'a>>, CompileError> {
    let mut extender = Extender {
        arena,
        requests,
        by_simple: build_map(requests),
        matched: vec![false; requests.len()],
    };

    let extended = extender.walk(stmts, None)?;

    for (i, request) in requests.iter().enumerate() {
        if !extender.matched[i] && !request.optional {
            return Err(CompileError::new(
                ErrorKind::FailedExtend,
                format!(
                    "\"{}\" failed to @extend \"{}\": the target selector was not found; \
                     use \"@extend {} !optional\" to avoid this error",
                    request.extender, request.extendee, request.extendee,
                ),
                request.span,
            ));
        }
    }

    Ok(prune(arena, &extended))
}

/// The extend map: canonical simple-selector string → request indices, in
/// textual order. Lookup is by exact simple, never by containment.
fn build_map(requests: &[ExtendRequest<'_>]) -> FxHashMap<String, Vec<usize>> {
    let mut map: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (i, request) in requests.iter().enumerate() {
        for simple in request.extendee.simples {
            map.entry(simple.to_string()).or_default().push(i);
        }
    }
    map
}

struct Extender<'r, 'a> {
    arena: &'a Arena,
    requests: &'r [ExtendRequest<'a>],
    by_simple: FxHashMap<String, Vec<usize>>,
    matched: Vec<bool>,
}

impl<'a> Extender<'_, 'a> {
    fn walk(
        &mut self,
        stmts: &[CssStmt<'a>],
        media: Option<&str>,
    ) -> Result<Vec<CssStmt<'a>>, CompileError> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            match stmt {
                CssStmt::Rule {
                    selector,
                    body,
                    span,
                } => {
                    let extended = self.extend_list(selector, media)?;
                    out.push(CssStmt::Rule {
                        selector: extended,
                        body: *body,
                        span: *span,
                    });
                }
                CssStmt::Media { query, body, span } => {
                    let inner = self.walk(body, Some(*query))?;
                    out.push(CssStmt::Media {
                        query: *query,
                        body: alloc_slice(self.arena, &inner),
                        span: *span,
                    });
                }
                CssStmt::Supports {
                    condition,
                    body,
                    span,
                } => {
                    let inner = self.walk(body, media)?;
                    out.push(CssStmt::Supports {
                        condition: *condition,
                        body: alloc_slice(self.arena, &inner),
                        span: *span,
                    });
                }
                // Keyframe blocks and other at-rule bodies are opaque to
                // extension.
                other => out.push(*other),
            }
        }
        Ok(out)
    }

    /// Expand one rule's selector list. Freshly produced selectors are
    /// appended and re-scanned until nothing new appears.
    fn extend_list(
        &mut self,
        selector: &SelectorList<'a>,
        media: Option<&str>,
    ) -> Result<SelectorList<'a>, CompileError> {
        let mut result: Vec<Complex<'a>> = selector.members.to_vec();
        let mut seen: FxHashSet<String> =
            result.iter().map(ToString::to_string).collect();

        let mut i = 0;
        while i < result.len() {
            let complex = result[i];
            i += 1;

            for (part_index, part) in complex.parts.iter().enumerate() {
                let ComplexPart::Compound(compound) = part else {
                    continue;
                };
                for simple in compound.simples {
                    let Some(indices) = self.by_simple.get(&simple.to_string()) else {
                        continue;
                    };
                    let indices = indices.clone();
                    for request_index in indices {
                        let request = &self.requests[request_index];
                        if !contains_compound(compound, &request.extendee) {
                            continue;
                        }
                        self.matched[request_index] = true;

                        if request.media_key.as_deref() != media {
                            if request.optional {
                                continue;
                            }
                            return Err(CompileError::new(
                                ErrorKind::ExtendAcrossMedia,
                                format!(
                                    "@extend \"{}\" may not cross media boundaries \
                                     (extender is in {:?}, target in {:?})",
                                    request.extendee,
                                    request.media_key.as_deref().unwrap_or("the top level"),
                                    media.unwrap_or("the top level"),
                                ),
                                request.span,
                            ));
                        }

                        let Some(extender_last) = request.extender.last_compound() else {
                            continue;
                        };
                        let unified = match minus(self.arena, compound, &request.extendee) {
                            Some(remainder) => {
                                unify_compound(self.arena, &remainder, &extender_last)
                            }
                            None => Some(extender_last),
                        };
                        let Some(unified) = unified else {
                            continue;
                        };

                        let prefix = complex.parts[..part_index].to_vec();
                        let mut extender_path: Vec<ComplexPart<'a>> = request.extender.parts
                            [..request.extender.parts.len() - 1]
                            .to_vec();
                        extender_path.push(ComplexPart::Compound(unified));

                        for woven in weave(self.arena, &[prefix, extender_path]) {
                            let mut parts = woven;
                            parts.extend_from_slice(&complex.parts[part_index + 1..]);
                            let produced = Complex::new(alloc_slice(self.arena, &parts));
                            let canonical = produced.to_string();
                            if seen.contains(&canonical) {
                                continue;
                            }
                            seen.insert(canonical);
                            result.push(produced);
                        }
                    }
                }
            }
        }

        Ok(SelectorList::new(alloc_slice(self.arena, &result)))
    }
}

/// `b` ⊆ `a` by canonical string equality.
fn contains_compound(a: &Compound<'_>, b: &Compound<'_>) -> bool {
    let a_strings: Vec<String> = a.simples.iter().map(ToString::to_string).collect();
    b.simples
        .iter()
        .all(|s| a_strings.contains(&s.to_string()))
}

/// Drop placeholder-only selectors and the rules/blocks they leave empty.
fn prune<'a>(arena: &'a Arena, stmts: &[CssStmt<'a>]) -> Vec<CssStmt<'a>> {
    let mut out = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        match stmt {
            CssStmt::Rule {
                selector,
                body,
                span,
            } => {
                let visible: Vec<Complex<'a>> = selector
                    .members
                    .iter()
                    .filter(|c| !c.is_invisible())
                    .copied()
                    .collect();
                if visible.is_empty() {
                    continue;
                }
                if visible.len() == selector.members.len() {
                    out.push(*stmt);
                } else {
                    out.push(CssStmt::Rule {
                        selector: SelectorList::new(alloc_slice(arena, &visible)),
                        body: *body,
                        span: *span,
                    });
                }
            }
            CssStmt::Media { query, body, span } => {
                let inner = prune(arena, body);
                if inner.is_empty() {
                    continue;
                }
                out.push(CssStmt::Media {
                    query: *query,
                    body: alloc_slice(arena, &inner),
                    span: *span,
                });
            }
            CssStmt::Supports {
                condition,
                body,
                span,
            } => {
                let inner = prune(arena, body);
                if inner.is_empty() {
                    continue;
                }
                out.push(CssStmt::Supports {
                    condition: *condition,
                    body: alloc_slice(arena, &inner),
                    span: *span,
                });
            }
            other => out.push(*other),
        }
    }
    out
}
