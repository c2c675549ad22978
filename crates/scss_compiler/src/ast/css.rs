//! The output tree: plain CSS statements produced by the evaluator,
//! transformed by the extender and consumed by the printer.
//!
//! Nothing here contains an unevaluated expression. Selector lists are plain
//! lists of complex selectors; declaration values are [`Value`]s so the
//! printer can apply style-dependent formatting (short hex colors, trimmed
//! zeros) at output time.

use crate::diagnostic::SourceSpan;
use crate::selector::SelectorList;

use super::value::Value;

/// A fully evaluated CSS statement.
#[derive(Debug, Clone, Copy)]
pub enum CssStmt<'a> {
    /// A style rule with its flattened selector list.
    Rule {
        selector: SelectorList<'a>,
        body: &'a [CssStmt<'a>],
        span: SourceSpan,
    },
    /// A declaration inside a rule body.
    Decl {
        property: &'a str,
        value: Value<'a>,
        span: SourceSpan,
    },
    /// `@media query { ... }`, already bubbled to the top level.
    Media {
        query: &'a str,
        body: &'a [CssStmt<'a>],
        span: SourceSpan,
    },
    /// `@supports condition { ... }`, already bubbled.
    Supports {
        condition: &'a str,
        body: &'a [CssStmt<'a>],
        span: SourceSpan,
    },
    /// Any other at-rule, including `@keyframes`. Keyframe frame blocks are
    /// `Rule`s whose "selectors" are the frame names (`from`, `50%`).
    AtRule {
        keyword: &'a str,
        value: Option<&'a str>,
        body: Option<&'a [CssStmt<'a>]>,
        span: SourceSpan,
    },
    /// A plain CSS `@import`, hoisted to the top of the output.
    Import { text: &'a str, span: SourceSpan },
    /// A comment that survived evaluation.
    Comment {
        text: &'a str,
        loud: bool,
        span: SourceSpan,
    },
}

impl CssStmt<'_> {
    pub fn span(&self) -> SourceSpan {
        match self {
            CssStmt::Rule { span, .. }
            | CssStmt::Decl { span, .. }
            | CssStmt::Media { span, .. }
            | CssStmt::Supports { span, .. }
            | CssStmt::AtRule { span, .. }
            | CssStmt::Import { span, .. }
            | CssStmt::Comment { span, .. } => *span,
        }
    }

    /// Statements that must be emitted inside the enclosing braces.
    pub fn is_declaration_like(&self) -> bool {
        matches!(self, CssStmt::Decl { .. } | CssStmt::Comment { .. })
    }
}

/// True when `body` contains statements that print inside the rule's braces.
pub fn has_non_hoistable(body: &[CssStmt<'_>]) -> bool {
    body.iter().any(CssStmt::is_declaration_like)
}

/// True when `body` contains nested blocks that surface outside the braces.
pub fn has_hoistable(body: &[CssStmt<'_>]) -> bool {
    body.iter().any(|s| !s.is_declaration_like())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::value::{Str, Value};

    #[test]
    fn hoistable_flags() {
        let decl = CssStmt::Decl {
            property: "color",
            value: Value::String(Str::unquoted("red")),
            span: SourceSpan::default(),
        };
        let media = CssStmt::Media {
            query: "screen",
            body: &[],
            span: SourceSpan::default(),
        };
        assert!(has_non_hoistable(&[decl, media]));
        assert!(has_hoistable(&[decl, media]));
        assert!(!has_hoistable(&[decl]));
        assert!(!has_non_hoistable(&[media]));
    }
}
