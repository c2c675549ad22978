//! The CSS printer.
//!
//! Walks the post-extender tree and emits CSS in one of four output styles,
//! optionally pairing every selector and declaration written with a source
//! map entry.
//!
//! This module is split into focused submodules:
//!
//! - [`format`] — number/string/color/value formatting
//! - `sourcemap_builder` — generated-position tracking over `oxc_sourcemap`

pub mod format;
pub(crate) mod sourcemap_builder;

use crate::SourceFile;
use crate::ast::css::CssStmt;
use crate::ast::value::Value;
use crate::diagnostic::{CompileError, ErrorKind, SourceSpan};
use crate::options::{CompileOptions, OutputStyle};
use crate::selector::SelectorList;

use sourcemap_builder::SourcemapBuilder;

/// Printed output: the CSS text and, when enabled, the source map JSON.
pub struct PrintResult {
    pub css: String,
    pub map: Option<String>,
}

/// Print an evaluated and extended tree.
pub fn print(
    stmts: &[CssStmt<'_>],
    options: &CompileOptions,
    sources: &[SourceFile],
) -> Result<PrintResult, CompileError> {
    let mut printer = Printer {
        options,
        sources,
        out: String::new(),
        indent: 0,
        map: options.source_map.then(|| SourcemapBuilder::new(sources)),
    };

    // Plain CSS imports print before everything else.
    let (imports, body): (Vec<&CssStmt<'_>>, Vec<&CssStmt<'_>>) = stmts
        .iter()
        .partition(|s| matches!(s, CssStmt::Import { .. }));
    for import in &imports {
        if let CssStmt::Import { text, span } = import {
            printer.write_indent();
            printer.write_mapped("@import", *span);
            printer.write(" ");
            printer.write(text);
            printer.write(";");
            printer.newline();
        }
    }

    let body: Vec<CssStmt<'_>> = body.into_iter().copied().collect();
    printer.print_block_list(&body)?;

    let mut css = printer.out;

    // Make sure non-empty output ends with exactly one linefeed.
    if !css.is_empty() && !css.ends_with('\n') {
        css.push('\n');
    }

    // Non-ASCII output declares its encoding up front.
    if !css.is_ascii() {
        if options.output_style.is_compressed() {
            css.insert(0, '\u{FEFF}');
        } else {
            css.insert_str(0, "@charset \"UTF-8\";\n");
        }
    }

    let map = printer.map.map(SourcemapBuilder::into_sourcemap);
    let map_json = map.map(|m| m.to_json_string());
    if map_json.is_some() && !options.omit_source_map_url {
        let url = options.source_map_file.clone().unwrap_or_else(|| {
            sources
                .first()
                .map(|s| format!("{}.map", s.name))
                .unwrap_or_else(|| "stylesheet.css.map".to_string())
        });
        css.push_str(&format!("/*# sourceMappingURL={url} */\n"));
    }

    Ok(PrintResult { css, map: map_json })
}

struct Printer<'o> {
    options: &'o CompileOptions,
    sources: &'o [SourceFile],
    out: String,
    indent: usize,
    map: Option<SourcemapBuilder>,
}

impl Printer<'_> {
    fn style(&self) -> OutputStyle {
        self.options.output_style
    }

    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn write_mapped(&mut self, text: &str, span: SourceSpan) {
        if let Some(map) = &mut self.map {
            map.add_mapping(&self.out, span);
        }
        self.out.push_str(text);
    }

    fn write_indent(&mut self) {
        if !self.style().is_compressed() {
            for _ in 0..self.indent {
                self.out.push_str("  ");
            }
        }
    }

    fn newline(&mut self) {
        if !self.style().is_compressed() {
            self.out.push('\n');
        }
    }

    /// A statement produces output: rules need a non-empty body, nested
    /// blocks need a printable child, comments depend on the style.
    fn is_printable(&self, stmt: &CssStmt<'_>) -> bool {
        match stmt {
            CssStmt::Rule { selector, body, .. } => {
                !selector.is_empty() && body.iter().any(|s| self.is_printable(s))
            }
            CssStmt::Media { body, .. } | CssStmt::Supports { body, .. } => {
                body.iter().any(|s| self.is_printable(s))
            }
            CssStmt::AtRule { .. } | CssStmt::Decl { .. } | CssStmt::Import { .. } => true,
            CssStmt::Comment { loud, .. } => *loud || !self.style().is_compressed(),
        }
    }

    /// Print a list of sibling statements. In expanded style, block
    /// statements are separated by one blank line.
    fn print_block_list(&mut self, stmts: &[CssStmt<'_>]) -> Result<(), CompileError> {
        let blank_lines = self.style() == OutputStyle::Expanded;
        let mut first = true;
        for stmt in stmts {
            if !self.is_printable(stmt) {
                continue;
            }
            if !first && blank_lines && !stmt.is_declaration_like() {
                self.out.push('\n');
            }
            self.print_stmt(stmt)?;
            first = false;
        }
        Ok(())
    }

    fn print_stmt(&mut self, stmt: &CssStmt<'_>) -> Result<(), CompileError> {
        match stmt {
            CssStmt::Rule {
                selector,
                body,
                span,
            } => self.print_rule(selector, body, *span),
            CssStmt::Decl {
                property,
                value,
                span,
            } => self.print_decl(property, value, *span),
            CssStmt::Media { query, body, span } => {
                self.print_block_open("@media", Some(*query), *span);
                self.print_nested_body(body)?;
                self.print_block_close();
                Ok(())
            }
            CssStmt::Supports {
                condition,
                body,
                span,
            } => {
                self.print_block_open("@supports", Some(*condition), *span);
                self.print_nested_body(body)?;
                self.print_block_close();
                Ok(())
            }
            CssStmt::AtRule {
                keyword,
                value,
                body,
                span,
            } => match body {
                Some(body) => {
                    self.print_block_open(keyword, *value, *span);
                    self.print_nested_body(body)?;
                    self.print_block_close();
                    Ok(())
                }
                None => {
                    self.write_indent();
                    self.write_mapped(keyword, *span);
                    if let Some(value) = value {
                        self.write(" ");
                        self.write(value);
                    }
                    self.write(";");
                    self.newline();
                    Ok(())
                }
            },
            CssStmt::Import { text, span } => {
                self.write_indent();
                self.write_mapped("@import", *span);
                self.write(" ");
                self.write(text);
                self.write(";");
                self.newline();
                Ok(())
            }
            CssStmt::Comment { text, loud, span } => {
                if self.style().is_compressed() && !loud {
                    return Ok(());
                }
                self.write_indent();
                self.write_mapped(text, *span);
                self.newline();
                Ok(())
            }
        }
    }

    fn print_nested_body(&mut self, body: &[CssStmt<'_>]) -> Result<(), CompileError> {
        self.indent += 1;
        let result = self.print_block_list(body);
        self.indent -= 1;
        result
    }

    fn selector_text(&self, selector: &SelectorList<'_>) -> String {
        if self.style().is_compressed() {
            let mut text = String::new();
            for (i, member) in selector.members.iter().enumerate() {
                if i > 0 {
                    text.push(',');
                }
                text.push_str(&member.to_string());
            }
            text
        } else {
            selector.to_string()
        }
    }

    fn print_rule(
        &mut self,
        selector: &SelectorList<'_>,
        body: &[CssStmt<'_>],
        span: SourceSpan,
    ) -> Result<(), CompileError> {
        if self.options.source_comments && !self.style().is_compressed() {
            let path = self
                .sources
                .get(span.file as usize)
                .map_or("<unknown>", |s| s.name.as_str());
            self.write_indent();
            let comment = format!("/* line {}, {} */", span.line, path);
            self.write(&comment);
            self.newline();
        }

        self.write_indent();
        let rendered = self.selector_text(selector);
        self.write_mapped(&rendered, span);

        match self.style() {
            OutputStyle::Nested | OutputStyle::Expanded => {
                self.write(" {");
                self.newline();
                self.print_nested_body(body)?;
                self.write_indent();
                self.write("}");
                self.newline();
            }
            OutputStyle::Compact => {
                self.write(" { ");
                for decl in body {
                    if !self.is_printable(decl) {
                        continue;
                    }
                    self.print_compact_decl(decl)?;
                    self.write(" ");
                }
                self.write("}");
                self.newline();
            }
            OutputStyle::Compressed => {
                self.write("{");
                let mut first = true;
                for decl in body {
                    if !self.is_printable(decl) {
                        continue;
                    }
                    if !first {
                        self.write(";");
                    }
                    first = false;
                    self.print_stmt(decl)?;
                }
                self.write("}");
            }
        }
        Ok(())
    }

    /// One `prop: value` unit inside a compact rule line.
    fn print_compact_decl(&mut self, stmt: &CssStmt<'_>) -> Result<(), CompileError> {
        match stmt {
            CssStmt::Decl {
                property,
                value,
                span,
            } => {
                self.write_mapped(property, *span);
                self.write(": ");
                let text = self.render_value(value, *span)?;
                self.write(&text);
                self.write(";");
                Ok(())
            }
            CssStmt::Comment { text, span, .. } => {
                self.write_mapped(text, *span);
                Ok(())
            }
            other => self.print_stmt(other),
        }
    }

    fn print_decl(
        &mut self,
        property: &str,
        value: &Value<'_>,
        span: SourceSpan,
    ) -> Result<(), CompileError> {
        self.write_indent();
        self.write_mapped(property, span);
        if self.style().is_compressed() {
            self.write(":");
        } else {
            self.write(": ");
        }
        let text = self.render_value(value, span)?;
        self.write(&text);
        if !self.style().is_compressed() {
            self.write(";");
            self.newline();
        }
        Ok(())
    }

    fn render_value(&self, value: &Value<'_>, span: SourceSpan) -> Result<String, CompileError> {
        let mut text = String::new();
        format::write_value(&mut text, value, self.style(), self.options.precision)
            .map_err(|msg| CompileError::new(ErrorKind::InvalidCss, msg, span))?;
        Ok(text)
    }

    fn print_block_open(&mut self, keyword: &str, value: Option<&str>, span: SourceSpan) {
        self.write_indent();
        self.write_mapped(keyword, span);
        if let Some(value) = value {
            self.write(" ");
            self.write(value);
        }
        match self.style() {
            OutputStyle::Compressed => self.write("{"),
            OutputStyle::Compact => {
                self.write(" {");
                self.newline();
            }
            _ => {
                self.write(" {");
                self.newline();
            }
        }
    }

    fn print_block_close(&mut self) {
        self.write_indent();
        self.write("}");
        self.newline();
    }
}
