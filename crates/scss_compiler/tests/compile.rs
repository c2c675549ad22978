//! End-to-end pipeline tests: statement tree in, CSS text out.

mod common;

use common::*;
use scss_compiler::arena::{Arena, alloc_slice};
use scss_compiler::ast::expr::{Expr, ExprKind, InterpPart};
use scss_compiler::ast::stmt::{Block, Stmt, StmtKind};
use scss_compiler::diagnostic::{ErrorKind, Severity};
use scss_compiler::{CompileOptions, OutputStyle, SourceFile, compile};

#[test]
fn nested_ruleset_flattens() {
    let arena = Arena::default();
    let inner = rule(&arena, "b", &[decl(&arena, "color", "blue")]);
    let outer = rule(&arena, "a", &[decl(&arena, "color", "red"), inner]);
    assert_eq!(
        compile_expanded(&arena, &[outer]),
        "a {\n  color: red;\n}\n\na b {\n  color: blue;\n}\n"
    );
}

#[test]
fn parent_reference_with_suffix() {
    let arena = Arena::default();
    let inner = rule(
        &arena,
        "&.bar",
        &[decl_expr(&arena, "x", number(&arena, 1.0, None))],
    );
    let outer = rule(&arena, ".foo", &[inner]);
    assert_eq!(
        compile_expanded(&arena, &[outer]),
        ".foo.bar {\n  x: 1;\n}\n"
    );
}

#[test]
fn control_flow_with_interpolated_selectors() {
    let arena = Arena::default();
    let body = rule_schema(
        &arena,
        &[
            InterpPart::Literal(".c-"),
            interp_expr(&arena, variable(&arena, "i")),
        ],
        &[decl_expr(&arena, "w", variable(&arena, "i"))],
    );
    let for_stmt = Stmt::new(
        StmtKind::For {
            var: "i",
            from: number(&arena, 1.0, None),
            to: number(&arena, 3.0, None),
            inclusive: true,
            body: block(&arena, &[body]),
        },
        span(1),
    );
    assert_eq!(
        compile_expanded(&arena, &[for_stmt]),
        ".c-1 {\n  w: 1;\n}\n\n.c-2 {\n  w: 2;\n}\n\n.c-3 {\n  w: 3;\n}\n"
    );
}

#[test]
fn output_styles() {
    fn tree(arena: &Arena) -> Vec<Stmt<'_>> {
        let inner = rule(arena, "b", &[decl(arena, "color", "blue")]);
        vec![rule(arena, "a", &[decl(arena, "color", "red"), inner])]
    }

    let arena = Arena::default();
    let stmts = tree(&arena);

    assert_eq!(
        compile_with(&arena, &stmts, OutputStyle::Nested).css,
        "a {\n  color: red;\n}\na b {\n  color: blue;\n}\n"
    );
    assert_eq!(
        compile_with(&arena, &stmts, OutputStyle::Expanded).css,
        "a {\n  color: red;\n}\n\na b {\n  color: blue;\n}\n"
    );
    assert_eq!(
        compile_with(&arena, &stmts, OutputStyle::Compact).css,
        "a { color: red; }\na b { color: blue; }\n"
    );
    assert_eq!(
        compile_with(&arena, &stmts, OutputStyle::Compressed).css,
        "a{color:red}a b{color:blue}\n"
    );
}

#[test]
fn printer_is_deterministic() {
    let arena = Arena::default();
    let inner = rule(&arena, "&:hover", &[decl(&arena, "color", "teal")]);
    let stmts = [rule(&arena, ".nav", &[decl(&arena, "margin", "0"), inner])];
    let first = compile_expanded(&arena, &stmts);
    let second = compile_expanded(&arena, &stmts);
    assert_eq!(first, second);
}

#[test]
fn media_bubbles_past_rulesets() {
    let arena = Arena::default();
    let media = Stmt::new(
        StmtKind::Media {
            query: Expr::literal(unquoted(&arena, "screen"), span(2)),
            body: block(
                &arena,
                &[decl_expr(&arena, "width", number(&arena, 1.0, Some("px")))],
            ),
        },
        span(2),
    );
    let outer = rule(&arena, "a", &[decl(&arena, "color", "red"), media]);
    assert_eq!(
        compile_expanded(&arena, &[outer]),
        "a {\n  color: red;\n}\n\n@media screen {\n  a {\n    width: 1px;\n  }\n}\n"
    );
}

#[test]
fn nested_media_queries_combine() {
    let arena = Arena::default();
    let inner = Stmt::new(
        StmtKind::Media {
            query: Expr::literal(unquoted(&arena, "(min-width: 100px)"), span(3)),
            body: block(&arena, &[decl(&arena, "color", "red")]),
        },
        span(3),
    );
    let outer = Stmt::new(
        StmtKind::Media {
            query: Expr::literal(unquoted(&arena, "screen"), span(2)),
            body: block(&arena, &[rule(&arena, "a", &[inner])]),
        },
        span(2),
    );
    let css = compile_expanded(&arena, &[outer]);
    assert!(
        css.contains("screen and (min-width: 100px)"),
        "combined query missing from:\n{css}"
    );
}

#[test]
fn variables_resolve_with_scoping() {
    let arena = Arena::default();
    let stmts = [
        assign(&arena, "accent", Expr::literal(unquoted(&arena, "teal"), span(1))),
        rule(
            &arena,
            ".btn",
            &[decl_expr(&arena, "color", variable(&arena, "accent"))],
        ),
    ];
    assert_eq!(
        compile_expanded(&arena, &stmts),
        ".btn {\n  color: teal;\n}\n"
    );
}

#[test]
fn mixins_bind_arguments_and_defaults() {
    let arena = Arena::default();
    let params = [param(&arena, "pad", Some(number(&arena, 1.0, Some("px"))))];
    let body = [decl_expr(&arena, "padding", variable(&arena, "pad"))];
    let def = mixin_def(&arena, "card", &params, &body);

    let with_arg = rule(
        &arena,
        ".a",
        &[include(&arena, "card", &[number(&arena, 2.0, Some("px"))])],
    );
    let with_default = rule(&arena, ".b", &[include(&arena, "card", &[])]);

    assert_eq!(
        compile_expanded(&arena, &[def, with_arg, with_default]),
        ".a {\n  padding: 2px;\n}\n\n.b {\n  padding: 1px;\n}\n"
    );
}

#[test]
fn functions_return_values() {
    let arena = Arena::default();
    let double_body = [Stmt::new(
        StmtKind::Return(Expr::new(
            ExprKind::BinaryOp {
                op: scss_compiler::ast::expr::BinaryOp::Mul,
                lhs: scss_compiler::arena::alloc(&arena, variable(&arena, "x")),
                rhs: scss_compiler::arena::alloc(&arena, number(&arena, 2.0, None)),
            },
            span(1),
        )),
        span(1),
    )];
    let def = function_def(&arena, "double", &[param(&arena, "x", None)], &double_body);

    let call = Expr::new(
        ExprKind::FunctionCall {
            name: "double",
            args: scss_compiler::ast::expr::CallArgs {
                positional: alloc_slice(&arena, &[number(&arena, 4.0, Some("px"))]),
                named: &[],
            },
        },
        span(1),
    );
    let usage = rule(&arena, ".a", &[decl_expr(&arena, "width", call)]);

    assert_eq!(
        compile_expanded(&arena, &[def, usage]),
        ".a {\n  width: 8px;\n}\n"
    );
}

#[test]
fn unknown_functions_render_literally() {
    let arena = Arena::default();
    let call = Expr::new(
        ExprKind::FunctionCall {
            name: "url",
            args: scss_compiler::ast::expr::CallArgs {
                positional: alloc_slice(
                    &arena,
                    &[Expr::literal(unquoted(&arena, "logo.png"), span(1))],
                ),
                named: &[],
            },
        },
        span(1),
    );
    let usage = rule(&arena, ".a", &[decl_expr(&arena, "background", call)]);
    assert_eq!(
        compile_expanded(&arena, &[usage]),
        ".a {\n  background: url(logo.png);\n}\n"
    );
}

#[test]
fn each_destructures_with_null_padding() {
    let arena = Arena::default();
    let pairs = Expr::new(
        ExprKind::List {
            items: alloc_slice(
                &arena,
                &[
                    Expr::new(
                        ExprKind::List {
                            items: alloc_slice(
                                &arena,
                                &[
                                    Expr::literal(unquoted(&arena, "a"), span(1)),
                                    number(&arena, 1.0, None),
                                ],
                            ),
                            separator: scss_compiler::ast::value::ListSeparator::Space,
                        },
                        span(1),
                    ),
                    Expr::literal(unquoted(&arena, "b"), span(1)),
                ],
            ),
            separator: scss_compiler::ast::value::ListSeparator::Comma,
        },
        span(1),
    );

    let body = rule_schema(
        &arena,
        &[
            InterpPart::Literal("."),
            interp_expr(&arena, variable(&arena, "name")),
        ],
        &[decl_expr(&arena, "order", variable(&arena, "n"))],
    );
    let each = Stmt::new(
        StmtKind::Each {
            vars: alloc_slice(&arena, &["name", "n"]),
            list: pairs,
            body: block(&arena, &[body]),
        },
        span(1),
    );

    // `b` destructures to (`b`, null); the null declaration is dropped.
    assert_eq!(
        compile_expanded(&arena, &[each]),
        ".a {\n  order: 1;\n}\n"
    );
}

#[test]
fn warnings_collect_without_aborting() {
    let arena = Arena::default();
    let warn = Stmt::new(
        StmtKind::Warn(Expr::literal(unquoted(&arena, "deprecated"), span(4))),
        span(4),
    );
    let stmts = [warn, rule(&arena, "a", &[decl(&arena, "color", "red")])];
    let output = compile_with(&arena, &stmts, OutputStyle::Expanded);
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].severity, Severity::Warning);
    assert_eq!(output.warnings[0].text, "deprecated");
    assert!(output.css.starts_with("a {"));
}

#[test]
fn user_error_aborts_with_trace() {
    let arena = Arena::default();
    let body = [Stmt::new(
        StmtKind::Error(Expr::literal(unquoted(&arena, "boom"), span(7))),
        span(7),
    )];
    let def = mixin_def(&arena, "explode", &[], &body);
    let usage = rule(&arena, "a", &[include(&arena, "explode", &[])]);

    let options = CompileOptions::default();
    let sources = [SourceFile::new("input.scss")];
    let err = compile(&arena, &[def, usage], &options, &sources, None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UserAbort);
    assert_eq!(err.message, "boom");
    assert_eq!(err.trace.len(), 1);
    assert_eq!(err.trace[0].name, "explode");
}

#[test]
fn source_map_has_version_three_shape() {
    let arena = Arena::default();
    let stmts = [rule(&arena, "a", &[decl(&arena, "color", "red")])];
    let options = CompileOptions::default()
        .with_output_style(OutputStyle::Expanded)
        .with_source_map(true)
        .with_source_map_file("out.css.map");
    let sources = [SourceFile::new("input.scss").with_contents("a { color: red; }")];
    let output = compile(&arena, &stmts, &options, &sources, None).unwrap();

    let map = output.map.expect("source map generated");
    let json: serde_json::Value = serde_json::from_str(&map).unwrap();
    assert_eq!(json["version"], 3);
    assert_eq!(json["sources"][0], "input.scss");
    assert!(
        !json["mappings"].as_str().unwrap().is_empty(),
        "mappings should not be empty"
    );
    assert!(output.css.contains("/*# sourceMappingURL=out.css.map */"));

    let omitted = CompileOptions::default()
        .with_source_map(true)
        .with_omit_source_map_url(true);
    let output = compile(&arena, &stmts, &omitted, &sources, None).unwrap();
    assert!(!output.css.contains("sourceMappingURL"));
    assert!(output.map.is_some());
}

#[test]
fn source_comments_annotate_rules() {
    let arena = Arena::default();
    let stmts = [rule(&arena, "a", &[decl(&arena, "color", "red")])];
    let options = CompileOptions::default()
        .with_output_style(OutputStyle::Expanded)
        .with_source_comments(true);
    let sources = [SourceFile::new("input.scss")];
    let output = compile(&arena, &stmts, &options, &sources, None).unwrap();
    assert!(output.css.starts_with("/* line 1, input.scss */\n"));
}

#[test]
fn charset_prefix_for_non_ascii_output() {
    let arena = Arena::default();
    let stmts = [rule(&arena, "a", &[decl(&arena, "content", "\"日本語\"")])];
    let css = compile_expanded(&arena, &stmts);
    assert!(css.starts_with("@charset \"UTF-8\";\n"));

    let compressed = compile_with(&arena, &stmts, OutputStyle::Compressed).css;
    assert!(compressed.starts_with('\u{FEFF}'));
}

#[test]
fn css_imports_hoist_to_the_top() {
    let arena = Arena::default();
    let import = Stmt::new(
        StmtKind::Import {
            path: "url(theme.css)",
            css: true,
        },
        span(5),
    );
    let stmts = [rule(&arena, "a", &[decl(&arena, "color", "red")]), import];
    let css = compile_expanded(&arena, &stmts);
    assert!(css.starts_with("@import url(theme.css);\n"));
}

#[test]
fn importer_splices_parsed_blocks() {
    use scss_compiler::diagnostic::SourceSpan;
    use scss_compiler::loader::{ImportError, Importer};

    struct Stub<'a> {
        block: Block<'a>,
    }
    impl<'a> Importer<'a> for Stub<'a> {
        fn import(
            &mut self,
            _path: &str,
            _span: SourceSpan,
        ) -> Result<Option<Block<'a>>, ImportError> {
            Ok(Some(self.block))
        }
    }

    let arena = Arena::default();
    let imported = rule(&arena, ".lib", &[decl(&arena, "color", "teal")]);
    let mut stub = Stub {
        block: block(&arena, &[imported]),
    };

    let import = Stmt::new(
        StmtKind::Import {
            path: "lib",
            css: false,
        },
        span(1),
    );
    let options = CompileOptions::default().with_output_style(OutputStyle::Expanded);
    let sources = [SourceFile::new("input.scss")];
    let output = compile(&arena, &[import], &options, &sources, Some(&mut stub)).unwrap();
    assert_eq!(output.css, ".lib {\n  color: teal;\n}\n");
}

#[test]
fn missing_import_is_fatal() {
    let arena = Arena::default();
    let import = Stmt::new(
        StmtKind::Import {
            path: "nowhere",
            css: false,
        },
        span(1),
    );
    let options = CompileOptions::default();
    let sources = [SourceFile::new("input.scss")];
    let err = compile(&arena, &[import], &options, &sources, None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ImportNotFound);
}

#[test]
fn composite_stylesheet_snapshot() {
    let arena = Arena::default();
    let hover = rule(&arena, "&:hover", &[decl(&arena, "color", "navy")]);
    let nav = rule(
        &arena,
        ".nav",
        &[
            decl(&arena, "margin", "0"),
            decl(&arena, "color", "blue"),
            hover,
        ],
    );
    let base = rule(&arena, "%clickable", &[decl(&arena, "cursor", "pointer")]);
    let button = rule(
        &arena,
        ".button",
        &[
            extend_stmt(&arena, "%clickable", false),
            decl(&arena, "border", "none"),
        ],
    );
    let css = compile_expanded(&arena, &[base, nav, button]);
    insta::assert_snapshot!(css.trim_end(), @r"
    .button {
      cursor: pointer;
    }

    .nav {
      margin: 0;
      color: blue;
    }

    .nav:hover {
      color: navy;
    }

    .button {
      border: none;
    }
    ");
}
