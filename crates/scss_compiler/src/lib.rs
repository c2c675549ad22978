//! SCSS compiler core.
//!
//! Compiles a parsed stylesheet AST (nested rules, variables, mixins,
//! functions, control directives, `@extend`, `@import`) into plain CSS.
//! The pipeline is a sequence of tree-to-tree transformations followed by a
//! printer:
//!
//! ```text
//! AST ──▶ Evaluator ──▶ Extender ──▶ Placeholder pruning ──▶ Printer ──▶ CSS
//!           │               │
//!           └── selector algebra ───┘
//! ```
//!
//! Parsing source text into the AST is an external collaborator's job: the
//! parser allocates [`ast`] nodes in the compilation's [`arena::Arena`] and
//! hands [`compile`] the statement list. One arena owns every node of one
//! compilation; nothing is shared across compilations.
//!
//! ```ignore
//! let arena = Arena::default();
//! let root = parse(&arena, source)?;
//! let output = compile(&arena, &root, &CompileOptions::default(), &sources, None)?;
//! println!("{}", output.css);
//! ```

pub mod arena;
pub mod ast;
pub mod color_names;
pub mod diagnostic;
pub mod env;
pub mod eval;
pub mod extend;
pub mod loader;
pub mod options;
pub mod printer;
pub mod selector;

pub use arena::Arena;
pub use diagnostic::{CompileError, Diagnostic, ErrorKind, Severity, SourceSpan};
pub use loader::{FsImporter, FsLoader, ImportError, Importer};
pub use options::{CompileOptions, OutputStyle};

use ast::stmt::Stmt;

/// One input source file, as referenced by span file indices: its display
/// name plus, optionally, its contents for the source map's
/// `sourcesContent`.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub name: String,
    pub contents: Option<String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: None,
        }
    }

    #[must_use]
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }
}

/// Output of one compilation.
#[derive(Debug)]
pub struct CompileOutput {
    /// The CSS text.
    pub css: String,
    /// Source map JSON (version 3, base64-VLQ mappings) when
    /// [`CompileOptions::source_map`] is set.
    pub map: Option<String>,
    /// Warnings and debug messages collected along the way.
    pub warnings: Vec<Diagnostic>,
}

/// Compile a parsed stylesheet.
///
/// `root` is the top-level statement list, with every node allocated in
/// `arena`. `sources` is the file table that span file indices point into.
/// `importer` resolves non-CSS `@import`s; without one, any such import is a
/// fatal error.
pub fn compile<'a>(
    arena: &'a Arena,
    root: &[Stmt<'a>],
    options: &CompileOptions,
    sources: &[SourceFile],
    importer: Option<&mut dyn Importer<'a>>,
) -> Result<CompileOutput, CompileError> {
    let evaluated = eval::evaluate(arena, root, options, importer)?;
    let extended = extend::extend(arena, &evaluated.stmts, &evaluated.extends)?;
    let printed = printer::print(&extended, options, sources)?;
    Ok(CompileOutput {
        css: printed.css,
        map: printed.map,
        warnings: evaluated.warnings,
    })
}
