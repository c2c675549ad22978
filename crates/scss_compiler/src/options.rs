//! Compilation options.

use std::path::PathBuf;

/// CSS output style.
///
/// Determines how much whitespace the printer emits and which compact forms
/// (short hex colors, trimmed zeros) it reaches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Declarations indented to their nesting depth, `}` on its own line.
    #[default]
    Nested,
    /// One declaration per line, two-space indent, blank line between
    /// top-level rules.
    Expanded,
    /// One rule per line.
    Compact,
    /// Minimal whitespace, no trailing semicolons.
    Compressed,
}

impl OutputStyle {
    pub fn is_compressed(self) -> bool {
        matches!(self, Self::Compressed)
    }
}

/// Options for one compilation.
pub struct CompileOptions {
    /// Output style for the printer.
    pub output_style: OutputStyle,

    /// Decimal digits retained in numeric output.
    pub precision: usize,

    /// Emit `/* line N, path */` before each rule.
    pub source_comments: bool,

    /// Generate a source map alongside the CSS.
    pub source_map: bool,

    /// Suppress the trailing `/*# sourceMappingURL=... */` comment when a
    /// source map is generated.
    pub omit_source_map_url: bool,

    /// The URL written into the `sourceMappingURL` comment. Defaults to the
    /// first source file name with `.map` appended.
    pub source_map_file: Option<String>,

    /// Directories searched when resolving `@import` paths, in order, after
    /// the importing file's own directory.
    pub include_paths: Vec<PathBuf>,

    /// The input used the indentation-based surface syntax. Recorded for the
    /// front end; the core never branches on it.
    pub indented_syntax: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            output_style: OutputStyle::default(),
            precision: 5,
            source_comments: false,
            source_map: false,
            omit_source_map_url: false,
            source_map_file: None,
            include_paths: Vec::new(),
            indented_syntax: false,
        }
    }
}

impl std::fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileOptions")
            .field("output_style", &self.output_style)
            .field("precision", &self.precision)
            .field("source_comments", &self.source_comments)
            .field("source_map", &self.source_map)
            .field("omit_source_map_url", &self.omit_source_map_url)
            .field("source_map_file", &self.source_map_file)
            .field("include_paths", &self.include_paths)
            .field("indented_syntax", &self.indented_syntax)
            .finish()
    }
}

impl CompileOptions {
    /// Create new options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output style.
    #[must_use]
    pub fn with_output_style(mut self, style: OutputStyle) -> Self {
        self.output_style = style;
        self
    }

    /// Set the numeric precision.
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Enable or disable per-rule source comments.
    #[must_use]
    pub fn with_source_comments(mut self, enabled: bool) -> Self {
        self.source_comments = enabled;
        self
    }

    /// Enable or disable source map generation.
    #[must_use]
    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    /// Suppress the `sourceMappingURL` comment.
    #[must_use]
    pub fn with_omit_source_map_url(mut self, omit: bool) -> Self {
        self.omit_source_map_url = omit;
        self
    }

    /// Set the source map file URL.
    #[must_use]
    pub fn with_source_map_file(mut self, file: impl Into<String>) -> Self {
        self.source_map_file = Some(file.into());
        self
    }

    /// Add an import search directory.
    #[must_use]
    pub fn with_include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    /// Mark the input as indented-syntax source.
    #[must_use]
    pub fn with_indented_syntax(mut self, indented: bool) -> Self {
        self.indented_syntax = indented;
        self
    }
}
