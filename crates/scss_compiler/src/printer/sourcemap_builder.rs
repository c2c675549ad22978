//! Source map builder for the CSS printer.
//!
//! Maps generated CSS positions back to positions in the original
//! stylesheet sources. Original positions come straight from AST spans; the
//! generated side is tracked by scanning the bytes appended to the output
//! buffer since the last mapping, counting columns in UTF-16 code units per
//! the source map spec.

use crate::SourceFile;
use crate::diagnostic::SourceSpan;

/// Accumulates `(generated, original)` position pairs and produces a
/// version-3 source map.
pub struct SourcemapBuilder {
    /// Source ids assigned by the inner builder, indexed by file index.
    source_ids: Vec<u32>,
    /// The inner `oxc_sourcemap::SourceMapBuilder` that accumulates tokens.
    inner: oxc_sourcemap::SourceMapBuilder,

    /// Byte length of the output buffer at the last generated-position
    /// update.
    last_generated_update: usize,
    /// Current generated line (0-indexed).
    generated_line: u32,
    /// Current generated column (0-indexed, UTF-16 code units).
    generated_column: u32,
    /// Last original position emitted, used to deduplicate consecutive
    /// mappings.
    last_original: Option<(u32, u32, u32)>,
}

impl SourcemapBuilder {
    pub fn new(sources: &[SourceFile]) -> Self {
        let mut inner = oxc_sourcemap::SourceMapBuilder::default();
        let mut source_ids = Vec::with_capacity(sources.len());
        for source in sources {
            let id = inner
                .set_source_and_content(&source.name, source.contents.as_deref().unwrap_or(""));
            source_ids.push(id);
        }
        Self {
            source_ids,
            inner,
            last_generated_update: 0,
            generated_line: 0,
            generated_column: 0,
            last_original: None,
        }
    }

    /// Consume the builder and produce the final source map.
    pub fn into_sourcemap(self) -> oxc_sourcemap::SourceMap {
        self.inner.into_sourcemap()
    }

    /// Record a mapping from the current end of `output` to `span`.
    ///
    /// Spans carry 1-based lines and 0-based columns; the source map wants
    /// both 0-based. Consecutive mappings to the same original position are
    /// dropped.
    pub fn add_mapping(&mut self, output: &str, span: SourceSpan) {
        let original = (span.file, span.line.saturating_sub(1), span.column);
        if self.last_original == Some(original) {
            return;
        }

        self.update_generated_position(output.as_bytes());

        let source_id = self.source_ids.get(span.file as usize).copied();
        self.inner.add_token(
            self.generated_line,
            self.generated_column,
            original.1,
            original.2,
            source_id,
            None,
        );
        self.last_original = Some(original);
    }

    /// Advance the generated line/column by scanning bytes appended since
    /// the last update.
    fn update_generated_position(&mut self, output: &[u8]) {
        let start = self.last_generated_update;
        if start >= output.len() {
            self.last_generated_update = output.len();
            return;
        }
        let new_bytes = &output[start..];

        let mut last_newline = None;
        let mut newline_count: u32 = 0;
        for (i, b) in new_bytes.iter().enumerate() {
            if *b == b'\n' {
                newline_count += 1;
                last_newline = Some(i);
            }
        }

        if let Some(last) = last_newline {
            self.generated_line += newline_count;
            self.generated_column = utf16_len(&new_bytes[last + 1..]);
        } else {
            self.generated_column += utf16_len(new_bytes);
        }
        self.last_generated_update = output.len();
    }
}

fn utf16_len(bytes: &[u8]) -> u32 {
    if bytes.iter().all(u8::is_ascii) {
        bytes.len() as u32
    } else {
        std::str::from_utf8(bytes)
            .map(|s| s.encode_utf16().count() as u32)
            .unwrap_or(bytes.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> Vec<SourceFile> {
        vec![SourceFile {
            name: "input.scss".to_string(),
            contents: Some("a {\n  color: red;\n}\n".to_string()),
        }]
    }

    #[test]
    fn tracks_generated_positions_across_lines() {
        let mut builder = SourcemapBuilder::new(&sources());
        let mut out = String::new();

        builder.add_mapping(&out, SourceSpan::new(0, 1, 0));
        out.push_str("a {\n  ");
        builder.add_mapping(&out, SourceSpan::new(0, 2, 2));

        let map = builder.into_sourcemap();
        let tokens: Vec<_> = map.get_tokens().collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].get_dst_line(), 0);
        assert_eq!(tokens[0].get_dst_col(), 0);
        assert_eq!(tokens[1].get_dst_line(), 1);
        assert_eq!(tokens[1].get_dst_col(), 2);
        assert_eq!(tokens[1].get_src_line(), 1);
    }

    #[test]
    fn deduplicates_consecutive_identical_origins() {
        let mut builder = SourcemapBuilder::new(&sources());
        let out = String::new();
        builder.add_mapping(&out, SourceSpan::new(0, 1, 0));
        builder.add_mapping(&out, SourceSpan::new(0, 1, 0));
        let map = builder.into_sourcemap();
        assert_eq!(map.get_tokens().count(), 1);
    }
}
