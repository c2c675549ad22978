//! Source loading for `@import`.
//!
//! The core resolves import paths against the importing file's directory
//! followed by the configured include paths, expanding the usual candidate
//! names (`p`, `_p`, `p.scss`, `_p.scss`). Parsing stays outside the core:
//! an [`Importer`] turns a path into an already-parsed [`Block`], and the
//! provided [`FsImporter`] composes the filesystem loader with a parse
//! callback supplied by the embedder.
//!
//! Import loops (a file importing itself transitively) are detected against
//! the stack of files currently being imported and reported as fatal.

use std::path::{Path, PathBuf};

use crate::ast::stmt::Block;
use crate::diagnostic::{ErrorKind, SourceSpan};

/// Error from an importer, carrying the taxonomy kind (`ImportNotFound`,
/// `ImportLoop`, `Parse`).
#[derive(Debug, Clone)]
pub struct ImportError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ImportError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Resolves `@import` paths to parsed blocks.
pub trait Importer<'a> {
    /// Resolve `path`, returning the parsed contents or `Ok(None)` when the
    /// path cannot be found.
    fn import(&mut self, path: &str, span: SourceSpan) -> Result<Option<Block<'a>>, ImportError>;

    /// Called when the evaluator finishes the imported block, so the
    /// importer can pop its cycle-detection stack.
    fn leave(&mut self, path: &str) {
        let _ = path;
    }
}

/// A loaded source file.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub canonical: PathBuf,
    pub contents: String,
}

/// Filesystem loader with include paths and cycle detection.
pub struct FsLoader {
    include_paths: Vec<PathBuf>,
    active: Vec<PathBuf>,
}

impl FsLoader {
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self {
            include_paths,
            active: Vec::new(),
        }
    }

    /// Candidate file names for an import path, in resolution order.
    fn candidates(path: &str) -> Vec<PathBuf> {
        let path = Path::new(path);
        let mut names = Vec::new();
        let file = path.file_name().and_then(|f| f.to_str()).unwrap_or("");
        let dir = path.parent().unwrap_or(Path::new(""));

        names.push(path.to_path_buf());
        names.push(dir.join(format!("_{file}")));
        if path.extension().is_none() {
            names.push(dir.join(format!("{file}.scss")));
            names.push(dir.join(format!("_{file}.scss")));
        }
        names
    }

    /// Resolve an import path against the importing file's directory and the
    /// include paths, returning contents plus the canonical path.
    pub fn load(&mut self, path: &str, from: Option<&Path>) -> Result<Option<LoadedFile>, ImportError> {
        let mut roots: Vec<PathBuf> = Vec::new();
        if let Some(from) = from {
            if let Some(parent) = from.parent() {
                roots.push(parent.to_path_buf());
            }
        }
        roots.push(PathBuf::new());
        roots.extend(self.include_paths.iter().cloned());

        for root in &roots {
            for candidate in Self::candidates(path) {
                let full = if root.as_os_str().is_empty() {
                    candidate
                } else {
                    root.join(candidate)
                };
                if !full.is_file() {
                    continue;
                }
                let canonical = full.canonicalize().unwrap_or(full.clone());
                if self.active.contains(&canonical) {
                    return Err(ImportError::new(
                        ErrorKind::ImportLoop,
                        format!(
                            "import loop detected: \"{}\" is already being imported",
                            canonical.display()
                        ),
                    ));
                }
                let contents = std::fs::read_to_string(&full).map_err(|err| {
                    ImportError::new(
                        ErrorKind::ImportNotFound,
                        format!("failed to read \"{}\": {err}", full.display()),
                    )
                })?;
                self.active.push(canonical.clone());
                return Ok(Some(LoadedFile {
                    canonical,
                    contents,
                }));
            }
        }
        Ok(None)
    }

    /// Pop the innermost active import.
    pub fn finish(&mut self) {
        self.active.pop();
    }
}

/// An [`Importer`] over the filesystem: loads with [`FsLoader`] and parses
/// through a callback (the external parser's hook into the core).
pub struct FsImporter<'a, F>
where
    F: FnMut(&str, &Path) -> Result<Block<'a>, ImportError>,
{
    loader: FsLoader,
    parse: F,
    current: Vec<PathBuf>,
}

impl<'a, F> FsImporter<'a, F>
where
    F: FnMut(&str, &Path) -> Result<Block<'a>, ImportError>,
{
    pub fn new(include_paths: Vec<PathBuf>, parse: F) -> Self {
        Self {
            loader: FsLoader::new(include_paths),
            parse,
            current: Vec::new(),
        }
    }
}

impl<'a, F> Importer<'a> for FsImporter<'a, F>
where
    F: FnMut(&str, &Path) -> Result<Block<'a>, ImportError>,
{
    fn import(&mut self, path: &str, _span: SourceSpan) -> Result<Option<Block<'a>>, ImportError> {
        let from = self.current.last().cloned();
        let Some(loaded) = self.loader.load(path, from.as_deref())? else {
            return Ok(None);
        };
        self.current.push(loaded.canonical.clone());
        match (self.parse)(&loaded.contents, &loaded.canonical) {
            Ok(block) => Ok(Some(block)),
            Err(err) => {
                self.current.pop();
                self.loader.finish();
                Err(err)
            }
        }
    }

    fn leave(&mut self, _path: &str) {
        self.current.pop();
        self.loader.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scss_compiler_loader_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn resolves_partials_and_extensions() {
        let dir = temp_dir("partials");
        write_file(&dir, "_base.scss", "// partial");
        let mut loader = FsLoader::new(vec![dir.clone()]);

        let loaded = loader.load("base", None).unwrap().unwrap();
        assert!(loaded.canonical.ends_with("_base.scss"));
        loader.finish();

        let loaded = loader.load("base.scss", None).unwrap();
        assert!(loaded.is_some());
    }

    #[test]
    fn missing_files_resolve_to_none() {
        let dir = temp_dir("missing");
        let mut loader = FsLoader::new(vec![dir]);
        assert!(loader.load("nope", None).unwrap().is_none());
    }

    #[test]
    fn detects_import_loops() {
        let dir = temp_dir("loops");
        write_file(&dir, "self.scss", "@import 'self';");
        let mut loader = FsLoader::new(vec![dir]);

        let loaded = loader.load("self", None).unwrap().unwrap();
        let err = loader
            .load("self", Some(&loaded.canonical))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ImportLoop);
    }

    #[test]
    fn importing_file_directory_wins_over_include_paths() {
        let near = temp_dir("near");
        let far = temp_dir("far");
        write_file(&near, "shared.scss", "near");
        write_file(&far, "shared.scss", "far");
        let importing = write_file(&near, "main.scss", "@import 'shared';");

        let mut loader = FsLoader::new(vec![far]);
        let loaded = loader.load("shared", Some(&importing)).unwrap().unwrap();
        assert_eq!(loaded.contents, "near");
    }
}
