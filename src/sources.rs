// src/sources.rs

//! Glob expansion over the source tree and mirrored output paths.
//!
//! Patterns are relative to the project root and use `globset` syntax with
//! `*` confined to a single path component (`**` crosses directories). A
//! leading `./` is ignored.

use std::fs;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{AssetError, Result};

/// A file matched by a source glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path on disk (project root joined with the relative path).
    pub path: PathBuf,
    /// Path relative to the pattern's glob base; used to mirror the tree.
    pub relative: PathBuf,
}

/// Strip any leading `./` segments.
pub fn normalize_pattern(pattern: &str) -> &str {
    let mut p = pattern.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p
}

/// Compile a source pattern into a matcher for root-relative paths.
pub fn compile_matcher(pattern: &str) -> Result<GlobMatcher> {
    let normalized = normalize_pattern(pattern);
    GlobBuilder::new(normalized)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|source| AssetError::Glob {
            pattern: pattern.to_string(),
            source,
        })
}

/// The leading directory of a pattern that contains no glob metacharacter.
///
/// `src/i/images/**/*` -> `src/i/images`, `src/js/main/*.js` -> `src/js/main`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let normalized = normalize_pattern(pattern);
    let mut base = PathBuf::new();
    let components: Vec<&str> = normalized.split('/').collect();

    // The last component names files, never the base.
    let dir_parts = components.len().saturating_sub(1);
    for part in &components[..dir_parts] {
        if part.contains(['*', '?', '[', '{']) {
            break;
        }
        if !part.is_empty() {
            base.push(part);
        }
    }
    base
}

/// Convert a path into a root-relative string with forward slashes.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    Some(s)
}

/// Expand `pattern` under `root`, returning matching files sorted by path.
///
/// A missing glob base directory yields an empty list.
pub fn expand(root: &Path, pattern: &str) -> Result<Vec<SourceFile>> {
    let matcher = compile_matcher(pattern)?;
    let base = glob_base(pattern);
    let walk_root = root.join(&base);

    if !walk_root.exists() {
        debug!(pattern, base = ?walk_root, "glob base does not exist; no sources");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&walk_root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| walk_root.clone());
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop while walking sources"));
            AssetError::io(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(rel) = relative_str(root, entry.path()) else {
            continue;
        };
        if !matcher.is_match(&rel) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(&walk_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));

        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            relative,
        });
    }

    debug!(pattern, count = files.len(), "expanded source glob");
    Ok(files)
}

/// Where a mirrored source file lands under `dest`.
pub fn mirror_path(dest: &Path, file: &SourceFile) -> PathBuf {
    dest.join(&file.relative)
}

/// Read a whole source file.
pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| AssetError::io(path, e))
}

/// Write an artifact, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| AssetError::io(parent, e))?;
        }
    }
    fs::write(path, contents).map_err(|e| AssetError::io(path, e))
}

/// Name under which a root-relative source appears in a source map written
/// to `dest_rel` (also root-relative), e.g. `../../src/sass/main.scss`.
pub fn map_source_name(dest_rel: &Path, source_rel: &str) -> String {
    let depth = dest_rel
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    let mut name = "../".repeat(depth);
    name.push_str(source_rel);
    name
}
