//! Markdown discovery and document loading.
use crate::corpus::{frontmatter, LoadError, PromptDocument};
use crate::util;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Files found by a discovery pass plus any traversal failures.
#[derive(Debug)]
pub struct DiscoveredCorpus {
    /// Absolute paths, sorted for deterministic processing order.
    pub files: Vec<PathBuf>,
    pub load_errors: Vec<LoadError>,
}

/// Check the library root exists and return its canonical path.
pub fn ensure_library_root(path: &Path) -> Result<PathBuf> {
    let meta = fs::metadata(path)
        .with_context(|| format!("library root {}", path.display()))?;
    if !meta.is_dir() {
        bail!("library root {} is not a directory", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("canonicalize library root {}", path.display()))
}

/// Recursively discover `.md` files under the library root, optionally
/// limited to a relative folder. Dot-prefixed entries below the root are
/// skipped. Traversal failures become load-error records, not aborts.
pub fn discover_documents(root: &Path, folder: Option<&str>) -> Result<DiscoveredCorpus> {
    let scan_root = match folder {
        Some(rel) => {
            let dir = root.join(rel);
            if !dir.is_dir() {
                bail!("folder {rel:?} not found under {}", root.display());
            }
            dir
        }
        None => root.to_path_buf(),
    };

    let mut files = Vec::new();
    let mut load_errors = Vec::new();
    let walker = WalkDir::new(&scan_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "md")
                {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| rel_id(root, p))
                    .unwrap_or_else(|| util::rel_unix_path(&scan_root));
                load_errors.push(LoadError {
                    path,
                    message: format!("walk failed: {err}"),
                });
            }
        }
    }
    files.sort();
    tracing::debug!(count = files.len(), "discovered markdown files");
    Ok(DiscoveredCorpus { files, load_errors })
}

/// Read and parse one document. An unreadable or non-UTF-8 file becomes a
/// load-error record.
pub fn load_document(root: &Path, path: &Path) -> std::result::Result<PromptDocument, LoadError> {
    let rel_path = rel_id(root, path);
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            return Err(LoadError {
                path: rel_path,
                message: format!("read failed: {err}"),
            });
        }
    };
    let split = frontmatter::split_frontmatter(&text);
    let category = category_of(&rel_path);
    Ok(PromptDocument {
        abs_path: path.to_path_buf(),
        rel_path,
        category,
        frontmatter: split.frontmatter,
        body: split.body,
        warnings: split.warnings,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn rel_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    util::rel_unix_path(rel)
}

fn category_of(rel_path: &str) -> String {
    match rel_path.split_once('/') {
        Some((first, _)) => first.to_string(),
        None => ".".to_string(),
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
