use crate::core::config::Source;
use crate::core::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file to validate, with its position in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub index: usize,
    pub path: PathBuf,
}

/// Resolve `source` into an ordered list of tasks.
///
/// An empty list is not an error here; callers decide whether zero files is fatal.
pub fn locate(source: &Source) -> Result<Vec<FileTask>, Error> {
    let paths = match source {
        Source::Pattern { root, pattern } => find_in_tree(root, pattern)?,
        Source::List { dir } => read_listing(dir)?,
        Source::Files(files) => files.clone(),
    };

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| FileTask { index, path })
        .collect())
}

/// Walk `root` depth-first in file-name order and collect regular files whose
/// base name matches the glob `pattern`. Symlinks are followed, so a link to
/// a file is listed under the link's own path.
pub fn find_in_tree(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let matcher = glob::Pattern::new(pattern).map_err(|e| Error::Discovery {
        path: root.to_path_buf(),
        reason: format!("invalid pattern {pattern:?}: {e}"),
    })?;

    let mut results = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Discovery {
            path: e.path().unwrap_or(root).to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.matches(&entry.file_name().to_string_lossy()) {
            results.push(openable(entry.into_path()));
        }
    }
    Ok(results)
}

/// Every entry of `dir`, not recursing and not filtering, sorted by name.
pub fn read_listing(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let discovery = |e: std::io::Error| Error::Discovery {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut results = Vec::new();
    for entry in fs::read_dir(dir).map_err(discovery)? {
        results.push(entry.map_err(discovery)?.path());
    }
    results.sort();
    Ok(results)
}

/// Prefix bare relative paths with `./` so they read as openable from the cwd.
fn openable(path: PathBuf) -> PathBuf {
    if path.is_absolute() || path.starts_with(".") || path.starts_with("..") {
        path
    } else {
        Path::new(".").join(path)
    }
}
