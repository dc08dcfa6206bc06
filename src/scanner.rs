//! Recursive lookup of files by extension.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect files under `root` whose name ends with `extension`.
///
/// The match is a case-sensitive suffix match on the raw file name, so names
/// that are not valid UTF-8 are kept. Symlinks to files are included. Paths are
/// returned relative to `root` in walk order; callers sort when they need to.
pub fn scan_directory(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Directory not found: {}", root.display());
    }
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut matching = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to read {}", root.display()))?;
        // Symlinks to files count; symlinked directories are not descended into.
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        if !entry
            .file_name()
            .as_encoded_bytes()
            .ends_with(extension.as_bytes())
        {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
        matching.push(relative.to_path_buf());
    }

    tracing::debug!(
        "Found {} {} files under {}",
        matching.len(),
        extension,
        root.display()
    );
    Ok(matching)
}
