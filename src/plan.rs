use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::format::{OutputFormat, SOURCE_EXTENSION, replace_extension};

/// Outputs that still have to be produced, in the order they will be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub format: OutputFormat,
    pub source_count: usize,
    pub existing_count: usize,
    /// Relative output paths, sorted lexicographically.
    pub missing: Vec<PathBuf>,
}

impl SyncPlan {
    pub fn compute(
        source_files: &[PathBuf],
        format: OutputFormat,
        destination_files: &[PathBuf],
    ) -> Self {
        let existing: HashSet<&Path> = destination_files.iter().map(PathBuf::as_path).collect();
        let mut missing: Vec<PathBuf> = source_files
            .iter()
            .map(|path| replace_extension(path, format.extension()))
            .filter(|output| !existing.contains(output.as_path()))
            .collect();
        // Plain string order, so "a b/x" sorts before "a/x".
        missing.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        missing.dedup();

        SyncPlan {
            format,
            source_count: source_files.len(),
            existing_count: destination_files.len(),
            missing,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Input FLAC files: {}, existing {} files: {}. Will convert {} files.",
            self.source_count,
            self.format.label(),
            self.existing_count,
            self.missing.len()
        )
    }

    /// Absolute `.flac` source for a planned output.
    pub fn source_path(source_root: &Path, relative_output: &Path) -> PathBuf {
        source_root.join(replace_extension(relative_output, SOURCE_EXTENSION))
    }

    pub fn destination_path(destination_root: &Path, relative_output: &Path) -> PathBuf {
        destination_root.join(relative_output)
    }
}
