use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::format::OutputFormat;

/// Default file name used by `--write-config` when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "musicsync.json";

/// Sync profile stored as JSON. Command-line arguments override every field.
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct SyncConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    /// Kept as text so that an unknown format fails with a clear error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: SyncConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn output_format(&self) -> anyhow::Result<Option<OutputFormat>> {
        self.format
            .as_deref()
            .map(str::parse::<OutputFormat>)
            .transpose()
            .context("Invalid `format` in config")
    }
}
