use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::ffmpeg::{Encoder, EncoderError};
use crate::format::OutputFormat;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Encoder(#[from] EncoderError),
}

/// Transcode one file, creating the destination's parent directories first.
///
/// A failed encode removes whatever partial output it left, so the next run
/// plans the file again.
pub fn convert_file(
    encoder: &Encoder,
    source: &Path,
    destination: &Path,
    format: OutputFormat,
) -> Result<(), ConvertError> {
    ensure_parent_directory(destination)?;
    if let Err(e) = encoder.run(&format.encoder_args(source, destination)) {
        remove_partial_output(destination);
        return Err(e.into());
    }
    Ok(())
}

fn remove_partial_output(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove partial output {}: {}", path.display(), e),
    }
}

fn ensure_parent_directory(path: &Path) -> Result<(), ConvertError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| ConvertError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
