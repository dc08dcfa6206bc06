use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;

/// Extension of the lossless files picked up from the source tree.
pub const SOURCE_EXTENSION: &str = ".flac";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported output format `{0}`. Expected one of: mp3, alac")]
    Unsupported(String),
}

/// Destination format for a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Mp3,
    #[default]
    Alac,
}

impl OutputFormat {
    /// Extension of the files this format produces, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => ".mp3",
            OutputFormat::Alac => ".m4a",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Alac => "alac",
        }
    }

    /// Label used in the plan summary, e.g. "MP3" or "M4A".
    pub fn label(self) -> String {
        self.extension().trim_start_matches('.').to_uppercase()
    }

    /// Encoder arguments turning `source` into `destination`.
    pub fn encoder_args(self, source: &Path, destination: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), source.into()];
        let template: &[&str] = match self {
            OutputFormat::Mp3 => &["-c:a", "libmp3lame", "-qscale:a", "0", "-map_metadata", "0"],
            OutputFormat::Alac => &[
                "-c:a",
                "alac",
                "-c:v",
                "copy",
                "-map_metadata",
                "0",
                "-movflags",
                "+faststart",
                "-f",
                "ipod",
                "-ar",
                "44100",
            ],
        };
        args.extend(template.iter().map(OsString::from));
        args.push(destination.into());
        args
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(OutputFormat::Mp3),
            "alac" => Ok(OutputFormat::Alac),
            _ => Err(FormatError::Unsupported(s.to_string())),
        }
    }
}

/// Replace the last extension of `path` with `new_extension` (given with its dot).
pub fn replace_extension(path: &Path, new_extension: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    out.set_extension(new_extension.trim_start_matches('.'));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_follow_format() {
        assert_eq!(OutputFormat::Mp3.extension(), ".mp3");
        assert_eq!(OutputFormat::Alac.extension(), ".m4a");
        assert_eq!(OutputFormat::Mp3.label(), "MP3");
        assert_eq!(OutputFormat::Alac.label(), "M4A");
    }

    #[test]
    fn default_format_is_alac() {
        assert_eq!(OutputFormat::default(), OutputFormat::Alac);
    }

    #[test]
    fn parses_known_formats_and_rejects_others() {
        assert_eq!("mp3".parse::<OutputFormat>(), Ok(OutputFormat::Mp3));
        assert_eq!("ALAC".parse::<OutputFormat>(), Ok(OutputFormat::Alac));
        assert_eq!(
            "ogg".parse::<OutputFormat>(),
            Err(FormatError::Unsupported("ogg".to_string()))
        );
    }

    #[test]
    fn replaces_only_last_extension() {
        assert_eq!(
            replace_extension(Path::new("a/song.flac"), ".mp3"),
            PathBuf::from("a/song.mp3")
        );
        assert_eq!(
            replace_extension(Path::new("live.2001.flac"), ".m4a"),
            PathBuf::from("live.2001.m4a")
        );
        assert_eq!(
            replace_extension(Path::new("b/noext"), ".mp3"),
            PathBuf::from("b/noext.mp3")
        );
    }

    #[test]
    fn mp3_argument_template() {
        let args = OutputFormat::Mp3.encoder_args(Path::new("in.flac"), Path::new("out.mp3"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "-i", "in.flac", "-c:a", "libmp3lame", "-qscale:a", "0", "-map_metadata", "0",
                "out.mp3"
            ]
        );
    }

    #[test]
    fn alac_argument_template() {
        let args = OutputFormat::Alac.encoder_args(Path::new("in.flac"), Path::new("out.m4a"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "-i",
                "in.flac",
                "-c:a",
                "alac",
                "-c:v",
                "copy",
                "-map_metadata",
                "0",
                "-movflags",
                "+faststart",
                "-f",
                "ipod",
                "-ar",
                "44100",
                "out.m4a"
            ]
        );
    }
}
