use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io,
    process::{Command, ExitStatus, Stdio},
};
use thiserror::Error;

pub const DEFAULT_ENCODER: &str = "ffmpeg";

const REQUIRED_CODECS: &[&str] = &["libmp3lame", "alac"];

#[derive(Debug)]
pub struct EncoderVersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Debug)]
pub struct EncoderCheckResult {
    pub version: Option<EncoderVersionInfo>,
    /// Required codec name paired with whether the encoder lists it.
    pub codecs: Vec<(&'static str, bool)>,
}

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("`{0}` command not found. Please ensure it is installed and in your PATH.")]
    CommandNotFound(String),
    #[error("Command failed ({status}): {command}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    #[error("Could not parse encoder version from output.")]
    VersionParse,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// External encoder program invoked once per conversion.
#[derive(Debug, Clone)]
pub struct Encoder {
    program: OsString,
}

impl Encoder {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Run the encoder to completion, capturing its output.
    ///
    /// A non-zero exit is returned as [`EncoderError::CommandFailed`] with the
    /// captured stdout and stderr attached.
    pub fn run<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<(), EncoderError> {
        let command_line = self.command_line(args);
        tracing::debug!("Running {}", command_line);

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(EncoderError::CommandFailed {
                command: command_line,
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    /// Make sure the encoder can be spawned at all.
    pub fn check_available(&self) -> Result<(), EncoderError> {
        Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|_| ())
            .map_err(|e| self.spawn_error(e))
    }

    /// Query version and codec support for `--check-encoder`.
    pub fn check_installation(&self) -> Result<EncoderCheckResult, EncoderError> {
        let output = self.capture(&["-version"])?;
        let version = parse_version(&output)?;

        let encoders = self.capture(&["-hide_banner", "-encoders"])?;
        let codecs = REQUIRED_CODECS
            .iter()
            .map(|codec| (*codec, lists_codec(&encoders, codec)))
            .collect();

        Ok(EncoderCheckResult { version, codecs })
    }

    fn capture(&self, args: &[&str]) -> Result<String, EncoderError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(EncoderError::CommandFailed {
                command: self.command_line(args),
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn command_line<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.as_ref().to_string_lossy());
        }
        line
    }

    fn spawn_error(&self, e: io::Error) -> EncoderError {
        if e.kind() == io::ErrorKind::NotFound {
            EncoderError::CommandNotFound(self.program.to_string_lossy().into_owned())
        } else {
            EncoderError::Io(e)
        }
    }
}

/// Extract `major.minor[.patch]` from `ffmpeg -version` output.
///
/// Returns `Ok(None)` for output that does not carry a numeric release, such
/// as git snapshot builds.
pub fn parse_version(output: &str) -> Result<Option<EncoderVersionInfo>, EncoderError> {
    if !output.contains("version") {
        return Err(EncoderError::VersionParse);
    }
    let re = Regex::new(r"version n?(\d+)\.(\d+)(?:\.(\d+))?")?;
    let Some(caps) = re.captures(output) else {
        return Ok(None);
    };
    let number = |i: usize| -> u32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    Ok(Some(EncoderVersionInfo {
        major: number(1),
        minor: number(2),
        patch: number(3),
    }))
}

fn lists_codec(encoders: &str, codec: &str) -> bool {
    encoders
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some(codec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_version() {
        let info = parse_version("ffmpeg version 7.1.1 Copyright (c) 2000-2025")
            .unwrap()
            .unwrap();
        assert_eq!((info.major, info.minor, info.patch), (7, 1, 1));
    }

    #[test]
    fn parses_version_without_patch() {
        let info = parse_version("ffmpeg version n6.0 Copyright").unwrap().unwrap();
        assert_eq!((info.major, info.minor, info.patch), (6, 0, 0));
    }

    #[test]
    fn snapshot_build_has_no_numeric_version() {
        assert!(
            parse_version("ffmpeg version N-113000-gabcdef")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn garbage_output_is_a_parse_error() {
        assert!(matches!(
            parse_version("hello"),
            Err(EncoderError::VersionParse)
        ));
    }

    #[test]
    fn finds_codecs_in_encoder_listing() {
        let listing = "Encoders:\n ------\n A....D alac                 ALAC (Apple Lossless Audio Codec)\n A....D libmp3lame           libmp3lame MP3 (MPEG audio layer 3)\n";
        assert!(lists_codec(listing, "alac"));
        assert!(lists_codec(listing, "libmp3lame"));
        assert!(!lists_codec(listing, "libopus"));
    }

    #[test]
    fn missing_program_is_reported_as_not_found() {
        let encoder = Encoder::new("musicsync-no-such-encoder");
        assert!(matches!(
            encoder.check_available(),
            Err(EncoderError::CommandNotFound(name)) if name == "musicsync-no-such-encoder"
        ));
        assert!(matches!(
            encoder.run(&["-version"]),
            Err(EncoderError::CommandNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failed_run_captures_output() {
        let encoder = Encoder::new("sh");
        let err = encoder
            .run(&["-c", "echo out; echo err >&2; exit 3"])
            .unwrap_err();
        match err {
            EncoderError::CommandFailed {
                command,
                status,
                stdout,
                stderr,
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(status.code(), Some(3));
                assert_eq!(stdout, "out\n");
                assert_eq!(stderr, "err\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_run_is_ok() {
        Encoder::new("sh").run(&["-c", "exit 0"]).unwrap();
    }
}
