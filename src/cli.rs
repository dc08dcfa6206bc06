use clap::Parser;
use std::path::PathBuf;

use crate::format::OutputFormat;

/// Mirror a tree of FLAC files into MP3 or ALAC copies, converting only what is missing
#[derive(Parser, Debug)]
#[command(name = "musicsync", author, version, about)]
pub struct Args {
    /// Source directory containing .flac files
    #[arg(required_unless_present_any = ["config", "check_encoder"])]
    pub source: Option<PathBuf>,

    /// Destination directory receiving the converted files
    #[arg(required_unless_present_any = ["config", "check_encoder"])]
    pub destination: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the conversion plan without creating directories or encoding anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Output format [default: alac]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Encoder program to invoke [default: ffmpeg]
    #[arg(short, long)]
    pub encoder: Option<String>,

    /// JSON file with source, destination, format, encoder and dry_run. CLI arguments override values in the file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the resolved settings to this file as JSON (musicsync.json if no file is given).
    #[arg(short, long = "write-config", num_args = 0..=1, value_name = "FILE")]
    pub write_config: Option<Option<PathBuf>>,

    /// Check that the encoder is installed and supports the output codecs
    #[arg(long)]
    pub check_encoder: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_positionals_and_flags() {
        let args =
            Args::try_parse_from(["musicsync", "-v", "-d", "-f", "mp3", "/music", "/phone"])
                .unwrap();

        assert_eq!(args.source, Some(PathBuf::from("/music")));
        assert_eq!(args.destination, Some(PathBuf::from("/phone")));
        assert!(args.verbose);
        assert!(args.dry_run);
        assert_eq!(args.format, Some(OutputFormat::Mp3));
    }

    #[test]
    fn format_is_unset_unless_given() {
        let args = Args::try_parse_from(["musicsync", "/music", "/phone"]).unwrap();
        assert_eq!(args.format, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Args::try_parse_from(["musicsync", "-f", "ogg", "/music", "/phone"]).is_err());
    }

    #[test]
    fn directories_required_without_config() {
        assert!(Args::try_parse_from(["musicsync", "/music"]).is_err());
        assert!(Args::try_parse_from(["musicsync", "--config", "p.json"]).is_ok());
        assert!(Args::try_parse_from(["musicsync", "--check-encoder"]).is_ok());
    }

    #[test]
    fn write_config_path_is_optional() {
        let args = Args::try_parse_from(["musicsync", "/a", "/b", "-w"]).unwrap();
        assert_eq!(args.write_config, Some(None));

        let args = Args::try_parse_from(["musicsync", "/a", "/b", "-w", "p.json"]).unwrap();
        assert_eq!(args.write_config, Some(Some(PathBuf::from("p.json"))));
    }
}
