use crate::cli::Args;
use crate::config::{DEFAULT_CONFIG_FILE, SyncConfig};
use crate::converter::{ConvertError, convert_file};
use crate::ffmpeg::{DEFAULT_ENCODER, Encoder, EncoderError};
use crate::format::{OutputFormat, SOURCE_EXTENSION};
use crate::plan::SyncPlan;
use crate::scanner::scan_directory;
use anyhow::{Result, anyhow, bail};
use comfy_table::{Table, presets::UTF8_FULL};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Resolved settings for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub format: OutputFormat,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was converted on purpose; `planned` files would have been.
    DryRun { planned: usize },
    /// Every planned file was converted (possibly none).
    Completed { converted: usize },
    /// The encoder failed on `failed`; later files were not attempted.
    Stopped { converted: usize, failed: PathBuf },
}

impl RunOutcome {
    pub fn converted(&self) -> usize {
        match self {
            RunOutcome::DryRun { .. } => 0,
            RunOutcome::Completed { converted } | RunOutcome::Stopped { converted, .. } => {
                *converted
            }
        }
    }

    pub fn summary(&self) -> String {
        match self.converted() {
            0 => "Failed to convert any files".to_string(),
            n => format!("Successfully converted {} files", n),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::Stopped { .. })
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

pub fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };

    let encoder = Encoder::new(
        args.encoder
            .clone()
            .or_else(|| config.encoder.clone())
            .unwrap_or_else(|| DEFAULT_ENCODER.to_string()),
    );

    if args.check_encoder {
        handle_encoder_check(&encoder)?;
        return Ok(ExitCode::SUCCESS);
    }

    let options = resolve_options(&args, &config)?;

    if let Some(write_config) = &args.write_config {
        let path = write_config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if options.dry_run {
            println!("Dry run: not writing config to {}", path.display());
        } else {
            write_resolved_config(&options, &encoder, &path)?;
        }
    }

    let outcome = sync_files(&options, &encoder, &mut io::stdout().lock())?;
    Ok(outcome.exit_code())
}

fn write_resolved_config(options: &SyncOptions, encoder: &Encoder, path: &Path) -> Result<()> {
    let resolved = SyncConfig {
        source: Some(options.source.clone()),
        destination: Some(options.destination.clone()),
        format: Some(options.format.to_string()),
        encoder: Some(encoder.program().to_string_lossy().into_owned()),
        dry_run: options.dry_run,
    };
    resolved.write(path)?;
    println!("Wrote config to {}", path.display());
    Ok(())
}

fn resolve_options(args: &Args, config: &SyncConfig) -> Result<SyncOptions> {
    let source = args
        .source
        .clone()
        .or_else(|| config.source.clone())
        .ok_or_else(|| anyhow!("source directory is required"))?;
    let destination = args
        .destination
        .clone()
        .or_else(|| config.destination.clone())
        .ok_or_else(|| anyhow!("destination directory is required"))?;
    let format = match args.format {
        Some(format) => format,
        None => config.output_format()?.unwrap_or_default(),
    };

    Ok(SyncOptions {
        source,
        destination,
        format,
        dry_run: args.dry_run || config.dry_run,
    })
}

/// Plan and convert every missing output, stopping at the first encoder failure.
///
/// Status lines for the user go to `out`.
pub fn sync_files(
    options: &SyncOptions,
    encoder: &Encoder,
    out: &mut impl Write,
) -> Result<RunOutcome> {
    tracing::info!(
        "Syncing {} -> {}",
        options.source.display(),
        options.destination.display()
    );

    let input_files = scan_directory(&options.source, SOURCE_EXTENSION)?;
    let existing_output_files = if options.destination.exists() {
        scan_directory(&options.destination, options.format.extension())?
    } else {
        tracing::debug!(
            "{} does not exist yet, nothing converted so far",
            options.destination.display()
        );
        Vec::new()
    };
    let plan = SyncPlan::compute(&input_files, options.format, &existing_output_files);

    writeln!(out, "{}", plan.summary())?;

    let outcome = if options.dry_run {
        for relative_path in &plan.missing {
            print_transfer(out, options, relative_path)?;
        }
        writeln!(out, "Dry run: {} files would be converted", plan.missing.len())?;
        RunOutcome::DryRun {
            planned: plan.missing.len(),
        }
    } else {
        if !plan.is_empty() {
            encoder.check_available()?;
        }
        convert_missing(out, options, encoder, &plan)?
    };

    writeln!(out, "{}", outcome.summary())?;
    Ok(outcome)
}

fn convert_missing(
    out: &mut impl Write,
    options: &SyncOptions,
    encoder: &Encoder,
    plan: &SyncPlan,
) -> Result<RunOutcome> {
    let mut converted = 0;

    for relative_path in &plan.missing {
        let (source_path, destination_path) = print_transfer(out, options, relative_path)?;

        match convert_file(encoder, &source_path, &destination_path, options.format) {
            Ok(()) => {
                converted += 1;
                tracing::debug!("Converted {}", destination_path.display());
            }
            Err(ConvertError::Encoder(EncoderError::CommandFailed {
                command,
                status,
                stdout,
                stderr,
            })) => {
                writeln!(out, "Error: command failed ({}): {}", status, command)?;
                writeln!(out, "STDOUT:")?;
                writeln!(out, "{}", stdout)?;
                writeln!(out, "STDERR:")?;
                writeln!(out, "{}", stderr)?;
                writeln!(out, "Failed to convert {}. Stopping", source_path.display())?;
                return Ok(RunOutcome::Stopped {
                    converted,
                    failed: relative_path.clone(),
                });
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to convert {}", source_path.display())));
            }
        }
    }

    Ok(RunOutcome::Completed { converted })
}

fn print_transfer(
    out: &mut impl Write,
    options: &SyncOptions,
    relative_path: &Path,
) -> io::Result<(PathBuf, PathBuf)> {
    let source_path = SyncPlan::source_path(&options.source, relative_path);
    let destination_path = SyncPlan::destination_path(&options.destination, relative_path);
    writeln!(out, "{} -> {}", source_path.display(), destination_path.display())?;
    Ok((source_path, destination_path))
}

fn handle_encoder_check(encoder: &Encoder) -> Result<()> {
    let program = encoder.program().to_string_lossy().into_owned();
    println!("🔍 Checking encoder `{}`...\n", program);

    let result = encoder.check_installation()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Check", "Result"]);

    let version = result
        .version
        .as_ref()
        .map(|v| format!("{}.{}.{}", v.major, v.minor, v.patch))
        .unwrap_or_else(|| "unknown (development build?)".to_string());
    table.add_row(vec!["Version".to_string(), version]);

    for (codec, available) in &result.codecs {
        let status = if *available { "✅ available" } else { "❌ missing" };
        table.add_row(vec![format!("Codec {}", codec), status.to_string()]);
    }

    println!("{table}");

    let missing: Vec<&str> = result
        .codecs
        .iter()
        .filter(|(_, available)| !available)
        .map(|(codec, _)| *codec)
        .collect();
    if !missing.is_empty() {
        bail!(
            "`{}` lacks required codecs: {}",
            program,
            missing.join(", ")
        );
    }

    println!("\n🎉 Encoder check complete!");
    Ok(())
}
