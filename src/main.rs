mod app;
mod cli;
mod config;
mod converter;
mod ffmpeg;
mod format;
mod logging;
mod plan;
mod scanner;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = cli::Args::parse();
    logging::init(args.verbose);
    app::run(args)
}
