use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use spdlog::{info, warn};

use blog2md::config::open_config;
use blog2md::import::{ImportOptions, Source};
use blog2md::logger::configure_logger;
use blog2md::runner::import_run;

#[derive(Parser, Debug)]
#[command(version, about = "Converts Blogger and WordPress exports into Markdown posts", long_about = None)]
struct Args {
    /// Export format: b (Blogger) or w (WordPress)
    #[arg(value_enum, ignore_case = true)]
    source: Source,

    /// Export file
    input: PathBuf,

    /// Directory the posts are written to
    output: PathBuf,

    /// [m|s] [paragraph-fix] [create-page-bundles]
    flags: Vec<String>,

    /// Config path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_path) = open_config(args.config)
        .context("Please run blog2md --help")?;

    if let Err(err) = configure_logger(&config, args.verbose) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    if let Some(path) = config_path {
        info!("Using config {}", path.display());
    }

    let (options, unknown) = ImportOptions::from_flags(args.output, &args.flags);
    for flag in unknown {
        warn!("Ignoring unknown option '{}'", flag);
    }

    info!("Starting {:?} import of {}", args.source, args.input.display());

    let report = import_run(args.source, &args.input, &options, &config)
        .with_context(|| format!("Import of {} failed", args.input.display()))?;

    if let Some(summary) = report.import {
        info!("Posts: {}, skipped: {}, orphan comments: {}", summary.posts, summary.skipped, summary.orphan_comments);
        info!("Files written: {} posts, {} comment files, {} failures",
            summary.written.posts, summary.written.comment_files, summary.written.failures);
    }
    info!("Images: {} saved, {} failed", report.images.saved, report.images.failed);

    spdlog::default_logger().flush();

    Ok(())
}
