use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gabvid_common::observability::init_logging;
use gabvid_config::{GabvidConfig, GabvidConfigLoader};
use gabvid_extract::VideoExtractor;
use tracing::info;

/// Extract video URL from Gab HTML content.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// HTML file to parse
    #[arg(long)]
    file: PathBuf,
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long)]
    debug: bool,
    /// YAML configuration file; skipped when absent
    #[arg(long, env = "GABVID_CONFIG", default_value = "gabvid.yaml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        // a closed stdout (e.g. `| true`) is a failed run, not a panic
        Ok(Some(url)) => match writeln!(io::stdout().lock(), "{url}") {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
        Ok(None) => ExitCode::FAILURE,
        Err(e) => {
            let _ = writeln!(io::stderr().lock(), "gabvid: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns the URL when one is found. The log handle lives until return so
/// the file sink is flushed before `main` exits.
fn run(args: &Args) -> Result<Option<String>> {
    // 1) Load config (env wins)
    let cfg: GabvidConfig = GabvidConfigLoader::new()
        .with_file(&args.config)
        .load()
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    let mut log_config = cfg.logging.to_log_config();
    if args.debug {
        log_config.default_filter = "debug".to_string();
    }
    let _log = init_logging(log_config)?;

    let extractor = VideoExtractor::with_properties(cfg.extract.properties)?;
    info!(file = %args.file.display(), properties = ?extractor.properties(), "looking for video url");

    Ok(extractor.extract_from_file(&args.file).map(|m| m.url))
}
