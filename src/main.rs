//! # cperf Analysis - Main Entry Point
//!
//! Command-line driver for the digesting pipeline. The flow is:
//!
//! 1. **Initialize logging**: tracing with the colorized console formatter,
//!    plus the plain-text cperf log file inside the log directory.
//! 2. **Parse arguments**: the full cperf option surface via clap.
//! 3. **Load the baseline**: the unloaded run's digest report supplies the
//!    slowdown denominator. Digesting without it is a fatal precondition
//!    failure, so it is checked before any sample file is opened.
//! 4. **Digest each sample file**: compute the digest and persist the
//!    fixed-width report under `<log_dir>/reports/`.
//!
//! Everything is single-threaded and synchronous: the inputs are static
//! files captured by an earlier benchmark run, and a digest either runs to
//! completion or aborts with a fatal error. There is no retry logic.

use anyhow::{Context, Result};
use clap::Parser;
use cperf_analysis::{
    baseline::BaselineMap,
    cli::{AnalysisConfig, Args},
    digest::AnalysisCache,
    logging::{ColorizedFormatter, CperfLog, FileLogSink},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // Console logging; the level can be raised via RUST_LOG, and --verbose
    // promotes the default from info to debug.
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .event_format(ColorizedFormatter)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("cperf analysis v{}", cperf_analysis::VERSION);

    let config = AnalysisConfig::from(&args);
    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!("Failed to create log directory {}", config.log_dir.display())
    })?;

    let sink = FileLogSink::open(config.log_file_path())?;
    let mut log = CperfLog::new(Box::new(sink), config.verbose);
    let mut cache = AnalysisCache::new();

    // The baseline must be in place before any bucketing work begins.
    let mut baseline = BaselineMap::new();
    if let Some(ref report) = args.unloaded_report {
        baseline.load_report(report, &mut cache.file_data)?;
    }

    for file in &args.files {
        let digest = cache.digest_file(file, &config, &baseline, &mut log)?;
        log.vlog(&format!(
            "{}: {} messages in {} buckets",
            digest.experiment,
            digest.total_messages,
            digest.lengths.len()
        ))?;
    }

    info!(
        "Digested {} experiment(s); reports in {}",
        args.files.len(),
        config.log_dir.join("reports").display()
    );
    Ok(())
}
