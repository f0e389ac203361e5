//! # Report Writer Module
//!
//! Serializes a digest to the fixed-column text table the plotting tools
//! consume. The column widths and ordering are a stable contract; changing
//! them breaks every downstream consumer, so the formatting here must stay
//! byte-for-byte what it is.

use crate::digest::Digest;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write a digest report to `path`, creating parent directories as needed.
///
/// Layout:
/// ```text
/// # Digested data for <experiment> experiment, run at <timestamp>
/// # length  cum_frac  samples     p50      p99     p999   s50    s99    s999
///      100  0.666667        2    20.0     20.0     20.0   2.0    2.0     2.0
/// ```
pub fn write_report<P: AsRef<Path>>(digest: &Digest, path: P, timestamp: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create report directory {}", parent.display())
        })?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "# Digested data for {} experiment, run at {}",
        digest.experiment, timestamp
    )?;
    writeln!(
        writer,
        "# length  cum_frac  samples     p50      p99     p999   s50    s99    s999"
    )?;
    for i in 0..digest.lengths.len() {
        writeln!(
            writer,
            " {:7} {:9.6} {:8} {:7.1} {:8.1} {:8.1} {:5.1} {:6.1} {:7.1}",
            digest.lengths[i],
            digest.cum_frac[i],
            digest.counts[i],
            digest.p50[i],
            digest.p99[i],
            digest.p999[i],
            digest.slow_50[i],
            digest.slow_99[i],
            digest.slow_999[i]
        )?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write report file {}", path.display()))?;

    info!("Wrote digest report to {}", path.display());
    Ok(())
}
