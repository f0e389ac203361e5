//! # Sample Reader Module
//!
//! Parses the latency-sample files emitted by cp_node's `dump_times` command.
//! Each non-comment line carries at least two whitespace-separated fields:
//! the message length in bytes followed by the observed round-trip time in
//! microseconds. Trailing fields are ignored.
//!
//! ## File Format
//!
//! ```text
//! # length   rtt_usec
//! 100        10.3
//! 100        11.9
//! 5000       87.2
//! ```
//!
//! Lines whose first non-whitespace character is `#` are comments. Lines with
//! fewer than two fields are diagnosed and skipped; they never abort a run.
//! Unparseable numeric fields, by contrast, are fatal: the input is a static,
//! already-captured file, so a corrupt field means the capture itself is bad.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Raw RTT samples for one experiment, keyed by message length in bytes.
///
/// Each value holds every RTT (in microseconds) observed for messages of
/// that length, in file order. The `BTreeMap` keeps lengths sorted, which
/// the bucketizer and digest engine rely on for their ascending sweeps.
pub type RttSamples = BTreeMap<u64, Vec<f64>>;

/// Read a sample file and merge its contents into `rtts`.
///
/// Returns the number of valid samples read from this file. Multiple files
/// for the same experiment can be accumulated into one map by calling this
/// repeatedly with the same accumulator.
///
/// Short lines (fewer than two fields) are logged and skipped. A length
/// field that does not parse as an integer, or an RTT field that does not
/// parse as a float, aborts the read with a fatal error naming the file
/// and line number.
pub fn read_rtts<P: AsRef<Path>>(path: P, rtts: &mut RttSamples) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open sample file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut total = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line
            .with_context(|| format!("Failed to read from sample file {}", path.display()))?;
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let mut fields = stripped.split_whitespace();
        let (length_field, rtt_field) = match (fields.next(), fields.next()) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                warn!(
                    "Line {} in {} too short (need at least 2 columns): '{}'",
                    line_no + 1,
                    path.display(),
                    line
                );
                continue;
            }
        };

        let length: u64 = length_field.parse().with_context(|| {
            format!(
                "Invalid message length '{}' at {}:{}",
                length_field,
                path.display(),
                line_no + 1
            )
        })?;
        let rtt: f64 = rtt_field.parse().with_context(|| {
            format!(
                "Invalid RTT '{}' at {}:{}",
                rtt_field,
                path.display(),
                line_no + 1
            )
        })?;

        rtts.entry(length).or_default().push(rtt);
        total += 1;
    }

    Ok(total)
}
