//! # Digest Engine Module
//!
//! Reduces a raw RTT sample set to the bucketed statistical summary the
//! plotting tools consume: per bucket, a sample count, p50/p99/p99.9 RTTs,
//! and the matching slowdown percentiles (RTT divided by the unloaded
//! baseline for that message length).
//!
//! ## Sweep
//!
//! The engine walks distinct message lengths in ascending order, appending
//! each length's RTTs (and their slowdowns, in lockstep) to the in-progress
//! bucket. Whenever the sweep length passes the current bucket boundary the
//! bucket is closed: both lists are sorted and percentiles are taken at
//! floor indices `count/2`, `count*99/100`, and `count*999/1000`. A
//! sentinel length greater than any real one forces the final bucket to
//! flush. Progress is strictly forward; no length is visited twice.
//!
//! The truncating-index percentile rule is deliberately not an interpolated
//! percentile. For small buckets it can pick the minimum or maximum element
//! as the "median", but the downstream plots are calibrated to exactly this
//! rule, so it must not be replaced with histogram estimation.

use crate::baseline::BaselineMap;
use crate::buckets::{bucket_boundaries, Bucket};
use crate::cli::AnalysisConfig;
use crate::filedata::FileDataCache;
use crate::logging::CperfLog;
use crate::report;
use crate::samples::{read_rtts, RttSamples};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Fatal precondition failures for digest computation.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("No unloaded data: baseline must be loaded before digesting")]
    MissingBaseline,

    #[error("No samples for experiment '{0}': nothing to digest")]
    NoSamples(String),
}

/// The digested data for one experiment.
///
/// All per-bucket vectors are parallel: index `i` describes bucket `i` in
/// ascending length order. The record is immutable once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    /// Name of the experiment this digest describes.
    pub experiment: String,
    /// Total number of samples across all lengths.
    pub total_messages: usize,
    /// Largest message length covered by each bucket.
    pub lengths: Vec<u64>,
    /// Fraction of all messages with each bucket's length or smaller.
    pub cum_frac: Vec<f64>,
    /// Number of RTTs represented by each bucket.
    pub counts: Vec<usize>,
    pub p50: Vec<f64>,
    pub p99: Vec<f64>,
    pub p999: Vec<f64>,
    pub slow_50: Vec<f64>,
    pub slow_99: Vec<f64>,
    pub slow_999: Vec<f64>,
}

impl Digest {
    fn new(experiment: &str, total_messages: usize) -> Self {
        Self {
            experiment: experiment.to_string(),
            total_messages,
            lengths: Vec::new(),
            cum_frac: Vec::new(),
            counts: Vec::new(),
            p50: Vec::new(),
            p99: Vec::new(),
            p999: Vec::new(),
            slow_50: Vec::new(),
            slow_99: Vec::new(),
            slow_999: Vec::new(),
        }
    }

    /// Close out the in-progress bucket, recording its percentiles.
    ///
    /// A bucket with no samples gets a single synthetic zero so percentile
    /// indexing never runs into an empty list; its count stays zero.
    fn close_bucket(
        &mut self,
        bucket: Bucket,
        count: usize,
        mut rtts: Vec<f64>,
        mut slowdowns: Vec<f64>,
    ) {
        self.lengths.push(bucket.max_length);
        self.cum_frac.push(bucket.cum_frac);
        self.counts.push(count);

        if rtts.is_empty() {
            rtts.push(0.0);
            slowdowns.push(0.0);
        }
        rtts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        self.p50.push(rtts[count / 2]);
        self.p99.push(rtts[count * 99 / 100]);
        self.p999.push(rtts[count * 999 / 1000]);
        slowdowns.sort_by(|a, b| a.partial_cmp(b).unwrap());
        self.slow_50.push(slowdowns[count / 2]);
        self.slow_99.push(slowdowns[count * 99 / 100]);
        self.slow_999.push(slowdowns[count * 999 / 1000]);
    }
}

/// Compute the digest for one experiment's samples.
///
/// Fails before any bucketing work if the baseline is empty, and if the
/// sample set itself is empty (there is no boundary to target). On
/// completion a single line naming the experiment is written to the run
/// log.
pub fn compute_digest(
    experiment: &str,
    rtts: &RttSamples,
    total: usize,
    baseline: &BaselineMap,
    log: &mut CperfLog,
) -> Result<Digest> {
    if baseline.is_empty() {
        return Err(DigestError::MissingBaseline.into());
    }
    let buckets = bucket_boundaries(rtts, total);
    let mut boundaries = buckets.iter().copied();
    let mut current = boundaries
        .next()
        .ok_or_else(|| DigestError::NoSamples(experiment.to_string()))?;

    let mut digest = Digest::new(experiment, total);
    let mut bucket_rtts: Vec<f64> = Vec::new();
    let mut bucket_slowdowns: Vec<f64> = Vec::new();
    let mut bucket_count = 0usize;
    let mut cur_unloaded = baseline.first_value()?;

    // One extra iteration with a length above every real one flushes the
    // final bucket; it is never digested as its own entry.
    let sentinel = u64::MAX;
    for length in rtts.keys().copied().chain(std::iter::once(sentinel)) {
        if length > current.max_length {
            digest.close_bucket(
                current,
                bucket_count,
                std::mem::take(&mut bucket_rtts),
                std::mem::take(&mut bucket_slowdowns),
            );
            match boundaries.next() {
                Some(next) => {
                    current = next;
                    bucket_count = 0;
                }
                None => break,
            }
        }
        if let Some(unloaded) = baseline.get(length) {
            cur_unloaded = unloaded;
        }
        if let Some(samples) = rtts.get(&length) {
            bucket_count += samples.len();
            for &rtt in samples {
                bucket_rtts.push(rtt);
                bucket_slowdowns.push(rtt / cur_unloaded);
            }
        }
    }

    log.log(&format!("Digest finished for {}", experiment))?;
    Ok(digest)
}

/// Per-run analysis state: digests memoized by experiment name, the parsed
/// data-file cache, and the timestamp stamped into every report header.
///
/// Created once per analysis run and dropped at process exit. Passing it by
/// reference keeps runs test-isolated; nothing here is process-global.
pub struct AnalysisCache {
    digests: HashMap<String, Digest>,
    pub file_data: FileDataCache,
    date_time: String,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self {
            digests: HashMap::new(),
            file_data: FileDataCache::new(),
            date_time: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S%.6f")
                .to_string(),
        }
    }

    /// Timestamp of this analysis run, as written into report headers.
    pub fn timestamp(&self) -> &str {
        &self.date_time
    }

    /// Return the digest for an experiment's sample file, computing it on
    /// first request.
    ///
    /// The experiment name is the sample file's stem. A new digest is
    /// persisted to `<log_dir>/reports/<experiment>.data` (and a JSON
    /// sidecar when enabled) before this returns; cached digests are
    /// returned without touching the filesystem.
    pub fn digest_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        config: &AnalysisConfig,
        baseline: &BaselineMap,
        log: &mut CperfLog,
    ) -> Result<&Digest> {
        let path = path.as_ref();
        let experiment = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .with_context(|| format!("Cannot derive experiment name from {}", path.display()))?
            .to_string();

        if !self.digests.contains_key(&experiment) {
            // Checked again in compute_digest, but failing here keeps an
            // unusable run from reading any input at all.
            if baseline.is_empty() {
                return Err(DigestError::MissingBaseline.into());
            }
            log.vlog(&format!("Reading RTT data for {} experiment", experiment))?;
            let mut rtts = RttSamples::new();
            let total = read_rtts(path, &mut rtts)?;
            debug!("Read {} samples for {}", total, experiment);

            let digest = compute_digest(&experiment, &rtts, total, baseline, log)?;

            let report_path = config.report_path(&experiment);
            report::write_report(&digest, &report_path, &self.date_time)?;
            if config.json {
                let json_path = report_path.with_extension("json");
                let json = serde_json::to_string_pretty(&digest)?;
                std::fs::write(&json_path, json).with_context(|| {
                    format!("Failed to write JSON digest {}", json_path.display())
                })?;
                info!("Wrote JSON digest to {}", json_path.display());
            }

            self.digests.insert(experiment.clone(), digest);
        }
        Ok(&self.digests[&experiment])
    }
}
