//! # cperf Analysis Library
//!
//! Benchmark-analysis utilities for the cperf network-transport
//! performance-characterization suite. The library parses the latency
//! sample files that remote benchmark workers emit and reduces the raw
//! round-trip-time (RTT) samples into percentile/slowdown digests suitable
//! for plotting and reporting.
//!
//! ## Pipeline
//!
//! ```text
//! raw file -> Sample Reader -> {length -> RTTs, total}
//!          -> Bucketizer -> boundaries
//!          -> Digest Engine (consulting the Baseline Store)
//!          -> digest record -> Report Writer -> <log_dir>/reports/*.data
//! ```
//!
//! Process lifecycle management for the benchmark workers, plotting, and
//! experiment coordination all live elsewhere; this crate only consumes the
//! data files those steps leave behind.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cperf_analysis::{
//!     baseline::BaselineMap,
//!     digest::compute_digest,
//!     logging::{CperfLog, MemoryLogSink},
//!     samples::{read_rtts, RttSamples},
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut rtts = RttSamples::new();
//!     let total = read_rtts("w4.rtts", &mut rtts)?;
//!
//!     let mut baseline = BaselineMap::new();
//!     baseline.insert(100, 10.0);
//!
//!     let mut log = CperfLog::new(Box::new(MemoryLogSink::default()), false);
//!     let digest = compute_digest("w4", &rtts, total, &baseline, &mut log)?;
//!     println!("buckets: {}", digest.lengths.len());
//!     Ok(())
//! }
//! ```

/// Baseline (unloaded) RTT store used as the slowdown denominator
///
/// Holds the median unloaded RTT per message length, with a step-function
/// lookup policy for lengths without their own entry. Must be populated
/// before any digest is computed.
pub mod baseline;

/// Histogram bucket boundary generation
///
/// Converts a sample set into ordered (max-length, cumulative-fraction)
/// boundaries, one per distinct message length.
pub mod buckets;

/// Command-line interface and configuration
///
/// Clap-based argument parsing covering the full cperf option surface, and
/// the `AnalysisConfig` structure the digesting functions consume.
pub mod cli;

/// The digest engine and per-run analysis cache
///
/// The algorithmic heart: sweeps sorted lengths, accumulates per-bucket RTT
/// and slowdown lists, and takes floor-indexed percentiles. The cache
/// memoizes digests per experiment and persists reports as a side effect.
pub mod digest;

/// Column-oriented data-file reading with a per-path cache
pub mod filedata;

/// Console formatting and the cperf run-log sink
pub mod logging;

/// Fixed-width digest report writing
///
/// The column layout is a stable contract consumed by external plotting
/// tooling.
pub mod report;

/// Sample-file parsing
pub mod samples;

// Re-export the types most callers need.
pub use baseline::BaselineMap;
pub use buckets::{bucket_boundaries, Bucket};
pub use cli::{AnalysisConfig, Args};
pub use digest::{compute_digest, AnalysisCache, Digest};
pub use samples::{read_rtts, RttSamples};

/// The current version of the analysis crate, stamped into logs for
/// reproducibility.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
///
/// These mirror the defaults used across the cperf tooling, assuming that
/// servers and clients share nodes.
pub mod defaults {
    /// Generation rate in Gbits/sec; 0 means as fast as possible.
    pub const GBPS: f64 = 0.0;

    /// Maximum outstanding requests per client. Very large values hurt
    /// throughput under unlimited load (throttle queue inserts take a
    /// long time).
    pub const CLIENT_MAX: usize = 200;

    /// Ports on which each client sends requests.
    pub const CLIENT_PORTS: usize = 3;

    /// MTU to configure on the nodes; 0 leaves the system setting alone.
    pub const MTU: usize = 0;

    /// Transport protocol under test.
    pub const PROTOCOL: &str = "homa";

    /// Receiving threads per client port.
    pub const PORT_RECEIVERS: usize = 3;

    /// Threads per server port.
    pub const PORT_THREADS: usize = 3;

    /// Seconds of traffic captured per measurement.
    pub const SECONDS: u64 = 5;

    /// Ports on which each server listens.
    pub const SERVER_PORTS: usize = 3;

    pub const TCP_CLIENT_PORTS: usize = 4;
    pub const TCP_PORT_RECEIVERS: usize = 1;
    pub const TCP_SERVER_PORTS: usize = 8;
    pub const TCP_PORT_THREADS: usize = 1;

    /// Client ports reserved for unloaded measurements.
    pub const UNLOADED: usize = 0;

    /// Bytes sent unscheduled; 0 uses the protocol default.
    pub const UNSCHED: usize = 0;

    /// Boost applied to unscheduled priority cutoffs.
    pub const UNSCHED_BOOST: f64 = 0.0;

    /// Workload distribution; empty runs whatever the caller selects.
    pub const WORKLOAD: &str = "";

    /// Default log directory: a fresh timestamped directory per run.
    pub fn default_log_dir() -> String {
        format!("logs/{}", chrono::Local::now().format("%Y%m%d%H%M%S"))
    }
}
