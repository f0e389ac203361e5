//! # Command-Line Interface Module
//!
//! Argument parsing for the analysis driver. The option set mirrors the
//! knobs the cperf orchestration layer passes around: most of them (ports,
//! thread counts, workload selection) are consumed by the benchmark
//! workers, not by the digesting core, but they travel with the run so the
//! log directory and reports reflect a complete configuration. Only
//! `log_dir`, `verbose`, and the sample/baseline file options change what
//! this binary actually does.

use crate::defaults;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// cperf analysis - digest RTT sample files into percentile/slowdown reports
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// RTT sample files to digest (one experiment per file)
    #[clap(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Digest report of an unloaded run, used as the slowdown baseline
    #[clap(short = 'u', long)]
    pub unloaded_report: Option<PathBuf>,

    /// Directory for log files and reports
    #[clap(short = 'l', long, default_value_t = defaults::default_log_dir())]
    pub log_dir: String,

    /// Generation rate in Gbits/sec (0 means unlimited)
    #[clap(long, default_value_t = defaults::GBPS)]
    pub gbps: f64,

    /// Maximum number of outstanding requests per client
    #[clap(long, default_value_t = defaults::CLIENT_MAX)]
    pub client_max: usize,

    /// Number of ports on which each client sends requests
    #[clap(long, default_value_t = defaults::CLIENT_PORTS)]
    pub client_ports: usize,

    /// MTU to configure on the benchmark nodes (0 leaves it unchanged)
    #[clap(long, default_value_t = defaults::MTU)]
    pub mtu: usize,

    /// Transport protocol under test
    #[clap(long, default_value = defaults::PROTOCOL)]
    pub protocol: String,

    /// Number of receiving threads per client port
    #[clap(long, default_value_t = defaults::PORT_RECEIVERS)]
    pub port_receivers: usize,

    /// Number of threads per server port
    #[clap(long, default_value_t = defaults::PORT_THREADS)]
    pub port_threads: usize,

    /// Seconds of traffic each measurement captures
    #[clap(long, default_value_t = defaults::SECONDS)]
    pub seconds: u64,

    /// Number of ports on which each server listens
    #[clap(long, default_value_t = defaults::SERVER_PORTS)]
    pub server_ports: usize,

    /// Number of ports on which each client sends TCP requests
    #[clap(long, default_value_t = defaults::TCP_CLIENT_PORTS)]
    pub tcp_client_ports: usize,

    /// Number of receiving threads per TCP client port
    #[clap(long, default_value_t = defaults::TCP_PORT_RECEIVERS)]
    pub tcp_port_receivers: usize,

    /// Number of ports on which each server listens for TCP
    #[clap(long, default_value_t = defaults::TCP_SERVER_PORTS)]
    pub tcp_server_ports: usize,

    /// Number of threads per TCP server port
    #[clap(long, default_value_t = defaults::TCP_PORT_THREADS)]
    pub tcp_port_threads: usize,

    /// Number of client ports to reserve for unloaded measurements
    #[clap(long, default_value_t = defaults::UNLOADED)]
    pub unloaded: usize,

    /// Bytes sent unscheduled (0 uses the protocol default)
    #[clap(long, default_value_t = defaults::UNSCHED)]
    pub unsched: usize,

    /// Boost applied to unscheduled priority cutoffs
    #[clap(long, default_value_t = defaults::UNSCHED_BOOST)]
    pub unsched_boost: f64,

    /// Workload distribution to generate (e.g. w1-w5)
    #[clap(short = 'w', long, default_value = defaults::WORKLOAD)]
    pub workload: String,

    /// Write a JSON sidecar next to each .data report
    #[clap(long, default_value_t = false)]
    pub json: bool,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

/// Validated configuration for one analysis run.
///
/// Assumed already validated by the time the digesting core sees it; the
/// core itself only consults `log_dir` (report placement), `json`, and
/// `verbose`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub log_dir: PathBuf,
    pub gbps: f64,
    pub client_max: usize,
    pub client_ports: usize,
    pub mtu: usize,
    pub protocol: String,
    pub port_receivers: usize,
    pub port_threads: usize,
    pub seconds: u64,
    pub server_ports: usize,
    pub tcp_client_ports: usize,
    pub tcp_port_receivers: usize,
    pub tcp_server_ports: usize,
    pub tcp_port_threads: usize,
    pub unloaded: usize,
    pub unsched: usize,
    pub unsched_boost: f64,
    pub workload: String,
    pub json: bool,
    pub verbose: bool,
}

impl AnalysisConfig {
    /// Path of the digest report for an experiment:
    /// `<log_dir>/reports/<experiment>.data`.
    pub fn report_path(&self, experiment: &str) -> PathBuf {
        self.log_dir
            .join("reports")
            .join(format!("{}.data", experiment))
    }

    /// Path of the cperf run log file.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join("cperf.log")
    }
}

impl From<&Args> for AnalysisConfig {
    fn from(args: &Args) -> Self {
        Self {
            log_dir: PathBuf::from(&args.log_dir),
            gbps: args.gbps,
            client_max: args.client_max,
            client_ports: args.client_ports,
            mtu: args.mtu,
            protocol: args.protocol.clone(),
            port_receivers: args.port_receivers,
            port_threads: args.port_threads,
            seconds: args.seconds,
            server_ports: args.server_ports,
            tcp_client_ports: args.tcp_client_ports,
            tcp_port_receivers: args.tcp_port_receivers,
            tcp_server_ports: args.tcp_server_ports,
            tcp_port_threads: args.tcp_port_threads,
            unloaded: args.unloaded,
            unsched: args.unsched,
            unsched_boost: args.unsched_boost,
            workload: args.workload.clone(),
            json: args.json,
            verbose: args.verbose,
        }
    }
}
