use anyhow::Result;
use cperf_analysis::{
    baseline::BaselineMap,
    cli::{AnalysisConfig, Args},
    digest::AnalysisCache,
    logging::{CperfLog, MemoryLogSink},
};
use clap::Parser;
use std::path::Path;
use tempfile::tempdir;

/// Build an AnalysisConfig rooted at a temporary log directory, going
/// through the real CLI parser so defaults behave as in production.
fn test_config(log_dir: &Path, json: bool) -> AnalysisConfig {
    let mut argv = vec![
        "cperf-analysis".to_string(),
        "--log-dir".to_string(),
        log_dir.to_string_lossy().into_owned(),
    ];
    if json {
        argv.push("--json".to_string());
    }
    argv.push("unused.rtts".to_string());
    let args = Args::try_parse_from(argv).unwrap();
    AnalysisConfig::from(&args)
}

fn test_log() -> CperfLog {
    CperfLog::new(Box::new(MemoryLogSink::default()), false)
}

/// End-to-end: sample file in, exact report bytes out.
#[test]
fn digest_pipeline_produces_exact_report() -> Result<()> {
    let dir = tempdir()?;
    let sample_path = dir.path().join("w4.rtts");
    std::fs::write(&sample_path, "# dump_times output\n100 10.0\n100 20.0\n200 30.0\n")?;

    let mut baseline = BaselineMap::new();
    baseline.insert(100, 10.0);
    baseline.insert(200, 15.0);

    let config = test_config(dir.path(), false);
    let mut cache = AnalysisCache::new();
    let mut log = test_log();

    let digest = cache.digest_file(&sample_path, &config, &baseline, &mut log)?;
    assert_eq!(digest.experiment, "w4");
    assert_eq!(digest.total_messages, 3);

    let report = std::fs::read_to_string(config.report_path("w4"))?;
    let lines: Vec<&str> = report.lines().collect();
    assert!(lines[0].starts_with("# Digested data for w4 experiment, run at "));
    assert_eq!(
        lines[1],
        "# length  cum_frac  samples     p50      p99     p999   s50    s99    s999"
    );
    assert_eq!(
        lines[2],
        "     100  0.666667        2    20.0     20.0     20.0   2.0    2.0     2.0"
    );
    assert_eq!(
        lines[3],
        "     200  1.000000        1    30.0     30.0     30.0   2.0    2.0     2.0"
    );
    assert_eq!(lines.len(), 4);
    Ok(())
}

/// A second request for the same experiment must come from the cache, not
/// from the (now changed) file on disk.
#[test]
fn digest_is_memoized_per_experiment() -> Result<()> {
    let dir = tempdir()?;
    let sample_path = dir.path().join("w1.rtts");
    std::fs::write(&sample_path, "100 10.0\n")?;

    let mut baseline = BaselineMap::new();
    baseline.insert(100, 10.0);

    let config = test_config(dir.path(), false);
    let mut cache = AnalysisCache::new();
    let mut log = test_log();

    let first_total = cache
        .digest_file(&sample_path, &config, &baseline, &mut log)?
        .total_messages;
    std::fs::write(&sample_path, "100 10.0\n100 11.0\n100 12.0\n")?;
    let second_total = cache
        .digest_file(&sample_path, &config, &baseline, &mut log)?
        .total_messages;

    assert_eq!(first_total, 1);
    assert_eq!(second_total, 1);
    Ok(())
}

/// The JSON sidecar round-trips through serde with the digest intact.
#[test]
fn json_sidecar_round_trips() -> Result<()> {
    let dir = tempdir()?;
    let sample_path = dir.path().join("w2.rtts");
    std::fs::write(&sample_path, "500 42.5\n500 43.5\n")?;

    let mut baseline = BaselineMap::new();
    baseline.insert(500, 42.5);

    let config = test_config(dir.path(), true);
    let mut cache = AnalysisCache::new();
    let mut log = test_log();
    cache.digest_file(&sample_path, &config, &baseline, &mut log)?;

    let json_path = config.report_path("w2").with_extension("json");
    let json = std::fs::read_to_string(&json_path)?;
    let digest: cperf_analysis::Digest = serde_json::from_str(&json)?;

    assert_eq!(digest.experiment, "w2");
    assert_eq!(digest.total_messages, 2);
    assert_eq!(digest.lengths, vec![500]);
    assert_eq!(digest.counts, vec![2]);
    Ok(())
}

/// Digesting with no baseline loaded must fail before any report appears.
#[test]
fn missing_baseline_aborts_before_reporting() -> Result<()> {
    let dir = tempdir()?;
    let sample_path = dir.path().join("w3.rtts");
    std::fs::write(&sample_path, "100 10.0\n")?;

    let baseline = BaselineMap::new();
    let config = test_config(dir.path(), false);
    let mut cache = AnalysisCache::new();
    let mut log = test_log();

    let result = cache.digest_file(&sample_path, &config, &baseline, &mut log);
    assert!(result.is_err());
    assert!(!config.report_path("w3").exists());
    Ok(())
}

/// Malformed short lines are skipped without aborting or counting.
#[test]
fn malformed_lines_are_skipped() -> Result<()> {
    let dir = tempdir()?;
    let sample_path = dir.path().join("w5.rtts");
    std::fs::write(&sample_path, "100 10.0\n100\n200 30.0\n")?;

    let mut baseline = BaselineMap::new();
    baseline.insert(100, 10.0);

    let config = test_config(dir.path(), false);
    let mut cache = AnalysisCache::new();
    let mut log = test_log();

    let digest = cache.digest_file(&sample_path, &config, &baseline, &mut log)?;
    assert_eq!(digest.total_messages, 2);
    assert_eq!(digest.lengths, vec![100, 200]);
    Ok(())
}
