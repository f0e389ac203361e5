use anyhow::Result;
use cperf_analysis::{
    baseline::BaselineMap,
    cli::{AnalysisConfig, Args},
    digest::AnalysisCache,
    logging::{CperfLog, MemoryLogSink},
};
use clap::Parser;
use tempfile::tempdir;

/// Digest an unloaded run, load its report as the baseline, then digest a
/// loaded run against it. This is the two-pass flow a real analysis uses.
#[test]
fn baseline_from_unloaded_report_drives_slowdowns() -> Result<()> {
    let dir = tempdir()?;
    let argv = [
        "cperf-analysis",
        "--log-dir",
        dir.path().to_str().unwrap(),
        "unused.rtts",
    ];
    let config = AnalysisConfig::from(&Args::try_parse_from(argv).unwrap());
    let mut cache = AnalysisCache::new();
    let mut log = CperfLog::new(Box::new(MemoryLogSink::default()), false);

    // Pass 1: the unloaded run. Slowdowns are relative to a bootstrap
    // baseline equal to its own medians, so the report's p50 column is
    // what matters here.
    let unloaded_path = dir.path().join("unloaded.rtts");
    std::fs::write(&unloaded_path, "100 10.0\n100 10.0\n200 15.0\n")?;
    let mut bootstrap = BaselineMap::new();
    bootstrap.insert(100, 10.0);
    bootstrap.insert(200, 15.0);
    cache.digest_file(&unloaded_path, &config, &bootstrap, &mut log)?;

    // Pass 2: load the baseline back from the report just written.
    let mut baseline = BaselineMap::new();
    baseline.load_report(config.report_path("unloaded"), &mut cache.file_data)?;
    assert_eq!(baseline.get(100), Some(10.0));
    assert_eq!(baseline.get(200), Some(15.0));

    // Digest a loaded run against it.
    let loaded_path = dir.path().join("w4.rtts");
    std::fs::write(&loaded_path, "100 20.0\n150 40.0\n200 45.0\n")?;
    let digest = cache.digest_file(&loaded_path, &config, &baseline, &mut log)?;

    assert_eq!(digest.slow_50[0], 2.0); // 20 / 10
    assert_eq!(digest.slow_50[1], 4.0); // 40 / 10, baseline held across 150
    assert_eq!(digest.slow_50[2], 3.0); // 45 / 15
    Ok(())
}
