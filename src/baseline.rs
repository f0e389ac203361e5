//! # Baseline Store Module
//!
//! Holds the unloaded (near-zero-queueing) median RTT for each message
//! length, the denominator of every slowdown the digest engine computes.
//! The map is sparse: lengths without their own entry inherit the baseline
//! of the nearest smaller length that has one, producing a step function
//! rather than an interpolation.
//!
//! The map is populated from an unloaded run's digest report before any
//! loaded experiment is digested; digesting with an empty baseline is a
//! fatal precondition failure.

use crate::filedata::FileDataCache;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Message length to median unloaded RTT (microseconds).
#[derive(Debug, Clone, Default)]
pub struct BaselineMap {
    p50: BTreeMap<u64, f64>,
}

impl BaselineMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, length: u64, median_rtt: f64) {
        self.p50.insert(length, median_rtt);
    }

    pub fn is_empty(&self) -> bool {
        self.p50.is_empty()
    }

    pub fn len(&self) -> usize {
        self.p50.len()
    }

    /// Baseline entry for exactly this length, if one exists.
    pub fn get(&self, length: u64) -> Option<f64> {
        self.p50.get(&length).copied()
    }

    /// Baseline for the smallest known length; the initial value of the
    /// digest engine's step-function cursor. Errors if the map is empty.
    pub fn first_value(&self) -> Result<f64> {
        match self.p50.values().next() {
            Some(&value) => Ok(value),
            None => bail!("No unloaded data: baseline must be loaded before digesting"),
        }
    }

    /// Populate the map from an unloaded run's digest report.
    ///
    /// The report's `length` and `p50` columns become the map entries.
    /// Existing entries for the same lengths are replaced, so the baseline
    /// can be re-pointed at a different unloaded run mid-analysis.
    pub fn load_report<P: AsRef<Path>>(
        &mut self,
        path: P,
        cache: &mut FileDataCache,
    ) -> Result<()> {
        let path = path.as_ref();
        let data = cache
            .get(path)
            .with_context(|| format!("Failed to read unloaded report {}", path.display()))?;

        let lengths = data.column("length").with_context(|| {
            format!("Unloaded report {} has no 'length' column", path.display())
        })?;
        let medians = data
            .column("p50")
            .with_context(|| format!("Unloaded report {} has no 'p50' column", path.display()))?;
        if lengths.len() != medians.len() {
            bail!(
                "Unloaded report {}: length and p50 columns differ in size ({} vs {})",
                path.display(),
                lengths.len(),
                medians.len()
            );
        }

        for (&length, &median) in lengths.iter().zip(medians.iter()) {
            self.p50.insert(length as u64, median);
        }
        info!(
            "Loaded {} unloaded baseline entries from {}",
            lengths.len(),
            path.display()
        );
        Ok(())
    }
}
