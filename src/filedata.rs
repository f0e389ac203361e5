//! # Column-File Reader Module
//!
//! Reads whitespace-column numeric data files such as the digest reports
//! this crate itself produces. A comment line supplies column names; data
//! rows append one value to each named column. The reader is fronted by a
//! per-path cache so a report consulted by several analyses (for example an
//! unloaded baseline referenced by every loaded experiment) is parsed once.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Numeric columns read from one data file, keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct ColumnData {
    columns: HashMap<String, Vec<f64>>,
}

impl ColumnData {
    /// Parse a whitespace-column data file.
    ///
    /// Column names come from the last `#` comment line seen before the
    /// first data row (any leading `#` tokens are stripped). Rows shorter
    /// than the header fill only the leading columns; non-numeric fields
    /// are fatal.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open data file {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut names: Vec<String> = Vec::new();
        let mut columns: HashMap<String, Vec<f64>> = HashMap::new();
        let mut saw_data = false;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read from data file {}", path.display()))?;
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }
            if let Some(comment) = stripped.strip_prefix('#') {
                if !saw_data {
                    let header: Vec<String> =
                        comment.split_whitespace().map(str::to_string).collect();
                    if !header.is_empty() {
                        names = header;
                    }
                }
                continue;
            }

            saw_data = true;
            for (i, field) in stripped.split_whitespace().enumerate() {
                let name = match names.get(i) {
                    Some(name) => name.clone(),
                    // Unnamed trailing columns get positional names.
                    None => format!("col{}", i),
                };
                let value: f64 = field.parse().with_context(|| {
                    format!(
                        "Invalid numeric field '{}' at {}:{}",
                        field,
                        path.display(),
                        line_no + 1
                    )
                })?;
                columns.entry(name).or_default().push(value);
            }
        }

        Ok(Self { columns })
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Per-path memoization of parsed data files.
///
/// Created once per analysis run and discarded at process exit; there is
/// no invalidation, since the inputs are static captured files.
#[derive(Debug, Default)]
pub struct FileDataCache {
    files: HashMap<PathBuf, ColumnData>,
}

impl FileDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the parsed contents of `path`, reading it on first request.
    pub fn get<P: AsRef<Path>>(&mut self, path: P) -> Result<&ColumnData> {
        let path = path.as_ref();
        if !self.files.contains_key(path) {
            debug!("Reading data file {}", path.display());
            let data = ColumnData::read(path)?;
            self.files.insert(path.to_path_buf(), data);
        }
        Ok(&self.files[path])
    }
}
