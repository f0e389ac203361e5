//! # Logging Module
//!
//! Two layers of logging serve different audiences. The `tracing` layer
//! (with the colorized console formatter below) is for the operator running
//! the analysis interactively. The `LogSink`/`CperfLog` layer reproduces
//! the cperf log file: every message is appended as a plain text line to
//! `<log_dir>/cperf.log` so a run leaves a complete transcript next to its
//! reports, while verbose-only messages reach the console only when
//! requested.

use anyhow::{Context, Result};
use colored::*;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::Path;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// A custom tracing event formatter for colorizing log output based on level.
///
/// This formatter is designed to provide clean, user-facing output where the
/// entire log line is colored according to its severity level, without any
/// extra metadata like timestamps or log levels printed.
pub struct ColorizedFormatter;

impl<S, N> FormatEvent<S, N> for ColorizedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // Buffer the formatted fields to apply color to the entire line.
        let mut buffer = String::new();
        let mut buf_writer = Writer::new(&mut buffer);
        ctx.format_fields(buf_writer.by_ref(), event)?;

        let colored_output = match *event.metadata().level() {
            Level::INFO => buffer.white(),
            Level::WARN => buffer.yellow(),
            Level::ERROR => buffer.red(),
            Level::DEBUG => buffer.blue(),
            Level::TRACE => buffer.purple(),
        };

        writeln!(writer, "{}", colored_output)
    }
}

/// A sink that accepts plain text log lines with append semantics.
///
/// The digesting functions take a sink by reference instead of touching any
/// ambient file handle, so tests can substitute an in-memory sink.
pub trait LogSink {
    fn write_line(&mut self, line: &str) -> Result<()>;
}

/// File-backed log sink appending to the cperf log file.
pub struct FileLogSink {
    file: File,
}

impl FileLogSink {
    /// Open (creating if needed) a log file in append mode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self { file })
    }
}

impl LogSink for FileLogSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.file, "{}", line).context("Failed to write to log file")?;
        Ok(())
    }
}

/// In-memory sink, used by tests and by runs with no log directory.
#[derive(Default)]
pub struct MemoryLogSink {
    pub lines: Vec<String>,
}

impl LogSink for MemoryLogSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// The cperf run log: every message goes to the sink, and to the console
/// via tracing. Messages logged with `vlog` reach the console only when
/// verbose output is enabled, but always reach the sink.
pub struct CperfLog {
    sink: Box<dyn LogSink>,
    verbose: bool,
}

impl CperfLog {
    pub fn new(sink: Box<dyn LogSink>, verbose: bool) -> Self {
        Self { sink, verbose }
    }

    /// Log a message to the console and the cperf log file.
    pub fn log(&mut self, message: &str) -> Result<()> {
        tracing::info!("{}", message);
        self.sink.write_line(message)
    }

    /// Log a message to the cperf log file; echo to the console only when
    /// verbose output is enabled.
    pub fn vlog(&mut self, message: &str) -> Result<()> {
        if self.verbose {
            tracing::info!("{}", message);
        } else {
            tracing::debug!("{}", message);
        }
        self.sink.write_line(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    // Keeps a handle on a MemoryLogSink after handing it to a CperfLog.
    struct SharedSink(Rc<RefCell<MemoryLogSink>>);

    impl LogSink for SharedSink {
        fn write_line(&mut self, line: &str) -> Result<()> {
            self.0.borrow_mut().write_line(line)
        }
    }

    #[test]
    fn test_log_and_vlog_reach_memory_sink() {
        let sink = Rc::new(RefCell::new(MemoryLogSink::default()));
        let mut log = CperfLog::new(Box::new(SharedSink(Rc::clone(&sink))), false);

        log.log("visible").unwrap();
        log.vlog("quiet").unwrap();

        // vlog is console-gated by verbose, but the sink gets every line.
        assert_eq!(sink.borrow().lines, vec!["visible", "quiet"]);
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cperf.log");

        {
            let mut sink = FileLogSink::open(&path).unwrap();
            sink.write_line("one").unwrap();
        }
        {
            let mut sink = FileLogSink::open(&path).unwrap();
            sink.write_line("two").unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "one\ntwo\n");
    }

    #[test]
    fn test_cperf_log_writes_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cperf.log");

        let sink = FileLogSink::open(&path).unwrap();
        let mut log = CperfLog::new(Box::new(sink), false);
        log.log("visible").unwrap();
        log.vlog("quiet").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "visible\nquiet\n");
    }
}
