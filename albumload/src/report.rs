//! Console report and record file
use albumload_core::{LatencySummary, RequestKind, RequestOutcome, RunStatistics};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const RECORD_HEADER: [&str; 4] = ["Start Time", "Request Type", "Latency", "Status Code"];

pub const DEFAULT_RECORD_FILE: &str = "LoadResults.csv";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write record file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Human readable rendering of [`RunStatistics`].
pub struct ConsoleReport<'a>(pub &'a RunStatistics);

impl fmt::Display for ConsoleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "Total requests: {}", stats.total)?;
        writeln!(f, "Successful requests: {}", stats.successful)?;
        writeln!(f, "Unsuccessful requests: {}", stats.failed)?;
        writeln!(f)?;
        writeln!(f, "Overall statistics:")?;
        writeln!(
            f,
            "Wall time: {:.3} seconds ({})",
            stats.wall_time.as_secs_f64(),
            humantime::format_duration(round_ms(stats.wall_time))
        )?;
        writeln!(f, "Throughput: {:.2} requests/second", stats.throughput)?;
        write_summary(f, "Overall", &stats.overall)?;

        for kind in RequestKind::ALL {
            writeln!(f)?;
            writeln!(f, "{kind} statistics:")?;
            write_summary(f, kind.as_str(), &stats.kind(kind))?;
        }
        Ok(())
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, label: &str, summary: &LatencySummary) -> fmt::Result {
    writeln!(f, "Mean {label} latency: {:.3} ms", ms(summary.mean))?;
    writeln!(f, "Median {label} latency: {:.3} ms", ms(summary.median))?;
    writeln!(f, "99th percentile {label} latency: {:.3} ms", ms(summary.p99))?;
    writeln!(f, "Min {label} response time: {:.3} ms", ms(summary.min))?;
    writeln!(f, "Max {label} response time: {:.3} ms", ms(summary.max))
}

fn ms(dur: Duration) -> f64 {
    dur.as_secs_f64() * 1_000.
}

fn round_ms(dur: Duration) -> Duration {
    Duration::from_millis(dur.as_millis() as u64)
}

/// Writes one CSV row per outcome, header first.
pub fn write_records<W: Write>(writer: W, outcomes: &[RequestOutcome]) -> io::Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{}", RECORD_HEADER.join(","))?;
    for outcome in outcomes {
        writeln!(
            writer,
            "{},{},{},{}",
            outcome.start_ms(),
            outcome.kind(),
            outcome.latency_ms(),
            outcome.status()
        )?;
    }
    writer.flush()
}

/// Writes the record file at `path`, replacing any previous run's file.
pub fn write_record_file(path: impl AsRef<Path>, outcomes: &[RequestOutcome]) -> Result<(), ReportError> {
    let path = path.as_ref();
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    write_records(file, outcomes).map_err(io_err)?;
    tracing::info!("Wrote {} records to {}", outcomes.len(), path.display());
    Ok(())
}
