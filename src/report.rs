//! CSV output for per-commit rows and ranked statistics

use crate::inspection::CommitReport;
use std::io::{self, Write};

/// Writes one row per commit report.
///
/// Columns are `Commit hash,Changed targets`, followed by `Blame` when blame
/// tracing is on and `Kind` when every report kind is written. By default
/// only COMPLETE reports produce rows.
pub struct CommitCsvWriter<W: Write> {
    out: W,
    with_blame: bool,
    all_kinds: bool,
    rows: usize,
}

impl<W: Write> CommitCsvWriter<W> {
    /// Create the writer and emit the header row
    pub fn new(out: W, with_blame: bool, all_kinds: bool) -> io::Result<Self> {
        let mut writer = Self {
            out,
            with_blame,
            all_kinds,
            rows: 0,
        };
        let mut header = vec!["Commit hash", "Changed targets"];
        if with_blame {
            header.push("Blame");
        }
        if all_kinds {
            header.push("Kind");
        }
        write_record(&mut writer.out, &header)?;
        Ok(writer)
    }

    /// Write the row for `report`; returns whether a row was written
    pub fn write_report(&mut self, report: &CommitReport) -> io::Result<bool> {
        if !self.all_kinds && !report.is_complete() {
            return Ok(false);
        }

        let targets = report.targets_column();
        let blame = report.blame_column();
        let mut record = vec![report.hash(), targets.as_str()];
        if self.with_blame {
            record.push(blame.as_str());
        }
        if self.all_kinds {
            record.push(report.kind.as_str());
        }
        write_record(&mut self.out, &record)?;
        self.rows += 1;
        Ok(true)
    }

    /// Data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Write `Target,Fix count` rows in the given order
pub fn write_stats<W: Write>(out: &mut W, stats: &[(String, usize)]) -> io::Result<()> {
    write_record(out, &["Target", "Fix count"])?;
    for (identifier, count) in stats {
        write_record(out, &[identifier.as_str(), count.to_string().as_str()])?;
    }
    out.flush()
}

fn write_record<W: Write>(out: &mut W, fields: &[&str]) -> io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
    write!(out, "{}\r\n", line.join(","))
}

/// Quote a field when it holds a separator, a quote or a line break
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
