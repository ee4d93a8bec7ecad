//! Report rendering.
//!
//! # Formats
//!
//! - **Text**: the merged log, one `<message> <timestamp_ns>` line per event,
//!   then the verdict and the five timing lines. This is the flat report file
//!   format.
//! - **JSONL**: one `{"type":"event",...}` object per merged event followed by
//!   a single `{"type":"summary",...}` object. Encoded by hand; the schema is
//!   flat and fixed.
//!
//! Summary lines are written after the event stream and never mixed into it.

use crate::scheduler::RunReport;
use crate::validate::{SequentialReport, Verdict};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Output encoding for [`write_report`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Jsonl,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Jsonl => "jsonl",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "jsonl" => Ok(Self::Jsonl),
            other => Err(format!("unknown report format: {other} (expected text|jsonl)")),
        }
    }
}

/// Write `report` in `format`.
pub fn write_report<W: Write>(out: &mut W, report: &RunReport, format: ReportFormat) -> io::Result<()> {
    match format {
        ReportFormat::Text => write_text_report(out, report),
        ReportFormat::Jsonl => write_jsonl_report(out, report),
    }
}

/// Create (or truncate) `path` and write `report` to it.
pub fn write_report_file(
    path: impl AsRef<Path>,
    report: &RunReport,
    format: ReportFormat,
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_report(&mut out, report, format)?;
    out.flush()
}

fn verdict_line(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Valid => "Sudoku is valid.",
        Verdict::Invalid => "Sudoku is invalid.",
    }
}

pub fn write_text_report<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    for ev in &report.events {
        writeln!(out, "{ev}")?;
    }
    let c = &report.contention;
    writeln!(out, "{}", verdict_line(report.verdict))?;
    writeln!(out, "The total time taken is {} nanoseconds.", report.total_ns())?;
    writeln!(out, "Average CS Entry Time is {} nanoseconds.", c.mean_entry_ns)?;
    writeln!(out, "Average CS Exit Time is {} nanoseconds.", c.mean_exit_ns)?;
    writeln!(out, "Worst-case CS Entry Time is {} nanoseconds.", c.worst_entry_ns)?;
    writeln!(out, "Worst-case CS Exit Time is {} nanoseconds.", c.worst_exit_ns)?;
    Ok(())
}

pub fn write_jsonl_report<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    let mut buf = Vec::with_capacity(256);
    let mut message = String::new();
    for ev in &report.events {
        use std::fmt::Write as _;
        buf.clear();
        message.clear();
        let _ = write!(message, "{}", ev.message());

        buf.extend_from_slice(b"{\"type\":\"event\",\"t_ns\":");
        write_u64(ev.timestamp_ns, &mut buf);
        buf.extend_from_slice(b",\"worker\":");
        write_u64(ev.worker as u64, &mut buf);
        buf.extend_from_slice(b",\"message\":\"");
        write_json_str(&message, &mut buf);
        buf.extend_from_slice(b"\"}\n");
        out.write_all(&buf)?;
    }

    let c = &report.contention;
    buf.clear();
    buf.extend_from_slice(b"{\"type\":\"summary\",\"verdict\":\"");
    buf.extend_from_slice(report.verdict.as_str().as_bytes());
    buf.extend_from_slice(b"\",\"lock\":\"");
    buf.extend_from_slice(report.config.lock.as_str().as_bytes());
    buf.push(b'"');
    let fields: [(&[u8], u64); 11] = [
        (b"workers", report.config.workers as u64),
        (b"batch", report.config.batch as u64),
        (b"units_granted", report.units_granted() as u64),
        (b"total_ns", report.total_ns()),
        (b"cs_count", c.cs_count),
        (b"cs_entry_mean_ns", c.mean_entry_ns),
        (b"cs_exit_mean_ns", c.mean_exit_ns),
        (b"cs_entry_worst_ns", c.worst_entry_ns),
        (b"cs_exit_worst_ns", c.worst_exit_ns),
        (b"cs_rtt_p50_ns", c.round_trip_ns.p50().unwrap_or(0)),
        (b"cs_rtt_p99_ns", c.round_trip_ns.p99().unwrap_or(0)),
    ];
    for (key, value) in fields {
        buf.extend_from_slice(b",\"");
        buf.extend_from_slice(key);
        buf.extend_from_slice(b"\":");
        write_u64(value, &mut buf);
    }
    buf.extend_from_slice(b"}\n");
    out.write_all(&buf)
}

/// Text report for the sequential baseline: verdict and total time only.
pub fn write_sequential_report<W: Write>(out: &mut W, report: &SequentialReport) -> io::Result<()> {
    writeln!(out, "{}", verdict_line(report.verdict))?;
    writeln!(
        out,
        "The total time taken is {} nanoseconds.",
        report.elapsed.as_nanos()
    )
}

// ============================================================================
// JSON primitives
// ============================================================================

fn write_u64(mut n: u64, buf: &mut Vec<u8>) {
    // u64::MAX has 20 digits.
    let mut digits = [0u8; 20];
    let mut at = digits.len();
    loop {
        at -= 1;
        digits[at] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[at..]);
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

fn write_json_str(s: &str, buf: &mut Vec<u8>) {
    for byte in s.bytes() {
        match byte {
            b'"' => buf.extend_from_slice(b"\\\""),
            b'\\' => buf.extend_from_slice(b"\\\\"),
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            0x00..=0x1f => {
                buf.extend_from_slice(b"\\u00");
                buf.push(HEX_DIGITS[(byte >> 4) as usize]);
                buf.push(HEX_DIGITS[(byte & 0xf) as usize]);
            }
            _ => buf.push(byte),
        }
    }
}
