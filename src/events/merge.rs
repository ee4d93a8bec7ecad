//! Post-barrier log merging.
//!
//! Both mergers produce a stable sort by timestamp: events with equal
//! timestamps keep their input order (buffer order, then position within the
//! buffer). They run single-threaded after every writer has been joined.

use super::LogEvent;
use std::fmt;

/// Merge per-worker event buffers into one time-ordered stream.
pub fn merge_events<I>(buffers: I) -> Vec<LogEvent>
where
    I: IntoIterator<Item = Vec<LogEvent>>,
{
    let mut merged: Vec<LogEvent> = buffers.into_iter().flatten().collect();
    merged.sort_by_key(|ev| ev.timestamp_ns);
    merged
}

/// A line recovered from a flat text buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLine {
    pub timestamp_ns: u64,
    /// Everything before the trailing timestamp token, trailing space removed.
    pub message: String,
}

impl fmt::Display for TextLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.timestamp_ns)
        } else {
            write!(f, "{} {}", self.message, self.timestamp_ns)
        }
    }
}

/// Merge flat text buffers whose lines end in a nanosecond timestamp.
///
/// Each buffer is split into lines; blank lines are dropped. The trailing
/// whitespace-delimited token of each line is parsed as an unsigned integer;
/// lines where it does not parse (summary lines such as
/// `The total time taken is 10 nanoseconds.`) are skipped.
pub fn merge_text_buffers<I, S>(buffers: I) -> Vec<TextLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = Vec::new();
    for buffer in buffers {
        lines.extend(buffer.as_ref().lines().filter_map(parse_line));
    }
    lines.sort_by_key(|l| l.timestamp_ns);
    lines
}

fn parse_line(line: &str) -> Option<TextLine> {
    let line = line.trim_end();
    if line.is_empty() {
        return None;
    }
    let (message, token) = match line.rsplit_once(char::is_whitespace) {
        Some((message, token)) => (message.trim_end(), token),
        None => ("", line),
    };
    let timestamp_ns = token.parse::<u64>().ok()?;
    Some(TextLine {
        timestamp_ns,
        message: message.to_string(),
    })
}
