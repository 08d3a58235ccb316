//! Per-host progress lines and the batch summary

use std::io::Write;

use tracing::warn;

use crate::action::{ActionOutcome, BatchAction};
use crate::hosts::HostEntry;
use crate::tally::BatchResult;

/// Width host names are right-aligned to in progress lines
const NAME_WIDTH: usize = 16;

/// Receives each host's outcome as soon as it is known
pub trait ProgressSink {
    /// Report one processed host
    fn host_done(&mut self, host: &HostEntry, outcome: &ActionOutcome);
}

/// Writes one `name: detail` line per host and flushes it immediately
#[derive(Debug)]
pub struct LineReporter<W: Write> {
    writer: W,
}

impl<W: Write> LineReporter<W> {
    /// Create a reporter writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ProgressSink for LineReporter<W> {
    fn host_done(&mut self, host: &HostEntry, outcome: &ActionOutcome) {
        let line = progress_line(host, outcome);
        let written = writeln!(self.writer, "{line}").and_then(|()| self.writer.flush());
        if let Err(e) = written {
            warn!(host = %host.name, error = %e, "failed to write progress line");
        }
    }
}

/// Format a single progress line
#[must_use]
pub fn progress_line(host: &HostEntry, outcome: &ActionOutcome) -> String {
    format!("{:>NAME_WIDTH$}: {}", host.name, outcome.detail())
}

/// Render `"<prefix>: <count> <label>, ..."`, most frequent first
///
/// An empty tally renders `none` after the colon.
#[must_use]
pub fn summary_line(action: BatchAction, result: &BatchResult) -> String {
    let counts = result
        .tally
        .most_common()
        .iter()
        .map(|(label, count)| format!("{count} {label}"))
        .collect::<Vec<_>>()
        .join(", ");

    let counts = if counts.is_empty() {
        "none".to_string()
    } else {
        counts
    };

    format!("{}: {counts}", action.summary_prefix(result.total_processed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::Tally;

    #[test]
    fn test_progress_line_alignment() {
        let host = HostEntry::new("web1", "101");
        let outcome = ActionOutcome::Success { state: "up".into() };
        assert_eq!(progress_line(&host, &outcome), "            web1: up");

        let long = HostEntry::new("a-very-long-host-name", "1");
        let failure = ActionOutcome::Failure {
            error: "timed out".into(),
        };
        assert_eq!(
            progress_line(&long, &failure),
            "a-very-long-host-name: timed out"
        );
    }

    #[test]
    fn test_line_reporter_writes_in_order() {
        let mut reporter = LineReporter::new(Vec::new());
        reporter.host_done(
            &HostEntry::new("a", "1"),
            &ActionOutcome::Success { state: "up".into() },
        );
        reporter.host_done(
            &HostEntry::new("b", "2"),
            &ActionOutcome::Failure {
                error: "boom".into(),
            },
        );

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().map(str::trim_start).collect();
        assert_eq!(lines, vec!["a: up", "b: boom"]);
    }

    #[test]
    fn test_summary_line() {
        let mut tally = Tally::new();
        tally.record("up");
        tally.record("error");
        tally.record("up");
        let result = BatchResult::from(tally);

        assert_eq!(
            summary_line(BatchAction::Start, &result),
            "3 vms sent the start command: 2 up, 1 error"
        );
        assert_eq!(
            summary_line(BatchAction::Status, &result),
            "status of 3 vms: 2 up, 1 error"
        );
    }

    #[test]
    fn test_summary_line_empty() {
        let result = BatchResult::from(Tally::new());
        assert_eq!(
            summary_line(BatchAction::Stop, &result),
            "0 vms sent the stop command: none"
        );
    }
}
