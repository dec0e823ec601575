//! Diagnostic channels for date reconciliation.
//!
//! Three channels, mirroring the operator workflow: every resolved date
//! (`date_compare.log`), URLs that produced no usable signal or failed to
//! fetch (`url.log`), and full mismatch traces with every attempt
//! (`mismatched_dates.log`). The pipeline talks to the [`DiagnosticsSink`]
//! trait, so tests substitute a recording sink and the reconciler stays
//! free of file handling.
//!
//! A failed diagnostic write degrades to a `tracing` warning; it never
//! aborts the run.

use crate::models::{Attempt, Timestamp};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Where reconciliation outcomes are reported.
pub trait DiagnosticsSink {
    /// A date was chosen for `url`; `matched` says whether it agreed with
    /// the reference.
    fn date_resolved(&mut self, url: &str, chosen: &Timestamp, matched: bool);

    /// A page-level problem worth an operator's attention.
    fn url_warning(&mut self, url: &str, message: &str);

    /// No signal matched the reference; the full attempt trail follows.
    fn date_mismatch(&mut self, url: &str, reference_raw: &str, attempts: &[Attempt]);
}

/// File-backed sink writing the three channels under one directory.
///
/// Files are truncated at creation and appended to for the rest of the run.
pub struct FileDiagnostics {
    compare: File,
    urls: File,
    mismatches: File,
}

impl FileDiagnostics {
    /// Create the log directory and open all three channels.
    pub fn create(log_dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        Ok(Self {
            compare: File::create(log_dir.join("date_compare.log"))?,
            urls: File::create(log_dir.join("url.log"))?,
            mismatches: File::create(log_dir.join("mismatched_dates.log"))?,
        })
    }

    fn write_line(file: &mut File, channel: &str, line: &str) {
        if let Err(e) = writeln!(file, "{line}") {
            warn!(channel, error = %e, "Failed to write diagnostic entry");
        }
    }
}

impl DiagnosticsSink for FileDiagnostics {
    fn date_resolved(&mut self, url: &str, chosen: &Timestamp, matched: bool) {
        let verdict = if matched { "MATCH" } else { "FALLBACK" };
        Self::write_line(
            &mut self.compare,
            "date_compare",
            &format!("{verdict} | {chosen} | {url}"),
        );
    }

    fn url_warning(&mut self, url: &str, message: &str) {
        Self::write_line(&mut self.urls, "url", &format!("{message} | {url}"));
    }

    fn date_mismatch(&mut self, url: &str, reference_raw: &str, attempts: &[Attempt]) {
        let mut block = String::new();
        block.push_str(&format!("URL: {url}\n"));
        block.push_str(&format!("Reference: {reference_raw}\n"));
        block.push_str("Found attempts:\n");
        for attempt in attempts {
            let verdict = if attempt.is_match { "[MATCH]" } else { "[NO MATCH]" };
            block.push_str(&format!(
                "  {verdict} [{:?}] Src: {} | Raw: '{}' | Parsed: {}\n",
                attempt.signal.provenance,
                attempt.signal.source_locator,
                attempt.signal.raw_text,
                attempt.signal.parsed.date.format("%Y-%m-%d"),
            ));
        }
        block.push_str(&"-".repeat(60));
        Self::write_line(&mut self.mismatches, "mismatched_dates", &block);
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Records every call for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        pub resolved: Vec<(String, String, bool)>,
        pub warnings: Vec<(String, String)>,
        pub mismatches: Vec<(String, String, usize)>,
    }

    impl DiagnosticsSink for RecordingSink {
        fn date_resolved(&mut self, url: &str, chosen: &Timestamp, matched: bool) {
            self.resolved
                .push((url.to_string(), chosen.to_string(), matched));
        }

        fn url_warning(&mut self, url: &str, message: &str) {
            self.warnings.push((url.to_string(), message.to_string()));
        }

        fn date_mismatch(&mut self, url: &str, reference_raw: &str, attempts: &[Attempt]) {
            self.mismatches
                .push((url.to_string(), reference_raw.to_string(), attempts.len()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateSignal, Provenance};
    use chrono::NaiveDate;

    fn attempt(matched: bool) -> Attempt {
        Attempt {
            signal: DateSignal {
                raw_text: "3 декабря 2025".to_string(),
                provenance: Provenance::CssSelectorText,
                source_locator: "text in .date".to_string(),
                parsed: Timestamp::date_only(NaiveDate::from_ymd_opt(2025, 12, 3).unwrap()),
            },
            is_match: matched,
        }
    }

    #[test]
    fn test_file_diagnostics_channels() {
        let dir = std::env::temp_dir().join("dateline_diag_test");
        let _ = fs::remove_dir_all(&dir);
        {
            let mut sink = FileDiagnostics::create(&dir).unwrap();
            let ts = Timestamp::date_only(NaiveDate::from_ymd_opt(2025, 12, 3).unwrap());
            sink.date_resolved("https://example.com/a", &ts, true);
            sink.url_warning("https://example.com/b", "EMPTY | no date elements found");
            sink.date_mismatch("https://example.com/c", "Tue, 03 Dec 2025", &[attempt(false)]);
        }

        let compare = fs::read_to_string(dir.join("date_compare.log")).unwrap();
        assert!(compare.contains("MATCH | 2025-12-03 | https://example.com/a"));

        let urls = fs::read_to_string(dir.join("url.log")).unwrap();
        assert!(urls.contains("EMPTY"));

        let mismatches = fs::read_to_string(dir.join("mismatched_dates.log")).unwrap();
        assert!(mismatches.contains("URL: https://example.com/c"));
        assert!(mismatches.contains("[NO MATCH]"));
        assert!(mismatches.contains("text in .date"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = std::env::temp_dir().join("dateline_diag_truncate");
        let _ = fs::remove_dir_all(&dir);
        {
            let mut sink = FileDiagnostics::create(&dir).unwrap();
            sink.url_warning("https://example.com/old", "FETCH | old run");
        }
        {
            let _sink = FileDiagnostics::create(&dir).unwrap();
        }
        let urls = fs::read_to_string(dir.join("url.log")).unwrap();
        assert!(urls.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }
}
