//! Data models for discovered articles, date signals, and output rows.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Timestamp`]: a calendar date with an optional time-of-day
//! - [`DateSignal`]: one candidate date string found on a page, with provenance
//! - [`ReconciliationResult`]: the outcome of choosing one date per URL
//! - [`ArticleRecord`]: the final CSV row
//! - [`NewsHit`]: one discovery result (URL, title, untrusted feed date)

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar date with an optional time-of-day.
///
/// An absent time is distinct from midnight: it means the source string
/// carried no time component at all. Day-level comparisons treat an absent
/// time as compatible with any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// The calendar date.
    pub date: NaiveDate,
    /// The time-of-day, if the source string carried one.
    pub time: Option<NaiveTime>,
}

impl Timestamp {
    /// A timestamp with no time component.
    pub fn date_only(date: NaiveDate) -> Self {
        Self { date, time: None }
    }

    /// A timestamp with an explicit time-of-day.
    pub fn with_time(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time: Some(time),
        }
    }

    /// Whether the source string carried a time component.
    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", self.date.format("%Y-%m-%d"), time.format("%H:%M")),
            None => write!(f, "{}", self.date.format("%Y-%m-%d")),
        }
    }
}

/// The structural origin of a date signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// A `<meta>` tag (or canonical link) content attribute.
    MetaTag,
    /// An embedded structured-data block (JSON-LD and friends).
    StructuredData,
    /// The visible text of an element matched by a CSS selector.
    CssSelectorText,
    /// A `datetime`/`content` attribute of an element matched by a CSS selector.
    CssSelectorAttribute,
}

/// One candidate date string found on a page.
///
/// Signals are produced by the collector and consumed by the reconciler.
/// The collector only emits signals whose raw text parsed successfully,
/// so `parsed` is always populated.
#[derive(Debug, Clone)]
pub struct DateSignal {
    /// The raw text as found on the page.
    pub raw_text: String,
    /// Where on the page the signal came from.
    pub provenance: Provenance,
    /// A human-readable locator (selector/attribute) for diagnostics.
    pub source_locator: String,
    /// The normalized timestamp parsed from `raw_text`.
    pub parsed: Timestamp,
}

/// One reconciliation attempt: a signal plus its match verdict.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub signal: DateSignal,
    pub is_match: bool,
}

/// The outcome of reconciling one page's signals against the reference date.
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    /// The chosen timestamp, or `None` when no signal was found at all.
    pub chosen: Option<Timestamp>,
    /// Whether the chosen timestamp actually matched the reference.
    pub matched: bool,
    /// Every attempt in discovery order, for diagnostics.
    pub attempts: Vec<Attempt>,
}

/// One output row of the dataset.
///
/// Field names map to the CSV header: `date,scraped_date,title,url,summary`.
/// `scraped_date` is left empty when no on-page signal parsed successfully;
/// the untrusted feed date is never promoted into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// The untrusted publish-date estimate from the discovery feed.
    #[serde(rename = "date")]
    pub reference_date: String,
    /// The reconciled on-page date, when one was found.
    #[serde(rename = "scraped_date")]
    pub reconciled_date: Option<String>,
    pub title: String,
    pub url: String,
    pub summary: String,
}

/// One discovery result for a keyword search.
#[derive(Debug, Clone)]
pub struct NewsHit {
    pub url: String,
    pub title: String,
    /// Raw publish-date string from the feed. Possibly malformed; never trusted.
    pub published_raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_display_date_only() {
        let ts = Timestamp::date_only(NaiveDate::from_ymd_opt(2025, 12, 3).unwrap());
        assert_eq!(ts.to_string(), "2025-12-03");
        assert!(!ts.has_time());
    }

    #[test]
    fn test_timestamp_display_with_time() {
        let ts = Timestamp::with_time(
            NaiveDate::from_ymd_opt(2025, 12, 3).unwrap(),
            NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
        );
        assert_eq!(ts.to_string(), "2025-12-03 11:30");
        assert!(ts.has_time());
    }

    #[test]
    fn test_timestamp_accessors() {
        let ts = Timestamp::date_only(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(ts.day(), 29);
        assert_eq!(ts.month(), 2);
        assert_eq!(ts.year(), 2024);
    }

    #[test]
    fn test_article_record_csv_headers() {
        let record = ArticleRecord {
            reference_date: "Tue, 03 Dec 2025 11:30:00 GMT".to_string(),
            reconciled_date: Some("2025-12-03 11:35".to_string()),
            title: "Test".to_string(),
            url: "https://example.com/a".to_string(),
            summary: "Summary".to_string(),
        };

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(&record).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(out.starts_with("date,scraped_date,title,url,summary"));
        assert!(out.contains("2025-12-03 11:35"));
    }

    #[test]
    fn test_article_record_empty_reconciled_date() {
        let record = ArticleRecord {
            reference_date: "bogus".to_string(),
            reconciled_date: None,
            title: "T".to_string(),
            url: "https://example.com".to_string(),
            summary: "S".to_string(),
        };

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(&record).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert!(out.lines().nth(1).unwrap().starts_with("bogus,,"));
    }
}
